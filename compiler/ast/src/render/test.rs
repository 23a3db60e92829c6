use crate::{
    Aggregate, Expression, ExpressionKind, Function, InlineAsmBlock, LOOP_CONDITION, Label,
    ReferenceKind, ScopeFlags, Statement, StatementKind, StatementObject, Tree, Type, Variable,
};
use utility::{Atom, assert_text_eq};

#[test]
fn pretty_print_indents_per_level() {
    let mut tree = Tree::new();

    let zero = tree.add_expression(Expression::integer(0).typed(Type::Int), None);
    let variable = tree.add_statement(
        Statement::new(StatementKind::VariableInit)
            .with_expressions(vec![zero])
            .with_object(StatementObject::Variable(Variable { name: "i".into(), type_: Some(Type::Int) })),
        None,
    );

    let i = tree.add_expression(Expression::identifier("i".into()), None);
    let ten = tree.add_expression(Expression::integer(10), None);
    let condition = tree.add_expression(
        Expression::binary(ExpressionKind::Less, i, ten).decorated(LOOP_CONDITION),
        None,
    );

    let label = tree.add_statement(
        Statement::new(StatementKind::Label).with_object(StatementObject::Label(Label::new("top".into(), 0))),
        None,
    );
    let mut block = InlineAsmBlock::new("mov r1, {i}".into());
    block.preserve.push("r1".into());
    block.ignore.push("r2".into());
    let symbol = tree.add_expression(Expression::identifier("i".into()), None);
    block.symbols.push(symbol);
    let asm = tree.add_statement(Statement::new(StatementKind::Asm).with_object(StatementObject::Asm(block)), None);

    let body = tree.add_statement(Statement::new(StatementKind::Block).with_statements(vec![label, asm]), None);
    let for_ = tree.add_statement(
        Statement::new(StatementKind::For)
            .with_expressions(vec![condition])
            .with_statements(vec![variable, body])
            .with_flags(ScopeFlags::BREAK | ScopeFlags::CONTINUE),
        None,
    );

    let function = tree.add_function(Function::new(Atom::from("main"), Vec::new(), Type::Void), None);
    tree.set_body(function, for_);
    tree.attach_function(function);

    assert_text_eq(
        &tree.pretty_print(tree.root()),
        r#"program
    function main()
        for [break, continue]
            less #loop-condition
                identifier i
                integer-literal 10 const
            variable-init i: int
                integer-literal 0 : int const
            block
                label top #0
                asm "mov r1, {i}" preserve(r1) ignore(r2)
                    identifier i
"#,
    );
}

#[test]
fn pretty_print_aggregates() {
    let mut tree = Tree::new();
    let a = tree.add_expression(Expression::identifier("a".into()), None);
    let b = tree.add_expression(Expression::identifier("b".into()), None);
    let arguments = tree.add_expression(
        Expression::aggregate(
            ExpressionKind::ArgumentList,
            Aggregate {
                children: vec![a, b],
                names: None,
                references: Some(vec![ReferenceKind::Value, ReferenceKind::Output]),
            },
        ),
        None,
    );
    let callee = tree.add_expression(Expression::identifier("f".into()), None);
    let call = tree.add_expression(
        Expression::binary(ExpressionKind::Call, callee, arguments).typed(Type::Bool),
        None,
    );

    assert_text_eq(
        &tree.pretty_print(call),
        "\
call : bool
    identifier f
    argument-list modes(value, output)
        identifier a
        identifier b
",
    );
}
