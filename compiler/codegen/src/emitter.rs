use crate::Unit;
use ast::{
    Binding, ExpressionKind as Kind, LOOP_CONDITION, LOOP_INCREMENT, Leaf, NodeIndex, ReferenceKind,
    Shape, StatementKind, Tree, Type,
};
use session::Session;
use std::fmt::{self, Write};
use utility::{Atom, HashMap, HashSet, default};

/// The generator of a single unit.
pub(crate) struct Emitter<'a> {
    tree: &'a Tree,
    session: &'a Session,
    function: NodeIndex,
    body: String,
    /// The names of all slots handed out so far, parameters included.
    taken: HashSet<Atom>,
    locals: Vec<Atom>,
    variables: HashMap<NodeIndex, Atom>,
    targets: HashMap<NodeIndex, Targets>,
    cases: HashMap<NodeIndex, Label>,
    labels: u32,
    temporaries: u32,
    line: Option<u32>,
}

impl<'a> Emitter<'a> {
    pub(crate) fn new(tree: &'a Tree, session: &'a Session, function: NodeIndex) -> Self {
        Self {
            tree,
            session,
            function,
            body: String::new(),
            taken: default(),
            locals: Vec::new(),
            variables: default(),
            targets: default(),
            cases: default(),
            labels: 0,
            temporaries: 0,
            line: None,
        }
    }

    pub(crate) fn emit(mut self) -> Unit {
        let tree = self.tree;
        let function = tree.function(self.function);
        let name = function.name;

        let mut text = format!(".unit {name}\n");
        if function.properties.export {
            text += ".global\n";
        }
        if function.properties.inline {
            text += ".inline\n";
        }
        if function.body.is_none() {
            text += ".extern\n";
        }

        if !function.parameters.is_empty() {
            let parameters: Vec<_> = function
                .parameters
                .iter()
                .map(|parameter| match parameter.mode {
                    ReferenceKind::Value => parameter.name.to_string(),
                    ReferenceKind::Reference | ReferenceKind::Output => format!("&{}", parameter.name),
                })
                .collect();
            let _ = writeln!(text, ".params {}", parameters.join(" "));
        }
        self.taken.extend(function.parameters.iter().map(|parameter| parameter.name));

        if let Some(body) = function.body {
            self.emit_statement(body);
        }

        if !self.locals.is_empty() {
            let locals: Vec<_> = self.locals.iter().map(|local| local.to_str()).collect();
            let _ = writeln!(text, ".locals {}", locals.join(" "));
        }
        text += &self.body;
        text += ".end\n";

        Unit { name, text }
    }

    fn instruction(&mut self, instruction: impl fmt::Display) {
        let _ = writeln!(self.body, "    {instruction}");
    }

    fn jump(&mut self, mnemonic: &str, target: impl fmt::Display) {
        self.instruction(format_args!("{mnemonic} {target}"));
    }

    fn label(&mut self) -> Label {
        let label = Label(self.labels);
        self.labels += 1;
        label
    }

    fn place(&mut self, label: impl fmt::Display) {
        let _ = writeln!(self.body, "{label}:");
    }

    /// Emit a `.line` directive if the node starts on a new line.
    fn mark_line(&mut self, node: NodeIndex) {
        let Some(location) = self.tree.location(node) else { return };
        let line = self.session.file(location.file).position(location.span.start).line;

        if self.line != Some(line) {
            self.line = Some(line);
            let _ = writeln!(self.body, ".line {line}");
        }
    }

    fn emit_statements(&mut self, statements: &[NodeIndex]) {
        for &statement in statements {
            self.emit_statement(statement);
        }
    }

    fn emit_statement(&mut self, node: NodeIndex) {
        let tree = self.tree;
        let statement = tree.statement(node);

        if !matches!(statement.kind, StatementKind::Block | StatementKind::Placeholder) {
            self.mark_line(node);
        }

        match statement.kind {
            StatementKind::Block => self.emit_statements(&statement.statements),
            StatementKind::Label => {
                let Some(label) = statement.label() else { panic!("a label statement without a label") };
                self.place(label.name);
            }
            StatementKind::If => {
                let otherwise = self.label();
                self.emit_expression(statement.expressions[0]);
                self.jump("jz", otherwise);
                self.emit_statement(statement.statements[0]);

                match statement.statements.get(1) {
                    Some(&alternative) => {
                        let end = self.label();
                        self.jump("jmp", end);
                        self.place(otherwise);
                        self.emit_statement(alternative);
                        self.place(end);
                    }
                    None => self.place(otherwise),
                }
            }
            StatementKind::While => {
                let (top, end) = (self.label(), self.label());
                self.targets.insert(node, Targets { break_: end, continue_: Some(top) });

                self.place(top);
                self.emit_expression(statement.expressions[0]);
                self.jump("jz", end);
                self.emit_statement(statement.statements[0]);
                self.jump("jmp", top);
                self.place(end);
            }
            StatementKind::DoWhile => {
                let (top, next, end) = (self.label(), self.label(), self.label());
                self.targets.insert(node, Targets { break_: end, continue_: Some(next) });

                self.place(top);
                self.emit_statement(statement.statements[0]);
                self.place(next);
                self.emit_expression(statement.expressions[0]);
                self.jump("jnz", top);
                self.place(end);
            }
            StatementKind::For => self.emit_for(node),
            StatementKind::Switch => self.emit_switch(node),
            StatementKind::Case | StatementKind::Default => {
                if let Some(&label) = self.cases.get(&node) {
                    self.place(label);
                }
                self.emit_statements(&statement.statements);
            }
            StatementKind::Break => {
                let target = tree
                    .find_nearest_breakable_statement(node)
                    .and_then(|statement| self.targets.get(&statement))
                    .map(|targets| targets.break_);
                let Some(target) = target else { panic!("‘break’ outside of a loop or a ‘switch’") };
                self.jump("jmp", target);
            }
            StatementKind::Continue => {
                let target = tree
                    .find_nearest_continuable_statement(node)
                    .and_then(|statement| self.targets.get(&statement))
                    .and_then(|targets| targets.continue_);
                let Some(target) = target else { panic!("‘continue’ outside of a loop") };
                self.jump("jmp", target);
            }
            StatementKind::Goto => {
                let Some(label) = statement.label() else { panic!("an unresolved ‘goto’") };
                self.jump("jmp", label.name);
            }
            StatementKind::Return => match statement.expressions.first() {
                Some(&value) => {
                    self.emit_expression(value);
                    self.instruction("retv");
                }
                None => self.instruction("ret"),
            },
            StatementKind::Asm => {
                let Some(block) = statement.asm() else { panic!("an ‘asm’ statement without a block") };
                let saved: Vec<_> = block.saved_registers().map(|register| register.to_str()).collect();

                if !saved.is_empty() {
                    self.instruction(format_args!("save {}", saved.join(" ")));
                }
                for line in block.expand_template().lines().map(str::trim).filter(|line| !line.is_empty()) {
                    self.instruction(line);
                }
                if !saved.is_empty() {
                    let restored: Vec<_> = saved.iter().rev().copied().collect();
                    self.instruction(format_args!("restore {}", restored.join(" ")));
                }
            }
            StatementKind::VariableInit => self.emit_variable(node),
            StatementKind::Expression => {
                let expression = statement.expressions[0];
                self.emit_expression(expression);
                self.discard(expression);
            }
            StatementKind::Assert => {
                self.emit_expression(statement.expressions[0]);
                self.instruction("assert");
            }
            StatementKind::Placeholder => {}
        }
    }

    fn emit_for(&mut self, node: NodeIndex) {
        let tree = self.tree;
        let statement = tree.statement(node);
        let decorated = |decoration: &str| {
            statement
                .expressions
                .iter()
                .copied()
                .find(|&expression| tree.expression(expression).is_decorated(decoration))
        };
        let &[initializer, body] = &statement.statements[..] else { panic!("a malformed ‘for’ loop") };

        let (top, next, end) = (self.label(), self.label(), self.label());
        self.targets.insert(node, Targets { break_: end, continue_: Some(next) });

        self.emit_statement(initializer);
        self.place(top);
        if let Some(condition) = decorated(LOOP_CONDITION) {
            self.emit_expression(condition);
            self.jump("jz", end);
        }
        self.emit_statement(body);
        self.place(next);
        if let Some(step) = decorated(LOOP_INCREMENT) {
            self.emit_expression(step);
            self.discard(step);
        }
        self.jump("jmp", top);
        self.place(end);
    }

    /// Compare the scrutinee against every case in order, then jump to the default or past the end.
    fn emit_switch(&mut self, node: NodeIndex) {
        let tree = self.tree;
        let statement = tree.statement(node);
        let end = self.label();
        self.targets.insert(node, Targets { break_: end, continue_: None });

        let scrutinee = self.temporary();
        self.emit_expression(statement.expressions[0]);
        self.instruction(format_args!("store {scrutinee}"));
        self.instruction("drop");

        let mut cases = Vec::new();
        for &body in &statement.statements {
            self.collect_cases(body, &mut cases);
        }

        let mut fallback = end;
        for case in cases {
            let label = self.label();
            self.cases.insert(case, label);

            match tree.statement(case).case_value() {
                Some(value) => {
                    self.instruction(format_args!("load {scrutinee}"));
                    self.instruction(format_args!("push {}", value.value()));
                    self.instruction("eq");
                    self.jump("jnz", label);
                }
                None => fallback = label,
            }
        }
        self.jump("jmp", fallback);

        self.emit_statements(&statement.statements);
        self.place(end);
    }

    /// The cases belonging to the switch enclosing the given statement.
    fn collect_cases(&self, node: NodeIndex, cases: &mut Vec<NodeIndex>) {
        let statement = self.tree.statement(node);

        if matches!(statement.kind, StatementKind::Case | StatementKind::Default) {
            cases.push(node);
        }
        if statement.kind != StatementKind::Switch {
            for &nested in &statement.statements {
                self.collect_cases(nested, cases);
            }
        }
    }

    fn emit_variable(&mut self, node: NodeIndex) {
        let tree = self.tree;
        let statement = tree.statement(node);
        let slot = self.variable_slot(node);
        let Some(&value) = statement.expressions.first() else { return };
        let initializer = tree.expression(value);

        if initializer.kind != Kind::InitializerList {
            self.emit_expression(value);
            self.instruction(format_args!("store {slot}"));
            self.instruction("drop");
            return;
        }

        let element_size = match statement.variable().and_then(|variable| variable.type_.as_ref()) {
            Some(Type::Array(element, _)) => size_of(element),
            _ => panic!("an initializer list for a variable not of array type"),
        };

        for (index, &element) in initializer.operands().iter().enumerate() {
            self.instruction(format_args!("addr {slot}"));
            let offset = element_size * index as u64;
            if offset != 0 {
                self.instruction(format_args!("push {offset}"));
                self.instruction("add");
            }
            self.emit_expression(element);
            self.instruction("storev");
            self.instruction("drop");
        }
    }

    fn emit_expression(&mut self, node: NodeIndex) {
        let tree = self.tree;
        let expression = tree.expression(node);
        let operands = expression.operands();

        match expression.kind {
            kind if kind.is_literal() => self.emit_literal(expression.leaf()),
            Kind::Identifier => match self.slot(node) {
                Slot::Direct(slot) => self.instruction(format_args!("load {slot}")),
                Slot::Indirect(slot) => {
                    self.instruction(format_args!("load {slot}"));
                    self.instruction("loadv");
                }
            },
            Kind::SizeOf => {
                let size = size_of(self.type_of(operands[0]));
                self.instruction(format_args!("push {size}"));
            }
            Kind::SizeOfType => {
                let Some(Leaf::Type(type_)) = expression.leaf() else { panic!("‘sizeof’ without a type") };
                self.instruction(format_args!("push {}", size_of(type_)));
            }
            Kind::NameOf => {
                let Some(name) = tree.expression(operands[0]).name() else {
                    panic!("‘nameof’ applied to something other than a name")
                };
                self.instruction(format_args!("pushs {:?}", name.to_str()));
            }
            Kind::Cast => {
                let (from, to) = (self.type_of(operands[0]), self.type_of(node));
                self.emit_expression(operands[0]);
                if from != to {
                    self.instruction(format_args!("conv {from} {to}"));
                }
            }
            Kind::Call => self.emit_call(operands[0], operands[1]),
            Kind::Index | Kind::Dereference => {
                self.emit_address(node);
                self.instruction("loadv");
            }
            Kind::Conditional => {
                let (otherwise, end) = (self.label(), self.label());
                self.emit_expression(operands[0]);
                self.jump("jz", otherwise);
                self.emit_expression(operands[1]);
                self.jump("jmp", end);
                self.place(otherwise);
                self.emit_expression(operands[2]);
                self.place(end);
            }
            Kind::Comma => {
                self.emit_expression(operands[0]);
                self.discard(operands[0]);
                self.emit_expression(operands[1]);
            }
            Kind::Plus => self.emit_expression(operands[0]),
            Kind::Negate | Kind::BitwiseNot | Kind::LogicalNot => {
                self.emit_expression(operands[0]);
                self.instruction(match expression.kind {
                    Kind::Negate => "neg",
                    Kind::BitwiseNot => "not",
                    _ => "lnot",
                });
            }
            Kind::AddressOf => self.emit_address(operands[0]),
            kind if kind.is_increment() => self.emit_increment(node),
            Kind::LogicalAnd | Kind::LogicalOr => {
                let end = self.label();
                self.emit_expression(operands[0]);
                self.instruction("dup");
                self.jump(if expression.kind == Kind::LogicalAnd { "jz" } else { "jnz" }, end);
                self.instruction("drop");
                self.emit_expression(operands[1]);
                self.place(end);
            }
            Kind::Assign => self.emit_assignment(operands[0], operands[1]),
            kind if kind.is_assignment() => self.emit_compound_assignment(node),
            kind if kind.is_arithmetic() || kind.is_comparison() => self.emit_binary(node),
            kind => panic!("expressions of kind {} cannot be generated", kind.name()),
        }
    }

    fn emit_literal(&mut self, leaf: Option<&Leaf>) {
        match leaf {
            Some(Leaf::Integer(value)) => self.instruction(format_args!("push {value}")),
            Some(&Leaf::Boolean(value)) => self.instruction(format_args!("push {}", u8::from(value))),
            Some(&Leaf::Character(character)) => {
                self.instruction(format_args!("push {}", u32::from(character)));
            }
            Some(Leaf::Text(text)) => self.instruction(format_args!("pushs {:?}", text.to_str())),
            Some(Leaf::Null) => self.instruction("pushnull"),
            _ => panic!("a literal without a value"),
        }
    }

    /// Push the address of a place.
    fn emit_address(&mut self, node: NodeIndex) {
        let tree = self.tree;
        let expression = tree.expression(node);

        match expression.kind {
            Kind::Identifier => match self.slot(node) {
                Slot::Direct(slot) => self.instruction(format_args!("addr {slot}")),
                Slot::Indirect(slot) => self.instruction(format_args!("load {slot}")),
            },
            Kind::Index => {
                let &[base, index] = expression.operands() else { panic!("a malformed index expression") };
                let size = match self.type_of(base) {
                    Type::Array(element, _) => {
                        self.emit_address(base);
                        size_of(element)
                    }
                    Type::Pointer(pointee) => {
                        self.emit_expression(base);
                        size_of(pointee)
                    }
                    type_ => panic!("cannot index into a value of type {type_}"),
                };
                self.emit_expression(index);
                self.scale(size);
                self.instruction("add");
            }
            Kind::Dereference => self.emit_expression(expression.operands()[0]),
            kind => panic!("expressions of kind {} are not places", kind.name()),
        }
    }

    fn emit_binary(&mut self, node: NodeIndex) {
        let tree = self.tree;
        let expression = tree.expression(node);
        let &[left, right] = expression.operands() else { panic!("a malformed binary expression") };
        let (left_type, right_type) = (self.type_of(left), self.type_of(right));
        let offsets = matches!(expression.kind, Kind::Add | Kind::Subtract);

        self.emit_expression(left);
        if offsets && let Type::Pointer(pointee) = right_type && left_type.is_integer() {
            self.scale(size_of(pointee));
        }
        self.emit_expression(right);
        if offsets && let Type::Pointer(pointee) = left_type && right_type.is_integer() {
            self.scale(size_of(pointee));
        }
        self.instruction(mnemonic(expression.kind, is_unsigned(left_type)));
    }

    fn emit_assignment(&mut self, target: NodeIndex, value: NodeIndex) {
        match self.direct_slot(target) {
            Some(slot) => {
                self.emit_expression(value);
                self.instruction(format_args!("store {slot}"));
            }
            None => {
                self.emit_address(target);
                self.emit_expression(value);
                self.instruction("storev");
            }
        }
    }

    fn emit_compound_assignment(&mut self, node: NodeIndex) {
        let tree = self.tree;
        let expression = tree.expression(node);
        let Some(operator) = expression.kind.compound_operator() else { panic!("not a compound assignment") };
        let &[target, value] = expression.operands() else { panic!("a malformed assignment") };
        let target_type = self.type_of(target);

        let slot = self.direct_slot(target);
        self.load_for_update(target, slot);
        self.emit_expression(value);
        if matches!(operator, Kind::Add | Kind::Subtract)
            && let Type::Pointer(pointee) = target_type
        {
            self.scale(size_of(pointee));
        }
        self.instruction(mnemonic(operator, is_unsigned(target_type)));
        self.store_updated(slot);
    }

    /// Increments and decrements not rewritten by the lowering.
    fn emit_increment(&mut self, node: NodeIndex) {
        let tree = self.tree;
        let expression = tree.expression(node);
        let operand = expression.operands()[0];
        let step = match self.type_of(operand) {
            Type::Pointer(pointee) => size_of(pointee),
            _ => 1,
        };
        let (apply, undo) = match expression.kind {
            Kind::PreIncrement | Kind::PostIncrement => ("add", "sub"),
            _ => ("sub", "add"),
        };

        let slot = self.direct_slot(operand);
        self.load_for_update(operand, slot);
        self.instruction(format_args!("push {step}"));
        self.instruction(apply);
        self.store_updated(slot);

        if matches!(expression.kind, Kind::PostIncrement | Kind::PostDecrement) {
            self.instruction(format_args!("push {step}"));
            self.instruction(undo);
        }
    }

    /// Push the current value of a place about to be updated.
    ///
    /// Places other than slots leave their address below the value.
    fn load_for_update(&mut self, target: NodeIndex, slot: Option<Atom>) {
        match slot {
            Some(slot) => self.instruction(format_args!("load {slot}")),
            None => {
                self.emit_address(target);
                self.instruction("dup");
                self.instruction("loadv");
            }
        }
    }

    fn store_updated(&mut self, slot: Option<Atom>) {
        match slot {
            Some(slot) => self.instruction(format_args!("store {slot}")),
            None => self.instruction("storev"),
        }
    }

    fn emit_call(&mut self, callee: NodeIndex, arguments: NodeIndex) {
        let tree = self.tree;
        let Some(Binding::Function(function)) = tree.expression(callee).binding() else {
            panic!("only functions can be called")
        };
        let Shape::Aggregate(list) = &tree.expression(arguments).shape else {
            panic!("a call without an argument list")
        };

        for (index, &argument) in list.children.iter().enumerate() {
            match list.reference(index) {
                ReferenceKind::Value => self.emit_expression(argument),
                ReferenceKind::Reference | ReferenceKind::Output => self.emit_address(argument),
            }
        }

        self.instruction(format_args!("call {} {}", tree.function(function).name, list.children.len()));
    }

    /// Drop the value left by an expression whose result is unused.
    fn discard(&mut self, node: NodeIndex) {
        if self.tree.expression(node).type_.as_ref().is_some_and(|type_| *type_ != Type::Void) {
            self.instruction("drop");
        }
    }

    fn scale(&mut self, size: u64) {
        if size != 1 {
            self.instruction(format_args!("push {size}"));
            self.instruction("mul");
        }
    }

    fn type_of(&self, node: NodeIndex) -> &'a Type {
        let tree: &'a Tree = self.tree;
        match &tree.expression(node).type_ {
            Some(type_) => type_,
            None => panic!("an expression without a type reached the code generator"),
        }
    }

    fn slot(&mut self, node: NodeIndex) -> Slot {
        let tree = self.tree;
        match tree.expression(node).binding() {
            Some(Binding::Variable(statement)) => Slot::Direct(self.variable_slot(statement)),
            Some(Binding::Parameter(function, index)) => {
                let parameter = &tree.function(function).parameters[index];
                match parameter.mode {
                    ReferenceKind::Value => Slot::Direct(parameter.name),
                    ReferenceKind::Reference | ReferenceKind::Output => Slot::Indirect(parameter.name),
                }
            }
            _ => panic!("an identifier not naming a variable or a parameter"),
        }
    }

    fn direct_slot(&mut self, node: NodeIndex) -> Option<Atom> {
        if self.tree.expression(node).kind != Kind::Identifier {
            return None;
        }

        match self.slot(node) {
            Slot::Direct(slot) => Some(slot),
            Slot::Indirect(_) => None,
        }
    }

    /// The slot of a variable, named after it unless that name is taken.
    fn variable_slot(&mut self, statement: NodeIndex) -> Atom {
        if let Some(&slot) = self.variables.get(&statement) {
            return slot;
        }

        let Some(variable) = self.tree.statement(statement).variable() else {
            panic!("a binding to a statement not declaring a variable")
        };
        let mut slot = variable.name;
        let mut suffix = 0;
        while !self.taken.insert(slot) {
            suffix += 1;
            slot = Atom::from(format!("{}.{suffix}", variable.name));
        }

        self.variables.insert(statement, slot);
        self.locals.push(slot);
        slot
    }

    fn temporary(&mut self) -> Atom {
        let slot = Atom::from(format!("${}", self.temporaries));
        self.temporaries += 1;
        self.locals.push(slot);
        slot
    }
}

/// Where `break` and `continue` of a loop or a `switch` jump to.
struct Targets {
    break_: Label,
    continue_: Option<Label>,
}

/// A generated jump target.
#[derive(Clone, Copy)]
struct Label(u32);

impl fmt::Display for Label {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, ".L{}", self.0)
    }
}

enum Slot {
    /// The slot holds the value.
    Direct(Atom),
    /// The slot holds the address of the value.
    Indirect(Atom),
}

/// Oversized types are rejected during analysis.
fn size_of(type_: &Type) -> u64 {
    let Some(size) = type_.size() else { panic!("the size of the type {type_} overflows") };
    size
}

fn is_unsigned(type_: &Type) -> bool {
    matches!(type_, Type::UInt | Type::Pointer(_))
}

fn mnemonic(operator: Kind, unsigned: bool) -> &'static str {
    match (operator, unsigned) {
        (Kind::Add, _) => "add",
        (Kind::Subtract, _) => "sub",
        (Kind::Multiply, _) => "mul",
        (Kind::Divide, false) => "div",
        (Kind::Divide, true) => "divu",
        (Kind::Remainder, false) => "rem",
        (Kind::Remainder, true) => "remu",
        (Kind::ShiftLeft, _) => "shl",
        (Kind::ShiftRight, false) => "shr",
        (Kind::ShiftRight, true) => "shru",
        (Kind::BitwiseAnd, _) => "and",
        (Kind::BitwiseOr, _) => "or",
        (Kind::BitwiseXor, _) => "xor",
        (Kind::Equal, _) => "eq",
        (Kind::NotEqual, _) => "ne",
        (Kind::Less, false) => "lt",
        (Kind::Less, true) => "ltu",
        (Kind::LessEqual, false) => "le",
        (Kind::LessEqual, true) => "leu",
        (Kind::Greater, false) => "gt",
        (Kind::Greater, true) => "gtu",
        (Kind::GreaterEqual, false) => "ge",
        (Kind::GreaterEqual, true) => "geu",
        (operator, _) => panic!("{} is not a binary operator", operator.name()),
    }
}
