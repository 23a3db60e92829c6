//! Evaluation of constant expressions.

use ast::{ExpressionKind, Leaf, NodeIndex, Tree, Type};

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub(crate) enum Value {
    Integer(i64),
    Boolean(bool),
}

impl Value {
    fn integer(self) -> Option<i64> {
        match self {
            Self::Integer(value) => Some(value),
            Self::Boolean(_) => None,
        }
    }

    fn boolean(self) -> Option<bool> {
        match self {
            Self::Boolean(value) => Some(value),
            Self::Integer(_) => None,
        }
    }
}

/// Evaluate an expression built from literals and operators.
///
/// Yields `None` for anything else and on overflow or division by zero.
pub(crate) fn evaluate(tree: &Tree, node: NodeIndex) -> Option<Value> {
    use ExpressionKind::*;

    let expression = tree.expression(node);
    let operands = expression.operands();
    let integer = |index: usize| evaluate(tree, operands[index])?.integer();
    let boolean = |index: usize| evaluate(tree, operands[index])?.boolean();

    Some(match expression.kind {
        IntegerLiteral | BooleanLiteral | CharacterLiteral => match expression.leaf()? {
            &Leaf::Integer(value) => Value::Integer(i64::try_from(value).ok()?),
            &Leaf::Boolean(value) => Value::Boolean(value),
            &Leaf::Character(character) => Value::Integer(i64::from(u32::from(character))),
            _ => return None,
        },
        SizeOfType => match expression.leaf()? {
            Leaf::Type(type_) => Value::Integer(i64::try_from(type_.size()?).ok()?),
            _ => return None,
        },
        Negate => Value::Integer(integer(0)?.checked_neg()?),
        Plus => Value::Integer(integer(0)?),
        BitwiseNot => Value::Integer(!integer(0)?),
        LogicalNot => Value::Boolean(!boolean(0)?),
        Add => Value::Integer(integer(0)?.checked_add(integer(1)?)?),
        Subtract => Value::Integer(integer(0)?.checked_sub(integer(1)?)?),
        Multiply => Value::Integer(integer(0)?.checked_mul(integer(1)?)?),
        Divide => Value::Integer(integer(0)?.checked_div(integer(1)?)?),
        Remainder => Value::Integer(integer(0)?.checked_rem(integer(1)?)?),
        ShiftLeft => Value::Integer(integer(0)?.checked_shl(u32::try_from(integer(1)?).ok()?)?),
        ShiftRight => Value::Integer(integer(0)?.checked_shr(u32::try_from(integer(1)?).ok()?)?),
        BitwiseAnd => Value::Integer(integer(0)? & integer(1)?),
        BitwiseOr => Value::Integer(integer(0)? | integer(1)?),
        BitwiseXor => Value::Integer(integer(0)? ^ integer(1)?),
        LogicalAnd => Value::Boolean(boolean(0)? && boolean(1)?),
        LogicalOr => Value::Boolean(boolean(0)? || boolean(1)?),
        Equal | NotEqual => {
            let equal = evaluate(tree, operands[0])? == evaluate(tree, operands[1])?;
            Value::Boolean(equal == (expression.kind == Equal))
        }
        Less => Value::Boolean(integer(0)? < integer(1)?),
        LessEqual => Value::Boolean(integer(0)? <= integer(1)?),
        Greater => Value::Boolean(integer(0)? > integer(1)?),
        GreaterEqual => Value::Boolean(integer(0)? >= integer(1)?),
        Conditional => match boolean(0)? {
            true => evaluate(tree, operands[1])?,
            false => evaluate(tree, operands[2])?,
        },
        Comma => evaluate(tree, operands[1])?,
        Cast => {
            let value = evaluate(tree, operands[0])?;
            match (expression.type_.as_ref()?, value) {
                (Type::Bool, Value::Integer(value)) => Value::Boolean(value != 0),
                (Type::Bool, value) => value,
                (_, Value::Boolean(value)) => Value::Integer(i64::from(value)),
                (_, value) => value,
            }
        }
        _ => return None,
    })
}
