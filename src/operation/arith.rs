//! Operator semantics over values.

use std::cmp::Ordering;

use compact_str::format_compact;

use crate::{
    compiler::ast::{BinOp, UnOp},
    errors::RuntimeErrorKind,
    objects::{Value, fork},
};

fn bin_error(operator: BinOp, left: &Value, right: &Value) -> RuntimeErrorKind {
    RuntimeErrorKind::BinOperator {
        operator: operator_str(operator),
        operand: [left.value_type(), right.value_type()],
    }
}

fn operator_str(operator: BinOp) -> &'static str {
    match operator {
        BinOp::Add => "+",
        BinOp::Sub => "-",
        BinOp::Mul => "*",
        BinOp::Div => "/",
        BinOp::Rem => "%",
        BinOp::Pow => "^",
        BinOp::And => "and",
        BinOp::Or => "or",
        BinOp::Eq => "==",
        BinOp::Ne => "!=",
        BinOp::Lt => "<",
        BinOp::Le => "<=",
        BinOp::Gt => ">",
        BinOp::Ge => ">=",
        BinOp::Isa => "isa",
    }
}

fn numbers(operator: BinOp, left: &Value, right: &Value) -> Result<(f64, f64), RuntimeErrorKind> {
    match (left.to_number(), right.to_number()) {
        (Some(a), Some(b)) => Ok((a, b)),
        _ => Err(bin_error(operator, left, right)),
    }
}

/// Evaluates a non short-circuiting binary operator.
pub(super) fn binary(operator: BinOp, left: &Value, right: &Value) -> Result<Value, RuntimeErrorKind> {
    Ok(match operator {
        BinOp::Add => match (left, right) {
            (Value::List(a), Value::List(b)) => {
                let mut items = a.snapshot();
                items.extend(b.snapshot());
                Value::from(items)
            }
            (Value::String(_), _) | (_, Value::String(_)) => {
                Value::String(format_compact!("{}{}", left.to_key(), right.to_key()))
            }
            _ => {
                let (a, b) = numbers(operator, left, right)?;
                Value::Number(a + b)
            }
        },
        BinOp::Sub => {
            let (a, b) = numbers(operator, left, right)?;
            Value::Number(a - b)
        }
        BinOp::Mul => {
            let (a, b) = numbers(operator, left, right)?;
            Value::Number(a * b)
        }
        BinOp::Div => {
            let (a, b) = numbers(operator, left, right)?;
            Value::Number(a / b)
        }
        BinOp::Rem => {
            let (a, b) = numbers(operator, left, right)?;
            Value::Number(a % b)
        }
        BinOp::Pow => {
            let (a, b) = numbers(operator, left, right)?;
            Value::Number(a.powf(b))
        }
        BinOp::Eq => Value::Boolean(left.equals(right)),
        BinOp::Ne => Value::Boolean(!left.equals(right)),
        BinOp::Lt | BinOp::Le | BinOp::Gt | BinOp::Ge => {
            let ordering = compare(operator, left, right)?;
            Value::Boolean(ordering.is_some_and(|ordering| match operator {
                BinOp::Lt => ordering.is_lt(),
                BinOp::Le => ordering.is_le(),
                BinOp::Gt => ordering.is_gt(),
                _ => ordering.is_ge(),
            }))
        }
        BinOp::Isa => Value::Boolean(match (left, right) {
            (Value::Map(a), Value::Map(b)) => a.isa(b),
            _ => false,
        }),
        BinOp::And => Value::Boolean(left.is_truthy() && right.is_truthy()),
        BinOp::Or => Value::Boolean(left.is_truthy() || right.is_truthy()),
    })
}

/// Two strings compare by content, anything else numerically. `None` when
/// a NaN is involved.
fn compare(operator: BinOp, left: &Value, right: &Value) -> Result<Option<Ordering>, RuntimeErrorKind> {
    if let (Value::String(a), Value::String(b)) = (left, right) {
        return Ok(Some(a.cmp(b)));
    }
    let (a, b) = numbers(operator, left, right)?;
    Ok(a.partial_cmp(&b))
}

/// Evaluates `not`, `-` and `new`.
pub(super) fn unary(operator: UnOp, argument: &Value) -> Result<Value, RuntimeErrorKind> {
    let error = || RuntimeErrorKind::UnOperator {
        operator: match operator {
            UnOp::Not => "not",
            UnOp::Neg => "-",
            UnOp::New => "new",
            UnOp::Reference => "@",
        },
        operand: argument.value_type(),
    };
    match operator {
        UnOp::Not => Ok(Value::Boolean(!argument.is_truthy())),
        UnOp::Neg => argument
            .to_number()
            .map(|n| Value::Number(-n))
            .ok_or_else(error),
        UnOp::New => match argument {
            Value::Map(map) => Ok(Value::Map(fork(map))),
            _ => Err(error()),
        },
        UnOp::Reference => Ok(argument.clone()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_add() {
        let v = binary(BinOp::Add, &Value::from("a"), &Value::from(1)).unwrap();
        assert_eq!(v, Value::from("a1"));
        let v = binary(BinOp::Add, &Value::from(1), &Value::from(2)).unwrap();
        assert_eq!(v, Value::from(3));
        let v = binary(BinOp::Add, &Value::Nil, &Value::from(true)).unwrap();
        assert_eq!(v, Value::from(1));
        let list = binary(
            BinOp::Add,
            &Value::from(vec![Value::from(1)]),
            &Value::from(vec![Value::from(2)]),
        )
        .unwrap();
        assert_eq!(list.to_string(), "[1, 2]");
        assert!(binary(BinOp::Add, &Value::from(Vec::<Value>::new()), &Value::from(1)).is_err());
    }

    #[test]
    fn test_compare() {
        let lt = |a: Value, b: Value| binary(BinOp::Lt, &a, &b).unwrap();
        assert_eq!(lt(Value::from("abc"), Value::from("abd")), Value::Boolean(true));
        assert_eq!(lt(Value::from("10"), Value::from(9)), Value::Boolean(false));
        assert_eq!(lt(Value::from(f64::NAN), Value::from(1)), Value::Boolean(false));
    }

    #[test]
    fn test_unary() {
        assert_eq!(unary(UnOp::Not, &Value::from(0)).unwrap(), Value::Boolean(true));
        assert_eq!(unary(UnOp::Neg, &Value::from("2")).unwrap(), Value::from(-2));
        assert_eq!(
            unary(UnOp::New, &Value::from(1)),
            Err(RuntimeErrorKind::UnOperator {
                operator: "new",
                operand: crate::objects::ValueType::Number,
            })
        );
    }
}
