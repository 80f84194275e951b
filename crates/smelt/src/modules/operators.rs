//! Global operators that are not members of a structure: polymorphic
//! equality and comparison, string concatenation, list construction, and
//! boolean negation.
//!
//! The arithmetic operators are not here: the frontend monomorphizes them to
//! the `Int.+` / `Real.+` family at compile time.

use std::cmp::Ordering;

use crate::{
    args::ArgValues,
    env::Env,
    fault::{Fault, FaultKind, RunResult},
    value::Value,
};

/// Global operator functions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, strum::Display, strum::EnumIter)]
pub(crate) enum OperatorFunctions {
    #[strum(serialize = "@")]
    Append,
    #[strum(serialize = "^")]
    Caret,
    #[strum(serialize = "::")]
    Cons,
    #[strum(serialize = "=")]
    Eq,
    #[strum(serialize = ">=")]
    Ge,
    #[strum(serialize = ">")]
    Gt,
    #[strum(serialize = "<=")]
    Le,
    #[strum(serialize = "<")]
    Lt,
    #[strum(serialize = "<>")]
    Ne,
    #[strum(serialize = "not")]
    Not,
}

impl OperatorFunctions {
    /// The registered spelling: `op @`, `op =`, ... except plain `not`.
    pub fn ml_name(self) -> String {
        match self {
            Self::Not => "not".to_string(),
            other => format!("op {other}"),
        }
    }

    pub fn arity(self) -> usize {
        match self {
            Self::Not => 1,
            _ => 2,
        }
    }
}

pub(crate) fn call(_env: &Env, function: OperatorFunctions, args: ArgValues) -> RunResult<Value> {
    match function {
        OperatorFunctions::Append => {
            let (a, b) = args.two("op @")?;
            let mut out = a.as_list()?.to_vec();
            out.extend_from_slice(b.as_list()?);
            Ok(Value::list(out))
        }
        OperatorFunctions::Caret => {
            let (a, b) = args.two("op ^")?;
            let a = a.as_str()?;
            let b = b.as_str()?;
            if a.len().checked_add(b.len()).is_none_or(|total| i32::try_from(total).is_err()) {
                return Err(Fault::new(FaultKind::Size).into());
            }
            Ok(Value::string(format!("{a}{b}")))
        }
        OperatorFunctions::Cons => {
            let (head, tail) = args.two("op ::")?;
            let mut out = Vec::with_capacity(tail.as_list()?.len() + 1);
            out.push(head);
            out.extend_from_slice(tail.as_list()?);
            Ok(Value::list(out))
        }
        OperatorFunctions::Eq => {
            let (a, b) = args.two("op =")?;
            Ok(Value::Bool(a == b))
        }
        OperatorFunctions::Ne => {
            let (a, b) = args.two("op <>")?;
            Ok(Value::Bool(a != b))
        }
        // Comparisons involving nan are false, whatever the operator.
        OperatorFunctions::Lt => comparison(args, |o| o == Ordering::Less),
        OperatorFunctions::Le => comparison(args, |o| o != Ordering::Greater),
        OperatorFunctions::Gt => comparison(args, |o| o == Ordering::Greater),
        OperatorFunctions::Ge => comparison(args, |o| o != Ordering::Less),
        OperatorFunctions::Not => {
            let b = args.one("not")?.as_bool()?;
            Ok(Value::Bool(!b))
        }
    }
}

fn comparison(args: ArgValues, accept: impl Fn(Ordering) -> bool) -> RunResult<Value> {
    let (a, b) = args.two("op <")?;
    Ok(Value::Bool(a.compare(&b).is_some_and(accept)))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn binary(function: OperatorFunctions, a: Value, b: Value) -> Value {
        let args: ArgValues = vec![a, b].into_iter().collect();
        call(&Env::empty(), function, args).unwrap()
    }

    #[test]
    fn nan_comparisons_are_all_false() {
        for op in [
            OperatorFunctions::Lt,
            OperatorFunctions::Le,
            OperatorFunctions::Gt,
            OperatorFunctions::Ge,
        ] {
            assert_eq!(
                binary(op, Value::Real(f32::NAN), Value::Real(1.0)),
                Value::Bool(false),
                "{op}"
            );
        }
        assert_eq!(
            binary(OperatorFunctions::Eq, Value::Real(f32::NAN), Value::Real(f32::NAN)),
            Value::Bool(false)
        );
    }

    #[test]
    fn cons_and_append_build_lists() {
        let tail = Value::list(vec![Value::Int(2), Value::Int(3)]);
        assert_eq!(
            binary(OperatorFunctions::Cons, Value::Int(1), tail.clone()),
            Value::list(vec![Value::Int(1), Value::Int(2), Value::Int(3)])
        );
        let front = Value::list(vec![Value::Int(1)]);
        assert_eq!(
            binary(OperatorFunctions::Append, front, tail),
            Value::list(vec![Value::Int(1), Value::Int(2), Value::Int(3)])
        );
    }
}
