//! Implementation of the `Relational` structure: the aggregate operators the
//! query engine applies to materialized row sets.

use std::cmp::Ordering;

use crate::{
    args::ArgValues,
    code::apply,
    env::Env,
    fault::{Fault, FaultKind, RunResult},
    value::Value,
};

/// `Relational` structure functions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, strum::Display, strum::EnumIter)]
#[strum(serialize_all = "camelCase")]
pub(crate) enum RelationalFunctions {
    Compare,
    Count,
    Empty,
    Iterate,
    Max,
    Min,
    NonEmpty,
    Only,
    Sum,
}

impl RelationalFunctions {
    pub fn arity(self) -> usize {
        match self {
            Self::Compare | Self::Iterate => 2,
            _ => 1,
        }
    }

    pub fn curried(self) -> bool {
        matches!(self, Self::Iterate)
    }
}

pub(crate) fn call(env: &Env, function: RelationalFunctions, args: ArgValues) -> RunResult<Value> {
    match function {
        RelationalFunctions::Compare => relational_compare(args),
        RelationalFunctions::Count => {
            let rows = args.one("Relational.count")?;
            Ok(Value::Int(super::list_mod::length_of(&rows)?))
        }
        RelationalFunctions::Empty => {
            let rows = args.one("Relational.empty")?;
            Ok(Value::Bool(rows.as_list()?.is_empty()))
        }
        RelationalFunctions::NonEmpty => {
            let rows = args.one("Relational.nonEmpty")?;
            Ok(Value::Bool(!rows.as_list()?.is_empty()))
        }
        RelationalFunctions::Iterate => relational_iterate(env, args),
        RelationalFunctions::Max => relational_extreme(args, Ordering::Greater),
        RelationalFunctions::Min => relational_extreme(args, Ordering::Less),
        RelationalFunctions::Only => relational_only(args),
        RelationalFunctions::Sum => relational_sum(args),
    }
}

/// Implementation of `Relational.compare`: the natural ordering as an
/// `order` value; nan raises `Unordered`. A frontend type refinement, when
/// present, does not change the verdict, only the plan rendering.
fn relational_compare(args: ArgValues) -> RunResult<Value> {
    let (a, b) = args.two("Relational.compare")?;
    match a.compare(&b) {
        Some(ordering) => Ok(Value::order(ordering)),
        None => Err(Fault::new(FaultKind::Unordered).into()),
    }
}

/// Implementation of `Relational.sum`: dispatches on the element type.
/// An empty relation sums to `0`.
fn relational_sum(args: ArgValues) -> RunResult<Value> {
    let rows = args.one("Relational.sum")?;
    let items = rows.as_list()?;
    match items.first() {
        None => Ok(Value::Int(0)),
        Some(Value::Real(_)) => {
            let mut total = 0.0f32;
            for item in items {
                total += item.as_real()?;
            }
            Ok(Value::Real(total))
        }
        Some(_) => {
            let mut total = 0i32;
            for item in items {
                total = total
                    .checked_add(item.as_int()?)
                    .ok_or(Fault::new(FaultKind::Overflow))?;
            }
            Ok(Value::Int(total))
        }
    }
}

/// Implementation of `Relational.min` / `max` over the natural ordering;
/// `Empty` on an empty relation, `Unordered` when nan gets involved.
fn relational_extreme(args: ArgValues, keep: Ordering) -> RunResult<Value> {
    let rows = args.one("Relational.min")?;
    let items = rows.as_list()?;
    let mut best = items.first().cloned().ok_or(Fault::new(FaultKind::Empty))?;
    for item in &items[1..] {
        match item.compare(&best) {
            Some(ordering) if ordering == keep => best = item.clone(),
            Some(_) => {}
            None => return Err(Fault::new(FaultKind::Unordered).into()),
        }
    }
    Ok(best)
}

/// Implementation of `Relational.only`: the sole element of a singleton
/// relation; `Empty` on none, `Size` on more than one.
fn relational_only(args: ArgValues) -> RunResult<Value> {
    let rows = args.one("Relational.only")?;
    match rows.as_list()? {
        [] => Err(Fault::new(FaultKind::Empty).into()),
        [only] => Ok(only.clone()),
        _ => Err(Fault::new(FaultKind::Size).into()),
    }
}

/// Implementation of `Relational.iterate initial update`: repeatedly extends
/// the relation with `update (all, newest)` until a step adds nothing.
fn relational_iterate(env: &Env, args: ArgValues) -> RunResult<Value> {
    let (initial, update) = args.two("Relational.iterate")?;
    let mut total = initial.as_list()?.to_vec();
    let mut recent = total.clone();
    while !recent.is_empty() {
        let more = apply(
            env,
            &update,
            Value::tuple(vec![Value::list(total.clone()), Value::list(recent)]),
        )?;
        let more = more.as_list()?.to_vec();
        if more.is_empty() {
            break;
        }
        total.extend(more.iter().cloned());
        recent = more;
    }
    Ok(Value::list(total))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fault::RunError;

    fn ints(values: &[i32]) -> Value {
        Value::list(values.iter().map(|&n| Value::Int(n)).collect())
    }

    fn run(function: RelationalFunctions, values: Vec<Value>) -> RunResult<Value> {
        call(&Env::empty(), function, values.into_iter().collect())
    }

    #[test]
    fn sum_dispatches_on_element_type() {
        assert_eq!(run(RelationalFunctions::Sum, vec![ints(&[1, 2, 3])]).unwrap(), Value::Int(6));
        let reals = Value::list(vec![Value::Real(1.5), Value::Real(2.0)]);
        assert_eq!(run(RelationalFunctions::Sum, vec![reals]).unwrap(), Value::Real(3.5));
        assert_eq!(run(RelationalFunctions::Sum, vec![ints(&[])]).unwrap(), Value::Int(0));
        assert!(run(RelationalFunctions::Sum, vec![ints(&[i32::MAX, 1])]).is_err());
    }

    #[test]
    fn only_checks_cardinality() {
        assert_eq!(run(RelationalFunctions::Only, vec![ints(&[9])]).unwrap(), Value::Int(9));
        assert_eq!(
            run(RelationalFunctions::Only, vec![ints(&[])]).unwrap_err(),
            RunError::Fault(Fault::new(FaultKind::Empty))
        );
        assert_eq!(
            run(RelationalFunctions::Only, vec![ints(&[1, 2])]).unwrap_err(),
            RunError::Fault(Fault::new(FaultKind::Size))
        );
    }

    #[test]
    fn min_and_max_use_natural_ordering() {
        assert_eq!(run(RelationalFunctions::Min, vec![ints(&[3, 1, 2])]).unwrap(), Value::Int(1));
        assert_eq!(run(RelationalFunctions::Max, vec![ints(&[3, 1, 2])]).unwrap(), Value::Int(3));
        assert!(run(RelationalFunctions::Min, vec![ints(&[])]).is_err());
    }
}
