//! Implementation of the `Bag` structure.
//!
//! Bags are multisets. The representation is the same sequence as lists and
//! evaluation visits elements in insertion order (`fold` is a left fold), but
//! no operation's contract promises an order; callers must not rely on it.

use crate::{
    args::ArgValues,
    env::Env,
    fault::{Fault, FaultKind, RunResult},
    value::Value,
};

/// `Bag` structure functions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, strum::Display, strum::EnumIter)]
#[strum(serialize_all = "camelCase")]
pub(crate) enum BagFunctions {
    All,
    App,
    Concat,
    Drop,
    Except,
    Exists,
    Filter,
    Find,
    Fold,
    FromList,
    GetItem,
    Hd,
    Intersect,
    Length,
    Map,
    MapPartial,
    Null,
    Partition,
    Tabulate,
    Take,
    Tl,
    ToList,
    Union,
}

impl BagFunctions {
    pub fn arity(self) -> usize {
        match self {
            Self::Fold => 3,
            Self::All
            | Self::App
            | Self::Drop
            | Self::Except
            | Self::Exists
            | Self::Filter
            | Self::Find
            | Self::Intersect
            | Self::Map
            | Self::MapPartial
            | Self::Partition
            | Self::Tabulate
            | Self::Take
            | Self::Union => 2,
            _ => 1,
        }
    }

    pub fn curried(self) -> bool {
        matches!(
            self,
            Self::All
                | Self::App
                | Self::Exists
                | Self::Filter
                | Self::Find
                | Self::Fold
                | Self::Map
                | Self::MapPartial
                | Self::Partition
        )
    }
}

/// Bags reuse the list implementations; only `fold` and `union` have a bag
/// spelling of their own.
pub(crate) fn call(env: &Env, function: BagFunctions, args: ArgValues) -> RunResult<Value> {
    use super::list_mod::{self, ListFunctions};
    match function {
        BagFunctions::All => list_mod::call(env, ListFunctions::All, args),
        BagFunctions::App => list_mod::call(env, ListFunctions::App, args),
        BagFunctions::Concat => list_mod::call(env, ListFunctions::Concat, args),
        BagFunctions::Drop => list_mod::call(env, ListFunctions::Drop, args),
        BagFunctions::Except => list_mod::call(env, ListFunctions::Except, args),
        BagFunctions::Exists => list_mod::call(env, ListFunctions::Exists, args),
        BagFunctions::Filter => list_mod::call(env, ListFunctions::Filter, args),
        BagFunctions::Find => list_mod::call(env, ListFunctions::Find, args),
        // Unordered fold; the left fold is the chosen evaluation order.
        BagFunctions::Fold => list_mod::call(env, ListFunctions::Foldl, args),
        BagFunctions::FromList | BagFunctions::ToList => args.one("Bag.fromList"),
        BagFunctions::GetItem => list_mod::call(env, ListFunctions::GetItem, args),
        BagFunctions::Hd => bag_hd(args),
        BagFunctions::Intersect => list_mod::call(env, ListFunctions::Intersect, args),
        BagFunctions::Length => list_mod::call(env, ListFunctions::Length, args),
        BagFunctions::Map => list_mod::call(env, ListFunctions::Map, args),
        BagFunctions::MapPartial => list_mod::call(env, ListFunctions::MapPartial, args),
        BagFunctions::Null => list_mod::call(env, ListFunctions::Null, args),
        BagFunctions::Partition => list_mod::call(env, ListFunctions::Partition, args),
        BagFunctions::Tabulate => list_mod::call(env, ListFunctions::Tabulate, args),
        BagFunctions::Take => list_mod::call(env, ListFunctions::Take, args),
        BagFunctions::Tl => bag_tl(args),
        BagFunctions::Union => bag_union(args),
    }
}

fn bag_hd(args: ArgValues) -> RunResult<Value> {
    let bag = args.one("Bag.hd")?;
    bag.as_list()?
        .first()
        .cloned()
        .ok_or_else(|| Fault::new(FaultKind::Empty).into())
}

fn bag_tl(args: ArgValues) -> RunResult<Value> {
    let bag = args.one("Bag.tl")?;
    match bag.as_list()? {
        [] => Err(Fault::new(FaultKind::Empty).into()),
        [_, rest @ ..] => Ok(Value::List(rest.into())),
    }
}

/// Implementation of `Bag.union (b1, b2)`: multiset union, i.e. the elements
/// of both bags.
fn bag_union(args: ArgValues) -> RunResult<Value> {
    let (a, b) = args.two("Bag.union")?;
    let mut out = a.as_list()?.to_vec();
    out.extend_from_slice(b.as_list()?);
    Ok(Value::list(out))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ints(values: &[i32]) -> Value {
        Value::list(values.iter().map(|&n| Value::Int(n)).collect())
    }

    #[test]
    fn union_keeps_duplicates() {
        let args: ArgValues = vec![ints(&[1, 2]), ints(&[2, 3])].into_iter().collect();
        let out = call(&Env::empty(), BagFunctions::Union, args).unwrap();
        assert_eq!(out, ints(&[1, 2, 2, 3]));
    }

    #[test]
    fn from_list_and_to_list_share_the_representation() {
        let args: ArgValues = vec![ints(&[3, 1])].into_iter().collect();
        let bag = call(&Env::empty(), BagFunctions::FromList, args).unwrap();
        assert_eq!(bag, ints(&[3, 1]));
    }
}
