//! Implementation of the `List` structure.
//!
//! Lists are immutable ordered sequences. `hd`/`tl`/`last` fault with
//! `Empty`, index arguments with `Subscript`, negative `tabulate` with
//! `Size`. Folds and mappers follow the basis conventions: `foldl f b l`
//! passes `(x, acc)` pairs, `mapi` passes `(i, x)` pairs.

use std::cmp::Ordering;

use crate::{
    args::ArgValues,
    code::apply,
    env::Env,
    fault::{Fault, FaultKind, RunResult},
    value::Value,
};

/// `List` structure functions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, strum::Display, strum::EnumIter)]
#[strum(serialize_all = "camelCase")]
pub(crate) enum ListFunctions {
    All,
    App,
    Collate,
    Concat,
    Drop,
    Except,
    Exists,
    Filter,
    Find,
    Foldl,
    Foldr,
    GetItem,
    Hd,
    Intersect,
    Last,
    Length,
    Map,
    MapPartial,
    Mapi,
    NotExists,
    Nth,
    Null,
    Partition,
    Rev,
    RevAppend,
    Tabulate,
    Take,
    Tl,
}

impl ListFunctions {
    pub fn arity(self) -> usize {
        match self {
            Self::Foldl | Self::Foldr => 3,
            Self::All
            | Self::App
            | Self::Collate
            | Self::Drop
            | Self::Except
            | Self::Exists
            | Self::Filter
            | Self::Find
            | Self::Intersect
            | Self::Map
            | Self::MapPartial
            | Self::Mapi
            | Self::NotExists
            | Self::Nth
            | Self::Partition
            | Self::RevAppend
            | Self::Tabulate
            | Self::Take => 2,
            _ => 1,
        }
    }

    pub fn curried(self) -> bool {
        matches!(
            self,
            Self::All
                | Self::App
                | Self::Collate
                | Self::Exists
                | Self::Filter
                | Self::Find
                | Self::Foldl
                | Self::Foldr
                | Self::Map
                | Self::MapPartial
                | Self::Mapi
                | Self::NotExists
                | Self::Partition
        )
    }

    pub fn global_alias(self) -> Option<&'static str> {
        match self {
            Self::App => Some("app"),
            Self::Foldl => Some("foldl"),
            Self::Foldr => Some("foldr"),
            Self::Hd => Some("hd"),
            Self::Length => Some("length"),
            Self::Map => Some("map"),
            Self::Null => Some("null"),
            Self::Rev => Some("rev"),
            Self::Tl => Some("tl"),
            _ => None,
        }
    }
}

pub(crate) fn call(env: &Env, function: ListFunctions, args: ArgValues) -> RunResult<Value> {
    match function {
        ListFunctions::All => list_quantifier(env, args, Quantifier::All),
        ListFunctions::Exists => list_quantifier(env, args, Quantifier::Exists),
        ListFunctions::NotExists => list_quantifier(env, args, Quantifier::NotExists),
        ListFunctions::App => list_app(env, args),
        ListFunctions::Collate => list_collate(env, args),
        ListFunctions::Concat => list_concat(args),
        ListFunctions::Drop => list_drop(args),
        ListFunctions::Take => list_take(args),
        ListFunctions::Except => list_difference(args, false),
        ListFunctions::Intersect => list_difference(args, true),
        ListFunctions::Filter => list_filter(env, args),
        ListFunctions::Find => list_find(env, args),
        ListFunctions::Foldl => list_fold(env, args, true),
        ListFunctions::Foldr => list_fold(env, args, false),
        ListFunctions::GetItem => list_get_item(args),
        ListFunctions::Hd => list_hd(args),
        ListFunctions::Tl => list_tl(args),
        ListFunctions::Last => list_last(args),
        ListFunctions::Length => {
            let list = args.one("List.length")?;
            Ok(Value::Int(length_of(&list)?))
        }
        ListFunctions::Map => list_map(env, args),
        ListFunctions::MapPartial => list_map_partial(env, args),
        ListFunctions::Mapi => list_mapi(env, args),
        ListFunctions::Nth => list_nth(args),
        ListFunctions::Null => {
            let list = args.one("List.null")?;
            Ok(Value::Bool(list.as_list()?.is_empty()))
        }
        ListFunctions::Partition => list_partition(env, args),
        ListFunctions::Rev => {
            let list = args.one("List.rev")?;
            let mut items = list.as_list()?.to_vec();
            items.reverse();
            Ok(Value::list(items))
        }
        ListFunctions::RevAppend => list_rev_append(args),
        ListFunctions::Tabulate => list_tabulate(env, args),
    }
}

pub(crate) fn length_of(list: &Value) -> RunResult<i32> {
    Ok(i32::try_from(list.as_list()?.len()).expect("list fits int"))
}

fn list_hd(args: ArgValues) -> RunResult<Value> {
    let list = args.one("List.hd")?;
    list.as_list()?
        .first()
        .cloned()
        .ok_or_else(|| Fault::new(FaultKind::Empty).into())
}

fn list_tl(args: ArgValues) -> RunResult<Value> {
    let list = args.one("List.tl")?;
    match list.as_list()? {
        [] => Err(Fault::new(FaultKind::Empty).into()),
        [_, rest @ ..] => Ok(Value::List(rest.into())),
    }
}

fn list_last(args: ArgValues) -> RunResult<Value> {
    let list = args.one("List.last")?;
    list.as_list()?
        .last()
        .cloned()
        .ok_or_else(|| Fault::new(FaultKind::Empty).into())
}

/// Implementation of `List.nth (l, i)`: `Subscript` out of range.
fn list_nth(args: ArgValues) -> RunResult<Value> {
    let (list, i) = args.two("List.nth")?;
    let index = usize::try_from(i.as_int()?).map_err(|_| Fault::new(FaultKind::Subscript))?;
    list.as_list()?
        .get(index)
        .cloned()
        .ok_or_else(|| Fault::new(FaultKind::Subscript).into())
}

/// Implementation of `List.take (l, i)`: the first `i` elements;
/// `take (l, length l)` is `l`, anything outside `0..=length` is
/// `Subscript`.
fn list_take(args: ArgValues) -> RunResult<Value> {
    let (list, i) = args.two("List.take")?;
    let items = list.as_list()?;
    let count = usize::try_from(i.as_int()?).map_err(|_| Fault::new(FaultKind::Subscript))?;
    if count > items.len() {
        return Err(Fault::new(FaultKind::Subscript).into());
    }
    Ok(Value::List(items[..count].into()))
}

/// Implementation of `List.drop (l, i)`.
fn list_drop(args: ArgValues) -> RunResult<Value> {
    let (list, i) = args.two("List.drop")?;
    let items = list.as_list()?;
    let count = usize::try_from(i.as_int()?).map_err(|_| Fault::new(FaultKind::Subscript))?;
    if count > items.len() {
        return Err(Fault::new(FaultKind::Subscript).into());
    }
    Ok(Value::List(items[count..].into()))
}

fn list_concat(args: ArgValues) -> RunResult<Value> {
    let lists = args.one("List.concat")?;
    let mut out = Vec::new();
    for list in lists.as_list()? {
        out.extend_from_slice(list.as_list()?);
    }
    Ok(Value::list(out))
}

fn list_rev_append(args: ArgValues) -> RunResult<Value> {
    let (a, b) = args.two("List.revAppend")?;
    let mut out: Vec<Value> = a.as_list()?.iter().rev().cloned().collect();
    out.extend_from_slice(b.as_list()?);
    Ok(Value::list(out))
}

/// Implementation of `List.except` / `intersect`: element membership by
/// structural equality.
fn list_difference(args: ArgValues, keep_members: bool) -> RunResult<Value> {
    let (a, b) = args.two("List.except")?;
    let reference = b.as_list()?;
    let out: Vec<Value> = a
        .as_list()?
        .iter()
        .filter(|x| reference.iter().any(|y| y == *x) == keep_members)
        .cloned()
        .collect();
    Ok(Value::list(out))
}

enum Quantifier {
    All,
    Exists,
    NotExists,
}

fn list_quantifier(env: &Env, args: ArgValues, quantifier: Quantifier) -> RunResult<Value> {
    let (f, list) = args.two("List.all")?;
    let mut any = false;
    for item in list.as_list()? {
        let holds = apply(env, &f, item.clone())?.as_bool()?;
        match quantifier {
            Quantifier::All if !holds => return Ok(Value::Bool(false)),
            _ if holds => {
                any = true;
                if matches!(quantifier, Quantifier::Exists) {
                    return Ok(Value::Bool(true));
                }
            }
            _ => {}
        }
    }
    Ok(Value::Bool(match quantifier {
        Quantifier::All => true,
        Quantifier::Exists => false,
        Quantifier::NotExists => !any,
    }))
}

fn list_app(env: &Env, args: ArgValues) -> RunResult<Value> {
    let (f, list) = args.two("List.app")?;
    for item in list.as_list()? {
        apply(env, &f, item.clone())?;
    }
    Ok(Value::Unit)
}

fn list_filter(env: &Env, args: ArgValues) -> RunResult<Value> {
    let (f, list) = args.two("List.filter")?;
    let mut out = Vec::new();
    for item in list.as_list()? {
        if apply(env, &f, item.clone())?.as_bool()? {
            out.push(item.clone());
        }
    }
    Ok(Value::list(out))
}

fn list_find(env: &Env, args: ArgValues) -> RunResult<Value> {
    let (f, list) = args.two("List.find")?;
    for item in list.as_list()? {
        if apply(env, &f, item.clone())?.as_bool()? {
            return Ok(Value::some(item.clone()));
        }
    }
    Ok(Value::none())
}

fn list_map(env: &Env, args: ArgValues) -> RunResult<Value> {
    let (f, list) = args.two("List.map")?;
    let mut out = Vec::new();
    for item in list.as_list()? {
        out.push(apply(env, &f, item.clone())?);
    }
    Ok(Value::list(out))
}

/// Implementation of `List.mapPartial f l`: keeps the `SOME` results.
fn list_map_partial(env: &Env, args: ArgValues) -> RunResult<Value> {
    let (f, list) = args.two("List.mapPartial")?;
    let mut out = Vec::new();
    for item in list.as_list()? {
        if let Some(mapped) = apply(env, &f, item.clone())?.to_option()? {
            out.push(mapped);
        }
    }
    Ok(Value::list(out))
}

/// Implementation of `List.mapi f l`: `f` receives `(i, x)` pairs.
fn list_mapi(env: &Env, args: ArgValues) -> RunResult<Value> {
    let (f, list) = args.two("List.mapi")?;
    let mut out = Vec::new();
    for (i, item) in list.as_list()?.iter().enumerate() {
        let pair = Value::tuple(vec![Value::Int(i32::try_from(i).expect("list fits int")), item.clone()]);
        out.push(apply(env, &f, pair)?);
    }
    Ok(Value::list(out))
}

/// Implementation of `List.foldl f b l` / `foldr`: `f` receives `(x, acc)`
/// pairs.
fn list_fold(env: &Env, args: ArgValues, left: bool) -> RunResult<Value> {
    let (f, init, list) = args.three("List.foldl")?;
    let items = list.as_list()?;
    let mut acc = init;
    if left {
        for item in items {
            acc = apply(env, &f, Value::tuple(vec![item.clone(), acc]))?;
        }
    } else {
        for item in items.iter().rev() {
            acc = apply(env, &f, Value::tuple(vec![item.clone(), acc]))?;
        }
    }
    Ok(acc)
}

fn list_partition(env: &Env, args: ArgValues) -> RunResult<Value> {
    let (f, list) = args.two("List.partition")?;
    let mut yes = Vec::new();
    let mut no = Vec::new();
    for item in list.as_list()? {
        if apply(env, &f, item.clone())?.as_bool()? {
            yes.push(item.clone());
        } else {
            no.push(item.clone());
        }
    }
    Ok(Value::tuple(vec![Value::list(yes), Value::list(no)]))
}

/// Implementation of `List.getItem`: `NONE` on nil, `SOME (hd, tl)`
/// otherwise.
fn list_get_item(args: ArgValues) -> RunResult<Value> {
    let list = args.one("List.getItem")?;
    match list.as_list()? {
        [] => Ok(Value::none()),
        [first, rest @ ..] => Ok(Value::some(Value::tuple(vec![first.clone(), Value::List(rest.into())]))),
    }
}

/// Implementation of `List.collate f (l1, l2)`: lexicographic order by the
/// user comparator.
fn list_collate(env: &Env, args: ArgValues) -> RunResult<Value> {
    let (f, pair) = args.two("List.collate")?;
    let [a, b] = pair.as_tuple()? else {
        return Err(crate::fault::RunError::assert("List.collate expects a pair of lists"));
    };
    let a = a.as_list()?;
    let b = b.as_list()?;
    for (x, y) in a.iter().zip(b.iter()) {
        let verdict = apply(env, &f, Value::tuple(vec![x.clone(), y.clone()]))?.to_ordering()?;
        if verdict != Ordering::Equal {
            return Ok(Value::order(verdict));
        }
    }
    Ok(Value::order(a.len().cmp(&b.len())))
}

/// Implementation of `List.tabulate (n, f)`: `Size` when `n < 0`.
fn list_tabulate(env: &Env, args: ArgValues) -> RunResult<Value> {
    let (n, f) = args.two("List.tabulate")?;
    let count = usize::try_from(n.as_int()?).map_err(|_| Fault::new(FaultKind::Size))?;
    let mut out = Vec::with_capacity(count);
    for i in 0..count {
        out.push(apply(env, &f, Value::Int(i32::try_from(i).expect("count fits int")))?);
    }
    Ok(Value::list(out))
}
