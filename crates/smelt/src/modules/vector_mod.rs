//! Implementation of the `Vector` structure.
//!
//! Vectors share the list representation; they differ in the indexed
//! operation family (`sub`, `update`, `appi`, `foldli`, ...) and the
//! `maxLen` bound. `update` is persistent: it returns a fresh vector.

use std::cmp::Ordering;

use crate::{
    args::ArgValues,
    code::apply,
    env::Env,
    fault::{Fault, FaultKind, RunError, RunResult},
    value::Value,
};

/// Largest representable vector length.
const MAX_LEN: i32 = (1 << 24) - 1;

/// `Vector` structure functions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, strum::Display, strum::EnumIter)]
#[strum(serialize_all = "camelCase")]
pub(crate) enum VectorFunctions {
    All,
    App,
    Appi,
    Collate,
    Concat,
    Exists,
    Find,
    Findi,
    Foldl,
    Foldli,
    Foldr,
    Foldri,
    FromList,
    Length,
    Map,
    Mapi,
    Sub,
    Tabulate,
    Update,
}

impl VectorFunctions {
    pub fn arity(self) -> usize {
        match self {
            Self::Foldl | Self::Foldli | Self::Foldr | Self::Foldri | Self::Update => 3,
            Self::All
            | Self::App
            | Self::Appi
            | Self::Collate
            | Self::Exists
            | Self::Find
            | Self::Findi
            | Self::Map
            | Self::Mapi
            | Self::Sub
            | Self::Tabulate => 2,
            _ => 1,
        }
    }

    pub fn curried(self) -> bool {
        matches!(
            self,
            Self::All
                | Self::App
                | Self::Appi
                | Self::Collate
                | Self::Exists
                | Self::Find
                | Self::Findi
                | Self::Foldl
                | Self::Foldli
                | Self::Foldr
                | Self::Foldri
                | Self::Map
                | Self::Mapi
        )
    }

    pub fn global_alias(self) -> Option<&'static str> {
        match self {
            Self::FromList => Some("vector"),
            _ => None,
        }
    }
}

/// `Vector` structure constants.
pub(crate) fn constants() -> Vec<(&'static str, Value)> {
    vec![("maxLen", Value::Int(MAX_LEN))]
}

pub(crate) fn call(env: &Env, function: VectorFunctions, args: ArgValues) -> RunResult<Value> {
    match function {
        VectorFunctions::All => quantifier(env, args, true),
        VectorFunctions::Exists => quantifier(env, args, false),
        VectorFunctions::App => vector_app(env, args, false),
        VectorFunctions::Appi => vector_app(env, args, true),
        VectorFunctions::Collate => vector_collate(env, args),
        VectorFunctions::Concat => vector_concat(args),
        VectorFunctions::Find => vector_find(env, args, false),
        VectorFunctions::Findi => vector_find(env, args, true),
        VectorFunctions::Foldl => vector_fold(env, args, true, false),
        VectorFunctions::Foldli => vector_fold(env, args, true, true),
        VectorFunctions::Foldr => vector_fold(env, args, false, false),
        VectorFunctions::Foldri => vector_fold(env, args, false, true),
        VectorFunctions::FromList => vector_from_list(args),
        VectorFunctions::Length => {
            let vector = args.one("Vector.length")?;
            Ok(Value::Int(super::list_mod::length_of(&vector)?))
        }
        VectorFunctions::Map => vector_map(env, args, false),
        VectorFunctions::Mapi => vector_map(env, args, true),
        VectorFunctions::Sub => vector_sub(args),
        VectorFunctions::Tabulate => vector_tabulate(env, args),
        VectorFunctions::Update => vector_update(args),
    }
}

fn index_value(i: usize) -> Value {
    Value::Int(i32::try_from(i).expect("vector fits maxLen"))
}

/// Implementation of `Vector.fromList l`: `Size` when the list is longer
/// than `maxLen`.
fn vector_from_list(args: ArgValues) -> RunResult<Value> {
    let list = args.one("Vector.fromList")?;
    if list.as_list()?.len() > usize::try_from(MAX_LEN).expect("maxLen is positive") {
        return Err(Fault::new(FaultKind::Size).into());
    }
    Ok(list)
}

/// Implementation of `Vector.sub (v, i)`.
fn vector_sub(args: ArgValues) -> RunResult<Value> {
    let (vector, i) = args.two("Vector.sub")?;
    let index = usize::try_from(i.as_int()?).map_err(|_| Fault::new(FaultKind::Subscript))?;
    vector
        .as_list()?
        .get(index)
        .cloned()
        .ok_or_else(|| Fault::new(FaultKind::Subscript).into())
}

/// Implementation of `Vector.update (v, i, x)`: a fresh vector with slot `i`
/// replaced; `Subscript` out of bounds (including `i = length v`).
fn vector_update(args: ArgValues) -> RunResult<Value> {
    let (vector, i, x) = args.three("Vector.update")?;
    let items = vector.as_list()?;
    let index = usize::try_from(i.as_int()?).map_err(|_| Fault::new(FaultKind::Subscript))?;
    if index >= items.len() {
        return Err(Fault::new(FaultKind::Subscript).into());
    }
    let mut out = items.to_vec();
    out[index] = x;
    Ok(Value::list(out))
}

/// Implementation of `Vector.tabulate (n, f)`: `Size` when `n < 0` or
/// `n > maxLen`.
fn vector_tabulate(env: &Env, args: ArgValues) -> RunResult<Value> {
    let (n, f) = args.two("Vector.tabulate")?;
    let n = n.as_int()?;
    if n < 0 || n > MAX_LEN {
        return Err(Fault::new(FaultKind::Size).into());
    }
    let mut out = Vec::with_capacity(usize::try_from(n).expect("bounded by maxLen"));
    for i in 0..n {
        out.push(apply(env, &f, Value::Int(i))?);
    }
    Ok(Value::list(out))
}

fn vector_concat(args: ArgValues) -> RunResult<Value> {
    let vectors = args.one("Vector.concat")?;
    let mut out = Vec::new();
    for vector in vectors.as_list()? {
        out.extend_from_slice(vector.as_list()?);
        if out.len() > usize::try_from(MAX_LEN).expect("maxLen is positive") {
            return Err(Fault::new(FaultKind::Size).into());
        }
    }
    Ok(Value::list(out))
}

fn quantifier(env: &Env, args: ArgValues, all: bool) -> RunResult<Value> {
    let (f, vector) = args.two("Vector.all")?;
    for item in vector.as_list()? {
        let holds = apply(env, &f, item.clone())?.as_bool()?;
        if all && !holds {
            return Ok(Value::Bool(false));
        }
        if !all && holds {
            return Ok(Value::Bool(true));
        }
    }
    Ok(Value::Bool(all))
}

/// `app` applies `f` to elements; `appi` to `(i, x)` pairs.
fn vector_app(env: &Env, args: ArgValues, indexed: bool) -> RunResult<Value> {
    let (f, vector) = args.two("Vector.app")?;
    for (i, item) in vector.as_list()?.iter().enumerate() {
        let arg = if indexed {
            Value::tuple(vec![index_value(i), item.clone()])
        } else {
            item.clone()
        };
        apply(env, &f, arg)?;
    }
    Ok(Value::Unit)
}

fn vector_map(env: &Env, args: ArgValues, indexed: bool) -> RunResult<Value> {
    let (f, vector) = args.two("Vector.map")?;
    let mut out = Vec::new();
    for (i, item) in vector.as_list()?.iter().enumerate() {
        let arg = if indexed {
            Value::tuple(vec![index_value(i), item.clone()])
        } else {
            item.clone()
        };
        out.push(apply(env, &f, arg)?);
    }
    Ok(Value::list(out))
}

/// `find` yields `SOME x`; `findi` yields `SOME (i, x)`.
fn vector_find(env: &Env, args: ArgValues, indexed: bool) -> RunResult<Value> {
    let (f, vector) = args.two("Vector.find")?;
    for (i, item) in vector.as_list()?.iter().enumerate() {
        let candidate = if indexed {
            Value::tuple(vec![index_value(i), item.clone()])
        } else {
            item.clone()
        };
        if apply(env, &f, candidate.clone())?.as_bool()? {
            return Ok(Value::some(candidate));
        }
    }
    Ok(Value::none())
}

/// Plain folds receive `(x, acc)`; indexed folds receive `(i, x, acc)`.
fn vector_fold(env: &Env, args: ArgValues, left: bool, indexed: bool) -> RunResult<Value> {
    let (f, init, vector) = args.three("Vector.foldl")?;
    let items = vector.as_list()?.to_vec();
    let mut acc = init;
    let order: Vec<usize> = if left {
        (0..items.len()).collect()
    } else {
        (0..items.len()).rev().collect()
    };
    for i in order {
        let arg = if indexed {
            Value::tuple(vec![index_value(i), items[i].clone(), acc])
        } else {
            Value::tuple(vec![items[i].clone(), acc])
        };
        acc = apply(env, &f, arg)?;
    }
    Ok(acc)
}

fn vector_collate(env: &Env, args: ArgValues) -> RunResult<Value> {
    let (f, pair) = args.two("Vector.collate")?;
    let [a, b] = pair.as_tuple()? else {
        return Err(RunError::assert("Vector.collate expects a pair of vectors"));
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
