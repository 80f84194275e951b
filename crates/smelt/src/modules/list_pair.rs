//! Implementation of the `ListPair` structure.
//!
//! Non-`Eq` operations zip to the shorter list; the `*Eq` variants fault
//! with `UnequalLengths` when the lists differ in size.

use crate::{
    args::ArgValues,
    code::apply,
    env::Env,
    fault::{Fault, FaultKind, RunError, RunResult},
    value::Value,
};

/// `ListPair` structure functions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, strum::Display, strum::EnumIter)]
#[strum(serialize_all = "camelCase")]
pub(crate) enum ListPairFunctions {
    All,
    AllEq,
    App,
    AppEq,
    Exists,
    Foldl,
    FoldlEq,
    Foldr,
    FoldrEq,
    Map,
    MapEq,
    Unzip,
    Zip,
    ZipEq,
}

impl ListPairFunctions {
    pub fn arity(self) -> usize {
        match self {
            Self::Foldl | Self::FoldlEq | Self::Foldr | Self::FoldrEq => 3,
            Self::Unzip => 1,
            _ => 2,
        }
    }

    pub fn curried(self) -> bool {
        !matches!(self, Self::Unzip | Self::Zip | Self::ZipEq)
    }
}

pub(crate) fn call(env: &Env, function: ListPairFunctions, args: ArgValues) -> RunResult<Value> {
    match function {
        ListPairFunctions::All => pair_quantifier(env, args, true, false),
        ListPairFunctions::AllEq => pair_quantifier(env, args, true, true),
        ListPairFunctions::Exists => pair_quantifier(env, args, false, false),
        ListPairFunctions::App => pair_app(env, args, false),
        ListPairFunctions::AppEq => pair_app(env, args, true),
        ListPairFunctions::Map => pair_map(env, args, false),
        ListPairFunctions::MapEq => pair_map(env, args, true),
        ListPairFunctions::Foldl => pair_fold(env, args, true, false),
        ListPairFunctions::FoldlEq => pair_fold(env, args, true, true),
        ListPairFunctions::Foldr => pair_fold(env, args, false, false),
        ListPairFunctions::FoldrEq => pair_fold(env, args, false, true),
        ListPairFunctions::Unzip => pair_unzip(args),
        ListPairFunctions::Zip => pair_zip(args, false),
        ListPairFunctions::ZipEq => pair_zip(args, true),
    }
}

/// Splits a `(l1, l2)` argument, applying the length policy: `Eq` variants
/// require equal lengths, the others truncate to the shorter list.
fn split_pair(pair: &Value, strict: bool) -> RunResult<(Vec<Value>, Vec<Value>)> {
    let [a, b] = pair.as_tuple()? else {
        return Err(RunError::assert("ListPair expects a pair of lists"));
    };
    let a = a.as_list()?;
    let b = b.as_list()?;
    if strict && a.len() != b.len() {
        return Err(Fault::new(FaultKind::UnequalLengths).into());
    }
    let len = a.len().min(b.len());
    Ok((a[..len].to_vec(), b[..len].to_vec()))
}

fn pair_zip(args: ArgValues, strict: bool) -> RunResult<Value> {
    let pair = {
        let (a, b) = args.two("ListPair.zip")?;
        Value::tuple(vec![a, b])
    };
    let (xs, ys) = split_pair(&pair, strict)?;
    let out = xs
        .into_iter()
        .zip(ys)
        .map(|(x, y)| Value::tuple(vec![x, y]))
        .collect();
    Ok(Value::list(out))
}

fn pair_unzip(args: ArgValues) -> RunResult<Value> {
    let list = args.one("ListPair.unzip")?;
    let mut xs = Vec::new();
    let mut ys = Vec::new();
    for item in list.as_list()? {
        let [x, y] = item.as_tuple()? else {
            return Err(RunError::assert("ListPair.unzip expects pairs"));
        };
        xs.push(x.clone());
        ys.push(y.clone());
    }
    Ok(Value::tuple(vec![Value::list(xs), Value::list(ys)]))
}

fn pair_app(env: &Env, args: ArgValues, strict: bool) -> RunResult<Value> {
    let (f, pair) = args.two("ListPair.app")?;
    let (xs, ys) = split_pair(&pair, strict)?;
    for (x, y) in xs.into_iter().zip(ys) {
        apply(env, &f, Value::tuple(vec![x, y]))?;
    }
    Ok(Value::Unit)
}

fn pair_map(env: &Env, args: ArgValues, strict: bool) -> RunResult<Value> {
    let (f, pair) = args.two("ListPair.map")?;
    let (xs, ys) = split_pair(&pair, strict)?;
    let mut out = Vec::with_capacity(xs.len());
    for (x, y) in xs.into_iter().zip(ys) {
        out.push(apply(env, &f, Value::tuple(vec![x, y]))?);
    }
    Ok(Value::list(out))
}

/// Folds receive `(x, y, acc)` triples.
fn pair_fold(env: &Env, args: ArgValues, left: bool, strict: bool) -> RunResult<Value> {
    let (f, init, pair) = args.three("ListPair.foldl")?;
    let (xs, ys) = split_pair(&pair, strict)?;
    let mut acc = init;
    let pairs: Vec<(Value, Value)> = xs.into_iter().zip(ys).collect();
    let iterate: Box<dyn Iterator<Item = &(Value, Value)>> = if left {
        Box::new(pairs.iter())
    } else {
        Box::new(pairs.iter().rev())
    };
    for (x, y) in iterate {
        acc = apply(env, &f, Value::tuple(vec![x.clone(), y.clone(), acc]))?;
    }
    Ok(acc)
}

fn pair_quantifier(env: &Env, args: ArgValues, all: bool, strict: bool) -> RunResult<Value> {
    let (f, pair) = args.two("ListPair.all")?;
    let (xs, ys) = split_pair(&pair, strict)?;
    for (x, y) in xs.into_iter().zip(ys) {
        let holds = apply(env, &f, Value::tuple(vec![x, y]))?.as_bool()?;
        if all && !holds {
            return Ok(Value::Bool(false));
        }
        if !all && holds {
            return Ok(Value::Bool(true));
        }
    }
    Ok(Value::Bool(all))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fault::RunError;

    fn ints(values: &[i32]) -> Value {
        Value::list(values.iter().map(|&n| Value::Int(n)).collect())
    }

    #[test]
    fn zip_truncates_and_zip_eq_faults() {
        let args: ArgValues = vec![ints(&[1, 2, 3]), ints(&[4, 5])].into_iter().collect();
        let zipped = call(&Env::empty(), ListPairFunctions::Zip, args).unwrap();
        assert_eq!(
            zipped,
            Value::list(vec![
                Value::tuple(vec![Value::Int(1), Value::Int(4)]),
                Value::tuple(vec![Value::Int(2), Value::Int(5)]),
            ])
        );

        let args: ArgValues = vec![ints(&[1, 2, 3]), ints(&[4, 5])].into_iter().collect();
        let err = call(&Env::empty(), ListPairFunctions::ZipEq, args).unwrap_err();
        assert_eq!(err, RunError::Fault(Fault::new(FaultKind::UnequalLengths)));
    }

    #[test]
    fn unzip_inverts_zip() {
        let zipped = Value::list(vec![
            Value::tuple(vec![Value::Int(1), Value::string("a")]),
            Value::tuple(vec![Value::Int(2), Value::string("b")]),
        ]);
        let args: ArgValues = vec![zipped].into_iter().collect();
        let unzipped = call(&Env::empty(), ListPairFunctions::Unzip, args).unwrap();
        assert_eq!(
            unzipped,
            Value::tuple(vec![ints(&[1, 2]), Value::list(vec![Value::string("a"), Value::string("b")])])
        );
    }
}
