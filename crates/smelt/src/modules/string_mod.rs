//! Implementation of the `String` structure.
//!
//! Strings are immutable sequences of chars 0..=255; all indexing is in
//! character positions. Index arguments fault with `Subscript`, oversized
//! results with `Size`.

use crate::{
    args::ArgValues,
    code::apply,
    env::Env,
    fault::{Fault, FaultKind, RunError, RunResult},
    value::Value,
};

/// `String` structure functions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, strum::Display, strum::EnumIter)]
#[strum(serialize_all = "camelCase")]
pub(crate) enum StrFunctions {
    Concat,
    ConcatWith,
    Explode,
    Extract,
    Fields,
    Implode,
    IsPrefix,
    IsSubstring,
    IsSuffix,
    Map,
    Size,
    Str,
    Sub,
    Substring,
    Tokens,
    Translate,
}

impl StrFunctions {
    pub fn arity(self) -> usize {
        match self {
            Self::Extract | Self::Substring => 3,
            Self::ConcatWith
            | Self::Fields
            | Self::IsPrefix
            | Self::IsSubstring
            | Self::IsSuffix
            | Self::Map
            | Self::Sub
            | Self::Tokens
            | Self::Translate => 2,
            _ => 1,
        }
    }

    pub fn curried(self) -> bool {
        matches!(
            self,
            Self::ConcatWith
                | Self::Fields
                | Self::IsPrefix
                | Self::IsSubstring
                | Self::IsSuffix
                | Self::Map
                | Self::Tokens
                | Self::Translate
        )
    }

    pub fn global_alias(self) -> Option<&'static str> {
        match self {
            Self::Concat => Some("concat"),
            Self::Explode => Some("explode"),
            Self::Implode => Some("implode"),
            Self::Size => Some("size"),
            Self::Str => Some("str"),
            Self::Substring => Some("substring"),
            _ => None,
        }
    }
}

/// `String` structure constants.
pub(crate) fn constants() -> Vec<(&'static str, Value)> {
    vec![("maxSize", Value::Int(i32::MAX))]
}

pub(crate) fn call(env: &Env, function: StrFunctions, args: ArgValues) -> RunResult<Value> {
    match function {
        StrFunctions::Concat => string_concat(args),
        StrFunctions::ConcatWith => string_concat_with(args),
        StrFunctions::Explode => string_explode(args),
        StrFunctions::Extract => string_extract(args),
        StrFunctions::Fields => string_split(env, args, true),
        StrFunctions::Tokens => string_split(env, args, false),
        StrFunctions::Implode => string_implode(args),
        StrFunctions::IsPrefix => string_affix(args, Affix::Prefix),
        StrFunctions::IsSubstring => string_affix(args, Affix::Substring),
        StrFunctions::IsSuffix => string_affix(args, Affix::Suffix),
        StrFunctions::Map => string_map(env, args),
        StrFunctions::Size => {
            let s = args.one("String.size")?;
            let len = s.as_str()?.chars().count();
            Ok(Value::Int(i32::try_from(len).expect("string fits maxSize")))
        }
        StrFunctions::Str => {
            let c = args.one("String.str")?.as_char()?;
            Ok(Value::string((c as char).to_string()))
        }
        StrFunctions::Sub => string_sub(args),
        StrFunctions::Substring => string_substring(args),
        StrFunctions::Translate => string_translate(env, args),
    }
}

/// Reads a string character back into the 0..=255 char domain.
fn to_char(c: char) -> RunResult<u8> {
    u8::try_from(u32::from(c)).map_err(|_| RunError::assert("string character out of char range"))
}

fn size_checked(len: usize) -> RunResult<()> {
    if i32::try_from(len).is_ok() {
        Ok(())
    } else {
        Err(Fault::new(FaultKind::Size).into())
    }
}

/// Implementation of `String.concat`: `Size` when the result would exceed
/// `maxSize`.
fn string_concat(args: ArgValues) -> RunResult<Value> {
    let list = args.one("String.concat")?;
    let mut out = String::new();
    for item in list.as_list()? {
        out.push_str(item.as_str()?);
        size_checked(out.len())?;
    }
    Ok(Value::string(out))
}

/// Implementation of `String.concatWith sep l`.
fn string_concat_with(args: ArgValues) -> RunResult<Value> {
    let (sep, list) = args.two("String.concatWith")?;
    let sep = sep.as_str()?;
    let mut out = String::new();
    for (i, item) in list.as_list()?.iter().enumerate() {
        if i > 0 {
            out.push_str(sep);
        }
        out.push_str(item.as_str()?);
        size_checked(out.len())?;
    }
    Ok(Value::string(out))
}

fn string_explode(args: ArgValues) -> RunResult<Value> {
    let s = args.one("String.explode")?;
    let chars = s
        .as_str()?
        .chars()
        .map(|c| to_char(c).map(Value::Char))
        .collect::<RunResult<Vec<_>>>()?;
    Ok(Value::list(chars))
}

fn string_implode(args: ArgValues) -> RunResult<Value> {
    let list = args.one("String.implode")?;
    let mut out = String::new();
    for item in list.as_list()? {
        out.push(item.as_char()? as char);
    }
    Ok(Value::string(out))
}

/// Implementation of `String.sub (s, i)`: `Subscript` out of bounds.
fn string_sub(args: ArgValues) -> RunResult<Value> {
    let (s, i) = args.two("String.sub")?;
    let index = usize::try_from(i.as_int()?).map_err(|_| Fault::new(FaultKind::Subscript))?;
    match s.as_str()?.chars().nth(index) {
        Some(c) => Ok(Value::Char(to_char(c)?)),
        None => Err(Fault::new(FaultKind::Subscript).into()),
    }
}

/// Implementation of `String.substring (s, i, j)`: the `j` characters
/// starting at `i`; `Subscript` when `i < 0`, `j < 0` or `i + j > size s`.
fn string_substring(args: ArgValues) -> RunResult<Value> {
    let (s, i, j) = args.three("String.substring")?;
    slice_checked(s.as_str()?, i.as_int()?, Some(j.as_int()?))
}

/// Implementation of `String.extract (s, i, jOpt)`: the suffix from `i`
/// (which requires `i <= size s`), or `substring` semantics with a length.
fn string_extract(args: ArgValues) -> RunResult<Value> {
    let (s, i, j) = args.three("String.extract")?;
    let len = match j.to_option()? {
        None => None,
        Some(len) => Some(len.as_int()?),
    };
    slice_checked(s.as_str()?, i.as_int()?, len)
}

fn slice_checked(s: &str, i: i32, j: Option<i32>) -> RunResult<Value> {
    let start = usize::try_from(i).map_err(|_| Fault::new(FaultKind::Subscript))?;
    let total = s.chars().count();
    let len = match j {
        None => total.checked_sub(start).ok_or(Fault::new(FaultKind::Subscript))?,
        Some(len) => usize::try_from(len).map_err(|_| Fault::new(FaultKind::Subscript))?,
    };
    if start.checked_add(len).is_none_or(|end| end > total) {
        return Err(Fault::new(FaultKind::Subscript).into());
    }
    Ok(Value::string(s.chars().skip(start).take(len).collect::<String>()))
}

enum Affix {
    Prefix,
    Substring,
    Suffix,
}

/// Implementation of `String.isPrefix` / `isSubstring` / `isSuffix`, all
/// curried `needle -> haystack`.
fn string_affix(args: ArgValues, affix: Affix) -> RunResult<Value> {
    let (needle, haystack) = args.two("String.isPrefix")?;
    let needle = needle.as_str()?;
    let haystack = haystack.as_str()?;
    let found = match affix {
        Affix::Prefix => haystack.starts_with(needle),
        Affix::Substring => haystack.contains(needle),
        Affix::Suffix => haystack.ends_with(needle),
    };
    Ok(Value::Bool(found))
}

/// Implementation of `String.fields` / `tokens`: split on delimiter
/// characters chosen by the predicate. Fields keeps empty pieces, tokens
/// drops them.
fn string_split(env: &Env, args: ArgValues, keep_empty: bool) -> RunResult<Value> {
    let (pred, s) = args.two("String.fields")?;
    let mut pieces = Vec::new();
    let mut current = String::new();
    for c in s.as_str()?.chars() {
        if apply(env, &pred, Value::Char(to_char(c)?))?.as_bool()? {
            if keep_empty || !current.is_empty() {
                pieces.push(Value::string(std::mem::take(&mut current)));
            }
            current.clear();
        } else {
            current.push(c);
        }
    }
    if keep_empty || !current.is_empty() {
        pieces.push(Value::string(current));
    }
    Ok(Value::list(pieces))
}

/// Implementation of `String.map f s`: `f` maps char to char.
fn string_map(env: &Env, args: ArgValues) -> RunResult<Value> {
    let (f, s) = args.two("String.map")?;
    let mut out = String::new();
    for c in s.as_str()?.chars() {
        let mapped = apply(env, &f, Value::Char(to_char(c)?))?.as_char()?;
        out.push(mapped as char);
    }
    Ok(Value::string(out))
}

/// Implementation of `String.translate f s`: `f` maps char to string; the
/// pieces concatenate under the `Size` limit.
fn string_translate(env: &Env, args: ArgValues) -> RunResult<Value> {
    let (f, s) = args.two("String.translate")?;
    let mut out = String::new();
    for c in s.as_str()?.chars() {
        let piece = apply(env, &f, Value::Char(to_char(c)?))?;
        out.push_str(piece.as_str()?);
        size_checked(out.len())?;
    }
    Ok(Value::string(out))
}
