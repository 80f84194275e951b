//! Implementation of the `Char` structure.
//!
//! Characters are bytes 0..=255. The classification predicates follow the
//! ASCII conventions of the basis library: `isGraph` is `!`..`~`, `isPrint`
//! adds the space, `isCntrl` is the ASCII complement of `isPrint`, `isSpace`
//! is `\t`..`\r` plus the space.

use crate::{
    args::ArgValues,
    env::Env,
    fault::{Fault, FaultKind, RunResult},
    value::Value,
};

/// `Char` structure functions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, strum::Display, strum::EnumIter)]
#[strum(serialize_all = "camelCase")]
pub(crate) enum CharFunctions {
    Chr,
    Compare,
    Contains,
    FromString,
    IsAlpha,
    IsAlphaNum,
    IsAscii,
    IsCntrl,
    IsDigit,
    IsGraph,
    IsHexDigit,
    IsLower,
    IsPrint,
    IsPunct,
    IsSpace,
    IsUpper,
    NotContains,
    Ord,
    Pred,
    Succ,
    ToLower,
    ToString,
    ToUpper,
}

impl CharFunctions {
    pub fn arity(self) -> usize {
        match self {
            Self::Compare | Self::Contains | Self::NotContains => 2,
            _ => 1,
        }
    }

    pub fn curried(self) -> bool {
        matches!(self, Self::Contains | Self::NotContains)
    }

    pub fn global_alias(self) -> Option<&'static str> {
        match self {
            Self::Chr => Some("chr"),
            Self::Ord => Some("ord"),
            _ => None,
        }
    }
}

/// `Char` structure constants.
pub(crate) fn constants() -> Vec<(&'static str, Value)> {
    vec![
        ("maxChar", Value::Char(255)),
        ("maxOrd", Value::Int(255)),
        ("minChar", Value::Char(0)),
    ]
}

pub(crate) fn call(_env: &Env, function: CharFunctions, args: ArgValues) -> RunResult<Value> {
    match function {
        CharFunctions::Chr => char_chr(args),
        CharFunctions::Compare => char_compare(args),
        CharFunctions::Contains => char_contains(args, true),
        CharFunctions::NotContains => char_contains(args, false),
        CharFunctions::FromString => char_from_string(args),
        CharFunctions::IsAlpha => predicate(args, |c| c.is_ascii_alphabetic()),
        CharFunctions::IsAlphaNum => predicate(args, |c| c.is_ascii_alphanumeric()),
        CharFunctions::IsAscii => predicate(args, |c| c < 128),
        CharFunctions::IsCntrl => predicate(args, |c| c < 128 && !is_print(c)),
        CharFunctions::IsDigit => predicate(args, |c| c.is_ascii_digit()),
        CharFunctions::IsGraph => predicate(args, is_graph),
        CharFunctions::IsHexDigit => predicate(args, |c| c.is_ascii_hexdigit()),
        CharFunctions::IsLower => predicate(args, |c| c.is_ascii_lowercase()),
        CharFunctions::IsPrint => predicate(args, is_print),
        CharFunctions::IsPunct => predicate(args, |c| is_graph(c) && !c.is_ascii_alphanumeric()),
        CharFunctions::IsSpace => predicate(args, |c| (b'\t'..=b'\r').contains(&c) || c == b' '),
        CharFunctions::IsUpper => predicate(args, |c| c.is_ascii_uppercase()),
        CharFunctions::Ord => Ok(Value::Int(i32::from(args.one("Char.ord")?.as_char()?))),
        CharFunctions::Pred => char_step(args, -1),
        CharFunctions::Succ => char_step(args, 1),
        CharFunctions::ToLower => char_map(args, |c| c.to_ascii_lowercase()),
        CharFunctions::ToUpper => char_map(args, |c| c.to_ascii_uppercase()),
        CharFunctions::ToString => char_to_string(args),
    }
}

fn is_graph(c: u8) -> bool {
    (0x21..=0x7E).contains(&c)
}

fn is_print(c: u8) -> bool {
    (0x20..=0x7E).contains(&c)
}

/// Implementation of `Char.chr n`: requires `0 <= n <= 255`, else `Chr`.
fn char_chr(args: ArgValues) -> RunResult<Value> {
    let n = args.one("Char.chr")?.as_int()?;
    u8::try_from(n)
        .map(Value::Char)
        .map_err(|_| Fault::new(FaultKind::Chr).into())
}

fn char_compare(args: ArgValues) -> RunResult<Value> {
    let (a, b) = args.two("Char.compare")?;
    Ok(Value::order(a.as_char()?.cmp(&b.as_char()?)))
}

/// Implementation of `Char.contains s c` (and its negation).
fn char_contains(args: ArgValues, want: bool) -> RunResult<Value> {
    let (s, c) = args.two("Char.contains")?;
    let needle = c.as_char()?;
    let found = s.as_str()?.bytes().any(|b| b == needle);
    Ok(Value::Bool(found == want))
}

/// Implementation of `Char.succ` / `Char.pred`: `Chr` at the boundaries.
fn char_step(args: ArgValues, delta: i32) -> RunResult<Value> {
    let c = args.one("Char.succ")?.as_char()?;
    let next = i32::from(c) + delta;
    u8::try_from(next)
        .map(Value::Char)
        .map_err(|_| Fault::new(FaultKind::Chr).into())
}

fn char_map(args: ArgValues, f: impl Fn(u8) -> u8) -> RunResult<Value> {
    let c = args.one("Char.toLower")?.as_char()?;
    Ok(Value::Char(f(c)))
}

fn predicate(args: ArgValues, f: impl Fn(u8) -> bool) -> RunResult<Value> {
    let c = args.one("Char.is*")?.as_char()?;
    Ok(Value::Bool(f(c)))
}

/// Implementation of `Char.toString`: the escape-syntax spelling without
/// surrounding quotes (`Char.toString #"\n"` is `"\\n"`).
fn char_to_string(args: ArgValues) -> RunResult<Value> {
    let c = args.one("Char.toString")?.as_char()?;
    let mut out = String::new();
    crate::value::write_ml_char(&mut out, c).expect("string write cannot fail");
    Ok(Value::string(out))
}

/// Implementation of `Char.fromString`: scans one character in ML escape
/// syntax from the front of the string.
fn char_from_string(args: ArgValues) -> RunResult<Value> {
    let s = args.one("Char.fromString")?;
    let bytes = s.as_str()?.as_bytes();
    Ok(Value::option(scan_char(bytes).map(Value::Char)))
}

fn scan_char(bytes: &[u8]) -> Option<u8> {
    match bytes {
        [] => None,
        [b'\\', rest @ ..] => scan_escape(rest),
        [c, ..] => Some(*c),
    }
}

fn scan_escape(rest: &[u8]) -> Option<u8> {
    match rest {
        [b'a', ..] => Some(7),
        [b'b', ..] => Some(8),
        [b't', ..] => Some(b'\t'),
        [b'n', ..] => Some(b'\n'),
        [b'v', ..] => Some(11),
        [b'f', ..] => Some(12),
        [b'r', ..] => Some(b'\r'),
        [b'\\', ..] => Some(b'\\'),
        [b'"', ..] => Some(b'"'),
        // Control escape: \^c for c in `@`..`_`.
        [b'^', c, ..] if (b'@'..=b'_').contains(c) => Some(c - b'@'),
        // Decimal escape: exactly three digits, at most 255.
        [d1, d2, d3, ..] if d1.is_ascii_digit() && d2.is_ascii_digit() && d3.is_ascii_digit() => {
            let n = u32::from(d1 - b'0') * 100 + u32::from(d2 - b'0') * 10 + u32::from(d3 - b'0');
            u8::try_from(n).ok()
        }
        _ => None,
    }
}
