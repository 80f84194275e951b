use std::rc::Rc;

use smallvec::SmallVec;

use crate::{
    fault::{RunError, RunResult},
    value::Value,
};

/// Slot buffer filled by a bind. Most patterns declare only a handful of
/// names.
pub(crate) type SlotBuf = SmallVec<[Value; 4]>;

/// A compile-time pattern, matched structurally against a runtime value.
///
/// The variant set is the complete pattern op vocabulary of the frontend;
/// anything else is rejected at compile time.
#[derive(Debug, Clone, PartialEq)]
pub enum Pattern {
    /// Bind the whole value to a name.
    Id(Rc<str>),
    /// Bind the whole value to a name and also match an inner pattern.
    As(Rc<str>, Box<Pattern>),
    /// Match anything, bind nothing.
    Wildcard,
    LitBool(bool),
    LitChar(u8),
    /// Decimal value equality, 32-bit.
    LitInt(i32),
    /// Numeric equality (never bit equality).
    LitReal(f32),
    LitString(Rc<str>),
    Tuple(Vec<Pattern>),
    /// Records are positional tuples by the time they reach the core.
    Record(Vec<Pattern>),
    /// A list of exactly this shape.
    List(Vec<Pattern>),
    /// Head and tail of a non-empty list.
    Cons(Box<Pattern>, Box<Pattern>),
    /// A nullary constructor.
    Con0(Rc<str>),
    /// A unary constructor with a payload pattern.
    Con(Rc<str>, Box<Pattern>),
}

impl Pattern {
    pub fn id(name: impl Into<Rc<str>>) -> Self {
        Self::Id(name.into())
    }

    pub fn cons(head: Self, tail: Self) -> Self {
        Self::Cons(Box::new(head), Box::new(tail))
    }

    pub fn con(tag: impl Into<Rc<str>>, inner: Self) -> Self {
        Self::Con(tag.into(), Box::new(inner))
    }

    pub fn con0(tag: impl Into<Rc<str>>) -> Self {
        Self::Con0(tag.into())
    }

    /// The names this pattern declares, in slot order.
    ///
    /// Slot order is traversal order: an `As` name precedes the names of its
    /// inner pattern, tuple slots run left to right.
    pub fn names(&self) -> Vec<Rc<str>> {
        let mut out = Vec::new();
        self.collect_names(&mut out);
        out
    }

    fn collect_names(&self, out: &mut Vec<Rc<str>>) {
        match self {
            Self::Id(name) => out.push(Rc::clone(name)),
            Self::As(name, inner) => {
                out.push(Rc::clone(name));
                inner.collect_names(out);
            }
            Self::Tuple(args) | Self::Record(args) | Self::List(args) => {
                for arg in args {
                    arg.collect_names(out);
                }
            }
            Self::Cons(head, tail) => {
                head.collect_names(out);
                tail.collect_names(out);
            }
            Self::Con(_, inner) => inner.collect_names(out),
            Self::Wildcard
            | Self::LitBool(_)
            | Self::LitChar(_)
            | Self::LitInt(_)
            | Self::LitReal(_)
            | Self::LitString(_)
            | Self::Con0(_) => {}
        }
    }
}

impl std::fmt::Display for Pattern {
    /// Source-like rendering used by plan descriptions.
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Id(name) => write!(f, "{name}"),
            Self::As(name, inner) => write!(f, "{name} as {inner}"),
            Self::Wildcard => write!(f, "_"),
            Self::LitBool(b) => write!(f, "{b}"),
            Self::LitChar(c) => {
                write!(f, "#\"")?;
                crate::value::write_ml_char(f, *c)?;
                write!(f, "\"")
            }
            Self::LitInt(n) => write!(f, "{}", Value::Int(*n)),
            Self::LitReal(r) => write!(f, "{}", Value::Real(*r)),
            Self::LitString(s) => crate::value::write_ml_string(f, s),
            Self::Tuple(args) | Self::Record(args) => {
                write!(f, "(")?;
                for (i, arg) in args.iter().enumerate() {
                    if i > 0 {
                        write!(f, ",")?;
                    }
                    write!(f, "{arg}")?;
                }
                write!(f, ")")
            }
            Self::List(args) => {
                write!(f, "[")?;
                for (i, arg) in args.iter().enumerate() {
                    if i > 0 {
                        write!(f, ",")?;
                    }
                    write!(f, "{arg}")?;
                }
                write!(f, "]")
            }
            Self::Cons(head, tail) => write!(f, "{head} :: {tail}"),
            Self::Con0(tag) => write!(f, "{tag}"),
            Self::Con(tag, inner) => write!(f, "{tag} {inner}"),
        }
    }
}

/// Matches `value` against `pattern`, pushing bound values onto `slots` in
/// declared order.
///
/// Returns whether the match succeeded. On failure the buffer may hold
/// partial writes; the caller owns the buffer and discards it, so no partial
/// state is ever observable. The buffer is the only allocation on the success
/// path.
pub(crate) fn bind(pattern: &Pattern, value: &Value, slots: &mut SlotBuf) -> RunResult<bool> {
    match pattern {
        Pattern::Id(_) => {
            slots.push(value.clone());
            Ok(true)
        }
        Pattern::As(_, inner) => {
            // Reserve this pattern's slot, fill it only once the inner
            // pattern has succeeded.
            let reserved = slots.len();
            slots.push(Value::Unit);
            if bind(inner, value, slots)? {
                slots[reserved] = value.clone();
                Ok(true)
            } else {
                Ok(false)
            }
        }
        Pattern::Wildcard => Ok(true),
        Pattern::LitBool(b) => Ok(matches!(value, Value::Bool(v) if v == b)),
        Pattern::LitChar(c) => Ok(matches!(value, Value::Char(v) if v == c)),
        Pattern::LitInt(n) => Ok(matches!(value, Value::Int(v) if v == n)),
        Pattern::LitReal(r) => Ok(matches!(value, Value::Real(v) if v == r)),
        Pattern::LitString(s) => Ok(matches!(value, Value::Str(v) if v == s)),
        Pattern::Tuple(args) | Pattern::Record(args) => {
            let items = value.as_tuple()?;
            if items.len() != args.len() {
                return Err(RunError::assert("tuple pattern arity mismatch"));
            }
            bind_pairwise(args, items, slots)
        }
        Pattern::List(args) => {
            let items = value.as_list()?;
            if items.len() != args.len() {
                return Ok(false);
            }
            bind_pairwise(args, items, slots)
        }
        Pattern::Cons(head, tail) => {
            let items = value.as_list()?;
            let Some((first, rest)) = items.split_first() else {
                return Ok(false);
            };
            if !bind(head, first, slots)? {
                return Ok(false);
            }
            bind(tail, &Value::List(rest.into()), slots)
        }
        Pattern::Con0(tag) => Ok(constructor_matches(value, tag)?.is_some()),
        Pattern::Con(tag, inner) => match constructor_matches(value, tag)? {
            Some(Some(payload)) => bind(inner, &payload, slots),
            _ => Ok(false),
        },
    }
}

/// Checks whether `value` is an application of the constructor `tag`.
///
/// Accepts both the `Variant` encoding and the 2-list encoding
/// `[tag, payload]` used by relational sources. Returns the payload (if any)
/// on a tag match, `None` on a mismatch.
fn constructor_matches(value: &Value, tag: &str) -> RunResult<Option<Option<Value>>> {
    match value {
        Value::Variant(vtag, payload) => {
            if &**vtag == tag {
                Ok(Some(payload.as_deref().cloned()))
            } else {
                Ok(None)
            }
        }
        Value::List(items) if items.len() == 2 => {
            if items[0] == Value::string(tag) {
                Ok(Some(Some(items[1].clone())))
            } else {
                Ok(None)
            }
        }
        other => Err(RunError::assert(format!(
            "expected constructor application, got {}",
            other.type_name()
        ))),
    }
}

fn bind_pairwise(patterns: &[Pattern], values: &[Value], slots: &mut SlotBuf) -> RunResult<bool> {
    for (pattern, value) in patterns.iter().zip(values.iter()) {
        if !bind(pattern, value, slots)? {
            return Ok(false);
        }
    }
    Ok(true)
}
