//! The built-in library, grouped by origin structure.
//!
//! Each structure (`Char`, `Int`, `Real`, ...) lives in its own module with a
//! function enum and a `call` dispatcher; this module wraps them into one
//! [`BuiltinFunctions`] identity and builds the startup registry mapping
//! dotted names (and bare aliases) to values.

use std::rc::Rc;

use ahash::AHashMap;
use strum::IntoEnumIterator;

use crate::{args::ArgValues, env::Env, fault::RunResult, value::Value};

pub(crate) mod bag_mod;
pub(crate) mod char_mod;
pub(crate) mod general;
pub(crate) mod int_mod;
pub(crate) mod interact;
pub(crate) mod list_mod;
pub(crate) mod list_pair;
pub(crate) mod math_mod;
pub(crate) mod operators;
pub(crate) mod option_mod;
pub(crate) mod real_mod;
pub(crate) mod relational;
pub(crate) mod string_mod;
pub(crate) mod sys_mod;
pub(crate) mod vector_mod;

/// Every built-in function, tagged by its origin structure.
///
/// The wrapped per-structure enums are used both for dispatch in
/// [`call`](Self::call) and as the identity stored in `Value::Fn`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub(crate) enum BuiltinFunctions {
    Char(char_mod::CharFunctions),
    Int(int_mod::IntFunctions),
    Real(real_mod::RealFunctions),
    Str(string_mod::StrFunctions),
    List(list_mod::ListFunctions),
    ListPair(list_pair::ListPairFunctions),
    Vector(vector_mod::VectorFunctions),
    Bag(bag_mod::BagFunctions),
    Option(option_mod::OptionFunctions),
    General(general::GeneralFunctions),
    Math(math_mod::MathFunctions),
    Relational(relational::RelationalFunctions),
    Interact(interact::InteractFunctions),
    Sys(sys_mod::SysFunctions),
    Op(operators::OperatorFunctions),
}

impl BuiltinFunctions {
    /// The origin structure name, empty for global operators.
    pub fn structure(self) -> &'static str {
        match self {
            Self::Char(_) => "Char",
            Self::Int(_) => "Int",
            Self::Real(_) => "Real",
            Self::Str(_) => "String",
            Self::List(_) => "List",
            Self::ListPair(_) => "ListPair",
            Self::Vector(_) => "Vector",
            Self::Bag(_) => "Bag",
            Self::Option(_) => "Option",
            Self::General(_) => "General",
            Self::Math(_) => "Math",
            Self::Relational(_) => "Relational",
            Self::Interact(_) => "Interact",
            Self::Sys(_) => "Sys",
            Self::Op(_) => "",
        }
    }

    /// The dotted `Structure.member` name, or the operator spelling
    /// (`op +`, `not`) for global operators.
    pub fn ml_name(self) -> String {
        match self {
            Self::Char(f) => format!("Char.{f}"),
            Self::Int(f) => format!("Int.{f}"),
            Self::Real(f) => format!("Real.{f}"),
            Self::Str(f) => format!("String.{f}"),
            Self::List(f) => format!("List.{f}"),
            Self::ListPair(f) => format!("ListPair.{f}"),
            Self::Vector(f) => format!("Vector.{f}"),
            Self::Bag(f) => format!("Bag.{f}"),
            Self::Option(f) => format!("Option.{f}"),
            Self::General(f) => format!("General.{f}"),
            Self::Math(f) => format!("Math.{f}"),
            Self::Relational(f) => format!("Relational.{f}"),
            Self::Interact(f) => format!("Interact.{f}"),
            Self::Sys(f) => format!("Sys.{f}"),
            Self::Op(f) => f.ml_name(),
        }
    }

    /// The bare name under which this function is also exposed at the top
    /// level, if any.
    pub fn global_alias(self) -> Option<&'static str> {
        match self {
            Self::Char(f) => f.global_alias(),
            Self::Int(f) => f.global_alias(),
            Self::Str(f) => f.global_alias(),
            Self::List(f) => f.global_alias(),
            Self::Vector(f) => f.global_alias(),
            Self::Option(f) => f.global_alias(),
            Self::General(f) => f.global_alias(),
            Self::Interact(f) => f.global_alias(),
            _ => None,
        }
    }

    /// Number of arguments the implementation consumes, 1..=4.
    pub fn arity(self) -> usize {
        match self {
            Self::Char(f) => f.arity(),
            Self::Int(f) => f.arity(),
            Self::Real(f) => f.arity(),
            Self::Str(f) => f.arity(),
            Self::List(f) => f.arity(),
            Self::ListPair(f) => f.arity(),
            Self::Vector(f) => f.arity(),
            Self::Bag(f) => f.arity(),
            Self::Option(f) => f.arity(),
            Self::General(f) => f.arity(),
            Self::Math(f) => f.arity(),
            Self::Relational(f) => f.arity(),
            Self::Interact(f) => f.arity(),
            Self::Sys(f) => f.arity(),
            Self::Op(f) => f.arity(),
        }
    }

    /// Whether arguments arrive one at a time (curried) or as one tuple.
    pub fn curried(self) -> bool {
        match self {
            Self::Char(f) => f.curried(),
            Self::Int(_) => false,
            Self::Real(_) => false,
            Self::Str(f) => f.curried(),
            Self::List(f) => f.curried(),
            Self::ListPair(f) => f.curried(),
            Self::Vector(f) => f.curried(),
            Self::Bag(f) => f.curried(),
            Self::Option(f) => f.curried(),
            Self::General(f) => f.curried(),
            Self::Math(_) => false,
            Self::Relational(f) => f.curried(),
            Self::Interact(_) => false,
            Self::Sys(_) => false,
            Self::Op(_) => false,
        }
    }

    /// Dispatches a call to the owning structure's implementation.
    pub(crate) fn call(self, env: &Env, args: ArgValues) -> RunResult<Value> {
        match self {
            Self::Char(f) => char_mod::call(env, f, args),
            Self::Int(f) => int_mod::call(env, f, args),
            Self::Real(f) => real_mod::call(env, f, args),
            Self::Str(f) => string_mod::call(env, f, args),
            Self::List(f) => list_mod::call(env, f, args),
            Self::ListPair(f) => list_pair::call(env, f, args),
            Self::Vector(f) => vector_mod::call(env, f, args),
            Self::Bag(f) => bag_mod::call(env, f, args),
            Self::Option(f) => option_mod::call(env, f, args),
            Self::General(f) => general::call(env, f, args),
            Self::Math(f) => math_mod::call(env, f, args),
            Self::Relational(f) => relational::call(env, f, args),
            Self::Interact(f) => interact::call(env, f, args),
            Self::Sys(f) => sys_mod::call(env, f, args),
            Self::Op(f) => operators::call(env, f, args),
        }
    }
}

impl std::fmt::Display for BuiltinFunctions {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.ml_name())
    }
}

/// Every built-in function identity, in registration order.
pub(crate) fn all_functions() -> Vec<BuiltinFunctions> {
    let mut out = Vec::new();
    out.extend(char_mod::CharFunctions::iter().map(BuiltinFunctions::Char));
    out.extend(int_mod::IntFunctions::iter().map(BuiltinFunctions::Int));
    out.extend(real_mod::RealFunctions::iter().map(BuiltinFunctions::Real));
    out.extend(string_mod::StrFunctions::iter().map(BuiltinFunctions::Str));
    out.extend(list_mod::ListFunctions::iter().map(BuiltinFunctions::List));
    out.extend(list_pair::ListPairFunctions::iter().map(BuiltinFunctions::ListPair));
    out.extend(vector_mod::VectorFunctions::iter().map(BuiltinFunctions::Vector));
    out.extend(bag_mod::BagFunctions::iter().map(BuiltinFunctions::Bag));
    out.extend(option_mod::OptionFunctions::iter().map(BuiltinFunctions::Option));
    out.extend(general::GeneralFunctions::iter().map(BuiltinFunctions::General));
    out.extend(math_mod::MathFunctions::iter().map(BuiltinFunctions::Math));
    out.extend(relational::RelationalFunctions::iter().map(BuiltinFunctions::Relational));
    out.extend(interact::InteractFunctions::iter().map(BuiltinFunctions::Interact));
    out.extend(sys_mod::SysFunctions::iter().map(BuiltinFunctions::Sys));
    out.extend(operators::OperatorFunctions::iter().map(BuiltinFunctions::Op));
    out
}

/// Structure-level constant values (`Char.maxChar`, `Real.posInf`, ...).
pub(crate) fn constants() -> Vec<(String, Value)> {
    let mut out = Vec::new();
    for (name, value) in char_mod::constants() {
        out.push((format!("Char.{name}"), value));
    }
    for (name, value) in int_mod::constants() {
        out.push((format!("Int.{name}"), value));
    }
    for (name, value) in real_mod::constants() {
        out.push((format!("Real.{name}"), value));
    }
    for (name, value) in string_mod::constants() {
        out.push((format!("String.{name}"), value));
    }
    for (name, value) in vector_mod::constants() {
        out.push((format!("Vector.{name}"), value));
    }
    for (name, value) in math_mod::constants() {
        out.push((format!("Math.{name}"), value));
    }
    out
}

/// The registered name of every built-in (dotted names, aliases and
/// structure constants), sorted. Drivers use this for completion and
/// diagnostics.
pub fn builtin_names() -> Vec<String> {
    let mut names: Vec<String> = environment().keys().map(ToString::to_string).collect();
    names.sort();
    names
}

/// Builds the complete built-in environment: one entry per function under its
/// dotted name, the bare aliases, and the structure constants.
///
/// Completeness is verified on the way out: losing an entry to a name
/// collision would silently break the library contract.
pub(crate) fn environment() -> AHashMap<Rc<str>, Value> {
    let functions = all_functions();
    let constants = constants();
    let mut aliases = 0usize;
    let mut map = AHashMap::with_capacity(functions.len() + constants.len());
    for func in functions {
        let value = Value::Fn(Box::new(crate::value::BuiltinFn::new(func)));
        let previous = map.insert(Rc::from(func.ml_name()), value.clone());
        assert!(previous.is_none(), "duplicate built-in name {}", func.ml_name());
        if let Some(alias) = func.global_alias() {
            let previous = map.insert(Rc::from(alias), value);
            assert!(previous.is_none(), "duplicate built-in alias {alias}");
            aliases += 1;
        }
    }
    let constant_count = constants.len();
    for (name, value) in constants {
        let previous = map.insert(Rc::from(name.as_str()), value);
        assert!(previous.is_none(), "duplicate built-in constant {name}");
    }
    assert_eq!(map.len(), all_functions().len() + aliases + constant_count);
    map
}
