#![doc = include_str!("../../../README.md")]
#![expect(clippy::float_cmp, reason = "value equality is IEEE-exact by contract")]

mod args;
mod code;
mod env;
mod fault;
mod modules;
mod pattern;
mod query;
mod session;
mod value;

pub use crate::{
    code::{Closure, Code, OrdinalRef, apply, execute},
    modules::builtin_names,
    env::{Env, MutableArray, MutableList, MutablePattern, MutableSingle},
    fault::{Fault, FaultKind, Pos, RunError, RunResult},
    pattern::Pattern,
    query::{AggregateCode, FromCode, YieldMode},
    session::{Prop, Session, SourceDriver},
    value::{BuiltinFn, RangeExtent, Value, record_to_string},
};
