//! Implementation of the `General` structure.

use crate::{
    args::ArgValues,
    code::apply,
    env::Env,
    fault::{RunError, RunResult},
    value::Value,
};

/// `General` structure functions. `o` takes its `(f, g)` pair first so a
/// partial application materializes the composition as a value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, strum::Display, strum::EnumIter)]
#[strum(serialize_all = "camelCase")]
pub(crate) enum GeneralFunctions {
    Ignore,
    O,
}

impl GeneralFunctions {
    pub fn arity(self) -> usize {
        match self {
            Self::Ignore => 1,
            Self::O => 2,
        }
    }

    pub fn curried(self) -> bool {
        matches!(self, Self::O)
    }

    pub fn global_alias(self) -> Option<&'static str> {
        match self {
            Self::Ignore => Some("ignore"),
            Self::O => Some("op o"),
        }
    }
}

pub(crate) fn call(env: &Env, function: GeneralFunctions, args: ArgValues) -> RunResult<Value> {
    match function {
        GeneralFunctions::Ignore => {
            args.one("General.ignore")?;
            Ok(Value::Unit)
        }
        GeneralFunctions::O => {
            let (pair, x) = args.two("General.o")?;
            let [f, g] = pair.as_tuple()? else {
                return Err(RunError::assert("General.o expects a pair of functions"));
            };
            let mid = apply(env, g, x)?;
            apply(env, f, mid)
        }
    }
}
