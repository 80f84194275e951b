//! Implementation of the `Interact` structure: the bridge to the session
//! driver.

use crate::{args::ArgValues, env::Env, fault::RunResult, value::Value};

/// `Interact` structure functions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, strum::Display, strum::EnumIter)]
#[strum(serialize_all = "camelCase")]
pub(crate) enum InteractFunctions {
    Use,
    UseSilently,
}

impl InteractFunctions {
    pub fn arity(self) -> usize {
        1
    }

    pub fn global_alias(self) -> Option<&'static str> {
        match self {
            Self::Use => Some("use"),
            Self::UseSilently => None,
        }
    }
}

/// Implementation of `Interact.use path` / `useSilently path`: delegates to
/// the session driver; driver errors surface as `Error` faults attributed to
/// the call site.
pub(crate) fn call(env: &Env, function: InteractFunctions, args: ArgValues) -> RunResult<Value> {
    let silent = matches!(function, InteractFunctions::UseSilently);
    let path = args.one("Interact.use")?;
    let session = env.session()?;
    session.borrow_mut().use_file(path.as_str()?, silent)?;
    Ok(Value::Unit)
}
