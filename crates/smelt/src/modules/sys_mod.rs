//! Implementation of the `Sys` structure: configuration properties and plan
//! introspection against the session.

use crate::{args::ArgValues, env::Env, fault::RunResult, value::Value};

/// `Sys` structure functions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, strum::Display, strum::EnumIter)]
#[strum(serialize_all = "camelCase")]
pub(crate) enum SysFunctions {
    ClearEnv,
    Env,
    Plan,
    Set,
    Show,
    ShowAll,
    Unset,
}

impl SysFunctions {
    pub fn arity(self) -> usize {
        match self {
            Self::Set => 2,
            _ => 1,
        }
    }
}

pub(crate) fn call(env: &Env, function: SysFunctions, args: ArgValues) -> RunResult<Value> {
    let session = env.session()?;
    match function {
        SysFunctions::ClearEnv => {
            args.one("Sys.clearEnv")?;
            session.borrow_mut().clear_env();
            Ok(Value::Unit)
        }
        SysFunctions::Env => {
            args.one("Sys.env")?;
            let entries = session
                .borrow()
                .env_entries()
                .into_iter()
                .map(|(name, value)| Value::tuple(vec![Value::string(name), Value::string(value.to_string())]))
                .collect();
            Ok(Value::list(entries))
        }
        SysFunctions::Plan => {
            args.one("Sys.plan")?;
            let plan = session.borrow().plan();
            Ok(Value::string(plan))
        }
        SysFunctions::Set => {
            let (name, value) = args.two("Sys.set")?;
            session.borrow_mut().set_prop(name.as_str()?, value)?;
            Ok(Value::Unit)
        }
        SysFunctions::Show => {
            let name = args.one("Sys.show")?;
            let current = session.borrow().show_prop(name.as_str()?)?;
            Ok(Value::option(current.map(|v| Value::string(v.to_string()))))
        }
        SysFunctions::ShowAll => {
            args.one("Sys.showAll")?;
            let entries = session
                .borrow()
                .show_all()
                .into_iter()
                .map(|(name, value)| {
                    Value::tuple(vec![
                        Value::string(name),
                        Value::option(value.map(|v| Value::string(v.to_string()))),
                    ])
                })
                .collect();
            Ok(Value::list(entries))
        }
        SysFunctions::Unset => {
            let name = args.one("Sys.unset")?;
            session.borrow_mut().unset_prop(name.as_str()?)?;
            Ok(Value::Unit)
        }
    }
}
