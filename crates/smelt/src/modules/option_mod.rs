//! Implementation of the `Option` structure.

use crate::{
    args::ArgValues,
    code::apply,
    env::Env,
    fault::{RunError, RunResult},
    value::Value,
};

/// `Option` structure functions.
///
/// `compose` and `composePartial` take their `(f, g)` pair first and the
/// argument second, so a partial application materializes the composed
/// function as a value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, strum::Display, strum::EnumIter)]
#[strum(serialize_all = "camelCase")]
pub(crate) enum OptionFunctions {
    App,
    Compose,
    ComposePartial,
    Filter,
    GetOpt,
    IsSome,
    Join,
    Map,
    MapPartial,
    ValOf,
}

impl OptionFunctions {
    pub fn arity(self) -> usize {
        match self {
            Self::IsSome | Self::Join | Self::ValOf => 1,
            _ => 2,
        }
    }

    pub fn curried(self) -> bool {
        !matches!(self, Self::GetOpt | Self::IsSome | Self::Join | Self::ValOf)
    }

    pub fn global_alias(self) -> Option<&'static str> {
        match self {
            Self::GetOpt => Some("getOpt"),
            Self::IsSome => Some("isSome"),
            Self::ValOf => Some("valOf"),
            _ => None,
        }
    }
}

pub(crate) fn call(env: &Env, function: OptionFunctions, args: ArgValues) -> RunResult<Value> {
    match function {
        OptionFunctions::App => {
            let (f, opt) = args.two("Option.app")?;
            if let Some(v) = opt.to_option()? {
                apply(env, &f, v)?;
            }
            Ok(Value::Unit)
        }
        OptionFunctions::Compose => option_compose(env, args, false),
        OptionFunctions::ComposePartial => option_compose(env, args, true),
        OptionFunctions::Filter => {
            let (f, x) = args.two("Option.filter")?;
            if apply(env, &f, x.clone())?.as_bool()? {
                Ok(Value::some(x))
            } else {
                Ok(Value::none())
            }
        }
        OptionFunctions::GetOpt => {
            let (opt, default) = args.two("Option.getOpt")?;
            Ok(opt.to_option()?.unwrap_or(default))
        }
        OptionFunctions::IsSome => {
            let opt = args.one("Option.isSome")?;
            Ok(Value::Bool(opt.is_some()?))
        }
        OptionFunctions::Join => {
            let opt = args.one("Option.join")?;
            match opt.to_option()? {
                None => Ok(Value::none()),
                Some(inner) => {
                    inner.to_option()?;
                    Ok(inner)
                }
            }
        }
        OptionFunctions::Map => {
            let (f, opt) = args.two("Option.map")?;
            match opt.to_option()? {
                None => Ok(Value::none()),
                Some(v) => Ok(Value::some(apply(env, &f, v)?)),
            }
        }
        OptionFunctions::MapPartial => {
            let (f, opt) = args.two("Option.mapPartial")?;
            match opt.to_option()? {
                None => Ok(Value::none()),
                Some(v) => {
                    let out = apply(env, &f, v)?;
                    out.to_option()?;
                    Ok(out)
                }
            }
        }
        OptionFunctions::ValOf => args.one("Option.valOf")?.val_of(),
    }
}

/// Implementation of `Option.compose (f, g) x` and `composePartial`:
/// `g x` first; on `SOME v`, plain compose wraps `f v` in `SOME`, the
/// partial variant expects `f v` to already be an option.
fn option_compose(env: &Env, args: ArgValues, partial: bool) -> RunResult<Value> {
    let (pair, x) = args.two("Option.compose")?;
    let [f, g] = pair.as_tuple()? else {
        return Err(RunError::assert("Option.compose expects a pair of functions"));
    };
    match apply(env, g, x)?.to_option()? {
        None => Ok(Value::none()),
        Some(v) => {
            let out = apply(env, f, v)?;
            if partial {
                out.to_option()?;
                Ok(out)
            } else {
                Ok(Value::some(out))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fault::{Fault, FaultKind};

    #[test]
    fn val_of_faults_on_none() {
        let args: ArgValues = vec![Value::none()].into_iter().collect();
        let err = call(&Env::empty(), OptionFunctions::ValOf, args).unwrap_err();
        assert_eq!(err, RunError::Fault(Fault::new(FaultKind::Option)));

        let args: ArgValues = vec![Value::some(Value::Int(3))].into_iter().collect();
        assert_eq!(call(&Env::empty(), OptionFunctions::ValOf, args).unwrap(), Value::Int(3));
    }

    #[test]
    fn get_opt_falls_back() {
        let args: ArgValues = vec![Value::none(), Value::Int(7)].into_iter().collect();
        assert_eq!(call(&Env::empty(), OptionFunctions::GetOpt, args).unwrap(), Value::Int(7));
    }

    #[test]
    fn join_flattens_one_level() {
        let args: ArgValues = vec![Value::some(Value::some(Value::Int(1)))].into_iter().collect();
        assert_eq!(
            call(&Env::empty(), OptionFunctions::Join, args).unwrap(),
            Value::some(Value::Int(1))
        );
        let args: ArgValues = vec![Value::none()].into_iter().collect();
        assert_eq!(call(&Env::empty(), OptionFunctions::Join, args).unwrap(), Value::none());
    }
}
