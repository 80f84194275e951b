//! Implementation of the `Math` structure.
//!
//! All functions follow IEEE-754: out-of-domain arguments produce nan rather
//! than faulting (`Math.sqrt ~1.0` is nan).

use crate::{args::ArgValues, env::Env, fault::RunResult, value::Value};

/// `Math` structure functions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, strum::Display, strum::EnumIter)]
#[strum(serialize_all = "camelCase")]
pub(crate) enum MathFunctions {
    Acos,
    Asin,
    Atan,
    Atan2,
    Cos,
    Cosh,
    Exp,
    Ln,
    Log10,
    Pow,
    Sin,
    Sinh,
    Sqrt,
    Tan,
    Tanh,
}

impl MathFunctions {
    pub fn arity(self) -> usize {
        match self {
            Self::Atan2 | Self::Pow => 2,
            _ => 1,
        }
    }
}

/// `Math` structure constants.
pub(crate) fn constants() -> Vec<(&'static str, Value)> {
    vec![
        ("e", Value::Real(std::f32::consts::E)),
        ("pi", Value::Real(std::f32::consts::PI)),
    ]
}

pub(crate) fn call(_env: &Env, function: MathFunctions, args: ArgValues) -> RunResult<Value> {
    match function {
        MathFunctions::Acos => unary(args, f32::acos),
        MathFunctions::Asin => unary(args, f32::asin),
        MathFunctions::Atan => unary(args, f32::atan),
        MathFunctions::Atan2 => binary(args, f32::atan2),
        MathFunctions::Cos => unary(args, f32::cos),
        MathFunctions::Cosh => unary(args, f32::cosh),
        MathFunctions::Exp => unary(args, f32::exp),
        MathFunctions::Ln => unary(args, f32::ln),
        MathFunctions::Log10 => unary(args, f32::log10),
        MathFunctions::Pow => binary(args, f32::powf),
        MathFunctions::Sin => unary(args, f32::sin),
        MathFunctions::Sinh => unary(args, f32::sinh),
        MathFunctions::Sqrt => unary(args, f32::sqrt),
        MathFunctions::Tan => unary(args, f32::tan),
        MathFunctions::Tanh => unary(args, f32::tanh),
    }
}

fn unary(args: ArgValues, f: impl Fn(f32) -> f32) -> RunResult<Value> {
    let x = args.one("Math.*")?.as_real()?;
    Ok(Value::Real(f(x)))
}

fn binary(args: ArgValues, f: impl Fn(f32, f32) -> f32) -> RunResult<Value> {
    let (a, b) = args.two("Math.*")?;
    Ok(Value::Real(f(a.as_real()?, b.as_real()?)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn out_of_domain_arguments_produce_nan() {
        let args: ArgValues = vec![Value::Real(-1.0)].into_iter().collect();
        let Value::Real(out) = call(&Env::empty(), MathFunctions::Sqrt, args).unwrap() else {
            panic!("expected a real");
        };
        assert!(out.is_nan());
    }

    #[test]
    fn pow_follows_ieee() {
        let args: ArgValues = vec![Value::Real(2.0), Value::Real(10.0)].into_iter().collect();
        assert_eq!(call(&Env::empty(), MathFunctions::Pow, args).unwrap(), Value::Real(1024.0));
    }
}
