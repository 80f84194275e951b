use std::{cell::Cell, fmt::Write, rc::Rc};

use crate::{
    args::ArgValues,
    env::Env,
    fault::{Fault, FaultKind, Pos, RunError, RunResult},
    pattern::Pattern,
    query::FromCode,
    value::{BuiltinFn, Value},
};

/// A caller-owned ordinal counter, shared between the `OrdinalGet` and
/// `OrdinalInc` nodes that the frontend plants around a comprehension.
#[derive(Debug, Clone, Default)]
pub struct OrdinalRef(Rc<Cell<i32>>);

impl OrdinalRef {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self) -> i32 {
        self.0.get()
    }

    fn inc(&self) {
        self.0.set(self.0.get() + 1);
    }
}

/// A node of the pre-compiled intermediate representation.
///
/// Every node evaluates against an environment and yields a value; evaluation
/// order within a node is always left to right. The frontend guarantees the
/// tree is well-typed, so shape mismatches during evaluation are assertion
/// failures rather than user-visible faults.
#[derive(Debug, Clone)]
pub enum Code {
    /// A literal value known at compile time.
    Constant(Value),
    /// Environment lookup.
    Get(Rc<str>),
    /// A fresh tuple of environment lookups.
    GetTuple(Vec<Rc<str>>),
    /// A fresh tuple of child results.
    Tuple(Vec<Code>),
    /// Short-circuit conjunction.
    AndAlso(Box<Code>, Box<Code>),
    /// Short-circuit disjunction.
    OrElse(Box<Code>, Box<Code>),
    /// `let` with a single binding.
    Let1 { match_code: Box<Code>, body: Box<Code> },
    /// `let` with several bindings, threaded left to right.
    Let { match_codes: Vec<Code>, body: Box<Code> },
    /// General application: both sides are evaluated, then applied.
    Apply { fn_code: Box<Code>, arg_code: Box<Code> },
    /// Direct N-ary application of a built-in known at compile time.
    ApplyN { func: BuiltinFn, arg_codes: Vec<Code> },
    /// N-ary application where the arguments arrive as one tuple.
    ApplyNTuple { func: BuiltinFn, arg_code: Box<Code> },
    /// A `fn` expression: builds a closure over the current environment.
    Fn {
        arms: Rc<[(Rc<Pattern>, Code)]>,
        pos: Option<Pos>,
    },
    /// A `from` comprehension.
    From(Box<FromCode>),
    /// Forces a relation-backed list into a plain list view.
    WrapRelList(Box<Code>),
    /// Current value of an ordinal counter.
    OrdinalGet(OrdinalRef),
    /// Increments the counter, then evaluates `next`.
    OrdinalInc { slot: OrdinalRef, next: Box<Code> },
}

impl Code {
    pub fn constant(value: Value) -> Self {
        Self::Constant(value)
    }

    pub fn get(name: impl Into<Rc<str>>) -> Self {
        Self::Get(name.into())
    }

    pub fn apply(fn_code: Self, arg_code: Self) -> Self {
        Self::Apply { fn_code: Box::new(fn_code), arg_code: Box::new(arg_code) }
    }

    pub fn and_also(a: Self, b: Self) -> Self {
        Self::AndAlso(Box::new(a), Box::new(b))
    }

    pub fn or_else(a: Self, b: Self) -> Self {
        Self::OrElse(Box::new(a), Box::new(b))
    }

    pub fn let1(match_code: Self, body: Self) -> Self {
        Self::Let1 { match_code: Box::new(match_code), body: Box::new(body) }
    }

    pub fn let_many(match_codes: Vec<Self>, body: Self) -> Self {
        Self::Let { match_codes, body: Box::new(body) }
    }

    /// A single-arm `fn pattern => body`.
    pub fn lambda(pattern: Pattern, body: Self, pos: Option<Pos>) -> Self {
        Self::Fn { arms: Rc::from(vec![(Rc::new(pattern), body)]), pos }
    }

    /// A multi-arm `fn` from a match table.
    pub fn lambda_arms(arms: Vec<(Pattern, Self)>, pos: Option<Pos>) -> Self {
        let arms: Vec<(Rc<Pattern>, Self)> = arms.into_iter().map(|(p, c)| (Rc::new(p), c)).collect();
        Self::Fn { arms: Rc::from(arms), pos }
    }

    pub fn wrap_rel_list(inner: Self) -> Self {
        Self::WrapRelList(Box::new(inner))
    }

    /// Whether this node is a compile-time constant.
    pub fn is_constant(&self) -> bool {
        matches!(self, Self::Constant(_))
    }

    /// Evaluates the node in `env`.
    pub fn eval(&self, env: &Env) -> RunResult<Value> {
        match self {
            Self::Constant(value) => Ok(value.clone()),
            Self::Get(name) => env.get(name),
            Self::GetTuple(names) => {
                let values = names.iter().map(|n| env.get(n)).collect::<RunResult<Vec<_>>>()?;
                Ok(Value::tuple(values))
            }
            Self::Tuple(codes) => {
                let values = codes.iter().map(|c| c.eval(env)).collect::<RunResult<Vec<_>>>()?;
                Ok(Value::tuple(values))
            }
            Self::AndAlso(a, b) => {
                if a.eval(env)?.as_bool()? {
                    b.eval(env)
                } else {
                    Ok(Value::Bool(false))
                }
            }
            Self::OrElse(a, b) => {
                if a.eval(env)?.as_bool()? {
                    Ok(Value::Bool(true))
                } else {
                    b.eval(env)
                }
            }
            Self::Let1 { match_code, body } => {
                let closure = eval_to_closure(match_code, env)?;
                let env2 = closure.eval_bind(env)?;
                body.eval(&env2)
            }
            Self::Let { match_codes, body } => {
                let mut env2 = env.clone();
                for match_code in match_codes {
                    let closure = eval_to_closure(match_code, &env2)?;
                    env2 = closure.eval_bind(&env2)?;
                }
                body.eval(&env2)
            }
            Self::Apply { fn_code, arg_code } => {
                let func = fn_code.eval(env)?;
                let arg = arg_code.eval(env)?;
                apply(env, &func, arg)
            }
            Self::ApplyN { func, arg_codes } => {
                let args: ArgValues = arg_codes.iter().map(|c| c.eval(env)).collect::<RunResult<_>>()?;
                invoke_builtin(env, func, args)
            }
            Self::ApplyNTuple { func, arg_code } => {
                let tuple = arg_code.eval(env)?;
                let args: ArgValues = tuple.as_tuple()?.iter().cloned().collect();
                invoke_builtin(env, func, args)
            }
            Self::Fn { arms, pos } => Ok(Value::Closure(Rc::new(Closure {
                arms: Rc::clone(arms),
                captured: env.fix(),
                pos: *pos,
            }))),
            Self::From(from) => from.eval(env),
            Self::WrapRelList(inner) => match inner.eval(env)? {
                Value::Extent(extent) => Ok(Value::List(Rc::clone(&extent.values))),
                other => Ok(other),
            },
            Self::OrdinalGet(slot) => Ok(Value::Int(slot.get())),
            Self::OrdinalInc { slot, next } => {
                slot.inc();
                next.eval(env)
            }
        }
    }

    /// Renders a structural description of the node for the debug visitor.
    /// The shape is stable but opaque to callers.
    pub fn describe(&self) -> String {
        let mut out = String::new();
        self.describe_into(&mut out);
        out
    }

    pub(crate) fn describe_into(&self, out: &mut String) {
        match self {
            Self::Constant(value) => {
                let _ = write!(out, "constant({value})");
            }
            Self::Get(name) => {
                let _ = write!(out, "get(name {name})");
            }
            Self::GetTuple(names) => {
                let _ = write!(out, "getTuple(names [{}])", names.join(", "));
            }
            Self::Tuple(codes) => describe_call(out, "tuple", codes),
            Self::AndAlso(a, b) => describe_call(out, "andalso", [a.as_ref(), b.as_ref()]),
            Self::OrElse(a, b) => describe_call(out, "orelse", [a.as_ref(), b.as_ref()]),
            Self::Let1 { match_code, body } => {
                out.push_str("let1(match ");
                match_code.describe_into(out);
                out.push_str(", body ");
                body.describe_into(out);
                out.push(')');
            }
            Self::Let { match_codes, body } => {
                out.push_str("let(matches [");
                for (i, code) in match_codes.iter().enumerate() {
                    if i > 0 {
                        out.push_str(", ");
                    }
                    code.describe_into(out);
                }
                out.push_str("], body ");
                body.describe_into(out);
                out.push(')');
            }
            Self::Apply { fn_code, arg_code } => {
                out.push_str("apply(fnCode ");
                fn_code.describe_into(out);
                out.push_str(", argCode ");
                arg_code.describe_into(out);
                out.push(')');
            }
            Self::ApplyN { func, arg_codes } => {
                let _ = write!(out, "apply{}(fnValue {}", arg_codes.len(), func.name());
                for code in arg_codes {
                    out.push_str(", ");
                    code.describe_into(out);
                }
                out.push(')');
            }
            Self::ApplyNTuple { func, arg_code } => {
                let _ = write!(out, "applyTuple(fnValue {}, argCode ", func.name());
                arg_code.describe_into(out);
                out.push(')');
            }
            Self::Fn { arms, .. } => {
                out.push_str("match(");
                for (i, (pattern, _)) in arms.iter().enumerate() {
                    if i > 0 {
                        out.push_str(", ");
                    }
                    let _ = write!(out, "{pattern}");
                }
                out.push(')');
            }
            Self::From(from) => from.describe_into(out),
            Self::WrapRelList(inner) => {
                out.push_str("wrapRelList(");
                inner.describe_into(out);
                out.push(')');
            }
            Self::OrdinalGet(_) => out.push_str("ordinalGet"),
            Self::OrdinalInc { next, .. } => {
                out.push_str("ordinalInc(");
                next.describe_into(out);
                out.push(')');
            }
        }
    }
}

fn describe_call<'a>(out: &mut String, name: &str, codes: impl IntoIterator<Item = &'a Code>) {
    out.push_str(name);
    out.push('(');
    for (i, code) in codes.into_iter().enumerate() {
        if i > 0 {
            out.push_str(", ");
        }
        code.describe_into(out);
    }
    out.push(')');
}

fn eval_to_closure(code: &Code, env: &Env) -> RunResult<Rc<Closure>> {
    match code.eval(env)? {
        Value::Closure(closure) => Ok(closure),
        other => Err(RunError::assert(format!(
            "let binding requires a closure, got {}",
            other.type_name()
        ))),
    }
}

/// A user-defined function: a match table and a captured environment.
///
/// The captured environment is always a fixed snapshot, so a closure can
/// safely outlive the mutable frames it was created under.
#[derive(Debug)]
pub struct Closure {
    pub(crate) arms: Rc<[(Rc<Pattern>, Code)]>,
    pub(crate) captured: Env,
    pub(crate) pos: Option<Pos>,
}

impl Closure {
    /// Invokes the closure: the first arm whose pattern matches evaluates its
    /// body; exhaustion raises `Bind` at the closure's position.
    pub fn apply(&self, arg: &Value) -> RunResult<Value> {
        for (pattern, body) in self.arms.iter() {
            let binder = self.captured.bind_pattern(Rc::clone(pattern));
            if binder.set_opt(arg)? {
                return body.eval(binder.env());
            }
        }
        Err(Fault::new(FaultKind::Bind).or_pos(self.pos).into())
    }

    /// Performs the binding step of a `let` without evaluating the let body:
    /// evaluates the right-hand side in `env`, binds the pattern, and returns
    /// the extended environment. A refutable pattern that fails raises
    /// `Bind`.
    pub fn eval_bind(&self, env: &Env) -> RunResult<Env> {
        let (pattern, rhs) = self
            .arms
            .first()
            .ok_or_else(|| RunError::assert("closure has an empty match table"))?;
        let value = rhs.eval(env)?;
        let binder = env.bind_pattern(Rc::clone(pattern));
        binder.set(&value).map_err(|err| match err {
            RunError::Fault(fault) => RunError::Fault(fault.or_pos(self.pos)),
            other => other,
        })?;
        Ok(binder.env().clone())
    }
}

/// Applies a function value to one argument.
///
/// Closures run their match table; built-ins either complete (arity reached)
/// or return a further partial application. Tupled built-ins of arity N
/// accept a single N-tuple here.
pub fn apply(env: &Env, func: &Value, arg: Value) -> RunResult<Value> {
    match func {
        Value::Closure(closure) => closure.apply(&arg),
        Value::Fn(builtin) => {
            let arity = builtin.arity();
            if builtin.curried() {
                let mut next = builtin.clone();
                next.applied.push(arg);
                if next.applied.len() == arity {
                    let args = next.applied.drain(..).collect();
                    invoke_builtin(env, &next, args)
                } else {
                    Ok(Value::Fn(next))
                }
            } else if arity == 1 {
                let mut args = ArgValues::new();
                args.push(arg);
                invoke_builtin(env, builtin, args)
            } else {
                // A tupled built-in applied to its argument tuple.
                let args: ArgValues = arg.as_tuple()?.iter().cloned().collect();
                if args.len() != arity {
                    return Err(RunError::assert(format!(
                        "{} expects a {arity}-tuple argument",
                        builtin.name()
                    )));
                }
                invoke_builtin(env, builtin, args)
            }
        }
        other => Err(RunError::assert(format!("{} is not applicable", other.type_name()))),
    }
}

/// Dispatches a built-in call, stamping the built-in's position onto any
/// fault that does not already carry one.
pub(crate) fn invoke_builtin(env: &Env, builtin: &BuiltinFn, args: ArgValues) -> RunResult<Value> {
    if args.len() != builtin.arity() {
        return Err(RunError::assert(format!(
            "{} expects {} argument(s), got {}",
            builtin.name(),
            builtin.arity(),
            args.len()
        )));
    }
    builtin.func.call(env, args).map_err(|err| match err {
        RunError::Fault(fault) => RunError::Fault(fault.or_pos(builtin.pos)),
        other => other,
    })
}

/// Evaluates a root Code tree, recording its structural description as the
/// session's plan first.
pub fn execute(code: &Code, env: &Env) -> RunResult<Value> {
    if let Ok(session) = env.session() {
        session.borrow_mut().set_plan(code.describe());
    }
    code.eval(env)
}
