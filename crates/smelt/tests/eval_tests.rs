//! Behavioral tests for the Code tree evaluator: node semantics, closure
//! creation and invocation, `let` binding, and fault attribution.

use std::{cell::RefCell, rc::Rc};

use pretty_assertions::assert_eq;
use smelt::{Code, Env, Fault, FaultKind, OrdinalRef, Pattern, Pos, RunError, Session, Value, apply, execute};

fn standard_env() -> Env {
    Env::standard(Rc::new(RefCell::new(Session::new())))
}

fn int(n: i32) -> Code {
    Code::constant(Value::Int(n))
}

/// `x + y` over environment lookups, as the frontend emits it.
fn plus(env: &Env, x: Code, y: Code) -> Code {
    Code::ApplyN {
        func: env.builtin_fn("Int.+").unwrap(),
        arg_codes: vec![x, y],
    }
}

// =============================================================================
// 1. Plain nodes
// =============================================================================

/// A constant evaluates to itself and is flagged constant.
#[test]
fn constant_round_trips() {
    let env = standard_env();
    let code = int(42);
    assert!(code.is_constant());
    assert_eq!(code.eval(&env).unwrap(), Value::Int(42));
}

/// Tuple children evaluate left to right and land in order.
#[test]
fn tuple_preserves_order() {
    let env = standard_env();
    let code = Code::Tuple(vec![int(1), int(2), int(3)]);
    assert_eq!(
        code.eval(&env).unwrap(),
        Value::tuple(vec![Value::Int(1), Value::Int(2), Value::Int(3)])
    );
}

/// `GetTuple` reads several names into a fresh tuple.
#[test]
fn get_tuple_reads_the_environment() {
    let binder = standard_env().bind_single("a");
    binder.set(Value::Int(10));
    let inner = binder.env().bind_single("b");
    inner.set(Value::Int(20));

    let code = Code::GetTuple(vec![Rc::from("b"), Rc::from("a")]);
    assert_eq!(
        code.eval(inner.env()).unwrap(),
        Value::tuple(vec![Value::Int(20), Value::Int(10)])
    );
}

/// `andalso` never evaluates its right side when the left is false; the
/// right side here would fault if reached.
#[test]
fn andalso_short_circuits() {
    let env = standard_env();
    let exploding = Code::ApplyN {
        func: env.builtin_fn("List.hd").unwrap(),
        arg_codes: vec![Code::constant(Value::list(vec![]))],
    };
    let code = Code::and_also(Code::constant(Value::Bool(false)), exploding.clone());
    assert_eq!(code.eval(&env).unwrap(), Value::Bool(false));

    let code = Code::or_else(Code::constant(Value::Bool(true)), exploding);
    assert_eq!(code.eval(&env).unwrap(), Value::Bool(true));
}

/// Ordinal counters increment before their wrapped code runs.
#[test]
fn ordinal_counters_tick() {
    let env = standard_env();
    let slot = OrdinalRef::new();
    let code = Code::OrdinalInc {
        slot: slot.clone(),
        next: Box::new(Code::OrdinalGet(slot.clone())),
    };
    assert_eq!(code.eval(&env).unwrap(), Value::Int(1));
    assert_eq!(code.eval(&env).unwrap(), Value::Int(2));
    assert_eq!(slot.get(), 2);
}

/// `WrapRelList` forces an extent into a plain list and passes everything
/// else through.
#[test]
fn wrap_rel_list_forces_extents() {
    let env = standard_env();
    let extent = Value::Extent(Rc::new(smelt::RangeExtent::new(
        "bool",
        vec![Value::Bool(false), Value::Bool(true)],
    )));
    let code = Code::wrap_rel_list(Code::constant(extent));
    assert_eq!(
        code.eval(&env).unwrap(),
        Value::list(vec![Value::Bool(false), Value::Bool(true)])
    );

    let passthrough = Code::wrap_rel_list(int(5));
    assert_eq!(passthrough.eval(&env).unwrap(), Value::Int(5));
}

// =============================================================================
// 2. Let and pattern binding
// =============================================================================

/// `let val (x, y) = (1, 2) in x + y end` yields 3 and leaves the outer
/// environment untouched.
#[test]
fn let_with_tuple_pattern() {
    let env = standard_env();
    let code = Code::let1(
        Code::lambda(
            Pattern::Tuple(vec![Pattern::id("x"), Pattern::id("y")]),
            Code::Tuple(vec![int(1), int(2)]),
            None,
        ),
        plus(&env, Code::get("x"), Code::get("y")),
    );
    assert_eq!(code.eval(&env).unwrap(), Value::Int(3));
    assert!(env.get_opt("x").is_none(), "let must not leak bindings");
}

/// Multiple `let` bindings thread left to right: the second sees the first.
#[test]
fn let_bindings_thread() {
    let env = standard_env();
    let code = Code::let_many(
        vec![
            Code::lambda(Pattern::id("x"), int(5), None),
            Code::lambda(Pattern::id("y"), plus(&env, Code::get("x"), int(1)), None),
        ],
        plus(&env, Code::get("x"), Code::get("y")),
    );
    assert_eq!(code.eval(&env).unwrap(), Value::Int(11));
}

/// A refutable `let` pattern that fails raises `Bind`.
#[test]
fn refutable_let_raises_bind() {
    let env = standard_env();
    let code = Code::let1(
        Code::lambda(
            Pattern::con("SOME", Pattern::id("x")),
            Code::constant(Value::none()),
            None,
        ),
        Code::get("x"),
    );
    let err = code.eval(&env).unwrap_err();
    assert_eq!(err, RunError::Fault(Fault::new(FaultKind::Bind)));
}

// =============================================================================
// 3. Closures and application
// =============================================================================

/// `val add = fn x => fn y => x + y; add 3 4` yields 7: the inner closure
/// captures `x` from the outer invocation.
#[test]
fn curried_closure_application() {
    let env = standard_env();
    let add = Code::lambda(
        Pattern::id("x"),
        Code::lambda(Pattern::id("y"), plus(&env, Code::get("x"), Code::get("y")), None),
        None,
    );
    let code = Code::apply(Code::apply(add, int(3)), int(4));
    assert_eq!(code.eval(&env).unwrap(), Value::Int(7));
}

/// A closure's capture is a fixed snapshot: later writes to the frame it
/// closed over are invisible.
#[test]
fn closures_capture_snapshots() {
    let binder = standard_env().bind_single("n");
    binder.set(Value::Int(1));
    let f = Code::lambda(Pattern::Wildcard, Code::get("n"), None)
        .eval(binder.env())
        .unwrap();
    binder.set(Value::Int(99));
    assert_eq!(apply(binder.env(), &f, Value::Unit).unwrap(), Value::Int(1));
}

/// Match arms try in order; the first match wins.
#[test]
fn match_arms_try_in_order() {
    let env = standard_env();
    let f = Code::lambda_arms(
        vec![
            (Pattern::LitInt(0), Code::constant(Value::string("zero"))),
            (Pattern::id("n"), Code::get("n")),
        ],
        None,
    )
    .eval(&env)
    .unwrap();
    assert_eq!(apply(&env, &f, Value::Int(0)).unwrap(), Value::string("zero"));
    assert_eq!(apply(&env, &f, Value::Int(7)).unwrap(), Value::Int(7));
}

/// `fn (x :: xs) => x` applied to the empty list raises `Bind` carrying the
/// function's source position.
#[test]
fn match_exhaustion_raises_bind_at_the_closure() {
    let env = standard_env();
    let pos = Pos::new(3, 14, 3, 30);
    let f = Code::lambda(
        Pattern::cons(Pattern::id("x"), Pattern::id("xs")),
        Code::get("x"),
        Some(pos),
    )
    .eval(&env)
    .unwrap();
    let err = apply(&env, &f, Value::list(vec![])).unwrap_err();
    assert_eq!(err, RunError::Fault(Fault::new(FaultKind::Bind).or_pos(Some(pos))));
}

/// Partially applying a curried built-in materializes an `Fn` value that can
/// be stored and completed later.
#[test]
fn partial_application_of_builtins() {
    let env = standard_env();
    let map = env.get("List.map").unwrap();
    let increment = Code::lambda(Pattern::id("n"), plus(&env, Code::get("n"), int(1)), None)
        .eval(&env)
        .unwrap();

    let mapper = apply(&env, &map, increment).unwrap();
    assert!(matches!(mapper, Value::Fn(_)), "one argument short of arity");

    let out = apply(&env, &mapper, Value::list(vec![Value::Int(1), Value::Int(2)])).unwrap();
    assert_eq!(out, Value::list(vec![Value::Int(2), Value::Int(3)]));
}

/// A tupled built-in accepts its arguments as one tuple through general
/// application.
#[test]
fn tupled_builtin_through_general_apply() {
    let env = standard_env();
    let div = env.get("Int.div").unwrap();
    let out = apply(&env, &div, Value::tuple(vec![Value::Int(-7), Value::Int(2)])).unwrap();
    assert_eq!(out, Value::Int(-4));
}

/// `ApplyNTuple` destructures a tuple-producing argument into an N-ary call.
#[test]
fn apply_n_tuple_destructures() {
    let env = standard_env();
    let code = Code::ApplyNTuple {
        func: env.builtin_fn("Int.quot").unwrap(),
        arg_code: Box::new(Code::Tuple(vec![int(-7), int(2)])),
    };
    assert_eq!(code.eval(&env).unwrap(), Value::Int(-3));
}

// =============================================================================
// 4. Fault positions and plans
// =============================================================================

/// A positioned built-in stamps its position onto faults it raises.
#[test]
fn positioned_builtin_attributes_faults() {
    let env = standard_env();
    let pos = Pos::point(7, 2);
    let code = Code::ApplyN {
        func: env.builtin_fn("List.hd").unwrap().with_pos(pos),
        arg_codes: vec![Code::constant(Value::list(vec![]))],
    };
    let err = code.eval(&env).unwrap_err();
    assert_eq!(err, RunError::Fault(Fault::new(FaultKind::Empty).or_pos(Some(pos))));
}

/// `execute` records the plan on the session, retrievable through
/// `Sys.plan`.
#[test]
fn execute_records_the_plan() {
    let session = Rc::new(RefCell::new(Session::new()));
    let env = Env::standard(Rc::clone(&session));
    let code = plus(&env, int(1), int(2));
    assert_eq!(execute(&code, &env).unwrap(), Value::Int(3));
    assert_eq!(session.borrow().plan(), "apply2(fnValue Int.+, constant(1), constant(2))");

    let plan_code = Code::ApplyN {
        func: env.builtin_fn("Sys.plan").unwrap(),
        arg_codes: vec![Code::constant(Value::Unit)],
    };
    assert_eq!(
        plan_code.eval(&env).unwrap(),
        Value::string("apply2(fnValue Int.+, constant(1), constant(2))")
    );
}
