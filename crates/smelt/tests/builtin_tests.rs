//! End-to-end tests for the built-in library through the evaluator: boundary
//! behaviors, round trips, and the session-facing structures.

use std::{cell::RefCell, rc::Rc};

use pretty_assertions::assert_eq;
use smelt::{Code, Env, Fault, FaultKind, Pattern, RunError, RunResult, Session, SourceDriver, Value, apply};

fn standard_env() -> Env {
    Env::standard(Rc::new(RefCell::new(Session::new())))
}

/// Applies a registered built-in to the given curried argument chain.
fn call_builtin(env: &Env, name: &str, args: Vec<Value>) -> RunResult<Value> {
    let mut current = env.get(name).unwrap();
    let mut result = None;
    for arg in args {
        result = Some(apply(env, &current, arg)?);
        current = result.clone().unwrap();
    }
    Ok(result.expect("at least one argument"))
}

fn ints(values: &[i32]) -> Value {
    Value::list(values.iter().map(|&n| Value::Int(n)).collect())
}

// =============================================================================
// 1. Char and String boundaries
// =============================================================================

/// `Char.chr 255` is `#"\255"`; `Char.chr 256` raises `Chr`.
#[test]
fn chr_boundary() {
    let env = standard_env();
    assert_eq!(
        call_builtin(&env, "Char.chr", vec![Value::Int(255)]).unwrap(),
        Value::Char(255)
    );
    let err = call_builtin(&env, "Char.chr", vec![Value::Int(256)]).unwrap_err();
    assert_eq!(err, RunError::Fault(Fault::new(FaultKind::Chr)));
}

/// `String.concatWith "," ["a","b","c"]` is `"a,b,c"`.
#[test]
fn concat_with() {
    let env = standard_env();
    let list = Value::list(vec![Value::string("a"), Value::string("b"), Value::string("c")]);
    assert_eq!(
        call_builtin(&env, "String.concatWith", vec![Value::string(","), list]).unwrap(),
        Value::string("a,b,c")
    );
}

/// `fields` keeps empty pieces, `tokens` drops them, both driven by a
/// user-supplied predicate closure.
#[test]
fn fields_and_tokens() {
    let env = standard_env();
    // fn c => c = #","
    let is_comma = Code::lambda(
        Pattern::id("c"),
        Code::ApplyN {
            func: env.builtin_fn("op =").unwrap(),
            arg_codes: vec![Code::get("c"), Code::constant(Value::Char(b','))],
        },
        None,
    )
    .eval(&env)
    .unwrap();

    let fields = call_builtin(&env, "String.fields", vec![is_comma.clone(), Value::string(",a,,")]).unwrap();
    assert_eq!(
        fields,
        Value::list(vec![
            Value::string(""),
            Value::string("a"),
            Value::string(""),
            Value::string(""),
        ])
    );

    let tokens = call_builtin(&env, "String.tokens", vec![is_comma, Value::string(",a,,")]).unwrap();
    assert_eq!(tokens, Value::list(vec![Value::string("a")]));
}

/// `String.explode` and `implode` invert each other.
#[test]
fn explode_implode_round_trip() {
    let env = standard_env();
    let exploded = call_builtin(&env, "explode", vec![Value::string("hi!")]).unwrap();
    assert_eq!(call_builtin(&env, "implode", vec![exploded]).unwrap(), Value::string("hi!"));
}

// =============================================================================
// 2. Int and Real boundaries
// =============================================================================

/// Floored versus truncated division, end to end.
#[test]
fn floored_and_truncated_division() {
    let env = standard_env();
    let pair = Value::tuple(vec![Value::Int(-7), Value::Int(2)]);
    assert_eq!(call_builtin(&env, "Int.div", vec![pair.clone()]).unwrap(), Value::Int(-4));
    assert_eq!(call_builtin(&env, "Int.mod", vec![pair.clone()]).unwrap(), Value::Int(1));
    assert_eq!(call_builtin(&env, "Int.quot", vec![pair.clone()]).unwrap(), Value::Int(-3));
    assert_eq!(call_builtin(&env, "Int.rem", vec![pair]).unwrap(), Value::Int(-1));
}

/// `Int.fromString o Int.toString` is the identity, with `~` as the minus
/// sign.
#[test]
fn int_string_round_trip() {
    let env = standard_env();
    for n in [0, 7, -7, i32::MAX, i32::MIN] {
        let printed = call_builtin(&env, "Int.toString", vec![Value::Int(n)]).unwrap();
        let parsed = call_builtin(&env, "Int.fromString", vec![printed]).unwrap();
        assert_eq!(parsed, Value::some(Value::Int(n)));
    }
    assert_eq!(
        call_builtin(&env, "Int.toString", vec![Value::Int(-3)]).unwrap(),
        Value::string("~3")
    );
}

/// `Int.minInt` exposes the true lower bound.
#[test]
fn int_bounds() {
    let env = standard_env();
    assert_eq!(env.get("Int.maxInt").unwrap(), Value::some(Value::Int(2_147_483_647)));
    assert_eq!(env.get("Int.minInt").unwrap(), Value::some(Value::Int(-2_147_483_648)));
}

/// `Real.checkFloat` separates `Overflow` (infinities) from `Div` (nan).
#[test]
fn check_float_boundaries() {
    let env = standard_env();
    let err = call_builtin(&env, "Real.checkFloat", vec![Value::Real(f32::INFINITY)]).unwrap_err();
    assert_eq!(err, RunError::Fault(Fault::new(FaultKind::Overflow)));

    // 0.0 / 0.0 through the real division operator, then checkFloat.
    let nan = call_builtin(
        &env,
        "Real./",
        vec![Value::tuple(vec![Value::Real(0.0), Value::Real(0.0)])],
    )
    .unwrap();
    let err = call_builtin(&env, "Real.checkFloat", vec![nan]).unwrap_err();
    assert_eq!(err, RunError::Fault(Fault::new(FaultKind::Div)));
}

/// `Real.compare` is antisymmetric on non-nan values.
#[test]
fn real_compare_antisymmetry() {
    let env = standard_env();
    for (a, b) in [(1.0f32, 2.0f32), (-0.5, 0.5), (3.25, 3.25)] {
        let forward = call_builtin(&env, "Real.compare", vec![Value::tuple(vec![Value::Real(a), Value::Real(b)])])
            .unwrap();
        let backward = call_builtin(&env, "Real.compare", vec![Value::tuple(vec![Value::Real(b), Value::Real(a)])])
            .unwrap();
        let inverse = match &*forward.to_string() {
            "LESS" => "GREATER",
            "GREATER" => "LESS",
            _ => "EQUAL",
        };
        assert_eq!(backward, Value::string(inverse));
    }
}

/// `Real.fromString o Real.toString` round-trips finite values.
#[test]
fn real_string_round_trip() {
    let env = standard_env();
    for x in [0.5f32, -2.25, 100.0, 7.5e-20] {
        let printed = call_builtin(&env, "Real.toString", vec![Value::Real(x)]).unwrap();
        let parsed = call_builtin(&env, "Real.fromString", vec![printed]).unwrap();
        assert_eq!(parsed, Value::some(Value::Real(x)));
    }
}

// =============================================================================
// 3. Lists, vectors, options
// =============================================================================

/// `List.take (xs, length xs)` is `xs`; `List.take (xs, ~1)` raises
/// `Subscript`.
#[test]
fn take_boundaries() {
    let env = standard_env();
    let xs = ints(&[1, 2, 3]);
    assert_eq!(
        call_builtin(&env, "List.take", vec![Value::tuple(vec![xs.clone(), Value::Int(3)])]).unwrap(),
        xs
    );
    let err = call_builtin(&env, "List.take", vec![Value::tuple(vec![xs, Value::Int(-1)])]).unwrap_err();
    assert_eq!(err, RunError::Fault(Fault::new(FaultKind::Subscript)));
}

/// `foldl op:: nil xs` reverses the list.
#[test]
fn foldl_cons_reverses() {
    let env = standard_env();
    let cons = env.get("op ::").unwrap();
    let out = call_builtin(&env, "foldl", vec![cons, Value::list(vec![]), ints(&[1, 2, 3])]).unwrap();
    assert_eq!(out, ints(&[3, 2, 1]));
}

/// `List.rev (List.rev xs)` is `xs`.
#[test]
fn rev_involution() {
    let env = standard_env();
    let xs = ints(&[5, 6, 7]);
    let once = call_builtin(&env, "rev", vec![xs.clone()]).unwrap();
    assert_eq!(call_builtin(&env, "rev", vec![once]).unwrap(), xs);
}

/// `Vector.update` is bounds-checked at `length vec`.
#[test]
fn vector_update_boundary() {
    let env = standard_env();
    let v = ints(&[1, 2]);
    let err = call_builtin(
        &env,
        "Vector.update",
        vec![Value::tuple(vec![v, Value::Int(2), Value::Int(9)])],
    )
    .unwrap_err();
    assert_eq!(err, RunError::Fault(Fault::new(FaultKind::Subscript)));
}

/// `Option.map (fn x => x + 1) (SOME 41)` is `SOME 42`; `NONE` maps to
/// `NONE`; `Option.map id` is the identity.
#[test]
fn option_map() {
    let env = standard_env();
    let increment = Code::lambda(
        Pattern::id("x"),
        Code::ApplyN {
            func: env.builtin_fn("Int.+").unwrap(),
            arg_codes: vec![Code::get("x"), Code::constant(Value::Int(1))],
        },
        None,
    )
    .eval(&env)
    .unwrap();
    assert_eq!(
        call_builtin(&env, "Option.map", vec![increment.clone(), Value::some(Value::Int(41))]).unwrap(),
        Value::some(Value::Int(42))
    );
    assert_eq!(
        call_builtin(&env, "Option.map", vec![increment, Value::none()]).unwrap(),
        Value::none()
    );

    let id = Code::lambda(Pattern::id("x"), Code::get("x"), None).eval(&env).unwrap();
    for opt in [Value::none(), Value::some(Value::string("v"))] {
        assert_eq!(call_builtin(&env, "Option.map", vec![id.clone(), opt.clone()]).unwrap(), opt);
    }
}

/// `ListPair.zipEq` faults on a length mismatch, `zip` truncates.
#[test]
fn list_pair_length_policy() {
    let env = standard_env();
    let pair = Value::tuple(vec![ints(&[1, 2, 3]), ints(&[4, 5])]);
    let zipped = call_builtin(&env, "ListPair.zip", vec![pair.clone()]).unwrap();
    assert_eq!(
        zipped,
        Value::list(vec![
            Value::tuple(vec![Value::Int(1), Value::Int(4)]),
            Value::tuple(vec![Value::Int(2), Value::Int(5)]),
        ])
    );
    let err = call_builtin(&env, "ListPair.zipEq", vec![pair]).unwrap_err();
    assert_eq!(err, RunError::Fault(Fault::new(FaultKind::UnequalLengths)));
}

/// `Relational.iterate` accumulates until a step adds nothing: the closure
/// of `[1]` under doubling, bounded at 8.
#[test]
fn relational_iterate_reaches_a_fixpoint() {
    let env = standard_env();
    // fn d => d <= 8
    let small_enough = Code::lambda(
        Pattern::id("d"),
        Code::ApplyN {
            func: env.builtin_fn("op <=").unwrap(),
            arg_codes: vec![Code::get("d"), Code::constant(Value::Int(8))],
        },
        None,
    );
    // fn n => Option.filter (fn d => d <= 8) (n * 2)
    let step_one = Code::lambda(
        Pattern::id("n"),
        Code::apply(
            Code::apply(Code::get("Option.filter"), small_enough),
            Code::ApplyN {
                func: env.builtin_fn("Int.*").unwrap(),
                arg_codes: vec![Code::get("n"), Code::constant(Value::Int(2))],
            },
        ),
        None,
    );
    // fn (_, recent) => List.mapPartial stepOne recent
    let update = Code::lambda(
        Pattern::Tuple(vec![Pattern::Wildcard, Pattern::id("recent")]),
        Code::apply(
            Code::apply(Code::get("List.mapPartial"), step_one),
            Code::get("recent"),
        ),
        None,
    )
    .eval(&env)
    .unwrap();

    let out = call_builtin(&env, "Relational.iterate", vec![ints(&[1]), update]).unwrap();
    assert_eq!(out, ints(&[1, 2, 4, 8]));
}

// =============================================================================
// 4. Session-facing structures
// =============================================================================

/// `Sys.set` / `show` / `unset` manipulate the property map; unknown names
/// fault with `Error`.
#[test]
fn sys_properties_end_to_end() {
    let env = standard_env();
    let set = Value::tuple(vec![Value::string("printLength"), Value::Int(20)]);
    call_builtin(&env, "Sys.set", vec![set]).unwrap();
    assert_eq!(
        call_builtin(&env, "Sys.show", vec![Value::string("printLength")]).unwrap(),
        Value::some(Value::string("20"))
    );
    call_builtin(&env, "Sys.unset", vec![Value::string("printLength")]).unwrap();
    assert_eq!(
        call_builtin(&env, "Sys.show", vec![Value::string("printLength")]).unwrap(),
        Value::none()
    );

    let err = call_builtin(&env, "Sys.show", vec![Value::string("noSuchProp")]).unwrap_err();
    assert!(matches!(err, RunError::Fault(Fault { kind: FaultKind::Error, .. })));
}

/// `Sys.clearEnv` resets the property map; `Sys.env` lists only what is
/// set.
#[test]
fn sys_clear_env() {
    let env = standard_env();
    call_builtin(
        &env,
        "Sys.set",
        vec![Value::tuple(vec![Value::string("hybrid"), Value::Bool(true)])],
    )
    .unwrap();
    let listed = call_builtin(&env, "Sys.env", vec![Value::Unit]).unwrap();
    assert_eq!(
        listed,
        Value::list(vec![Value::tuple(vec![Value::string("hybrid"), Value::string("true")])])
    );
    call_builtin(&env, "Sys.clearEnv", vec![Value::Unit]).unwrap();
    assert_eq!(call_builtin(&env, "Sys.env", vec![Value::Unit]).unwrap(), Value::list(vec![]));
}

struct RecordingDriver {
    calls: Rc<RefCell<Vec<(String, bool)>>>,
}

impl SourceDriver for RecordingDriver {
    fn run_file(&mut self, path: &str, silent: bool) -> Result<(), String> {
        if path == "missing.sml" {
            return Err(format!("cannot read {path}"));
        }
        self.calls.borrow_mut().push((path.to_string(), silent));
        Ok(())
    }
}

/// `Interact.use` delegates to the installed driver; driver failures raise
/// `Error` faults, and a missing driver does too.
#[test]
fn interact_use_delegates_to_the_driver() {
    let session = Rc::new(RefCell::new(Session::new()));
    let calls = Rc::new(RefCell::new(Vec::new()));
    session
        .borrow_mut()
        .set_driver(Box::new(RecordingDriver { calls: Rc::clone(&calls) }));
    let env = Env::standard(Rc::clone(&session));

    call_builtin(&env, "use", vec![Value::string("script.sml")]).unwrap();
    call_builtin(&env, "Interact.useSilently", vec![Value::string("quiet.sml")]).unwrap();
    assert_eq!(
        *calls.borrow(),
        vec![("script.sml".to_string(), false), ("quiet.sml".to_string(), true)]
    );

    let err = call_builtin(&env, "use", vec![Value::string("missing.sml")]).unwrap_err();
    assert!(matches!(err, RunError::Fault(Fault { kind: FaultKind::Error, .. })));

    let bare = standard_env();
    let err = call_builtin(&bare, "use", vec![Value::string("script.sml")]).unwrap_err();
    assert!(matches!(err, RunError::Fault(Fault { kind: FaultKind::Error, .. })));
}
