use std::{cell::RefCell, fmt, rc::Rc};

use ahash::AHashMap;

use crate::{
    fault::{Fault, FaultKind, RunError, RunResult},
    pattern::{Pattern, SlotBuf, bind},
    session::Session,
    value::Value,
};

/// The reserved name of the session binding. The `$` prefix keeps it out of
/// reach of source identifiers, so user code can never shadow it.
pub(crate) const SESSION_NAME: &str = "$session";

/// A lexically chained environment.
///
/// `Env` is a cheap handle on an `Rc` chain of frames composed back to front:
/// inner names shadow outer ones, lookup walks inner to outer. Mutable frames
/// expose their slots through binder handles ([`MutableSingle`] and friends);
/// [`Env::fix`] snapshots the whole chain into immutable frames for closure
/// capture.
#[derive(Debug, Clone)]
pub struct Env(Rc<Frame>);

#[derive(Debug)]
enum Frame {
    /// Immutable root mapping, built once at startup.
    Root(AHashMap<Rc<str>, Value>),
    /// One mutable slot.
    Single {
        parent: Env,
        name: Rc<str>,
        slot: RefCell<Value>,
    },
    /// N mutable slots addressed by name position. Backs array, list and
    /// pattern frames; the binder handle determines the write discipline.
    Block {
        parent: Env,
        names: Rc<[Rc<str>]>,
        slots: RefCell<Vec<Value>>,
    },
    /// Snapshot of a `Single` frame.
    FixedSingle { parent: Env, name: Rc<str>, value: Value },
    /// Snapshot of a `Block` frame.
    FixedBlock {
        parent: Env,
        names: Rc<[Rc<str>]>,
        values: Vec<Value>,
    },
}

impl Env {
    /// An environment with no bindings at all.
    pub fn empty() -> Self {
        Self(Rc::new(Frame::Root(AHashMap::new())))
    }

    /// A root environment holding the given mapping.
    pub fn copy_of(map: AHashMap<Rc<str>, Value>) -> Self {
        Self(Rc::new(Frame::Root(map)))
    }

    /// The standard root: every built-in plus the session at its reserved
    /// name. This is the environment the driver copies into every user
    /// evaluation.
    pub fn standard(session: Rc<RefCell<Session>>) -> Self {
        let mut map = crate::modules::environment();
        map.insert(SESSION_NAME.into(), Value::Session(session));
        Self::copy_of(map)
    }

    /// Looks up a name, inner frames first. Unbound names are an assertion
    /// failure: the frontend resolves every identifier before emitting Code.
    pub fn get(&self, name: &str) -> RunResult<Value> {
        self.get_opt(name)
            .ok_or_else(|| RunError::assert(format!("unbound name \"{name}\"")))
    }

    /// Looks up a name, returning `None` when unbound.
    pub fn get_opt(&self, name: &str) -> Option<Value> {
        let mut frame = &self.0;
        loop {
            match &**frame {
                Frame::Root(map) => return map.get(name).cloned(),
                Frame::Single { parent, name: n, slot } => {
                    if &**n == name {
                        return Some(slot.borrow().clone());
                    }
                    frame = &parent.0;
                }
                Frame::FixedSingle { parent, name: n, value } => {
                    if &**n == name {
                        return Some(value.clone());
                    }
                    frame = &parent.0;
                }
                Frame::Block { parent, names, slots } => {
                    // Frames are small; a linear scan beats hashing here.
                    if let Some(i) = names.iter().position(|n| &**n == name) {
                        return Some(slots.borrow()[i].clone());
                    }
                    frame = &parent.0;
                }
                Frame::FixedBlock { parent, names, values } => {
                    if let Some(i) = names.iter().position(|n| &**n == name) {
                        return Some(values[i].clone());
                    }
                    frame = &parent.0;
                }
            }
        }
    }

    /// The session bound at the reserved name.
    pub fn session(&self) -> RunResult<Rc<RefCell<Session>>> {
        self.get(SESSION_NAME)?.as_session()
    }

    /// Looks up a built-in by its registered name, for direct `ApplyN`
    /// construction by the frontend.
    pub fn builtin_fn(&self, name: &str) -> RunResult<crate::value::BuiltinFn> {
        match self.get(name)? {
            Value::Fn(builtin) => Ok(*builtin),
            other => Err(RunError::assert(format!("{name} is {}, not a built-in", other.type_name()))),
        }
    }

    /// Enumerates (name, value) pairs inner-first. Shadowed outer bindings
    /// are still visited; callers that need shadowing semantics dedupe.
    pub fn visit(&self, f: &mut impl FnMut(&str, &Value)) {
        let mut frame = &self.0;
        loop {
            match &**frame {
                Frame::Root(map) => {
                    for (name, value) in map {
                        f(name, value);
                    }
                    return;
                }
                Frame::Single { parent, name, slot } => {
                    f(name, &slot.borrow());
                    frame = &parent.0;
                }
                Frame::FixedSingle { parent, name, value } => {
                    f(name, value);
                    frame = &parent.0;
                }
                Frame::Block { parent, names, slots } => {
                    let slots = slots.borrow();
                    for (name, value) in names.iter().zip(slots.iter()) {
                        f(name, value);
                    }
                    frame = &parent.0;
                }
                Frame::FixedBlock { parent, names, values } => {
                    for (name, value) in names.iter().zip(values.iter()) {
                        f(name, value);
                    }
                    frame = &parent.0;
                }
            }
        }
    }

    /// Returns an immutable snapshot of the whole chain, suitable for capture
    /// by closures that outlive the mutable frames.
    pub fn fix(&self) -> Self {
        match &*self.0 {
            // Fixed frames are only ever built on top of fixed parents, so
            // the handle can be shared as-is.
            Frame::Root(_) | Frame::FixedSingle { .. } | Frame::FixedBlock { .. } => self.clone(),
            Frame::Single { parent, name, slot } => Self(Rc::new(Frame::FixedSingle {
                parent: parent.fix(),
                name: Rc::clone(name),
                value: slot.borrow().clone(),
            })),
            Frame::Block { parent, names, slots } => Self(Rc::new(Frame::FixedBlock {
                parent: parent.fix(),
                names: Rc::clone(names),
                values: slots.borrow().clone(),
            })),
        }
    }

    /// Attaches a single uninitialized mutable slot.
    pub fn bind_single(&self, name: impl Into<Rc<str>>) -> MutableSingle {
        MutableSingle {
            env: Self(Rc::new(Frame::Single {
                parent: self.clone(),
                name: name.into(),
                slot: RefCell::new(Value::Unit),
            })),
        }
    }

    /// Attaches N mutable slots written atomically from a tuple-shaped value.
    pub fn bind_array(&self, names: Vec<Rc<str>>) -> MutableArray {
        MutableArray { env: self.block(names) }
    }

    /// Attaches N mutable slots written from a list value.
    pub fn bind_list(&self, names: Vec<Rc<str>>) -> MutableList {
        MutableList { env: self.block(names) }
    }

    /// Attaches slots driven by a pattern; `set_opt` runs the binding engine.
    pub fn bind_pattern(&self, pattern: impl Into<Rc<Pattern>>) -> MutablePattern {
        let pattern = pattern.into();
        let names = pattern.names();
        MutablePattern { env: self.block(names), pattern }
    }

    fn block(&self, names: Vec<Rc<str>>) -> Self {
        let slots = vec![Value::Unit; names.len()];
        Self(Rc::new(Frame::Block {
            parent: self.clone(),
            names: names.into(),
            slots: RefCell::new(slots),
        }))
    }

    fn write_single(&self, value: Value) {
        match &*self.0 {
            Frame::Single { slot, .. } => *slot.borrow_mut() = value,
            _ => unreachable!("binder handle always wraps its own frame"),
        }
    }

    fn write_block(&self, values: &mut dyn Iterator<Item = Value>) {
        match &*self.0 {
            Frame::Block { slots, .. } => {
                let mut slots = slots.borrow_mut();
                for (slot, value) in slots.iter_mut().zip(values) {
                    *slot = value;
                }
            }
            _ => unreachable!("binder handle always wraps its own frame"),
        }
    }

    fn block_len(&self) -> usize {
        match &*self.0 {
            Frame::Block { names, .. } => names.len(),
            _ => unreachable!("binder handle always wraps its own frame"),
        }
    }
}

/// Write handle for a single-slot frame.
///
/// The mutability window is strictly lexical: the owner stops writing once
/// the evaluator unwinds past the region that created the binder.
#[derive(Debug, Clone)]
pub struct MutableSingle {
    env: Env,
}

impl MutableSingle {
    pub fn env(&self) -> &Env {
        &self.env
    }

    pub fn set(&self, value: Value) {
        self.env.write_single(value);
    }
}

/// Write handle for an array frame: all slots are written in one step.
#[derive(Debug, Clone)]
pub struct MutableArray {
    env: Env,
}

impl MutableArray {
    pub fn env(&self) -> &Env {
        &self.env
    }

    /// Writes every slot from a tuple-shaped value whose length must equal
    /// the frame's name count.
    pub fn set(&self, value: &Value) -> RunResult<()> {
        let items = value.as_tuple()?;
        if items.len() != self.env.block_len() {
            return Err(RunError::assert(format!(
                "array frame expects {} values, got {}",
                self.env.block_len(),
                items.len()
            )));
        }
        self.env.write_block(&mut items.iter().cloned());
        Ok(())
    }
}

/// Write handle for a list-view frame.
#[derive(Debug, Clone)]
pub struct MutableList {
    env: Env,
}

impl MutableList {
    pub fn env(&self) -> &Env {
        &self.env
    }

    pub fn set(&self, value: &Value) -> RunResult<()> {
        let items = value.as_list()?;
        if items.len() != self.env.block_len() {
            return Err(RunError::assert(format!(
                "list frame expects {} values, got {}",
                self.env.block_len(),
                items.len()
            )));
        }
        self.env.write_block(&mut items.iter().cloned());
        Ok(())
    }
}

/// Write handle for a pattern-driven frame.
#[derive(Debug, Clone)]
pub struct MutablePattern {
    env: Env,
    pattern: Rc<Pattern>,
}

impl MutablePattern {
    pub fn env(&self) -> &Env {
        &self.env
    }

    /// Runs the binding engine against `value`. On success the slots are
    /// committed and `true` is returned; on failure the frame is untouched.
    pub fn set_opt(&self, value: &Value) -> RunResult<bool> {
        let mut slots = SlotBuf::new();
        if bind(&self.pattern, value, &mut slots)? {
            self.env.write_block(&mut slots.into_iter());
            Ok(true)
        } else {
            Ok(false)
        }
    }

    /// Like [`set_opt`](Self::set_opt) but a failed match raises `Bind`.
    pub fn set(&self, value: &Value) -> RunResult<()> {
        if self.set_opt(value)? {
            Ok(())
        } else {
            Err(Fault::new(FaultKind::Bind).into())
        }
    }
}

impl fmt::Display for Env {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut names = Vec::new();
        self.visit(&mut |name, _| names.push(name.to_string()));
        write!(f, "env[{}]", names.join(","))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn inner_frames_shadow_outer_ones() {
        let mut map = AHashMap::new();
        map.insert(Rc::from("x"), Value::Int(1));
        let root = Env::copy_of(map);

        let binder = root.bind_single("x");
        binder.set(Value::Int(2));
        assert_eq!(binder.env().get("x").unwrap(), Value::Int(2));
        assert_eq!(root.get("x").unwrap(), Value::Int(1));
    }

    #[test]
    fn unbound_lookup_is_an_assertion_failure() {
        let err = Env::empty().get("ghost").unwrap_err();
        assert!(matches!(err, RunError::Assert(_)));
    }

    #[test]
    fn fix_snapshots_are_isolated_from_later_writes() {
        let binder = Env::empty().bind_single("x");
        binder.set(Value::Int(1));
        let snapshot = binder.env().fix();
        binder.set(Value::Int(99));
        assert_eq!(snapshot.get("x").unwrap(), Value::Int(1));
        assert_eq!(binder.env().get("x").unwrap(), Value::Int(99));
    }

    #[test]
    fn array_frame_writes_atomically_and_checks_length() {
        let binder = Env::empty().bind_array(vec![Rc::from("a"), Rc::from("b")]);
        binder
            .set(&Value::tuple(vec![Value::Int(1), Value::Int(2)]))
            .unwrap();
        assert_eq!(binder.env().get("b").unwrap(), Value::Int(2));

        let err = binder.set(&Value::tuple(vec![Value::Int(1)])).unwrap_err();
        assert!(matches!(err, RunError::Assert(_)));
    }

    #[test]
    fn failed_pattern_bind_leaves_slots_untouched() {
        let pattern = Pattern::cons(Pattern::id("h"), Pattern::id("t"));
        let binder = Env::empty().bind_pattern(pattern);
        binder.set(&Value::list(vec![Value::Int(9)])).unwrap();
        assert_eq!(binder.env().get("h").unwrap(), Value::Int(9));

        // Empty list cannot match h :: t; previous bindings must survive.
        assert!(!binder.set_opt(&Value::list(vec![])).unwrap());
        assert_eq!(binder.env().get("h").unwrap(), Value::Int(9));

        let err = binder.set(&Value::list(vec![])).unwrap_err();
        assert_eq!(err, RunError::Fault(Fault::new(FaultKind::Bind)));
    }

    #[test]
    fn list_frame_distributes_a_list_value() {
        let binder = Env::empty().bind_list(vec![Rc::from("x"), Rc::from("y")]);
        binder
            .set(&Value::list(vec![Value::Int(4), Value::Int(5)]))
            .unwrap();
        assert_eq!(binder.env().get("x").unwrap(), Value::Int(4));
        assert_eq!(binder.env().get("y").unwrap(), Value::Int(5));
        assert!(binder.set(&Value::list(vec![Value::Int(1)])).is_err());
    }

    #[test]
    fn visit_enumerates_inner_first() {
        let root = Env::empty().bind_single("outer");
        root.set(Value::Int(1));
        let inner = root.env().bind_single("inner");
        inner.set(Value::Int(2));

        let mut seen = Vec::new();
        inner.env().visit(&mut |name, _| seen.push(name.to_string()));
        assert_eq!(seen, vec!["inner".to_string(), "outer".to_string()]);
    }
}
