use smallvec::SmallVec;

use crate::{
    fault::{RunError, RunResult},
    value::Value,
};

/// Argument pack handed to built-in implementations.
///
/// Built-ins have arity 1..=4, so the pack lives inline. Extraction is
/// checked: an arity mismatch means the frontend emitted malformed Code and
/// is reported as an assertion failure, never as a user-visible fault.
#[derive(Debug)]
pub(crate) struct ArgValues(SmallVec<[Value; 4]>);

impl ArgValues {
    pub fn new() -> Self {
        Self(SmallVec::new())
    }

    pub fn push(&mut self, value: Value) {
        self.0.push(value);
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn one(self, name: &str) -> RunResult<Value> {
        let Self(mut values) = self;
        if values.len() == 1 {
            Ok(values.remove(0))
        } else {
            Err(arity_error(name, 1, values.len()))
        }
    }

    pub fn two(self, name: &str) -> RunResult<(Value, Value)> {
        let Self(mut values) = self;
        if values.len() == 2 {
            let b = values.remove(1);
            let a = values.remove(0);
            Ok((a, b))
        } else {
            Err(arity_error(name, 2, values.len()))
        }
    }

    pub fn three(self, name: &str) -> RunResult<(Value, Value, Value)> {
        let Self(mut values) = self;
        if values.len() == 3 {
            let c = values.remove(2);
            let b = values.remove(1);
            let a = values.remove(0);
            Ok((a, b, c))
        } else {
            Err(arity_error(name, 3, values.len()))
        }
    }
}

impl FromIterator<Value> for ArgValues {
    fn from_iter<T: IntoIterator<Item = Value>>(iter: T) -> Self {
        Self(iter.into_iter().collect())
    }
}

fn arity_error(name: &str, want: usize, got: usize) -> RunError {
    RunError::assert(format!("{name} expects {want} argument(s), got {got}"))
}
