use std::{fmt::Write, rc::Rc};

use crate::{
    code::{Code, apply},
    env::{Env, MutableSingle},
    fault::RunResult,
    value::Value,
};

/// A `from` comprehension: cartesian iteration over collection sources with
/// filtering and either a plain yield or grouped aggregation.
#[derive(Debug, Clone)]
pub struct FromCode {
    /// `(name in expr)` sources, iterated in source order. Each source
    /// expression is evaluated with every earlier name in scope.
    pub sources: Vec<(Rc<str>, Code)>,
    /// `where` predicate; absent means keep every combination.
    pub filter: Option<Code>,
    pub yield_mode: YieldMode,
}

#[derive(Debug, Clone)]
pub enum YieldMode {
    /// `yield expr`: one output row per surviving combination.
    Yield(Code),
    /// `group keys aggregates`: bucket rows by key, in first-occurrence
    /// order, then emit key fields followed by aggregate results.
    Group {
        /// Evaluates to the key tuple for the current combination.
        key: Code,
        aggregates: Vec<AggregateCode>,
        /// Output column order; empty means identity.
        permutation: Vec<usize>,
    },
}

/// One aggregate of a grouped comprehension.
#[derive(Debug, Clone)]
pub struct AggregateCode {
    /// Evaluates (in the outer environment) to the applicable that receives
    /// the bucket's row list.
    pub aggregate: Code,
    /// Per-row projection; absent means the aggregate sees the raw rows.
    pub argument: Option<Code>,
}

impl FromCode {
    pub(crate) fn eval(&self, env: &Env) -> RunResult<Value> {
        // One mutable slot per source, chained so each source expression sees
        // every earlier binding.
        let mut binders: Vec<MutableSingle> = Vec::with_capacity(self.sources.len());
        for (name, _) in &self.sources {
            let parent = binders.last().map_or(env, MutableSingle::env).clone();
            binders.push(parent.bind_single(Rc::clone(name)));
        }
        let inner_env = binders.last().map_or(env, MutableSingle::env).clone();

        match &self.yield_mode {
            YieldMode::Yield(yield_code) => {
                let mut out = Vec::new();
                self.iterate(0, env, &binders, &mut |row_env| {
                    if self.passes_filter(row_env)? {
                        out.push(yield_code.eval(row_env)?);
                    }
                    Ok(())
                })?;
                Ok(Value::list(out))
            }
            YieldMode::Group { key, aggregates, permutation } => {
                // Aggregate applicables are fixed before iteration begins.
                let aggregate_fns = aggregates
                    .iter()
                    .map(|agg| agg.aggregate.eval(env))
                    .collect::<RunResult<Vec<_>>>()?;

                let mut buckets: Vec<(Value, Vec<Vec<Value>>)> = Vec::new();
                self.iterate(0, env, &binders, &mut |row_env| {
                    if !self.passes_filter(row_env)? {
                        return Ok(());
                    }
                    let key_value = key.eval(row_env)?;
                    // Keys may contain reals, so buckets are probed linearly
                    // by structural equality; insertion order is the output
                    // order.
                    let index = match buckets.iter().position(|(k, _)| *k == key_value) {
                        Some(index) => index,
                        None => {
                            buckets.push((key_value, vec![Vec::new(); aggregates.len()]));
                            buckets.len() - 1
                        }
                    };
                    for (slot, agg) in buckets[index].1.iter_mut().zip(aggregates.iter()) {
                        let row = match &agg.argument {
                            Some(argument) => argument.eval(row_env)?,
                            None => self.raw_row(row_env)?,
                        };
                        slot.push(row);
                    }
                    Ok(())
                })?;

                let mut out = Vec::with_capacity(buckets.len());
                for (key_value, agg_rows) in buckets {
                    let mut fields: Vec<Value> = match key_value {
                        Value::Tuple(items) => items.to_vec(),
                        other => vec![other],
                    };
                    for (rows, aggregate_fn) in agg_rows.into_iter().zip(aggregate_fns.iter()) {
                        fields.push(apply(&inner_env, aggregate_fn, Value::list(rows))?);
                    }
                    let fields = if permutation.is_empty() {
                        fields
                    } else {
                        permutation.iter().map(|&i| fields[i].clone()).collect()
                    };
                    out.push(if fields.len() == 1 {
                        fields.into_iter().next().expect("one field")
                    } else {
                        Value::tuple(fields)
                    });
                }
                Ok(Value::list(out))
            }
        }
    }

    /// Nested-loop iteration: source `i` is re-evaluated for every
    /// combination of the sources before it, giving left-to-right cartesian
    /// product semantics over dependent sources.
    fn iterate(
        &self,
        depth: usize,
        outer: &Env,
        binders: &[MutableSingle],
        visit: &mut impl FnMut(&Env) -> RunResult<()>,
    ) -> RunResult<()> {
        if depth == binders.len() {
            let row_env = binders.last().map_or(outer, MutableSingle::env);
            return visit(row_env);
        }
        let source_env = if depth == 0 { outer } else { binders[depth - 1].env() };
        let collection = self.sources[depth].1.eval(source_env)?;
        for item in collection.as_list()? {
            binders[depth].set(item.clone());
            self.iterate(depth + 1, outer, binders, visit)?;
        }
        Ok(())
    }

    fn passes_filter(&self, row_env: &Env) -> RunResult<bool> {
        match &self.filter {
            Some(filter) => filter.eval(row_env)?.as_bool(),
            None => Ok(true),
        }
    }

    /// The raw row handed to aggregates without an argument projection: the
    /// single source binding, or the tuple of all of them.
    fn raw_row(&self, row_env: &Env) -> RunResult<Value> {
        if self.sources.len() == 1 {
            row_env.get(&self.sources[0].0)
        } else {
            let values = self
                .sources
                .iter()
                .map(|(name, _)| row_env.get(name))
                .collect::<RunResult<Vec<_>>>()?;
            Ok(Value::tuple(values))
        }
    }

    pub(crate) fn describe_into(&self, out: &mut String) {
        out.push_str("from(");
        for (i, (name, code)) in self.sources.iter().enumerate() {
            if i > 0 {
                out.push_str(", ");
            }
            let _ = write!(out, "source {name} in ");
            code.describe_into(out);
        }
        if let Some(filter) = &self.filter {
            out.push_str(", where ");
            filter.describe_into(out);
        }
        match &self.yield_mode {
            YieldMode::Yield(code) => {
                out.push_str(", yield ");
                code.describe_into(out);
            }
            YieldMode::Group { key, aggregates, .. } => {
                out.push_str(", group ");
                key.describe_into(out);
                for agg in aggregates {
                    out.push_str(", compute ");
                    agg.aggregate.describe_into(out);
                }
            }
        }
        out.push(')');
    }
}
