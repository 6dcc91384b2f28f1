//! Document walker
//!
//! Finds the scalar leaves a schema selects and drives a [`LeafTransform`]
//! over them with bounded concurrency. Replacements are applied to a copy of
//! the document only after every leaf has been transformed.

use crate::{
    path::{LocationStep, PathSchema},
    FieldCryptError,
    Result,
};
use async_trait::async_trait;
use futures::{stream, StreamExt, TryStreamExt};
use serde_json::Value;
use std::fmt;
use tracing::trace;

/// How a schema selects leaves
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SelectionMode {
    /// Select only leaves under a schema path
    Include,
    /// Select every leaf not under a schema path
    Exclude,
}

/// Concrete location of a scalar leaf
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash)]
pub struct LeafLocation {
    steps: Vec<LocationStep>,
}

impl LeafLocation {
    /// Location from explicit steps
    pub fn new(steps: Vec<LocationStep>) -> Self {
        Self { steps }
    }

    /// Steps from the document root
    pub fn steps(&self) -> &[LocationStep] {
        &self.steps
    }

    fn child(&self, step: LocationStep) -> Self {
        let mut steps = Vec::with_capacity(self.steps.len() + 1);
        steps.extend_from_slice(&self.steps);
        steps.push(step);
        Self { steps }
    }

    /// Resolve this location inside `root`
    pub fn get<'a>(&self, root: &'a Value) -> Option<&'a Value> {
        self.steps.iter().try_fold(root, |node, step| match (node, step) {
            (Value::Object(map), LocationStep::Key(key)) => map.get(key),
            (Value::Array(items), LocationStep::Index(index)) => items.get(*index),
            _ => None,
        })
    }

    /// Resolve this location inside `root` for replacement
    pub fn get_mut<'a>(&self, root: &'a mut Value) -> Option<&'a mut Value> {
        self.steps.iter().try_fold(root, |node, step| match (node, step) {
            (Value::Object(map), LocationStep::Key(key)) => map.get_mut(key),
            (Value::Array(items), LocationStep::Index(index)) => items.get_mut(*index),
            _ => None,
        })
    }
}

impl fmt::Display for LeafLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.steps.is_empty() {
            return f.write_str("<root>");
        }
        for (i, step) in self.steps.iter().enumerate() {
            if i > 0 {
                f.write_str(".")?;
            }
            match step {
                LocationStep::Key(key) => f.write_str(key)?,
                LocationStep::Index(index) => write!(f, "{index}")?,
            }
        }
        Ok(())
    }
}

/// Per-leaf transformation applied by [`walk`]
#[async_trait]
pub trait LeafTransform: Send + Sync {
    /// Produce the replacement for the leaf at `location`
    async fn transform(&self, location: &LeafLocation, value: Value) -> Result<Value>;
}

/// Result of a walk
#[derive(Debug)]
pub struct Walked {
    /// The transformed copy of the document
    pub document: Value,
    /// Number of leaves that were transformed
    pub leaves: usize,
}

/// Locations of every scalar leaf the schema selects, in document order
pub fn resolve_targets(document: &Value, schema: &PathSchema, mode: SelectionMode) -> Vec<LeafLocation> {
    collect_leaves(document, schema, mode)
        .into_iter()
        .map(|(location, _)| location)
        .collect()
}

fn collect_leaves<'a>(
    document: &'a Value,
    schema: &PathSchema,
    mode: SelectionMode,
) -> Vec<(LeafLocation, &'a Value)> {
    let mut out = Vec::new();
    let mut pending = vec![(LeafLocation::default(), document)];

    while let Some((location, node)) = pending.pop() {
        match node {
            Value::Object(map) => {
                for (key, child) in map.iter().rev() {
                    pending.push((location.child(LocationStep::Key(key.clone())), child));
                }
            }
            Value::Array(items) => {
                for (index, child) in items.iter().enumerate().rev() {
                    pending.push((location.child(LocationStep::Index(index)), child));
                }
            }
            scalar => {
                let covered = schema.covers(location.steps());
                let selected = match mode {
                    SelectionMode::Include => covered,
                    SelectionMode::Exclude => !covered,
                };
                if selected {
                    out.push((location, scalar));
                }
            }
        }
    }
    out
}

/// Transform every selected leaf of `document`, at most `concurrency` at a time
///
/// The first failing leaf aborts the walk and no document is returned.
pub async fn walk<T>(
    document: &Value,
    schema: &PathSchema,
    mode: SelectionMode,
    transform: &T,
    concurrency: usize,
) -> Result<Walked>
where
    T: LeafTransform + ?Sized,
{
    let leaves = collect_leaves(document, schema, mode);
    let count = leaves.len();
    trace!(leaves = count, ?mode, "walking document");

    let replacements: Vec<(LeafLocation, Value)> = stream::iter(leaves)
        .map(|(location, value)| async move {
            let replacement = transform.transform(&location, value.clone()).await?;
            Ok::<_, FieldCryptError>((location, replacement))
        })
        .buffer_unordered(concurrency.max(1))
        .try_collect()
        .await?;

    let mut output = document.clone();
    for (location, replacement) in replacements {
        let slot = location.get_mut(&mut output).ok_or_else(|| {
            FieldCryptError::format(format!("leaf {location} disappeared during the walk"))
        })?;
        *slot = replacement;
    }

    Ok(Walked {
        document: output,
        leaves: count,
    })
}
