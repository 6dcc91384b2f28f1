//! Path schemas
//!
//! A schema path is a dot-separated list of segments such as
//! `Account.Order.$.OrderID`. `$` stands for every element of the array at
//! that position; a segment made only of ASCII digits also addresses that
//! index when it meets an array.

use crate::{FieldCryptError, Result};
use std::fmt;
use std::str::FromStr;

/// Array wildcard segment
pub const WILDCARD: &str = "$";

/// One step of a concrete location inside a document
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum LocationStep {
    /// Object member
    Key(String),
    /// Array element
    Index(usize),
}

/// One segment of a schema path
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum PathSegment {
    /// Every element of an array
    Wildcard,
    /// Object key; digit-only keys also match the array index they spell
    Key(String),
}

impl PathSegment {
    /// Whether this segment accepts the given location step
    pub fn matches(&self, step: &LocationStep) -> bool {
        match (self, step) {
            (Self::Wildcard, LocationStep::Index(_)) => true,
            (Self::Wildcard, LocationStep::Key(_)) => false,
            (Self::Key(key), LocationStep::Key(actual)) => key == actual,
            (Self::Key(key), LocationStep::Index(index)) => {
                key.bytes().all(|b| b.is_ascii_digit()) && key.parse::<usize>().ok() == Some(*index)
            }
        }
    }
}

/// A parsed schema path
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SchemaPath {
    segments: Vec<PathSegment>,
}

impl SchemaPath {
    /// Segments of the path
    pub fn segments(&self) -> &[PathSegment] {
        &self.segments
    }

    /// True if this path matches the start of (or all of) `location`
    pub fn matches_prefix_of(&self, location: &[LocationStep]) -> bool {
        self.segments.len() <= location.len()
            && self
                .segments
                .iter()
                .zip(location)
                .all(|(segment, step)| segment.matches(step))
    }
}

impl FromStr for SchemaPath {
    type Err = FieldCryptError;

    fn from_str(s: &str) -> Result<Self> {
        if s.is_empty() {
            return Err(FieldCryptError::config("schema path must not be empty"));
        }
        let segments = s
            .split('.')
            .map(|segment| match segment {
                "" => Err(FieldCryptError::config(format!(
                    "schema path {s:?} contains an empty segment"
                ))),
                WILDCARD => Ok(PathSegment::Wildcard),
                key => Ok(PathSegment::Key(key.to_string())),
            })
            .collect::<Result<Vec<_>>>()?;
        Ok(Self { segments })
    }
}

impl fmt::Display for SchemaPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, segment) in self.segments.iter().enumerate() {
            if i > 0 {
                f.write_str(".")?;
            }
            match segment {
                PathSegment::Wildcard => f.write_str(WILDCARD)?,
                PathSegment::Key(key) => f.write_str(key)?,
            }
        }
        Ok(())
    }
}

/// An ordered list of schema paths
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct PathSchema {
    paths: Vec<SchemaPath>,
}

impl PathSchema {
    /// Parse every path; the first malformed one fails the whole schema
    pub fn parse<I, S>(paths: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let paths = paths
            .into_iter()
            .map(|p| p.as_ref().parse())
            .collect::<Result<Vec<_>>>()?;
        Ok(Self { paths })
    }

    /// Number of paths
    pub fn len(&self) -> usize {
        self.paths.len()
    }

    /// True if there are no paths
    pub fn is_empty(&self) -> bool {
        self.paths.is_empty()
    }

    /// True if any path matches a prefix of `location`
    pub fn covers(&self, location: &[LocationStep]) -> bool {
        self.paths.iter().any(|p| p.matches_prefix_of(location))
    }
}
