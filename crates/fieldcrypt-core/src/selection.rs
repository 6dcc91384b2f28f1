//! Field selection
//!
//! Exactly one of the inclusion list (`fields`) and the exclusion list
//! (`exclude_fields`) drives a call.

use crate::{path::PathSchema, walker::SelectionMode, FieldCryptError, Result};

/// The active schema and how it selects leaves
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FieldSelection {
    /// Parsed schema
    pub schema: PathSchema,
    /// Include or exclude
    pub mode: SelectionMode,
}

impl FieldSelection {
    /// Pick the active list out of `fields` and `exclude_fields`
    pub fn resolve(fields: &[String], exclude_fields: &[String]) -> Result<Self> {
        match (fields.is_empty(), exclude_fields.is_empty()) {
            (false, false) => Err(FieldCryptError::config(
                "fields and exclude_fields must not be provided simultaneously",
            )),
            (true, true) => Err(FieldCryptError::config(
                "either fields or exclude_fields must be non-empty",
            )),
            (false, true) => Ok(Self {
                schema: PathSchema::parse(fields)?,
                mode: SelectionMode::Include,
            }),
            (true, false) => Ok(Self {
                schema: PathSchema::parse(exclude_fields)?,
                mode: SelectionMode::Exclude,
            }),
        }
    }
}
