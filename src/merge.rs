//! Registry merging
//!
//! A registry is the ordered list of field records stored in one fields-file.
//! Merging appends a normalized batch to it, skipping any candidate whose
//! name is already taken. Skips are reported as warnings, never errors.

use std::collections::HashSet;
use std::fmt;

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::error::{FieldsError, Result};
use crate::field::FieldRecord;

/// Ordered collection of field records for one fields-file
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Registry {
    fields: Vec<FieldRecord>,
}

/// A candidate that was dropped because its name was already present
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DuplicateField {
    pub name: String,
}

impl fmt::Display for DuplicateField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "the field \"{}\" already exists in the file.", self.name)
    }
}

/// Result of a successful merge
#[derive(Debug, Clone)]
pub struct MergeOutcome {
    /// The merged registry
    pub registry: Registry,
    /// Pretty-printed JSON of `registry`
    pub serialized: String,
    /// Names of the records that were appended, in order
    pub added: Vec<String>,
    /// One entry per skipped candidate
    pub warnings: Vec<DuplicateField>,
}

impl MergeOutcome {
    pub fn has_duplicates(&self) -> bool {
        !self.warnings.is_empty()
    }
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a registry from records that are already known to be unique
    pub fn from_fields(fields: Vec<FieldRecord>) -> Self {
        Self { fields }
    }

    /// Decode a fields-file.
    ///
    /// Anything other than a JSON array of objects with a string `name` is
    /// reported as a corrupt registry.
    pub fn decode(text: &str) -> Result<Self> {
        let fields: Vec<FieldRecord> = serde_json::from_str(text).map_err(FieldsError::corrupt)?;
        Ok(Self { fields })
    }

    /// Encode as pretty-printed JSON
    pub fn encode(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(&self.fields)?)
    }

    pub fn fields(&self) -> &[FieldRecord] {
        &self.fields
    }

    pub fn into_fields(self) -> Vec<FieldRecord> {
        self.fields
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn get(&self, name: &str) -> Option<&FieldRecord> {
        self.fields.iter().find(|f| f.name == name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    /// Names in registry order
    pub fn names(&self) -> Vec<&str> {
        self.fields.iter().map(|f| f.name.as_str()).collect()
    }

    /// Append every candidate whose name is not taken yet.
    ///
    /// Names merged earlier in the same batch count as taken. Returns the
    /// appended names and the skipped candidates.
    pub fn append(&mut self, batch: Vec<FieldRecord>) -> (Vec<String>, Vec<DuplicateField>) {
        let mut taken: HashSet<String> = self.fields.iter().map(|f| f.name.clone()).collect();
        let mut added = Vec::new();
        let mut warnings = Vec::new();

        for candidate in batch {
            if !taken.insert(candidate.name.clone()) {
                warn!(field = %candidate.name, "field already exists, skipping");
                warnings.push(DuplicateField { name: candidate.name });
                continue;
            }

            debug!(field = %candidate.name, "appending field");
            added.push(candidate.name.clone());
            self.fields.push(candidate);
        }

        (added, warnings)
    }
}

/// Merge a normalized batch into serialized registry content.
///
/// Fails only when `existing` cannot be decoded; in that case nothing is
/// produced.
pub fn merge(existing: &str, batch: Vec<FieldRecord>) -> Result<MergeOutcome> {
    let mut registry = Registry::decode(existing)?;
    let (added, warnings) = registry.append(batch);
    let serialized = registry.encode()?;

    Ok(MergeOutcome {
        registry,
        serialized,
        added,
        warnings,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn batch(names: &[&str]) -> Vec<FieldRecord> {
        names.iter().map(|n| FieldRecord::new(*n).with_attribute("label", *n)).collect()
    }

    #[test]
    fn test_partial_batch_merge() {
        let existing = r#"[{"name": "id"}]"#;
        let outcome = merge(existing, batch(&["id", "email"])).unwrap();

        assert_eq!(outcome.registry.names(), vec!["id", "email"]);
        assert_eq!(outcome.registry.get("id"), Some(&FieldRecord::new("id")));
        assert_eq!(outcome.added, vec!["email".to_string()]);
        assert_eq!(outcome.warnings, vec![DuplicateField { name: "id".into() }]);
    }

    #[test]
    fn test_remerge_is_idempotent() {
        let first = merge("[]", batch(&["id", "email"])).unwrap();
        let second = merge(&first.serialized, batch(&["id", "email"])).unwrap();

        assert_eq!(second.serialized, first.serialized);
        assert!(second.added.is_empty());
        let dupes: Vec<_> = second.warnings.iter().map(|w| w.name.as_str()).collect();
        assert_eq!(dupes, vec!["id", "email"]);
    }

    #[test]
    fn test_order_preserved() {
        let existing = json!([
            { "name": "z", "data-type": "int" },
            { "name": "a" },
            { "name": "m", "html-type": "select" }
        ])
        .to_string();
        let outcome = merge(&existing, batch(&["q", "b"])).unwrap();
        assert_eq!(outcome.registry.names(), vec!["z", "a", "m", "q", "b"]);
        assert_eq!(outcome.registry.fields()[0].data_type.as_deref(), Some("int"));
    }

    #[test]
    fn test_duplicates_within_batch() {
        let outcome = merge("[]", batch(&["a", "b", "a"])).unwrap();
        assert_eq!(outcome.registry.names(), vec!["a", "b"]);
        assert_eq!(outcome.warnings.len(), 1);

        let unique: HashSet<_> = outcome.registry.names().into_iter().collect();
        assert_eq!(unique.len(), outcome.registry.len());
    }

    #[test]
    fn test_corrupt_registry_rejected() {
        for text in ["not json", r#"[{"name": "id""#, "null", "{}", r#"[{"label": "x"}]"#, ""] {
            let result = merge(text, batch(&["email"]));
            assert!(
                matches!(result, Err(FieldsError::CorruptRegistry { .. })),
                "expected corrupt registry for {:?}",
                text
            );
        }
    }

    #[test]
    fn test_round_trip_serialization() {
        let existing = json!([
            { "name": "id", "data-type": "int", "html-type": "number" },
            { "name": "email", "label": "Email", "is-nullable": false }
        ])
        .to_string();
        let outcome = merge(&existing, batch(&["age"])).unwrap();

        let reencoded = Registry::decode(&outcome.serialized).unwrap().encode().unwrap();
        assert_eq!(reencoded, outcome.serialized);
    }

    #[test]
    fn test_opaque_attributes_preserved() {
        let existing = json!([
            { "name": "status", "options": { "open": "Open", "closed": "Closed" }, "validation": "required" }
        ])
        .to_string();
        let outcome = merge(&existing, batch(&["title"])).unwrap();
        let decoded: serde_json::Value = serde_json::from_str(&outcome.serialized).unwrap();
        assert_eq!(decoded[0]["options"]["closed"], json!("Closed"));
        assert_eq!(decoded[0]["validation"], json!("required"));
    }

    #[test]
    fn test_existing_records_written_back_unchanged() {
        let existing = json!([
            { "name": "id", "data-type": null, "x": null },
            { "name": "flags", "html-type": ["checkbox"] }
        ]);
        let outcome = merge(&existing.to_string(), batch(&["email"])).unwrap();

        let decoded: serde_json::Value = serde_json::from_str(&outcome.serialized).unwrap();
        assert_eq!(decoded[0], existing[0]);
        assert_eq!(decoded[1], existing[1]);
        assert_eq!(decoded[2]["name"], json!("email"));
    }

    #[test]
    fn test_duplicate_warning_message() {
        let warning = DuplicateField { name: "id".into() };
        assert_eq!(warning.to_string(), "the field \"id\" already exists in the file.");
    }
}
