//! Field transformation profiles
//!
//! A profile expands a batch of raw property sets into full field records.
//! Profiles are looked up by name, so callers only ever carry the name around
//! (it lives in [`crate::config::TransformConfig`]).

use regex::Regex;
use serde_json::Value;
use tracing::debug;

use crate::error::{FieldsError, Result};
use crate::field::{FieldProperties, FieldRecord};

/// Name of the default profile
pub const GENERIC_PROFILE: &str = "generic";

/// Expands raw property sets into field records.
///
/// Implementations must return exactly one record per input, in input order.
pub trait FieldTransformer {
    /// Profile name this transformer answers to
    fn profile(&self) -> &str;

    /// Transform a batch of property sets
    fn transform(&self, batch: Vec<FieldProperties>) -> Result<Vec<FieldRecord>>;
}

/// Resolve a transformer by profile name
pub fn transformer_for(profile: &str) -> Result<Box<dyn FieldTransformer>> {
    match profile {
        GENERIC_PROFILE => Ok(Box::new(GenericTransformer::new())),
        other => Err(FieldsError::UnknownProfile(other.to_string())),
    }
}

/// Names of every known profile
pub fn profiles() -> &'static [&'static str] {
    &[GENERIC_PROFILE]
}

/// The "generic" profile.
///
/// Keeps `data-type` and `html-type` only when they were supplied and derives
/// a label plus the visibility flags scaffold generators expect.
pub struct GenericTransformer {
    name_pattern: Regex,
}

impl GenericTransformer {
    pub fn new() -> Self {
        Self {
            name_pattern: Regex::new(r"^[\p{L}_][\p{L}\p{N}_\-]*$").unwrap(),
        }
    }

    fn expand(&self, props: FieldProperties) -> Result<FieldRecord> {
        if !self.name_pattern.is_match(&props.name) {
            return Err(FieldsError::InvalidFieldName(props.name));
        }

        let label = humanize(&props.name);
        let record = FieldRecord::from(props)
            .with_attribute("label", label)
            .with_attribute("is-on-index", true)
            .with_attribute("is-on-form", true)
            .with_attribute("is-on-show", true)
            .with_attribute("is-nullable", Value::Bool(false));

        debug!(field = %record.name, "expanded field with generic profile");
        Ok(record)
    }
}

impl Default for GenericTransformer {
    fn default() -> Self {
        Self::new()
    }
}

impl FieldTransformer for GenericTransformer {
    fn profile(&self) -> &str {
        GENERIC_PROFILE
    }

    fn transform(&self, batch: Vec<FieldProperties>) -> Result<Vec<FieldRecord>> {
        batch.into_iter().map(|props| self.expand(props)).collect()
    }
}

/// Turn a field name into a display label ("first_name" -> "First Name")
pub fn humanize(name: &str) -> String {
    name.split(|c: char| c == '_' || c == '-' || c == ' ')
        .filter(|word| !word.is_empty())
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect::<String>(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_humanize() {
        assert_eq!(humanize("first_name"), "First Name");
        assert_eq!(humanize("email"), "Email");
        assert_eq!(humanize("created-at"), "Created At");
        assert_eq!(humanize("_private"), "Private");
    }

    #[test]
    fn test_generic_keeps_length_and_order() {
        let transformer = GenericTransformer::new();
        let batch = vec![
            FieldProperties::new("id"),
            FieldProperties::new("email"),
            FieldProperties::new("age"),
        ];
        let records = transformer.transform(batch).unwrap();
        let names: Vec<_> = records.iter().map(|r| r.name.as_str()).collect();
        assert_eq!(names, vec!["id", "email", "age"]);
    }

    #[test]
    fn test_generic_does_not_invent_types() {
        let transformer = GenericTransformer::new();
        let records = transformer
            .transform(vec![FieldProperties::new("title")])
            .unwrap();
        assert_eq!(records[0].data_type, None);
        assert_eq!(records[0].html_type, None);
        assert_eq!(records[0].attribute("label"), Some(&json!("Title")));
        assert_eq!(records[0].attribute("is-on-form"), Some(&json!(true)));
    }

    #[test]
    fn test_generic_rejects_bad_names() {
        let transformer = GenericTransformer::new();
        let result = transformer.transform(vec![FieldProperties::new("9lives")]);
        assert!(matches!(result, Err(FieldsError::InvalidFieldName(name)) if name == "9lives"));
    }

    #[test]
    fn test_generic_accepts_unicode_names() {
        let transformer = GenericTransformer::new();
        let records = transformer
            .transform(vec![FieldProperties::new("prénom"), FieldProperties::new("город_2")])
            .unwrap();
        assert_eq!(records[0].attribute("label"), Some(&json!("Prénom")));
        assert_eq!(records[1].name, "город_2");
        assert!(transformer.transform(vec![FieldProperties::new("has space")]).is_err());
    }

    #[test]
    fn test_unknown_profile() {
        assert!(transformer_for(GENERIC_PROFILE).is_ok());
        assert!(matches!(
            transformer_for("laravel"),
            Err(FieldsError::UnknownProfile(p)) if p == "laravel"
        ));
    }
}
