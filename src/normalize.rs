//! Field normalization
//!
//! Turns positional user input (names plus optional parallel type lists) into
//! canonical field records by way of a [`FieldTransformer`].

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::error::{FieldsError, Result};
use crate::field::{FieldProperties, FieldRecord};
use crate::transform::FieldTransformer;

/// Raw field input as supplied on the command line
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawFieldInput {
    pub names: Vec<String>,
    /// Positional; may be shorter than `names`, and `None` leaves a gap
    #[serde(default)]
    pub data_types: Vec<Option<String>>,
    /// Positional; may be shorter than `names`, and `None` leaves a gap
    #[serde(default)]
    pub html_types: Vec<Option<String>>,
}

impl RawFieldInput {
    pub fn new(names: Vec<String>) -> Self {
        Self {
            names,
            data_types: Vec::new(),
            html_types: Vec::new(),
        }
    }

    pub fn with_data_types<I, T>(mut self, data_types: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<Option<String>>,
    {
        self.data_types = data_types.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_html_types<I, T>(mut self, html_types: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<Option<String>>,
    {
        self.html_types = html_types.into_iter().map(Into::into).collect();
        self
    }

    /// Build input from comma-separated option values.
    ///
    /// Every name keeps the type hints written at its own position. Empty
    /// name segments and repeated names are dropped together with the hints
    /// at their position; an empty type segment means "no hint" for that name.
    pub fn from_delimited(names: &str, data_types: &str, html_types: &str) -> Self {
        let data_slots = split_positional(data_types);
        let html_slots = split_positional(html_types);

        let mut seen = HashSet::new();
        let mut input = Self::default();

        for (i, name) in split_positional(names).into_iter().enumerate() {
            let Some(name) = name else { continue };
            if !seen.insert(name.clone()) {
                continue;
            }
            input.names.push(name);
            input.data_types.push(data_slots.get(i).cloned().flatten());
            input.html_types.push(html_slots.get(i).cloned().flatten());
        }

        input
    }

    /// Reject input with no names
    pub fn validate(&self) -> Result<()> {
        if self.names.is_empty() {
            return Err(FieldsError::EmptyInput);
        }
        Ok(())
    }

    /// Pair every name with the type hints at the same position
    pub fn properties(&self) -> Vec<FieldProperties> {
        self.names
            .iter()
            .enumerate()
            .map(|(i, name)| FieldProperties {
                name: name.clone(),
                data_type: self.data_types.get(i).cloned().flatten(),
                html_type: self.html_types.get(i).cloned().flatten(),
            })
            .collect()
    }
}

/// Split a comma-separated list keeping positions; empty segments become `None`
pub fn split_positional(value: &str) -> Vec<Option<String>> {
    if value.trim().is_empty() {
        return Vec::new();
    }
    value
        .split(',')
        .map(str::trim)
        .map(|s| (!s.is_empty()).then(|| s.to_string()))
        .collect()
}

/// Normalize raw input into field records, one per name, in name order
pub fn normalize(input: &RawFieldInput, transformer: &dyn FieldTransformer) -> Result<Vec<FieldRecord>> {
    input.validate()?;

    let properties = input.properties();
    let expected = properties.len();
    let records = transformer.transform(properties)?;

    // A transformer that changes the batch size would misalign names
    debug_assert_eq!(records.len(), expected, "profile {} changed batch size", transformer.profile());

    Ok(records)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transform::GenericTransformer;

    fn names(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_split_positional_keeps_gaps() {
        assert_eq!(
            split_positional("int, ,string"),
            vec![Some("int".to_string()), None, Some("string".to_string())]
        );
        assert!(split_positional("  ").is_empty());
    }

    #[test]
    fn test_repeated_names_keep_their_own_types() {
        let input = RawFieldInput::from_delimited("a,a,b", "int,int,string", "");
        assert_eq!(input.names, names(&["a", "b"]));

        let records = normalize(&input, &GenericTransformer::new()).unwrap();
        assert_eq!(records[0].data_type.as_deref(), Some("int"));
        assert_eq!(records[1].name, "b");
        assert_eq!(records[1].data_type.as_deref(), Some("string"));
    }

    #[test]
    fn test_empty_type_segment_leaves_gap() {
        let input = RawFieldInput::from_delimited("a,b,c", "int,,string", ",select");
        let records = normalize(&input, &GenericTransformer::new()).unwrap();

        assert_eq!(records[0].data_type.as_deref(), Some("int"));
        assert_eq!(records[1].data_type, None);
        assert_eq!(records[2].data_type.as_deref(), Some("string"));
        assert_eq!(records[0].html_type, None);
        assert_eq!(records[1].html_type.as_deref(), Some("select"));
        assert_eq!(records[2].html_type, None);
    }

    #[test]
    fn test_empty_name_segment_drops_its_types() {
        let input = RawFieldInput::from_delimited("a,,c", "int,bool,string", "");
        assert_eq!(input.names, names(&["a", "c"]));
        assert_eq!(input.properties()[1].data_type.as_deref(), Some("string"));
    }

    #[test]
    fn test_length_mismatch_tolerance() {
        let input = RawFieldInput::new(names(&["a", "b", "c"])).with_data_types(names(&["int"]));
        let records = normalize(&input, &GenericTransformer::new()).unwrap();

        assert_eq!(records.len(), 3);
        assert_eq!(records[0].data_type.as_deref(), Some("int"));
        assert_eq!(records[1].data_type, None);
        assert_eq!(records[2].data_type, None);
        assert!(records.iter().all(|r| r.html_type.is_none()));

        let encoded = serde_json::to_value(&records).unwrap();
        assert!(encoded[1].get("data-type").is_none());
        assert!(encoded[0].get("html-type").is_none());
    }

    #[test]
    fn test_html_types_attach_by_position() {
        let input = RawFieldInput::new(names(&["title", "body"]))
            .with_html_types(names(&["text", "textarea"]));
        let records = normalize(&input, &GenericTransformer::new()).unwrap();
        assert_eq!(records[0].html_type.as_deref(), Some("text"));
        assert_eq!(records[1].html_type.as_deref(), Some("textarea"));
    }

    #[test]
    fn test_empty_input_rejected() {
        let result = normalize(&RawFieldInput::default(), &GenericTransformer::new());
        assert!(matches!(result, Err(FieldsError::EmptyInput)));
    }
}
