//! SCI document model
//!
//! Read-only snapshots of Standard Cleaning Instruction records as they are
//! stored in the document database. Every field may be missing or hold a
//! value of the wrong shape; either way it deserializes to its default.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

/// A Standard Cleaning Instruction document
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Sci {
    /// Store-assigned identifier
    #[serde(deserialize_with = "lenient")]
    pub id: String,
    /// Owning site identifier
    #[serde(deserialize_with = "lenient")]
    pub site_id: String,
    /// Denormalized site display name
    #[serde(deserialize_with = "lenient")]
    pub site_name: String,
    /// Reference to the source document this SCI was extracted from
    #[serde(deserialize_with = "lenient")]
    pub parent_document_id: String,
    /// Creation timestamp as stored
    #[serde(deserialize_with = "lenient")]
    pub created_at: String,
    /// Last update timestamp as stored
    #[serde(deserialize_with = "lenient")]
    pub updated_at: String,
    /// Structured instruction content
    #[serde(deserialize_with = "lenient")]
    pub section: Section,
}

impl Sci {
    /// Build an SCI from a stored record
    ///
    /// The store-assigned id is written first and the record's own fields are
    /// merged over it. Explicit nulls are treated as missing fields.
    pub fn from_record(id: &str, data: &Map<String, Value>) -> serde_json::Result<Self> {
        let mut merged = Map::with_capacity(data.len() + 1);
        merged.insert("id".to_string(), Value::String(id.to_string()));
        for (key, value) in data {
            merged.insert(key.clone(), value.clone());
        }

        let mut value = Value::Object(merged);
        prune_nulls(&mut value);
        serde_json::from_value(value)
    }

    /// Section title, or the empty string when absent
    pub fn title(&self) -> &str {
        self.section.title.as_deref().unwrap_or("")
    }

    /// Identifier shown to users: the document number, else the section id
    pub fn display_id(&self) -> &str {
        non_empty(
            self.section
                .document_metadata
                .as_ref()
                .and_then(|m| m.document_id.as_deref()),
        )
        .or_else(|| non_empty(self.section.section_id.as_deref()))
        .unwrap_or("")
    }

    /// Total number of steps across all step groups
    pub fn step_count(&self) -> usize {
        self.section.step_groups.iter().map(|g| g.steps.len()).sum()
    }
}

/// Structured content embedded in an SCI
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Section {
    #[serde(deserialize_with = "lenient")]
    pub title: Option<String>,
    #[serde(deserialize_with = "lenient")]
    pub description: Option<String>,
    #[serde(deserialize_with = "lenient")]
    pub section_id: Option<String>,
    #[serde(deserialize_with = "lenient_list")]
    pub step_groups: Vec<StepGroup>,
    #[serde(deserialize_with = "lenient_list")]
    pub chemicals: Vec<Chemical>,
    #[serde(deserialize_with = "lenient")]
    pub frequency: Option<String>,
    #[serde(deserialize_with = "lenient")]
    pub responsibility: Option<String>,
    #[serde(deserialize_with = "lenient_list")]
    pub key_inspection_points: Vec<String>,
    #[serde(deserialize_with = "lenient_list")]
    pub colour_codes: Vec<ColourCode>,
    #[serde(deserialize_with = "lenient_list")]
    pub application_equipment: Vec<String>,
    #[serde(deserialize_with = "lenient_list")]
    pub images: Vec<Image>,
    #[serde(deserialize_with = "lenient")]
    pub document_metadata: Option<DocumentMetadata>,
}

/// A named, ordered cluster of cleaning steps
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct StepGroup {
    #[serde(deserialize_with = "lenient")]
    pub title: String,
    #[serde(deserialize_with = "lenient")]
    pub description: Option<String>,
    #[serde(deserialize_with = "lenient")]
    pub frequency: Option<String>,
    #[serde(deserialize_with = "lenient_list")]
    pub steps: Vec<Step>,
}

/// A single cleaning step
///
/// Only `action` is displayed today; the other fields are kept so the model
/// round-trips the stored record.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Step {
    #[serde(deserialize_with = "lenient")]
    pub order: i64,
    #[serde(deserialize_with = "lenient")]
    pub label: Option<String>,
    #[serde(deserialize_with = "lenient")]
    pub action: String,
    #[serde(deserialize_with = "lenient_list")]
    pub notes: Vec<String>,
}

/// A cleaning chemical and its dilution
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Chemical {
    #[serde(deserialize_with = "lenient")]
    pub name: String,
    #[serde(deserialize_with = "lenient")]
    pub use_ratio: Option<String>,
    #[serde(deserialize_with = "lenient")]
    pub hot_ratio: Option<String>,
}

impl Chemical {
    /// Ratio to display: use ratio, then hot ratio, then a placeholder
    pub fn display_ratio(&self) -> &str {
        non_empty(self.use_ratio.as_deref())
            .or_else(|| non_empty(self.hot_ratio.as_deref()))
            .unwrap_or("-")
    }
}

/// Colour-coded equipment entry
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ColourCode {
    #[serde(deserialize_with = "lenient")]
    pub colour: String,
    #[serde(deserialize_with = "lenient")]
    pub meaning: String,
}

/// An image extracted from the source document
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Image {
    #[serde(deserialize_with = "lenient")]
    pub caption: Option<String>,
    #[serde(deserialize_with = "lenient")]
    pub page_number: Option<u32>,
    #[serde(deserialize_with = "lenient")]
    pub url: Option<String>,
    #[serde(deserialize_with = "lenient")]
    pub storage_path: Option<String>,
}

/// Header metadata of the source document
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct DocumentMetadata {
    #[serde(deserialize_with = "lenient")]
    pub document_id: Option<String>,
    #[serde(deserialize_with = "lenient")]
    pub title: Option<String>,
    #[serde(deserialize_with = "lenient")]
    pub effective_date: Option<String>,
    #[serde(deserialize_with = "lenient")]
    pub revision: Option<String>,
    #[serde(deserialize_with = "lenient")]
    pub department: Option<String>,
}

/// A site with SCIs, derived by grouping documents
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Site {
    pub id: String,
    pub name: String,
    pub count: usize,
}

/// Decode a field, treating a value of the wrong shape as missing
fn lenient<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned + Default,
{
    let value = Value::deserialize(deserializer)?;
    Ok(serde_json::from_value(value).unwrap_or_default())
}

/// Decode a list field, dropping entries of the wrong shape
///
/// A value that is not a list at all decodes as an empty list.
fn lenient_list<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    match Value::deserialize(deserializer)? {
        Value::Array(items) => Ok(items
            .into_iter()
            .filter_map(|item| serde_json::from_value(item).ok())
            .collect()),
        _ => Ok(Vec::new()),
    }
}

/// Remove null-valued object entries, recursively
fn prune_nulls(value: &mut Value) {
    match value {
        Value::Object(map) => {
            map.retain(|_, v| !v.is_null());
            map.values_mut().for_each(prune_nulls);
        }
        Value::Array(items) => items.iter_mut().for_each(prune_nulls),
        _ => {}
    }
}

/// Treat empty strings the same as missing ones
pub fn non_empty(value: Option<&str>) -> Option<&str> {
    value.filter(|s| !s.is_empty())
}
