use serde::{Deserialize, Serialize};

/// Nested `{ id, name }` object the API embeds in other records.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct NamedRef {
    pub id: i64,

    #[serde(alias = "title")]
    pub name: String,
}

pub(crate) fn ref_name(reference: &Option<NamedRef>) -> String {
    reference
        .as_ref()
        .map(|r| r.name.clone())
        .unwrap_or_else(|| "-".to_string())
}

pub(crate) fn ref_names(references: &[NamedRef]) -> String {
    if references.is_empty() {
        return "-".to_string();
    }
    references
        .iter()
        .map(|r| r.name.as_str())
        .collect::<Vec<_>>()
        .join(", ")
}
