use crate::error::CoreError;
use crate::evidence::codec;
use crate::evidence::model::EvidenceList;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

pub const FIELD_ID: &str = "ID";
pub const FIELD_LABEL: &str = "Label";
pub const FIELD_DETAILS: &str = "Details";
pub const FIELD_EVIDENCE_DATA: &str = "EvidenceData";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CollectionKind {
    Node,
    Edge,
}

impl CollectionKind {
    pub const ALL: [CollectionKind; 2] = [CollectionKind::Node, CollectionKind::Edge];

    pub fn as_str(&self) -> &'static str {
        match self {
            CollectionKind::Node => "node",
            CollectionKind::Edge => "edge",
        }
    }
}

impl fmt::Display for CollectionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CollectionKind {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "node" | "nodes" => Ok(CollectionKind::Node),
            "edge" | "edges" => Ok(CollectionKind::Edge),
            other => Err(CoreError::InvalidInput(format!(
                "unknown collection kind: {}",
                other
            ))),
        }
    }
}

/// One table row: field names mapped to text values, kept in column order.
///
/// Only `Label`, `Details` and `EvidenceData` are ever rewritten by the store;
/// every other field passes through untouched.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Record {
    fields: Vec<(String, String)>,
}

impl Record {
    pub fn new() -> Self {
        Self::default()
    }

    /// Minimal row with the four required fields.
    pub fn required(id: &str, label: &str, details: &str) -> Self {
        Self::new()
            .with(FIELD_ID, id)
            .with(FIELD_LABEL, label)
            .with(FIELD_DETAILS, details)
            .with(FIELD_EVIDENCE_DATA, codec::EMPTY_EVIDENCE)
    }

    pub fn from_pairs<K, V, I>(pairs: I) -> Self
    where
        K: Into<String>,
        V: Into<String>,
        I: IntoIterator<Item = (K, V)>,
    {
        let mut rec = Self::new();
        for (k, v) in pairs {
            rec.set(k, v);
        }
        rec
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.fields
            .iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.as_str())
    }

    pub fn contains(&self, name: &str) -> bool {
        self.fields.iter().any(|(k, _)| k == name)
    }

    /// Replaces the value in place, or appends the field at the end.
    pub fn set(&mut self, name: impl Into<String>, value: impl Into<String>) {
        let name = name.into();
        let value = value.into();
        match self.fields.iter_mut().find(|(k, _)| *k == name) {
            Some((_, v)) => *v = value,
            None => self.fields.push((name, value)),
        }
    }

    pub fn with(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.set(name, value);
        self
    }

    pub fn field_names(&self) -> impl Iterator<Item = &str> {
        self.fields.iter().map(|(k, _)| k.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.fields.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn id(&self) -> &str {
        self.get(FIELD_ID).unwrap_or_default()
    }

    pub fn label(&self) -> &str {
        self.get(FIELD_LABEL).unwrap_or_default()
    }

    pub fn details(&self) -> &str {
        self.get(FIELD_DETAILS).unwrap_or_default()
    }

    pub fn evidence_data(&self) -> &str {
        self.get(FIELD_EVIDENCE_DATA).unwrap_or_default()
    }

    pub fn evidence(&self) -> EvidenceList {
        codec::decode(self.evidence_data())
    }

    pub fn with_evidence(self, list: &EvidenceList) -> Self {
        self.with(FIELD_EVIDENCE_DATA, codec::encode(list))
    }

    /// Rewrites `EvidenceData` into canonical form, adding the field if absent.
    pub fn canonicalized(self) -> Self {
        let data = codec::canonicalize(self.evidence_data());
        self.with(FIELD_EVIDENCE_DATA, data)
    }

    /// Entry shown in selection lists, e.g. `N1 - Router`.
    pub fn display_label(&self) -> String {
        format!("{} - {}", self.id(), self.label())
    }
}
