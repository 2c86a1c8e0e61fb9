use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// One piece of image evidence attached to a record.
///
/// The asset reference is stored under `evidenceUrl`, the key the web display
/// reads from the same table files. Keys this type does not know about are
/// carried in `extra` and written back unchanged.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EvidenceEntry {
    #[serde(rename = "evidenceUrl", default)]
    pub asset_url: String,
    #[serde(rename = "localPath", default)]
    pub local_path: String,
    #[serde(rename = "sourceUrl", default)]
    pub source_url: String,
    #[serde(rename = "sourceLabel", default)]
    pub source_label: String,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

pub type EvidenceList = Vec<EvidenceEntry>;

impl EvidenceEntry {
    pub fn new(
        asset_url: impl Into<String>,
        local_path: impl Into<String>,
        source_url: Option<&str>,
        source_label: Option<&str>,
    ) -> Self {
        Self {
            asset_url: asset_url.into(),
            local_path: local_path.into(),
            source_url: source_url.unwrap_or_default().to_string(),
            source_label: source_label.unwrap_or_default().to_string(),
            extra: Map::new(),
        }
    }

    /// Builds an entry from one decoded JSON object. Known keys holding `null`
    /// read as empty; other non-string values keep their JSON text.
    pub fn from_object(mut map: Map<String, Value>) -> Self {
        let mut take = |key: &str| match map.remove(key) {
            None | Some(Value::Null) => String::new(),
            Some(Value::String(s)) => s,
            Some(other) => other.to_string(),
        };
        let asset_url = take("evidenceUrl");
        let local_path = take("localPath");
        let source_url = take("sourceUrl");
        let source_label = take("sourceLabel");
        Self {
            asset_url,
            local_path,
            source_url,
            source_label,
            extra: map,
        }
    }

    pub fn normalized(mut self) -> Self {
        self.local_path = self.local_path.replace('\\', "/");
        self
    }

    /// Path of the backing file as recorded. Older entries carry only the asset
    /// URL, whose path mirrors the on-disk layout relative to the store root.
    pub fn resolved_local_path(&self) -> Option<String> {
        if !self.local_path.is_empty() {
            return Some(self.local_path.replace('\\', "/"));
        }
        let fallback = self.asset_url.trim_start_matches('/');
        if fallback.is_empty() {
            None
        } else {
            Some(fallback.to_string())
        }
    }

    pub fn web_url(&self, base: &str) -> String {
        format!("{}{}", base.trim_end_matches('/'), self.asset_url)
    }

    pub fn has_source(&self) -> bool {
        !self.source_url.is_empty()
    }
}
