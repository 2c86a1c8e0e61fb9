use crate::evidence::model::{EvidenceEntry, EvidenceList};
use serde_json::Value;

pub const EMPTY_EVIDENCE: &str = "[]";

// Never fails: text that is not a JSON list decodes to an empty list, and
// list elements that are not objects are dropped.
pub fn decode(serialized: &str) -> EvidenceList {
    let items = match parse_list(serialized) {
        Some(items) => items,
        None => return EvidenceList::new(),
    };
    let total = items.len();
    let list: EvidenceList = items
        .into_iter()
        .filter_map(|item| match item {
            Value::Object(map) => Some(EvidenceEntry::from_object(map)),
            _ => None,
        })
        .collect();
    if list.len() != total {
        tracing::debug!(dropped = total - list.len(), "non-object evidence elements dropped");
    }
    normalize(list)
}

fn parse_list(serialized: &str) -> Option<Vec<Value>> {
    let trimmed = serialized.trim();
    if trimmed.is_empty() {
        return None;
    }
    match serde_json::from_str::<Value>(trimmed) {
        Ok(Value::Array(items)) => Some(items),
        Ok(_) => {
            tracing::debug!("evidence data is not a list; using empty list");
            None
        }
        Err(err) => {
            tracing::debug!(error = %err, "evidence data unreadable; using empty list");
            None
        }
    }
}

pub fn encode(list: &[EvidenceEntry]) -> String {
    let normalized = normalize(list.to_vec());
    serde_json::to_string(&normalized).unwrap_or_else(|err| {
        tracing::warn!(error = %err, "evidence list failed to serialize; storing empty list");
        EMPTY_EVIDENCE.to_string()
    })
}

pub fn normalize(list: EvidenceList) -> EvidenceList {
    list.into_iter().map(EvidenceEntry::normalized).collect()
}

pub fn canonicalize(serialized: &str) -> String {
    encode(&decode(serialized))
}

/// True when the raw text is empty or is a list whose elements are all objects.
pub fn is_well_formed(serialized: &str) -> bool {
    if serialized.trim().is_empty() {
        return true;
    }
    parse_list(serialized).is_some_and(|items| items.iter().all(Value::is_object))
}
