use crate::error::{CoreError, CoreResult};
use crate::evidence::codec;
use crate::records::model::CollectionKind;
use crate::records::store::RecordStore;
use crate::storage::asset_store::to_forward_slashes;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use walkdir::WalkDir;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct MissingAsset {
    pub id: String,
    pub index: usize,
    pub local_path: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct CollectionAudit {
    pub kind: CollectionKind,
    pub table_path: String,
    pub record_count: usize,
    pub evidence_count: usize,
    pub malformed_evidence_ids: Vec<String>,
    pub duplicate_ids: Vec<String>,
    pub missing_assets: Vec<MissingAsset>,
}

impl CollectionAudit {
    pub fn is_clean(&self) -> bool {
        self.malformed_evidence_ids.is_empty()
            && self.duplicate_ids.is_empty()
            && self.missing_assets.is_empty()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct StoreAuditReport {
    pub collections: Vec<CollectionAudit>,
    pub asset_dir: String,
    pub orphaned_assets: Vec<String>,
}

impl StoreAuditReport {
    pub fn is_clean(&self) -> bool {
        self.orphaned_assets.is_empty() && self.collections.iter().all(CollectionAudit::is_clean)
    }

    pub fn collection(&self, kind: CollectionKind) -> Option<&CollectionAudit> {
        self.collections.iter().find(|c| c.kind == kind)
    }
}

/// Read-only consistency check of both tables against the asset directory.
/// Reads raw rows so malformed evidence is reported before it is healed.
pub fn audit_store(store: &RecordStore) -> CoreResult<StoreAuditReport> {
    let mut referenced: BTreeSet<String> = BTreeSet::new();
    let mut collections = Vec::new();

    for kind in CollectionKind::ALL {
        let table = store.table(kind);
        let rows = table.load();
        let mut seen: BTreeSet<&str> = BTreeSet::new();
        let mut duplicate_ids = Vec::new();
        let mut malformed_evidence_ids = Vec::new();
        let mut missing_assets = Vec::new();
        let mut evidence_count = 0;

        for row in &rows {
            if !seen.insert(row.id()) && !duplicate_ids.iter().any(|d| d == row.id()) {
                duplicate_ids.push(row.id().to_string());
            }
            if !codec::is_well_formed(row.evidence_data()) {
                malformed_evidence_ids.push(row.id().to_string());
            }
            for (index, entry) in row.evidence().iter().enumerate() {
                evidence_count += 1;
                let Some(local_path) = entry.resolved_local_path() else {
                    continue;
                };
                let on_disk = store.config().resolve_local_path(&local_path);
                if !on_disk.is_file() {
                    missing_assets.push(MissingAsset {
                        id: row.id().to_string(),
                        index,
                        local_path,
                    });
                }
                referenced.insert(to_forward_slashes(&on_disk));
            }
        }

        collections.push(CollectionAudit {
            kind,
            table_path: to_forward_slashes(table.path()),
            record_count: rows.len(),
            evidence_count,
            malformed_evidence_ids,
            duplicate_ids,
            missing_assets,
        });
    }

    let asset_dir = store.assets().dir();
    let mut orphaned_assets = Vec::new();
    // A store that never received evidence has no asset directory yet.
    let walk = asset_dir.is_dir().then(|| WalkDir::new(asset_dir).min_depth(1).max_depth(1));
    for ent in walk.into_iter().flatten() {
        let ent = ent.map_err(|err| CoreError::Io(std::io::Error::from(err)))?;
        if !ent.file_type().is_file() {
            continue;
        }
        let local_path = to_forward_slashes(ent.path());
        if !referenced.contains(&local_path) {
            orphaned_assets.push(local_path);
        }
    }
    orphaned_assets.sort();

    Ok(StoreAuditReport {
        collections,
        asset_dir: to_forward_slashes(asset_dir),
        orphaned_assets,
    })
}
