use crate::error::{CoreError, CoreResult};
use crate::evidence::model::EvidenceEntry;
use crate::records::audit::{self, StoreAuditReport};
use crate::records::model::{CollectionKind, Record, FIELD_DETAILS, FIELD_LABEL};
use crate::storage::asset_store::{to_forward_slashes, AssetStore};
use crate::storage::config::StoreConfig;
use crate::storage::table_file::TableFile;
use tracing::{info, warn};

/// Node and edge tables plus their evidence images.
///
/// Holds no record state: every call re-reads the table it touches, and every
/// mutation rewrites the whole table. Callers must not run two mutations on
/// the same collection at once; the later save wins.
pub struct RecordStore {
    cfg: StoreConfig,
    assets: AssetStore,
}

impl RecordStore {
    pub fn open(cfg: StoreConfig) -> CoreResult<Self> {
        cfg.validate()?;
        let assets = AssetStore::open(&cfg)?;
        Ok(Self { cfg, assets })
    }

    /// Like [`RecordStore::open`] but creates nothing on disk. For inspection
    /// of a store that may not exist yet.
    pub fn attach(cfg: StoreConfig) -> CoreResult<Self> {
        cfg.validate()?;
        let assets = AssetStore::attach(&cfg);
        Ok(Self { cfg, assets })
    }

    pub fn config(&self) -> &StoreConfig {
        &self.cfg
    }

    pub fn assets(&self) -> &AssetStore {
        &self.assets
    }

    pub fn table(&self, kind: CollectionKind) -> TableFile {
        TableFile::for_kind(&self.cfg, kind)
    }

    pub fn list(&self, kind: CollectionKind) -> Vec<Record> {
        self.table(kind)
            .load()
            .into_iter()
            .map(Record::canonicalized)
            .collect()
    }

    pub fn get(&self, id: &str, kind: CollectionKind) -> Option<Record> {
        self.list(kind).into_iter().find(|r| r.id() == id)
    }

    pub fn selection_labels(&self, kind: CollectionKind) -> Vec<String> {
        self.list(kind).iter().map(Record::display_label).collect()
    }

    pub fn evidence(&self, id: &str, kind: CollectionKind) -> CoreResult<Vec<EvidenceEntry>> {
        let rec = self.get(id, kind).ok_or_else(|| not_found(kind, id))?;
        Ok(rec.evidence())
    }

    /// Replaces the stored row with the same `ID`. The table is left untouched
    /// when no such row exists.
    pub fn update(&self, record: Record, kind: CollectionKind) -> CoreResult<()> {
        let id = record.id().to_string();
        if id.is_empty() {
            return Err(not_found(kind, &id));
        }
        let mut records = self.list(kind);
        let slot = records
            .iter_mut()
            .find(|r| r.id() == id)
            .ok_or_else(|| not_found(kind, &id))?;
        *slot = record.canonicalized();
        self.table(kind).save(&records)?;
        info!(%kind, id = %id, "record updated");
        Ok(())
    }

    /// Sets `Label` and `Details` on an existing record, keeping every other field.
    pub fn update_fields(
        &self,
        id: &str,
        kind: CollectionKind,
        label: &str,
        details: &str,
    ) -> CoreResult<()> {
        let current = self.get(id, kind).ok_or_else(|| not_found(kind, id))?;
        let next = current
            .with(FIELD_LABEL, label)
            .with(FIELD_DETAILS, details.trim());
        self.update(next, kind)
    }

    pub fn add_evidence(
        &self,
        id: &str,
        kind: CollectionKind,
        source_image: impl AsRef<std::path::Path>,
        source_url: Option<&str>,
        source_label: Option<&str>,
    ) -> CoreResult<EvidenceEntry> {
        let stored = self.assets.store(source_image)?;

        let Some(current) = self.get(id, kind) else {
            self.assets.delete(&stored.local_path);
            return Err(not_found(kind, id));
        };

        let entry = EvidenceEntry::new(
            stored.asset_url,
            stored.local_path,
            source_url,
            source_label,
        )
        .normalized();
        let mut evidence = current.evidence();
        evidence.push(entry.clone());

        // A failed save leaves the copied asset behind; the audit reports it as orphaned.
        self.update(current.with_evidence(&evidence), kind)?;
        info!(%kind, id, local_path = %entry.local_path, "evidence added");
        Ok(entry)
    }

    pub fn remove_evidence(
        &self,
        id: &str,
        kind: CollectionKind,
        index: usize,
    ) -> CoreResult<EvidenceEntry> {
        let current = self.get(id, kind).ok_or_else(|| not_found(kind, id))?;
        let mut evidence = current.evidence();
        if index >= evidence.len() {
            return Err(CoreError::IndexOutOfRange {
                index,
                len: evidence.len(),
            });
        }

        let removed = evidence.remove(index);
        self.update(current.with_evidence(&evidence), kind)?;
        info!(%kind, id, index, "evidence removed");

        // The asset goes only once the table no longer references it.
        if let Some(path) = removed.resolved_local_path() {
            let path = self.cfg.resolve_local_path(&path);
            if !self.assets.delete(&to_forward_slashes(&path)) {
                warn!(%kind, id, index, local_path = %path.display(), "evidence asset not deleted; entry already removed");
            }
        }
        Ok(removed)
    }

    /// Removes several entries by their current indices. Indices are applied
    /// highest first so earlier removals do not shift later ones. Stops at the
    /// first failure; entries removed before it stay removed.
    pub fn remove_evidence_many(
        &self,
        id: &str,
        kind: CollectionKind,
        indices: &[usize],
    ) -> CoreResult<usize> {
        let mut ordered = indices.to_vec();
        ordered.sort_unstable_by(|a, b| b.cmp(a));
        ordered.dedup();

        let mut removed = 0;
        for index in ordered {
            self.remove_evidence(id, kind, index)?;
            removed += 1;
        }
        Ok(removed)
    }

    pub fn audit(&self) -> CoreResult<StoreAuditReport> {
        audit::audit_store(self)
    }
}

fn not_found(kind: CollectionKind, id: &str) -> CoreError {
    CoreError::RecordNotFound {
        kind: kind.to_string(),
        id: id.to_string(),
    }
}
