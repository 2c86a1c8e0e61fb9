use crate::error::{CoreError, CoreResult};
use crate::records::model::{CollectionKind, Record};
use crate::storage::config::StoreConfig;
use csv::{ReaderBuilder, Terminator, WriterBuilder};
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

const TEMP_PREFIX: &str = ".table.tmp.";
#[cfg(unix)]
const NEW_TABLE_MODE: u32 = 0o644;

/// Whole-file CSV persistence for one collection.
pub struct TableFile {
    path: PathBuf,
}

impl TableFile {
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    pub fn for_kind(cfg: &StoreConfig, kind: CollectionKind) -> Self {
        Self::new(cfg.table_path(kind))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Reads every row. A missing, empty or unreadable file yields no records;
    /// the cause is logged rather than returned.
    pub fn load(&self) -> Vec<Record> {
        if !self.path.exists() {
            warn!(path = %self.path.display(), "table file missing; no records");
            return Vec::new();
        }
        match self.read_all() {
            Ok(records) => records,
            Err(err) => {
                warn!(path = %self.path.display(), error = %err, "table file unreadable; no records");
                Vec::new()
            }
        }
    }

    fn read_all(&self) -> CoreResult<Vec<Record>> {
        let mut reader = ReaderBuilder::new().flexible(true).from_path(&self.path)?;
        let headers = reader.headers()?.clone();
        let mut records = Vec::new();
        for (line, row) in reader.records().enumerate() {
            let row = row?;
            if row.len() > headers.len() {
                return Err(CoreError::InvalidInput(format!(
                    "row {} has {} cells but the header has {}",
                    line + 1,
                    row.len(),
                    headers.len()
                )));
            }
            // Short rows are padded with empty values.
            records.push(Record::from_pairs(
                headers
                    .iter()
                    .enumerate()
                    .map(|(i, name)| (name, row.get(i).unwrap_or_default())),
            ));
        }
        debug!(path = %self.path.display(), rows = records.len(), "table loaded");
        Ok(records)
    }

    /// Replaces the file with `records`. The header is the union of all field
    /// names in first-seen order, so diverging rows never lose a column.
    pub fn save(&self, records: &[Record]) -> CoreResult<()> {
        let header = union_header(records);
        if header.is_empty() {
            return Err(CoreError::PersistFailed(format!(
                "{}: no fields to derive a header from",
                self.path.display()
            )));
        }

        let bytes = render_csv(&header, records).map_err(|e| {
            CoreError::PersistFailed(format!("{}: {}", self.path.display(), e))
        })?;
        write_atomic(&self.path, &bytes).map_err(|e| {
            CoreError::PersistFailed(format!("{}: {}", self.path.display(), e))
        })?;
        debug!(path = %self.path.display(), rows = records.len(), "table saved");
        Ok(())
    }
}

pub fn union_header(records: &[Record]) -> Vec<String> {
    let mut header: Vec<String> = Vec::new();
    for rec in records {
        for name in rec.field_names() {
            if !header.iter().any(|h| h == name) {
                header.push(name.to_string());
            }
        }
    }
    header
}

fn render_csv(header: &[String], records: &[Record]) -> CoreResult<Vec<u8>> {
    let mut wtr = WriterBuilder::new()
        .terminator(Terminator::Any(b'\n'))
        .from_writer(vec![]);
    wtr.write_record(header)?;
    for rec in records {
        wtr.write_record(header.iter().map(|name| rec.get(name).unwrap_or_default()))?;
    }
    let bytes = wtr.into_inner().map_err(|e| e.into_error())?;
    Ok(bytes)
}

// Write beside the target and rename over it so readers see either the old
// table or the new one.
fn write_atomic(path: &Path, bytes: &[u8]) -> std::io::Result<()> {
    let parent = match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    };
    let mut tmp = tempfile::Builder::new()
        .prefix(TEMP_PREFIX)
        .tempfile_in(parent)?;
    tmp.write_all(bytes)?;
    tmp.flush()?;
    // Temp files are created owner-only; the table keeps the mode it had.
    if let Some(perms) = target_permissions(path)? {
        tmp.as_file().set_permissions(perms)?;
    }
    tmp.as_file().sync_all()?;
    tmp.persist(path).map_err(|e| e.error)?;
    Ok(())
}

fn target_permissions(path: &Path) -> std::io::Result<Option<fs::Permissions>> {
    match fs::metadata(path) {
        Ok(meta) => Ok(Some(meta.permissions())),
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(new_table_permissions()),
        Err(err) => Err(err),
    }
}

#[cfg(unix)]
fn new_table_permissions() -> Option<fs::Permissions> {
    use std::os::unix::fs::PermissionsExt;
    Some(fs::Permissions::from_mode(NEW_TABLE_MODE))
}

#[cfg(not(unix))]
fn new_table_permissions() -> Option<fs::Permissions> {
    None
}
