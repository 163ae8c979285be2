//! Catalog file reading and writing
//!
//! The catalog is a headed, delimited text file. Reading accepts tab, `;` or
//! `,` separators (detected from the header line); writing always emits `;`
//! and re-sorts rows case-insensitively by filename.

use std::fs::File;
use std::io::{BufRead, BufReader, Write};
use std::path::{Path, PathBuf};

use csv::{ReaderBuilder, WriterBuilder};
use tempfile::NamedTempFile;
use tracing::{info, warn};

use super::{CatalogEntry, CatalogRow};
use crate::error::StoreError;

/// Header written to every catalog file
pub const HEADER: [&str; 6] = [
    "filename",
    "slug",
    "modrinth_title",
    "modrinth_project_url",
    "client_side",
    "server_side",
];

const WRITE_SEPARATOR: u8 = b';';

/// Detect the field separator from the header line
///
/// Tab wins over `;`, which wins over `,`. An empty file reads as `,`.
pub fn detect_separator(path: &Path) -> Result<u8, StoreError> {
    let file = File::open(path).map_err(|source| StoreError::Read {
        path: path.to_path_buf(),
        source,
    })?;

    let mut header = String::new();
    BufReader::new(file)
        .read_line(&mut header)
        .map_err(|source| StoreError::Read {
            path: path.to_path_buf(),
            source,
        })?;

    let separator = if header.contains('\t') {
        b'\t'
    } else if header.contains(';') {
        b';'
    } else {
        b','
    };
    Ok(separator)
}

/// Copy a file to its backup location, replacing any previous backup
pub fn backup_file(source: &Path, backup: &Path) -> Result<(), StoreError> {
    std::fs::copy(source, backup).map_err(|e| {
        tracing::error!(
            "Failed to create backup: {} -> {}",
            source.display(),
            backup.display()
        );
        StoreError::Backup {
            from: source.to_path_buf(),
            to: backup.to_path_buf(),
            source: e,
        }
    })?;
    info!("Backup created: {}", backup.display());
    Ok(())
}

/// Handle to the catalog file on disk
#[derive(Debug, Clone)]
pub struct CatalogStore {
    path: PathBuf,
    backup: Option<PathBuf>,
}

impl CatalogStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            backup: None,
        }
    }

    /// Back up the existing file to `backup` before every write
    pub fn with_backup(mut self, backup: impl Into<PathBuf>) -> Self {
        self.backup = Some(backup.into());
        self
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn exists(&self) -> bool {
        self.path.is_file()
    }

    /// Raw data records in file order, header row excluded
    pub fn read_records(&self) -> Result<Vec<Vec<String>>, StoreError> {
        let separator = detect_separator(&self.path)?;
        let file = File::open(&self.path).map_err(|source| StoreError::Read {
            path: self.path.clone(),
            source,
        })?;

        let mut reader = ReaderBuilder::new()
            .has_headers(false)
            .flexible(true)
            .delimiter(separator)
            .from_reader(file);

        let mut records = Vec::new();
        for result in reader.records() {
            let record = result.map_err(|source| StoreError::Parse {
                path: self.path.clone(),
                source,
            })?;
            records.push(record.iter().map(|f| f.to_string()).collect::<Vec<_>>());
        }

        // Header row is never part of the catalog
        if !records.is_empty() {
            records.remove(0);
        }

        info!(
            "Read {} rows from catalog file: {}",
            records.len(),
            self.path.display()
        );
        Ok(records)
    }

    /// Lookup rows (filename and slug) in file order
    pub fn read_rows(&self) -> Result<Vec<CatalogRow>, StoreError> {
        Ok(self
            .read_records()?
            .iter()
            .map(|r| CatalogRow::from_fields(r.as_slice()))
            .collect())
    }

    /// Persisted entries as last written, without any network lookups
    pub fn read_entries(&self) -> Result<Vec<CatalogEntry>, StoreError> {
        Ok(self
            .read_records()?
            .iter()
            .map(|r| CatalogEntry::from_fields(r.as_slice()))
            .collect())
    }

    /// Replace the slug of one row and write the catalog back
    ///
    /// Only the slug changes; lookup results stay as they are until the
    /// next enrichment. The filename must match exactly.
    pub fn update_slug(&self, filename: &str, slug: &str) -> Result<CatalogEntry, StoreError> {
        let mut entries = self.read_entries()?;
        let entry = entries
            .iter_mut()
            .find(|e| e.filename == filename)
            .ok_or_else(|| StoreError::UnknownEntry {
                path: self.path.clone(),
                filename: filename.to_string(),
            })?;
        entry.slug = slug.trim().to_string();
        let updated = entry.clone();

        self.write(&entries)?;
        info!("Set slug of {} to '{}'", updated.filename, updated.slug);
        Ok(updated)
    }

    /// Write a snapshot, sorted case-insensitively by filename
    ///
    /// The file is replaced atomically. If a backup path is configured and
    /// the catalog already exists, it is copied there first; a failed backup
    /// is logged and does not block the write.
    pub fn write(&self, entries: &[CatalogEntry]) -> Result<(), StoreError> {
        if let Some(backup) = &self.backup {
            if self.exists() {
                if let Err(e) = backup_file(&self.path, backup) {
                    warn!("{}", e);
                }
            }
        }

        let mut sorted: Vec<&CatalogEntry> = entries.iter().collect();
        sorted.sort_by_key(|e| e.filename.to_lowercase());

        let write_err = |source: std::io::Error| StoreError::Write {
            path: self.path.clone(),
            source,
        };

        let dir = match self.path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
            _ => PathBuf::from("."),
        };
        let temp = NamedTempFile::new_in(&dir).map_err(write_err)?;

        let mut writer = WriterBuilder::new()
            .delimiter(WRITE_SEPARATOR)
            .from_writer(temp);

        writer
            .write_record(HEADER)
            .map_err(|e| write_err(e.into()))?;
        for entry in &sorted {
            writer
                .write_record(entry.to_fields())
                .map_err(|e| write_err(e.into()))?;
        }

        let mut temp = writer
            .into_inner()
            .map_err(|e| write_err(e.into_error()))?;
        temp.flush().map_err(write_err)?;
        temp.persist(&self.path).map_err(|e| write_err(e.error))?;

        info!(
            "Wrote {} mods to catalog file: {}",
            sorted.len(),
            self.path.display()
        );
        Ok(())
    }
}
