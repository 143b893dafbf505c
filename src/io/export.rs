use std::fs::OpenOptions;
use std::io::{self, Write};
use std::path::Path;

use chrono::{DateTime, Utc};
use serde::Serialize;
use tempfile::NamedTempFile;

use crate::application::{Ledger, LedgerError};
use crate::domain::Transaction;

/// Ledger snapshot for JSON export
#[derive(Debug, Clone, Serialize)]
pub struct LedgerSnapshot {
    pub version: String,
    pub exported_at: DateTime<Utc>,
    pub transactions: Vec<Transaction>,
}

/// Exporter for converting ledger data to the text log or JSON
pub struct Exporter<'a> {
    ledger: &'a Ledger,
}

impl<'a> Exporter<'a> {
    pub fn new(ledger: &'a Ledger) -> Self {
        Self { ledger }
    }

    /// Render the text log: one formatted transaction per line, each ending in `\n`.
    pub fn render_text(&self) -> (String, usize) {
        let transactions = self.ledger.list();
        let mut out = String::new();
        for transaction in &transactions {
            out.push_str(&transaction.format());
            out.push('\n');
        }
        (out, transactions.len())
    }

    /// Export the text log to any writer
    pub fn write_text<W: Write>(&self, mut writer: W) -> io::Result<usize> {
        let (text, count) = self.render_text();
        writer.write_all(text.as_bytes())?;
        writer.flush()?;
        Ok(count)
    }

    pub fn snapshot(&self) -> LedgerSnapshot {
        LedgerSnapshot {
            version: env!("CARGO_PKG_VERSION").to_string(),
            exported_at: Utc::now(),
            transactions: self.ledger.list(),
        }
    }

    /// Export the ledger as a pretty-printed JSON snapshot
    pub fn write_json<W: Write>(&self, mut writer: W) -> io::Result<LedgerSnapshot> {
        let snapshot = self.snapshot();
        serde_json::to_writer_pretty(&mut writer, &snapshot)?;
        writer.flush()?;
        Ok(snapshot)
    }

    /// Export the text log to `path`, truncating it. Returns the number of lines.
    pub fn export_text_file(&self, path: &Path) -> Result<usize, LedgerError> {
        let (text, count) = self.render_text();
        write_file(path, text.as_bytes())?;
        tracing::info!(path = %path.display(), count, "exported transactions");
        Ok(count)
    }

    /// Export the JSON snapshot to `path`, truncating it. Returns the number of transactions.
    pub fn export_json_file(&self, path: &Path) -> Result<usize, LedgerError> {
        let snapshot = self.snapshot();
        let json = serde_json::to_string_pretty(&snapshot)?;
        write_file(path, json.as_bytes())?;
        let count = snapshot.transactions.len();
        tracing::info!(path = %path.display(), count, "exported JSON snapshot");
        Ok(count)
    }
}

/// Content is fully rendered before the destination is touched. It is staged in a
/// temporary file next to `path` and renamed over it, so a failed open or write
/// leaves an existing file as it was.
fn write_file(path: &Path, contents: &[u8]) -> Result<(), LedgerError> {
    // The destination itself must accept writes, as it would for a plain truncate.
    let permissions = match OpenOptions::new().write(true).open(path) {
        Ok(existing) => Some(
            existing
                .metadata()
                .map_err(|source| open_error(path, source))?
                .permissions(),
        ),
        Err(source) if source.kind() == io::ErrorKind::NotFound => None,
        Err(source) => return Err(open_error(path, source)),
    };

    let dir = path
        .parent()
        .filter(|dir| !dir.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."));
    let mut staged = NamedTempFile::new_in(dir).map_err(|source| open_error(path, source))?;

    staged
        .write_all(contents)
        .and_then(|()| match permissions {
            Some(permissions) => staged.as_file().set_permissions(permissions),
            None => Ok(()),
        })
        .and_then(|()| staged.as_file().sync_all())
        .map_err(|source| write_error(path, source))?;

    staged
        .persist(path)
        .map_err(|err| write_error(path, err.error))?;
    Ok(())
}

fn open_error(path: &Path, source: io::Error) -> LedgerError {
    tracing::warn!(path = %path.display(), error = %source, "cannot open file for writing");
    LedgerError::FileOpen {
        path: path.to_path_buf(),
        source,
    }
}

fn write_error(path: &Path, source: io::Error) -> LedgerError {
    tracing::warn!(path = %path.display(), error = %source, "export failed");
    LedgerError::Write {
        path: path.to_path_buf(),
        source,
    }
}
