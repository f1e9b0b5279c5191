//! Concatenated text dump of every PDF in a directory.
//!
//! Each document is written as a `----- <file> -----` delimiter line followed
//! by its text, which is the shape the block splitter reads back.

use std::fmt::Write as _;
use std::fs;
use std::path::{Path, PathBuf};

use glob::{Pattern, glob};
use tracing::{debug, info, warn};

use super::PdfExtractor;
use crate::error::{FacturasError, Result};

/// Written in place of the text of a document that yielded none.
pub const EMPTY_TEXT_NOTICE: &str = "(No se extrajo texto o está vacío)";
/// Prefix of the only line in a dump of a directory without PDFs.
pub const NO_DOCUMENTS_NOTICE: &str = "No se encontraron archivos PDF en";

/// What happened to one document while dumping.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DumpEntry {
    /// Text was extracted; carries the character count.
    Text { filename: String, chars: usize },
    /// The document parsed but produced no text.
    Empty { filename: String },
    /// The document could not be read or parsed.
    Failed { filename: String, reason: String },
}

impl DumpEntry {
    pub fn filename(&self) -> &str {
        match self {
            Self::Text { filename, .. }
            | Self::Empty { filename }
            | Self::Failed { filename, .. } => filename,
        }
    }
}

/// Summary of a dump run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DumpOutcome {
    /// Where the dump was written.
    pub path: PathBuf,
    pub documents: usize,
    pub empty: usize,
    pub failed: usize,
}

/// PDF files directly inside `dir`, sorted by file name. The extension is
/// matched case-insensitively.
pub fn list_pdfs(dir: &Path) -> Result<Vec<PathBuf>> {
    if !dir.is_dir() {
        return Err(FacturasError::input_missing(dir));
    }

    let pattern = format!("{}/*", Pattern::escape(&dir.to_string_lossy()));
    let mut files: Vec<PathBuf> = glob(&pattern)?
        .filter_map(|r| r.ok())
        .filter(|p| p.is_file())
        .filter(|p| {
            p.extension()
                .and_then(|e| e.to_str())
                .is_some_and(|e| e.eq_ignore_ascii_case("pdf"))
        })
        .collect();
    files.sort_by(|a, b| a.file_name().cmp(&b.file_name()));

    debug!("Found {} PDF files in {}", files.len(), dir.display());
    Ok(files)
}

/// Write the text of every PDF in `dir` to `dir/<dump_name>`.
///
/// Per-document failures are recorded in the dump and reported through
/// `on_document`; they never abort the run. A missing directory does.
pub fn write_text_dump(
    dir: &Path,
    dump_name: &str,
    mut on_document: impl FnMut(&DumpEntry),
) -> Result<DumpOutcome> {
    let files = list_pdfs(dir)?;
    let path = dir.join(dump_name);
    let mut outcome = DumpOutcome {
        path: path.clone(),
        ..Default::default()
    };

    let mut out = String::new();
    if files.is_empty() {
        let _ = writeln!(out, "{} '{}'.", NO_DOCUMENTS_NOTICE, dir.display());
        fs::write(&path, out)?;
        info!("No PDF files in {}", dir.display());
        return Ok(outcome);
    }

    for file in &files {
        let filename = file
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        let _ = writeln!(out, "----- {} -----", filename);

        let entry = match fs::read(file)
            .map_err(|e| e.to_string())
            .and_then(|data| PdfExtractor::text_of(&data).map_err(|e| e.to_string()))
        {
            Ok(text) if text.trim().is_empty() => {
                out.push_str(EMPTY_TEXT_NOTICE);
                out.push('\n');
                outcome.empty += 1;
                warn!("No text extracted from {}", filename);
                DumpEntry::Empty { filename }
            }
            Ok(text) => {
                out.push_str(&text);
                if !text.ends_with('\n') {
                    out.push('\n');
                }
                DumpEntry::Text {
                    filename,
                    chars: text.chars().count(),
                }
            }
            Err(reason) => {
                let _ = writeln!(out, "ERROR al procesar {}: {}", filename, reason);
                outcome.failed += 1;
                warn!("Failed to process {}: {}", filename, reason);
                DumpEntry::Failed { filename, reason }
            }
        };

        outcome.documents += 1;
        on_document(&entry);
    }

    fs::write(&path, out)?;
    info!(
        documents = outcome.documents,
        empty = outcome.empty,
        failed = outcome.failed,
        "wrote text dump to {}",
        path.display()
    );
    Ok(outcome)
}
