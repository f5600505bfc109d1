//! Spreadsheet export
//!
//! Writes stored offers as CSV or TSV, picked by the export file's extension.
//! One header row, then one row per offer in the store's export order.

use crate::output::OutputResult;
use crate::record::StoredOffer;
use crate::storage::Storage;
use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::Path;

/// Column headers of the export file
pub const EXPORT_HEADERS: [&str; 5] = [
    "created_at",
    "source_name",
    "title",
    "numeric_value",
    "target_url",
];

/// Delimited text flavour of the export
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportFormat {
    Csv,
    Tsv,
}

impl ExportFormat {
    /// `.tsv` means tab-separated; anything else is comma-separated
    pub fn from_path(path: &Path) -> Self {
        match path.extension().and_then(|ext| ext.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("tsv") => Self::Tsv,
            _ => Self::Csv,
        }
    }

    pub fn delimiter(self) -> char {
        match self {
            Self::Csv => ',',
            Self::Tsv => '\t',
        }
    }
}

/// Exports every stored offer to `path`
///
/// # Returns
///
/// * `Ok(usize)` - Number of offer rows written, header excluded
/// * `Err(OutputError)` - Failed to read the store or write the file
pub fn export_offers(storage: &dyn Storage, path: &Path) -> OutputResult<usize> {
    let offers = storage.load_export_rows()?;
    write_export(path, &offers)?;
    tracing::info!("Exported {} offers to {}", offers.len(), path.display());
    Ok(offers.len())
}

/// Writes a header-only export so consumers find a file after a failed run
pub fn write_empty_export(path: &Path) -> OutputResult<()> {
    write_export(path, &[])?;
    Ok(())
}

fn write_export(path: &Path, offers: &[StoredOffer]) -> io::Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }

    let sep = ExportFormat::from_path(path).delimiter();
    let mut writer = BufWriter::new(File::create(path)?);

    write_row(&mut writer, &EXPORT_HEADERS.map(str::to_string), sep)?;
    for offer in offers {
        write_row(&mut writer, &offer_row(offer), sep)?;
    }

    writer.flush()
}

fn offer_row(offer: &StoredOffer) -> [String; 5] {
    [
        offer.created_at.clone(),
        offer.source_name.clone(),
        offer.title.clone(),
        offer
            .numeric_value
            .map(|value| value.to_string())
            .unwrap_or_default(),
        offer.target_url.clone(),
    ]
}

fn needs_quotes(field: &str, sep: char) -> bool {
    field.contains(sep) || field.contains('"') || field.contains('\n') || field.contains('\r')
}

/// Write a single CSV/TSV row to any writer.
fn write_row<W: Write>(w: &mut W, row: &[String], sep: char) -> io::Result<()> {
    let mut first = true;
    for cell in row {
        if !first {
            write!(w, "{}", sep)?;
        } else {
            first = false;
        }
        if needs_quotes(cell, sep) {
            write!(w, "\"{}\"", cell.replace('"', "\"\""))?;
        } else {
            write!(w, "{}", cell)?;
        }
    }
    writeln!(w)
}
