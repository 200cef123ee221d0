use crate::domain::model::{ExportBundle, ExportFile, ExportFormat, ReviewRecord};
use crate::utils::error::{HarvestError, Result};
use chrono::{DateTime, Local};

pub const UTF8_BOM: &[u8] = b"\xEF\xBB\xBF";
pub const CSV_HEADER: [&str; 2] = ["Rating", "Review"];

/// `google_reviews_<YYYYMMDD>_<HHMM>.<ext>`, stamped with the export time.
pub fn export_filename(at: DateTime<Local>, format: ExportFormat) -> String {
    format!(
        "google_reviews_{}.{}",
        at.format("%Y%m%d_%H%M"),
        format.extension()
    )
}

/// Two columns in harvest order. An absent rating is an empty cell.
pub fn render_csv(records: &[ReviewRecord], bom: bool) -> Result<Vec<u8>> {
    let mut buffer = Vec::new();
    if bom {
        buffer.extend_from_slice(UTF8_BOM);
    }

    let mut writer = csv::WriterBuilder::new()
        .terminator(csv::Terminator::Any(b'\n'))
        .from_writer(buffer);
    writer.write_record(CSV_HEADER)?;
    for record in records {
        let rating = record.rating.map(|r| r.to_string()).unwrap_or_default();
        writer.write_record([rating.as_str(), record.text.as_str()])?;
    }

    writer.into_inner().map_err(|e| HarvestError::IoError(e.into_error()))
}

pub fn render_json(records: &[ReviewRecord]) -> Result<Vec<u8>> {
    Ok(serde_json::to_vec_pretty(records)?)
}

/// Renders one file per requested format, all sharing one timestamp.
pub fn build_bundle(
    records: &[ReviewRecord],
    formats: &[ExportFormat],
    bom: bool,
    at: DateTime<Local>,
) -> Result<ExportBundle> {
    let mut files = Vec::with_capacity(formats.len());
    for &format in formats {
        let data = match format {
            ExportFormat::Csv => render_csv(records, bom)?,
            ExportFormat::Json => render_json(records)?,
        };
        files.push(ExportFile {
            name: export_filename(at, format),
            data,
        });
    }

    Ok(ExportBundle {
        files,
        record_count: records.len(),
    })
}
