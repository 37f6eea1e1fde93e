//! Export functionality for preview results

use std::fs::File;
use std::io::Write;
use std::path::Path;

use super::types::PreviewResult;
use crate::error::{Error, Result};

/// Export a preview to JSON format
pub fn to_json(result: &PreviewResult, path: &Path) -> Result<()> {
    let json = serde_json::to_string_pretty(result)
        .map_err(|e| Error::Other(format!("Failed to serialize preview: {}", e)))?;

    let mut file = File::create(path)?;
    file.write_all(json.as_bytes())?;

    Ok(())
}

/// Export a preview to CSV format, one row per operation
pub fn to_csv(result: &PreviewResult, path: &Path) -> Result<()> {
    let mut writer = csv::Writer::from_path(path)
        .map_err(|e| Error::Other(format!("Failed to create CSV file: {}", e)))?;

    writer
        .write_record([
            "Source",
            "Destination",
            "Action",
            "Operation",
            "Author",
            "Title",
            "Series",
            "Sequence",
            "Files",
            "Bytes",
            "Confidence",
            "Issues",
        ])
        .map_err(|e| Error::Other(format!("CSV write error: {}", e)))?;

    for op in &result.operations {
        let meta = &op.metadata;
        let issues: Vec<String> = op
            .issues
            .iter()
            .map(|i| format!("{}: {}", i.severity, i.message))
            .collect();

        writer
            .write_record([
                op.source.display().to_string(),
                op.destination.display().to_string(),
                op.action.to_string(),
                op.operation.to_string(),
                meta.author().unwrap_or_default().to_string(),
                meta.title().unwrap_or_default().to_string(),
                meta.series().unwrap_or_default().to_string(),
                meta.sequence().unwrap_or_default().to_string(),
                op.file_count.to_string(),
                op.size_bytes.to_string(),
                format!("{:.2}", meta.confidence),
                issues.join(" | "),
            ])
            .map_err(|e| Error::Other(format!("CSV write error: {}", e)))?;
    }

    writer
        .flush()
        .map_err(|e| Error::Other(format!("Failed to flush CSV: {}", e)))?;

    Ok(())
}
