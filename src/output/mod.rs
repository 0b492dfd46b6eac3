use thiserror::Error;
use tokio::fs::OpenOptions;
use tokio::io::AsyncWriteExt;

use crate::record::Record;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum OutputFormat {
    Text,
    Json,
    Xml,
}

impl OutputFormat {
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_lowercase().as_str() {
            "text" | "txt" | "tsv" => Some(Self::Text),
            "json" => Some(Self::Json),
            "xml" => Some(Self::Xml),
            _ => None,
        }
    }
}

pub fn infer_format_from_path(path: &str) -> Option<OutputFormat> {
    let lower = path.trim().to_lowercase();
    if lower.ends_with(".json") {
        return Some(OutputFormat::Json);
    }
    if lower.ends_with(".xml") {
        return Some(OutputFormat::Xml);
    }
    if lower.ends_with(".txt") || lower.ends_with(".tsv") {
        return Some(OutputFormat::Text);
    }
    None
}

#[derive(Debug, Error)]
pub enum ExportError {
    #[error("failed to serialize permits: {source}")]
    Serialize {
        #[source]
        source: serde_json::Error,
    },

    #[error("failed to write output file: {path}: {source}")]
    Write {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

fn tsv_cell(value: &str) -> String {
    value.replace(['\t', '\n', '\r'], " ")
}

/// One tab-separated line per permit: id, applicant, facility type, food
/// items, address, status, permit.
pub fn render_text(records: &[&Record]) -> Vec<u8> {
    let mut out = String::new();
    for r in records {
        let cells = [
            r.id.as_str(),
            r.applicant.as_deref().unwrap_or_default(),
            r.facility_type.as_str(),
            r.food_items.as_str(),
            r.address.as_deref().unwrap_or_default(),
            r.status.as_deref().unwrap_or_default(),
            r.permit.as_str(),
        ];
        let line = cells.map(tsv_cell).join("\t");
        out.push_str(&line);
        out.push('\n');
    }
    out.into_bytes()
}

pub fn render_json(records: &[&Record]) -> Result<Vec<u8>, ExportError> {
    let mut out =
        serde_json::to_vec_pretty(records).map_err(|source| ExportError::Serialize { source })?;
    out.push(b'\n');
    Ok(out)
}

fn escape_xml(value: &str) -> String {
    value
        .replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&apos;")
}

pub fn render_xml(records: &[&Record]) -> Vec<u8> {
    let mut out = String::new();
    out.push_str(r#"<?xml version="1.0" encoding="UTF-8"?>"#);
    out.push('\n');
    out.push_str("<permits>\n");
    for r in records {
        out.push_str(&format!("  <permit id=\"{}\">\n", escape_xml(&r.id)));
        let fields = [
            ("applicant", r.applicant.as_deref().unwrap_or_default()),
            ("facility_type", r.facility_type.as_str()),
            ("food_items", r.food_items.as_str()),
            ("address", r.address.as_deref().unwrap_or_default()),
            ("status", r.status.as_deref().unwrap_or_default()),
            ("permit", r.permit.as_str()),
        ];
        for (tag, value) in fields {
            out.push_str(&format!("    <{tag}>{}</{tag}>\n", escape_xml(value)));
        }
        out.push_str("  </permit>\n");
    }
    out.push_str("</permits>\n");
    out.into_bytes()
}

pub fn render(records: &[&Record], format: OutputFormat) -> Result<Vec<u8>, ExportError> {
    match format {
        OutputFormat::Text => Ok(render_text(records)),
        OutputFormat::Json => render_json(records),
        OutputFormat::Xml => Ok(render_xml(records)),
    }
}

pub async fn write_export(
    path: &str,
    format: OutputFormat,
    records: &[&Record],
) -> Result<(), ExportError> {
    let rendered = render(records, format)?;
    let mut outfile = OpenOptions::new()
        .create(true)
        .write(true)
        .truncate(true)
        .open(path)
        .await
        .map_err(|source| ExportError::Write {
            path: path.to_string(),
            source,
        })?;
    outfile
        .write_all(&rendered)
        .await
        .map_err(|source| ExportError::Write {
            path: path.to_string(),
            source,
        })?;
    // tokio finishes file writes on the blocking pool
    outfile.flush().await.map_err(|source| ExportError::Write {
        path: path.to_string(),
        source,
    })?;
    Ok(())
}
