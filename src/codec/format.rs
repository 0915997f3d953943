use std::path::Path;

use serde::{Deserialize, Serialize};

/// On-disk shape of an exported annotation document.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ExportFormat {
    /// One query record per line (`.jsonl`).
    JsonLines,
    /// A single pretty-printed array of query records (`.json`).
    Json,
}

impl ExportFormat {
    /// `.jsonl` (any case) selects line-delimited output; everything else is
    /// written as a single document.
    pub fn for_path(path: &Path) -> Self {
        match path.extension().and_then(|ext| ext.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("jsonl") => ExportFormat::JsonLines,
            _ => ExportFormat::Json,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ExportFormat::JsonLines => "jsonl",
            ExportFormat::Json => "json",
        }
    }
}
