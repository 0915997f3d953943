//! Translation between the moment-retrieval exchange format and [`AnnotationSet`].
//!
//! Accepted inputs:
//! - line-delimited JSON, one query record per line
//! - a single JSON array of query records
//! - a single query record object
//! - the inference-script wrapper `{"video_path", "query", "predictions": {record}}`
//!
//! This is the only place where the shape of a record may vary. Everything
//! downstream sees [`QueryResult`]/[`Interval`].

pub mod format;
mod record;

use std::fs;
use std::path::Path;

use serde_json::{Map, Value};

use crate::error::{AnnotationError, Result};
use crate::models::{AnnotationSet, Interval, QueryResult};
use crate::{log_info, log_warn};

pub use format::ExportFormat;
use record::{parse_window, QueryRecord, QueryRecordOut};

const ENABLE_LOGS: bool = true;

const PREDICTIONS_KEY: &str = "predictions";
const VIDEO_PATH_KEY: &str = "video_path";

/// Read and decode an annotation file. `model_info["source"]` records the path.
pub fn load_path(path: &Path) -> Result<AnnotationSet> {
    let contents = fs::read_to_string(path).map_err(|err| AnnotationError::io(path, err))?;
    let mut set = load_str(&contents)?;
    set.model_info
        .insert("source".to_string(), path.display().to_string());
    log_info!(
        "Loaded {} queries ({} intervals) from {}",
        set.queries.len(),
        set.interval_count(),
        path.display()
    );
    Ok(set)
}

pub fn load_str(contents: &str) -> Result<AnnotationSet> {
    let documents = parse_documents(contents)?;

    let mut video_path = None;
    let mut queries = Vec::with_capacity(documents.len());
    for (position, document) in documents.into_iter().enumerate() {
        let (record, wrapped_video_path) = unwrap_record(document, position)?;
        if video_path.is_none() {
            video_path = wrapped_video_path;
        }
        queries.push(decode_query(record, position)?);
    }

    let mut set = AnnotationSet::new(queries);
    set.video_path = video_path;
    set.total_queries = Some(set.queries.len());
    Ok(set)
}

/// Serialize in the same `[start, end, confidence]` shape the loader reads.
pub fn to_string(set: &AnnotationSet, format: ExportFormat) -> Result<String> {
    let records: Vec<QueryRecordOut<'_>> = set.queries.iter().map(QueryRecordOut::from).collect();

    match format {
        ExportFormat::JsonLines => {
            let mut out = String::new();
            for record in &records {
                let line = serde_json::to_string(record)
                    .map_err(|err| AnnotationError::format("serializing query record", err))?;
                out.push_str(&line);
                out.push('\n');
            }
            Ok(out)
        }
        ExportFormat::Json => serde_json::to_string_pretty(&records)
            .map_err(|err| AnnotationError::format("serializing annotation document", err)),
    }
}

/// Serialize fully before touching the destination so a failure never leaves
/// a half-written file.
pub fn save_path(set: &AnnotationSet, path: &Path, format: ExportFormat) -> Result<()> {
    let serialized = to_string(set, format)?;
    fs::write(path, serialized).map_err(|err| AnnotationError::io(path, err))?;
    log_info!(
        "Saved {} queries to {} as {}",
        set.queries.len(),
        path.display(),
        format.as_str()
    );
    Ok(())
}

/// Whole-document JSON first; if that does not parse, one document per non-blank line.
fn parse_documents(contents: &str) -> Result<Vec<Value>> {
    let whole_error = match serde_json::from_str::<Value>(contents) {
        Ok(Value::Array(items)) => return Ok(items),
        Ok(object @ Value::Object(_)) => return Ok(vec![object]),
        Ok(other) => {
            return Err(AnnotationError::format(
                "reading annotation document",
                format!("top-level JSON must be an object or array, found {}", kind(&other)),
            ))
        }
        Err(err) => err,
    };

    let mut documents = Vec::new();
    for (line_index, line) in contents.lines().enumerate() {
        if line.trim().is_empty() {
            continue;
        }
        let value = serde_json::from_str::<Value>(line).map_err(|err| {
            AnnotationError::format(
                "reading line-delimited annotations",
                format!("line {}: {err}", line_index + 1),
            )
        })?;
        documents.push(value);
    }

    if documents.is_empty() {
        return Err(AnnotationError::format(
            "reading annotation document",
            whole_error,
        ));
    }
    Ok(documents)
}

/// Peel the inference-script wrapper off a record if present.
fn unwrap_record(document: Value, position: usize) -> Result<(Map<String, Value>, Option<String>)> {
    let mut object = match document {
        Value::Object(object) => object,
        other => {
            return Err(AnnotationError::format(
                "decoding query record",
                format!("record {position} is {}, expected an object", kind(&other)),
            ))
        }
    };

    let is_wrapper = !object.contains_key("pred_relevant_windows")
        && matches!(object.get(PREDICTIONS_KEY), Some(Value::Object(_)));
    if !is_wrapper {
        return Ok((object, None));
    }

    let video_path = object
        .get(VIDEO_PATH_KEY)
        .and_then(Value::as_str)
        .map(str::to_string);
    let query_text = object.remove("query");
    let Some(Value::Object(mut inner)) = object.remove(PREDICTIONS_KEY) else {
        return Err(AnnotationError::format(
            "decoding query record",
            format!("record {position} has an unreadable predictions block"),
        ));
    };
    if let Some(query_text) = query_text {
        inner.entry("query").or_insert(query_text);
    }
    Ok((inner, video_path))
}

fn decode_query(object: Map<String, Value>, position: usize) -> Result<QueryResult> {
    let record: QueryRecord = serde_json::from_value(Value::Object(object)).map_err(|err| {
        AnnotationError::format("decoding query record", format!("record {position}: {err}"))
    })?;

    let query_id = Some(record.qid.unwrap_or(position as i64));

    let mut intervals = Vec::with_capacity(record.pred_relevant_windows.len());
    for (window_index, window) in record.pred_relevant_windows.iter().enumerate() {
        let parsed = parse_window(window).and_then(|(start, end, score)| {
            Interval::new(start, end, score)
                .map_err(|err| record::WindowRejection::InvalidBounds(err.to_string()))
        });
        match parsed {
            Ok(interval) => intervals.push(interval.with_query_id(query_id)),
            Err(reason) => {
                log_warn!(
                    "Discarded window {} of query {:?} ('{}'): {}",
                    window_index,
                    query_id,
                    record.query,
                    reason
                );
            }
        }
    }

    Ok(QueryResult::new(
        query_id,
        record.query,
        record.vid,
        intervals,
        record.pred_saliency_scores,
    ))
}

fn kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
