/* This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/. */

//! JSON import/export.
//!
//! Import runs in three passes: a structural walk over the raw JSON value
//! (so errors can name the offending field), a typed decode, then semantic
//! checks on ids. Any failure rejects the whole document.

use chrono::{DateTime, NaiveDate, SecondsFormat, Utc};
use serde_json::{Map, Value};
use std::collections::HashSet;

use super::document::{
    Document, EXPORT_SOURCE, ExportMetadata, ExportedDocument, FORMAT_VERSION,
};

/// Why a candidate document was rejected
#[derive(Debug, Clone, PartialEq)]
pub enum ValidationError {
    Syntax(String),
    NotAnObject,
    MissingField(String),
    InvalidField { field: String, reason: String },
    DuplicateNucleotide(u32),
    DanglingBasePair { from: u32, to: u32 },
    SelfPair(u32),
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ValidationError::Syntax(e) => write!(f, "Invalid JSON: {e}"),
            ValidationError::NotAnObject => write!(f, "Document must be a JSON object"),
            ValidationError::MissingField(field) => write!(f, "Missing required field {field}"),
            ValidationError::InvalidField { field, reason } => {
                write!(f, "Invalid field {field}: {reason}")
            },
            ValidationError::DuplicateNucleotide(id) => {
                write!(f, "Nucleotide id {id} appears more than once")
            },
            ValidationError::DanglingBasePair { from, to } => {
                write!(f, "Base pair {from}-{to} references a missing nucleotide")
            },
            ValidationError::SelfPair(id) => write!(f, "Nucleotide {id} is paired with itself"),
        }
    }
}

impl std::error::Error for ValidationError {}

/// Export a document with metadata stamped now
pub fn serialize(doc: &Document) -> Result<String, serde_json::Error> {
    serialize_at(doc, Utc::now())
}

pub fn serialize_at(doc: &Document, exported_at: DateTime<Utc>) -> Result<String, serde_json::Error> {
    let exported = ExportedDocument {
        document: doc.clone(),
        metadata: ExportMetadata {
            exported_at: exported_at.to_rfc3339_opts(SecondsFormat::Millis, true),
            version: FORMAT_VERSION.to_string(),
            source: EXPORT_SOURCE.to_string(),
        },
    };
    serde_json::to_string_pretty(&exported)
}

/// Parse and validate a candidate document
pub fn deserialize(text: &str) -> Result<Document, ValidationError> {
    let value: Value =
        serde_json::from_str(text).map_err(|e| ValidationError::Syntax(e.to_string()))?;
    validate_shape(&value)?;

    let doc: Document = serde_json::from_value(value).map_err(|e| ValidationError::InvalidField {
        field: "document".to_string(),
        reason: e.to_string(),
    })?;
    validate_ids(&doc)?;
    Ok(doc)
}

/// `<name, whitespace runs as _>_<YYYY-MM-DD>.json`
pub fn export_file_name(name: &str, date: NaiveDate) -> String {
    let mut stem = String::with_capacity(name.len());
    let mut in_space = false;
    for c in name.chars() {
        if c.is_whitespace() {
            if !in_space {
                stem.push('_');
            }
            in_space = true;
        } else {
            stem.push(c);
            in_space = false;
        }
    }
    format!("{stem}_{}.json", date.format("%Y-%m-%d"))
}

fn validate_shape(value: &Value) -> Result<(), ValidationError> {
    let root = value.as_object().ok_or(ValidationError::NotAnObject)?;

    require_text(root, "id", "id")?;
    require_text(root, "name", "name")?;

    let nucleotides = require_array(root, "nucleotides", "nucleotides")?;
    for (i, nucleotide) in nucleotides.iter().enumerate() {
        let path = format!("nucleotides[{i}]");
        let nucleotide = as_object(nucleotide, &path)?;
        require_id(nucleotide, "id", &path)?;
        require_number(nucleotide, "x", &path)?;
        require_number(nucleotide, "y", &path)?;
    }

    let pairs = require_array(root, "basePairs", "basePairs")?;
    for (i, pair) in pairs.iter().enumerate() {
        let path = format!("basePairs[{i}]");
        let pair = as_object(pair, &path)?;
        require_id(pair, "from", &path)?;
        require_id(pair, "to", &path)?;
    }

    optional_number(root, "canvasWidth", "canvasWidth")?;
    optional_number(root, "canvasHeight", "canvasHeight")?;

    if let Some(annotations) = optional_array(root, "annotations")? {
        for (i, annotation) in annotations.iter().enumerate() {
            let path = format!("annotations[{i}]");
            let annotation = as_object(annotation, &path)?;
            for key in ["x", "y", "fontSize"] {
                require_number(annotation, key, &path)?;
            }
        }
    }

    if let Some(features) = optional_array(root, "structuralFeatures")? {
        for (i, feature) in features.iter().enumerate() {
            let path = format!("structuralFeatures[{i}]");
            let feature = as_object(feature, &path)?;
            require_text(feature, "id", &format!("{path}.id"))?;
            require_text(feature, "featureType", &format!("{path}.featureType"))?;

            let members_path = format!("{path}.nucleotideIds");
            let members = require_array(feature, "nucleotideIds", &members_path)?;
            if members.is_empty() {
                return Err(invalid(&members_path, "must not be empty"));
            }

            let label_path = format!("{path}.label");
            let label = match feature.get("label") {
                None | Some(Value::Null) => return Err(ValidationError::MissingField(label_path)),
                Some(label) => as_object(label, &label_path)?,
            };
            match label.get("text") {
                Some(Value::String(_)) => {},
                None | Some(Value::Null) => {
                    return Err(ValidationError::MissingField(format!("{label_path}.text")));
                },
                Some(_) => return Err(invalid(&format!("{label_path}.text"), "expected a string")),
            }
            for key in ["x", "y", "fontSize"] {
                require_number(label, key, &label_path)?;
            }
        }
    }

    Ok(())
}

fn validate_ids(doc: &Document) -> Result<(), ValidationError> {
    let mut seen = HashSet::with_capacity(doc.nucleotides.len());
    for nucleotide in &doc.nucleotides {
        if !seen.insert(nucleotide.id) {
            return Err(ValidationError::DuplicateNucleotide(nucleotide.id));
        }
    }
    for pair in &doc.base_pairs {
        if pair.from == pair.to {
            return Err(ValidationError::SelfPair(pair.from));
        }
        if !seen.contains(&pair.from) || !seen.contains(&pair.to) {
            return Err(ValidationError::DanglingBasePair {
                from: pair.from,
                to: pair.to,
            });
        }
    }
    Ok(())
}

fn invalid(field: &str, reason: &str) -> ValidationError {
    ValidationError::InvalidField {
        field: field.to_string(),
        reason: reason.to_string(),
    }
}

fn as_object<'a>(value: &'a Value, path: &str) -> Result<&'a Map<String, Value>, ValidationError> {
    value.as_object().ok_or_else(|| invalid(path, "expected an object"))
}

fn require_text(object: &Map<String, Value>, key: &str, path: &str) -> Result<(), ValidationError> {
    match object.get(key) {
        Some(Value::String(s)) if !s.is_empty() => Ok(()),
        None | Some(Value::Null) => Err(ValidationError::MissingField(path.to_string())),
        Some(Value::String(_)) => Err(invalid(path, "must not be empty")),
        Some(_) => Err(invalid(path, "expected a string")),
    }
}

fn require_array<'a>(
    object: &'a Map<String, Value>,
    key: &str,
    path: &str,
) -> Result<&'a Vec<Value>, ValidationError> {
    match object.get(key) {
        Some(Value::Array(items)) => Ok(items),
        None | Some(Value::Null) => Err(ValidationError::MissingField(path.to_string())),
        Some(_) => Err(invalid(path, "expected an array")),
    }
}

fn optional_array<'a>(
    object: &'a Map<String, Value>,
    key: &str,
) -> Result<Option<&'a Vec<Value>>, ValidationError> {
    match object.get(key) {
        None | Some(Value::Null) => Ok(None),
        Some(Value::Array(items)) => Ok(Some(items)),
        Some(_) => Err(invalid(key, "expected an array")),
    }
}

/// Coordinates and sizes are stored as `f32`, so they must stay finite there
fn require_number(object: &Map<String, Value>, key: &str, path: &str) -> Result<(), ValidationError> {
    let field = format!("{path}.{key}");
    match object.get(key) {
        None | Some(Value::Null) => Err(ValidationError::MissingField(field)),
        Some(value) => check_number(value, &field),
    }
}

fn optional_number(object: &Map<String, Value>, key: &str, path: &str) -> Result<(), ValidationError> {
    match object.get(key) {
        None | Some(Value::Null) => Ok(()),
        Some(value) => check_number(value, path),
    }
}

fn check_number(value: &Value, field: &str) -> Result<(), ValidationError> {
    match value {
        Value::Number(n) => match n.as_f64() {
            Some(v) if (v as f32).is_finite() => Ok(()),
            _ => Err(invalid(field, "out of range")),
        },
        _ => Err(invalid(field, "expected a number")),
    }
}

/// Nucleotide ids are positive integers that fit in 32 bits
fn require_id(object: &Map<String, Value>, key: &str, path: &str) -> Result<(), ValidationError> {
    let field = format!("{path}.{key}");
    match object.get(key) {
        Some(Value::Number(n)) => match n.as_u64() {
            Some(id) if id > 0 && id <= u64::from(u32::MAX) => Ok(()),
            _ => Err(invalid(&field, "expected a positive integer id")),
        },
        None | Some(Value::Null) => Err(ValidationError::MissingField(field)),
        Some(_) => Err(invalid(&field, "expected a number")),
    }
}
