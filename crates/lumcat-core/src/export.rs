//! Legacy product export: the JSON document the migration engine consumes.
//!
//! Field values are kept as raw [`serde_json::Value`]s because the export is
//! inconsistent about encodings (strings, numbers, arrays, half-broken JSON
//! inside strings). Interpretation is left to `lumcat-normalize`.

use std::path::Path;

use serde::{Deserialize, Deserializer};
use serde_json::Value;
use sha2::{Digest, Sha256};

use crate::ExportError;

/// One top-level product in the legacy export.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ExportRecord {
    #[serde(default, alias = "codigo")]
    pub code: Value,
    #[serde(default, rename = "nombre", alias = "name")]
    pub name: Value,
    #[serde(default, rename = "categoria", alias = "category")]
    pub category: Value,
    #[serde(default, rename = "descripcion", alias = "description")]
    pub description: Value,
    #[serde(
        default,
        rename = "modelos",
        alias = "models",
        deserialize_with = "lenient_models"
    )]
    pub models: Vec<ModelEntry>,
}

/// `null` and non-list values read as no models; list items that are not
/// model objects are dropped. Either way the product itself survives.
fn lenient_models<'de, D>(deserializer: D) -> Result<Vec<ModelEntry>, D::Error>
where
    D: Deserializer<'de>,
{
    let items = match Value::deserialize(deserializer)? {
        Value::Null => return Ok(Vec::new()),
        Value::Array(items) => items,
        other => {
            tracing::warn!(value = %other, "modelos is not a list; record kept without models");
            return Ok(Vec::new());
        }
    };

    Ok(items
        .into_iter()
        .enumerate()
        .filter_map(
            |(position, item)| match serde_json::from_value::<ModelEntry>(item) {
                Ok(model) => Some(model),
                Err(e) => {
                    tracing::warn!(position, error = %e, "model entry skipped");
                    None
                }
            },
        )
        .collect())
}

impl ExportRecord {
    /// Product code, trimmed. `None` when absent or blank.
    #[must_use]
    pub fn code(&self) -> Option<String> {
        scalar_text(&self.code)
    }

    /// Display name, falling back to the product code.
    #[must_use]
    pub fn name(&self) -> Option<String> {
        scalar_text(&self.name).or_else(|| self.code())
    }

    #[must_use]
    pub fn category(&self) -> Option<String> {
        scalar_text(&self.category)
    }

    #[must_use]
    pub fn description(&self) -> Option<String> {
        scalar_text(&self.description)
    }
}

/// A "modelo": one sellable variant of a product plus its technical sheet.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ModelEntry {
    #[serde(default)]
    pub id: Value,
    #[serde(default, rename = "subnombre")]
    pub subname: Value,
    #[serde(default, rename = "nombre")]
    pub name: Value,
    #[serde(default, rename = "caracteristicasTecnicas", alias = "specs")]
    pub specs: Value,
    #[serde(default, rename = "incluyeLed")]
    pub includes_led: Value,
    #[serde(default, rename = "incluyeDriver")]
    pub includes_driver: Value,
    #[serde(default, rename = "cantidad")]
    pub quantity: Value,
    #[serde(default, rename = "portada", alias = "imagen")]
    pub cover: Value,
    #[serde(default, rename = "galeria")]
    pub gallery: Value,
}

impl ModelEntry {
    #[must_use]
    pub fn id(&self) -> Option<String> {
        scalar_text(&self.id)
    }

    /// `subnombre` wins over `nombre`; either may be absent.
    #[must_use]
    pub fn name(&self) -> Option<String> {
        scalar_text(&self.subname).or_else(|| scalar_text(&self.name))
    }

    /// Looks up a technical-spec field. Missing keys and non-object spec
    /// maps both read as `null`.
    #[must_use]
    pub fn spec(&self, key: &str) -> &Value {
        self.specs.get(key).unwrap_or(&Value::Null)
    }

    /// Iterates spec fields in key order.
    pub fn spec_entries(&self) -> impl Iterator<Item = (&String, &Value)> {
        self.specs.as_object().into_iter().flat_map(|m| m.iter())
    }
}

/// Renders a scalar JSON value as trimmed text. Arrays, objects, `null`, and
/// blank strings yield `None`.
#[must_use]
pub fn scalar_text(value: &Value) -> Option<String> {
    let text = match value {
        Value::String(s) => s.trim().to_string(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Null | Value::Array(_) | Value::Object(_) => return None,
    };
    if text.is_empty() {
        None
    } else {
        Some(text)
    }
}

/// A root record that could not be used, with its position in the export.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkippedRecord {
    pub index: usize,
    pub reason: String,
}

#[derive(Debug, Clone, Default)]
pub struct LoadedExport {
    pub records: Vec<ExportRecord>,
    pub skipped: Vec<SkippedRecord>,
    /// Hex SHA-256 of the raw export bytes.
    pub source_sha256: String,
}

/// Read and parse an export file.
///
/// # Errors
///
/// Returns [`ExportError::Io`] if the file cannot be read, and
/// [`ExportError::Parse`] / [`ExportError::Shape`] if the document as a whole
/// is unusable. Individual bad records are reported in
/// [`LoadedExport::skipped`] instead.
pub fn load_export(path: &Path) -> Result<LoadedExport, ExportError> {
    let bytes = std::fs::read(path).map_err(|e| ExportError::Io {
        path: path.display().to_string(),
        source: e,
    })?;
    let mut loaded = parse_export(&bytes)?;
    loaded.source_sha256 = hex_digest(&bytes);
    Ok(loaded)
}

/// Parse an export document held in memory.
///
/// Accepts a bare array of records or an object carrying the array under
/// `productos` / `products`.
///
/// # Errors
///
/// Returns [`ExportError::Parse`] for invalid JSON and [`ExportError::Shape`]
/// when no record array can be found.
pub fn parse_export(bytes: &[u8]) -> Result<LoadedExport, ExportError> {
    let document: Value = serde_json::from_slice(bytes).map_err(ExportError::Parse)?;

    let items = match document {
        Value::Array(items) => items,
        Value::Object(mut map) => match map
            .remove("productos")
            .or_else(|| map.remove("products"))
        {
            Some(Value::Array(items)) => items,
            Some(_) => {
                return Err(ExportError::Shape(
                    "record list under 'productos'/'products' is not an array".to_string(),
                ))
            }
            None => {
                return Err(ExportError::Shape(
                    "object document has no 'productos' or 'products' key".to_string(),
                ))
            }
        },
        _ => {
            return Err(ExportError::Shape(
                "expected an array of records or an object wrapping one".to_string(),
            ))
        }
    };

    let mut loaded = LoadedExport::default();
    for (index, item) in items.into_iter().enumerate() {
        if !item.is_object() {
            loaded.skipped.push(SkippedRecord {
                index,
                reason: "record is not a JSON object".to_string(),
            });
            continue;
        }
        match serde_json::from_value::<ExportRecord>(item) {
            Ok(record) if record.code().is_some() => loaded.records.push(record),
            Ok(_) => loaded.skipped.push(SkippedRecord {
                index,
                reason: "missing product code".to_string(),
            }),
            Err(e) => loaded.skipped.push(SkippedRecord {
                index,
                reason: e.to_string(),
            }),
        }
    }

    Ok(loaded)
}

fn hex_digest(bytes: &[u8]) -> String {
    use std::fmt::Write;

    Sha256::digest(bytes)
        .iter()
        .fold(String::with_capacity(64), |mut out, b| {
            let _ = write!(out, "{b:02x}");
            out
        })
}
