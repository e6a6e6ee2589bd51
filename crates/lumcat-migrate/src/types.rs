//! Rows produced by the two migration stages, one type per target table.
//!
//! Every cross-row reference is a natural key (slug, product code, variant
//! code). Numeric ids only exist in the target database.

use serde_json::{Map, Value};

/// A deduplicated lookup value (category, finish, or light tone).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CatalogValue {
    pub slug: String,
    pub display_name: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ProductRow {
    pub code: String,
    pub name: String,
    pub description: Option<String>,
    pub category_slug: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct VariantRow {
    pub variant_code: String,
    pub product_code: String,
    pub name: String,
    pub includes_led: bool,
    pub includes_driver: bool,
    pub quantity: u32,
}

/// One concrete technical-spec combination of a variant.
///
/// Only built when both `watt` and `lumens` are positive.
#[derive(Debug, Clone, PartialEq)]
pub struct ConfigurationRow {
    pub variant_code: String,
    pub sku: String,
    pub watt: f64,
    pub lumens: f64,
    pub voltage: f64,
    pub voltage_min: Option<f64>,
    pub voltage_max: Option<f64>,
    pub voltage_label: Option<String>,
    pub length: Option<f64>,
    pub width: Option<f64>,
    pub diameter_label: Option<String>,
    pub extra_specs: Map<String, Value>,
}

/// Which junction table a relation lands in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum RelationKind {
    ProductFinish,
    VariantLightTone,
}

impl RelationKind {
    #[must_use]
    pub fn table(self) -> &'static str {
        match self {
            RelationKind::ProductFinish => "product_finishes",
            RelationKind::VariantLightTone => "variant_light_tones",
        }
    }
}

impl std::fmt::Display for RelationKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.table())
    }
}

/// A many-to-many association between a parent entity and a catalog value.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RelationRow {
    pub kind: RelationKind,
    /// Product code or variant code, depending on `kind`.
    pub parent_key: String,
    pub slug: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MediaKind {
    Cover,
    Gallery,
}

impl MediaKind {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            MediaKind::Cover => "cover",
            MediaKind::Gallery => "gallery",
        }
    }
}

impl std::fmt::Display for MediaKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An image path already present in the export, attached to a variant.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MediaRow {
    pub product_code: String,
    pub variant_code: String,
    pub path: String,
    pub kind: MediaKind,
    pub alt_text: String,
    pub position: u32,
}
