//! SQL rendering.
//!
//! Every value reaches the script through [`SqlValue::render`], and every
//! string inside it through [`quote_literal`]. Statements are bucketed by
//! [`Stage`], and [`Script`] always renders the buckets in stage order no
//! matter when they were filled, so dependents never precede what they
//! reference.

use std::collections::BTreeMap;
use std::fmt::{self, Write};

use chrono::{DateTime, SecondsFormat, Utc};
use lumcat_normalize::Domain;
use serde_json::Value;

use crate::types::{
    CatalogValue, ConfigurationRow, MediaRow, ProductRow, RelationKind, RelationRow, VariantRow,
};

/// Renders `s` as a single-quoted SQL string literal.
///
/// Single quotes are doubled. NUL characters, which Postgres rejects in text,
/// are dropped.
#[must_use]
pub fn quote_literal(s: &str) -> String {
    let mut out = String::with_capacity(s.len() + 2);
    out.push('\'');
    for c in s.chars() {
        match c {
            '\'' => out.push_str("''"),
            '\0' => {}
            other => out.push(other),
        }
    }
    out.push('\'');
    out
}

/// A value destined for a statement's `VALUES` list.
#[derive(Debug, Clone, PartialEq)]
pub enum SqlValue {
    Null,
    Bool(bool),
    Int(i64),
    Number(f64),
    Text(String),
    Json(Value),
}

impl SqlValue {
    #[must_use]
    pub fn text(s: impl Into<String>) -> Self {
        SqlValue::Text(s.into())
    }

    #[must_use]
    pub fn opt_text(s: Option<&str>) -> Self {
        s.map_or(SqlValue::Null, SqlValue::text)
    }

    #[must_use]
    pub fn opt_number(n: Option<f64>) -> Self {
        n.map_or(SqlValue::Null, SqlValue::Number)
    }

    /// SQL literal text for this value. Non-finite numbers render as `NULL`.
    #[must_use]
    pub fn render(&self) -> String {
        match self {
            SqlValue::Null => "NULL".to_string(),
            SqlValue::Bool(true) => "TRUE".to_string(),
            SqlValue::Bool(false) => "FALSE".to_string(),
            SqlValue::Int(n) => n.to_string(),
            SqlValue::Number(n) if n.is_finite() => n.to_string(),
            SqlValue::Number(_) => "NULL".to_string(),
            SqlValue::Text(s) => quote_literal(s),
            SqlValue::Json(v) => format!("{}::jsonb", quote_literal(&v.to_string())),
        }
    }
}

/// Script sections, in the only order they may appear.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Stage {
    Catalogs,
    Products,
    Variants,
    Configurations,
    Relations,
    Media,
}

impl Stage {
    pub const ALL: [Stage; 6] = [
        Stage::Catalogs,
        Stage::Products,
        Stage::Variants,
        Stage::Configurations,
        Stage::Relations,
        Stage::Media,
    ];

    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Stage::Catalogs => "catalog values",
            Stage::Products => "products",
            Stage::Variants => "variants",
            Stage::Configurations => "configurations",
            Stage::Relations => "relations",
            Stage::Media => "media",
        }
    }
}

/// Row counts for one generated script.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ScriptStats {
    pub categories: usize,
    pub finishes: usize,
    pub light_tones: usize,
    pub products: usize,
    pub variants: usize,
    pub configurations: usize,
    pub dropped_configurations: usize,
    pub product_finishes: usize,
    pub variant_light_tones: usize,
    pub duplicate_relations: usize,
    pub media: usize,
    pub skipped_records: usize,
}

impl ScriptStats {
    fn rows(&self) -> [(&'static str, usize); 12] {
        [
            ("categories", self.categories),
            ("finishes", self.finishes),
            ("light_tones", self.light_tones),
            ("products", self.products),
            ("product_variants", self.variants),
            ("variant_configurations", self.configurations),
            ("product_finishes", self.product_finishes),
            ("variant_light_tones", self.variant_light_tones),
            ("variant_media", self.media),
            ("dropped configurations", self.dropped_configurations),
            ("duplicate relations", self.duplicate_relations),
            ("skipped records", self.skipped_records),
        ]
    }
}

impl fmt::Display for ScriptStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (name, count) in self.rows() {
            writeln!(f, "{name}: {count}")?;
        }
        Ok(())
    }
}

/// Informational comment block at the top of a rendered script.
#[derive(Debug, Clone)]
pub struct ScriptHeader {
    pub generator: String,
    pub generated_at: DateTime<Utc>,
    pub input: String,
    pub input_sha256: String,
}

impl ScriptHeader {
    #[must_use]
    pub fn new(input: impl Into<String>, input_sha256: impl Into<String>) -> Self {
        Self {
            generator: format!("lumcat {}", env!("CARGO_PKG_VERSION")),
            generated_at: Utc::now(),
            input: input.into(),
            input_sha256: input_sha256.into(),
        }
    }
}

/// An ordered, transaction-wrapped migration script.
#[derive(Debug, Clone, Default)]
pub struct Script {
    stages: BTreeMap<Stage, Vec<String>>,
    pub stats: ScriptStats,
}

impl Script {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, stage: Stage, statement: String) {
        self.stages.entry(stage).or_default().push(statement);
    }

    /// Statements of one stage, in push order.
    #[must_use]
    pub fn stage(&self, stage: Stage) -> &[String] {
        self.stages
            .get(&stage)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    /// All statements in stage order.
    pub fn statements(&self) -> impl Iterator<Item = &str> {
        self.stages.values().flatten().map(String::as_str)
    }

    #[must_use]
    pub fn statement_count(&self) -> usize {
        self.stages.values().map(Vec::len).sum()
    }

    /// `BEGIN;`, every stage with a comment line, `COMMIT;`. Deterministic for
    /// a given input.
    #[must_use]
    pub fn body(&self) -> String {
        let mut out = String::from("BEGIN;\n");
        for (stage, statements) in &self.stages {
            if statements.is_empty() {
                continue;
            }
            out.push_str("\n-- ");
            out.push_str(stage.label());
            out.push('\n');
            for statement in statements {
                out.push_str(statement);
                out.push('\n');
            }
        }
        out.push_str("\nCOMMIT;\n");
        out
    }

    /// Header comments followed by [`Script::body`].
    #[must_use]
    pub fn render(&self, header: &ScriptHeader) -> String {
        let mut out = String::new();
        let _ = writeln!(out, "-- Generated by {}", header.generator);
        let _ = writeln!(
            out,
            "-- Generated at {}",
            header
                .generated_at
                .to_rfc3339_opts(SecondsFormat::Secs, true)
        );
        let _ = writeln!(out, "-- Input: {}", header.input);
        let _ = writeln!(out, "-- Input SHA-256: {}", header.input_sha256);
        for (name, count) in self.stats.rows() {
            let _ = writeln!(out, "-- {name}: {count}");
        }
        out.push('\n');
        out.push_str(&self.body());
        out
    }
}

// ---------------------------------------------------------------------------
// Statement builders
// ---------------------------------------------------------------------------

#[must_use]
pub fn catalog_table(domain: Domain) -> &'static str {
    match domain {
        Domain::Category => "categories",
        Domain::Finish => "finishes",
        Domain::LightTone => "light_tones",
    }
}

fn lookup_id(table: &str, column: &str, key: &str) -> String {
    format!(
        "(SELECT id FROM {table} WHERE {column} = {})",
        quote_literal(key)
    )
}

fn insert(table: &str, columns: &[&str], values: &[String], on_conflict: &str) -> String {
    format!(
        "INSERT INTO {table} ({}) VALUES ({}) ON CONFLICT {on_conflict};",
        columns.join(", "),
        values.join(", ")
    )
}

fn update_excluded(target: &str, columns: &[&str]) -> String {
    let assignments = columns
        .iter()
        .filter(|c| *c != &target)
        .map(|c| format!("{c} = EXCLUDED.{c}"))
        .collect::<Vec<_>>()
        .join(", ");
    format!("({target}) DO UPDATE SET {assignments}")
}

/// Catalog rows never change once created, so conflicts are a no-op.
#[must_use]
pub fn catalog_upsert(domain: Domain, value: &CatalogValue) -> String {
    insert(
        catalog_table(domain),
        &["slug", "name"],
        &[
            SqlValue::text(&value.slug).render(),
            SqlValue::text(&value.display_name).render(),
        ],
        "(slug) DO NOTHING",
    )
}

#[must_use]
pub fn product_upsert(product: &ProductRow) -> String {
    const COLUMNS: &[&str] = &["code", "name", "description", "category_id"];
    let category = product.category_slug.as_deref().map_or_else(
        || SqlValue::Null.render(),
        |slug| lookup_id("categories", "slug", slug),
    );
    insert(
        "products",
        COLUMNS,
        &[
            SqlValue::text(&product.code).render(),
            SqlValue::text(&product.name).render(),
            SqlValue::opt_text(product.description.as_deref()).render(),
            category,
        ],
        &update_excluded("code", COLUMNS),
    )
}

#[must_use]
pub fn variant_upsert(variant: &VariantRow) -> String {
    const COLUMNS: &[&str] = &[
        "variant_code",
        "product_id",
        "name",
        "includes_led",
        "includes_driver",
        "quantity",
    ];
    insert(
        "product_variants",
        COLUMNS,
        &[
            SqlValue::text(&variant.variant_code).render(),
            lookup_id("products", "code", &variant.product_code),
            SqlValue::text(&variant.name).render(),
            SqlValue::Bool(variant.includes_led).render(),
            SqlValue::Bool(variant.includes_driver).render(),
            SqlValue::Int(i64::from(variant.quantity)).render(),
        ],
        &update_excluded("variant_code", COLUMNS),
    )
}

#[must_use]
pub fn configuration_upsert(cfg: &ConfigurationRow) -> String {
    const COLUMNS: &[&str] = &[
        "sku",
        "variant_id",
        "watt",
        "lumens",
        "voltage",
        "voltage_min",
        "voltage_max",
        "voltage_label",
        "length",
        "width",
        "diameter_label",
        "extra_specs",
    ];
    insert(
        "variant_configurations",
        COLUMNS,
        &[
            SqlValue::text(&cfg.sku).render(),
            lookup_id("product_variants", "variant_code", &cfg.variant_code),
            SqlValue::Number(cfg.watt).render(),
            SqlValue::Number(cfg.lumens).render(),
            SqlValue::Number(cfg.voltage).render(),
            SqlValue::opt_number(cfg.voltage_min).render(),
            SqlValue::opt_number(cfg.voltage_max).render(),
            SqlValue::opt_text(cfg.voltage_label.as_deref()).render(),
            SqlValue::opt_number(cfg.length).render(),
            SqlValue::opt_number(cfg.width).render(),
            SqlValue::opt_text(cfg.diameter_label.as_deref()).render(),
            SqlValue::Json(Value::Object(cfg.extra_specs.clone())).render(),
        ],
        &update_excluded("sku", COLUMNS),
    )
}

/// Junction insert resolving both sides by natural key.
#[must_use]
pub fn relation_insert(relation: &RelationRow) -> String {
    let (parent_table, parent_key, catalog_table, left, right) = match relation.kind {
        RelationKind::ProductFinish => ("products", "code", "finishes", "product_id", "finish_id"),
        RelationKind::VariantLightTone => (
            "product_variants",
            "variant_code",
            "light_tones",
            "variant_id",
            "light_tone_id",
        ),
    };
    format!(
        "INSERT INTO {} ({left}, {right}) SELECT p.id, c.id FROM {parent_table} p, {catalog_table} c \
         WHERE p.{parent_key} = {} AND c.slug = {} ON CONFLICT DO NOTHING;",
        relation.kind.table(),
        quote_literal(&relation.parent_key),
        quote_literal(&relation.slug),
    )
}

#[must_use]
pub fn media_insert(media: &MediaRow) -> String {
    const COLUMNS: &[&str] = &["variant_id", "path", "kind", "alt_text", "position"];
    insert(
        "variant_media",
        COLUMNS,
        &[
            lookup_id("product_variants", "variant_code", &media.variant_code),
            SqlValue::text(&media.path).render(),
            SqlValue::text(media.kind.as_str()).render(),
            SqlValue::text(&media.alt_text).render(),
            SqlValue::Int(i64::from(media.position)).render(),
        ],
        "(variant_id, path) DO NOTHING",
    )
}

#[cfg(test)]
#[path = "sql_test.rs"]
mod tests;
