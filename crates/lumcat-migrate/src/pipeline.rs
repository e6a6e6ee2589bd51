//! The two migration stages.
//!
//! [`collect_catalogs`] walks every record once and returns frozen catalogs.
//! [`emit`] walks the same records again and renders the script. The frozen
//! [`CatalogSet`] is the only thing the stages share, so every catalog value
//! the second stage references is known before anything is emitted.

use std::collections::HashSet;

use lumcat_core::{AppConfig, ExportRecord, ModelEntry};
use lumcat_normalize::{normalize_label_list, normalize_path_list, parse_flag, parse_quantity};
use lumcat_normalize::{Domain, Synonyms};

use crate::catalog::{CatalogAccumulator, CatalogSet};
use crate::expand::{expand, spec_field, ExpandOptions, SpecLists, FINISH_KEYS, TONE_KEYS};
use crate::relations::RelationLinker;
use crate::sql::{
    catalog_upsert, configuration_upsert, media_insert, product_upsert, relation_insert,
    variant_upsert, Script, Stage,
};
use crate::types::{MediaKind, MediaRow, ProductRow, RelationKind, VariantRow};
use crate::MigrateError;

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct MigrateOptions {
    pub expand: ExpandOptions,
    /// Abort emission when any catalog slug conflict was recorded.
    pub strict_slugs: bool,
}

impl MigrateOptions {
    #[must_use]
    pub fn from_app_config(config: &AppConfig) -> Self {
        Self {
            expand: ExpandOptions {
                default_voltage: config.default_voltage,
                lumens_per_watt: config.lumens_per_watt,
            },
            strict_slugs: config.strict_slugs,
        }
    }
}

fn category_label(record: &ExportRecord) -> Option<String> {
    normalize_label_list(&record.category).into_iter().next()
}

fn tone_labels(model: &ModelEntry) -> Vec<String> {
    normalize_label_list(spec_field(model, TONE_KEYS))
}

fn finish_labels(model: &ModelEntry) -> Vec<String> {
    normalize_label_list(spec_field(model, FINISH_KEYS))
}

/// Stage one: gathers every category, finish, and light tone the records
/// mention, canonicalized through `synonyms`.
#[must_use]
pub fn collect_catalogs(records: &[ExportRecord], synonyms: &Synonyms) -> CatalogSet {
    let mut categories = CatalogAccumulator::new(Domain::Category);
    let mut finishes = CatalogAccumulator::new(Domain::Finish);
    let mut light_tones = CatalogAccumulator::new(Domain::LightTone);

    for record in records.iter().filter(|r| r.code().is_some()) {
        if let Some(label) = category_label(record) {
            categories.register(synonyms, &label);
        }
        for model in &record.models {
            for label in tone_labels(model) {
                light_tones.register(synonyms, &label);
            }
            for label in finish_labels(model) {
                finishes.register(synonyms, &label);
            }
        }
    }

    tracing::info!(
        categories = categories.len(),
        finishes = finishes.len(),
        light_tones = light_tones.len(),
        "catalogs collected"
    );

    CatalogSet {
        synonyms: synonyms.clone(),
        categories: categories.freeze(),
        finishes: finishes.freeze(),
        light_tones: light_tones.freeze(),
    }
}

/// Stage two: renders the migration script for `records` against the frozen
/// `catalogs`.
///
/// # Errors
///
/// Returns [`MigrateError::SlugConflict`] when `options.strict_slugs` is set
/// and a conflict was recorded, and [`MigrateError::UnregisteredCatalogValue`]
/// when `records` mention a catalog value `catalogs` does not hold.
pub fn emit(
    records: &[ExportRecord],
    catalogs: &CatalogSet,
    options: &MigrateOptions,
) -> Result<Script, MigrateError> {
    if options.strict_slugs {
        if let Some(conflict) = catalogs.conflicts().next() {
            return Err(MigrateError::SlugConflict {
                domain: conflict.domain,
                slug: conflict.slug.clone(),
                kept: conflict.kept.clone(),
                rejected: conflict.rejected.clone(),
            });
        }
    }

    let mut script = Script::new();
    for domain in Domain::ALL {
        for value in catalogs.get(domain).all() {
            script.push(Stage::Catalogs, catalog_upsert(domain, value));
        }
    }
    script.stats.categories = catalogs.categories.len();
    script.stats.finishes = catalogs.finishes.len();
    script.stats.light_tones = catalogs.light_tones.len();

    let mut linker = RelationLinker::new();
    let mut variant_codes = VariantCodes::reserve(records);
    let mut seen_products = HashSet::new();

    for (index, record) in records.iter().enumerate() {
        let Some(code) = record.code() else {
            tracing::warn!(index, "record without product code skipped");
            script.stats.skipped_records += 1;
            continue;
        };
        if !seen_products.insert(code.clone()) {
            tracing::warn!(product = %code, "duplicate product code; later record overwrites");
        }

        let category_slug = match category_label(record) {
            Some(label) => catalogs
                .resolve(Domain::Category, &label)?
                .map(|value| value.slug.clone()),
            None => None,
        };
        let product = ProductRow {
            name: record.name().unwrap_or_else(|| code.clone()),
            description: record.description(),
            category_slug,
            code,
        };
        script.push(Stage::Products, product_upsert(&product));
        script.stats.products += 1;

        for (position, model) in record.models.iter().enumerate() {
            let variant_code = variant_codes.assign(&product.code, position, model);
            let mut target = EmitTarget {
                script: &mut script,
                linker: &mut linker,
            };
            target.variant(catalogs, options, &product, variant_code, model)?;
        }
    }

    script.stats.duplicate_relations = linker.duplicates();
    for relation in linker.into_relations() {
        match relation.kind {
            RelationKind::ProductFinish => script.stats.product_finishes += 1,
            RelationKind::VariantLightTone => script.stats.variant_light_tones += 1,
        }
        script.push(Stage::Relations, relation_insert(&relation));
    }

    tracing::info!(
        products = script.stats.products,
        variants = script.stats.variants,
        configurations = script.stats.configurations,
        dropped_configurations = script.stats.dropped_configurations,
        relations = script.stats.product_finishes + script.stats.variant_light_tones,
        media = script.stats.media,
        "script emitted"
    );

    Ok(script)
}

/// Variant codes handed out during one emission.
///
/// Explicit model ids are reserved up front so a positional fallback code
/// never takes a code a later model names explicitly.
struct VariantCodes {
    explicit: HashSet<String>,
    assigned: HashSet<String>,
}

impl VariantCodes {
    fn reserve(records: &[ExportRecord]) -> Self {
        let explicit = records
            .iter()
            .filter(|r| r.code().is_some())
            .flat_map(|r| r.models.iter().filter_map(ModelEntry::id))
            .collect();
        Self {
            explicit,
            assigned: HashSet::new(),
        }
    }

    /// The model's own id, or `{product_code}-{n}` (suffixed until free) when
    /// it has none.
    fn assign(&mut self, product_code: &str, position: usize, model: &ModelEntry) -> String {
        if let Some(id) = model.id() {
            if !self.assigned.insert(id.clone()) {
                tracing::warn!(
                    product = %product_code,
                    variant = %id,
                    "duplicate variant code; later model overwrites"
                );
            }
            return id;
        }

        let base = format!("{product_code}-{}", position + 1);
        let mut code = base.clone();
        let mut suffix = 2;
        while self.explicit.contains(&code) || self.assigned.contains(&code) {
            code = format!("{base}-{suffix}");
            suffix += 1;
        }
        if code != base {
            tracing::debug!(
                product = %product_code,
                variant = %code,
                "positional variant code taken; suffixed"
            );
        }
        self.assigned.insert(code.clone());
        code
    }
}

/// Where one variant's rows go.
struct EmitTarget<'a> {
    script: &'a mut Script,
    linker: &'a mut RelationLinker,
}

impl EmitTarget<'_> {
    fn variant(
        &mut self,
        catalogs: &CatalogSet,
        options: &MigrateOptions,
        product: &ProductRow,
        variant_code: String,
        model: &ModelEntry,
    ) -> Result<(), MigrateError> {
        let variant = VariantRow {
            name: model.name().unwrap_or_else(|| variant_code.clone()),
            product_code: product.code.clone(),
            includes_led: parse_flag(&model.includes_led).unwrap_or(false),
            includes_driver: parse_flag(&model.includes_driver).unwrap_or(false),
            quantity: parse_quantity(&model.quantity),
            variant_code,
        };
        self.script.push(Stage::Variants, variant_upsert(&variant));
        self.script.stats.variants += 1;

        let expansion = expand(
            &variant.variant_code,
            &SpecLists::from_model(model),
            &options.expand,
        );
        self.script.stats.dropped_configurations += expansion.dropped;
        for cfg in &expansion.configurations {
            self.script.push(Stage::Configurations, configuration_upsert(cfg));
            self.script.stats.configurations += 1;
        }

        for label in tone_labels(model) {
            if let Some(value) = catalogs.resolve(Domain::LightTone, &label)? {
                self.linker.link(
                    RelationKind::VariantLightTone,
                    &variant.variant_code,
                    &value.slug,
                );
            }
        }
        for label in finish_labels(model) {
            if let Some(value) = catalogs.resolve(Domain::Finish, &label)? {
                self.linker
                    .link(RelationKind::ProductFinish, &product.code, &value.slug);
            }
        }

        for media in variant_media(product, &variant, model) {
            self.script.push(Stage::Media, media_insert(&media));
            self.script.stats.media += 1;
        }

        Ok(())
    }
}

/// Cover first, then gallery in source order, each path once per variant.
fn variant_media(product: &ProductRow, variant: &VariantRow, model: &ModelEntry) -> Vec<MediaRow> {
    let covers = normalize_path_list(&model.cover);
    let has_cover = !covers.is_empty();
    let alt_text = format!("{} {}", product.name, variant.name);

    let mut seen = HashSet::new();
    let mut rows: Vec<MediaRow> = Vec::new();
    for path in covers.into_iter().chain(normalize_path_list(&model.gallery)) {
        if !seen.insert(path.clone()) {
            continue;
        }
        let kind = if has_cover && rows.is_empty() {
            MediaKind::Cover
        } else {
            MediaKind::Gallery
        };
        rows.push(MediaRow {
            product_code: product.code.clone(),
            variant_code: variant.variant_code.clone(),
            path,
            kind,
            alt_text: alt_text.clone(),
            position: u32::try_from(rows.len()).unwrap_or(u32::MAX),
        });
    }
    rows
}

/// Runs both stages.
///
/// # Errors
///
/// See [`emit`].
pub fn migrate(
    records: &[ExportRecord],
    synonyms: &Synonyms,
    options: &MigrateOptions,
) -> Result<Script, MigrateError> {
    let catalogs = collect_catalogs(records, synonyms);
    emit(records, &catalogs, options)
}

#[cfg(test)]
#[path = "pipeline_test.rs"]
mod tests;
