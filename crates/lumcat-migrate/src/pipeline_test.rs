use serde_json::{json, Value};

use super::*;

fn records(value: Value) -> Vec<ExportRecord> {
    serde_json::from_value(value).expect("valid records")
}

fn run(value: Value) -> Script {
    migrate(&records(value), &Synonyms::builtin(), &MigrateOptions::default())
        .expect("migration succeeds")
}

#[test]
fn catalogs_are_collected_across_all_records() {
    let records = records(json!([
        {"code": "A", "categoria": "Colgantes", "modelos": [
            {"id": "A-1", "caracteristicasTecnicas": {"tono": "fria", "acabado": "Negro"}}
        ]},
        {"code": "B", "categoria": "colgantes", "modelos": [
            {"id": "B-1", "caracteristicasTecnicas": {"tono": ["FRÍA", "neutro"], "acabado": "Blanco/negro"}}
        ]}
    ]));
    let catalogs = collect_catalogs(&records, &Synonyms::builtin());

    assert_eq!(catalogs.categories.len(), 1);
    let tones: Vec<&str> = catalogs
        .light_tones
        .all()
        .map(|v| v.display_name.as_str())
        .collect();
    assert_eq!(tones, vec!["Fría", "Neutra"]);
    let finishes: Vec<&str> = catalogs.finishes.all().map(|v| v.slug.as_str()).collect();
    assert_eq!(finishes, vec!["negro", "blanco"]);
}

#[test]
fn records_without_code_are_skipped_in_both_stages() {
    let script = run(json!([
        {"nombre": "Sin codigo", "categoria": "Fantasma"},
        {"code": "A", "categoria": "Apliques"}
    ]));

    assert_eq!(script.stats.skipped_records, 1);
    assert_eq!(script.stats.products, 1);
    assert_eq!(script.stats.categories, 1);
    assert!(!script.body().contains("fantasma"));
}

#[test]
fn variant_without_id_gets_positional_code() {
    let script = run(json!([
        {"code": "LUX", "modelos": [{"subnombre": "Uno"}, {"subnombre": "Dos"}]}
    ]));

    let variants = script.stage(Stage::Variants);
    assert_eq!(variants.len(), 2);
    assert!(variants[0].contains("'LUX-1'"));
    assert!(variants[1].contains("'LUX-2', (SELECT id FROM products WHERE code = 'LUX'), 'Dos'"));
}

#[test]
fn variant_flags_and_quantity_are_parsed() {
    let script = run(json!([
        {"code": "A", "modelos": [
            {"id": "A-1", "incluyeLed": "Sí", "incluyeDriver": "no", "cantidad": "0"}
        ]}
    ]));

    assert!(script.stage(Stage::Variants)[0].contains("TRUE, FALSE, 1)"));
}

#[test]
fn product_name_falls_back_to_code() {
    let script = run(json!([{"code": "ZX9"}]));
    assert!(script.stage(Stage::Products)[0].contains("VALUES ('ZX9', 'ZX9', NULL, NULL)"));
}

#[test]
fn finish_shared_by_two_variants_links_product_once() {
    let script = run(json!([
        {"code": "A", "modelos": [
            {"id": "A-1", "caracteristicasTecnicas": {"acabado": "Blanco", "tono": "fria"}},
            {"id": "A-2", "caracteristicasTecnicas": {"acabado": "blanco", "tono": "fria"}}
        ]}
    ]));

    assert_eq!(script.stats.product_finishes, 1);
    assert_eq!(script.stats.variant_light_tones, 2);
    assert_eq!(script.stats.duplicate_relations, 1);
    assert_eq!(script.stage(Stage::Relations).len(), 3);
}

#[test]
fn media_is_deduplicated_with_cover_first() {
    let script = run(json!([
        {"code": "A", "nombre": "Aro", "modelos": [{
            "id": "A-1",
            "subnombre": "Mini",
            "portada": "productos/a/600x400.webp",
            "galeria": ["productos/a/2.webp", "productos/a/600x400.webp", "productos/a/3.webp"]
        }]}
    ]));

    let media = script.stage(Stage::Media);
    assert_eq!(media.len(), 3);
    assert!(media[0].contains("'productos/a/600x400.webp', 'cover', 'Aro Mini', 0)"));
    assert!(media[1].contains("'productos/a/2.webp', 'gallery', 'Aro Mini', 1)"));
    assert!(media[2].contains("'productos/a/3.webp', 'gallery', 'Aro Mini', 2)"));
}

#[test]
fn gallery_without_cover_starts_at_position_zero() {
    let script = run(json!([
        {"code": "A", "modelos": [{"id": "A-1", "galeria": "a.webp, b.webp"}]}
    ]));

    let media = script.stage(Stage::Media);
    assert_eq!(media.len(), 2);
    assert!(media[0].contains("'a.webp', 'gallery', 'A A-1', 0)"));
}

#[test]
fn strict_slugs_turns_conflicts_into_errors() {
    let records = records(json!([
        {"code": "A", "modelos": [{"id": "A-1", "caracteristicasTecnicas": {
            "acabado": ["Aluminio Anodizado", "aluminio-anodizado"]
        }}]}
    ]));
    let catalogs = collect_catalogs(&records, &Synonyms::builtin());
    assert_eq!(catalogs.conflicts().count(), 1);

    let lenient = emit(&records, &catalogs, &MigrateOptions::default()).unwrap();
    assert_eq!(lenient.stats.finishes, 1);
    assert_eq!(lenient.stats.product_finishes, 1);

    let strict = MigrateOptions {
        strict_slugs: true,
        ..MigrateOptions::default()
    };
    let err = emit(&records, &catalogs, &strict).unwrap_err();
    assert!(matches!(
        err,
        MigrateError::SlugConflict { ref slug, .. } if slug == "aluminio-anodizado"
    ));
}

#[test]
fn emitting_records_that_were_not_collected_is_an_error() {
    let collected = records(json!([{"code": "A", "categoria": "Apliques"}]));
    let catalogs = collect_catalogs(&collected, &Synonyms::builtin());

    let other = records(json!([{"code": "B", "categoria": "Plafones"}]));
    let err = emit(&other, &catalogs, &MigrateOptions::default()).unwrap_err();
    assert!(matches!(
        err,
        MigrateError::UnregisteredCatalogValue { domain: Domain::Category, ref slug, .. }
            if slug == "plafones"
    ));
}

#[test]
fn options_follow_app_config() {
    let config = AppConfig {
        env: lumcat_core::Environment::Test,
        log_level: "info".to_string(),
        database_url: None,
        aliases_path: None,
        default_voltage: 12.0,
        lumens_per_watt: 90.0,
        strict_slugs: true,
        db_max_connections: 5,
        db_min_connections: 1,
        db_acquire_timeout_secs: 10,
    };
    let options = MigrateOptions::from_app_config(&config);
    assert!(options.strict_slugs);
    assert!((options.expand.default_voltage - 12.0).abs() < f64::EPSILON);
    assert!((options.expand.lumens_per_watt - 90.0).abs() < f64::EPSILON);
}

#[test]
fn two_runs_produce_identical_bodies() {
    let input = json!([
        {"code": "A", "categoria": "Colgantes", "modelos": [
            {"id": "A-1", "caracteristicasTecnicas": {"watt": "10/20", "tono": "calida"}}
        ]}
    ]);
    assert_eq!(run(input.clone()).body(), run(input).body());
}

#[test]
fn positional_variant_code_never_takes_an_explicit_id() {
    let script = run(json!([
        {"code": "B", "modelos": [
            {"caracteristicasTecnicas": {"watt": [0, 15, -3], "lumen": [100, 200, 300]}},
            {"id": "B-1", "caracteristicasTecnicas": {"watt": "10"}}
        ]}
    ]));

    let variants = script.stage(Stage::Variants);
    assert_eq!(variants.len(), 2);
    assert!(variants[0].contains("VALUES ('B-1-2', (SELECT id FROM products WHERE code = 'B')"));
    assert!(variants[1].contains("VALUES ('B-1', (SELECT id FROM products WHERE code = 'B')"));

    let configurations = script.stage(Stage::Configurations);
    assert_eq!(configurations.len(), 2);
    assert!(configurations[0].contains(
        "'B-1-2-cfg2', (SELECT id FROM product_variants WHERE variant_code = 'B-1-2'), 15, "
    ));
    assert!(configurations[1]
        .contains("'B-1-cfg1', (SELECT id FROM product_variants WHERE variant_code = 'B-1'), 10, "));
}

#[test]
fn positional_codes_stay_unique_across_repeated_products() {
    let script = run(json!([
        {"code": "X", "modelos": [{"subnombre": "Uno"}]},
        {"code": "X", "modelos": [{"subnombre": "Otro"}]}
    ]));

    let variants = script.stage(Stage::Variants);
    assert_eq!(variants.len(), 2);
    assert!(variants[0].contains("VALUES ('X-1', "));
    assert!(variants[1].contains("VALUES ('X-1-2', "));
}

#[test]
fn null_models_still_emit_the_product() {
    let script = run(json!([
        {"code": "A", "nombre": "A", "categoria": "X", "modelos": null}
    ]));

    assert_eq!(script.stats.products, 1);
    assert_eq!(script.stats.variants, 0);
    assert!(script.stage(Stage::Products)[0].contains("(SELECT id FROM categories WHERE slug = 'x')"));
}
