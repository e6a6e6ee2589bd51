//! Whole-pipeline tests: export JSON in, SQL script out.

use lumcat_core::parse_export;
use lumcat_migrate::{collect_catalogs, emit, MigrateOptions, ScriptHeader, Stage};
use lumcat_normalize::Synonyms;

const BURO_EXPORT: &str = r#"[
  {
    "code": "BUR",
    "nombre": "Buro",
    "categoria": "Colgantes",
    "modelos": [
      {
        "id": "BUR-D",
        "subnombre": "Directo",
        "caracteristicasTecnicas": {
          "watt": "13/25",
          "volt": "220",
          "tono": ["Cálida", "fria"],
          "acabado": "Blanco"
        }
      }
    ]
  }
]"#;

fn count_prefix(statements: &[String], prefix: &str) -> usize {
    statements.iter().filter(|s| s.starts_with(prefix)).count()
}

#[test]
fn buro_export_produces_the_expected_script() {
    let loaded = parse_export(BURO_EXPORT.as_bytes()).expect("export parses");
    assert!(loaded.skipped.is_empty());

    let catalogs = collect_catalogs(&loaded.records, &Synonyms::builtin());
    let script = emit(&loaded.records, &catalogs, &MigrateOptions::default()).expect("emits");

    let catalog_rows = script.stage(Stage::Catalogs);
    assert_eq!(
        count_prefix(catalog_rows, "INSERT INTO categories "),
        1,
        "one category upsert"
    );
    assert!(catalog_rows.iter().any(|s| s.contains("('colgantes', 'Colgantes')")));
    assert_eq!(count_prefix(catalog_rows, "INSERT INTO light_tones "), 2);
    assert!(catalog_rows.iter().any(|s| s.contains("('calida', 'Cálida')")));
    assert!(catalog_rows.iter().any(|s| s.contains("('fria', 'Fría')")));
    assert_eq!(count_prefix(catalog_rows, "INSERT INTO finishes "), 1);
    assert!(catalog_rows.iter().any(|s| s.contains("('blanco', 'Blanco')")));
    assert!(catalog_rows
        .iter()
        .all(|s| s.ends_with("ON CONFLICT (slug) DO NOTHING;")));

    let products = script.stage(Stage::Products);
    assert_eq!(products.len(), 1);
    assert!(products[0].contains("'BUR', 'Buro'"));
    assert!(products[0].contains("(SELECT id FROM categories WHERE slug = 'colgantes')"));

    let variants = script.stage(Stage::Variants);
    assert_eq!(variants.len(), 1);
    assert!(variants[0].contains("'BUR-D'"));
    assert!(variants[0].contains("'Directo'"));

    let configurations = script.stage(Stage::Configurations);
    assert_eq!(configurations.len(), 2);
    assert!(configurations[0].contains("'BUR-D-cfg1', (SELECT id FROM product_variants WHERE variant_code = 'BUR-D'), 13, "));
    assert!(configurations[1].contains("'BUR-D-cfg2', (SELECT id FROM product_variants WHERE variant_code = 'BUR-D'), 25, "));
    for cfg in configurations {
        assert!(cfg.contains(", 220, 220, 220, '220', "), "voltage 220: {cfg}");
    }

    let relations = script.stage(Stage::Relations);
    assert_eq!(count_prefix(relations, "INSERT INTO variant_light_tones "), 2);
    assert_eq!(count_prefix(relations, "INSERT INTO product_finishes "), 1);
    assert!(relations
        .iter()
        .all(|s| s.ends_with("ON CONFLICT DO NOTHING;")));

    assert!(script.stage(Stage::Media).is_empty());

    let body = script.body();
    assert!(body.starts_with("BEGIN;\n"));
    assert!(body.trim_end().ends_with("COMMIT;"));
    assert_eq!(body.matches("BEGIN;").count(), 1);
    assert_eq!(body.matches("COMMIT;").count(), 1);
}

#[test]
fn buro_script_sections_follow_dependency_order() {
    let loaded = parse_export(BURO_EXPORT.as_bytes()).unwrap();
    let catalogs = collect_catalogs(&loaded.records, &Synonyms::builtin());
    let body = emit(&loaded.records, &catalogs, &MigrateOptions::default())
        .unwrap()
        .body();

    let position = |needle: &str| {
        body.find(needle)
            .unwrap_or_else(|| panic!("missing {needle}"))
    };
    let order = [
        position("BEGIN;"),
        position("INSERT INTO categories"),
        position("INSERT INTO products"),
        position("INSERT INTO product_variants"),
        position("INSERT INTO variant_configurations"),
        position("INSERT INTO variant_light_tones"),
        position("COMMIT;"),
    ];
    assert!(order.windows(2).all(|w| w[0] < w[1]), "{order:?}");
}

#[test]
fn buro_stats_and_header() {
    let loaded = parse_export(BURO_EXPORT.as_bytes()).unwrap();
    let catalogs = collect_catalogs(&loaded.records, &Synonyms::builtin());
    let script = emit(&loaded.records, &catalogs, &MigrateOptions::default()).unwrap();

    let stats = script.stats;
    assert_eq!(stats.categories, 1);
    assert_eq!(stats.light_tones, 2);
    assert_eq!(stats.finishes, 1);
    assert_eq!(stats.products, 1);
    assert_eq!(stats.variants, 1);
    assert_eq!(stats.configurations, 2);
    assert_eq!(stats.dropped_configurations, 0);
    assert_eq!(stats.variant_light_tones, 2);
    assert_eq!(stats.product_finishes, 1);
    assert_eq!(script.statement_count(), 11);

    let rendered = script.render(&ScriptHeader::new("buro.json", "deadbeef"));
    assert!(rendered.starts_with("-- Generated by lumcat "));
    assert!(rendered.contains("-- Input: buro.json\n"));
    assert!(rendered.contains("-- variant_configurations: 2\n"));
}

#[test]
fn rerunning_against_the_same_export_is_idempotent_sql() {
    let loaded = parse_export(BURO_EXPORT.as_bytes()).unwrap();
    let catalogs = collect_catalogs(&loaded.records, &Synonyms::builtin());
    let script = emit(&loaded.records, &catalogs, &MigrateOptions::default()).unwrap();

    assert!(script
        .statements()
        .all(|s| s.starts_with("INSERT INTO ") && s.contains(" ON CONFLICT ")));
}
