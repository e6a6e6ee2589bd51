//! Legacy catalog export to normalized SQL.
//!
//! Two explicit stages: [`collect_catalogs`] builds the frozen lookup
//! catalogs, [`emit`] renders products, variants, configurations, relations,
//! and media into one transaction-wrapped [`Script`].

pub mod catalog;
pub mod error;
pub mod expand;
pub mod pipeline;
pub mod relations;
pub mod sql;
pub mod types;

pub use catalog::{Catalog, CatalogAccumulator, CatalogSet, SlugConflict};
pub use error::MigrateError;
pub use expand::{expand, ExpandOptions, Expansion, SpecLists};
pub use pipeline::{collect_catalogs, emit, migrate, MigrateOptions};
pub use relations::RelationLinker;
pub use sql::{quote_literal, Script, ScriptHeader, ScriptStats, SqlValue, Stage};
pub use types::{
    CatalogValue, ConfigurationRow, MediaKind, MediaRow, ProductRow, RelationKind, RelationRow,
    VariantRow,
};
