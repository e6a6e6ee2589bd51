use lumcat_normalize::Domain;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum MigrateError {
    #[error("{domain} slug '{slug}' is claimed by both '{kept}' and '{rejected}'")]
    SlugConflict {
        domain: Domain,
        slug: String,
        kept: String,
        rejected: String,
    },

    /// Stage two met a catalog value stage one never registered, which means
    /// the two stages were given different records.
    #[error("{domain} value '{display_name}' (slug '{slug}') was not collected before emission")]
    UnregisteredCatalogValue {
        domain: Domain,
        slug: String,
        display_name: String,
    },
}
