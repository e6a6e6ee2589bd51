use std::collections::{BTreeMap, HashSet};
use std::path::Path;

use serde::Deserialize;

use crate::ConfigError;

/// Operator-supplied synonym entries, one map per catalog kind.
///
/// Keys are raw spellings found in the export; values are the canonical
/// display names they should collapse to.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AliasFile {
    #[serde(default)]
    pub light_tones: BTreeMap<String, String>,
    #[serde(default)]
    pub finishes: BTreeMap<String, String>,
    #[serde(default)]
    pub categories: BTreeMap<String, String>,
}

/// Load and validate an alias file from YAML.
///
/// # Errors
///
/// Returns `ConfigError` if the file cannot be read, parsed, or fails validation.
pub fn load_aliases(path: &Path) -> Result<AliasFile, ConfigError> {
    let content = std::fs::read_to_string(path).map_err(|e| ConfigError::AliasFileIo {
        path: path.display().to_string(),
        source: e,
    })?;

    parse_aliases(&content)
}

/// Parse and validate alias YAML held in memory.
///
/// # Errors
///
/// Returns [`ConfigError::AliasFileParse`] for malformed YAML and
/// [`ConfigError::Validation`] for empty or colliding entries.
pub fn parse_aliases(content: &str) -> Result<AliasFile, ConfigError> {
    let file: AliasFile = serde_yaml::from_str(content).map_err(ConfigError::AliasFileParse)?;
    validate_aliases(&file)?;
    Ok(file)
}

fn validate_aliases(file: &AliasFile) -> Result<(), ConfigError> {
    for (section, entries) in [
        ("light_tones", &file.light_tones),
        ("finishes", &file.finishes),
        ("categories", &file.categories),
    ] {
        let mut seen = HashSet::new();
        for (alias, canonical) in entries {
            if alias.trim().is_empty() {
                return Err(ConfigError::Validation(format!(
                    "{section}: alias keys must be non-empty"
                )));
            }
            if canonical.trim().is_empty() {
                return Err(ConfigError::Validation(format!(
                    "{section}: alias '{alias}' maps to an empty name"
                )));
            }
            if !seen.insert(alias.trim().to_lowercase()) {
                return Err(ConfigError::Validation(format!(
                    "{section}: duplicate alias '{alias}' (aliases are case-insensitive)"
                )));
            }
        }
    }

    Ok(())
}
