//! Canonical display names for catalog values.
//!
//! Each catalog kind has a fixed alias table keyed by [`lookup_key`], so
//! spelling, case, and accent variants all resolve to one display form.
//! Unknown values pass through title-cased.

use std::collections::HashMap;
use std::sync::LazyLock;

use lumcat_core::AliasFile;

use crate::slug::lookup_key;

/// Catalog kind an alias table belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Domain {
    Category,
    Finish,
    LightTone,
}

impl Domain {
    pub const ALL: [Domain; 3] = [Domain::Category, Domain::Finish, Domain::LightTone];

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Domain::Category => "category",
            Domain::Finish => "finish",
            Domain::LightTone => "light_tone",
        }
    }
}

impl std::fmt::Display for Domain {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

const LIGHT_TONE_ALIASES: &[(&str, &str)] = &[
    ("fria", "Fría"),
    ("frio", "Fría"),
    ("luz fria", "Fría"),
    ("blanca fria", "Fría"),
    ("calida", "Cálida"),
    ("calido", "Cálida"),
    ("luz calida", "Cálida"),
    ("blanca calida", "Cálida"),
    ("neutra", "Neutra"),
    ("neutro", "Neutra"),
    ("luz neutra", "Neutra"),
    ("monocromatico", "Monocromático"),
    ("monocromatica", "Monocromático"),
    ("rgb", "RGB"),
];

const FINISH_ALIASES: &[(&str, &str)] = &[];

const CATEGORY_ALIASES: &[(&str, &str)] = &[];

static BUILTIN: LazyLock<Synonyms> = LazyLock::new(Synonyms::builtin);

/// Canonicalizes `token` against the built-in alias tables.
///
/// See [`Synonyms::canonicalize`].
#[must_use]
pub fn canonicalize(token: &str, domain: Domain) -> String {
    BUILTIN.canonicalize(token, domain)
}

/// Alias tables for every catalog kind.
#[derive(Debug, Clone)]
pub struct Synonyms {
    tables: HashMap<Domain, HashMap<String, String>>,
}

impl Default for Synonyms {
    fn default() -> Self {
        Self::builtin()
    }
}

impl Synonyms {
    /// Tables holding only the built-in aliases.
    #[must_use]
    pub fn builtin() -> Self {
        let mut synonyms = Self {
            tables: HashMap::new(),
        };
        for (domain, entries) in [
            (Domain::LightTone, LIGHT_TONE_ALIASES),
            (Domain::Finish, FINISH_ALIASES),
            (Domain::Category, CATEGORY_ALIASES),
        ] {
            for (alias, canonical) in entries {
                synonyms.insert(domain, alias, canonical);
            }
        }
        synonyms
    }

    /// Layers an operator alias file over the current tables. File entries
    /// override existing aliases with the same key, and older aliases that
    /// pointed at a re-targeted name follow it to its new target.
    #[must_use]
    pub fn with_aliases(mut self, file: &AliasFile) -> Self {
        for (domain, entries) in [
            (Domain::LightTone, &file.light_tones),
            (Domain::Finish, &file.finishes),
            (Domain::Category, &file.categories),
        ] {
            for (alias, canonical) in entries {
                self.insert(domain, alias, canonical);
            }
        }
        self.resolve_chains();
        self
    }

    /// Repoints every alias at the end of its chain, so each target maps to
    /// itself and canonicalizing twice changes nothing.
    fn resolve_chains(&mut self) {
        for table in self.tables.values_mut() {
            let resolved: Vec<(String, String)> = table
                .iter()
                .map(|(key, target)| {
                    let mut current = target;
                    for _ in 0..table.len() {
                        match table.get(&lookup_key(current)) {
                            Some(next) if next != current => current = next,
                            _ => break,
                        }
                    }
                    (key.clone(), current.clone())
                })
                .collect();
            table.extend(resolved);
        }
    }

    /// Registers `alias` → `canonical`. The canonical name also maps to
    /// itself, which keeps [`Synonyms::canonicalize`] idempotent.
    pub fn insert(&mut self, domain: Domain, alias: &str, canonical: &str) {
        let canonical = canonical.split_whitespace().collect::<Vec<_>>().join(" ");
        let table = self.tables.entry(domain).or_default();
        table.insert(lookup_key(alias), canonical.clone());
        table.insert(lookup_key(&canonical), canonical);
    }

    /// Number of alias keys registered for `domain`.
    #[must_use]
    pub fn len(&self, domain: Domain) -> usize {
        self.tables.get(&domain).map_or(0, HashMap::len)
    }

    /// Maps a raw token to its canonical display name.
    ///
    /// The token is looked up case- and accent-insensitively; misses are
    /// returned title-cased. Blank input yields an empty string.
    #[must_use]
    pub fn canonicalize(&self, token: &str, domain: Domain) -> String {
        let key = lookup_key(token);
        if key.is_empty() {
            return String::new();
        }

        self.tables
            .get(&domain)
            .and_then(|table| table.get(&key))
            .cloned()
            .unwrap_or_else(|| title_case(token))
    }
}

/// Upper-cases the first letter of each whitespace-separated word and
/// lower-cases the rest, collapsing whitespace.
#[must_use]
pub fn title_case(s: &str) -> String {
    s.split_whitespace()
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first
                    .to_uppercase()
                    .chain(chars.flat_map(char::to_lowercase))
                    .collect::<String>(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}
