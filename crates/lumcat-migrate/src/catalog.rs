//! Catalog accumulation: the distinct lookup values of one catalog kind,
//! gathered across the whole export and keyed by slug.
//!
//! A [`CatalogAccumulator`] is only mutable during the collection stage.
//! [`CatalogAccumulator::freeze`] turns it into a read-only [`Catalog`], and
//! emission only ever sees the frozen form.

use std::collections::HashMap;

use lumcat_normalize::{slugify, Domain, Synonyms};

use crate::types::CatalogValue;

/// Two different canonical names that produced the same slug.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SlugConflict {
    pub domain: Domain,
    pub slug: String,
    /// First-registered name; this is the one emitted.
    pub kept: String,
    pub rejected: String,
}

#[derive(Debug, Clone)]
pub struct CatalogAccumulator {
    domain: Domain,
    values: Vec<CatalogValue>,
    by_slug: HashMap<String, usize>,
    conflicts: Vec<SlugConflict>,
}

impl CatalogAccumulator {
    #[must_use]
    pub fn new(domain: Domain) -> Self {
        Self {
            domain,
            values: Vec::new(),
            by_slug: HashMap::new(),
            conflicts: Vec::new(),
        }
    }

    #[must_use]
    pub fn domain(&self) -> Domain {
        self.domain
    }

    /// Canonicalizes `raw` and records it under its slug.
    ///
    /// Returns the slug, or `None` when the name has no sluggable characters.
    /// When the slug is already taken by a different canonical name the first
    /// name is kept and the collision is recorded.
    pub fn register(&mut self, synonyms: &Synonyms, raw: &str) -> Option<String> {
        let display_name = synonyms.canonicalize(raw, self.domain);
        let slug = slugify(&display_name);
        if slug.is_empty() {
            return None;
        }

        if let Some(&idx) = self.by_slug.get(&slug) {
            let kept = &self.values[idx].display_name;
            if *kept != display_name
                && !self
                    .conflicts
                    .iter()
                    .any(|c| c.slug == slug && c.rejected == display_name)
            {
                tracing::warn!(
                    domain = %self.domain,
                    slug = %slug,
                    kept = %kept,
                    rejected = %display_name,
                    "catalog slug conflict; keeping first-seen name"
                );
                self.conflicts.push(SlugConflict {
                    domain: self.domain,
                    slug: slug.clone(),
                    kept: kept.clone(),
                    rejected: display_name,
                });
            }
            return Some(slug);
        }

        self.by_slug.insert(slug.clone(), self.values.len());
        self.values.push(CatalogValue {
            slug: slug.clone(),
            display_name,
        });
        Some(slug)
    }

    /// Values in first-registration order.
    pub fn all(&self) -> impl Iterator<Item = &CatalogValue> {
        self.values.iter()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    #[must_use]
    pub fn conflicts(&self) -> &[SlugConflict] {
        &self.conflicts
    }

    /// Ends accumulation. The returned catalog cannot gain values.
    #[must_use]
    pub fn freeze(self) -> Catalog {
        Catalog {
            domain: self.domain,
            values: self.values,
            by_slug: self.by_slug,
            conflicts: self.conflicts,
        }
    }
}

/// A frozen catalog: the complete value set of one kind for a run.
#[derive(Debug, Clone)]
pub struct Catalog {
    domain: Domain,
    values: Vec<CatalogValue>,
    by_slug: HashMap<String, usize>,
    conflicts: Vec<SlugConflict>,
}

impl Catalog {
    #[must_use]
    pub fn domain(&self) -> Domain {
        self.domain
    }

    pub fn all(&self) -> impl Iterator<Item = &CatalogValue> {
        self.values.iter()
    }

    #[must_use]
    pub fn get(&self, slug: &str) -> Option<&CatalogValue> {
        self.by_slug.get(slug).map(|&idx| &self.values[idx])
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    #[must_use]
    pub fn conflicts(&self) -> &[SlugConflict] {
        &self.conflicts
    }
}

/// The three frozen catalogs of a run, plus the synonym tables they were
/// canonicalized with so emission resolves names the same way.
#[derive(Debug, Clone)]
pub struct CatalogSet {
    pub synonyms: Synonyms,
    pub categories: Catalog,
    pub finishes: Catalog,
    pub light_tones: Catalog,
}

impl CatalogSet {
    #[must_use]
    pub fn get(&self, domain: Domain) -> &Catalog {
        match domain {
            Domain::Category => &self.categories,
            Domain::Finish => &self.finishes,
            Domain::LightTone => &self.light_tones,
        }
    }

    /// Every recorded slug conflict, categories first.
    pub fn conflicts(&self) -> impl Iterator<Item = &SlugConflict> {
        Domain::ALL
            .into_iter()
            .flat_map(move |domain| self.get(domain).conflicts().iter())
    }

    /// Canonicalizes `raw` in `domain` and returns the registered value.
    ///
    /// `Ok(None)` when the name has no sluggable characters.
    ///
    /// # Errors
    ///
    /// Returns [`MigrateError::UnregisteredCatalogValue`] when the slug was
    /// never collected.
    ///
    /// [`MigrateError::UnregisteredCatalogValue`]: crate::MigrateError::UnregisteredCatalogValue
    pub fn resolve(
        &self,
        domain: Domain,
        raw: &str,
    ) -> Result<Option<&CatalogValue>, crate::MigrateError> {
        let display_name = self.synonyms.canonicalize(raw, domain);
        let slug = slugify(&display_name);
        if slug.is_empty() {
            return Ok(None);
        }
        self.get(domain)
            .get(&slug)
            .map(Some)
            .ok_or(crate::MigrateError::UnregisteredCatalogValue {
                domain,
                slug,
                display_name,
            })
    }
}
