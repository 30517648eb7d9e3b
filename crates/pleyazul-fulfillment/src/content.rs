//! # Content Repository
//!
//! The capability seam for the read-only content catalog.
//!
//! Catalog storage and loading live outside the fulfillment core; the
//! service only needs spread lookups and the three oracle slices. The
//! trait keeps that boundary explicit and lets tests supply fixture
//! catalogs without touching disk.

use std::collections::HashMap;

use pleyazul_core::{Catalog, Spread};

/// Read-only catalog lookups consumed by the fulfillment core.
///
/// Implementations must be immutable after construction: the service
/// shares one instance across all concurrent requests without locking.
pub trait ContentRepository: Send + Sync {
    /// Looks up a spread by catalog id.
    fn spread(&self, id: &str) -> Option<Spread>;

    /// All spreads, for catalog listings.
    fn spreads(&self) -> Vec<Spread>;

    /// The oracle catalog slices the generator draws from.
    fn catalog(&self) -> &Catalog;
}

// =============================================================================
// In-Memory Implementation
// =============================================================================

/// Content repository backed by catalogs already in memory.
///
/// Production wiring deserializes the catalog JSON files once at startup
/// and hands the result here; tests build fixtures directly.
#[derive(Debug, Clone)]
pub struct InMemoryContent {
    spreads: HashMap<String, Spread>,
    catalog: Catalog,
}

impl InMemoryContent {
    /// Builds a repository from parsed spreads and catalog slices.
    ///
    /// Spread ids are taken from each spread's `id` field. Use
    /// [`from_json`] for raw catalog files, where ids live in the
    /// object keys instead.
    ///
    /// [`from_json`]: InMemoryContent::from_json
    pub fn new(spreads: Vec<Spread>, catalog: Catalog) -> Self {
        let spreads = spreads
            .into_iter()
            .map(|s| (s.id.clone(), s))
            .collect();

        InMemoryContent { spreads, catalog }
    }

    /// Builds a repository from raw catalog JSON.
    ///
    /// `spreads_json` is an object keyed by spread id, as shipped in the
    /// catalog files; the key is written back into each spread's `id`.
    /// The slice files are arrays of records.
    pub fn from_json(
        spreads_json: &str,
        tarot_json: &str,
        iching_json: &str,
        rueda_json: &str,
    ) -> Result<Self, serde_json::Error> {
        let mut spreads: HashMap<String, Spread> = serde_json::from_str(spreads_json)?;
        for (id, spread) in spreads.iter_mut() {
            spread.id = id.clone();
        }

        let catalog = Catalog {
            tarot: serde_json::from_str(tarot_json)?,
            hexagrams: serde_json::from_str(iching_json)?,
            animals: serde_json::from_str(rueda_json)?,
        };

        Ok(InMemoryContent { spreads, catalog })
    }
}

impl ContentRepository for InMemoryContent {
    fn spread(&self, id: &str) -> Option<Spread> {
        self.spreads.get(id).cloned()
    }

    fn spreads(&self) -> Vec<Spread> {
        self.spreads.values().cloned().collect()
    }

    fn catalog(&self) -> &Catalog {
        &self.catalog
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use pleyazul_core::OracleType;

    const SPREADS_JSON: &str = r#"{
        "tarot_3_ppf": {
            "nombre": "Pasado, Presente, Futuro",
            "oraculo": "tarot",
            "cartas": 3,
            "posiciones": ["Pasado", "Presente", "Futuro"]
        },
        "rueda_astral": {
            "nombre": "Rueda Astral",
            "oraculo": "rueda",
            "cartas": 5,
            "posiciones": ["Este", "Sur", "Oeste", "Norte", "Centro"]
        }
    }"#;

    const TAROT_JSON: &str = r#"[
        {"name": "El Sol", "upright": "alegría", "reversed": "nubes pasajeras"}
    ]"#;

    const ICHING_JSON: &str = r#"[
        {"hex": 1, "nombre": "Lo Creativo", "consejo": "Persevera"}
    ]"#;

    const RUEDA_JSON: &str = r#"[
        {"animal": "Águila", "arquetipo": "Visión", "medicina": "Perspectiva"}
    ]"#;

    #[test]
    fn test_from_json_fills_spread_ids() {
        let content =
            InMemoryContent::from_json(SPREADS_JSON, TAROT_JSON, ICHING_JSON, RUEDA_JSON).unwrap();

        let spread = content.spread("tarot_3_ppf").unwrap();
        assert_eq!(spread.id, "tarot_3_ppf");
        assert_eq!(spread.oracle, OracleType::Tarot);
        assert_eq!(spread.count, 3);

        assert!(content.spread("no_such_spread").is_none());
        assert_eq!(content.spreads().len(), 2);
    }

    #[test]
    fn test_catalog_slices_parsed() {
        let content =
            InMemoryContent::from_json(SPREADS_JSON, TAROT_JSON, ICHING_JSON, RUEDA_JSON).unwrap();

        let catalog = content.catalog();
        assert_eq!(catalog.tarot.len(), 1);
        assert_eq!(catalog.tarot[0].name, "El Sol");
        assert_eq!(catalog.hexagrams[0].advice, "Persevera");
        assert_eq!(catalog.animals[0].medicine, "Perspectiva");
    }
}
