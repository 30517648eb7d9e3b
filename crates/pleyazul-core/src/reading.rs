//! # Reading Generator
//!
//! Turns a spread definition plus a randomness source into a structurally
//! correct reading payload.
//!
//! ## Generation Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                     Reading Generation                                  │
//! │                                                                         │
//! │  Spread { oracle, count, positions }                                   │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  Sample `count` DISTINCT indices from the catalog slice                │
//! │  (shrinking-pool sampling, no rejection loop)                          │
//! │       │                                                                 │
//! │       ├── tarot:  coin flip per card → upright/reversed meaning        │
//! │       ├── iching: single draw, full hexagram record nested             │
//! │       └── rueda:  animal + arquetipo + medicina per position           │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ReadingResult { type, items, message, timestamp }                     │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The generator is a pure function: callers inject the RNG, so a seeded
//! `StdRng` replays the exact same draw.

use chrono::Utc;
use rand::seq::index;
use rand::Rng;

use crate::error::{CoreError, CoreResult};
use crate::types::{
    Catalog, DrawnAnimal, DrawnCard, OracleOutcome, OracleType, ReadingResult, Spread,
};

// Closing lines attached to every reading, per oracle.
const TAROT_MESSAGE: &str = "Las cartas han sido elegidas. Confía en su sabiduría.";
const ICHING_MESSAGE: &str = "El I Ching revela su sabiduría milenaria.";
const RUEDA_MESSAGE: &str = "Los animales de poder han sido llamados para guiarte.";

/// Generates a reading for `spread` from `catalog`, drawing with `rng`.
///
/// ## Guarantees
/// - All drawn items are distinct (sampling without replacement)
/// - Item cardinality equals the spread's count (always 1 for I Ching)
/// - The payload `type` equals the spread's oracle type
///
/// ## Errors
/// - [`CoreError::MalformedSpread`] for a zero draw count
/// - [`CoreError::InsufficientCatalog`] when the catalog slice is smaller
///   than the draw count
pub fn generate<R: Rng>(spread: &Spread, catalog: &Catalog, rng: &mut R) -> CoreResult<ReadingResult> {
    if spread.count == 0 {
        return Err(CoreError::MalformedSpread {
            spread_id: spread.id.clone(),
            reason: "draw count must be at least 1".to_string(),
        });
    }

    let (outcome, message) = match spread.oracle {
        OracleType::Tarot => (draw_tarot(spread, catalog, rng)?, TAROT_MESSAGE),
        OracleType::IChing => (draw_hexagram(catalog, rng)?, ICHING_MESSAGE),
        OracleType::Rueda => (draw_rueda(spread, catalog, rng)?, RUEDA_MESSAGE),
    };

    Ok(ReadingResult {
        outcome,
        message: message.to_string(),
        timestamp: Utc::now(),
    })
}

// =============================================================================
// Per-Oracle Draws
// =============================================================================

fn draw_tarot<R: Rng>(spread: &Spread, catalog: &Catalog, rng: &mut R) -> CoreResult<OracleOutcome> {
    let picks = draw_indices(rng, catalog.tarot.len(), spread.count, OracleType::Tarot)?;

    let cards = picks
        .into_iter()
        .enumerate()
        .map(|(i, idx)| {
            let card = &catalog.tarot[idx];
            let reversed = rng.random_bool(0.5);
            let interpretation = if reversed {
                card.reversed.clone()
            } else {
                card.upright.clone()
            };
            DrawnCard {
                name: card.name.clone(),
                position: position_label(spread, i, "Carta"),
                reversed,
                interpretation,
                image: card.image.clone(),
            }
        })
        .collect();

    Ok(OracleOutcome::Tarot { cards })
}

// An I Ching consultation is always a single hexagram, whatever the
// spread's count says.
fn draw_hexagram<R: Rng>(catalog: &Catalog, rng: &mut R) -> CoreResult<OracleOutcome> {
    let picks = draw_indices(rng, catalog.hexagrams.len(), 1, OracleType::IChing)?;
    let hexagram = catalog.hexagrams[picks[0]].clone();

    Ok(OracleOutcome::IChing { hexagram })
}

fn draw_rueda<R: Rng>(spread: &Spread, catalog: &Catalog, rng: &mut R) -> CoreResult<OracleOutcome> {
    let picks = draw_indices(rng, catalog.animals.len(), spread.count, OracleType::Rueda)?;

    let animals = picks
        .into_iter()
        .enumerate()
        .map(|(i, idx)| {
            let animal = &catalog.animals[idx];
            DrawnAnimal {
                animal: animal.animal.clone(),
                position: position_label(spread, i, "Animal"),
                archetype: animal.archetype.clone(),
                medicine: animal.medicine.clone(),
            }
        })
        .collect();

    Ok(OracleOutcome::Rueda { animals })
}

// =============================================================================
// Draw Helpers
// =============================================================================

/// Samples `want` distinct indices from a pool of `available`.
///
/// `rand::seq::index::sample` removes each pick from the candidate pool,
/// so this is O(want) with no retry loop.
fn draw_indices<R: Rng>(
    rng: &mut R,
    available: usize,
    want: usize,
    oracle: OracleType,
) -> CoreResult<Vec<usize>> {
    if available < want {
        return Err(CoreError::InsufficientCatalog {
            oracle,
            available,
            required: want,
        });
    }

    Ok(index::sample(rng, available, want).into_vec())
}

/// Position label for item `i`: the spread's label when present,
/// otherwise a synthesized "Carta N" / "Animal N".
fn position_label(spread: &Spread, i: usize, kind: &str) -> String {
    spread
        .positions
        .get(i)
        .cloned()
        .unwrap_or_else(|| format!("{} {}", kind, i + 1))
}

// =============================================================================
// Unit Tests
// =============================================================================
