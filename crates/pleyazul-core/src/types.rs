//! # Domain Types
//!
//! Core domain types used throughout Pleyazul Oráculos.
//!
//! ## Type Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Domain Types                                    │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────┐       │
//! │  │     Spread      │   │      Order      │   │     Reading     │       │
//! │  │  ─────────────  │   │  ─────────────  │   │  ─────────────  │       │
//! │  │  id (catalog)   │   │  id (UUID)      │   │  id = order_id  │       │
//! │  │  oracle         │   │  spread_id (FK) │   │  result (JSON)  │       │
//! │  │  count          │   │  status         │   │  is_demo        │       │
//! │  │  positions      │   │  amount_cents   │   │  generated_at   │       │
//! │  └─────────────────┘   └─────────────────┘   └─────────────────┘       │
//! │                                                                         │
//! │  Catalog slices: TarotCard · Hexagram · TotemAnimal                    │
//! │  Payload:        ReadingResult { OracleOutcome, message, timestamp }   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Catalog Key Mapping
//! The content catalog keeps the original Spanish JSON keys (`oraculo`,
//! `cartas`, `posiciones`, `nombre`, `consejo`, `medicina`, `arquetipo`).
//! Rust field names stay English; `#[serde(rename)]` bridges the two so
//! existing catalog files and reading consumers keep working unchanged.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// =============================================================================
// Oracle Type
// =============================================================================

/// The oracle family a spread draws from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OracleType {
    /// Tarot cards, drawn with an upright/reversed orientation.
    Tarot,
    /// I Ching hexagrams, always a single draw.
    IChing,
    /// Medicine-wheel totem animals ("rueda").
    Rueda,
}

impl fmt::Display for OracleType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            OracleType::Tarot => "tarot",
            OracleType::IChing => "iching",
            OracleType::Rueda => "rueda",
        };
        f.write_str(name)
    }
}

// =============================================================================
// Spread
// =============================================================================

/// A named oracle-reading template from the content catalog.
///
/// Immutable reference data: the Fulfillment Core only ever reads
/// spreads, it never writes them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Spread {
    /// Catalog identifier, e.g. `tarot_3_ppf` or `rueda_astral`.
    ///
    /// The catalog file keys spreads by id, so the value may omit it;
    /// the content loader fills it back in.
    #[serde(default)]
    pub id: String,

    /// Display name shown to the customer.
    #[serde(rename = "nombre", default)]
    pub name: String,

    /// Which oracle this spread consults.
    #[serde(rename = "oraculo")]
    pub oracle: OracleType,

    /// How many items the reading draws (1 for single-hexagram spreads).
    #[serde(rename = "cartas")]
    pub count: usize,

    /// Ordered position labels, one per drawn item.
    #[serde(rename = "posiciones", default)]
    pub positions: Vec<String>,

    /// Optional marketing copy for the spread.
    #[serde(rename = "descripcion", default)]
    pub description: Option<String>,

    /// Optional layout hint for the frontend (e.g. "cruz", "linea").
    #[serde(default)]
    pub layout: Option<String>,
}

// =============================================================================
// Catalog Records
// =============================================================================

/// A tarot card with both orientations of meaning text.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TarotCard {
    pub name: String,

    /// Major/minor arcana label, when the catalog provides one.
    #[serde(default)]
    pub arcana: Option<String>,

    /// Meaning text for the upright orientation.
    pub upright: String,

    /// Meaning text for the reversed orientation.
    pub reversed: String,

    /// Card artwork reference.
    #[serde(default)]
    pub image: Option<String>,
}

/// The two trigrams composing a hexagram.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Trigrams {
    pub superior: String,
    pub inferior: String,
}

/// An I Ching hexagram record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Hexagram {
    /// Hexagram number (1 through 64).
    pub hex: u32,

    #[serde(rename = "nombre")]
    pub name: String,

    /// Advice text for the consultation.
    #[serde(rename = "consejo")]
    pub advice: String,

    #[serde(rename = "trigramas", default)]
    pub trigrams: Option<Trigrams>,
}

/// A medicine-wheel totem animal.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TotemAnimal {
    pub animal: String,

    #[serde(rename = "arquetipo")]
    pub archetype: String,

    /// The animal's "medicina" (totem meaning) text.
    #[serde(rename = "medicina")]
    pub medicine: String,

    #[serde(default)]
    pub image: Option<String>,
}

/// The three oracle catalog slices the generator draws from.
///
/// Read-only after load. Supplied by the Content Repository.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Catalog {
    #[serde(default)]
    pub tarot: Vec<TarotCard>,

    #[serde(default)]
    pub hexagrams: Vec<Hexagram>,

    #[serde(default)]
    pub animals: Vec<TotemAnimal>,
}

impl Catalog {
    /// Number of items available for the given oracle.
    pub fn slice_len(&self, oracle: OracleType) -> usize {
        match oracle {
            OracleType::Tarot => self.tarot.len(),
            OracleType::IChing => self.hexagrams.len(),
            OracleType::Rueda => self.animals.len(),
        }
    }
}

// =============================================================================
// Order Status
// =============================================================================

/// The status of a customer order.
///
/// ## State Machine
/// ```text
/// created ──► awaiting_payment ──► paid (terminal)
///                    │
///                    └──► failed
/// ```
/// Transitions are monotonic; `awaiting_payment` is never skipped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "snake_case"))]
#[serde(rename_all = "snake_case")]
pub enum OrderStatus {
    /// Order persisted, payment not yet initiated.
    Created,
    /// Payment created at the gateway, waiting for capture.
    AwaitingPayment,
    /// Payment captured and verified.
    Paid,
    /// Payment definitively declined.
    Failed,
}

impl OrderStatus {
    /// Whether the state machine permits moving from `self` to `next`.
    pub fn can_transition_to(self, next: OrderStatus) -> bool {
        matches!(
            (self, next),
            (OrderStatus::Created, OrderStatus::AwaitingPayment)
                | (OrderStatus::AwaitingPayment, OrderStatus::Paid)
                | (OrderStatus::AwaitingPayment, OrderStatus::Failed)
        )
    }

    /// PAID is terminal for payment purposes; FAILED is terminal outright.
    pub fn is_terminal(self) -> bool {
        matches!(self, OrderStatus::Paid | OrderStatus::Failed)
    }

    /// Stable string form, matching the database TEXT representation.
    pub fn as_str(self) -> &'static str {
        match self {
            OrderStatus::Created => "created",
            OrderStatus::AwaitingPayment => "awaiting_payment",
            OrderStatus::Paid => "paid",
            OrderStatus::Failed => "failed",
        }
    }
}

impl Default for OrderStatus {
    fn default() -> Self {
        OrderStatus::Created
    }
}

// =============================================================================
// Order
// =============================================================================

/// A customer order for one reading.
///
/// Owned exclusively by the Fulfillment Core; mutated only through the
/// repository's guarded status transitions, never deleted here.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Order {
    /// Unique identifier (UUID v4).
    pub id: String,

    /// Customer contact for reading delivery.
    pub email: String,

    /// Foreign key into the spread catalog.
    pub spread_id: String,

    /// Optional question the customer attached to the consultation.
    pub custom_question: Option<String>,

    pub status: OrderStatus,

    /// Provider-side order id, set once the gateway creates a payment.
    pub payment_reference: Option<String>,

    /// Price snapshot at order time (smallest currency unit).
    pub amount_cents: i64,
    pub currency: String,

    /// Whether the order was taken against the mock gateway.
    pub test_mode: bool,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub paid_at: Option<DateTime<Utc>>,
}

// =============================================================================
// Reading Payload
// =============================================================================

/// One drawn tarot card in a reading.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DrawnCard {
    pub name: String,

    /// Position label from the spread, e.g. "Pasado".
    pub position: String,

    /// Orientation of the draw (fair coin per card).
    pub reversed: bool,

    /// Upright or reversed meaning text, picked to match orientation.
    pub interpretation: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
}

/// One drawn totem animal in a rueda reading.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DrawnAnimal {
    pub animal: String,

    pub position: String,

    #[serde(rename = "arquetipo")]
    pub archetype: String,

    #[serde(rename = "medicina")]
    pub medicine: String,
}

/// The oracle-typed body of a reading.
///
/// Serializes with an internal `type` tag so payloads look like
/// `{"type": "tarot", "cards": [...]}` on the wire.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum OracleOutcome {
    Tarot { cards: Vec<DrawnCard> },
    IChing { hexagram: Hexagram },
    Rueda { animals: Vec<DrawnAnimal> },
}

impl OracleOutcome {
    /// The oracle type this outcome belongs to.
    pub fn oracle(&self) -> OracleType {
        match self {
            OracleOutcome::Tarot { .. } => OracleType::Tarot,
            OracleOutcome::IChing { .. } => OracleType::IChing,
            OracleOutcome::Rueda { .. } => OracleType::Rueda,
        }
    }

    /// How many items were drawn.
    pub fn item_count(&self) -> usize {
        match self {
            OracleOutcome::Tarot { cards } => cards.len(),
            OracleOutcome::IChing { .. } => 1,
            OracleOutcome::Rueda { animals } => animals.len(),
        }
    }
}

/// The complete generated payload for one reading.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReadingResult {
    #[serde(flatten)]
    pub outcome: OracleOutcome,

    /// Oracle-specific closing line.
    pub message: String,

    /// Generation time (UTC, serialized ISO-8601).
    pub timestamp: DateTime<Utc>,
}

// =============================================================================
// Reading
// =============================================================================

/// Prefix for synthesized demo reading ids.
pub const DEMO_ID_PREFIX: &str = "demo_";

/// A generated reading, 1:1 with a paid order (or standalone for demos).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Reading {
    /// Equal to the order id, or `demo_<hex>` for demo readings.
    pub id: String,

    /// Back-reference to the owning order.
    pub order_id: String,

    #[serde(rename = "result_json")]
    pub result: ReadingResult,

    pub is_demo: bool,

    pub generated_at: DateTime<Utc>,
}

impl Reading {
    /// Whether the id carries the demo prefix.
    pub fn has_demo_id(&self) -> bool {
        self.id.starts_with(DEMO_ID_PREFIX)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_transitions() {
        use OrderStatus::*;

        assert!(Created.can_transition_to(AwaitingPayment));
        assert!(AwaitingPayment.can_transition_to(Paid));
        assert!(AwaitingPayment.can_transition_to(Failed));

        assert!(!Created.can_transition_to(Paid)); // never skips awaiting
        assert!(!Paid.can_transition_to(Failed)); // paid is terminal
        assert!(!Failed.can_transition_to(AwaitingPayment));
        assert!(!AwaitingPayment.can_transition_to(Created));
    }

    #[test]
    fn test_status_default() {
        assert_eq!(OrderStatus::default(), OrderStatus::Created);
    }

    #[test]
    fn test_spread_deserializes_catalog_keys() {
        let json = r#"{
            "nombre": "Tarot 3 Cartas",
            "oraculo": "tarot",
            "cartas": 3,
            "posiciones": ["Pasado", "Presente", "Futuro"]
        }"#;
        let spread: Spread = serde_json::from_str(json).unwrap();
        assert_eq!(spread.oracle, OracleType::Tarot);
        assert_eq!(spread.count, 3);
        assert_eq!(spread.positions.len(), 3);
        assert_eq!(spread.positions[0], "Pasado");
    }

    #[test]
    fn test_outcome_serializes_type_tag() {
        let outcome = OracleOutcome::IChing {
            hexagram: Hexagram {
                hex: 1,
                name: "Lo Creativo".to_string(),
                advice: "Persevera".to_string(),
                trigrams: None,
            },
        };
        let value = serde_json::to_value(&outcome).unwrap();
        assert_eq!(value["type"], "iching");
        assert_eq!(value["hexagram"]["nombre"], "Lo Creativo");
        assert_eq!(value["hexagram"]["consejo"], "Persevera");
    }

    #[test]
    fn test_reading_result_flattens_outcome() {
        let result = ReadingResult {
            outcome: OracleOutcome::Rueda {
                animals: vec![DrawnAnimal {
                    animal: "Águila".to_string(),
                    position: "Este".to_string(),
                    archetype: "Visión".to_string(),
                    medicine: "Perspectiva y claridad".to_string(),
                }],
            },
            message: "msg".to_string(),
            timestamp: Utc::now(),
        };
        let value = serde_json::to_value(&result).unwrap();
        assert_eq!(value["type"], "rueda");
        assert_eq!(value["animals"][0]["medicina"], "Perspectiva y claridad");
        assert!(value["timestamp"].is_string());
    }

    #[test]
    fn test_catalog_slice_len() {
        let catalog = Catalog {
            tarot: vec![],
            hexagrams: vec![Hexagram {
                hex: 2,
                name: "Lo Receptivo".to_string(),
                advice: "Cede".to_string(),
                trigrams: None,
            }],
            animals: vec![],
        };
        assert_eq!(catalog.slice_len(OracleType::Tarot), 0);
        assert_eq!(catalog.slice_len(OracleType::IChing), 1);
        assert_eq!(catalog.slice_len(OracleType::Rueda), 0);
    }

    #[test]
    fn test_demo_id_prefix() {
        let reading = Reading {
            id: "demo_abc123".to_string(),
            order_id: "demo_abc123".to_string(),
            result: ReadingResult {
                outcome: OracleOutcome::Tarot { cards: vec![] },
                message: String::new(),
                timestamp: Utc::now(),
            },
            is_demo: true,
            generated_at: Utc::now(),
        };
        assert!(reading.has_demo_id());
    }
}
