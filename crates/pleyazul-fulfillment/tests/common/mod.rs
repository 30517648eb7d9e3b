//! Shared fixtures for the fulfillment integration tests.

use std::sync::Arc;

use async_trait::async_trait;
use tracing_subscriber::EnvFilter;
use uuid::Uuid;

use pleyazul_core::{Catalog, Hexagram, Order, OracleType, Spread, TarotCard, TotemAnimal};
use pleyazul_db::{Database, DbConfig};
use pleyazul_fulfillment::{
    Capture, FulfillmentConfig, FulfillmentService, GatewayResult, InMemoryContent,
    PaymentGateway, PaymentHandle,
};

/// Builds the fixture catalog: three spreads, one per oracle type.
pub fn fixture_content() -> InMemoryContent {
    let spreads = vec![
        Spread {
            id: "tarot_3_ppf".to_string(),
            name: "Pasado, Presente, Futuro".to_string(),
            oracle: OracleType::Tarot,
            count: 3,
            positions: vec![
                "Pasado".to_string(),
                "Presente".to_string(),
                "Futuro".to_string(),
            ],
            description: Some("Lectura clásica de tres cartas".to_string()),
            layout: Some("linea".to_string()),
        },
        Spread {
            id: "iching_consulta".to_string(),
            name: "Consulta del I Ching".to_string(),
            oracle: OracleType::IChing,
            count: 1,
            positions: vec!["Consulta".to_string()],
            description: None,
            layout: None,
        },
        Spread {
            id: "rueda_astral".to_string(),
            name: "Rueda Astral".to_string(),
            oracle: OracleType::Rueda,
            count: 5,
            positions: vec![
                "Este".to_string(),
                "Sur".to_string(),
                "Oeste".to_string(),
                "Norte".to_string(),
                "Centro".to_string(),
            ],
            description: None,
            layout: Some("rueda".to_string()),
        },
    ];

    InMemoryContent::new(spreads, fixture_catalog())
}

/// Catalog slices big enough for every fixture spread.
pub fn fixture_catalog() -> Catalog {
    Catalog {
        tarot: [
            "El Loco",
            "El Mago",
            "La Sacerdotisa",
            "La Emperatriz",
            "El Emperador",
            "Los Enamorados",
            "El Carro",
            "La Fuerza",
            "El Ermitaño",
            "La Rueda de la Fortuna",
        ]
        .iter()
        .map(|name| TarotCard {
            name: (*name).to_string(),
            arcana: Some("mayor".to_string()),
            upright: format!("{} en posición derecha", name),
            reversed: format!("{} invertida", name),
            image: None,
        })
        .collect(),
        hexagrams: (1..=8)
            .map(|n| Hexagram {
                hex: n,
                name: format!("Hexagrama {}", n),
                advice: format!("Consejo del hexagrama {}", n),
                trigrams: None,
            })
            .collect(),
        animals: [
            "Águila", "Lobo", "Oso", "Búho", "Serpiente", "Ciervo", "Coyote",
        ]
        .iter()
        .map(|animal| TotemAnimal {
            animal: (*animal).to_string(),
            archetype: format!("Arquetipo de {}", animal),
            medicine: format!("Medicina de {}", animal),
            image: None,
        })
        .collect(),
    }
}

/// Service in test mode against a fresh in-memory database.
pub async fn test_service() -> FulfillmentService {
    test_service_with_config(FulfillmentConfig::for_tests()).await
}

/// Service with a custom configuration (still in-memory storage).
pub async fn test_service_with_config(config: FulfillmentConfig) -> FulfillmentService {
    init_tracing();

    let db = Database::new(DbConfig::in_memory())
        .await
        .expect("in-memory database");

    FulfillmentService::new(config, Arc::new(fixture_content()), db)
}

/// Service wired to an explicit gateway implementation.
pub async fn test_service_with_gateway(
    config: FulfillmentConfig,
    gateway: Arc<dyn PaymentGateway>,
) -> FulfillmentService {
    init_tracing();

    let db = Database::new(DbConfig::in_memory())
        .await
        .expect("in-memory database");

    FulfillmentService::with_gateway(config, Arc::new(fixture_content()), db, gateway)
}

/// Service in test mode over a caller-supplied catalog.
pub async fn test_service_with_content(content: InMemoryContent) -> FulfillmentService {
    init_tracing();

    let db = Database::new(DbConfig::in_memory())
        .await
        .expect("in-memory database");

    FulfillmentService::new(FulfillmentConfig::for_tests(), Arc::new(content), db)
}

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

// =============================================================================
// Scripted Gateways
// =============================================================================

/// Gateway that creates payments but declines every capture.
#[derive(Debug, Default)]
pub struct DecliningGateway;

#[async_trait]
impl PaymentGateway for DecliningGateway {
    fn name(&self) -> &'static str {
        "declining"
    }

    fn is_configured(&self) -> bool {
        true
    }

    async fn create_payment(&self, _order: &Order) -> GatewayResult<PaymentHandle> {
        Ok(PaymentHandle {
            provider_order_id: format!("DECLINE-{}", Uuid::new_v4()),
            approval_url: None,
        })
    }

    async fn capture_payment(&self, _reference: &str) -> GatewayResult<Capture> {
        Ok(Capture {
            confirmed: false,
            capture_id: None,
        })
    }
}

/// Gateway whose captures never finish inside any sane deadline.
#[derive(Debug, Default)]
pub struct StallingGateway;

#[async_trait]
impl PaymentGateway for StallingGateway {
    fn name(&self) -> &'static str {
        "stalling"
    }

    fn is_configured(&self) -> bool {
        true
    }

    async fn create_payment(&self, _order: &Order) -> GatewayResult<PaymentHandle> {
        Ok(PaymentHandle {
            provider_order_id: format!("STALL-{}", Uuid::new_v4()),
            approval_url: None,
        })
    }

    async fn capture_payment(&self, _reference: &str) -> GatewayResult<Capture> {
        tokio::time::sleep(std::time::Duration::from_secs(60)).await;
        Ok(Capture {
            confirmed: true,
            capture_id: None,
        })
    }
}
