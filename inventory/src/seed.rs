//! Bootstrap catalog data.
//!
//! The catalog is read-only at runtime; these demo parts are inserted
//! once at startup.

use crate::error::InventoryError;
use crate::model::{Category, Dimensions, Manufacturer, MetadataValue, Part};
use crate::repository::PartRepository;
use chrono::Utc;
use std::collections::HashMap;
use uuid::Uuid;

/// Seed the store with the demo catalog.
///
/// # Errors
///
/// Propagates store failures.
pub async fn seed_parts(repo: &dyn PartRepository) -> Result<(), InventoryError> {
    let now = Utc::now();

    let parts = vec![
        Part {
            id: Uuid::new_v4(),
            name: "HyperDrive Engine Mk1".into(),
            description: "Primary hyperdrive for small spacecraft.".into(),
            price_cents: 12_500_050,
            stock_quantity: 10,
            category: Category::Engine,
            dimensions: Some(Dimensions {
                length_cm: 250.0,
                width_cm: 180.0,
                height_cm: 140.0,
                weight_kg: 3200.0,
            }),
            manufacturer: Some(Manufacturer {
                name: "Andromeda Drives Inc.".into(),
                country: "USA".into(),
                website: "https://andromeda-drives.example.com".into(),
            }),
            tags: vec!["engine".into(), "hyperdrive".into(), "mk1".into(), "small-ship".into()],
            metadata: HashMap::from([
                ("max_thrust_kn".into(), MetadataValue::Double(850.0)),
                ("warranty_years".into(), MetadataValue::Int(5)),
                ("military_grade".into(), MetadataValue::Bool(true)),
                ("fuel_type".into(), MetadataValue::Str("quantum-plasma".into())),
            ]),
            created_at: now,
            updated_at: now,
        },
        Part {
            id: Uuid::new_v4(),
            name: "Quantum Fuel Cell QF-200".into(),
            description: "Fuel cell for QF-series hyperdrives.".into(),
            price_cents: 780_000,
            stock_quantity: 120,
            category: Category::Fuel,
            dimensions: Some(Dimensions {
                length_cm: 80.0,
                width_cm: 40.0,
                height_cm: 35.0,
                weight_kg: 45.0,
            }),
            manufacturer: Some(Manufacturer {
                name: "Sirius Energy Systems".into(),
                country: "Germany".into(),
                website: "https://sirius-energy.example.com".into(),
            }),
            tags: vec!["fuel".into(), "quantum".into(), "cell".into(), "qf-series".into()],
            metadata: HashMap::from([
                ("capacity_kwh".into(), MetadataValue::Double(250.0)),
                (
                    "compatible_engine".into(),
                    MetadataValue::Str("HyperDrive Engine Mk1".into()),
                ),
                ("hazard_class".into(), MetadataValue::Int(3)),
            ]),
            created_at: now,
            updated_at: now,
        },
        Part {
            id: Uuid::new_v4(),
            name: "Panoramic Porthole PX-360".into(),
            description: "Panoramic porthole with a full 360 degree view.".into(),
            price_cents: 1_520_000,
            stock_quantity: 35,
            category: Category::Porthole,
            dimensions: Some(Dimensions {
                length_cm: 120.0,
                width_cm: 120.0,
                height_cm: 12.0,
                weight_kg: 65.0,
            }),
            manufacturer: Some(Manufacturer {
                name: "Orion Optics".into(),
                country: "Japan".into(),
                website: "https://orion-optics.example.com".into(),
            }),
            tags: vec!["porthole".into(), "glass".into(), "panoramic".into(), "px-360".into()],
            metadata: HashMap::from([
                ("glass_type".into(), MetadataValue::Str("triplex-titanium".into())),
                ("max_pressure_bar".into(), MetadataValue::Double(120.0)),
                ("radiation_protection".into(), MetadataValue::Bool(true)),
            ]),
            created_at: now,
            updated_at: now,
        },
    ];

    repo.create_batch(parts).await
}
