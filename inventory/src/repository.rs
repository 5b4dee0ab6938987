//! In-memory parts store.
//!
//! A read-write-locked map seeded once at bootstrap. Readers get deep
//! copies, so nothing a caller holds aliases the store's mutable
//! substructures. Each stored part keeps the canonical form of its
//! manufacturer country next to the raw value, and filter matching runs
//! against the canonical form.

use crate::error::InventoryError;
use crate::model::{normalize_country, Part, PartsFilter};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::RwLock;
use uuid::Uuid;

/// Parts persistence seam.
#[async_trait]
pub trait PartRepository: Send + Sync {
    /// Load one part; missing maps to [`InventoryError::PartNotFound`].
    async fn part_by_id(&self, id: Uuid) -> Result<Part, InventoryError>;
    /// List the parts matching `filter`; an empty result is not an
    /// error.
    async fn list(&self, filter: &PartsFilter) -> Result<Vec<Part>, InventoryError>;
    /// Insert a batch of parts (bootstrap seeding).
    async fn create_batch(&self, parts: Vec<Part>) -> Result<(), InventoryError>;
}

struct StoredPart {
    part: Part,
    country_norm: Option<String>,
}

impl StoredPart {
    fn new(part: Part) -> Self {
        let country_norm = part
            .manufacturer
            .as_ref()
            .map(|m| normalize_country(&m.country));
        Self { part, country_norm }
    }

    fn matches(&self, filter: &PartsFilter) -> bool {
        if !filter.ids.is_empty() && !filter.ids.contains(&self.part.id) {
            return false;
        }
        if !filter.names.is_empty() && !filter.names.contains(&self.part.name) {
            return false;
        }
        if !filter.categories.is_empty() && !filter.categories.contains(&self.part.category) {
            return false;
        }
        if !filter.manufacturer_countries.is_empty() {
            let Some(norm) = &self.country_norm else {
                return false;
            };
            if !filter
                .manufacturer_countries
                .iter()
                .any(|c| normalize_country(c) == *norm)
            {
                return false;
            }
        }
        if !filter.tags.is_empty()
            && !filter.tags.iter().any(|t| self.part.tags.contains(t))
        {
            return false;
        }
        true
    }
}

/// RwLock-guarded map store.
#[derive(Default)]
pub struct InMemoryPartRepository {
    parts: RwLock<HashMap<Uuid, StoredPart>>,
}

impl InMemoryPartRepository {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl PartRepository for InMemoryPartRepository {
    async fn part_by_id(&self, id: Uuid) -> Result<Part, InventoryError> {
        let parts = self.parts.read().expect("parts store poisoned");
        parts
            .get(&id)
            .map(|stored| stored.part.clone())
            .ok_or(InventoryError::PartNotFound)
    }

    async fn list(&self, filter: &PartsFilter) -> Result<Vec<Part>, InventoryError> {
        let parts = self.parts.read().expect("parts store poisoned");
        let mut out: Vec<Part> = parts
            .values()
            .filter(|stored| stored.matches(filter))
            .map(|stored| stored.part.clone())
            .collect();
        // Map iteration order is arbitrary; keep responses stable.
        out.sort_by_key(|p| p.id);
        Ok(out)
    }

    async fn create_batch(&self, new_parts: Vec<Part>) -> Result<(), InventoryError> {
        let mut parts = self.parts.write().expect("parts store poisoned");
        for part in new_parts {
            if part.id.is_nil() {
                return Err(InventoryError::InvalidArgument(
                    "part id must be non-nil".into(),
                ));
            }
            parts.insert(part.id, StoredPart::new(part));
        }
        Ok(())
    }
}
