//! Durable local cart for anonymous sessions.

use std::sync::{PoisonError, RwLock};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::warn;

use vivarium_core::{CartLineId, Price, ProductId, StoreId};

use crate::storage::{StorageBackend, keys};

/// Status tag carried on local cart lines.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum CartLineStatus {
    #[default]
    Active,
}

/// One locally captured cart line.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CartLine {
    /// Synthetic id, milliseconds since the epoch at creation time.
    pub id: CartLineId,
    /// The product this line holds.
    pub product_id: ProductId,
    /// The storefront selling the product.
    pub store_id: StoreId,
    /// Units of the product. Always at least 1.
    pub quantity: u32,
    /// Unit price at the moment the line was captured.
    pub unit_price: Price,
    /// Line status tag.
    pub status: CartLineStatus,
    /// When the line was created.
    pub created_at: DateTime<Utc>,
    /// When the line was last touched.
    pub updated_at: DateTime<Utc>,
}

/// Durable, reload-surviving cart for anonymous users.
///
/// Pure local state plus storage I/O; this store never talks to the
/// network. Every mutation persists the full line sequence synchronously.
/// Storage write failures are logged and swallowed: the in-memory lines
/// stay authoritative for the session but will not survive a reload.
pub struct LocalCartStore {
    storage: Box<dyn StorageBackend>,
    lines: RwLock<Vec<CartLine>>,
}

impl LocalCartStore {
    /// Open the store, restoring any persisted lines.
    ///
    /// Malformed or unreadable storage yields an empty cart, never an
    /// error.
    #[must_use]
    pub fn open(storage: Box<dyn StorageBackend>) -> Self {
        let lines = Self::load(storage.as_ref());

        Self {
            storage,
            lines: RwLock::new(lines),
        }
    }

    fn load(storage: &dyn StorageBackend) -> Vec<CartLine> {
        let raw = match storage.get(keys::CART_LINES) {
            Ok(Some(raw)) => raw,
            Ok(None) => return Vec::new(),
            Err(error) => {
                warn!(%error, "failed to read stored cart; starting empty");
                return Vec::new();
            }
        };

        match serde_json::from_str(&raw) {
            Ok(lines) => lines,
            Err(error) => {
                warn!(%error, "failed to parse stored cart; starting empty");
                Vec::new()
            }
        }
    }

    /// Snapshot of the current lines, in insertion order.
    #[must_use]
    pub fn lines(&self) -> Vec<CartLine> {
        self.lines
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Whether the cart holds no lines.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lines
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .is_empty()
    }

    /// Add one unit of a product.
    ///
    /// If a line for `product_id` already exists its quantity goes up by
    /// one and its updated timestamp is refreshed; otherwise a new line is
    /// appended with quantity 1. Returns the affected line.
    pub fn add_or_increment(
        &self,
        product_id: ProductId,
        store_id: StoreId,
        unit_price: Price,
    ) -> CartLine {
        let line = {
            let mut lines = self.lines.write().unwrap_or_else(PoisonError::into_inner);

            if let Some(existing) = lines.iter_mut().find(|line| line.product_id == product_id) {
                existing.quantity += 1;
                existing.updated_at = Utc::now();
                existing.clone()
            } else {
                let now = Utc::now();
                let line = CartLine {
                    id: next_line_id(&lines, now),
                    product_id,
                    store_id,
                    quantity: 1,
                    unit_price,
                    status: CartLineStatus::Active,
                    created_at: now,
                    updated_at: now,
                };
                lines.push(line.clone());
                line
            }
        };

        self.persist();
        line
    }

    /// Overwrite a line's quantity.
    ///
    /// A quantity below 1 is rejected silently; the UI prevents it and
    /// this layer just guards against corrupting the line.
    pub fn update_quantity(&self, line_id: CartLineId, new_quantity: u32) {
        if new_quantity < 1 {
            return;
        }

        let changed = {
            let mut lines = self.lines.write().unwrap_or_else(PoisonError::into_inner);
            match lines.iter_mut().find(|line| line.id == line_id) {
                Some(line) => {
                    line.quantity = new_quantity;
                    line.updated_at = Utc::now();
                    true
                }
                None => false,
            }
        };

        if changed {
            self.persist();
        }
    }

    /// Delete a line.
    pub fn remove(&self, line_id: CartLineId) {
        {
            let mut lines = self.lines.write().unwrap_or_else(PoisonError::into_inner);
            lines.retain(|line| line.id != line_id);
        }

        self.persist();
    }

    /// Delete every line.
    pub fn clear(&self) {
        {
            let mut lines = self.lines.write().unwrap_or_else(PoisonError::into_inner);
            lines.clear();
        }

        self.persist();
    }

    fn persist(&self) {
        let raw = {
            let lines = self.lines.read().unwrap_or_else(PoisonError::into_inner);
            serde_json::to_string(&*lines)
        };

        match raw {
            Ok(raw) => {
                if let Err(error) = self.storage.set(keys::CART_LINES, &raw) {
                    warn!(%error, "failed to persist cart; lines will not survive reload");
                }
            }
            Err(error) => {
                warn!(%error, "failed to encode cart; lines will not survive reload");
            }
        }
    }
}

/// Next synthetic line id: the current time in milliseconds, bumped past
/// the newest existing id so two lines created in the same millisecond
/// still get distinct, increasing ids.
fn next_line_id(lines: &[CartLine], now: DateTime<Utc>) -> CartLineId {
    let now_ms = now.timestamp_millis();
    let floor = lines
        .iter()
        .map(|line| line.id.as_i64())
        .max()
        .map_or(i64::MIN, |max| max + 1);

    CartLineId::new(now_ms.max(floor))
}
