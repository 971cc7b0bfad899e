// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Inventory collection access.

use crate::error::Result;
use crate::middleware::expire_on_auth_failure;
use crate::models::InventoryItem;
use crate::services::{ApiGateway, SessionStore};
use reqwest::Method;

/// Inventory operations for the signed-in user.
#[derive(Clone)]
pub struct InventoryService {
    gateway: ApiGateway,
    session: SessionStore,
}

impl InventoryService {
    pub fn new(gateway: ApiGateway, session: SessionStore) -> Self {
        Self { gateway, session }
    }

    /// List every inventory entry.
    pub async fn list(&self) -> Result<Vec<InventoryItem>> {
        let dispatched = self
            .gateway
            .dispatch::<Option<Vec<InventoryItem>>, ()>(Method::GET, "/inventory", None)
            .await;
        let items = expire_on_auth_failure(&self.session, dispatched)
            .await?
            .unwrap_or_default();

        tracing::debug!(count = items.len(), "Inventory loaded");
        Ok(items)
    }

    /// Remove a product from the inventory.
    pub async fn remove(&self, product_id: u64) -> Result<()> {
        let path = format!("/inventory/{}", product_id);
        let dispatched = self
            .gateway
            .dispatch::<serde_json::Value, ()>(Method::DELETE, &path, None)
            .await;
        expire_on_auth_failure(&self.session, dispatched).await?;

        tracing::info!(product_id, "Product removed from inventory");
        Ok(())
    }

    /// Drop every entry for `product_id` from a locally held list.
    pub fn without_product(items: Vec<InventoryItem>, product_id: u64) -> Vec<InventoryItem> {
        items
            .into_iter()
            .filter(|item| item.product.id != product_id)
            .collect()
    }
}
