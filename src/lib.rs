// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@kernel.org>

//! Wardrobe client: session handling and typed access to the wardrobe backend
//!
//! This crate provides the client core of the wardrobe/try-on app: a session
//! store that keeps the bearer token in durable storage, a gateway that
//! attaches it to every backend call, and services for the account,
//! profile and inventory endpoints.

pub mod config;
pub mod error;
pub mod middleware;
pub mod models;
pub mod services;
pub mod storage;

use config::Config;
use error::Result;
use services::{AccountService, ApiGateway, AuthService, InventoryService, SessionStore};
use storage::KeyValueStore;

/// Shared application state.
///
/// Every service holds clones of the same session store and gateway.
pub struct AppState {
    pub config: Config,
    pub session: SessionStore,
    pub gateway: ApiGateway,
    pub auth: AuthService,
    pub account: AccountService,
    pub inventory: InventoryService,
}

impl AppState {
    /// Wire the session, gateway and services on top of `store`.
    ///
    /// The session starts in `Loading`; call `session.initialize()` next.
    pub fn new(config: Config, store: KeyValueStore) -> Result<Self> {
        let session = SessionStore::new(store);
        let gateway = ApiGateway::new(&config, session.clone())?;

        Ok(Self {
            auth: AuthService::new(gateway.clone(), session.clone()),
            account: AccountService::new(gateway.clone(), session.clone()),
            inventory: InventoryService::new(gateway.clone(), session.clone()),
            config,
            session,
            gateway,
        })
    }

    /// State persisted to the configured session file.
    pub fn with_file_store(config: Config) -> Result<Self> {
        let store = KeyValueStore::new_file(config.session_file());
        Self::new(config, store)
    }
}
