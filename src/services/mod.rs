// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Services module - session, gateway and backend operations.

pub mod account;
pub mod auth;
pub mod gateway;
pub mod inventory;
pub mod session;

pub use account::AccountService;
pub use auth::AuthService;
pub use gateway::{ApiGateway, Dispatched};
pub use inventory::InventoryService;
pub use session::{Session, SessionStatus, SessionStore};
