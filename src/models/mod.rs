// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@kernel.org>

//! Wire models exchanged with the wardrobe backend.

pub mod auth;
pub mod inventory;
pub mod user;

pub use auth::{LoginRequest, LoginResponse, RegisterRequest};
pub use inventory::{InventoryItem, Product};
pub use user::{
    MeasuresUpdate, ProfilePatch, ProfilePhotoResponse, ProfilePhotoUpdate, UserProfile,
    UsernameUpdate,
};
