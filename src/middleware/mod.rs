// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Request middleware composed into the gateway's call path.

pub mod auth;

pub use auth::{attach_bearer, expire_on_auth_failure};
