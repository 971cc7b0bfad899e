// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Login, logout and account registration.

use crate::error::Result;
use crate::models::{LoginRequest, RegisterRequest};
use crate::services::{ApiGateway, SessionStore};
use validator::Validate;

/// Authentication flows backed by the session store.
#[derive(Clone)]
pub struct AuthService {
    gateway: ApiGateway,
    session: SessionStore,
}

impl AuthService {
    pub fn new(gateway: ApiGateway, session: SessionStore) -> Self {
        Self { gateway, session }
    }

    /// Log in with email and password.
    ///
    /// Empty fields are rejected locally without contacting the backend.
    pub async fn login(&self, email: &str, password: &str) -> Result<()> {
        let credentials = LoginRequest {
            email: email.trim().to_string(),
            password: password.to_string(),
        };
        credentials.validate()?;

        self.session.login(&self.gateway, &credentials).await
    }

    /// Log out. Never fails.
    pub async fn logout(&self) {
        self.session.logout().await;
    }

    /// Create an account. Does not log in.
    pub async fn register(&self, request: &RegisterRequest) -> Result<()> {
        request.validate()?;

        let _: serde_json::Value = self.gateway.post("/users/register", request).await?;
        tracing::info!(email = %request.email, "Account registered");
        Ok(())
    }

    /// Create an account, then log in with the same credentials.
    pub async fn register_and_login(&self, request: &RegisterRequest) -> Result<()> {
        self.register(request).await?;
        self.session
            .login(&self.gateway, &request.credentials())
            .await
    }
}
