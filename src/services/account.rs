// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Profile mutations: username, body measures and profile photo.
//!
//! Each successful mutation is mirrored into the session's user profile so
//! callers see server state without refetching.

use crate::error::{ApiError, Result};
use crate::middleware::expire_on_auth_failure;
use crate::models::{
    MeasuresUpdate, ProfilePatch, ProfilePhotoResponse, ProfilePhotoUpdate, UsernameUpdate,
};
use crate::services::{ApiGateway, SessionStore};
use reqwest::Method;
use validator::Validate;

/// Account profile operations for the signed-in user.
#[derive(Clone)]
pub struct AccountService {
    gateway: ApiGateway,
    session: SessionStore,
}

impl AccountService {
    pub fn new(gateway: ApiGateway, session: SessionStore) -> Self {
        Self { gateway, session }
    }

    /// Change the display name. Returns the trimmed name that was saved.
    pub async fn update_username(&self, name: &str) -> Result<String> {
        let body = UsernameUpdate {
            name: name.trim().to_string(),
        };
        body.validate()
            .map_err(|_| ApiError::InvalidInput("username must not be empty".to_string()))?;

        self.patch("/users/me/username", &body).await?;

        self.session.update_profile(ProfilePatch {
            name: Some(body.name.clone()),
            ..Default::default()
        });
        Ok(body.name)
    }

    /// Replace all four body measures.
    pub async fn update_measures(&self, measures: MeasuresUpdate) -> Result<()> {
        measures.validate()?;

        self.patch("/users/me/measures", &measures).await?;

        self.session.update_profile(measures.into());
        tracing::debug!("Measures updated");
        Ok(())
    }

    /// Fetch the profile photo URL and mirror it into the session.
    pub async fn profile_photo(&self) -> Result<Option<String>> {
        let dispatched = self
            .gateway
            .dispatch::<Option<ProfilePhotoResponse>, ()>(Method::GET, "/users/me/profile-photo", None)
            .await;
        let url = expire_on_auth_failure(&self.session, dispatched)
            .await?
            .and_then(|r| r.profile_photo_url);

        if url.is_some() {
            self.session.update_profile(ProfilePatch {
                profile_photo_url: url.clone(),
                ..Default::default()
            });
        }
        Ok(url)
    }

    /// Point the profile photo at an already-uploaded image.
    pub async fn update_profile_photo(&self, url: &str) -> Result<()> {
        let body = ProfilePhotoUpdate {
            profile_photo_url: url.trim().to_string(),
        };
        body.validate()
            .map_err(|_| ApiError::InvalidInput("photo URL must not be empty".to_string()))?;

        self.patch("/users/me/profile-photo", &body).await?;

        self.session.update_profile(ProfilePatch {
            profile_photo_url: Some(body.profile_photo_url),
            ..Default::default()
        });
        Ok(())
    }

    async fn patch<B: serde::Serialize>(&self, path: &str, body: &B) -> Result<()> {
        let dispatched = self
            .gateway
            .dispatch::<serde_json::Value, B>(Method::PATCH, path, Some(body))
            .await;
        expire_on_auth_failure(&self.session, dispatched).await?;
        Ok(())
    }
}
