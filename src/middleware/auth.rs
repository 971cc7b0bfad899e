// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Bearer token middleware.

use crate::error::Result;
use crate::services::{Dispatched, SessionStore};
use reqwest::RequestBuilder;

/// Attach the session's current token as a bearer credential.
///
/// Requests without a session (login, register) go out anonymously. Returns
/// the token that was attached.
pub fn attach_bearer(
    request: RequestBuilder,
    session: &SessionStore,
) -> (RequestBuilder, Option<String>) {
    match session.token() {
        Some(token) => (request.bearer_auth(&token), Some(token)),
        None => (request, None),
    }
}

/// End the session when the backend rejects its token, then hand the result back.
///
/// Only the token the request actually carried is expired; a session
/// established while the request was in flight survives.
pub async fn expire_on_auth_failure<T>(session: &SessionStore, dispatched: Dispatched<T>) -> Result<T> {
    let Dispatched { result, token } = dispatched;
    if let (Err(e), Some(token)) = (&result, token.as_deref()) {
        if e.is_auth_failure() {
            session.expire(token, &e.to_string()).await;
        }
    }
    result
}
