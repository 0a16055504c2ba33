//! Forwarded-identity extraction.
//!
//! Authentication happens upstream; the proxy injects the acting user via
//! `x-actor-id`, `x-actor-email`, and `x-actor-role` headers. This module
//! only materializes that context and enforces the admin capability on the
//! routes that require it.

use axum::async_trait;
use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use axum::http::StatusCode;
use axum::Json;
use serde_json::{json, Value};

use super::directory::{AccountType, UserId};

pub const ACTOR_ID_HEADER: &str = "x-actor-id";
pub const ACTOR_EMAIL_HEADER: &str = "x-actor-email";
pub const ACTOR_ROLE_HEADER: &str = "x-actor-role";

/// The authenticated user as asserted by the upstream auth layer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActorContext {
    pub id: UserId,
    pub email: String,
    pub account_type: AccountType,
}

impl ActorContext {
    pub fn is_admin(&self) -> bool {
        self.account_type.is_admin()
    }
}

fn actor_from_parts(parts: &Parts) -> Option<ActorContext> {
    let header = |name: &str| {
        parts
            .headers
            .get(name)
            .and_then(|value| value.to_str().ok())
            .map(str::trim)
            .filter(|value| !value.is_empty())
    };

    let id = header(ACTOR_ID_HEADER)?;
    let email = header(ACTOR_EMAIL_HEADER)?;
    let account_type = AccountType::parse(header(ACTOR_ROLE_HEADER)?)?;

    Some(ActorContext {
        id: UserId(id.to_string()),
        email: email.to_string(),
        account_type,
    })
}

/// Extractor for admin-only handlers; rejects with 401 when no actor is
/// forwarded and 403 when the actor lacks the admin capability.
#[derive(Debug, Clone)]
pub struct AdminActor(pub ActorContext);

#[async_trait]
impl<S> FromRequestParts<S> for AdminActor
where
    S: Send + Sync,
{
    type Rejection = (StatusCode, Json<Value>);

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let actor = actor_from_parts(parts).ok_or((
            StatusCode::UNAUTHORIZED,
            Json(json!({ "success": false, "message": "authentication required" })),
        ))?;

        if !actor.is_admin() {
            return Err((
                StatusCode::FORBIDDEN,
                Json(json!({ "success": false, "message": "admin capability required" })),
            ));
        }

        Ok(Self(actor))
    }
}

/// Extractor for public handlers that behave differently when a known user
/// submits the request (e.g. enquiry intake creating a companion
/// enrollment).
#[derive(Debug, Clone)]
pub struct MaybeActor(pub Option<ActorContext>);

#[async_trait]
impl<S> FromRequestParts<S> for MaybeActor
where
    S: Send + Sync,
{
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(Self(actor_from_parts(parts)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::Request;

    fn parts_with(headers: &[(&str, &str)]) -> Parts {
        let mut builder = Request::builder().uri("/");
        for (name, value) in headers {
            builder = builder.header(*name, *value);
        }
        builder.body(()).expect("request builds").into_parts().0
    }

    #[tokio::test]
    async fn admin_actor_rejects_missing_headers() {
        let mut parts = parts_with(&[(ACTOR_ID_HEADER, "u-9")]);
        let rejection = AdminActor::from_request_parts(&mut parts, &())
            .await
            .expect_err("incomplete context rejected");
        assert_eq!(rejection.0, StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn admin_actor_rejects_students() {
        let mut parts = parts_with(&[
            (ACTOR_ID_HEADER, "u-9"),
            (ACTOR_EMAIL_HEADER, "kid@example.com"),
            (ACTOR_ROLE_HEADER, "Student"),
        ]);
        let rejection = AdminActor::from_request_parts(&mut parts, &())
            .await
            .expect_err("student rejected");
        assert_eq!(rejection.0, StatusCode::FORBIDDEN);
    }

    #[tokio::test]
    async fn admin_actor_accepts_super_admins() {
        let mut parts = parts_with(&[
            (ACTOR_ID_HEADER, "u-1"),
            (ACTOR_EMAIL_HEADER, "root@example.com"),
            (ACTOR_ROLE_HEADER, "superadmin"),
        ]);
        let AdminActor(actor) = AdminActor::from_request_parts(&mut parts, &())
            .await
            .expect("super admin accepted");
        assert_eq!(actor.account_type, AccountType::SuperAdmin);
    }

    #[tokio::test]
    async fn maybe_actor_is_none_without_headers() {
        let mut parts = parts_with(&[]);
        let MaybeActor(actor) = MaybeActor::from_request_parts(&mut parts, &())
            .await
            .expect("infallible");
        assert!(actor.is_none());
    }
}
