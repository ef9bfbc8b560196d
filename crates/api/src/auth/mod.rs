//! Session-backed authentication.
//!
//! - [`jwt`] -- token codec (mint / verify).
//! - [`password`] -- Argon2id hashing and verification.
//! - [`service`] -- login, logout, revocation, registration.
//! - [`authenticator`] -- the per-request accept/reject decision.
//! - [`cookie`] -- reading and issuing the auth cookie.

pub mod authenticator;
pub mod cookie;
pub mod jwt;
pub mod password;
pub mod service;

#[cfg(test)]
pub(crate) mod testing;

use std::future::Future;
use std::time::Duration;

use sentinel_core::error::{AuthError, CoreError};
use sentinel_db::store::StoreError;

/// Lifetime and store deadline shared by the service and the authenticator.
#[derive(Debug, Clone, Copy)]
pub struct SessionPolicy {
    /// Lifetime of both the token and its session row.
    pub ttl: chrono::Duration,
    /// Upper bound on any single store call.
    pub store_timeout: Duration,
}

impl Default for SessionPolicy {
    fn default() -> Self {
        Self {
            ttl: chrono::Duration::hours(24),
            store_timeout: Duration::from_secs(5),
        }
    }
}

/// Run a store call under a deadline, translating store failures.
pub(crate) async fn with_deadline<T, F>(limit: Duration, call: F) -> Result<T, AuthError>
where
    F: Future<Output = Result<T, StoreError>>,
{
    match tokio::time::timeout(limit, call).await {
        Ok(Ok(value)) => Ok(value),
        Ok(Err(err)) => Err(store_error(err)),
        Err(_) => Err(AuthError::StoreUnavailable(format!(
            "deadline of {}ms exceeded",
            limit.as_millis()
        ))),
    }
}

fn store_error(err: StoreError) -> AuthError {
    match err {
        StoreError::Conflict(constraint) => CoreError::Conflict(constraint).into(),
        StoreError::Unavailable(msg) => AuthError::StoreUnavailable(msg),
    }
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;

    use super::*;

    #[tokio::test]
    async fn deadline_passes_values_through() {
        let value = with_deadline(Duration::from_secs(1), async { Ok::<_, StoreError>(7) }).await;
        assert_eq!(value.unwrap(), 7);
    }

    #[tokio::test]
    async fn elapsed_deadline_is_store_unavailable() {
        let slow = async {
            tokio::time::sleep(Duration::from_millis(200)).await;
            Ok::<_, StoreError>(())
        };
        let result = with_deadline(Duration::from_millis(10), slow).await;
        assert_matches!(result, Err(AuthError::StoreUnavailable(msg)) if msg.contains("10ms"));
    }

    #[tokio::test]
    async fn store_errors_are_classified() {
        let conflict = with_deadline(Duration::from_secs(1), async {
            Err::<(), _>(StoreError::Conflict("uq_users_email".into()))
        })
        .await;
        assert_matches!(conflict, Err(AuthError::Core(CoreError::Conflict(_))));

        let down = with_deadline(Duration::from_secs(1), async {
            Err::<(), _>(StoreError::Unavailable("connection refused".into()))
        })
        .await;
        assert_matches!(down, Err(AuthError::StoreUnavailable(_)));
    }
}
