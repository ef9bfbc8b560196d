use std::sync::Arc;

use sentinel_core::error::AuthError;
use sentinel_db::store::{SessionStore, UserDirectory};

use crate::auth::authenticator::Authenticator;
use crate::auth::jwt::TokenCodec;
use crate::auth::service::AuthService;
use crate::config::ServerConfig;

/// Shared application state available to all Axum handlers via `State<AppState>`.
///
/// This is cheaply cloneable (inner data is behind `Arc`).
#[derive(Clone)]
pub struct AppState {
    /// Server configuration (cookie attributes, session policy).
    pub config: Arc<ServerConfig>,
    /// Session store, also queried directly by the health check.
    pub sessions: Arc<dyn SessionStore>,
    /// Login, logout, revocation and registration.
    pub auth: Arc<AuthService>,
    /// Per-request token and session check used by [`AuthUser`](crate::middleware::auth::AuthUser).
    pub authenticator: Arc<Authenticator>,
}

impl AppState {
    /// Wire the service and authenticator around one token codec.
    ///
    /// Fails only if the configured secret cannot be used for signing.
    pub fn new(
        config: ServerConfig,
        users: Arc<dyn UserDirectory>,
        sessions: Arc<dyn SessionStore>,
    ) -> Result<Self, AuthError> {
        let codec = Arc::new(TokenCodec::new(&config.jwt)?);
        let policy = config.session;

        let auth = AuthService::new(users, Arc::clone(&sessions), Arc::clone(&codec), policy);
        let authenticator = Authenticator::new(codec, Arc::clone(&sessions), policy);

        Ok(Self {
            config: Arc::new(config),
            sessions,
            auth: Arc::new(auth),
            authenticator: Arc::new(authenticator),
        })
    }
}
