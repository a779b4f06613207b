//! Bearer token source

use async_trait::async_trait;
use parking_lot::RwLock;
use std::fmt::Debug;

/// Supplies the bearer token and the identity it belongs to
#[async_trait]
pub trait TokenProvider: Send + Sync + Debug {
    /// Current token, `None` when signed out
    async fn get_token(&self) -> Option<String>;

    /// Identity of the signed-in user, used to partition caches
    fn user_id(&self) -> Option<String>;
}

/// Fixed token that can be swapped or revoked at runtime
#[derive(Debug, Default)]
pub struct StaticTokenProvider {
    token: RwLock<Option<String>>,
    user_id: RwLock<Option<String>>,
}

impl StaticTokenProvider {
    /// Signed in as `user_id` with `token`
    #[must_use]
    pub fn new(token: impl Into<String>, user_id: impl Into<String>) -> Self {
        Self {
            token: RwLock::new(Some(token.into())),
            user_id: RwLock::new(Some(user_id.into())),
        }
    }

    /// Signed out
    #[inline]
    #[must_use]
    pub fn anonymous() -> Self {
        Self::default()
    }

    /// Switch to another user
    pub fn sign_in(&self, token: impl Into<String>, user_id: impl Into<String>) {
        *self.token.write() = Some(token.into());
        *self.user_id.write() = Some(user_id.into());
    }

    /// Drop the token (the identity is kept so caches stay partitioned)
    pub fn revoke(&self) {
        *self.token.write() = None;
    }
}

#[async_trait]
impl TokenProvider for StaticTokenProvider {
    async fn get_token(&self) -> Option<String> {
        self.token.read().clone()
    }

    fn user_id(&self) -> Option<String> {
        self.user_id.read().clone()
    }
}
