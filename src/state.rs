use anyhow::Context;
use tracing::{debug, info};

use crate::auth::access::AccessPolicy;
use crate::auth::jwt::verify_token;
use crate::auth::password::hash_password;
use crate::config::Config;
use crate::fixtures::Fixtures;
use crate::models::{Claims, TokenType};
use crate::storage::Storage;
use crate::store::AppStore;
use crate::utils::revoked_tokens::RevokedTokens;

/// Everything the workers share, registered once as `web::Data<AppState>`.
pub struct AppState {
    pub config: Config,
    pub store: AppStore,
    pub policy: AccessPolicy,
    pub revoked: RevokedTokens,
}

impl AppState {
    pub fn new(config: Config, store: AppStore) -> Self {
        let policy = AccessPolicy::new(config.public_routes.clone());
        let revoked = RevokedTokens::new(config.refresh_token_ttl as u64);

        Self {
            config,
            store,
            policy,
            revoked,
        }
    }

    /// Seeds the store with the demo data; every demo account shares
    /// `config.demo_password`.
    pub fn from_config(config: Config) -> anyhow::Result<Self> {
        let hash = hash_password(&config.demo_password)
            .map_err(|e| anyhow::anyhow!("hashing the demo password failed: {e}"))?;
        let seed = Fixtures::load(&hash).context("loading fixtures")?;

        let storage = Storage::from_config(config.data_dir.as_deref());
        info!(persistent = storage.is_enabled(), "Opening store");

        Ok(Self::new(config, AppStore::new(storage, seed)))
    }

    /// Claims of a usable token of the `expected` kind: decodes, is not
    /// expired and was not revoked.
    pub async fn session_claims(&self, token: &str, expected: TokenType) -> Option<Claims> {
        let claims = match verify_token(
            token,
            &self.config.jwt_secret,
            self.config.verify_token_signature,
        ) {
            Ok(c) => c,
            Err(e) => {
                debug!(error = %e, "Rejected token");
                return None;
            }
        };

        if claims.token_type != expected {
            debug!(jti = %claims.jti, "Wrong token type");
            return None;
        }
        if self.revoked.is_revoked(&claims.jti).await {
            debug!(jti = %claims.jti, "Revoked token");
            return None;
        }
        Some(claims)
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    use std::sync::LazyLock;

    use actix_web::web::Data;

    use super::*;

    pub const DEMO_PASSWORD: &str = "password123";

    static DEMO_HASH: LazyLock<String> =
        LazyLock::new(|| hash_password(DEMO_PASSWORD).expect("hash demo password"));

    pub fn state() -> Data<AppState> {
        state_with(Config::default())
    }

    pub fn state_with(config: Config) -> Data<AppState> {
        let seed = Fixtures::load(&DEMO_HASH).unwrap();
        Data::new(AppState::new(config, AppStore::new(Storage::disabled(), seed)))
    }
}

#[cfg(test)]
mod tests {
    use super::test_support::state;
    use super::*;
    use crate::auth::jwt::{generate_access_token, generate_refresh_token};

    #[actix_web::test]
    async fn session_claims_checks_kind_and_revocation() {
        let state = state();
        let user = state.store.user(9).unwrap();
        let secret = state.config.jwt_secret.clone();

        let (access, claims) = generate_access_token(&user, &secret, 60).unwrap();
        let (refresh, _) = generate_refresh_token(&user, &secret, 60).unwrap();

        assert!(state.session_claims(&access, TokenType::Access).await.is_some());
        assert!(state.session_claims(&refresh, TokenType::Access).await.is_none());
        assert!(state.session_claims("junk", TokenType::Access).await.is_none());

        state.revoked.revoke(&claims.jti).await;
        assert!(state.session_claims(&access, TokenType::Access).await.is_none());
    }
}
