//! In-memory storage backend.
//!
//! One struct implements all three storage traits, backed by mutex-guarded
//! maps. Suitable for tests and single-node deployments; state is lost on
//! restart.

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;
use time::OffsetDateTime;

use crate::types::{AuthorizationCode, RegisteredClient};
use crate::{AuthError, AuthResult};

use super::{AuthorizationCodeStorage, ClientStorage, RevokedTokenStorage};

/// In-memory implementation of all authorization storage traits.
#[derive(Default)]
pub struct MemoryAuthStorage {
    clients: Mutex<HashMap<String, RegisteredClient>>,
    codes: Mutex<HashMap<String, AuthorizationCode>>,
    revoked: Mutex<HashMap<String, OffsetDateTime>>,
}

impl MemoryAuthStorage {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock<'a, T>(mutex: &'a Mutex<T>) -> AuthResult<std::sync::MutexGuard<'a, T>> {
        mutex
            .lock()
            .map_err(|_| AuthError::storage("storage lock poisoned"))
    }
}

#[async_trait]
impl ClientStorage for MemoryAuthStorage {
    async fn store(&self, client: &RegisteredClient) -> AuthResult<()> {
        Self::lock(&self.clients)?.insert(client.client_id.clone(), client.clone());
        Ok(())
    }

    async fn find_by_client_id(&self, client_id: &str) -> AuthResult<Option<RegisteredClient>> {
        Ok(Self::lock(&self.clients)?.get(client_id).cloned())
    }
}

#[async_trait]
impl AuthorizationCodeStorage for MemoryAuthStorage {
    async fn store(&self, code: &AuthorizationCode) -> AuthResult<bool> {
        let mut codes = Self::lock(&self.codes)?;
        if codes.contains_key(&code.code) {
            return Ok(false);
        }
        codes.insert(code.code.clone(), code.clone());
        Ok(true)
    }

    async fn consume(&self, code: &str) -> AuthResult<Option<AuthorizationCode>> {
        // Removal under the lock is the atomicity guarantee: one winner.
        // An expired record is removed but never handed back.
        Ok(Self::lock(&self.codes)?
            .remove(code)
            .filter(|record| !record.is_expired()))
    }

    async fn cleanup_expired(&self) -> AuthResult<u64> {
        let now = OffsetDateTime::now_utc();
        let mut codes = Self::lock(&self.codes)?;
        let before = codes.len();
        codes.retain(|_, record| record.expires_at > now);
        Ok((before - codes.len()) as u64)
    }
}

#[async_trait]
impl RevokedTokenStorage for MemoryAuthStorage {
    async fn revoke(&self, jti: &str, expires_at: OffsetDateTime) -> AuthResult<()> {
        Self::lock(&self.revoked)?
            .entry(jti.to_string())
            .or_insert(expires_at);
        Ok(())
    }

    async fn is_revoked(&self, jti: &str) -> AuthResult<bool> {
        Ok(Self::lock(&self.revoked)?.contains_key(jti))
    }

    async fn cleanup_expired(&self) -> AuthResult<u64> {
        let now = OffsetDateTime::now_utc();
        let mut revoked = Self::lock(&self.revoked)?;
        let before = revoked.len();
        revoked.retain(|_, expires_at| *expires_at > now);
        Ok((before - revoked.len()) as u64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use time::Duration;

    fn code(value: &str, expires_in: Duration) -> AuthorizationCode {
        let now = OffsetDateTime::now_utc();
        AuthorizationCode {
            code: value.to_string(),
            client_id: "client-1".to_string(),
            redirect_uri: "https://agent.example.com/callback".to_string(),
            code_challenge: "challenge".to_string(),
            code_challenge_method: "S256".to_string(),
            user_id: "user-1".to_string(),
            email: None,
            scope: "agent:access".to_string(),
            expires_at: now + expires_in,
            created_at: now,
        }
    }

    #[tokio::test]
    async fn test_client_store_and_lookup() {
        let storage = MemoryAuthStorage::new();
        let client = RegisteredClient {
            client_id: "client-1".to_string(),
            redirect_uris: vec!["https://agent.example.com/callback".to_string()],
            client_name: "Agent".to_string(),
            grant_types: vec![
                "authorization_code".to_string(),
                "refresh_token".to_string(),
            ],
            response_types: vec!["code".to_string()],
            scope: None,
            token_endpoint_auth_method: "none".to_string(),
            created_at: OffsetDateTime::now_utc(),
        };
        ClientStorage::store(&storage, &client).await.unwrap();

        let found = storage.find_by_client_id("client-1").await.unwrap().unwrap();
        assert_eq!(found.client_name, "Agent");
        assert!(storage.find_by_client_id("missing").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_consume_is_single_use() {
        let storage = MemoryAuthStorage::new();
        AuthorizationCodeStorage::store(&storage, &code("abc", Duration::minutes(10)))
            .await
            .unwrap();

        assert!(storage.consume("abc").await.unwrap().is_some());
        assert!(storage.consume("abc").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_concurrent_consume_single_winner() {
        let storage = Arc::new(MemoryAuthStorage::new());
        AuthorizationCodeStorage::store(storage.as_ref(), &code("abc", Duration::minutes(10)))
            .await
            .unwrap();

        let mut handles = Vec::new();
        for _ in 0..16 {
            let storage = Arc::clone(&storage);
            handles.push(tokio::spawn(
                async move { storage.consume("abc").await.unwrap() },
            ));
        }

        let mut winners = 0;
        for handle in handles {
            if handle.await.unwrap().is_some() {
                winners += 1;
            }
        }
        assert_eq!(winners, 1);
    }

    #[tokio::test]
    async fn test_consume_drops_expired_record() {
        let storage = MemoryAuthStorage::new();
        AuthorizationCodeStorage::store(&storage, &code("old", Duration::seconds(-5)))
            .await
            .unwrap();

        // The expired record is burned, not returned.
        assert!(storage.consume("old").await.unwrap().is_none());
        assert!(storage.consume("old").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_store_rejects_duplicate_code() {
        let storage = MemoryAuthStorage::new();
        let first = code("abc", Duration::minutes(10));
        assert!(AuthorizationCodeStorage::store(&storage, &first).await.unwrap());

        let mut second = code("abc", Duration::minutes(10));
        second.user_id = "user-2".to_string();
        assert!(!AuthorizationCodeStorage::store(&storage, &second).await.unwrap());

        // The original record survives the collision.
        let record = storage.consume("abc").await.unwrap().unwrap();
        assert_eq!(record.user_id, "user-1");
    }

    #[tokio::test]
    async fn test_cleanup_sweeps_only_expired_codes() {
        let storage = MemoryAuthStorage::new();
        AuthorizationCodeStorage::store(&storage, &code("live", Duration::minutes(10)))
            .await
            .unwrap();
        AuthorizationCodeStorage::store(&storage, &code("dead", Duration::seconds(-5)))
            .await
            .unwrap();

        let swept = AuthorizationCodeStorage::cleanup_expired(&storage)
            .await
            .unwrap();
        assert_eq!(swept, 1);
        assert!(storage.consume("live").await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_revocation_set() {
        let storage = MemoryAuthStorage::new();
        let future = OffsetDateTime::now_utc() + Duration::hours(1);

        assert!(!storage.is_revoked("jti-1").await.unwrap());
        storage.revoke("jti-1", future).await.unwrap();
        assert!(storage.is_revoked("jti-1").await.unwrap());
        // Idempotent.
        storage.revoke("jti-1", future).await.unwrap();
        assert!(storage.is_revoked("jti-1").await.unwrap());
    }

    #[tokio::test]
    async fn test_revocation_cleanup() {
        let storage = MemoryAuthStorage::new();
        let now = OffsetDateTime::now_utc();
        storage.revoke("dead", now - Duration::minutes(1)).await.unwrap();
        storage.revoke("live", now + Duration::hours(1)).await.unwrap();

        let swept = RevokedTokenStorage::cleanup_expired(&storage).await.unwrap();
        assert_eq!(swept, 1);
        assert!(!storage.is_revoked("dead").await.unwrap());
        assert!(storage.is_revoked("live").await.unwrap());
    }
}
