//! Registered client storage.

use async_trait::async_trait;

use crate::AuthResult;
use crate::types::RegisteredClient;

/// Persistence for dynamically registered clients.
#[async_trait]
pub trait ClientStorage: Send + Sync {
    /// Stores a newly registered client. Client ids are server-generated
    /// UUIDs, so collisions are not expected; backends may overwrite.
    async fn store(&self, client: &RegisteredClient) -> AuthResult<()>;

    /// Looks up a client by its `client_id`.
    async fn find_by_client_id(&self, client_id: &str) -> AuthResult<Option<RegisteredClient>>;
}
