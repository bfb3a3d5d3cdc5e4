use async_trait::async_trait;

use crate::domain::errors::DomainResult;
use crate::domain::models::Credentials;

/// Source of results-store credentials, read once per ingestion.
#[async_trait]
pub trait CredentialsSource: Send + Sync {
    async fn load(&self) -> DomainResult<Credentials>;
}
