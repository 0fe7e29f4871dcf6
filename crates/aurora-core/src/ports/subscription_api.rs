use async_trait::async_trait;

use crate::api::{
    ApiClientError, StatusReport, SubscribeRequest, UnsubscribeRequest, UpdatePreferencesRequest,
};
use crate::session::SubscriberId;

/// Remote subscription backend. No retries, no client-side timeouts.
#[async_trait]
pub trait SubscriptionApiPort: Send + Sync {
    async fn subscribe(&self, request: &SubscribeRequest) -> Result<SubscriberId, ApiClientError>;

    async fn unsubscribe(&self, request: &UnsubscribeRequest) -> Result<(), ApiClientError>;

    async fn status(&self) -> Result<StatusReport, ApiClientError>;

    async fn update_preferences(
        &self,
        token: &str,
        request: &UpdatePreferencesRequest,
    ) -> Result<(), ApiClientError>;
}
