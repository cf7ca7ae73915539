//! Azure backend: resource types, the backend trait and the `az` CLI client

pub mod client;
pub mod types;

pub use client::AzCliClient;
pub use types::*;

use async_trait::async_trait;

use crate::Result;

/// Remote operations the exemption wizard depends on
#[async_trait]
pub trait Backend: Send + Sync {
    async fn list_subscriptions(&self) -> Result<Vec<Subscription>>;

    async fn list_assignments(&self, subscription_id: &str) -> Result<Vec<PolicyAssignment>>;

    /// Empty when the assignment is not a policy set
    async fn list_assignment_definitions(
        &self,
        assignment: &PolicyAssignment,
    ) -> Result<Vec<PolicyDefinitionRef>>;

    async fn list_resource_groups(&self, subscription_id: &str) -> Result<Vec<ResourceGroup>>;

    /// Returns the raw output of the create call
    async fn create_exemption(&self, request: &ExemptionRequest) -> Result<String>;
}
