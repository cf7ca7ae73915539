//! Runs wizard operations off the UI loop
//!
//! Each [`Operation`] becomes one background task that sends exactly one
//! [`AppEvent::Completed`] back to the app loop, success or failure.

use std::sync::Arc;

use tokio::sync::mpsc::UnboundedSender;
use tokio::task::JoinHandle;
use tracing::{debug, warn};

use super::events::{AppEvent, Completion, Operation};
use crate::azure::Backend;

/// Dispatches operations to the backend and reports completions
#[derive(Clone)]
pub struct Gateway {
    backend: Arc<dyn Backend>,
    events: UnboundedSender<AppEvent>,
}

impl Gateway {
    pub fn new(backend: Arc<dyn Backend>, events: UnboundedSender<AppEvent>) -> Self {
        Self { backend, events }
    }

    /// Spawn the operation and return the task handle
    pub fn dispatch(&self, op: Operation) -> JoinHandle<()> {
        let backend = Arc::clone(&self.backend);
        let events = self.events.clone();
        debug!("Dispatching {}", op.name());

        tokio::spawn(async move {
            let name = op.name();
            let completion = execute(backend.as_ref(), op).await;
            if completion.is_err() {
                warn!("Operation {} failed", name);
            }
            if events.send(AppEvent::Completed(completion)).is_err() {
                debug!("Dropped {} completion, app loop has exited", name);
            }
        })
    }
}

/// Run one operation to completion against the backend
pub async fn execute(backend: &dyn Backend, op: Operation) -> Completion {
    match op {
        Operation::ListSubscriptions => {
            Completion::SubscriptionsLoaded(backend.list_subscriptions().await)
        }
        Operation::ListAssignments { subscription } => {
            Completion::AssignmentsLoaded(backend.list_assignments(subscription.short_id()).await)
        }
        Operation::ListDefinitions { assignment } => {
            Completion::DefinitionsLoaded(backend.list_assignment_definitions(&assignment).await)
        }
        Operation::ListResourceGroups { subscription } => {
            Completion::ResourceGroupsLoaded(backend.list_resource_groups(subscription.short_id()).await)
        }
        Operation::CreateExemption(request) => {
            Completion::ExemptionCreated(backend.create_exemption(&request).await)
        }
    }
}
