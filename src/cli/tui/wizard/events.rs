use ratatui::crossterm::event::KeyEvent;
use tui_input::InputRequest;

use crate::azure::{
    ExemptionRequest, PolicyAssignment, PolicyDefinitionRef, ResourceGroup, Subscription,
};
use crate::Result;

/// All possible events in the application loop
#[derive(Debug)]
pub enum AppEvent {
    // Input events
    Key(KeyEvent),
    Resize(u16, u16),

    // Async operation results
    Completed(Completion),

    // UI events
    Tick, // drives the loading spinner
}

/// Events the wizard state machine reacts to
#[derive(Debug)]
pub enum WizardEvent {
    Input(UserInput),
    Completed(Completion),
}

/// Terminal-independent user intent
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UserInput {
    Up,
    Down,
    Toggle,
    Confirm,
    Quit,
    /// Edit applied to the focused text field
    Edit(InputRequest),
}

/// Outcome of an [`Operation`], tagged with the operation that produced it
#[derive(Debug)]
pub enum Completion {
    SubscriptionsLoaded(Result<Vec<Subscription>>),
    AssignmentsLoaded(Result<Vec<PolicyAssignment>>),
    DefinitionsLoaded(Result<Vec<PolicyDefinitionRef>>),
    ResourceGroupsLoaded(Result<Vec<ResourceGroup>>),
    ExemptionCreated(Result<String>),
}

impl Completion {
    pub fn name(&self) -> &'static str {
        match self {
            Completion::SubscriptionsLoaded(_) => "subscriptions-loaded",
            Completion::AssignmentsLoaded(_) => "assignments-loaded",
            Completion::DefinitionsLoaded(_) => "definitions-loaded",
            Completion::ResourceGroupsLoaded(_) => "resource-groups-loaded",
            Completion::ExemptionCreated(_) => "exemption-created",
        }
    }

    pub fn is_err(&self) -> bool {
        match self {
            Completion::SubscriptionsLoaded(r) => r.is_err(),
            Completion::AssignmentsLoaded(r) => r.is_err(),
            Completion::DefinitionsLoaded(r) => r.is_err(),
            Completion::ResourceGroupsLoaded(r) => r.is_err(),
            Completion::ExemptionCreated(r) => r.is_err(),
        }
    }
}

/// Remote work requested by the state machine
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Operation {
    ListSubscriptions,
    ListAssignments { subscription: Subscription },
    ListDefinitions { assignment: PolicyAssignment },
    ListResourceGroups { subscription: Subscription },
    CreateExemption(ExemptionRequest),
}

impl Operation {
    pub fn name(&self) -> &'static str {
        match self {
            Operation::ListSubscriptions => "list-subscriptions",
            Operation::ListAssignments { .. } => "list-assignments",
            Operation::ListDefinitions { .. } => "list-definitions",
            Operation::ListResourceGroups { .. } => "list-resource-groups",
            Operation::CreateExemption(_) => "create-exemption",
        }
    }
}

/// What the app loop must do after a transition
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    None,
    Run(Operation),
    Quit,
}
