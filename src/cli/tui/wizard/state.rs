use std::collections::HashSet;

use chrono::{Days, Local, NaiveDate};
use once_cell::sync::Lazy;
use regex::Regex;
use tui_input::Input;

use crate::azure::{
    ExemptionCategory, ExemptionRequest, PolicyAssignment, PolicyDefinitionRef, ResourceGroup,
    Subscription,
};
use crate::config::Settings;
use crate::ExemptError;

/// Choices offered at [`Step::AssignmentScope`]
pub const SCOPE_OPTIONS: [&str; 2] = ["Exempt entire assignment", "Exempt specific definitions"];

/// Choices offered at [`Step::ExpirationChoice`]
pub const EXPIRATION_OPTIONS: [&str; 2] = ["Unlimited (No expiration)", "Set expiration date"];

pub const DATE_FORMAT: &str = "%Y-%m-%d";

static DATE_SHAPE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\d{4}-\d{2}-\d{2}$").expect("valid date pattern"));

/// Wizard steps, in the order they are visited
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Step {
    LoadingSubscriptions,
    SelectSubscription,
    LoadingAssignments,
    SelectAssignment,
    LoadingDefinitions,
    AssignmentScope,
    SelectDefinitions,
    LoadingResourceGroups,
    SelectResourceGroup,
    Ticket,
    Users,
    ExpirationChoice,
    ExpirationDate,
    Confirm,
    Creating,
    Done,
    Error,
}

impl Step {
    /// Get the name of the step
    pub fn name(&self) -> &'static str {
        match self {
            Step::LoadingSubscriptions => "Loading subscriptions",
            Step::SelectSubscription => "Subscription",
            Step::LoadingAssignments => "Loading assignments",
            Step::SelectAssignment => "Assignment",
            Step::LoadingDefinitions => "Loading definitions",
            Step::AssignmentScope => "Exemption scope",
            Step::SelectDefinitions => "Definitions",
            Step::LoadingResourceGroups => "Loading resource groups",
            Step::SelectResourceGroup => "Target scope",
            Step::Ticket => "Ticket",
            Step::Users => "Requesters",
            Step::ExpirationChoice => "Expiration",
            Step::ExpirationDate => "Expiration date",
            Step::Confirm => "Confirm",
            Step::Creating => "Creating",
            Step::Done => "Done",
            Step::Error => "Error",
        }
    }

    /// Steps waiting on a remote operation
    pub fn is_loading(&self) -> bool {
        matches!(
            self,
            Step::LoadingSubscriptions
                | Step::LoadingAssignments
                | Step::LoadingDefinitions
                | Step::LoadingResourceGroups
                | Step::Creating
        )
    }

    /// Steps where keystrokes edit a text field
    pub fn is_text_entry(&self) -> bool {
        matches!(self, Step::Ticket | Step::Users | Step::ExpirationDate)
    }

    /// Only quit is accepted once the wizard has finished
    pub fn is_terminal(&self) -> bool {
        matches!(self, Step::Done | Step::Error)
    }
}

/// The single owned aggregate the wizard mutates
#[derive(Debug)]
pub struct WizardState {
    pub step: Step,
    /// Guidance or validation message for the current step
    pub status: String,
    pub error: Option<ExemptError>,

    // Remote data, as fetched
    pub subscriptions: Vec<Subscription>,
    pub assignments: Vec<PolicyAssignment>,
    pub definitions: Vec<PolicyDefinitionRef>,
    /// Index 0 is always the whole-subscription entry once loaded
    pub resource_groups: Vec<ResourceGroup>,

    // Selection state
    pub cursor: usize,
    pub selected_subscription: Option<usize>,
    pub selected_assignment: Option<usize>,
    pub selected_resource_group: Option<usize>,
    /// Reference ids of the definitions chosen for a partial exemption
    pub selected_definitions: HashSet<String>,
    pub partial: bool,

    // Text fields being edited
    pub ticket_input: Input,
    pub users_input: Input,
    pub expiration_input: Input,

    // Committed values
    pub ticket: String,
    pub requesters: String,
    /// Empty means no expiration
    pub expiration_date: String,

    pub create_output: String,

    pub today: NaiveDate,
    pub default_expiration_days: u32,
    pub category: ExemptionCategory,
}

impl Default for WizardState {
    fn default() -> Self {
        Self::new(&Settings::default())
    }
}

impl WizardState {
    pub fn new(settings: &Settings) -> Self {
        Self {
            step: Step::LoadingSubscriptions,
            status: String::new(),
            error: None,
            subscriptions: Vec::new(),
            assignments: Vec::new(),
            definitions: Vec::new(),
            resource_groups: Vec::new(),
            cursor: 0,
            selected_subscription: None,
            selected_assignment: None,
            selected_resource_group: None,
            selected_definitions: HashSet::new(),
            partial: false,
            ticket_input: Input::default(),
            users_input: Input::default(),
            expiration_input: Input::default(),
            ticket: String::new(),
            requesters: String::new(),
            expiration_date: String::new(),
            create_output: String::new(),
            today: Local::now().date_naive(),
            default_expiration_days: settings.default_expiration_days,
            category: settings.exemption_category,
        }
    }

    pub fn current_subscription(&self) -> Option<&Subscription> {
        self.selected_subscription
            .and_then(|i| self.subscriptions.get(i))
    }

    pub fn current_assignment(&self) -> Option<&PolicyAssignment> {
        self.selected_assignment.and_then(|i| self.assignments.get(i))
    }

    pub fn current_resource_group(&self) -> Option<&ResourceGroup> {
        self.selected_resource_group
            .and_then(|i| self.resource_groups.get(i))
    }

    /// Number of entries the cursor moves over at the current step
    pub fn option_count(&self) -> usize {
        match self.step {
            Step::SelectSubscription => self.subscriptions.len(),
            Step::SelectAssignment => self.assignments.len(),
            Step::AssignmentScope => SCOPE_OPTIONS.len(),
            Step::SelectDefinitions => self.definitions.len(),
            Step::SelectResourceGroup => self.resource_groups.len(),
            Step::ExpirationChoice => EXPIRATION_OPTIONS.len(),
            _ => 0,
        }
    }

    pub fn move_up(&mut self) {
        self.cursor = self.cursor.saturating_sub(1);
    }

    pub fn move_down(&mut self) {
        if self.cursor + 1 < self.option_count() {
            self.cursor += 1;
        }
    }

    /// Add or remove the definition under the cursor from the partial selection
    pub fn toggle_definition(&mut self) {
        let Some(def) = self.definitions.get(self.cursor) else {
            return;
        };
        if !self.selected_definitions.remove(&def.reference_id) {
            self.selected_definitions.insert(def.reference_id.clone());
        }
    }

    pub fn is_definition_selected(&self, def: &PolicyDefinitionRef) -> bool {
        self.selected_definitions.contains(&def.reference_id)
    }

    /// Selected reference ids in display order
    pub fn selected_reference_ids(&self) -> Vec<String> {
        self.definitions
            .iter()
            .filter(|d| self.selected_definitions.contains(&d.reference_id))
            .map(|d| d.reference_id.clone())
            .collect()
    }

    /// Definitions chosen for a partial exemption, in display order
    pub fn selected_definition_refs(&self) -> impl Iterator<Item = &PolicyDefinitionRef> {
        self.definitions
            .iter()
            .filter(|d| self.selected_definitions.contains(&d.reference_id))
    }

    /// Pre-filled expiration: today plus the configured offset
    pub fn default_expiration(&self) -> NaiveDate {
        self.today
            .checked_add_days(Days::new(u64::from(self.default_expiration_days)))
            .unwrap_or(self.today)
    }

    /// Build the create request, or `None` while a required value is missing
    pub fn exemption_request(&self) -> Option<ExemptionRequest> {
        self.current_subscription()?;
        let assignment = self.current_assignment()?;
        let scope = self.current_resource_group()?;
        if self.ticket.is_empty() || self.requesters.is_empty() {
            return None;
        }
        if self.partial && self.selected_definitions.is_empty() {
            return None;
        }

        let expires_on = if self.expiration_date.is_empty() {
            None
        } else {
            Some(parse_expiration_date(&self.expiration_date)?)
        };

        Some(ExemptionRequest {
            scope: scope.id.clone(),
            assignment: assignment.clone(),
            reference_ids: if self.partial {
                self.selected_reference_ids()
            } else {
                Vec::new()
            },
            ticket: self.ticket.clone(),
            requesters: self.requesters.clone(),
            expires_on,
            category: self.category,
        })
    }
}

/// Strict `YYYY-MM-DD` that must also be a real calendar date
pub fn parse_expiration_date(value: &str) -> Option<NaiveDate> {
    if !DATE_SHAPE.is_match(value) {
        return None;
    }
    NaiveDate::parse_from_str(value, DATE_FORMAT).ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_expiration_date() {
        assert_eq!(
            parse_expiration_date("2024-06-15"),
            NaiveDate::from_ymd_opt(2024, 6, 15)
        );
        assert_eq!(parse_expiration_date("2024-02-30"), None);
        assert_eq!(parse_expiration_date("2024-6-15"), None);
        assert_eq!(parse_expiration_date("15/06/2024"), None);
        assert_eq!(parse_expiration_date(""), None);
    }

    #[test]
    fn test_default_expiration_offset() {
        let mut state = WizardState::default();
        state.today = NaiveDate::from_ymd_opt(2024, 1, 31).unwrap();
        assert_eq!(
            state.default_expiration(),
            NaiveDate::from_ymd_opt(2024, 3, 1).unwrap()
        );
    }

    #[test]
    fn test_initial_state() {
        let state = WizardState::default();
        assert_eq!(state.step, Step::LoadingSubscriptions);
        assert_eq!(state.selected_subscription, None);
        assert_eq!(state.selected_assignment, None);
        assert_eq!(state.selected_resource_group, None);
        assert!(state.selected_definitions.is_empty());
        assert!(!state.partial);
        assert!(state.exemption_request().is_none());
    }

    #[test]
    fn test_step_classification() {
        assert!(Step::Creating.is_loading());
        assert!(!Step::Confirm.is_loading());
        assert!(Step::ExpirationDate.is_text_entry());
        assert!(!Step::ExpirationChoice.is_text_entry());
        assert!(Step::Error.is_terminal());
    }
}
