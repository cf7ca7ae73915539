//! Step transitions of the exemption wizard
//!
//! `WizardState::update` is the only place the wizard advances. It consumes
//! one event, mutates the state in place and returns at most one follow-up
//! [`Operation`] for the gateway. Entering a `Loading*` step or `Creating`
//! always returns exactly one operation; nothing else schedules work.

use tracing::debug;
use tui_input::Input;

use super::events::{Completion, Effect, Operation, UserInput, WizardEvent};
use super::state::{parse_expiration_date, Step, WizardState, DATE_FORMAT};
use crate::azure::ResourceGroup;
use crate::ExemptError;

impl WizardState {
    /// Kick off the wizard by fetching subscriptions
    pub fn start(&mut self) -> Effect {
        self.step = Step::LoadingSubscriptions;
        self.status = "Retrieving subscriptions via Azure CLI...".to_string();
        Effect::Run(Operation::ListSubscriptions)
    }

    /// Apply one event
    pub fn update(&mut self, event: WizardEvent) -> Effect {
        let before = self.step;
        let effect = match event {
            WizardEvent::Input(UserInput::Quit) => Effect::Quit,
            WizardEvent::Input(input) => self.handle_input(input),
            WizardEvent::Completed(completion) => self.handle_completion(completion),
        };
        if before != self.step {
            debug!("Wizard step {:?} -> {:?}", before, self.step);
        }
        if let Effect::Run(op) = &effect {
            debug!("Scheduling {}", op.name());
        }
        effect
    }

    fn fail(&mut self, err: ExemptError) -> Effect {
        debug!("Wizard failed at {:?}: {}", self.step, err);
        self.error = Some(err);
        self.step = Step::Error;
        self.status.clear();
        Effect::None
    }

    fn handle_completion(&mut self, completion: Completion) -> Effect {
        let expected = match &completion {
            Completion::SubscriptionsLoaded(_) => Step::LoadingSubscriptions,
            Completion::AssignmentsLoaded(_) => Step::LoadingAssignments,
            Completion::DefinitionsLoaded(_) => Step::LoadingDefinitions,
            Completion::ResourceGroupsLoaded(_) => Step::LoadingResourceGroups,
            Completion::ExemptionCreated(_) => Step::Creating,
        };
        if self.step != expected {
            debug!(
                "Ignoring {} while at {:?}",
                completion.name(),
                self.step
            );
            return Effect::None;
        }

        match completion {
            Completion::SubscriptionsLoaded(result) => {
                let subscriptions = match result {
                    Ok(subs) if subs.is_empty() => return self.fail(ExemptError::NoSubscriptions),
                    Ok(subs) => subs,
                    Err(e) => return self.fail(e),
                };
                self.subscriptions = subscriptions;
                self.cursor = 0;
                self.selected_subscription = None;
                self.step = Step::SelectSubscription;
                self.status =
                    "Use ↑/↓ to highlight a subscription and press Enter to continue.".to_string();
                Effect::None
            }

            Completion::AssignmentsLoaded(result) => {
                let assignments = match result {
                    Ok(assignments) if assignments.is_empty() => {
                        let (name, short_id) = self
                            .current_subscription()
                            .map(|s| (s.name.clone(), s.short_id().to_string()))
                            .unwrap_or_default();
                        return self.fail(ExemptError::NoAssignments { name, short_id });
                    }
                    Ok(assignments) => assignments,
                    Err(e) => return self.fail(e),
                };
                self.assignments = assignments;
                self.selected_assignment = None;
                self.definitions.clear();
                self.selected_definitions.clear();
                self.partial = false;
                self.cursor = 0;
                self.step = Step::SelectAssignment;
                self.status =
                    "Use ↑/↓ to highlight an assignment and press Enter to continue.".to_string();
                Effect::None
            }

            Completion::DefinitionsLoaded(result) => {
                let definitions = match result {
                    Ok(definitions) => definitions,
                    Err(e) => return self.fail(e),
                };
                self.definitions = definitions;
                self.selected_definitions.clear();
                self.partial = false;
                if self.definitions.len() > 1 {
                    self.cursor = 0;
                    self.step = Step::AssignmentScope;
                    self.status =
                        "Exempt entire assignment or select specific definitions?".to_string();
                    Effect::None
                } else {
                    self.load_resource_groups()
                }
            }

            Completion::ResourceGroupsLoaded(result) => {
                let groups = match result {
                    Ok(groups) => groups,
                    Err(e) => return self.fail(e),
                };
                let Some(subscription) = self.current_subscription() else {
                    return self.fail(ExemptError::NoSubscriptions);
                };
                let mut resource_groups = Vec::with_capacity(groups.len() + 1);
                resource_groups.push(ResourceGroup::entire_subscription(subscription));
                resource_groups.extend(groups);

                self.resource_groups = resource_groups;
                self.selected_resource_group = None;
                self.cursor = 0;
                self.step = Step::SelectResourceGroup;
                self.status =
                    "Select the scope for the exemption (Subscription or Resource Group)."
                        .to_string();
                Effect::None
            }

            Completion::ExemptionCreated(result) => {
                match result {
                    Ok(output) => {
                        self.create_output = output;
                        self.step = Step::Done;
                        self.status =
                            "Exemption created successfully. Press q to exit.".to_string();
                    }
                    Err(e) => return self.fail(e),
                }
                Effect::None
            }
        }
    }

    fn load_resource_groups(&mut self) -> Effect {
        let Some(subscription) = self.current_subscription().cloned() else {
            return self.fail(ExemptError::NoSubscriptions);
        };
        self.step = Step::LoadingResourceGroups;
        self.status = "Loading resource groups...".to_string();
        Effect::Run(Operation::ListResourceGroups { subscription })
    }

    fn handle_input(&mut self, input: UserInput) -> Effect {
        if self.step.is_text_entry() {
            return self.handle_text_input(input);
        }

        match input {
            UserInput::Up => {
                self.move_up();
                Effect::None
            }
            UserInput::Down => {
                self.move_down();
                Effect::None
            }
            UserInput::Toggle => {
                if self.step == Step::SelectDefinitions {
                    self.toggle_definition();
                }
                Effect::None
            }
            UserInput::Confirm => self.confirm(),
            UserInput::Edit(_) | UserInput::Quit => Effect::None,
        }
    }

    fn confirm(&mut self) -> Effect {
        match self.step {
            Step::SelectSubscription => {
                let Some(subscription) = self.subscriptions.get(self.cursor).cloned() else {
                    return Effect::None;
                };
                self.selected_subscription = Some(self.cursor);
                self.step = Step::LoadingAssignments;
                self.status = format!("Fetching policy assignments for {}...", subscription.name);
                Effect::Run(Operation::ListAssignments { subscription })
            }

            Step::SelectAssignment => {
                let Some(assignment) = self.assignments.get(self.cursor).cloned() else {
                    return Effect::None;
                };
                self.selected_assignment = Some(self.cursor);
                self.step = Step::LoadingDefinitions;
                self.status = format!(
                    "Fetching assignment details for {}...",
                    assignment.display_label()
                );
                Effect::Run(Operation::ListDefinitions { assignment })
            }

            Step::AssignmentScope => {
                if self.cursor == 0 {
                    self.partial = false;
                    self.selected_definitions.clear();
                    return self.load_resource_groups();
                }
                self.partial = true;
                self.cursor = 0;
                self.step = Step::SelectDefinitions;
                self.status =
                    "Select definitions to exempt (space to toggle, Enter to continue).".to_string();
                Effect::None
            }

            Step::SelectDefinitions => {
                if self.definitions.is_empty() {
                    return Effect::None;
                }
                if self.selected_definitions.is_empty() {
                    self.status =
                        "Select at least one definition or choose full assignment.".to_string();
                    return Effect::None;
                }
                self.load_resource_groups()
            }

            Step::SelectResourceGroup => {
                if self.cursor >= self.resource_groups.len() {
                    return Effect::None;
                }
                self.selected_resource_group = Some(self.cursor);
                self.step = Step::Ticket;
                self.ticket_input = Input::default();
                self.status =
                    "Provide the tracking ticket number linked to this exemption:".to_string();
                Effect::None
            }

            Step::ExpirationChoice => {
                if self.cursor == 0 {
                    self.expiration_date.clear();
                    self.step = Step::Confirm;
                    self.status =
                        "Review the summary and press Enter to create the exemption.".to_string();
                } else {
                    self.step = Step::ExpirationDate;
                    self.expiration_input = Input::new(
                        self.default_expiration().format(DATE_FORMAT).to_string(),
                    );
                    self.status = "Enter expiration date (YYYY-MM-DD):".to_string();
                }
                Effect::None
            }

            Step::Confirm => match self.exemption_request() {
                Some(request) => {
                    self.step = Step::Creating;
                    self.status = "Creating Azure Policy exemption...".to_string();
                    Effect::Run(Operation::CreateExemption(request))
                }
                None => {
                    self.status = "Missing information. Use q to abort.".to_string();
                    Effect::None
                }
            },

            // Loading steps and finished wizards only accept quit
            Step::LoadingSubscriptions
            | Step::LoadingAssignments
            | Step::LoadingDefinitions
            | Step::LoadingResourceGroups
            | Step::Creating
            | Step::Done
            | Step::Error => Effect::None,

            // Handled by handle_text_input
            Step::Ticket | Step::Users | Step::ExpirationDate => Effect::None,
        }
    }

    fn handle_text_input(&mut self, input: UserInput) -> Effect {
        match input {
            UserInput::Edit(request) => {
                let field = match self.step {
                    Step::Ticket => &mut self.ticket_input,
                    Step::Users => &mut self.users_input,
                    _ => &mut self.expiration_input,
                };
                field.handle(request);
                Effect::None
            }
            UserInput::Confirm => {
                self.submit_text();
                Effect::None
            }
            UserInput::Up | UserInput::Down | UserInput::Toggle | UserInput::Quit => Effect::None,
        }
    }

    fn submit_text(&mut self) {
        match self.step {
            Step::Ticket => {
                let value = self.ticket_input.value().trim().to_string();
                if value.is_empty() {
                    self.status = "A ticket number is required.".to_string();
                    return;
                }
                self.ticket = value;
                self.step = Step::Users;
                self.users_input = Input::default();
                self.status =
                    "Who is requesting this exemption? Provide one or more names.".to_string();
            }
            Step::Users => {
                let value = self.users_input.value().trim().to_string();
                if value.is_empty() {
                    self.status = "At least one requester name is required.".to_string();
                    return;
                }
                self.requesters = value;
                self.cursor = 0;
                self.step = Step::ExpirationChoice;
                self.status = "Set an expiration date for this exemption?".to_string();
            }
            Step::ExpirationDate => {
                let value = self.expiration_input.value().trim().to_string();
                if value.is_empty() {
                    self.status = "Expiration date is required.".to_string();
                    return;
                }
                if parse_expiration_date(&value).is_none() {
                    self.status = "Invalid date format. Please use YYYY-MM-DD.".to_string();
                    return;
                }
                self.expiration_date = value;
                self.step = Step::Confirm;
                self.status =
                    "Review the summary and press Enter to create the exemption.".to_string();
            }
            _ => {}
        }
    }
}
