use azexempt::azure::{
    ExemptionCategory, PolicyAssignment, PolicyDefinitionRef, ResourceGroup, Subscription,
};
use azexempt::cli::tui::wizard::events::{Completion, Effect, Operation, UserInput, WizardEvent};
use azexempt::cli::tui::wizard::state::{Step, WizardState};
use azexempt::ExemptError;
use chrono::NaiveDate;
use pretty_assertions::assert_eq;
use tui_input::InputRequest;

fn prod() -> Subscription {
    Subscription::new("/subscriptions/a", "Prod")
}

fn assignment(name: &str, definition_id: &str) -> PolicyAssignment {
    PolicyAssignment {
        id: format!("/subscriptions/a/providers/Microsoft.Authorization/policyAssignments/{}", name),
        name: name.to_string(),
        display_name: Some(format!("{} display", name)),
        scope: "/subscriptions/a".to_string(),
        policy_definition_id: definition_id.to_string(),
    }
}

fn definition(reference_id: &str) -> PolicyDefinitionRef {
    PolicyDefinitionRef {
        policy_definition_id: format!(
            "/providers/Microsoft.Authorization/policyDefinitions/{}",
            reference_id
        ),
        reference_id: reference_id.to_string(),
        display_name: format!("Definition {}", reference_id),
    }
}

fn input(state: &mut WizardState, input: UserInput) -> Effect {
    state.update(WizardEvent::Input(input))
}

fn complete(state: &mut WizardState, completion: Completion) -> Effect {
    state.update(WizardEvent::Completed(completion))
}

fn type_text(state: &mut WizardState, text: &str) {
    for c in text.chars() {
        input(state, UserInput::Edit(InputRequest::InsertChar(c)));
    }
}

/// Drive the wizard to `SelectAssignment` for the `Prod` subscription
fn at_assignments(assignments: Vec<PolicyAssignment>) -> WizardState {
    let mut state = WizardState::default();
    state.start();
    complete(&mut state, Completion::SubscriptionsLoaded(Ok(vec![prod()])));
    input(&mut state, UserInput::Confirm);
    complete(&mut state, Completion::AssignmentsLoaded(Ok(assignments)));
    state
}

/// Drive the wizard through a multi-definition set up to `AssignmentScope`
fn at_scope_choice() -> WizardState {
    let mut state = at_assignments(vec![assignment(
        "set",
        "/providers/Microsoft.Authorization/policySetDefinitions/s1",
    )]);
    input(&mut state, UserInput::Confirm);
    complete(
        &mut state,
        Completion::DefinitionsLoaded(Ok(vec![definition("r1"), definition("r2"), definition("r3")])),
    );
    state
}

#[test]
fn test_subscriptions_loaded() {
    let mut state = WizardState::default();
    assert_eq!(state.start(), Effect::Run(Operation::ListSubscriptions));

    let effect = complete(&mut state, Completion::SubscriptionsLoaded(Ok(vec![prod()])));
    assert_eq!(effect, Effect::None);
    assert_eq!(state.step, Step::SelectSubscription);
    assert_eq!(state.subscriptions.len(), 1);
    assert_eq!(state.subscriptions[0].name, "Prod");
    assert_eq!(state.subscriptions[0].short_id(), "a");
    assert!(!state.status.is_empty());
}

#[test]
fn test_empty_subscriptions_is_error() {
    let mut state = WizardState::default();
    state.start();
    complete(&mut state, Completion::SubscriptionsLoaded(Ok(vec![])));
    assert_eq!(state.step, Step::Error);
    assert!(matches!(state.error, Some(ExemptError::NoSubscriptions)));
}

#[test]
fn test_empty_assignments_error_names_subscription() {
    let state = at_assignments(vec![]);
    assert_eq!(state.step, Step::Error);
    let message = state.error.as_ref().map(|e| e.to_string()).unwrap_or_default();
    assert!(message.contains("Prod"), "unexpected message: {}", message);
    assert!(message.contains("(a)"));
}

#[test]
fn test_backend_failure_is_terminal() {
    let mut state = WizardState::default();
    state.start();
    complete(
        &mut state,
        Completion::SubscriptionsLoaded(Err(ExemptError::AzCommand {
            command: "account list".into(),
            stderr: "Please run 'az login'".into(),
        })),
    );
    assert_eq!(state.step, Step::Error);

    for event in [UserInput::Confirm, UserInput::Down, UserInput::Toggle, UserInput::Up] {
        assert_eq!(input(&mut state, event), Effect::None);
        assert_eq!(state.step, Step::Error);
    }
    assert_eq!(input(&mut state, UserInput::Quit), Effect::Quit);
}

#[test]
fn test_cursor_clamped_at_both_ends() {
    let mut state = WizardState::default();
    state.start();
    complete(
        &mut state,
        Completion::SubscriptionsLoaded(Ok(vec![
            prod(),
            Subscription::new("/subscriptions/b", "Test"),
            Subscription::new("/subscriptions/c", "Dev"),
        ])),
    );

    input(&mut state, UserInput::Up);
    assert_eq!(state.cursor, 0);
    for _ in 0..5 {
        input(&mut state, UserInput::Down);
    }
    assert_eq!(state.cursor, 2);
    input(&mut state, UserInput::Up);
    assert_eq!(state.cursor, 1);
}

#[test]
fn test_small_definition_sets_skip_selection() {
    for definitions in [vec![], vec![definition("only")]] {
        let mut state = at_assignments(vec![assignment(
            "a1",
            "/providers/Microsoft.Authorization/policyDefinitions/p1",
        )]);
        assert_eq!(
            input(&mut state, UserInput::Confirm),
            Effect::Run(Operation::ListDefinitions {
                assignment: state.assignments[0].clone(),
            })
        );

        let effect = complete(&mut state, Completion::DefinitionsLoaded(Ok(definitions)));
        assert_eq!(
            effect,
            Effect::Run(Operation::ListResourceGroups { subscription: prod() })
        );
        assert_eq!(state.step, Step::LoadingResourceGroups);
        assert!(!state.partial);
        assert!(state.selected_definitions.is_empty());
    }
}

#[test]
fn test_large_definition_set_asks_for_scope() {
    let mut state = at_scope_choice();
    assert_eq!(state.step, Step::AssignmentScope);
    assert_eq!(state.cursor, 0);

    // Entire assignment
    let effect = input(&mut state, UserInput::Confirm);
    assert!(matches!(effect, Effect::Run(Operation::ListResourceGroups { .. })));
    assert!(!state.partial);
    assert!(state.selected_definitions.is_empty());
}

#[test]
fn test_partial_selection_requires_a_definition() {
    let mut state = at_scope_choice();
    input(&mut state, UserInput::Down);
    assert_eq!(input(&mut state, UserInput::Confirm), Effect::None);
    assert_eq!(state.step, Step::SelectDefinitions);
    assert!(state.partial);

    assert_eq!(input(&mut state, UserInput::Confirm), Effect::None);
    assert_eq!(state.step, Step::SelectDefinitions);
    assert_eq!(
        state.status,
        "Select at least one definition or choose full assignment."
    );
}

#[test]
fn test_toggle_twice_is_idempotent() {
    let mut state = at_scope_choice();
    input(&mut state, UserInput::Down);
    input(&mut state, UserInput::Confirm);

    input(&mut state, UserInput::Toggle);
    assert!(state.selected_definitions.contains("r1"));
    input(&mut state, UserInput::Toggle);
    assert!(state.selected_definitions.is_empty());
}

#[test]
fn test_reference_ids_follow_display_order() {
    let mut state = at_scope_choice();
    input(&mut state, UserInput::Down);
    input(&mut state, UserInput::Confirm);

    // Select r3 first, then r1
    input(&mut state, UserInput::Down);
    input(&mut state, UserInput::Down);
    input(&mut state, UserInput::Toggle);
    input(&mut state, UserInput::Up);
    input(&mut state, UserInput::Up);
    input(&mut state, UserInput::Toggle);
    assert_eq!(state.selected_reference_ids(), vec!["r1", "r3"]);

    let effect = input(&mut state, UserInput::Confirm);
    assert!(matches!(effect, Effect::Run(Operation::ListResourceGroups { .. })));
    assert!(state.partial);
}

#[test]
fn test_resource_groups_prepend_subscription_scope() {
    let mut state = at_assignments(vec![assignment("a1", "/p/1")]);
    input(&mut state, UserInput::Confirm);
    complete(&mut state, Completion::DefinitionsLoaded(Ok(vec![])));
    complete(
        &mut state,
        Completion::ResourceGroupsLoaded(Ok(vec![
            ResourceGroup::new("/subscriptions/a/resourceGroups/rg-app", "rg-app"),
            ResourceGroup::new("/subscriptions/a/resourceGroups/rg-data", "rg-data"),
        ])),
    );

    assert_eq!(state.step, Step::SelectResourceGroup);
    assert_eq!(state.resource_groups.len(), 3);
    assert_eq!(state.resource_groups[0].id, "/subscriptions/a");
    assert_eq!(state.resource_groups[0].name, ResourceGroup::ENTIRE_SUBSCRIPTION);
    assert_eq!(state.resource_groups[1].name, "rg-app");
}

/// Drive the wizard to the `Ticket` step with no resource groups fetched
fn at_ticket() -> WizardState {
    let mut state = at_assignments(vec![assignment("a1", "/p/1")]);
    input(&mut state, UserInput::Confirm);
    complete(&mut state, Completion::DefinitionsLoaded(Ok(vec![])));
    complete(&mut state, Completion::ResourceGroupsLoaded(Ok(vec![])));
    input(&mut state, UserInput::Confirm);
    state
}

#[test]
fn test_blank_text_fields_do_not_advance() {
    let mut state = at_ticket();
    assert_eq!(state.step, Step::Ticket);

    type_text(&mut state, "   ");
    input(&mut state, UserInput::Confirm);
    assert_eq!(state.step, Step::Ticket);
    assert_eq!(state.status, "A ticket number is required.");

    type_text(&mut state, "INC1");
    input(&mut state, UserInput::Confirm);
    assert_eq!(state.step, Step::Users);
    assert_eq!(state.ticket, "INC1");

    input(&mut state, UserInput::Confirm);
    assert_eq!(state.step, Step::Users);
    assert_eq!(state.status, "At least one requester name is required.");
}

#[test]
fn test_text_steps_ignore_navigation() {
    let mut state = at_ticket();
    type_text(&mut state, "INC");
    input(&mut state, UserInput::Down);
    input(&mut state, UserInput::Toggle);
    assert_eq!(state.step, Step::Ticket);
    assert_eq!(state.ticket_input.value(), "INC");

    input(&mut state, UserInput::Edit(InputRequest::DeletePrevChar));
    assert_eq!(state.ticket_input.value(), "IN");
}

#[test]
fn test_expiration_date_validation() {
    let mut state = at_ticket();
    state.today = NaiveDate::from_ymd_opt(2024, 1, 31).unwrap();
    type_text(&mut state, "INC1");
    input(&mut state, UserInput::Confirm);
    type_text(&mut state, "alice");
    input(&mut state, UserInput::Confirm);
    assert_eq!(state.step, Step::ExpirationChoice);

    input(&mut state, UserInput::Down);
    input(&mut state, UserInput::Confirm);
    assert_eq!(state.step, Step::ExpirationDate);
    assert_eq!(state.expiration_input.value(), "2024-03-01");

    input(&mut state, UserInput::Edit(InputRequest::DeleteLine));
    type_text(&mut state, "2024-02-30");
    input(&mut state, UserInput::Confirm);
    assert_eq!(state.step, Step::ExpirationDate);
    assert!(!state.status.is_empty());

    input(&mut state, UserInput::Edit(InputRequest::DeleteLine));
    type_text(&mut state, "2024-06-15");
    input(&mut state, UserInput::Confirm);
    assert_eq!(state.step, Step::Confirm);
    assert_eq!(state.expiration_date, "2024-06-15");

    let Effect::Run(Operation::CreateExemption(request)) = input(&mut state, UserInput::Confirm)
    else {
        panic!("expected create operation");
    };
    assert_eq!(request.expires_on, NaiveDate::from_ymd_opt(2024, 6, 15));
}

#[test]
fn test_blank_expiration_date_is_rejected() {
    let mut state = at_ticket();
    type_text(&mut state, "INC1");
    input(&mut state, UserInput::Confirm);
    type_text(&mut state, "alice");
    input(&mut state, UserInput::Confirm);
    input(&mut state, UserInput::Down);
    input(&mut state, UserInput::Confirm);
    assert_eq!(state.step, Step::ExpirationDate);

    input(&mut state, UserInput::Edit(InputRequest::DeleteLine));
    assert_eq!(input(&mut state, UserInput::Confirm), Effect::None);
    assert_eq!(state.step, Step::ExpirationDate);
    assert_eq!(state.status, "Expiration date is required.");
    assert_eq!(state.expiration_date, "");
}

#[test]
fn test_happy_path_ends_done_with_raw_output() {
    let mut state = WizardState::default();
    assert_eq!(state.start(), Effect::Run(Operation::ListSubscriptions));

    complete(&mut state, Completion::SubscriptionsLoaded(Ok(vec![prod()])));
    assert_eq!(
        input(&mut state, UserInput::Confirm),
        Effect::Run(Operation::ListAssignments { subscription: prod() })
    );

    let chosen = assignment("a1", "/providers/Microsoft.Authorization/policyDefinitions/p1");
    complete(&mut state, Completion::AssignmentsLoaded(Ok(vec![chosen.clone()])));
    assert_eq!(state.step, Step::SelectAssignment);
    input(&mut state, UserInput::Confirm);

    complete(&mut state, Completion::DefinitionsLoaded(Ok(vec![definition("only")])));
    assert_eq!(state.step, Step::LoadingResourceGroups);

    complete(
        &mut state,
        Completion::ResourceGroupsLoaded(Ok(vec![ResourceGroup::new(
            "/subscriptions/a/resourceGroups/rg-app",
            "rg-app",
        )])),
    );
    input(&mut state, UserInput::Down);
    input(&mut state, UserInput::Confirm);
    assert_eq!(state.step, Step::Ticket);

    type_text(&mut state, "INC1");
    input(&mut state, UserInput::Confirm);
    type_text(&mut state, "alice");
    input(&mut state, UserInput::Confirm);

    // Unlimited
    input(&mut state, UserInput::Confirm);
    assert_eq!(state.step, Step::Confirm);
    assert!(state.expiration_date.is_empty());

    let effect = input(&mut state, UserInput::Confirm);
    let Effect::Run(Operation::CreateExemption(request)) = effect else {
        panic!("expected create operation, got {:?}", effect);
    };
    assert_eq!(request.scope, "/subscriptions/a/resourceGroups/rg-app");
    assert_eq!(request.assignment, chosen);
    assert!(request.reference_ids.is_empty());
    assert_eq!(request.ticket, "INC1");
    assert_eq!(request.requesters, "alice");
    assert_eq!(request.expires_on, None);
    assert_eq!(request.category, ExemptionCategory::Waiver);
    assert_eq!(state.step, Step::Creating);

    let raw = "{\n  \"name\": \"INC1-exemption\"\n}\n";
    complete(&mut state, Completion::ExemptionCreated(Ok(raw.to_string())));
    assert_eq!(state.step, Step::Done);
    assert_eq!(state.create_output, raw);
    assert_eq!(input(&mut state, UserInput::Quit), Effect::Quit);
}

#[test]
fn test_create_failure_is_terminal() {
    let mut state = at_ticket();
    type_text(&mut state, "INC1");
    input(&mut state, UserInput::Confirm);
    type_text(&mut state, "alice");
    input(&mut state, UserInput::Confirm);
    input(&mut state, UserInput::Confirm);
    input(&mut state, UserInput::Confirm);
    assert_eq!(state.step, Step::Creating);

    complete(
        &mut state,
        Completion::ExemptionCreated(Err(ExemptError::AzCommand {
            command: "policy exemption create".into(),
            stderr: "AuthorizationFailed".into(),
        })),
    );
    assert_eq!(state.step, Step::Error);
    assert!(state
        .error
        .as_ref()
        .map(|e| e.to_string().contains("AuthorizationFailed"))
        .unwrap_or(false));
}

#[test]
fn test_confirm_without_prerequisites_stays() {
    let mut state = WizardState::default();
    state.step = Step::Confirm;
    assert_eq!(input(&mut state, UserInput::Confirm), Effect::None);
    assert_eq!(state.step, Step::Confirm);
    assert_eq!(state.status, "Missing information. Use q to abort.");
}
