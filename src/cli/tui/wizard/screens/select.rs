//! Cursor-driven list screens

use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    text::{Line, Span},
    widgets::{List, ListItem, Paragraph},
    Frame,
};

use super::{visible_range, ViewContext};
use crate::cli::tui::wizard::state::{Step, WizardState, EXPIRATION_OPTIONS, SCOPE_OPTIONS};

/// One selectable row
struct Row {
    label: String,
    /// `None` hides the checkbox
    marked: Option<bool>,
}

pub fn render(frame: &mut Frame, area: Rect, state: &WizardState, ctx: &ViewContext) {
    let (heading, rows, windowed) = rows_for(state);

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(2), // Heading
            Constraint::Min(1),    // List
            Constraint::Length(1), // Position
        ])
        .split(area);

    frame.render_widget(
        Paragraph::new(Line::from(Span::styled(heading, ctx.theme.label))),
        chunks[0],
    );

    let (start, end) = if windowed {
        visible_range(state.cursor, rows.len(), ctx.visible_rows)
    } else {
        (0, rows.len())
    };

    let items: Vec<ListItem> = rows[start..end]
        .iter()
        .enumerate()
        .map(|(offset, row)| {
            let focused = start + offset == state.cursor;
            let pointer = if focused { ">" } else { " " };
            let mut spans = vec![Span::raw(format!("{} ", pointer))];
            match row.marked {
                Some(true) => spans.push(Span::styled("[x] ", ctx.theme.marked)),
                Some(false) => spans.push(Span::styled("[ ] ", ctx.theme.muted)),
                None => {}
            }
            spans.push(Span::raw(row.label.clone()));

            let item = ListItem::new(Line::from(spans));
            if focused {
                item.style(ctx.theme.selected)
            } else {
                item
            }
        })
        .collect();
    frame.render_widget(List::new(items), chunks[1]);

    if windowed && !rows.is_empty() {
        let position = format!("Showing {}-{} of {}", start + 1, end, rows.len());
        frame.render_widget(
            Paragraph::new(position).style(ctx.theme.muted),
            chunks[2],
        );
    }
}

fn rows_for(state: &WizardState) -> (String, Vec<Row>, bool) {
    match state.step {
        Step::SelectSubscription => (
            "Select the subscription for the exemption:".to_string(),
            state
                .subscriptions
                .iter()
                .enumerate()
                .map(|(i, sub)| Row {
                    label: format!("{} ({})", sub.name, sub.short_id()),
                    marked: Some(state.selected_subscription == Some(i)),
                })
                .collect(),
            true,
        ),

        Step::SelectAssignment => {
            let heading = match state.current_subscription() {
                Some(sub) => format!(
                    "Policy assignments for subscription {} ({}):",
                    sub.name,
                    sub.short_id()
                ),
                None => "Policy assignments:".to_string(),
            };
            let rows = state
                .assignments
                .iter()
                .enumerate()
                .map(|(i, assignment)| Row {
                    label: format!("{} ({})", assignment.display_label(), assignment.short_id()),
                    marked: Some(state.selected_assignment == Some(i)),
                })
                .collect();
            (heading, rows, true)
        }

        Step::AssignmentScope => (
            "This assignment contains multiple policy definitions.".to_string(),
            plain_rows(&SCOPE_OPTIONS),
            false,
        ),

        Step::SelectDefinitions => (
            "Select the policy definitions to exempt:".to_string(),
            state
                .definitions
                .iter()
                .map(|def| Row {
                    label: format!("{} ({})", def.display_name, def.reference_id),
                    marked: Some(state.is_definition_selected(def)),
                })
                .collect(),
            true,
        ),

        Step::SelectResourceGroup => (
            "Select the scope for the exemption:".to_string(),
            state
                .resource_groups
                .iter()
                .enumerate()
                .map(|(i, rg)| Row {
                    label: rg.name.clone(),
                    marked: Some(state.selected_resource_group == Some(i)),
                })
                .collect(),
            true,
        ),

        Step::ExpirationChoice => (
            "Do you want to set an expiration date?".to_string(),
            plain_rows(&EXPIRATION_OPTIONS),
            false,
        ),

        _ => (String::new(), Vec::new(), false),
    }
}

fn plain_rows(options: &[&str]) -> Vec<Row> {
    options
        .iter()
        .map(|opt| Row {
            label: (*opt).to_string(),
            marked: None,
        })
        .collect()
}
