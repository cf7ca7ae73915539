//! Loading, confirmation and result screens

use ratatui::{
    layout::{Constraint, Rect},
    text::{Line, Span},
    widgets::{Block, Borders, Cell, Paragraph, Row, Table, Wrap},
    Frame,
};

use super::ViewContext;
use crate::cli::tui::wizard::state::{Step, WizardState};
use crate::cli::tui::wizard::theme::Theme;

pub fn render_loading(frame: &mut Frame, area: Rect, state: &WizardState, ctx: &ViewContext) {
    let message = if state.status.is_empty() {
        match state.step {
            Step::Creating => "Creating policy exemption via Azure CLI...",
            _ => "Loading...",
        }
    } else {
        state.status.as_str()
    };
    let line = Line::from(vec![
        Span::styled(format!("{} ", Theme::spinner(ctx.tick)), ctx.theme.status),
        Span::raw(message),
    ]);
    frame.render_widget(Paragraph::new(line), area);
}

pub fn render_confirm(frame: &mut Frame, area: Rect, state: &WizardState, ctx: &ViewContext) {
    let mut rows = Vec::new();

    if let Some(sub) = state.current_subscription() {
        rows.push(row("Subscription", format!("{} ({})", sub.name, sub.short_id())));
    }
    if let Some(rg) = state.current_resource_group() {
        rows.push(row("Scope", rg.name.clone()));
    }
    if let Some(assignment) = state.current_assignment() {
        rows.push(row("Assignment", assignment.display_label().to_string()));
    }
    if state.partial && !state.selected_definitions.is_empty() {
        let mut first = true;
        for def in state.selected_definition_refs() {
            let label = if first { "Definitions" } else { "" };
            first = false;
            rows.push(row(label, format!("{} ({})", def.display_name, def.reference_id)));
        }
    } else {
        rows.push(row("Definitions", "Entire assignment".to_string()));
    }
    rows.push(row("Ticket", state.ticket.clone()));
    rows.push(row("Requesters", state.requesters.clone()));
    rows.push(row(
        "Expires on",
        if state.expiration_date.is_empty() {
            "Unlimited".to_string()
        } else {
            state.expiration_date.clone()
        },
    ));
    rows.push(row("Category", state.category.as_str().to_string()));

    let table = Table::new(rows, [Constraint::Length(14), Constraint::Min(20)])
        .block(
            Block::default()
                .title(" Exemption Summary ")
                .borders(Borders::ALL)
                .border_style(ctx.theme.muted),
        )
        .column_spacing(2);
    frame.render_widget(table, area);
}

fn row(label: &str, value: String) -> Row<'static> {
    Row::new(vec![Cell::from(label.to_string()), Cell::from(value)])
}

pub fn render_done(frame: &mut Frame, area: Rect, state: &WizardState, ctx: &ViewContext) {
    let mut lines = vec![
        Line::from(Span::styled("Azure CLI response:", ctx.theme.success)),
        Line::from(""),
    ];
    if state.create_output.trim().is_empty() {
        lines.push(Line::from("No output returned."));
    } else {
        lines.extend(state.create_output.lines().map(Line::from));
    }
    frame.render_widget(Paragraph::new(lines).wrap(Wrap { trim: false }), area);
}

pub fn render_error(frame: &mut Frame, area: Rect, state: &WizardState, ctx: &ViewContext) {
    let message = state
        .error
        .as_ref()
        .map(|e| e.to_string())
        .unwrap_or_else(|| "unknown error".to_string());
    let lines = vec![
        Line::from(vec![
            Span::styled("Error: ", ctx.theme.error),
            Span::raw(message),
        ]),
        Line::from(""),
        Line::from(Span::styled("Press q to exit.", ctx.theme.muted)),
    ];
    frame.render_widget(Paragraph::new(lines).wrap(Wrap { trim: false }), area);
}
