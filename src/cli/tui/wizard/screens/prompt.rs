//! Free-text prompts: ticket, requesters and expiration date

use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};
use tui_input::Input;

use super::ViewContext;
use crate::cli::tui::wizard::state::{Step, WizardState};

pub fn render(frame: &mut Frame, area: Rect, state: &WizardState, ctx: &ViewContext) {
    let (context, question, input, placeholder) = match state.step {
        Step::Ticket => (
            ticket_context(state),
            "Provide the tracking ticket number linked to this exemption:",
            &state.ticket_input,
            "INC-1234",
        ),
        Step::Users => (
            vec![
                labelled("Ticket", &state.ticket, ctx),
                labelled(
                    "Assignment",
                    state
                        .current_assignment()
                        .map(|a| a.display_label())
                        .unwrap_or_default(),
                    ctx,
                ),
            ],
            "Who is requesting this exemption? (comma separated)",
            &state.users_input,
            "alice, bob",
        ),
        _ => (
            Vec::new(),
            "Enter the expiration date (YYYY-MM-DD):",
            &state.expiration_input,
            "YYYY-MM-DD",
        ),
    };

    let context_height = context.len() as u16;
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(context_height + 1), // Context
            Constraint::Length(2),                  // Question
            Constraint::Length(3),                  // Input box
            Constraint::Min(0),
        ])
        .split(area);

    frame.render_widget(Paragraph::new(context), chunks[0]);
    frame.render_widget(
        Paragraph::new(Line::from(Span::styled(question, ctx.theme.label))),
        chunks[1],
    );
    render_input(frame, chunks[2], input, placeholder, ctx);
}

fn ticket_context<'a>(state: &'a WizardState) -> Vec<Line<'a>> {
    let mut lines = Vec::new();
    if let Some(assignment) = state.current_assignment() {
        lines.push(Line::from(format!(
            "Assignment selected: {}",
            assignment.display_label()
        )));
    }
    if state.partial && !state.selected_definitions.is_empty() {
        lines.push(Line::from("Definitions selected:"));
        for def in state.selected_definition_refs() {
            lines.push(Line::from(format!(
                "• {} ({})",
                def.display_name, def.reference_id
            )));
        }
    }
    lines
}

fn labelled<'a>(label: &'a str, value: &'a str, ctx: &ViewContext) -> Line<'a> {
    Line::from(vec![
        Span::styled(format!("{}: ", label), ctx.theme.label),
        Span::raw(value),
    ])
}

fn render_input(frame: &mut Frame, area: Rect, input: &Input, placeholder: &str, ctx: &ViewContext) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(ctx.theme.muted);
    let inner = block.inner(area);
    frame.render_widget(block, area);

    // Keep the cursor inside the box for long values
    let width = inner.width.max(1) as usize;
    let scroll = input.visual_scroll(width.saturating_sub(1));

    let text = if input.value().is_empty() {
        Paragraph::new(Span::styled(placeholder.to_string(), ctx.theme.muted))
    } else {
        Paragraph::new(input.value())
            .style(ctx.theme.input)
            .scroll((0, scroll as u16))
    };
    frame.render_widget(text, inner);

    let cursor = input.visual_cursor().saturating_sub(scroll) as u16;
    frame.set_cursor_position((inner.x + cursor, inner.y));
}
