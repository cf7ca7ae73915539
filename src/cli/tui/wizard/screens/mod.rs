/// Screen modules for the exemption wizard
pub mod prompt;
pub mod select;
pub mod summary;

use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Wrap},
    Frame,
};

use super::state::{Step, WizardState};
use super::theme::Theme;

/// Rendering inputs that are not part of the wizard state
pub struct ViewContext<'a> {
    pub theme: &'a Theme,
    /// Maximum list rows shown at once
    pub visible_rows: usize,
    /// Spinner frame, advanced on every tick
    pub tick: usize,
}

/// Render the whole wizard for its current step
pub fn render(frame: &mut Frame, state: &WizardState, ctx: &ViewContext) {
    let main_block = Block::default()
        .title(" Azure Policy Exemption ")
        .title_style(ctx.theme.title)
        .borders(Borders::ALL)
        .border_style(ctx.theme.border(state.step));

    let inner = main_block.inner(frame.area());
    frame.render_widget(main_block, frame.area());

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Min(3),    // Step body
            Constraint::Length(2), // Status line
            Constraint::Length(1), // Help bar
        ])
        .split(inner);

    match state.step {
        Step::SelectSubscription
        | Step::SelectAssignment
        | Step::AssignmentScope
        | Step::SelectDefinitions
        | Step::SelectResourceGroup
        | Step::ExpirationChoice => select::render(frame, chunks[0], state, ctx),
        Step::Ticket | Step::Users | Step::ExpirationDate => {
            prompt::render(frame, chunks[0], state, ctx)
        }
        Step::LoadingSubscriptions
        | Step::LoadingAssignments
        | Step::LoadingDefinitions
        | Step::LoadingResourceGroups
        | Step::Creating => summary::render_loading(frame, chunks[0], state, ctx),
        Step::Confirm => summary::render_confirm(frame, chunks[0], state, ctx),
        Step::Done => summary::render_done(frame, chunks[0], state, ctx),
        Step::Error => summary::render_error(frame, chunks[0], state, ctx),
    }

    render_status(frame, chunks[1], state, ctx);
    render_help_bar(frame, chunks[2], state.step);
}

fn render_status(frame: &mut Frame, area: Rect, state: &WizardState, ctx: &ViewContext) {
    if state.status.is_empty() || state.step.is_loading() {
        return;
    }
    let status = Paragraph::new(state.status.as_str())
        .style(ctx.theme.status)
        .wrap(Wrap { trim: true });
    frame.render_widget(status, area);
}

/// Key hints shown in the help bar for `step`
fn help_keys(step: Step) -> &'static [(&'static str, &'static str)] {
    match step {
        Step::SelectDefinitions => &[
            ("↑↓", "Move"),
            ("Space", "Toggle"),
            ("Enter", "Continue"),
            ("q", "Quit"),
        ],
        Step::Ticket | Step::Users | Step::ExpirationDate => {
            &[("Enter", "Submit"), ("Esc", "Quit")]
        }
        Step::Confirm => &[("Enter", "Create exemption"), ("q", "Abort")],
        s if s.is_terminal() => &[("q", "Exit")],
        s if s.is_loading() => &[("Ctrl+C", "Quit")],
        _ => &[("↑↓", "Move"), ("Enter", "Select"), ("q", "Quit")],
    }
}

fn render_help_bar(frame: &mut Frame, area: Rect, step: Step) {
    let keys = help_keys(step);
    let mut spans = vec![Span::raw(" ")];
    for (i, (key, action)) in keys.iter().enumerate() {
        if i > 0 {
            spans.push(Span::styled("  •  ", Style::default().fg(Color::DarkGray)));
        }
        spans.push(Span::styled(*key, Style::default().fg(Color::Cyan)));
        spans.push(Span::raw(format!(" {}", action)));
    }

    let help = Paragraph::new(Line::from(spans)).style(Style::default().bg(Color::DarkGray));
    frame.render_widget(help, area);
}

/// Window `[start, end)` of a list of `total` rows that keeps `cursor` visible
///
/// The cursor sits roughly in the middle of the window unless the window
/// is pinned to either end of the list.
pub fn visible_range(cursor: usize, total: usize, limit: usize) -> (usize, usize) {
    if limit == 0 || total <= limit {
        return (0, total);
    }
    let mut start = cursor.saturating_sub(limit / 2);
    let mut end = start + limit;
    if end > total {
        end = total;
        start = end - limit;
    }
    (start, end)
}
