use ratatui::style::{Color, Modifier, Style};

use super::state::Step;

/// Consistent theme for the TUI
pub struct Theme {
    pub title: Style,
    pub selected: Style,
    pub marked: Style,
    pub error: Style,
    pub success: Style,
    pub status: Style,
    pub muted: Style,
    pub label: Style,
    pub input: Style,
}

impl Default for Theme {
    fn default() -> Self {
        Self {
            title: Style::default()
                .fg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
            selected: Style::default()
                .fg(Color::Magenta)
                .add_modifier(Modifier::BOLD),
            marked: Style::default().fg(Color::Green),
            error: Style::default()
                .fg(Color::Red)
                .add_modifier(Modifier::BOLD),
            success: Style::default()
                .fg(Color::Green)
                .add_modifier(Modifier::BOLD),
            status: Style::default().fg(Color::Yellow),
            muted: Style::default().fg(Color::DarkGray),
            label: Style::default().add_modifier(Modifier::BOLD),
            input: Style::default().fg(Color::White),
        }
    }
}

impl Theme {
    /// Border style for the main frame at a given step
    pub fn border(&self, step: Step) -> Style {
        match step {
            Step::Error => Style::default().fg(Color::Red),
            Step::Done => Style::default().fg(Color::Green),
            _ => Style::default().fg(Color::White),
        }
    }

    /// Frames of the loading spinner
    pub fn spinner(frame: usize) -> &'static str {
        const FRAMES: [&str; 10] = ["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"];
        FRAMES[frame % FRAMES.len()]
    }
}
