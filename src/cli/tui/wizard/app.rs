use std::sync::Arc;
use std::thread;
use std::time::Duration;

use ratatui::{
    crossterm::event::{self, Event, KeyEventKind},
    DefaultTerminal, Frame,
};
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};
use tokio::time;
use tracing::{debug, info};

use super::events::{AppEvent, Effect, WizardEvent};
use super::gateway::Gateway;
use super::input::map_key;
use super::screens::{self, ViewContext};
use super::state::{Step, WizardState};
use super::theme::Theme;
use crate::azure::Backend;
use crate::config::Settings;
use crate::{ExemptError, Result};

/// How the wizard ended
#[derive(Debug)]
pub enum Outcome {
    /// Exemption created; carries the raw Azure CLI output
    Created(String),
    /// User quit before an exemption was created
    Aborted,
    /// User quit while the create call was still running; `az` finishes it
    Detached,
    /// Wizard stopped on an error
    Failed(ExemptError),
}

/// Main application struct
pub struct App {
    /// Current state of the wizard
    state: WizardState,
    /// Whether the app should quit
    should_quit: bool,
    /// Theme for styling
    theme: Theme,
    visible_rows: usize,
    /// Spinner frame counter
    tick: usize,
}

impl App {
    /// Create a new app instance
    pub fn new(settings: &Settings) -> Self {
        Self {
            state: WizardState::new(settings),
            should_quit: false,
            theme: Theme::default(),
            visible_rows: settings.visible_rows,
            tick: 0,
        }
    }

    /// Run the application until the user quits
    pub async fn run(mut self, backend: Arc<dyn Backend>) -> Result<Outcome> {
        // Initialize terminal
        let mut terminal = ratatui::try_init()?;
        terminal.clear()?;

        let (event_tx, mut event_rx) = mpsc::unbounded_channel();
        let gateway = Gateway::new(backend, event_tx.clone());
        spawn_input_reader(event_tx);

        let effect = self.state.start();
        self.apply(effect, &gateway);

        // Main render loop
        let result = self.main_loop(&mut terminal, &mut event_rx, &gateway).await;

        // Cleanup
        ratatui::restore();
        result?;

        Ok(self.into_outcome())
    }

    /// Main event loop
    async fn main_loop(
        &mut self,
        terminal: &mut DefaultTerminal,
        event_rx: &mut UnboundedReceiver<AppEvent>,
        gateway: &Gateway,
    ) -> Result<()> {
        loop {
            terminal.draw(|frame| self.render(frame))?;

            // Handle events with timeout for the spinner
            match time::timeout(Duration::from_millis(100), event_rx.recv()).await {
                Ok(Some(event)) => self.handle_event(event, gateway),
                Ok(None) => break, // Channel closed
                Err(_) => self.handle_event(AppEvent::Tick, gateway),
            }

            if self.should_quit {
                break;
            }
        }

        Ok(())
    }

    fn render(&self, frame: &mut Frame) {
        let ctx = ViewContext {
            theme: &self.theme,
            visible_rows: self.visible_rows,
            tick: self.tick,
        };
        screens::render(frame, &self.state, &ctx);
    }

    fn handle_event(&mut self, event: AppEvent, gateway: &Gateway) {
        let wizard_event = match event {
            AppEvent::Key(key) => match map_key(self.state.step, key) {
                Some(input) => WizardEvent::Input(input),
                None => return,
            },
            AppEvent::Completed(completion) => WizardEvent::Completed(completion),
            AppEvent::Tick => {
                if self.state.step.is_loading() {
                    self.tick = self.tick.wrapping_add(1);
                }
                return;
            }
            // Next draw picks up the new size
            AppEvent::Resize(..) => return,
        };

        let effect = self.state.update(wizard_event);
        self.apply(effect, gateway);
    }

    fn apply(&mut self, effect: Effect, gateway: &Gateway) {
        match effect {
            Effect::None => {}
            Effect::Run(op) => {
                gateway.dispatch(op);
            }
            Effect::Quit => {
                debug!("Quit requested at {:?}", self.state.step);
                self.should_quit = true;
            }
        }
    }

    fn into_outcome(self) -> Outcome {
        Outcome::from_state(self.state)
    }
}

impl Outcome {
    /// Outcome for a wizard that stopped at `state.step`
    pub fn from_state(mut state: WizardState) -> Self {
        match state.step {
            Step::Done => {
                info!("Exemption created");
                Outcome::Created(std::mem::take(&mut state.create_output))
            }
            Step::Error => match state.error.take() {
                Some(err) => Outcome::Failed(err),
                None => Outcome::Aborted,
            },
            Step::Creating => {
                info!("Wizard closed while the exemption was being created");
                Outcome::Detached
            }
            step => {
                info!("Wizard aborted at {}", step.name());
                Outcome::Aborted
            }
        }
    }
}

/// Forward terminal events until the app loop drops its receiver
///
/// Runs on a plain thread so a pending read never holds up runtime shutdown.
fn spawn_input_reader(tx: UnboundedSender<AppEvent>) {
    thread::spawn(move || {
        while !tx.is_closed() {
            match event::poll(Duration::from_millis(100)) {
                Ok(true) => {}
                Ok(false) => continue,
                Err(e) => {
                    debug!("Terminal event poll failed: {}", e);
                    break;
                }
            }
            let sent = match event::read() {
                Ok(Event::Key(key)) if key.kind == KeyEventKind::Press => {
                    tx.send(AppEvent::Key(key))
                }
                Ok(Event::Resize(width, height)) => tx.send(AppEvent::Resize(width, height)),
                Ok(_) => Ok(()),
                Err(e) => {
                    debug!("Terminal event read failed: {}", e);
                    break;
                }
            };
            if sent.is_err() {
                break;
            }
        }
    });
}

#[cfg(test)]
mod tests {
    use super::*;

    fn at(step: Step) -> WizardState {
        let mut state = WizardState::default();
        state.step = step;
        state
    }

    #[test]
    fn test_outcome_from_state() {
        let mut done = at(Step::Done);
        done.create_output = "{}".to_string();
        assert!(matches!(Outcome::from_state(done), Outcome::Created(ref out) if out == "{}"));

        let mut failed = at(Step::Error);
        failed.error = Some(ExemptError::NoSubscriptions);
        assert!(matches!(
            Outcome::from_state(failed),
            Outcome::Failed(ExemptError::NoSubscriptions)
        ));

        assert!(matches!(Outcome::from_state(at(Step::Creating)), Outcome::Detached));
        assert!(matches!(Outcome::from_state(at(Step::Ticket)), Outcome::Aborted));
    }
}
