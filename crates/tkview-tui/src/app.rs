//! Application shell for the TKView TUI.
//!
//! [`App`] wires a [`Session`] to the outside world: it owns the terminal,
//! turns key presses into messages, runs fetch commands on spawned tasks and
//! feeds their results back through a single queue. All session mutation
//! happens on the loop that drains that queue.

use std::io::{self, Write};
use std::sync::Arc;
use std::time::Duration;

use crossterm::event::{Event, EventStream, KeyEventKind};
use futures_util::StreamExt;
use ratatui::{Terminal, backend::CrosstermBackend};
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};
use tokio::time::{self, Instant, Interval, MissedTickBehavior};
use tracing::{debug, info};

use tkview_core::error::TkviewError;
use tkview_core::lister::{AgentLister, Lister, WorkflowLister};
use tkview_core::tree::fetch_organisation_tree;

use crate::event::InputHandler;
use crate::message::{Command, Message};
use crate::render;
use crate::session::Session;

/// Result type for app operations.
pub type AppResult<T> = std::result::Result<T, Box<dyn std::error::Error>>;

/// Data source shared by every in-flight fetch.
pub type SharedLister = Arc<dyn Lister>;

/// What woke the event loop.
enum Incoming {
    Message(Message),
    Terminal(Option<io::Result<Event>>),
    Tick,
}

/// Main application.
pub struct App {
    session: Session,
    client: Option<SharedLister>,
    input: InputHandler,
    tx: UnboundedSender<Message>,
    rx: UnboundedReceiver<Message>,
    refresh_interval: Option<Duration>,
}

impl Default for App {
    fn default() -> Self {
        Self::new()
    }
}

impl App {
    /// Create an app with no data source; every fetch fails with `NoClient`.
    pub fn new() -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        Self {
            session: Session::new(),
            client: None,
            input: InputHandler::new(),
            tx,
            rx,
            refresh_interval: None,
        }
    }

    pub fn with_client(mut self, client: SharedLister) -> Self {
        self.client = Some(client);
        self
    }

    /// Re-fetch workflows every `interval`; zero disables periodic refresh.
    pub fn with_refresh_interval(mut self, interval: Duration) -> Self {
        self.refresh_interval = (!interval.is_zero()).then_some(interval);
        self
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn should_quit(&self) -> bool {
        self.session.should_quit()
    }

    /// Apply one message and execute the commands it produces.
    pub fn dispatch(&mut self, message: Message) {
        for command in self.session.update(message) {
            self.execute(command);
        }
    }

    /// Run a command. Fetches run on spawned tasks and report back through
    /// the message queue; they never touch the session directly.
    fn execute(&self, command: Command) {
        match command {
            Command::FetchOrganisationTree => {
                let client = self.client.clone();
                let tx = self.tx.clone();
                tokio::spawn(async move {
                    let result = match client {
                        Some(client) => fetch_organisation_tree(client.as_ref()).await,
                        None => Err(TkviewError::NoClient),
                    };
                    deliver(&tx, Message::OrganisationTreeLoaded(result));
                });
            }
            Command::FetchAgents(scope) => {
                let client = self.client.clone();
                let tx = self.tx.clone();
                tokio::spawn(async move {
                    let result = match client {
                        Some(client) => client.list_agents(&scope.organisation).await,
                        None => Err(TkviewError::NoClient),
                    };
                    deliver(&tx, Message::AgentsLoaded { scope, result });
                });
            }
            Command::FetchWorkflows(scope) => {
                let client = self.client.clone();
                let tx = self.tx.clone();
                tokio::spawn(async move {
                    let result = match client {
                        Some(client) => {
                            client
                                .list_workflows(&scope.organisation, &scope.environment)
                                .await
                        }
                        None => Err(TkviewError::NoClient),
                    };
                    deliver(&tx, Message::WorkflowTreeLoaded { scope, result });
                });
            }
            Command::FetchExecutions(scope) => {
                let client = self.client.clone();
                let tx = self.tx.clone();
                tokio::spawn(async move {
                    let result = match client {
                        Some(client) => {
                            client
                                .list_executions(
                                    &scope.environment.organisation,
                                    &scope.environment.environment,
                                    &scope.workflow,
                                )
                                .await
                        }
                        None => Err(TkviewError::NoClient),
                    };
                    deliver(&tx, Message::ExecutionsLoaded { scope, result });
                });
            }
            Command::Dispatch(message) => deliver(&self.tx, message),
            Command::Quit => debug!("quit requested"),
        }
    }

    /// Run the main application loop.
    pub async fn run(&mut self) -> AppResult<()> {
        let mut terminal = setup_terminal()?;

        let result = self.run_loop(&mut terminal).await;

        restore_terminal()?;
        terminal.show_cursor()?;

        result
    }

    async fn run_loop(
        &mut self,
        terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    ) -> AppResult<()> {
        let mut events = EventStream::new();
        let mut ticker = self.refresh_interval.map(|period| {
            let mut ticker = time::interval_at(Instant::now() + period, period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            ticker
        });

        let size = terminal.size()?;
        self.dispatch(Message::Resize {
            width: size.width,
            height: size.height,
        });
        self.dispatch(Message::Load);
        info!(refresh = ?self.refresh_interval, "dashboard started");

        while !self.session.should_quit() {
            terminal.draw(|frame| render::draw(frame, &self.session.snapshot()))?;

            let incoming = tokio::select! {
                Some(message) = self.rx.recv() => Incoming::Message(message),
                event = events.next() => Incoming::Terminal(event),
                _ = next_tick(&mut ticker) => Incoming::Tick,
            };

            let message = match incoming {
                Incoming::Message(message) => message,
                Incoming::Tick => Message::Tick,
                Incoming::Terminal(None) => break,
                Incoming::Terminal(Some(Err(err))) => return Err(err.into()),
                Incoming::Terminal(Some(Ok(event))) => match self.translate(event) {
                    Some(message) => message,
                    None => continue,
                },
            };
            self.dispatch(message);
        }

        info!("dashboard stopped");
        Ok(())
    }

    fn translate(&self, event: Event) -> Option<Message> {
        match event {
            Event::Key(key) if key.kind == KeyEventKind::Press => {
                Some(Message::Intent(self.input.handle_key(key)))
            }
            Event::Resize(width, height) => Some(Message::Resize { width, height }),
            _ => None,
        }
    }
}

fn deliver(tx: &UnboundedSender<Message>, message: Message) {
    if tx.send(message).is_err() {
        debug!("message queue closed, dropping message");
    }
}

async fn next_tick(ticker: &mut Option<Interval>) {
    match ticker {
        Some(ticker) => {
            ticker.tick().await;
        }
        None => std::future::pending::<()>().await,
    }
}

/// Enter raw mode and the alternate screen.
pub fn setup_terminal() -> Result<Terminal<CrosstermBackend<io::Stdout>>, TkviewError> {
    crossterm::terminal::enable_raw_mode().map_err(terminal_error)?;
    let mut stdout = io::stdout();
    if let Err(err) = crossterm::execute!(stdout, crossterm::terminal::EnterAlternateScreen) {
        let _ = crossterm::terminal::disable_raw_mode();
        return Err(terminal_error(err));
    }
    Terminal::new(CrosstermBackend::new(stdout)).map_err(terminal_error)
}

fn terminal_error(err: io::Error) -> TkviewError {
    TkviewError::terminal_init(err)
}

/// Restore terminal to its normal state.
///
/// Called both on normal exit and from the panic hook.
pub fn restore_terminal() -> io::Result<()> {
    let mut stdout = io::stdout();

    let _ = crossterm::terminal::disable_raw_mode();
    crossterm::execute!(
        stdout,
        crossterm::terminal::LeaveAlternateScreen,
        crossterm::cursor::Show
    )?;
    stdout.flush()
}
