//! Composition root: one bridge, one handler set and one state per session.

mod builder;
mod groups;
mod queue;
mod state;

pub use builder::SessionBuilder;
pub use groups::GroupRegistry;
pub use queue::PlaybackQueue;
pub use state::SessionState;

use std::ops::ControlFlow;
use std::sync::Arc;

use leanback_contracts::PlaybackSurface;
use leanback_model::{KeyInput, Video};
use tokio::sync::{mpsc, oneshot};
use tracing::{debug, info};

use crate::bridge::{ChainEvent, EventBridge, Handled, PlaybackEvent};
use crate::error::{PlaybackError, Result};

/// Requests from the view layer into a running session.
#[derive(Debug)]
pub enum SessionCommand {
    Open(Video),
    Event(PlaybackEvent),
    Chain {
        event: ChainEvent,
        reply: Option<oneshot::Sender<Handled>>,
    },
    AttachSurface(Arc<dyn PlaybackSurface>),
    DetachSurface,
    Shutdown,
}

/// A playback session: the event bridge plus the state its handlers share.
///
/// Drive it directly with [`dispatch`](Self::dispatch) and friends, or hand
/// it to [`run`](Self::run) to process commands and background completions
/// one at a time.
#[derive(Debug)]
pub struct PlaybackSession {
    bridge: EventBridge,
    state: SessionState,
}

impl PlaybackSession {
    pub fn new(bridge: EventBridge, state: SessionState) -> Self {
        Self { bridge, state }
    }

    pub fn builder() -> SessionBuilder {
        SessionBuilder::new()
    }

    pub fn state(&self) -> &SessionState {
        &self.state
    }

    pub fn bridge(&self) -> &EventBridge {
        &self.bridge
    }

    pub fn dispatch(&mut self, event: PlaybackEvent) {
        self.bridge.dispatch(event, &mut self.state);
    }

    pub fn open(&mut self, video: Video) {
        self.dispatch(PlaybackEvent::NewVideo(video));
    }

    pub fn chain(&mut self, event: ChainEvent) -> Handled {
        self.bridge.dispatch_chain(event, &mut self.state)
    }

    pub fn key_down(&mut self, key: KeyInput) -> Handled {
        self.chain(ChainEvent::KeyDown(key))
    }

    pub fn previous_clicked(&mut self) -> Handled {
        self.chain(ChainEvent::PreviousClicked)
    }

    pub fn next_clicked(&mut self) -> Handled {
        self.chain(ChainEvent::NextClicked)
    }

    pub fn attach_surface(
        &mut self,
        surface: Arc<dyn PlaybackSurface>,
    ) -> bool {
        self.bridge.attach_surface(surface, &mut self.state)
    }

    pub fn detach_surface(&mut self) {
        self.bridge.detach_surface(&mut self.state);
    }

    /// Apply one command; `Break` once the session should stop.
    pub fn apply(&mut self, command: SessionCommand) -> ControlFlow<()> {
        match command {
            SessionCommand::Open(video) => self.open(video),
            SessionCommand::Event(event) => self.dispatch(event),
            SessionCommand::Chain { event, reply } => {
                let handled = self.chain(event);
                if let Some(reply) = reply {
                    let _ = reply.send(handled);
                }
            }
            SessionCommand::AttachSurface(surface) => {
                self.attach_surface(surface);
            }
            SessionCommand::DetachSurface => self.detach_surface(),
            SessionCommand::Shutdown => return ControlFlow::Break(()),
        }
        ControlFlow::Continue(())
    }

    /// Process commands and background events until shutdown or until every
    /// command sender is gone. Each input runs to completion before the next
    /// is accepted.
    pub async fn run(
        mut self,
        mut commands: mpsc::UnboundedReceiver<SessionCommand>,
        mut events: mpsc::UnboundedReceiver<PlaybackEvent>,
    ) {
        info!(
            target: "playback::session",
            handlers = ?self.bridge.handler_names(),
            "session started"
        );
        self.dispatch(PlaybackEvent::Init);

        loop {
            tokio::select! {
                command = commands.recv() => match command {
                    Some(command) => {
                        if self.apply(command).is_break() {
                            break;
                        }
                    }
                    None => {
                        debug!(
                            target: "playback::session",
                            "command channel closed"
                        );
                        break;
                    }
                },
                Some(event) = events.recv() => self.dispatch(event),
            }
        }

        self.detach_surface();
        info!(target: "playback::session", "session stopped");
    }
}

/// Cloneable sender side of a running session.
#[derive(Debug, Clone)]
pub struct SessionHandle {
    commands: mpsc::UnboundedSender<SessionCommand>,
}

impl SessionHandle {
    pub fn new(commands: mpsc::UnboundedSender<SessionCommand>) -> Self {
        Self { commands }
    }

    fn send_command(&self, command: SessionCommand) -> Result<()> {
        self.commands
            .send(command)
            .map_err(|_| PlaybackError::SessionClosed)
    }

    pub fn open(&self, video: Video) -> Result<()> {
        self.send_command(SessionCommand::Open(video))
    }

    pub fn send(&self, event: PlaybackEvent) -> Result<()> {
        self.send_command(SessionCommand::Event(event))
    }

    /// Offer a chain event and wait for the outcome.
    pub async fn chain(&self, event: ChainEvent) -> Result<Handled> {
        let (reply, outcome) = oneshot::channel();
        self.send_command(SessionCommand::Chain {
            event,
            reply: Some(reply),
        })?;
        outcome.await.map_err(|_| PlaybackError::SessionClosed)
    }

    pub async fn key_down(&self, key: KeyInput) -> Result<Handled> {
        self.chain(ChainEvent::KeyDown(key)).await
    }

    pub fn attach_surface(
        &self,
        surface: Arc<dyn PlaybackSurface>,
    ) -> Result<()> {
        self.send_command(SessionCommand::AttachSurface(surface))
    }

    pub fn detach_surface(&self) -> Result<()> {
        self.send_command(SessionCommand::DetachSurface)
    }

    pub fn shutdown(&self) -> Result<()> {
        self.send_command(SessionCommand::Shutdown)
    }
}
