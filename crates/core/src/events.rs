use crate::{GameSetup, GameState, GameStatus};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "kebab-case")]
pub enum GameEvent {
    GameInit,
    GameReset,
    GameStarted,
    GameStopped,
    GameOver,
    ScoreUpdated,
    CircleClicked,
}

impl GameEvent {
    pub fn name(self) -> &'static str {
        match self {
            Self::GameInit => "game-init",
            Self::GameReset => "game-reset",
            Self::GameStarted => "game-started",
            Self::GameStopped => "game-stopped",
            Self::GameOver => "game-over",
            Self::ScoreUpdated => "score-updated",
            Self::CircleClicked => "circle-clicked",
        }
    }
}

/// An event together with its payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    Init(GameSetup),
    Reset(GameSetup),
    Start,
    Stop,
    GameOver,
    ScoreUpdated(GameState),
    CircleClicked(usize),
}

impl Action {
    pub fn event(&self) -> GameEvent {
        match self {
            Self::Init(_) => GameEvent::GameInit,
            Self::Reset(_) => GameEvent::GameReset,
            Self::Start => GameEvent::GameStarted,
            Self::Stop => GameEvent::GameStopped,
            Self::GameOver => GameEvent::GameOver,
            Self::ScoreUpdated(_) => GameEvent::ScoreUpdated,
            Self::CircleClicked(_) => GameEvent::CircleClicked,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct EventRecord {
    pub event: GameEvent,
    pub score: i64,
    pub target: i64,
    pub selected: usize,
    pub status: GameStatus,
}

impl EventRecord {
    pub fn capture(event: GameEvent, state: &GameState) -> Self {
        Self {
            event,
            score: state.score,
            target: state.target_index(),
            selected: state.selected_circles.len(),
            status: state.status,
        }
    }

    pub fn describe(&self) -> String {
        format!(
            "{} score {} target {} selected {} {}",
            self.event.name(),
            self.score,
            self.target,
            self.selected,
            self.status.name()
        )
    }
}

#[derive(Debug, Default)]
pub struct EventBus {
    queue: Vec<EventRecord>,
}

impl EventBus {
    pub fn push(&mut self, record: EventRecord) {
        self.queue.push(record);
    }

    pub fn drain(&mut self) -> impl Iterator<Item = EventRecord> + '_ {
        self.queue.drain(..)
    }

    pub fn len(&self) -> usize {
        self.queue.len()
    }

    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }
}
