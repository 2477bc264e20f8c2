use crate::GameEvent;
use serde::{Deserialize, Serialize};
use std::time::{Duration, Instant};

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum NoticeVariant {
    #[default]
    Success,
    Error,
    Info,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum NoticeKind {
    GameStarted,
    GameStopped,
    GameOver,
    PressPlay,
    AlreadyRunning,
    OutOfBounds,
}

impl NoticeKind {
    pub fn variant(self) -> NoticeVariant {
        match self {
            Self::GameStarted | Self::GameOver => NoticeVariant::Success,
            Self::GameStopped | Self::PressPlay | Self::AlreadyRunning => NoticeVariant::Info,
            Self::OutOfBounds => NoticeVariant::Error,
        }
    }

    pub fn default_text(self) -> &'static str {
        match self {
            Self::GameStarted => "Game Started!",
            Self::GameStopped => "Game has been stopped",
            Self::GameOver => "Game is over!",
            Self::PressPlay => "Press play button to start playing the game",
            Self::AlreadyRunning => "Game is already running",
            Self::OutOfBounds => "That circle is not on the board",
        }
    }

    pub fn notice(self) -> Notice {
        Notice::new(self.default_text(), self.variant())
    }
}

pub fn notice_for_event(event: GameEvent) -> Option<NoticeKind> {
    match event {
        GameEvent::GameStarted => Some(NoticeKind::GameStarted),
        GameEvent::GameStopped => Some(NoticeKind::GameStopped),
        GameEvent::GameOver => Some(NoticeKind::GameOver),
        _ => None,
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Notice {
    pub text: String,
    pub variant: NoticeVariant,
}

impl Notice {
    pub fn new(text: impl Into<String>, variant: NoticeVariant) -> Self {
        Self {
            text: text.into(),
            variant,
        }
    }
}

/// A single visible notice with a dismissal deadline. Showing a new notice
/// replaces both the text and the pending deadline.
#[derive(Debug, Clone)]
pub struct NoticeBoard {
    timeout: Duration,
    current: Option<(Notice, Instant)>,
}

impl NoticeBoard {
    pub fn new(timeout: Duration) -> Self {
        Self {
            timeout,
            current: None,
        }
    }

    pub fn show(&mut self, notice: Notice, now: Instant) {
        self.current = Some((notice, now + self.timeout));
    }

    /// Returns true when the visible notice was dismissed by this tick.
    pub fn tick(&mut self, now: Instant) -> bool {
        let expired = matches!(&self.current, Some((_, deadline)) if now >= *deadline);
        if expired {
            self.current = None;
        }
        expired
    }

    pub fn current(&self) -> Option<&Notice> {
        self.current.as_ref().map(|(notice, _)| notice)
    }

    pub fn clear(&mut self) {
        self.current = None;
    }
}
