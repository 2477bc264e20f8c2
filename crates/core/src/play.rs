use crate::{Action, GameSetup, GameStatus, GameStore, NoticeKind};
use thiserror::Error;

#[derive(Debug, Clone, Copy, Error, PartialEq, Eq)]
pub enum PlayError {
    #[error("game is not running")]
    NotRunning,
    #[error("game is already running")]
    AlreadyRunning,
    #[error("no target circle to click")]
    NoTarget,
    #[error("circle {index} is outside the {cells}-cell grid")]
    OutOfBounds { index: usize, cells: usize },
}

impl PlayError {
    pub fn notice(self) -> NoticeKind {
        match self {
            Self::NotRunning | Self::NoTarget => NoticeKind::PressPlay,
            Self::AlreadyRunning => NoticeKind::AlreadyRunning,
            Self::OutOfBounds { .. } => NoticeKind::OutOfBounds,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClickOutcome {
    Hit { score: i64, next_target: usize },
    Miss { score: i64 },
    Finished { score: i64 },
}

impl ClickOutcome {
    pub fn score(self) -> i64 {
        match self {
            Self::Hit { score, .. } | Self::Miss { score } | Self::Finished { score } => score,
        }
    }
}

/// Scores a click and forwards it to the store: `score-updated` first, then
/// `circle-clicked`.
pub fn click_circle(store: &mut GameStore, index: usize) -> Result<ClickOutcome, PlayError> {
    let state = store.state();
    if state.status != GameStatus::Running {
        return Err(PlayError::NotRunning);
    }
    let Some(target) = state.target_circle_id else {
        return Err(PlayError::NoTarget);
    };
    if state.is_game_over() {
        return Err(PlayError::NoTarget);
    }
    if !state.in_bounds(index) {
        return Err(PlayError::OutOfBounds {
            index,
            cells: state.cell_count(),
        });
    }

    let scoring = store.config().scoring;
    let hit = index == target;
    let mut updated = state.clone();
    updated.score += if hit { scoring.hit } else { -scoring.miss };
    let score = updated.score;
    store.dispatch(Action::ScoreUpdated(updated));
    store.dispatch(Action::CircleClicked(index));

    if !hit {
        return Ok(ClickOutcome::Miss { score });
    }
    match store.state().target_circle_id {
        Some(next_target) if store.state().status == GameStatus::Running => {
            Ok(ClickOutcome::Hit { score, next_target })
        }
        _ => Ok(ClickOutcome::Finished { score }),
    }
}

pub fn start_game(store: &mut GameStore) -> Result<(), PlayError> {
    if store.state().status == GameStatus::Running {
        return Err(PlayError::AlreadyRunning);
    }
    if store.state().target_circle_id.is_none() {
        store.dispatch(Action::Reset(GameSetup::default()));
    }
    store.dispatch(Action::Start);
    Ok(())
}

/// Stops a running game and returns the score it had.
pub fn stop_game(store: &mut GameStore) -> Result<i64, PlayError> {
    if store.state().status != GameStatus::Running {
        return Err(PlayError::NotRunning);
    }
    let score = store.state().score;
    store.dispatch(Action::Stop);
    Ok(score)
}

pub fn reset_game(store: &mut GameStore, grid_size: Option<usize>) {
    store.dispatch(Action::Reset(GameSetup {
        grid_size,
        score: None,
    }));
}
