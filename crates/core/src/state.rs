use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum GameStatus {
    Running,
    #[default]
    Stopped,
    Over,
}

impl GameStatus {
    pub fn name(self) -> &'static str {
        match self {
            Self::Running => "running",
            Self::Stopped => "stopped",
            Self::Over => "over",
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct GameState {
    pub score: i64,
    pub selected_circles: BTreeSet<usize>,
    pub status: GameStatus,
    /// `None` before the first target is drawn and once every cell is matched.
    pub target_circle_id: Option<usize>,
    pub grid_size: usize,
}

/// Partial state merged onto the defaults by `game-init` and `game-reset`.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct GameSetup {
    #[serde(default)]
    pub grid_size: Option<usize>,
    #[serde(default)]
    pub score: Option<i64>,
}

impl GameSetup {
    pub fn with_grid(grid_size: usize) -> Self {
        Self {
            grid_size: Some(grid_size),
            score: None,
        }
    }
}

impl GameState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_setup(setup: &GameSetup) -> Self {
        let defaults = Self::default();
        Self {
            score: setup.score.unwrap_or(defaults.score),
            grid_size: setup.grid_size.unwrap_or(defaults.grid_size),
            ..defaults
        }
    }

    pub fn cell_count(&self) -> usize {
        self.grid_size * self.grid_size
    }

    pub fn remaining(&self) -> usize {
        self.cell_count().saturating_sub(self.selected_circles.len())
    }

    pub fn is_game_over(&self) -> bool {
        check_game_over(self.grid_size, &self.selected_circles)
    }

    pub fn is_target(&self, index: usize) -> bool {
        self.target_circle_id == Some(index)
    }

    pub fn is_selected(&self, index: usize) -> bool {
        self.selected_circles.contains(&index)
    }

    pub fn in_bounds(&self, index: usize) -> bool {
        index < self.cell_count()
    }

    /// Wire form of the target: `-1` when there is none.
    pub fn target_index(&self) -> i64 {
        self.target_circle_id
            .map(|id| id as i64)
            .unwrap_or(-1)
    }

    pub fn is_consistent(&self) -> bool {
        let cells = self.cell_count();
        if self.selected_circles.iter().any(|idx| *idx >= cells) {
            return false;
        }
        match self.target_circle_id {
            Some(target) => target < cells && !self.selected_circles.contains(&target),
            None => true,
        }
    }
}

pub fn check_game_over(grid_size: usize, selected: &BTreeSet<usize>) -> bool {
    selected.len() == grid_size * grid_size
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_a_fresh_store() {
        let state = GameState::new();
        assert_eq!(state.score, 0);
        assert!(state.selected_circles.is_empty());
        assert_eq!(state.status, GameStatus::Stopped);
        assert_eq!(state.target_circle_id, None);
        assert_eq!(state.target_index(), -1);
        assert_eq!(state.grid_size, 0);
    }

    #[test]
    fn setup_merges_onto_defaults() {
        let state = GameState::from_setup(&GameSetup {
            grid_size: Some(3),
            score: Some(-4),
        });
        assert_eq!(state.grid_size, 3);
        assert_eq!(state.score, -4);
        assert_eq!(state.cell_count(), 9);
        assert_eq!(state.remaining(), 9);
        assert_eq!(state.status, GameStatus::Stopped);
    }

    #[test]
    fn empty_grid_counts_as_over() {
        assert!(GameState::new().is_game_over());
    }

    #[test]
    fn consistency_rejects_selected_target() {
        let mut state = GameState::from_setup(&GameSetup::with_grid(2));
        state.selected_circles.insert(1);
        state.target_circle_id = Some(1);
        assert!(!state.is_consistent());
        state.target_circle_id = Some(2);
        assert!(state.is_consistent());
        state.selected_circles.insert(7);
        assert!(!state.is_consistent());
    }
}
