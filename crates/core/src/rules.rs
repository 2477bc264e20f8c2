//! Transition function of the game store.

use crate::{Action, GameConfig, GameSetup, GameState, GameStatus, RngState};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Transition {
    pub state: GameState,
    /// Actions the store dispatches after listeners saw `state`.
    pub follow_up: Vec<Action>,
}

impl Transition {
    fn settle(state: GameState) -> Self {
        Self {
            state,
            follow_up: Vec::new(),
        }
    }
}

pub fn reduce(
    state: &GameState,
    action: &Action,
    config: &GameConfig,
    rng: &mut RngState,
) -> Transition {
    match action {
        Action::Init(setup) => Transition::settle(fresh_board(setup, rng)),
        Action::Reset(setup) => {
            let setup = GameSetup {
                grid_size: setup.grid_size.or(Some(state.grid_size)),
                ..*setup
            };
            Transition::settle(fresh_board(&setup, rng))
        }
        Action::Start => {
            let mut next = state.clone();
            next.status = GameStatus::Running;
            Transition::settle(next)
        }
        Action::Stop => restart(state),
        Action::GameOver => {
            if config.restart_on_game_over {
                return restart(state);
            }
            let mut next = state.clone();
            next.status = GameStatus::Over;
            next.target_circle_id = None;
            Transition::settle(next)
        }
        Action::ScoreUpdated(replacement) => Transition::settle(replacement.clone()),
        Action::CircleClicked(index) => {
            if !state.is_target(*index) {
                return Transition::settle(state.clone());
            }
            let mut next = state.clone();
            next.selected_circles.insert(*index);
            next.target_circle_id = pick_next_target(&next, rng);
            if next.target_circle_id.is_some() {
                return Transition::settle(next);
            }
            next.status = GameStatus::Over;
            Transition {
                state: next,
                follow_up: vec![Action::GameOver],
            }
        }
    }
}

/// Uniform rejection sampling over the unselected cells. `None` once the board is full.
pub fn pick_next_target(state: &GameState, rng: &mut RngState) -> Option<usize> {
    if state.is_game_over() {
        return None;
    }
    let cells = state.cell_count();
    loop {
        let id = rng.next_index(cells);
        if !state.selected_circles.contains(&id) {
            return Some(id);
        }
    }
}

fn fresh_board(setup: &GameSetup, rng: &mut RngState) -> GameState {
    let mut next = GameState::from_setup(setup);
    next.target_circle_id = pick_next_target(&next, rng);
    next
}

fn restart(state: &GameState) -> Transition {
    let cleared = GameState::from_setup(&GameSetup::with_grid(state.grid_size));
    Transition {
        state: cleared,
        follow_up: vec![Action::Reset(GameSetup::with_grid(state.grid_size))],
    }
}
