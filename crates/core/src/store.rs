use crate::{reduce, Action, GameConfig, GameEvent, GameState, RngState, Transition};
use std::collections::VecDeque;
use std::fmt;

/// Observer of store transitions. Listeners read the new state; they cannot dispatch.
pub trait StoreListener {
    fn on_event(&mut self, event: GameEvent, state: &GameState);
}

impl<F> StoreListener for F
where
    F: FnMut(GameEvent, &GameState),
{
    fn on_event(&mut self, event: GameEvent, state: &GameState) {
        self(event, state)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ListenerId(u64);

pub struct GameStore {
    state: GameState,
    config: GameConfig,
    rng: RngState,
    listeners: Vec<(ListenerId, Box<dyn StoreListener>)>,
    next_listener: u64,
}

impl GameStore {
    pub fn new(config: GameConfig) -> Self {
        let rng = match config.seed {
            Some(seed) => RngState::from_seed(seed),
            None => RngState::from_entropy(),
        };
        Self::with_rng(config, rng)
    }

    pub fn with_rng(config: GameConfig, rng: RngState) -> Self {
        Self {
            state: GameState::new(),
            config,
            rng,
            listeners: Vec::new(),
            next_listener: 0,
        }
    }

    pub fn state(&self) -> &GameState {
        &self.state
    }

    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    pub fn seed(&self) -> u64 {
        self.rng.seed()
    }

    pub fn listener_count(&self) -> usize {
        self.listeners.len()
    }

    /// Applies `action`, then any follow-ups it requests, notifying listeners
    /// after each transition.
    pub fn dispatch(&mut self, action: Action) {
        let mut queue = VecDeque::from([action]);
        while let Some(action) = queue.pop_front() {
            let event = action.event();
            let Transition { state, follow_up } =
                reduce(&self.state, &action, &self.config, &mut self.rng);
            self.state = state;
            log::debug!(
                "dispatch {}: score={} target={} selected={} status={}",
                event.name(),
                self.state.score,
                self.state.target_index(),
                self.state.selected_circles.len(),
                self.state.status.name()
            );
            if event == GameEvent::GameOver {
                log::info!("game over with score {}", self.state.score);
            }
            for (_, listener) in self.listeners.iter_mut() {
                listener.on_event(event, &self.state);
            }
            queue.extend(follow_up);
        }
    }

    pub fn subscribe(&mut self, listener: impl StoreListener + 'static) -> ListenerId {
        let id = ListenerId(self.next_listener);
        self.next_listener += 1;
        self.listeners.push((id, Box::new(listener)));
        id
    }

    pub fn unsubscribe(&mut self, id: ListenerId) -> bool {
        let before = self.listeners.len();
        self.listeners.retain(|(existing, _)| *existing != id);
        self.listeners.len() != before
    }

    pub fn unsubscribe_all(&mut self) {
        self.listeners.clear();
    }
}

impl fmt::Debug for GameStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GameStore")
            .field("state", &self.state)
            .field("config", &self.config)
            .field("seed", &self.rng.seed())
            .field("listeners", &self.listeners.len())
            .finish()
    }
}
