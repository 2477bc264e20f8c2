use crossterm::event::{KeyCode, KeyEvent};
use molegrid_core::{
    click_circle, notice_for_event, reset_game, start_game, stop_game, Action, ClickOutcome,
    EventBus, EventRecord, GameConfig, GameEvent, GameSetup, GameState, GameStatus, GameStore,
    Notice, NoticeBoard, NoticeKind, PlayError,
};
use molegrid_data::normalize_locale;
use std::cell::RefCell;
use std::collections::VecDeque;
use std::rc::Rc;
use std::time::Instant;

const MAX_EVENT_LOG: usize = 200;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UiLocale {
    EnUs,
    ZhCn,
}

impl UiLocale {
    pub fn from_opt(value: Option<&str>) -> Self {
        let normalized = normalize_locale(value);
        if normalized == "zh_CN" {
            Self::ZhCn
        } else {
            Self::EnUs
        }
    }

    pub fn code(self) -> &'static str {
        match self {
            Self::EnUs => "en_US",
            Self::ZhCn => "zh_CN",
        }
    }

    pub fn text<'a>(self, en: &'a str, zh: &'a str) -> &'a str {
        if matches!(self, Self::ZhCn) {
            zh
        } else {
            en
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CursorStep {
    Up,
    Down,
    Left,
    Right,
}

pub struct App {
    pub locale: UiLocale,
    pub store: GameStore,
    pub events: Rc<RefCell<EventBus>>,
    pub cursor: usize,
    pub notices: NoticeBoard,
    pub event_log: VecDeque<String>,
    pub status_line: String,
    pub show_help: bool,
    pub confirm_stop: bool,
    pub should_quit: bool,
}

impl App {
    pub fn bootstrap(locale: UiLocale, config: GameConfig) -> Self {
        let notices = NoticeBoard::new(config.notice_timeout());
        let grid_size = config.grid_size;
        let mut store = GameStore::new(config);
        let events = Rc::new(RefCell::new(EventBus::default()));
        let sink = events.clone();
        store.subscribe(move |event: GameEvent, state: &GameState| {
            sink.borrow_mut().push(EventRecord::capture(event, state))
        });
        store.dispatch(Action::Init(GameSetup::with_grid(grid_size)));

        let mut app = Self {
            locale,
            store,
            events,
            cursor: 0,
            notices,
            event_log: VecDeque::new(),
            status_line: locale.text("ready", "就绪").to_string(),
            show_help: false,
            confirm_stop: false,
            should_quit: false,
        };
        let seed_line = format!("{} {}", locale.text("seed", "种子"), app.store.seed());
        app.push_event_line(seed_line);
        app.flush_events();
        app
    }

    pub fn state(&self) -> &GameState {
        self.store.state()
    }

    pub fn grid_size(&self) -> usize {
        self.state().grid_size
    }

    pub fn on_tick(&mut self, now: Instant) {
        self.notices.tick(now);
    }

    pub fn move_cursor(&mut self, step: CursorStep) {
        let grid = self.grid_size();
        if grid == 0 {
            self.cursor = 0;
            return;
        }
        let row = self.cursor / grid;
        let col = self.cursor % grid;
        let (row, col) = match step {
            CursorStep::Up => (wrap_back(row, grid), col),
            CursorStep::Down => ((row + 1) % grid, col),
            CursorStep::Left => (row, wrap_back(col, grid)),
            CursorStep::Right => (row, (col + 1) % grid),
        };
        self.cursor = row * grid + col;
    }

    pub fn click_cursor(&mut self) {
        self.click(self.cursor);
    }

    pub fn click(&mut self, index: usize) {
        if index < self.state().cell_count() {
            self.cursor = index;
        }
        match click_circle(&mut self.store, index) {
            Ok(outcome) => {
                let line = match outcome {
                    ClickOutcome::Hit { score, .. } => {
                        format!("{} ({score})", self.locale.text("hit", "命中"))
                    }
                    ClickOutcome::Miss { score } => {
                        format!("{} ({score})", self.locale.text("miss", "未命中"))
                    }
                    ClickOutcome::Finished { score } => format!(
                        "{}: {score}",
                        self.locale.text("final score", "最终得分")
                    ),
                };
                self.push_status(line);
            }
            Err(err) => self.push_error(err),
        }
        self.flush_events();
    }

    pub fn start(&mut self) {
        match start_game(&mut self.store) {
            Ok(()) => self.push_status(self.locale.text("game started", "游戏开始")),
            Err(err) => self.push_error(err),
        }
        self.flush_events();
    }

    pub fn request_stop(&mut self) {
        if self.state().status != GameStatus::Running {
            self.push_error(PlayError::NotRunning);
            return;
        }
        self.confirm_stop = true;
    }

    /// Consumes keys while the stop confirmation is open.
    pub fn handle_confirm_key(&mut self, key: KeyEvent) -> bool {
        if !self.confirm_stop {
            return false;
        }
        match key.code {
            KeyCode::Char('y') | KeyCode::Char('Y') | KeyCode::Enter => {
                self.confirm_stop = false;
                match stop_game(&mut self.store) {
                    Ok(score) => self.push_status(format!(
                        "{}: {score}",
                        self.locale.text("stopped with score", "停止时得分")
                    )),
                    Err(err) => self.push_error(err),
                }
                self.flush_events();
            }
            KeyCode::Char('n') | KeyCode::Char('N') | KeyCode::Esc => {
                self.confirm_stop = false;
                self.push_status(self.locale.text("stop cancelled", "已取消停止"));
            }
            _ => {}
        }
        true
    }

    pub fn reset(&mut self) {
        reset_game(&mut self.store, None);
        self.push_status(self.locale.text("board reset", "棋盘已重置"));
        self.flush_events();
    }

    pub fn status_label(&self) -> &'static str {
        match self.state().status {
            GameStatus::Running => self.locale.text("running", "进行中"),
            GameStatus::Stopped => self.locale.text("stopped", "已停止"),
            GameStatus::Over => self.locale.text("over", "已结束"),
        }
    }

    pub fn next_hint(&self) -> &'static str {
        match self.state().status {
            GameStatus::Running => self
                .locale
                .text("click the highlighted circle", "点击高亮的圆圈"),
            GameStatus::Stopped => self.locale.text("press s to start", "按 s 开始"),
            GameStatus::Over => self
                .locale
                .text("press s to play again", "按 s 再玩一次"),
        }
    }

    pub fn notice_text(&self, kind: NoticeKind) -> &'static str {
        match kind {
            NoticeKind::GameStarted => self.locale.text(kind.default_text(), "游戏开始！"),
            NoticeKind::GameStopped => self.locale.text(kind.default_text(), "游戏已停止"),
            NoticeKind::GameOver => self.locale.text(kind.default_text(), "游戏结束！"),
            NoticeKind::PressPlay => self.locale.text(kind.default_text(), "请按开始键开始游戏"),
            NoticeKind::AlreadyRunning => self.locale.text(kind.default_text(), "游戏已在进行中"),
            NoticeKind::OutOfBounds => self.locale.text(kind.default_text(), "该圆圈不在棋盘上"),
        }
    }

    pub fn push_status(&mut self, value: impl Into<String>) {
        self.status_line = value.into();
    }

    pub fn push_error(&mut self, err: PlayError) {
        self.status_line = format!("{}: {err}", self.locale.text("error", "错误"));
        self.show_notice(err.notice());
    }

    fn show_notice(&mut self, kind: NoticeKind) {
        let notice = Notice::new(self.notice_text(kind), kind.variant());
        self.notices.show(notice, Instant::now());
    }

    fn flush_events(&mut self) {
        let drained: Vec<_> = self.events.borrow_mut().drain().collect();
        for record in drained {
            self.push_event_line(record.describe());
            if let Some(kind) = notice_for_event(record.event) {
                self.show_notice(kind);
            }
        }
    }

    fn push_event_line(&mut self, line: String) {
        if self.event_log.len() >= MAX_EVENT_LOG {
            let _ = self.event_log.pop_front();
        }
        self.event_log.push_back(line);
    }
}

fn wrap_back(value: usize, len: usize) -> usize {
    if value == 0 {
        len - 1
    } else {
        value - 1
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossterm::event::KeyModifiers;

    fn app(grid_size: usize) -> App {
        App::bootstrap(
            UiLocale::EnUs,
            GameConfig {
                grid_size,
                seed: Some(21),
                ..GameConfig::default()
            },
        )
    }

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    #[test]
    fn cursor_wraps_around_the_grid() {
        let mut app = app(3);
        app.move_cursor(CursorStep::Up);
        assert_eq!(app.cursor, 6);
        app.move_cursor(CursorStep::Left);
        assert_eq!(app.cursor, 8);
        app.move_cursor(CursorStep::Right);
        assert_eq!(app.cursor, 6);
        app.move_cursor(CursorStep::Down);
        assert_eq!(app.cursor, 0);
    }

    #[test]
    fn click_while_stopped_shows_press_play() {
        let mut app = app(2);
        let target = app.state().target_circle_id.expect("target");
        app.click(target);
        assert_eq!(app.state().score, 0);
        assert_eq!(
            app.notices.current().map(|notice| notice.text.as_str()),
            Some("Press play button to start playing the game")
        );
    }

    #[test]
    fn playing_through_logs_game_over() {
        let mut app = app(2);
        app.start();
        assert_eq!(
            app.notices.current().map(|notice| notice.text.as_str()),
            Some("Game Started!")
        );
        while let Some(target) = app.state().target_circle_id {
            app.click(target);
        }
        assert_eq!(app.state().status, GameStatus::Over);
        assert_eq!(app.status_line, "final score: 4");
        assert!(app
            .event_log
            .back()
            .is_some_and(|line| line.starts_with("game-over")));
        assert_eq!(
            app.notices.current().map(|notice| notice.text.as_str()),
            Some("Game is over!")
        );
    }

    #[test]
    fn stop_requires_confirmation() {
        let mut app = app(2);
        app.start();
        let target = app.state().target_circle_id.expect("target");
        app.click(target);
        app.request_stop();
        assert!(app.confirm_stop);
        assert!(app.handle_confirm_key(key(KeyCode::Char('n'))));
        assert_eq!(app.state().status, GameStatus::Running);

        app.request_stop();
        assert!(app.handle_confirm_key(key(KeyCode::Char('y'))));
        assert!(!app.confirm_stop);
        assert_eq!(app.state().status, GameStatus::Stopped);
        assert_eq!(app.status_line, "stopped with score: 1");
        assert!(!app.handle_confirm_key(key(KeyCode::Char('y'))));
    }

    #[test]
    fn zh_locale_translates_notices() {
        let mut app = App::bootstrap(
            UiLocale::from_opt(Some("zh")),
            GameConfig {
                seed: Some(1),
                ..GameConfig::default()
            },
        );
        app.start();
        assert_eq!(
            app.notices.current().map(|notice| notice.text.as_str()),
            Some("游戏开始！")
        );
    }
}
