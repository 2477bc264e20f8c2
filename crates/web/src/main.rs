use anyhow::{anyhow, Context};
use molegrid_core::{
    click_circle, notice_for_event, reset_game, start_game, stop_game, Action, EventBus,
    EventRecord, GameConfig, GameEvent, GameSetup, GameState, GameStatus, GameStore, Notice,
    NoticeKind, PlayError,
};
use molegrid_data::{apply_overrides, resolve_game_config, ConfigOverrides};
use serde::{Deserialize, Serialize};
use std::cell::RefCell;
use std::io::Read;
use std::path::PathBuf;
use std::rc::Rc;
use thiserror::Error;
use tiny_http::{Header, Method, Response, Server, StatusCode};

const ADDR_ENV: &str = "MOLEGRID_ADDR";
const DEFAULT_ADDR: &str = "0.0.0.0:7878";

fn main() -> anyhow::Result<()> {
    env_logger::builder()
        .filter_level(log::LevelFilter::Info)
        .parse_default_env()
        .init();
    let args: Vec<String> = std::env::args().skip(1).collect();
    let (config_path, overrides) = parse_args(&args);
    let config = resolve_game_config(config_path.as_deref())?;
    let config = apply_overrides(config, overrides)?;

    let addr = std::env::var(ADDR_ENV).unwrap_or_else(|_| DEFAULT_ADDR.to_string());
    let server = Server::http(addr.as_str())
        .map_err(|err| anyhow!(err))
        .with_context(|| format!("bind {addr}"))?;
    let mut state = AppState::new(config);
    log::info!(
        "molegrid web server on http://{addr} (grid {}, seed {})",
        state.store.state().grid_size,
        state.store.seed()
    );
    for request in server.incoming_requests() {
        if let Err(err) = handle_request(request, &mut state) {
            log::error!("request error: {err}");
        }
    }
    Ok(())
}

fn parse_args(args: &[String]) -> (Option<PathBuf>, ConfigOverrides) {
    let mut config_path = None;
    let mut overrides = ConfigOverrides::default();
    let mut idx = 0usize;
    while idx < args.len() {
        let value = args.get(idx + 1);
        match (args[idx].as_str(), value) {
            ("--config" | "-c", Some(value)) => {
                config_path = Some(PathBuf::from(value));
                idx += 1;
            }
            ("--grid" | "-g", Some(value)) => {
                overrides.grid_size = value.parse::<usize>().ok();
                idx += 1;
            }
            ("--seed", Some(value)) => {
                overrides.seed = value.parse::<u64>().ok();
                idx += 1;
            }
            _ => {}
        }
        idx += 1;
    }
    (config_path, overrides)
}

struct AppState {
    store: GameStore,
    events: Rc<RefCell<EventBus>>,
}

impl AppState {
    fn new(config: GameConfig) -> Self {
        let grid_size = config.grid_size;
        let mut store = GameStore::new(config);
        let events = Rc::new(RefCell::new(EventBus::default()));
        let sink = events.clone();
        store.subscribe(move |event: GameEvent, state: &GameState| {
            sink.borrow_mut().push(EventRecord::capture(event, state))
        });
        store.dispatch(Action::Init(GameSetup::with_grid(grid_size)));
        Self { store, events }
    }
}

#[derive(Serialize)]
struct ApiResponse {
    ok: bool,
    error: Option<String>,
    notice: Option<Notice>,
    state: UiState,
    events: Vec<EventRecord>,
    notice_ms: u64,
}

#[derive(Serialize)]
struct UiState {
    score: i64,
    selected: Vec<usize>,
    status: GameStatus,
    target: i64,
    grid_size: usize,
    remaining: usize,
    seed: u64,
}

#[derive(Deserialize)]
struct ActionRequest {
    action: String,
    #[serde(default)]
    index: Option<i64>,
    #[serde(default)]
    grid_size: Option<usize>,
}

#[derive(Debug, Error)]
enum ActionError {
    #[error(transparent)]
    Play(#[from] PlayError),
    #[error("circle {0} is outside the grid")]
    NegativeIndex(i64),
    #[error("{0}")]
    BadRequest(String),
}

impl ActionError {
    fn notice(&self) -> Option<NoticeKind> {
        match self {
            Self::Play(err) => Some(err.notice()),
            Self::NegativeIndex(_) => Some(NoticeKind::OutOfBounds),
            Self::BadRequest(_) => None,
        }
    }
}

fn handle_request(
    mut request: tiny_http::Request,
    state: &mut AppState,
) -> Result<(), Box<dyn std::error::Error>> {
    let url = request.url().to_string();
    let method = request.method().clone();
    log::debug!("{method:?} {url}");
    match (method, url.as_str()) {
        (Method::Get, "/") => {
            respond_with_file(request, web_path("index.html"), "text/html; charset=utf-8")?;
        }
        (Method::Get, "/app.js") => {
            respond_with_file(request, web_path("app.js"), "application/javascript")?;
        }
        (Method::Get, "/styles.css") => {
            respond_with_file(request, web_path("styles.css"), "text/css; charset=utf-8")?;
        }
        (Method::Get, "/api/state") => {
            let response = build_response(state, None);
            respond_json(request, &response, StatusCode(200))?;
        }
        (Method::Post, "/api/action") => {
            let mut body = String::new();
            request.as_reader().read_to_string(&mut body)?;
            let (response, status) = match serde_json::from_str::<ActionRequest>(&body) {
                Ok(action) => {
                    let result = apply_action(state, action);
                    (build_response(state, result.err()), StatusCode(200))
                }
                Err(err) => {
                    let err = ActionError::BadRequest(format!("invalid request body: {err}"));
                    (build_response(state, Some(err)), StatusCode(400))
                }
            };
            respond_json(request, &response, status)?;
        }
        _ => {
            request.respond(Response::empty(StatusCode(404)))?;
        }
    }
    Ok(())
}

fn web_path(file: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("..")
        .join("..")
        .join("web")
        .join(file)
}

fn content_type(value: &str) -> Result<Header, Box<dyn std::error::Error>> {
    Header::from_bytes(&b"Content-Type"[..], value.as_bytes())
        .map_err(|_| format!("invalid content type '{value}'").into())
}

fn respond_with_file(
    request: tiny_http::Request,
    path: PathBuf,
    mime: &str,
) -> Result<(), Box<dyn std::error::Error>> {
    let mut file = std::fs::File::open(&path)
        .map_err(|err| format!("open {}: {err}", path.display()))?;
    let mut content = Vec::new();
    file.read_to_end(&mut content)?;
    let response = Response::from_data(content).with_header(content_type(mime)?);
    request.respond(response)?;
    Ok(())
}

fn respond_json(
    request: tiny_http::Request,
    response: &ApiResponse,
    status: StatusCode,
) -> Result<(), Box<dyn std::error::Error>> {
    let body = serde_json::to_vec_pretty(response)?;
    let response = Response::from_data(body)
        .with_status_code(status)
        .with_header(content_type("application/json")?);
    request.respond(response)?;
    Ok(())
}

fn build_response(state: &mut AppState, err: Option<ActionError>) -> ApiResponse {
    let events: Vec<EventRecord> = state.events.borrow_mut().drain().collect();
    let notice = err
        .as_ref()
        .and_then(ActionError::notice)
        .or_else(|| {
            events
                .iter()
                .rev()
                .find_map(|record| notice_for_event(record.event))
        })
        .map(NoticeKind::notice);
    ApiResponse {
        ok: err.is_none(),
        error: err.map(|err| err.to_string()),
        notice,
        state: snapshot_state(&state.store),
        events,
        notice_ms: state.store.config().notice_ms,
    }
}

fn snapshot_state(store: &GameStore) -> UiState {
    let state = store.state();
    UiState {
        score: state.score,
        selected: state.selected_circles.iter().copied().collect(),
        status: state.status,
        target: state.target_index(),
        grid_size: state.grid_size,
        remaining: state.remaining(),
        seed: store.seed(),
    }
}

fn apply_action(state: &mut AppState, req: ActionRequest) -> Result<(), ActionError> {
    match req.action.as_str() {
        "start" => start_game(&mut state.store)?,
        "stop" => {
            let score = stop_game(&mut state.store)?;
            log::info!("game stopped with score {score}");
        }
        "reset" => {
            if let Some(grid_size) = req.grid_size {
                let probe = GameConfig {
                    grid_size,
                    ..state.store.config().clone()
                };
                probe
                    .validate()
                    .map_err(|err| ActionError::BadRequest(err.to_string()))?;
            }
            reset_game(&mut state.store, req.grid_size);
        }
        "click" => {
            let raw = req
                .index
                .ok_or_else(|| ActionError::BadRequest("click needs an index".to_string()))?;
            let index = usize::try_from(raw).map_err(|_| ActionError::NegativeIndex(raw))?;
            click_circle(&mut state.store, index)?;
        }
        other => return Err(ActionError::BadRequest(format!("unknown action '{other}'"))),
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn app_state() -> AppState {
        AppState::new(GameConfig {
            seed: Some(12),
            ..GameConfig::default()
        })
    }

    fn request(action: &str, index: Option<i64>) -> ActionRequest {
        ActionRequest {
            action: action.to_string(),
            index,
            grid_size: None,
        }
    }

    #[test]
    fn initial_snapshot_has_a_target() {
        let mut state = app_state();
        let response = build_response(&mut state, None);
        assert!(response.ok);
        assert_eq!(response.state.grid_size, 2);
        assert!(response.state.target >= 0);
        assert_eq!(response.events.len(), 1);
        assert_eq!(response.events[0].event, GameEvent::GameInit);
        assert_eq!(response.notice_ms, 2000);
    }

    #[test]
    fn click_before_start_returns_press_play_notice() {
        let mut state = app_state();
        let target = state.store.state().target_circle_id.expect("target");
        let err = apply_action(&mut state, request("click", Some(target as i64)))
            .expect_err("refused");
        let response = build_response(&mut state, Some(err));
        assert!(!response.ok);
        assert_eq!(
            response.notice.map(|notice| notice.text),
            Some("Press play button to start playing the game".to_string())
        );
        assert_eq!(response.state.score, 0);
    }

    #[test]
    fn start_then_hit_updates_score() {
        let mut state = app_state();
        apply_action(&mut state, request("start", None)).expect("start");
        let started = build_response(&mut state, None);
        assert_eq!(
            started.notice.map(|notice| notice.text),
            Some("Game Started!".to_string())
        );
        let target = state.store.state().target_circle_id.expect("target");
        apply_action(&mut state, request("click", Some(target as i64))).expect("click");
        let response = build_response(&mut state, None);
        assert_eq!(response.state.score, 1);
        assert_eq!(response.state.selected, vec![target]);
        let names: Vec<_> = response.events.iter().map(|record| record.event).collect();
        assert_eq!(names, vec![GameEvent::ScoreUpdated, GameEvent::CircleClicked]);
    }

    #[test]
    fn bad_requests_are_reported() {
        let mut state = app_state();
        let err = apply_action(&mut state, request("click", None)).expect_err("no index");
        assert_eq!(err.to_string(), "click needs an index");
        let err = apply_action(&mut state, request("jump", None)).expect_err("unknown");
        assert_eq!(err.to_string(), "unknown action 'jump'");
        let err = apply_action(
            &mut state,
            ActionRequest {
                action: "reset".to_string(),
                index: None,
                grid_size: Some(0),
            },
        )
        .expect_err("grid 0");
        assert!(err.to_string().contains("grid size 0"));
    }

    #[test]
    fn reset_resizes_board() {
        let mut state = app_state();
        apply_action(
            &mut state,
            ActionRequest {
                action: "reset".to_string(),
                index: None,
                grid_size: Some(4),
            },
        )
        .expect("reset");
        let response = build_response(&mut state, None);
        assert_eq!(response.state.grid_size, 4);
        assert_eq!(response.state.remaining, 16);
    }

    #[test]
    fn parses_server_flags() {
        let args: Vec<String> = ["--grid", "3", "--seed", "5", "--config", "x.json"]
            .iter()
            .map(|value| value.to_string())
            .collect();
        let (path, overrides) = parse_args(&args);
        assert_eq!(path, Some(PathBuf::from("x.json")));
        assert_eq!(overrides.grid_size, Some(3));
        assert_eq!(overrides.seed, Some(5));
    }

    #[test]
    fn negative_click_reports_out_of_bounds() {
        let mut state = app_state();
        apply_action(&mut state, request("start", None)).expect("start");
        let body = r#"{"action": "click", "index": -1}"#;
        let action: ActionRequest = serde_json::from_str(body).expect("parse body");
        let err = apply_action(&mut state, action).expect_err("negative index");
        assert_eq!(err.to_string(), "circle -1 is outside the grid");
        let response = build_response(&mut state, Some(err));
        assert!(!response.ok);
        assert_eq!(
            response.notice.map(|notice| notice.text),
            Some("That circle is not on the board".to_string())
        );
        assert_eq!(response.state.score, 0);
    }
}
