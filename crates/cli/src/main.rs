use anyhow::Context;
use molegrid_core::{
    click_circle, notice_for_event, reset_game, start_game, stop_game, Action, ClickOutcome,
    EventBus, EventRecord, GameConfig, GameEvent, GameSetup, GameState, GameStatus, GameStore,
    NoticeKind, PlayError,
};
use molegrid_data::{
    apply_overrides, normalize_locale, resolve_game_config, ConfigOverrides, LANG_ENV,
};
use std::cell::RefCell;
use std::io::{self, BufRead, Write};
use std::path::PathBuf;
use std::rc::Rc;

const DEFAULT_AUTO_SEED: u64 = 0xC0FFEE;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum UiLocale {
    EnUs,
    ZhCn,
}

impl UiLocale {
    fn code(self) -> &'static str {
        match self {
            Self::EnUs => "en_US",
            Self::ZhCn => "zh_CN",
        }
    }

    fn from_opt(value: Option<&str>) -> Self {
        if normalize_locale(value) == "zh_CN" {
            Self::ZhCn
        } else {
            Self::EnUs
        }
    }

    fn text<'a>(self, en: &'a str, zh: &'a str) -> &'a str {
        if matches!(self, Self::ZhCn) {
            zh
        } else {
            en
        }
    }
}

#[derive(Debug, Clone)]
struct CliOptions {
    auto: bool,
    cui: bool,
    seed: Option<u64>,
    grid_size: Option<usize>,
    config_path: Option<PathBuf>,
    locale: UiLocale,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Command {
    Help,
    Start,
    Stop,
    Click(usize),
    Reset(Option<usize>),
    Board,
    State,
    Quit,
}

fn parse_cli_options(args: &[String]) -> CliOptions {
    let mut options = CliOptions {
        auto: false,
        cui: false,
        seed: None,
        grid_size: None,
        config_path: None,
        locale: UiLocale::EnUs,
    };
    let mut locale_arg: Option<String> = std::env::var(LANG_ENV).ok();
    let mut idx = 0usize;
    while idx < args.len() {
        let value = args.get(idx + 1);
        match (args[idx].as_str(), value) {
            ("--auto", _) => options.auto = true,
            ("--cui", _) => options.cui = true,
            ("--lang" | "-l", Some(value)) => {
                locale_arg = Some(value.clone());
                idx += 1;
            }
            ("--seed", Some(value)) => {
                options.seed = value.parse::<u64>().ok();
                idx += 1;
            }
            ("--grid" | "-g", Some(value)) => {
                options.grid_size = value.parse::<usize>().ok();
                idx += 1;
            }
            ("--config" | "-c", Some(value)) => {
                options.config_path = Some(PathBuf::from(value));
                idx += 1;
            }
            _ => {}
        }
        idx += 1;
    }
    options.locale = UiLocale::from_opt(locale_arg.as_deref());
    options
}

fn main() {
    env_logger::builder()
        .filter_level(log::LevelFilter::Warn)
        .parse_default_env()
        .init();
    let args: Vec<String> = std::env::args().skip(1).collect();
    let options = parse_cli_options(&args);
    if options.cui {
        let launch = molegrid_cui::LaunchOptions {
            locale: Some(options.locale.code().to_string()),
            config_path: options.config_path.clone(),
            grid_size: options.grid_size,
            seed: options.seed,
        };
        if let Err(err) = molegrid_cui::run(launch) {
            eprintln!("cui launch error: {err:#}");
            std::process::exit(1);
        }
        return;
    }
    let result = if options.auto {
        run_auto(&options)
    } else {
        run_repl(&options)
    };
    if let Err(err) = result {
        eprintln!("error: {err:#}");
        std::process::exit(1);
    }
}

fn load_config(options: &CliOptions) -> anyhow::Result<GameConfig> {
    let config = resolve_game_config(options.config_path.as_deref())?;
    apply_overrides(
        config,
        ConfigOverrides {
            grid_size: options.grid_size,
            seed: options.seed,
        },
    )
}

fn build_store(config: GameConfig) -> (GameStore, Rc<RefCell<EventBus>>) {
    let grid_size = config.grid_size;
    let mut store = GameStore::new(config);
    let events = Rc::new(RefCell::new(EventBus::default()));
    let sink = events.clone();
    store.subscribe(move |event: GameEvent, state: &GameState| {
        sink.borrow_mut().push(EventRecord::capture(event, state))
    });
    store.dispatch(Action::Init(GameSetup::with_grid(grid_size)));
    (store, events)
}

fn run_auto(options: &CliOptions) -> anyhow::Result<()> {
    let mut config = load_config(options)?;
    config.seed = Some(config.seed.unwrap_or(DEFAULT_AUTO_SEED));
    let (mut store, events) = build_store(config);
    println!("locale: {}", options.locale.code());
    println!(
        "seed: {} grid: {}x{}",
        store.seed(),
        store.state().grid_size,
        store.state().grid_size
    );

    start_game(&mut store).context("start auto game")?;
    if let Some(miss) = first_non_target(store.state()) {
        let outcome = click_circle(&mut store, miss).context("auto miss")?;
        println!("miss at {miss}, score {}", outcome.score());
    }
    while let Some(target) = store.state().target_circle_id {
        let outcome = click_circle(&mut store, target).context("auto hit")?;
        println!("hit {target}, score {}", outcome.score());
        if matches!(outcome, ClickOutcome::Finished { .. }) {
            break;
        }
    }
    println!(
        "final score: {} status: {}",
        store.state().score,
        store.state().status.name()
    );

    for record in events.borrow_mut().drain() {
        println!("event: {}", record.describe());
    }
    Ok(())
}

fn first_non_target(state: &GameState) -> Option<usize> {
    (0..state.cell_count()).find(|index| !state.is_target(*index) && !state.is_selected(*index))
}

fn run_repl(options: &CliOptions) -> anyhow::Result<()> {
    let locale = options.locale;
    let config = load_config(options)?;
    let (mut store, events) = build_store(config);
    println!("{}: {}", locale.text("locale", "语言"), locale.code());
    println!("{}: {}", locale.text("seed", "种子"), store.seed());
    print_help(locale);
    drain_events(locale, &events);
    print_board(locale, store.state());

    let stdin = io::stdin();
    let mut input = stdin.lock();
    loop {
        let Some(line) = prompt_line(&mut input, &prompt_text(locale, store.state()))? else {
            break;
        };
        let command = match parse_command(&line) {
            Ok(Some(command)) => command,
            Ok(None) => continue,
            Err(err) => {
                println!("{}: {err}", locale.text("error", "错误"));
                continue;
            }
        };
        match command {
            Command::Help => print_help(locale),
            Command::Quit => break,
            Command::Board => print_board(locale, store.state()),
            Command::State => {
                let json = serde_json::to_string_pretty(store.state())?;
                println!("{json}");
            }
            Command::Start => {
                if let Err(err) = start_game(&mut store) {
                    print_play_error(locale, err);
                }
                drain_events(locale, &events);
                print_board(locale, store.state());
            }
            Command::Stop => {
                if store.state().status != GameStatus::Running {
                    print_play_error(locale, PlayError::NotRunning);
                    continue;
                }
                let question = format!(
                    "{} {}. {} [y/N] ",
                    locale.text("Current score", "当前得分"),
                    store.state().score,
                    locale.text("Stop the game?", "停止游戏？")
                );
                let answer = prompt_line(&mut input, &question)?.unwrap_or_default();
                if !is_yes(&answer) {
                    println!("{}", locale.text("stop cancelled", "已取消停止"));
                    continue;
                }
                match stop_game(&mut store) {
                    Ok(score) => println!(
                        "{}: {score}",
                        locale.text("stopped with score", "停止时得分")
                    ),
                    Err(err) => print_play_error(locale, err),
                }
                drain_events(locale, &events);
            }
            Command::Click(index) => {
                match click_circle(&mut store, index) {
                    Ok(ClickOutcome::Hit { score, .. }) => {
                        println!("{} ({score})", locale.text("hit", "命中"))
                    }
                    Ok(ClickOutcome::Miss { score }) => {
                        println!("{} ({score})", locale.text("miss", "未命中"))
                    }
                    Ok(ClickOutcome::Finished { score }) => {
                        println!("{}: {score}", locale.text("final score", "最终得分"))
                    }
                    Err(err) => print_play_error(locale, err),
                }
                drain_events(locale, &events);
                print_board(locale, store.state());
            }
            Command::Reset(grid_size) => {
                if let Some(grid_size) = grid_size {
                    let probe = GameConfig {
                        grid_size,
                        ..store.config().clone()
                    };
                    if let Err(err) = probe.validate() {
                        println!("{}: {err}", locale.text("error", "错误"));
                        continue;
                    }
                }
                reset_game(&mut store, grid_size);
                drain_events(locale, &events);
                print_board(locale, store.state());
            }
        }
    }
    Ok(())
}

fn parse_command(line: &str) -> Result<Option<Command>, String> {
    let input = line.trim();
    if input.is_empty() {
        return Ok(None);
    }
    let mut parts = input.split_whitespace();
    let cmd = parts.next().unwrap_or("");
    let args: Vec<&str> = parts.collect();
    let command = match cmd {
        "help" | "h" | "?" => Command::Help,
        "quit" | "exit" | "q" => Command::Quit,
        "start" | "play" => Command::Start,
        "stop" => Command::Stop,
        "board" | "ls" => Command::Board,
        "state" => Command::State,
        "click" | "c" => {
            let value = args.first().ok_or("click needs a circle index")?;
            Command::Click(parse_index(value)?)
        }
        "reset" => match args.first() {
            Some(value) => Command::Reset(Some(
                value
                    .parse::<usize>()
                    .map_err(|_| format!("invalid grid size '{value}'"))?,
            )),
            None => Command::Reset(None),
        },
        other if other.chars().all(|ch| ch.is_ascii_digit()) => {
            Command::Click(parse_index(other)?)
        }
        other => return Err(format!("unknown command '{other}', try help")),
    };
    Ok(Some(command))
}

fn parse_index(value: &str) -> Result<usize, String> {
    value
        .parse::<usize>()
        .map_err(|_| format!("invalid circle index '{value}'"))
}

fn is_yes(answer: &str) -> bool {
    matches!(answer.trim().to_ascii_lowercase().as_str(), "y" | "yes")
}

fn prompt_line(input: &mut impl BufRead, prompt: &str) -> anyhow::Result<Option<String>> {
    print!("{prompt}");
    io::stdout().flush().context("flush prompt")?;
    let mut line = String::new();
    let read = input.read_line(&mut line).context("read command")?;
    if read == 0 {
        println!();
        return Ok(None);
    }
    Ok(Some(line))
}

fn prompt_text(locale: UiLocale, state: &GameState) -> String {
    let status = match state.status {
        GameStatus::Running => locale.text("running", "进行中"),
        GameStatus::Stopped => locale.text("stopped", "已停止"),
        GameStatus::Over => locale.text("over", "已结束"),
    };
    format!("[{status} {}] > ", state.score)
}

fn print_help(locale: UiLocale) {
    println!("{}", locale.text("Commands:", "命令："));
    println!(
        "  help|h|?                 {}",
        locale.text("show help", "显示帮助")
    );
    println!(
        "  start                    {}",
        locale.text("start the game", "开始游戏")
    );
    println!(
        "  stop                     {}",
        locale.text("stop the game (asks first)", "停止游戏（需确认）")
    );
    println!(
        "  click N | c N | N        {}",
        locale.text("click circle N", "点击第 N 个圆圈")
    );
    println!(
        "  reset [grid]             {}",
        locale.text("fresh board, optionally resized", "重置棋盘，可指定大小")
    );
    println!(
        "  board|ls                 {}",
        locale.text("show the board", "显示棋盘")
    );
    println!(
        "  state                    {}",
        locale.text("dump state as JSON", "以 JSON 输出状态")
    );
    println!("  quit|exit                {}", locale.text("exit", "退出"));
}

fn print_board(locale: UiLocale, state: &GameState) {
    println!(
        "{} {}  {} {}/{}",
        locale.text("score", "分数"),
        state.score,
        locale.text("remaining", "剩余"),
        state.remaining(),
        state.cell_count()
    );
    for row in 0..state.grid_size {
        let line: Vec<String> = (0..state.grid_size)
            .map(|col| {
                let index = row * state.grid_size + col;
                let mark = if state.is_target(index) {
                    '@'
                } else if state.is_selected(index) {
                    '#'
                } else {
                    '.'
                };
                format!("{mark}{index:<3}")
            })
            .collect();
        println!("  {}", line.join(" "));
    }
}

fn print_play_error(locale: UiLocale, err: PlayError) {
    println!("{}: {}", locale.text("notice", "提示"), notice_text(locale, err.notice()));
}

fn notice_text(locale: UiLocale, kind: NoticeKind) -> &'static str {
    match kind {
        NoticeKind::GameStarted => locale.text(kind.default_text(), "游戏开始！"),
        NoticeKind::GameStopped => locale.text(kind.default_text(), "游戏已停止"),
        NoticeKind::GameOver => locale.text(kind.default_text(), "游戏结束！"),
        NoticeKind::PressPlay => locale.text(kind.default_text(), "请按开始键开始游戏"),
        NoticeKind::AlreadyRunning => locale.text(kind.default_text(), "游戏已在进行中"),
        NoticeKind::OutOfBounds => locale.text(kind.default_text(), "该圆圈不在棋盘上"),
    }
}

fn drain_events(locale: UiLocale, events: &Rc<RefCell<EventBus>>) {
    let drained: Vec<EventRecord> = events.borrow_mut().drain().collect();
    for record in drained {
        println!("{}: {}", locale.text("event", "事件"), record.describe());
        if let Some(kind) = notice_for_event(record.event) {
            println!("{}: {}", locale.text("notice", "提示"), notice_text(locale, kind));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(values: &[&str]) -> Vec<String> {
        values.iter().map(|value| value.to_string()).collect()
    }

    macro_rules! command_case {
        ($name:ident, $line:expr, $expected:expr) => {
            #[test]
            fn $name() {
                assert_eq!(parse_command($line), Ok(Some($expected)));
            }
        };
    }

    command_case!(help_alias, "?", Command::Help);
    command_case!(start_word, "start", Command::Start);
    command_case!(stop_word, "  stop ", Command::Stop);
    command_case!(click_long, "click 3", Command::Click(3));
    command_case!(click_short, "c 0", Command::Click(0));
    command_case!(bare_index, "7", Command::Click(7));
    command_case!(reset_plain, "reset", Command::Reset(None));
    command_case!(reset_sized, "reset 4", Command::Reset(Some(4)));
    command_case!(board_alias, "ls", Command::Board);
    command_case!(quit_alias, "exit", Command::Quit);

    #[test]
    fn blank_lines_are_skipped() {
        assert_eq!(parse_command("   "), Ok(None));
    }

    #[test]
    fn bad_commands_are_rejected() {
        assert!(parse_command("click").is_err());
        assert!(parse_command("click x").is_err());
        assert!(parse_command("reset big").is_err());
        assert!(parse_command("jump")
            .err()
            .is_some_and(|err| err.contains("unknown command 'jump'")));
    }

    #[test]
    fn parses_cli_flags() {
        let options = parse_cli_options(&args(&[
            "--auto", "--seed", "3", "-g", "4", "--config", "game.json", "--lang", "zh",
        ]));
        assert!(options.auto);
        assert!(!options.cui);
        assert_eq!(options.seed, Some(3));
        assert_eq!(options.grid_size, Some(4));
        assert_eq!(options.config_path, Some(PathBuf::from("game.json")));
        assert_eq!(options.locale, UiLocale::ZhCn);
    }

    #[test]
    fn yes_answers() {
        assert!(is_yes("y\n"));
        assert!(is_yes("YES"));
        assert!(!is_yes(""));
        assert!(!is_yes("n"));
    }

    #[test]
    fn first_non_target_skips_the_target() {
        let (store, _events) = build_store(GameConfig {
            seed: Some(8),
            ..GameConfig::default()
        });
        let miss = first_non_target(store.state()).expect("free cell");
        assert!(!store.state().is_target(miss));
    }

    #[test]
    fn prompt_shows_status_and_score() {
        let state = GameState::new();
        assert_eq!(prompt_text(UiLocale::EnUs, &state), "[stopped 0] > ");
    }
}
