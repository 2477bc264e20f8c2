use crate::app::App;
use molegrid_core::NoticeVariant;
use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::prelude::{Alignment, Color, Line, Modifier, Style, Stylize};
use ratatui::widgets::{Block, Borders, Clear, Paragraph, Wrap};
use ratatui::Frame;
use std::rc::Rc;

/// Bordered cell used when the board has room for it.
pub const FULL_CELL: CellSize = CellSize {
    width: 7,
    height: 3,
};
/// One-row cell without a border, used on short terminals.
pub const COMPACT_CELL: CellSize = CellSize {
    width: 3,
    height: 1,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CellSize {
    pub width: u16,
    pub height: u16,
}

impl CellSize {
    fn fits(self, inner: Rect, grid_size: usize) -> bool {
        let Ok(grid) = u16::try_from(grid_size) else {
            return false;
        };
        grid.checked_mul(self.width)
            .is_some_and(|width| width <= inner.width)
            && grid
                .checked_mul(self.height)
                .is_some_and(|height| height <= inner.height)
    }
}

pub fn draw(frame: &mut Frame, app: &App) {
    let root = root_layout(frame.area());

    draw_header(frame, root[0], app);
    draw_grid(frame, root[1], app);
    draw_notice(frame, root[2], app);
    draw_events(frame, root[3], app);

    if app.show_help {
        draw_help_popup(frame, app);
    }
    if app.confirm_stop {
        draw_stop_prompt(frame, app);
    }
}

fn root_layout(area: Rect) -> Rc<[Rect]> {
    Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(5),
            Constraint::Min(COMPACT_CELL.height + 2),
            Constraint::Length(3),
            Constraint::Length(8),
        ])
        .split(area)
}

fn grid_inner(area: Rect) -> Rect {
    Block::default()
        .borders(Borders::ALL)
        .inner(root_layout(area)[1])
}

/// Largest cell size that fits the whole board into `inner`, or `None` when
/// even compact cells do not fit.
pub fn cell_size(inner: Rect, grid_size: usize) -> Option<CellSize> {
    if grid_size == 0 {
        return None;
    }
    [FULL_CELL, COMPACT_CELL]
        .into_iter()
        .find(|size| size.fits(inner, grid_size))
}

/// Screen rectangle of cell `index`, or `None` when the board does not fit.
pub fn cell_rect(inner: Rect, grid_size: usize, index: usize) -> Option<Rect> {
    if index >= grid_size * grid_size {
        return None;
    }
    let size = cell_size(inner, grid_size)?;
    let row = (index / grid_size) as u16;
    let col = (index % grid_size) as u16;
    Some(Rect::new(
        inner.x + col * size.width,
        inner.y + row * size.height,
        size.width,
        size.height,
    ))
}

/// Maps a terminal position inside `area` back to the cell drawn there.
pub fn cell_at(area: Rect, grid_size: usize, column: u16, row: u16) -> Option<usize> {
    let inner = grid_inner(area);
    let size = cell_size(inner, grid_size)?;
    if column < inner.x || row < inner.y {
        return None;
    }
    let col = ((column - inner.x) / size.width) as usize;
    let line = ((row - inner.y) / size.height) as usize;
    if col >= grid_size || line >= grid_size {
        return None;
    }
    Some(line * grid_size + col)
}

fn draw_header(frame: &mut Frame, area: Rect, app: &App) {
    let state = app.state();
    let title = format!(
        "{} | {}: {} | {}: {}",
        app.locale.text("Molegrid", "Molegrid"),
        app.locale.text("Status", "状态"),
        app.status_label(),
        app.locale.text("Hint", "提示"),
        app.next_hint()
    );
    let target = state
        .target_circle_id
        .map(|id| id.to_string())
        .unwrap_or_else(|| "-".to_string());
    let summary = format!(
        "{} {}  {} {}  {} {}/{}  {} {}x{}  {} {}",
        app.locale.text("Score", "分数"),
        state.score,
        app.locale.text("Target", "目标"),
        target,
        app.locale.text("Remaining", "剩余"),
        state.remaining(),
        state.cell_count(),
        app.locale.text("Grid", "棋盘"),
        state.grid_size,
        state.grid_size,
        app.locale.text("Seed", "种子"),
        app.store.seed()
    );
    let lines = vec![
        Line::from(title.bold()),
        Line::from(summary),
        Line::from(format!(
            "{}: {}",
            app.locale.text("Last", "最近"),
            app.status_line
        )),
    ];
    let block = Block::default()
        .borders(Borders::ALL)
        .title(app.locale.text("Overview", "概览"));
    let paragraph = Paragraph::new(lines).wrap(Wrap { trim: true }).block(block);
    frame.render_widget(paragraph, area);
}

fn draw_grid(frame: &mut Frame, area: Rect, app: &App) {
    let block = Block::default()
        .borders(Borders::ALL)
        .title(app.locale.text("Board", "棋盘"));
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let state = app.state();
    let Some(size) = cell_size(inner, state.grid_size) else {
        let message = app.locale.text(
            "terminal too small for this board",
            "终端太小，无法显示棋盘",
        );
        frame.render_widget(
            Paragraph::new(message)
                .style(Style::default().fg(Color::Red))
                .alignment(Alignment::Center)
                .wrap(Wrap { trim: true }),
            inner,
        );
        return;
    };
    for index in 0..state.cell_count() {
        let Some(rect) = cell_rect(inner, state.grid_size, index) else {
            continue;
        };
        let (symbol, style) = if state.is_target(index) {
            (
                "◉",
                Style::default()
                    .fg(Color::Yellow)
                    .add_modifier(Modifier::BOLD),
            )
        } else if state.is_selected(index) {
            ("●", Style::default().fg(Color::Green))
        } else {
            ("○", Style::default().fg(Color::Gray))
        };
        let on_cursor = index == app.cursor;
        let cell = if size == FULL_CELL {
            let border = if on_cursor {
                Style::default().fg(Color::Yellow)
            } else {
                Style::default().fg(Color::DarkGray)
            };
            Paragraph::new(Line::from(symbol).style(style))
                .block(Block::default().borders(Borders::ALL).border_style(border))
        } else if on_cursor {
            Paragraph::new(Line::from(symbol).style(style.bg(Color::DarkGray)))
        } else {
            Paragraph::new(Line::from(symbol).style(style))
        };
        frame.render_widget(cell.alignment(Alignment::Center), rect);
    }
}

fn draw_notice(frame: &mut Frame, area: Rect, app: &App) {
    let block = Block::default().borders(Borders::ALL);
    let Some(notice) = app.notices.current() else {
        frame.render_widget(block, area);
        return;
    };
    let background = match notice.variant {
        NoticeVariant::Success => Color::Green,
        NoticeVariant::Error => Color::Red,
        NoticeVariant::Info => Color::DarkGray,
    };
    let paragraph = Paragraph::new(notice.text.as_str())
        .style(Style::default().fg(Color::White).bg(background))
        .alignment(Alignment::Center)
        .block(block);
    frame.render_widget(paragraph, area);
}

fn draw_events(frame: &mut Frame, area: Rect, app: &App) {
    let capacity = area.height.saturating_sub(2) as usize;
    let start = app.event_log.len().saturating_sub(capacity);
    let lines: Vec<Line<'_>> = app
        .event_log
        .iter()
        .skip(start)
        .map(|line| Line::from(line.clone()))
        .collect();
    let block = Block::default()
        .borders(Borders::ALL)
        .title(app.locale.text("Events", "事件"));
    frame.render_widget(Paragraph::new(lines).block(block), area);
}

fn draw_help_popup(frame: &mut Frame, app: &App) {
    let area = centered_rect(60, 50, frame.area());
    frame.render_widget(Clear, area);
    let lines = vec![
        Line::from(app.locale.text(
            "q quit | ? help | esc close/dismiss",
            "q 退出 | ? 帮助 | esc 关闭",
        )),
        Line::from(app.locale.text(
            "arrows/hjkl move | enter/space click | mouse click",
            "方向键/hjkl 移动 | 回车/空格 点击 | 鼠标点击",
        )),
        Line::from(app.locale.text(
            "s start | x stop | r reset board",
            "s 开始 | x 停止 | r 重置棋盘",
        )),
        Line::from(app.locale.text(
            "click the yellow circle; every hit lights up a new one",
            "点击黄色圆圈，每次命中后会亮起新的圆圈",
        )),
    ];
    let block = Block::default()
        .title(app.locale.text("Help", "帮助"))
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Cyan));
    frame.render_widget(
        Paragraph::new(lines)
            .block(block)
            .wrap(Wrap { trim: false }),
        area,
    );
}

fn draw_stop_prompt(frame: &mut Frame, app: &App) {
    let area = centered_rect(50, 28, frame.area());
    frame.render_widget(Clear, area);
    let lines = vec![
        Line::from(format!(
            "{}: {}",
            app.locale.text("Current score", "当前得分"),
            app.state().score
        )),
        Line::from(""),
        Line::from(
            app.locale
                .text("y/Enter = stop  n/Esc = keep playing", "y/回车 = 停止  n/Esc = 继续"),
        ),
    ];
    let block = Block::default()
        .title(app.locale.text("Stop the game?", "停止游戏？"))
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Red));
    frame.render_widget(
        Paragraph::new(lines)
            .block(block)
            .wrap(Wrap { trim: false }),
        area,
    );
}

fn centered_rect(percent_x: u16, percent_y: u16, area: Rect) -> Rect {
    let popup_layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(area);
    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(popup_layout[1])[1]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::UiLocale;
    use molegrid_core::GameConfig;
    use ratatui::backend::TestBackend;
    use ratatui::Terminal;

    const SCREEN: Rect = Rect {
        x: 0,
        y: 0,
        width: 80,
        height: 40,
    };

    #[test]
    fn cells_map_back_to_their_index() {
        let inner = grid_inner(SCREEN);
        for index in 0..9 {
            let rect = cell_rect(inner, 3, index).expect("cell fits");
            assert_eq!(cell_at(SCREEN, 3, rect.x + 1, rect.y + 1), Some(index));
        }
    }

    #[test]
    fn positions_outside_the_grid_miss() {
        let inner = grid_inner(SCREEN);
        assert_eq!(cell_at(SCREEN, 3, 0, 0), None);
        assert_eq!(
            cell_at(SCREEN, 3, inner.x + 3 * FULL_CELL.width, inner.y),
            None
        );
        assert_eq!(cell_at(SCREEN, 0, inner.x, inner.y), None);
    }

    #[test]
    fn short_boards_fall_back_to_compact_cells() {
        let inner = Rect::new(0, 0, FULL_CELL.width * 2, FULL_CELL.height * 2);
        assert_eq!(cell_size(inner, 2), Some(FULL_CELL));
        assert_eq!(cell_size(inner, 3), Some(COMPACT_CELL));
        assert_eq!(cell_rect(inner, 3, 8), Some(Rect::new(6, 2, 3, 1)));
        assert_eq!(cell_size(inner, 7), None);
        assert!(cell_rect(inner, 7, 0).is_none());
        assert!(cell_rect(inner, 3, 9).is_none());
    }

    fn render(app: &App, width: u16, height: u16) -> String {
        let mut terminal = Terminal::new(TestBackend::new(width, height)).expect("terminal");
        terminal.draw(|frame| draw(frame, app)).expect("draw");
        terminal
            .backend()
            .buffer()
            .content
            .iter()
            .map(|cell| cell.symbol())
            .collect()
    }

    fn app_with_grid(grid_size: usize) -> App {
        App::bootstrap(
            UiLocale::EnUs,
            GameConfig {
                grid_size,
                seed: Some(4),
                ..GameConfig::default()
            },
        )
    }

    #[test]
    fn grid_of_three_fits_a_standard_terminal() {
        let area = Rect::new(0, 0, 80, 24);
        let inner = grid_inner(area);
        for index in 0..9 {
            let rect = cell_rect(inner, 3, index).expect("cell fits");
            assert_eq!(cell_at(area, 3, rect.x, rect.y), Some(index));
        }
        let rendered = render(&app_with_grid(3), 80, 24);
        let circles = rendered
            .chars()
            .filter(|ch| matches!(ch, '◉' | '●' | '○'))
            .count();
        assert_eq!(circles, 9);
    }

    #[test]
    fn oversized_board_reports_small_terminal() {
        let rendered = render(&app_with_grid(16), 80, 24);
        assert!(rendered.contains("terminal too small"));
        assert_eq!(cell_at(Rect::new(0, 0, 80, 24), 16, 2, 7), None);
    }

    #[test]
    fn draw_renders_score_and_board() {
        let rendered = render(&app_with_grid(2), 80, 40);
        assert!(rendered.contains("Score 0"));
        assert!(rendered.contains("Board"));
        assert!(rendered.contains("◉"));
    }
}
