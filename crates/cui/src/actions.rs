use crate::app::{App, CursorStep};
use crate::input::InputAction;

pub fn dispatch(app: &mut App, action: InputAction) {
    match action {
        InputAction::None => {}
        InputAction::Quit => app.should_quit = true,
        InputAction::ToggleHelp => app.show_help = !app.show_help,
        InputAction::Dismiss => {
            if app.show_help {
                app.show_help = false;
            } else {
                app.notices.clear();
            }
        }
        InputAction::MoveUp => app.move_cursor(CursorStep::Up),
        InputAction::MoveDown => app.move_cursor(CursorStep::Down),
        InputAction::MoveLeft => app.move_cursor(CursorStep::Left),
        InputAction::MoveRight => app.move_cursor(CursorStep::Right),
        InputAction::Click => app.click_cursor(),
        InputAction::ClickCell(index) => app.click(index),
        InputAction::Start => app.start(),
        InputAction::Stop => app.request_stop(),
        InputAction::Reset => app.reset(),
    }
}
