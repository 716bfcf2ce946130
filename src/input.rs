use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyModifiers};

/// What a key press asks the driver to do.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Command {
    /// Flap while playing, start or replay otherwise.
    Jump,
    ToggleDayNight,
    Replay,
    Menu,
    Quit,
    SpeedUp,
    SpeedDown,
}

pub fn command_for(key: KeyEvent) -> Option<Command> {
    if key.kind == KeyEventKind::Release {
        return None;
    }
    if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
        return Some(Command::Quit);
    }
    let command = match key.code {
        KeyCode::Char(' ') | KeyCode::Up | KeyCode::Enter => Command::Jump,
        KeyCode::Char('n') => Command::ToggleDayNight,
        KeyCode::Char('r') => Command::Replay,
        KeyCode::Char('m') => Command::Menu,
        KeyCode::Char('d') => Command::SpeedUp,
        KeyCode::Char('c') => Command::SpeedDown,
        KeyCode::Char('q') | KeyCode::Esc => Command::Quit,
        _ => return None,
    };
    Some(command)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn press(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    #[test]
    fn maps_game_keys() {
        assert_eq!(command_for(press(KeyCode::Char(' '))), Some(Command::Jump));
        assert_eq!(command_for(press(KeyCode::Up)), Some(Command::Jump));
        assert_eq!(command_for(press(KeyCode::Char('n'))), Some(Command::ToggleDayNight));
        assert_eq!(command_for(press(KeyCode::Esc)), Some(Command::Quit));
        assert_eq!(command_for(press(KeyCode::Char('x'))), None);
    }

    #[test]
    fn ctrl_c_quits_and_plain_c_slows() {
        let ctrl_c = KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL);
        assert_eq!(command_for(ctrl_c), Some(Command::Quit));
        assert_eq!(command_for(press(KeyCode::Char('c'))), Some(Command::SpeedDown));
    }

    #[test]
    fn releases_are_ignored() {
        let mut key = press(KeyCode::Char(' '));
        key.kind = KeyEventKind::Release;
        assert_eq!(command_for(key), None);
    }
}
