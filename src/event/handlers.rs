use crate::app::{AppState, Notice};
use crossterm::event::{self, KeyEvent, KeyModifiers};
use internet_tile::network::SignalLevel;
use internet_tile::tile::ToggleCommand;

/// What the run loop should do after a key press
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyAction {
    None,
    Quit,
    ToggleTile,
}

/// Human readable key name for the key logger
pub fn key_label(key: &KeyEvent) -> String {
    let mut label = String::new();
    if key.modifiers.contains(KeyModifiers::CONTROL) {
        label.push_str("Ctrl+");
    }
    if key.modifiers.contains(KeyModifiers::ALT) {
        label.push_str("Alt+");
    }
    if key.modifiers.contains(KeyModifiers::SHIFT) && !matches!(key.code, event::KeyCode::Char(_)) {
        label.push_str("Shift+");
    }

    let code = match key.code {
        event::KeyCode::Char(' ') => "Space".to_string(),
        event::KeyCode::Char(c) => c.to_string(),
        event::KeyCode::Enter => "Enter".to_string(),
        event::KeyCode::Esc => "Esc".to_string(),
        event::KeyCode::Tab => "Tab".to_string(),
        event::KeyCode::F(n) => format!("F{}", n),
        _ => format!("{:?}", key.code),
    };
    label.push_str(&code);
    label
}

/// Handle keyboard events for the tile itself
pub fn handle_main_view(key: KeyEvent, state: &mut AppState) -> KeyAction {
    match key.code {
        event::KeyCode::Char('q') | event::KeyCode::Esc => return KeyAction::Quit,
        event::KeyCode::Char('[') if key.modifiers.contains(KeyModifiers::CONTROL) => {
            return KeyAction::Quit;
        }
        event::KeyCode::Enter | event::KeyCode::Char(' ') => match &state.tile {
            Some(tile) => tile.cycle(),
            None => state.notify(Notice::TileHidden),
        },
        event::KeyCode::Char('l') => match &state.tile {
            Some(tile) => tile.long_press(),
            None => state.notify(Notice::TileHidden),
        },
        event::KeyCode::Char('v') => return KeyAction::ToggleTile,
        event::KeyCode::Char('u') => state.toggle_require_unlock(),
        _ => handle_device_keys(key, state),
    }
    KeyAction::None
}

/// Keys that poke the simulated device behind the tile's back
fn handle_device_keys(key: KeyEvent, state: &mut AppState) {
    let Some(device) = &state.device else {
        return;
    };
    let current = device.state();
    match key.code {
        event::KeyCode::Char('w') => device.set_wifi_enabled(!current.wifi_enabled),
        event::KeyCode::Char('d') => device.set_data_enabled(!current.data_enabled),
        event::KeyCode::Char('k') => device.set_locked(!current.locked),
        event::KeyCode::Char('p') => device.set_privileged(!current.privileged),
        event::KeyCode::Char('s') => {
            let next = (current.cellular_signal.get() + 1) % (SignalLevel::MAX + 1);
            device.set_cellular_signal(SignalLevel::new(next));
        }
        event::KeyCode::Char('f') => {
            device.fail_next(ToggleCommand::EnableWifi);
            device.fail_next(ToggleCommand::EnableData);
        }
        _ => {}
    }
}
