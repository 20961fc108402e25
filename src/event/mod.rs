//! Event handling for the tile front end
//!
//! Drains session updates, handles keyboard input and drives the main loop.

mod handlers;

use crate::{app::AppState, ui::render};
use color_eyre::eyre::Result;
use crossterm::event::{self, Event, KeyModifiers};
use handlers::{KeyAction, handle_main_view, key_label};
use internet_tile::config;
use ratatui::DefaultTerminal;
use std::time::{Duration, Instant};

pub async fn run(mut terminal: DefaultTerminal, state: &mut AppState) -> Result<()> {
    state.show_tile().await?;

    loop {
        state.poll_updates();
        state.expire_notice();
        terminal.draw(|frame| render(frame, state))?;

        if event::poll(Duration::from_millis(config::EVENT_POLL_MS))? {
            if let Event::Key(key) = event::read()? {
                if key.kind != event::KeyEventKind::Press {
                    continue;
                }
                if state.ui.show_key_logger {
                    state.ui.last_key_press = Some((key_label(&key), Instant::now()));
                }

                // Any key dismisses the current notice
                state.ui.notice = None;

                if key.code == event::KeyCode::Char('c')
                    && key.modifiers.contains(KeyModifiers::CONTROL)
                {
                    break;
                }

                match handle_main_view(key, state) {
                    KeyAction::Quit => break,
                    KeyAction::ToggleTile => state.toggle_tile().await?,
                    KeyAction::None => {}
                }
            }
        } else if state.is_switching() {
            state.ui.loading_frame = (state.ui.loading_frame + 1) % config::LOADING_CHARS.len();
        }
    }

    state.hide_tile().await;
    Ok(())
}
