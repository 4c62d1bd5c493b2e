//! Keyboard input handling.
//!
//! Maps terminal key events to [`App`] actions.  Adding a new keybinding is
//! a single match arm in [`handle_key_event`].
//!
//! ## For contributors
//!
//! To add a new keybinding:
//!
//! 1. Add a method on [`App`] for the action (if one doesn't exist).
//! 2. Add a `KeyCode` match arm in [`handle_key_event`] that calls it.
//! 3. Update the help text in [`crate::ui`]'s status bar.
//! 4. Update the keybindings table in `README.md`.

use crossterm::event::{KeyCode, KeyEvent, KeyEventKind};

use crate::app::App;

/// Process a single key event, updating app state accordingly.
///
/// Only reacts to key-press events (ignoring release / repeat) so that each
/// physical keypress triggers exactly one action.
pub fn handle_key_event(app: &mut App, key: KeyEvent) {
    if key.kind != KeyEventKind::Press {
        return;
    }

    match key.code {
        KeyCode::Char('q') | KeyCode::Esc => app.quit = true,
        KeyCode::Down | KeyCode::Char('j') => app.select_next(),
        KeyCode::Up | KeyCode::Char('k') => app.select_previous(),
        KeyCode::Home | KeyCode::Char('g') => app.select_first(),
        KeyCode::End | KeyCode::Char('G') => app.select_last(),
        KeyCode::Char('r') | KeyCode::Enter => app.request_retry(),
        _ => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::tests::app_with;
    use crate::controller::Trigger;
    use crossterm::event::{KeyEventState, KeyModifiers};

    fn press(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    #[test]
    fn q_and_esc_quit() {
        let mut app = app_with(&["a"]);
        handle_key_event(&mut app, press(KeyCode::Char('q')));
        assert!(app.quit);

        let mut app = app_with(&["a"]);
        handle_key_event(&mut app, press(KeyCode::Esc));
        assert!(app.quit);
    }

    #[test]
    fn vim_keys_navigate() {
        let mut app = app_with(&["a", "b", "c"]);
        handle_key_event(&mut app, press(KeyCode::Char('G')));
        assert_eq!(app.list_state.selected(), Some(2));
        handle_key_event(&mut app, press(KeyCode::Char('k')));
        assert_eq!(app.list_state.selected(), Some(1));
        handle_key_event(&mut app, press(KeyCode::Char('g')));
        assert_eq!(app.list_state.selected(), Some(0));
        handle_key_event(&mut app, press(KeyCode::Char('j')));
        assert_eq!(app.list_state.selected(), Some(1));
    }

    #[test]
    fn r_queues_manual_load() {
        let mut app = app_with(&["a"]);
        handle_key_event(&mut app, press(KeyCode::Char('r')));
        assert_eq!(app.next_trigger(), Some(Trigger::Retry));
    }

    #[test]
    fn readme_lists_every_binding() {
        let readme = include_str!("../README.md");
        for keys in ["`q` / `Esc`", "`r` / `Enter`", "`Home` / `g`", "`End` / `G`"] {
            assert!(readme.contains(keys), "README key table is missing {keys}");
        }
    }

    #[test]
    fn release_events_are_ignored() {
        let mut app = app_with(&["a"]);
        let release = KeyEvent {
            code: KeyCode::Char('q'),
            modifiers: KeyModifiers::NONE,
            kind: KeyEventKind::Release,
            state: KeyEventState::NONE,
        };
        handle_key_event(&mut app, release);
        assert!(!app.quit);
    }
}
