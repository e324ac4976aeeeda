use crate::app::action::Action;
use crate::app::keymap::PaletteOp;
use crate::app::state::{AppMode, AppState};
use crate::app::timing::DoubleTap;
use crate::components::palette as palette_view;
use crossterm::event::{
    Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers, MouseButton, MouseEventKind,
};
use ratatui::layout::{Rect, Size};
use std::time::Instant;

/// The palette toggles on a double press of Ctrl+Space.
fn is_toggle_chord(key: &KeyEvent) -> bool {
    key.code == KeyCode::Char(' ') && key.modifiers == KeyModifiers::CONTROL
}

/// Maps a terminal event to an action against the current state snapshot.
/// The caller owns the double-tap detector and the clock so this stays a
/// pure function of its arguments.
pub fn map_event_to_action(
    event: Event,
    state: &AppState<'_>,
    taps: &mut DoubleTap,
    now: Instant,
    terminal_size: Size,
) -> Option<Action> {
    match event {
        Event::Key(key) => {
            if key.kind == KeyEventKind::Release {
                return None;
            }
            map_key(key, state, taps, now)
        }
        Event::Resize(w, h) => Some(Action::Resize(w, h)),
        Event::Mouse(mouse) => map_mouse(mouse, state, terminal_size),
        _ => None,
    }
}

fn map_key(
    key: KeyEvent,
    state: &AppState<'_>,
    taps: &mut DoubleTap,
    now: Instant,
) -> Option<Action> {
    if is_toggle_chord(&key) {
        return taps.press(now).then_some(Action::TogglePalette);
    }

    match state.mode {
        AppMode::Hidden => match key.code {
            KeyCode::Char('q') | KeyCode::Esc => Some(Action::Quit),
            _ => None,
        },
        AppMode::Input => match key.code {
            KeyCode::Esc => Some(Action::DialogCancel),
            KeyCode::Enter => Some(Action::DialogSubmit),
            _ => Some(Action::DialogInput(key)),
        },
        AppMode::Search | AppMode::Command => {
            // The binding table gets first refusal; whatever it consumes
            // never reaches the query input.
            let ctx = state.binding_context();
            if let Some(op) = state.keymap.dispatch(&key, &ctx) {
                return Some(Action::Palette(op));
            }
            if is_text_key(&key) {
                return Some(Action::QueryInput(key));
            }
            None
        }
    }
}

/// Keys that fall through to the query input. Typing always redirects to
/// search.
fn is_text_key(key: &KeyEvent) -> bool {
    if key
        .modifiers
        .intersects(KeyModifiers::CONTROL | KeyModifiers::ALT)
    {
        return false;
    }
    matches!(
        key.code,
        KeyCode::Char(_) | KeyCode::Backspace | KeyCode::Delete | KeyCode::Left | KeyCode::Right
    )
}

fn map_mouse(
    mouse: crossterm::event::MouseEvent,
    state: &AppState<'_>,
    terminal_size: Size,
) -> Option<Action> {
    if !state.palette_open() {
        return None;
    }
    match mouse.kind {
        MouseEventKind::ScrollUp => Some(Action::Palette(PaletteOp::MoveUp)),
        MouseEventKind::ScrollDown => Some(Action::Palette(PaletteOp::MoveDown)),
        MouseEventKind::Down(MouseButton::Left) => {
            let area = Rect::new(0, 0, terminal_size.width, terminal_size.height);
            palette_view::hit_test(area, &state.palette, mouse.column, mouse.row)
                .map(Action::ActivateIndex)
        }
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::timing::{DOUBLE_TAP_MIN_GAP, DOUBLE_TAP_WINDOW};
    use std::time::Duration;

    fn taps() -> DoubleTap {
        DoubleTap::new(DOUBLE_TAP_WINDOW, DOUBLE_TAP_MIN_GAP)
    }

    fn size() -> Size {
        Size::new(80, 24)
    }

    #[test]
    fn double_ctrl_space_toggles_from_hidden() {
        let state = AppState::default();
        let mut taps = taps();
        let t0 = Instant::now();
        let chord = Event::Key(KeyEvent::new(KeyCode::Char(' '), KeyModifiers::CONTROL));

        assert_eq!(
            map_event_to_action(chord.clone(), &state, &mut taps, t0, size()),
            None
        );
        let second = map_event_to_action(
            chord,
            &state,
            &mut taps,
            t0 + Duration::from_millis(120),
            size(),
        );
        assert_eq!(second, Some(Action::TogglePalette));
    }

    #[test]
    fn typing_in_hidden_mode_is_ignored() {
        let state = AppState::default();
        let key = Event::Key(KeyEvent::new(KeyCode::Char('x'), KeyModifiers::NONE));
        assert_eq!(
            map_event_to_action(key, &state, &mut taps(), Instant::now(), size()),
            None
        );
    }

    #[test]
    fn plain_characters_route_to_the_query() {
        let mut state = AppState::default();
        crate::app::reducer::update(&mut state, Action::TogglePalette);
        let key = Event::Key(KeyEvent::new(KeyCode::Char('x'), KeyModifiers::NONE));
        let action = map_event_to_action(key, &state, &mut taps(), Instant::now(), size());
        assert!(matches!(action, Some(Action::QueryInput(_))));
    }

    #[test]
    fn escape_in_open_palette_dispatches_cancel() {
        let mut state = AppState::default();
        crate::app::reducer::update(&mut state, Action::TogglePalette);
        let key = Event::Key(KeyEvent::new(KeyCode::Esc, KeyModifiers::NONE));
        let action = map_event_to_action(key, &state, &mut taps(), Instant::now(), size());
        assert_eq!(action, Some(Action::Palette(PaletteOp::Cancel)));
    }
}
