use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

/// Snapshot of the interaction state that binding guards read. Built fresh
/// for every keyboard event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct BindingContext {
    pub palette_open: bool,
    pub command_mode: bool,
    pub has_selection: bool,
    pub input_focused: bool,
    pub result_count: usize,
    pub executing: bool,
    /// The cursor currently rests on a closable tab entry.
    pub cursor_on_tab: bool,
}

/// What a matched binding asks the reducer to do.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PaletteOp {
    MoveUp,
    MoveDown,
    JumpFirst,
    JumpLast,
    PageUp,
    PageDown,
    /// Activate the item under the cursor, or bulk-execute a non-empty
    /// multi-selection.
    Activate,
    /// Execute the locked command directly, bypassing item activation.
    ExecuteLocked,
    /// Exit command mode if engaged, else close the palette.
    Cancel,
    EnterCommandMode,
    ToggleSelection,
    SelectAll,
    ClearSelection,
    /// Close the tab under the cursor without closing the palette.
    QuickClose,
}

pub struct KeyBinding {
    pub code: KeyCode,
    pub modifiers: KeyModifiers,
    pub guard: fn(&BindingContext) -> bool,
    pub op: PaletteOp,
}

/// Ordered binding table. Dispatch walks registration order and the first
/// entry whose key, modifier mask (exact) and guard all match wins; the
/// event is then consumed and never reaches the query input.
pub struct KeyMap {
    bindings: Vec<KeyBinding>,
}

impl Default for KeyMap {
    fn default() -> Self {
        Self::new()
    }
}

fn navigable(ctx: &BindingContext) -> bool {
    ctx.palette_open && ctx.result_count > 0
}

impl KeyMap {
    #[must_use]
    pub fn new() -> Self {
        let mut bindings = Vec::new();
        let mut bind =
            |code: KeyCode, modifiers: KeyModifiers, guard: fn(&BindingContext) -> bool, op| {
                bindings.push(KeyBinding {
                    code,
                    modifiers,
                    guard,
                    op,
                });
            };
        let none = KeyModifiers::NONE;

        bind(KeyCode::Up, none, navigable, PaletteOp::MoveUp);
        bind(KeyCode::Down, none, navigable, PaletteOp::MoveDown);
        bind(KeyCode::Home, none, navigable, PaletteOp::JumpFirst);
        bind(KeyCode::End, none, navigable, PaletteOp::JumpLast);
        bind(KeyCode::PageUp, none, navigable, PaletteOp::PageUp);
        bind(KeyCode::PageDown, none, navigable, PaletteOp::PageDown);

        // The modified Enter variants sit above the plain one; modifier
        // masks are compared exactly, so only one of the three can fire.
        bind(
            KeyCode::Enter,
            KeyModifiers::SHIFT,
            |ctx| ctx.palette_open && ctx.command_mode && !ctx.input_focused && !ctx.executing,
            PaletteOp::ExecuteLocked,
        );
        bind(
            KeyCode::Enter,
            KeyModifiers::CONTROL,
            |ctx| ctx.palette_open && ctx.command_mode && !ctx.input_focused && !ctx.executing,
            PaletteOp::ExecuteLocked,
        );
        bind(
            KeyCode::Enter,
            none,
            |ctx| ctx.palette_open && !ctx.executing,
            PaletteOp::Activate,
        );

        bind(
            KeyCode::Esc,
            none,
            |ctx| ctx.palette_open,
            PaletteOp::Cancel,
        );

        // Tab carries two bindings with mutually exclusive guards.
        bind(
            KeyCode::Tab,
            none,
            |ctx| ctx.palette_open && !ctx.command_mode && !ctx.input_focused,
            PaletteOp::EnterCommandMode,
        );
        bind(
            KeyCode::Tab,
            none,
            |ctx| ctx.palette_open && ctx.command_mode,
            PaletteOp::ToggleSelection,
        );

        bind(
            KeyCode::Char(' '),
            none,
            |ctx| ctx.palette_open && ctx.command_mode && !ctx.input_focused,
            PaletteOp::ToggleSelection,
        );
        bind(
            KeyCode::Char('a'),
            KeyModifiers::CONTROL,
            |ctx| ctx.palette_open && ctx.command_mode && !ctx.input_focused,
            PaletteOp::SelectAll,
        );
        bind(
            KeyCode::Char('d'),
            KeyModifiers::CONTROL,
            |ctx| {
                ctx.palette_open && ctx.command_mode && ctx.has_selection && !ctx.input_focused
            },
            PaletteOp::ClearSelection,
        );
        bind(
            KeyCode::Delete,
            none,
            |ctx| {
                ctx.palette_open && ctx.command_mode && ctx.has_selection && !ctx.input_focused
            },
            PaletteOp::ClearSelection,
        );

        bind(
            KeyCode::Char('`'),
            none,
            |ctx| ctx.palette_open && ctx.cursor_on_tab && !ctx.executing,
            PaletteOp::QuickClose,
        );

        Self { bindings }
    }

    /// First match wins; `None` means the event falls through to the query
    /// input.
    #[must_use]
    pub fn dispatch(&self, key: &KeyEvent, ctx: &BindingContext) -> Option<PaletteOp> {
        let code = normalize(key.code);
        self.bindings
            .iter()
            .find(|b| b.code == code && b.modifiers == key.modifiers && (b.guard)(ctx))
            .map(|b| b.op)
    }
}

/// Case-folds character keys so Ctrl+A and Ctrl+a hit the same binding.
fn normalize(code: KeyCode) -> KeyCode {
    match code {
        KeyCode::Char(c) => KeyCode::Char(c.to_ascii_lowercase()),
        other => other,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn open_ctx() -> BindingContext {
        BindingContext {
            palette_open: true,
            result_count: 3,
            input_focused: true,
            ..BindingContext::default()
        }
    }

    #[test]
    fn shift_enter_never_triggers_the_plain_binding() {
        let keymap = KeyMap::new();
        let ctx = BindingContext {
            command_mode: true,
            input_focused: false,
            ..open_ctx()
        };
        let shift = KeyEvent::new(KeyCode::Enter, KeyModifiers::SHIFT);
        assert_eq!(keymap.dispatch(&shift, &ctx), Some(PaletteOp::ExecuteLocked));
        let plain = KeyEvent::new(KeyCode::Enter, KeyModifiers::NONE);
        assert_eq!(keymap.dispatch(&plain, &ctx), Some(PaletteOp::Activate));
    }

    #[test]
    fn shift_enter_outside_command_mode_matches_nothing() {
        let keymap = KeyMap::new();
        let shift = KeyEvent::new(KeyCode::Enter, KeyModifiers::SHIFT);
        assert_eq!(keymap.dispatch(&shift, &open_ctx()), None);
    }

    #[test]
    fn tab_guards_are_mutually_exclusive() {
        let keymap = KeyMap::new();
        let tab = KeyEvent::new(KeyCode::Tab, KeyModifiers::NONE);

        let searching = BindingContext {
            input_focused: false,
            ..open_ctx()
        };
        assert_eq!(
            keymap.dispatch(&tab, &searching),
            Some(PaletteOp::EnterCommandMode)
        );

        let command_mode = BindingContext {
            command_mode: true,
            ..searching
        };
        assert_eq!(
            keymap.dispatch(&tab, &command_mode),
            Some(PaletteOp::ToggleSelection)
        );

        // While the input is focused and no command is locked, Tab falls
        // through entirely.
        assert_eq!(keymap.dispatch(&tab, &open_ctx()), None);
    }

    #[test]
    fn navigation_requires_a_non_empty_list() {
        let keymap = KeyMap::new();
        let down = KeyEvent::new(KeyCode::Down, KeyModifiers::NONE);
        assert_eq!(keymap.dispatch(&down, &open_ctx()), Some(PaletteOp::MoveDown));
        let empty = BindingContext {
            result_count: 0,
            ..open_ctx()
        };
        assert_eq!(keymap.dispatch(&down, &empty), None);
    }

    #[test]
    fn clear_selection_needs_a_selection() {
        let keymap = KeyMap::new();
        let ctrl_d = KeyEvent::new(KeyCode::Char('d'), KeyModifiers::CONTROL);
        let without = BindingContext {
            command_mode: true,
            input_focused: false,
            ..open_ctx()
        };
        assert_eq!(keymap.dispatch(&ctrl_d, &without), None);
        let with = BindingContext {
            has_selection: true,
            ..without
        };
        assert_eq!(keymap.dispatch(&ctrl_d, &with), Some(PaletteOp::ClearSelection));
    }

    #[test]
    fn executing_suppresses_activation_but_not_navigation() {
        let keymap = KeyMap::new();
        let ctx = BindingContext {
            executing: true,
            ..open_ctx()
        };
        let enter = KeyEvent::new(KeyCode::Enter, KeyModifiers::NONE);
        assert_eq!(keymap.dispatch(&enter, &ctx), None);
        let down = KeyEvent::new(KeyCode::Down, KeyModifiers::NONE);
        assert_eq!(keymap.dispatch(&down, &ctx), Some(PaletteOp::MoveDown));
    }

    #[test]
    fn backtick_closes_only_on_tab_entries() {
        let keymap = KeyMap::new();
        let backtick = KeyEvent::new(KeyCode::Char('`'), KeyModifiers::NONE);
        assert_eq!(keymap.dispatch(&backtick, &open_ctx()), None);
        let on_tab = BindingContext {
            cursor_on_tab: true,
            ..open_ctx()
        };
        assert_eq!(keymap.dispatch(&backtick, &on_tab), Some(PaletteOp::QuickClose));
    }
}
