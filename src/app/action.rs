use crate::app::executor::ExecutionOutcome;
use crate::app::keymap::PaletteOp;
use crate::app::registry::CommandId;
use crate::domain::models::{Tab, TabGroup, TabId};

/// Everything the event loop can feed into the reducer: user input already
/// mapped through the keybinding dispatcher, plus results coming back from
/// spawned host tasks.
#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    // --- System / Terminal ---
    Tick,
    Resize(u16, u16),
    Quit,

    // --- Palette session ---
    TogglePalette,
    ClosePalette,
    /// A keystroke routed to the query input.
    QueryInput(crossterm::event::KeyEvent),
    /// A dispatched keybinding.
    Palette(PaletteOp),
    /// Mouse activation of a specific row.
    ActivateIndex(usize),

    // --- Follow-up input dialog ---
    DialogInput(crossterm::event::KeyEvent),
    DialogSubmit,
    DialogCancel,

    // --- Async results ---
    InventoryLoaded {
        tabs: Vec<Tab>,
        groups: Vec<TabGroup>,
        history: Vec<TabId>,
    },
    ExecutionStarted(CommandId),
    ExecutionCompleted {
        command: CommandId,
        outcome: ExecutionOutcome,
    },
    /// Result of a plain tab switch (Enter on a tab entry).
    TabSwitched(Result<(), String>),
    /// Result of the backtick quick-close.
    TabQuickClosed(Result<usize, String>),
    ErrorOccurred(String),
}
