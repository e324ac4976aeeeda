use crate::app::registry::CommandId;
use crate::app::results::ResultItem;
use crate::app::selection::Selection;
use crate::app::state::input::AppTextArea;

/// Everything that lives for one palette-open session. Reset wholesale when
/// the palette closes; nothing here survives across opens.
#[derive(Debug, Default)]
pub struct PaletteState<'a> {
    pub query: AppTextArea<'a>,
    pub results: Vec<ResultItem>,
    /// Always a valid index into `results`, or 0 when the list is empty.
    pub active_index: usize,
    pub command_mode: bool,
    pub locked_command: Option<CommandId>,
    pub selection: Selection,
    /// Whether keystrokes currently edit the query. Navigation keys move
    /// focus to the list so Tab/Space can drive selection.
    pub input_focused: bool,
}

impl PaletteState<'_> {
    #[must_use]
    pub fn query_text(&self) -> String {
        self.query.text()
    }

    #[must_use]
    pub fn active_item(&self) -> Option<&ResultItem> {
        self.results.get(self.active_index)
    }

    /// Leaves command mode, dropping the lock and the selection.
    pub fn exit_command_mode(&mut self) {
        self.command_mode = false;
        self.locked_command = None;
        self.selection.clear();
    }

    /// Full reset, used when the palette closes.
    pub fn reset(&mut self) {
        self.query = AppTextArea::default();
        self.results.clear();
        self.active_index = 0;
        self.exit_command_mode();
        self.input_focused = true;
    }
}
