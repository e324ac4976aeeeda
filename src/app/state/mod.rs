use crate::app::config::{Config, SearchEngine};
use crate::app::executor::InputRequest;
use crate::app::keymap::{BindingContext, KeyMap};
use crate::app::parser::PrefixTable;
use crate::app::registry::{CommandId, CommandRegistry};
use crate::domain::models::{Tab, TabGroup, TabId};
use std::sync::Arc;
use std::time::Instant;

pub mod error;
pub mod input;
pub mod palette;

pub use error::{ErrorSeverity, ErrorState};
pub use input::AppTextArea;
pub use palette::PaletteState;

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum AppMode {
    /// Palette closed, waiting for the toggle hotkey.
    Hidden,
    /// Palette open, free-text search.
    Search,
    /// Palette open with a locked command; keystrokes filter candidates.
    Command,
    /// Suspended mid-execution, collecting follow-up input.
    Input,
}

/// Follow-up input collection for a command that returned `needs_input`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingInput {
    pub command: CommandId,
    pub request: InputRequest,
}

pub struct AppState<'a> {
    pub should_quit: bool,
    pub mode: AppMode,
    /// Debounce-by-state: set while a command execution is in flight so
    /// further Enter presses cannot re-trigger it.
    pub executing: bool,
    pub last_error: Option<ErrorState>,
    pub status_message: Option<String>,
    pub status_clear_time: Option<Instant>,

    // Inventory snapshot, refreshed from the host; last write wins.
    pub tabs: Vec<Tab>,
    pub groups: Vec<TabGroup>,
    pub history: Vec<TabId>,

    pub palette: PaletteState<'a>,
    pub dialog: Option<AppTextArea<'a>>,
    pub pending_input: Option<PendingInput>,

    pub registry: Arc<CommandRegistry>,
    pub keymap: Arc<KeyMap>,
    pub prefix_table: Arc<PrefixTable>,
    pub engines: Vec<SearchEngine>,
    pub theme: crate::theme::Theme,

    pub frame_count: u64,
}

impl AppState<'_> {
    #[must_use]
    pub fn new(config: Config) -> Self {
        let registry = Arc::new(CommandRegistry::new());
        let prefix_table = Arc::new(PrefixTable::new(&registry, &config.engines));
        Self {
            should_quit: false,
            mode: AppMode::Hidden,
            executing: false,
            last_error: None,
            status_message: None,
            status_clear_time: None,
            tabs: Vec::new(),
            groups: Vec::new(),
            history: Vec::new(),
            palette: PaletteState::default(),
            dialog: None,
            pending_input: None,
            registry,
            keymap: Arc::new(KeyMap::new()),
            prefix_table,
            engines: config.engines,
            theme: crate::theme::Theme::from_palette_type(config.theme),
            frame_count: 0,
        }
    }

    #[must_use]
    pub fn palette_open(&self) -> bool {
        matches!(self.mode, AppMode::Search | AppMode::Command)
    }

    /// Context snapshot for keybinding guards.
    #[must_use]
    pub fn binding_context(&self) -> BindingContext {
        BindingContext {
            palette_open: self.palette_open(),
            command_mode: self.palette.command_mode,
            has_selection: !self.palette.selection.is_empty(),
            input_focused: self.palette.input_focused,
            result_count: self.palette.results.len(),
            executing: self.executing,
            cursor_on_tab: self
                .palette
                .active_item()
                .is_some_and(|item| item.tab_id().is_some()),
        }
    }
}

impl Default for AppState<'_> {
    fn default() -> Self {
        Self::new(Config::default())
    }
}
