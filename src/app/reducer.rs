use crate::app::action::Action;
use crate::app::command::Command;
use crate::app::executor::ExecContext;
use crate::app::keymap::PaletteOp;
use crate::app::registry::{CommandId, CommandSpec, ExecutionMode};
use crate::app::results::{ItemEffect, ResultItem, ResultContext};
use crate::app::state::{AppMode, AppState, AppTextArea, ErrorSeverity, ErrorState, PendingInput};
use crate::app::parser::QueryKind;
use std::sync::Arc;
use std::time::{Duration, Instant};

const PAGE_JUMP: usize = 10;
const STATUS_TTL: Duration = Duration::from_secs(3);

/// The single state transition function. Synchronous and deterministic:
/// side effects only ever leave as a returned [`Command`].
pub fn update(state: &mut AppState, action: Action) -> Option<Command> {
    let command = apply(state, action);
    // Debounce-by-state: the flag flips the moment a mutating effect is
    // handed out, not when the spawned task gets around to reporting in.
    if matches!(
        &command,
        Some(Command::Execute { .. }) | Some(Command::SwitchTab(_)) | Some(Command::QuickClose(_))
    ) {
        state.executing = true;
    }
    command
}

fn apply(state: &mut AppState, action: Action) -> Option<Command> {
    match action {
        // --- System ---
        Action::Tick => {
            state.frame_count = state.frame_count.wrapping_add(1);
            if state
                .status_clear_time
                .is_some_and(|t| Instant::now() >= t)
            {
                state.status_message = None;
                state.status_clear_time = None;
            }
            None
        }
        Action::Resize(_, _) => None,
        Action::Quit => {
            state.should_quit = true;
            None
        }

        // --- Session toggle ---
        Action::TogglePalette => {
            if state.mode == AppMode::Hidden {
                open_palette(state)
            } else {
                close_palette(state);
                None
            }
        }
        Action::ClosePalette => {
            close_palette(state);
            None
        }

        // --- Query input ---
        Action::QueryInput(key) => {
            state.palette.input_focused = true;
            let before = state.palette.query.lines().to_vec();
            state.palette.query.input(key);
            if state.palette.query.lines() != before {
                recompute(state);
            }
            None
        }

        Action::Palette(op) => handle_op(state, op),

        Action::ActivateIndex(index) => {
            if index < state.palette.results.len() {
                state.palette.active_index = index;
                state.palette.input_focused = false;
                activate_active(state)
            } else {
                None
            }
        }

        // --- Follow-up input dialog ---
        Action::DialogInput(key) => {
            if let Some(dialog) = &mut state.dialog {
                dialog.input(key);
            }
            None
        }
        Action::DialogSubmit => submit_dialog(state),
        Action::DialogCancel => {
            state.dialog = None;
            state.pending_input = None;
            state.mode = if state.palette.command_mode {
                AppMode::Command
            } else {
                AppMode::Search
            };
            None
        }

        // --- Async results ---
        Action::InventoryLoaded {
            tabs,
            groups,
            history,
        } => {
            let known: Vec<_> = tabs.iter().map(|t| t.id).collect();
            state.tabs = tabs;
            state.groups = groups;
            state.history = history;
            state.palette.selection.retain_known(&known);
            if state.mode != AppMode::Hidden {
                recompute(state);
            }
            None
        }
        Action::ExecutionStarted(id) => {
            state.executing = true;
            tracing::debug!(command = %id, "execution started");
            None
        }
        Action::ExecutionCompleted { command, outcome } => {
            state.executing = false;
            handle_outcome(state, command, outcome)
        }
        Action::TabSwitched(result) => {
            state.executing = false;
            match result {
                Ok(()) => {
                    close_palette(state);
                    None
                }
                Err(e) => {
                    surface_error(state, e);
                    Some(Command::LoadInventory)
                }
            }
        }
        Action::TabQuickClosed(result) => {
            state.executing = false;
            match result {
                Ok(_) => set_status(state, "Tab closed"),
                Err(e) => surface_error(state, e),
            }
            // Either way the listing is stale now.
            Some(Command::LoadInventory)
        }
        Action::ErrorOccurred(e) => {
            state.last_error = Some(ErrorState::new(e, ErrorSeverity::Error));
            None
        }
    }
}

fn open_palette(state: &mut AppState) -> Option<Command> {
    state.mode = AppMode::Search;
    state.palette.reset();
    state.status_message = None;
    state.status_clear_time = None;
    // Whatever snapshot we still hold renders immediately; the fresh fetch
    // overwrites it when it lands.
    recompute(state);
    Some(Command::LoadInventory)
}

fn close_palette(state: &mut AppState) {
    state.mode = AppMode::Hidden;
    state.palette.reset();
    state.dialog = None;
    state.pending_input = None;
    state.last_error = None;
}

fn handle_op(state: &mut AppState, op: PaletteOp) -> Option<Command> {
    match op {
        PaletteOp::MoveUp => {
            move_cursor(state, |i, len| (i + len - 1) % len);
            None
        }
        PaletteOp::MoveDown => {
            move_cursor(state, |i, len| (i + 1) % len);
            None
        }
        PaletteOp::JumpFirst => {
            move_cursor(state, |_, _| 0);
            None
        }
        PaletteOp::JumpLast => {
            move_cursor(state, |_, len| len - 1);
            None
        }
        PaletteOp::PageUp => {
            move_cursor(state, |i, _| i.saturating_sub(PAGE_JUMP));
            None
        }
        PaletteOp::PageDown => {
            move_cursor(state, |i, len| (i + PAGE_JUMP).min(len - 1));
            None
        }
        PaletteOp::Activate => activate_active(state),
        PaletteOp::ExecuteLocked => {
            let id = state.palette.locked_command?;
            Some(build_execute(state, id, None))
        }
        PaletteOp::Cancel => {
            if state.last_error.is_some() {
                state.last_error = None;
            } else if state.palette.command_mode {
                state.palette.exit_command_mode();
                state.mode = AppMode::Search;
                state.palette.input_focused = true;
                recompute(state);
            } else {
                close_palette(state);
            }
            None
        }
        PaletteOp::EnterCommandMode => {
            let query = state.palette.query_text();
            let registry = Arc::clone(&state.registry);
            if let Some(spec) = registry.resolve(&query, None) {
                let argument = spec.extract_argument(&query);
                lock_command(state, spec.id, &argument);
            }
            None
        }
        PaletteOp::ToggleSelection => {
            toggle_selection(state);
            None
        }
        PaletteOp::SelectAll => {
            select_all(state);
            None
        }
        PaletteOp::ClearSelection => {
            state.palette.selection.clear();
            recompute(state);
            None
        }
        PaletteOp::QuickClose => {
            let id = state.palette.active_item().and_then(ResultItem::tab_id)?;
            Some(Command::QuickClose(id))
        }
    }
}

fn move_cursor(state: &mut AppState, next: impl Fn(usize, usize) -> usize) {
    let len = state.palette.results.len();
    if len == 0 {
        return;
    }
    state.palette.active_index = next(state.palette.active_index.min(len - 1), len);
    // Focus moves to the list so Tab/Space can drive selection.
    state.palette.input_focused = false;
}

/// Locks a command in, seeding the query with the already-typed argument so
/// it keeps filtering candidates (and, for group creation, doubles as the
/// group name).
fn lock_command(state: &mut AppState, id: CommandId, argument: &str) {
    state.palette.command_mode = true;
    state.palette.locked_command = Some(id);
    state.palette.input_focused = false;
    state.palette.query = AppTextArea::with_text(argument);
    state.mode = AppMode::Command;
    recompute(state);
}

fn toggle_selection(state: &mut AppState) {
    let Some(id) = state.palette.locked_command else {
        return;
    };
    let registry = Arc::clone(&state.registry);
    if !registry.get(id).multi_select {
        return;
    }
    let Some(tab_id) = state.palette.active_item().and_then(ResultItem::tab_id) else {
        return;
    };
    state.palette.selection.toggle(tab_id);
    if listing_depends_on_selection(id) {
        recompute(state);
    }
}

fn select_all(state: &mut AppState) {
    let Some(id) = state.palette.locked_command else {
        return;
    };
    let registry = Arc::clone(&state.registry);
    if !registry.get(id).multi_select {
        return;
    }
    let mut ids: Vec<_> = state
        .palette
        .results
        .iter()
        .filter_map(ResultItem::tab_id)
        .collect();
    if listing_depends_on_selection(id) {
        // The visible pool excludes what is already selected; keep those.
        ids.extend(state.palette.selection.ids());
    }
    state.palette.selection.select_all(ids);
    if listing_depends_on_selection(id) {
        recompute(state);
    }
}

/// Commands whose candidate listing narrows as the selection grows.
fn listing_depends_on_selection(id: CommandId) -> bool {
    id == CommandId::GroupTabs
}

fn activate_active(state: &mut AppState) -> Option<Command> {
    if state.executing {
        return None;
    }
    let item = state.palette.active_item().cloned()?;

    if state.palette.command_mode {
        let locked = state.palette.locked_command?;
        let registry = Arc::clone(&state.registry);
        let spec = registry.get(locked);
        if spec.multi_select && !state.palette.selection.is_empty() {
            // Bulk execution over the whole selection.
            return Some(build_execute(state, locked, None));
        }
        return match item {
            ResultItem::Action { effect, .. } => run_effect(state, effect),
            other => Some(build_execute(state, locked, Some(other))),
        };
    }

    match item {
        ResultItem::Tab { id, .. } => Some(Command::SwitchTab(id)),
        ResultItem::CloseTab { .. } => Some(build_execute(state, CommandId::CloseTab, Some(item))),
        ResultItem::Group { .. } => Some(build_execute(state, CommandId::DeleteGroup, Some(item))),
        ResultItem::Action { effect, .. } => run_effect(state, effect),
    }
}

fn run_effect(state: &mut AppState, effect: ItemEffect) -> Option<Command> {
    match effect {
        ItemEffect::RunCommand(id) => {
            let registry = Arc::clone(&state.registry);
            let spec = registry.get(id);
            if spec.mode == ExecutionMode::CommandMode && !state.palette.command_mode {
                // Activating a command-mode suggestion locks it in instead
                // of executing.
                let query = state.palette.query_text();
                let argument = spec.extract_argument(&query);
                lock_command(state, id, &argument);
                None
            } else {
                Some(build_execute(state, id, None))
            }
        }
        ItemEffect::OpenSearch(_) => {
            let item = state.palette.active_item().cloned();
            Some(build_execute(state, CommandId::WebSearch, item))
        }
    }
}

fn build_execute(state: &AppState, id: CommandId, target: Option<ResultItem>) -> Command {
    let query = state.palette.query_text();
    let argument = state.registry.get(id).extract_argument(&query);
    Command::Execute {
        id,
        ctx: ExecContext {
            query,
            argument,
            selection: state.palette.selection.ids(),
            target,
            tabs: state.tabs.clone(),
            groups: state.groups.clone(),
            engines: state.engines.clone(),
        },
    }
}

fn submit_dialog(state: &mut AppState) -> Option<Command> {
    let pending = state.pending_input.take()?;
    let value = state.dialog.take().map(|d| d.text()).unwrap_or_default();
    let value = value.trim().to_string();
    let argument = if value.is_empty() {
        pending.request.default_value.clone()
    } else {
        value
    };
    state.mode = if state.palette.command_mode {
        AppMode::Command
    } else {
        AppMode::Search
    };
    Some(Command::Execute {
        id: pending.command,
        ctx: ExecContext {
            query: state.palette.query_text(),
            argument,
            selection: state.palette.selection.ids(),
            target: None,
            tabs: state.tabs.clone(),
            groups: state.groups.clone(),
            engines: state.engines.clone(),
        },
    })
}

fn handle_outcome(
    state: &mut AppState,
    command: CommandId,
    outcome: crate::app::executor::ExecutionOutcome,
) -> Option<Command> {
    if let Some(request) = outcome.needs_input {
        if state.mode == AppMode::Hidden {
            // The palette closed while the command was in flight; the
            // suspended execution is simply abandoned.
            return None;
        }
        state.mode = AppMode::Input;
        state.dialog = Some(AppTextArea::with_text(&request.default_value));
        state.pending_input = Some(PendingInput { command, request });
        return None;
    }

    if outcome.success {
        if let Some(message) = outcome.message {
            set_status(state, message);
        }
        if let Some(id) = outcome.enter_command_mode {
            lock_command(state, id, "");
        }
        if outcome.close_palette {
            close_palette(state);
        }
        // A successful command usually mutated the session.
        Some(Command::LoadInventory)
    } else {
        let message = outcome
            .error
            .unwrap_or_else(|| "command failed".to_string());
        surface_error(state, message);
        // Stale targets disappear from the next listing.
        Some(Command::LoadInventory)
    }
}

fn surface_error(state: &mut AppState, message: impl Into<String>) {
    state.last_error = Some(
        ErrorState::new(message, ErrorSeverity::Error)
            .with_suggestion("The tab list has been refreshed"),
    );
}

fn set_status(state: &mut AppState, message: impl Into<String>) {
    state.status_message = Some(message.into());
    state.status_clear_time = Some(Instant::now() + STATUS_TTL);
}

/// Recomputes the result list from the current query, lock, inventory and
/// selection. Pure relative to those inputs; always resets the cursor.
pub fn recompute(state: &mut AppState) {
    let registry = Arc::clone(&state.registry);
    let table = Arc::clone(&state.prefix_table);
    let query = state.palette.query_text();
    let locked = state.palette.locked_command;

    let parsed = table.parse(&query);
    let resolved: Option<&CommandSpec> = if let Some(id) = locked {
        Some(registry.get(id))
    } else {
        match &parsed.kind {
            QueryKind::Command(id) => Some(registry.get(*id)),
            QueryKind::Engine(_) => Some(registry.get(CommandId::WebSearch)),
            QueryKind::OpenUrl => Some(registry.get(CommandId::OpenUrl)),
            QueryKind::TabSearch => registry.resolve(&query, None),
        }
    };
    let argument = match resolved {
        Some(spec) => spec.extract_argument(&query),
        None => parsed.argument.clone(),
    };

    let results = {
        let ctx = ResultContext {
            tabs: &state.tabs,
            groups: &state.groups,
            history: &state.history,
            selection: &state.palette.selection,
            engines: &state.engines,
            registry: &registry,
            query: &query,
        };
        crate::app::results::produce(resolved, &argument, &ctx)
    };
    state.palette.results = results;
    state.palette.active_index = 0;
}
