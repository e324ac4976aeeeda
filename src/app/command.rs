use crate::app::executor::ExecContext;
use crate::app::registry::CommandId;
use crate::domain::models::TabId;

/// Side effects requested by the reducer; the event loop runs each one on a
/// spawned task against the host and feeds the result back as an action.
#[derive(Debug, Clone)]
pub enum Command {
    LoadInventory,
    Execute { id: CommandId, ctx: ExecContext },
    SwitchTab(TabId),
    QuickClose(TabId),
}
