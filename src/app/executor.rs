use crate::app::config::{split_engine_query, SearchEngine};
use crate::app::parser::{is_probable_url, normalize_url};
use crate::app::registry::CommandId;
use crate::app::results::{ItemEffect, ResultItem};
use crate::domain::host::TabHost;
use crate::domain::models::{Tab, TabGroup, TabId};
use std::collections::HashSet;
use std::sync::Arc;
use thiserror::Error;

/// Request for additional free-text input, raised by a command that cannot
/// complete without it (e.g. naming a new group). The caller suspends,
/// collects the value, and re-invokes execution with it as the argument.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InputRequest {
    pub title: String,
    pub placeholder: String,
    pub default_value: String,
}

/// Structured result of one command execution. Failures are values here,
/// never errors propagated past the executor boundary.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ExecutionOutcome {
    pub success: bool,
    pub message: Option<String>,
    pub error: Option<String>,
    pub close_palette: bool,
    pub enter_command_mode: Option<CommandId>,
    pub needs_input: Option<InputRequest>,
}

impl ExecutionOutcome {
    fn done(message: impl Into<String>) -> Self {
        Self {
            success: true,
            message: Some(message.into()),
            close_palette: true,
            ..Self::default()
        }
    }

    fn failure(error: impl Into<String>) -> Self {
        Self {
            error: Some(error.into()),
            ..Self::default()
        }
    }

    fn input(request: InputRequest) -> Self {
        Self {
            success: true,
            needs_input: Some(request),
            ..Self::default()
        }
    }
}

/// Snapshot handed to one execution. Owned data only; the execution runs on
/// a spawned task while the palette keeps accepting keystrokes.
#[derive(Debug, Clone, Default)]
pub struct ExecContext {
    pub query: String,
    pub argument: String,
    pub selection: Vec<TabId>,
    /// The activated result entry, when execution was item-driven.
    pub target: Option<ResultItem>,
    pub tabs: Vec<Tab>,
    pub groups: Vec<TabGroup>,
    pub engines: Vec<SearchEngine>,
}

#[derive(Debug, Error)]
enum ExecError {
    #[error("nothing selected")]
    EmptySelection,
    #[error("at least {0} tabs are required")]
    NotEnoughTabs(usize),
    #[error("no matching target")]
    MissingTarget,
    #[error("no previous tab available")]
    NoPreviousTab,
    #[error("{0}")]
    InvalidArgument(String),
    #[error(transparent)]
    Host(#[from] anyhow::Error),
}

/// Sole entry point for command execution. Total: host failures and user
/// errors alike come back as a failed [`ExecutionOutcome`].
pub async fn execute(id: CommandId, ctx: ExecContext, host: Arc<dyn TabHost>) -> ExecutionOutcome {
    match run(id, ctx, host).await {
        Ok(outcome) => outcome,
        Err(e) => {
            tracing::warn!(command = %id, "execution failed: {e}");
            ExecutionOutcome::failure(e.to_string())
        }
    }
}

async fn run(
    id: CommandId,
    ctx: ExecContext,
    host: Arc<dyn TabHost>,
) -> Result<ExecutionOutcome, ExecError> {
    match id {
        CommandId::NewTab => {
            host.create_tab(None).await?;
            Ok(ExecutionOutcome::done("Opened a new tab"))
        }
        CommandId::CloseTab => close_single(&ctx, host).await,
        CommandId::PreviousTab => previous_tab(&ctx, host).await,
        CommandId::CloseDuplicates => close_duplicates(&ctx, host).await,
        CommandId::CloseMultiple => close_multiple(&ctx, host).await,
        CommandId::GroupTabs => group_tabs(&ctx, host).await,
        CommandId::DeleteGroup => delete_group(&ctx, host).await,
        CommandId::WebSearch => web_search(&ctx, host).await,
        CommandId::OpenUrl => open_url(&ctx, host).await,
    }
}

async fn close_single(
    ctx: &ExecContext,
    host: Arc<dyn TabHost>,
) -> Result<ExecutionOutcome, ExecError> {
    let (id, title) = match &ctx.target {
        Some(ResultItem::CloseTab { id, title }) | Some(ResultItem::Tab { id, title, .. }) => {
            (*id, title.clone())
        }
        _ => {
            // No activated entry: fall back to the first tab matching the
            // argument, mirroring `close <name>` typed straight through.
            let argument = ctx.argument.trim();
            if argument.is_empty() {
                return Err(ExecError::MissingTarget);
            }
            let tab = ctx
                .tabs
                .iter()
                .find(|t| t.matches(argument))
                .ok_or(ExecError::MissingTarget)?;
            (tab.id, tab.title.clone())
        }
    };
    host.close_tabs(&[id]).await?;
    Ok(ExecutionOutcome::done(format!("Closed \"{title}\"")))
}

async fn previous_tab(
    ctx: &ExecContext,
    host: Arc<dyn TabHost>,
) -> Result<ExecutionOutcome, ExecError> {
    let history = host.recent_history().await?;
    let current = ctx.tabs.iter().find(|t| t.active).map(|t| t.id);
    let existing: HashSet<TabId> = ctx.tabs.iter().map(|t| t.id).collect();

    // The entry after the current tab in the history that still exists.
    let start = current
        .and_then(|id| history.iter().position(|h| *h == id).map(|i| i + 1))
        .unwrap_or(0);
    let previous = history[start.min(history.len())..]
        .iter()
        .copied()
        .find(|id| existing.contains(id) && Some(*id) != current)
        .ok_or(ExecError::NoPreviousTab)?;

    host.switch_to_tab(previous).await?;
    host.record_access(previous).await?;
    Ok(ExecutionOutcome::done("Switched to previous tab"))
}

async fn close_duplicates(
    ctx: &ExecContext,
    host: Arc<dyn TabHost>,
) -> Result<ExecutionOutcome, ExecError> {
    let mut seen = HashSet::new();
    let duplicates: Vec<TabId> = ctx
        .tabs
        .iter()
        .filter(|t| !seen.insert(t.url.clone()))
        .map(|t| t.id)
        .collect();

    let closed = if duplicates.is_empty() {
        0
    } else {
        host.close_tabs(&duplicates).await?
    };
    Ok(ExecutionOutcome::done(format!(
        "Closed {closed} duplicate tab{}",
        if closed == 1 { "" } else { "s" }
    )))
}

async fn close_multiple(
    ctx: &ExecContext,
    host: Arc<dyn TabHost>,
) -> Result<ExecutionOutcome, ExecError> {
    if ctx.selection.is_empty() {
        return Err(ExecError::EmptySelection);
    }
    let closed = host.close_tabs(&ctx.selection).await?;
    Ok(ExecutionOutcome::done(format!(
        "Closed {closed} tab{}",
        if closed == 1 { "" } else { "s" }
    )))
}

async fn group_tabs(
    ctx: &ExecContext,
    host: Arc<dyn TabHost>,
) -> Result<ExecutionOutcome, ExecError> {
    if ctx.selection.is_empty() {
        return Err(ExecError::EmptySelection);
    }
    if ctx.selection.len() < 2 {
        return Err(ExecError::NotEnoughTabs(2));
    }

    let name = ctx.argument.trim();
    if name.is_empty() {
        return Ok(ExecutionOutcome::input(InputRequest {
            title: "Create Tab Group".to_string(),
            placeholder: "Group name".to_string(),
            default_value: format!("Group {}", chrono::Local::now().format("%H:%M")),
        }));
    }

    host.create_group(&ctx.selection, Some(name.to_string()))
        .await?;
    Ok(ExecutionOutcome::done(format!(
        "Created group \"{name}\" with {} tabs",
        ctx.selection.len()
    )))
}

async fn delete_group(
    ctx: &ExecContext,
    host: Arc<dyn TabHost>,
) -> Result<ExecutionOutcome, ExecError> {
    let group = match &ctx.target {
        Some(ResultItem::Group { id, title }) => Some((*id, title.clone())),
        _ => {
            let argument = ctx.argument.trim();
            if argument.is_empty() {
                None
            } else {
                ctx.groups
                    .iter()
                    .find(|g| g.matches(argument))
                    .map(|g| (g.id, g.label()))
            }
        }
    };
    let (id, title) = group.ok_or(ExecError::MissingTarget)?;
    host.delete_group(id).await?;
    Ok(ExecutionOutcome::done(format!("Deleted group \"{title}\"")))
}

async fn web_search(
    ctx: &ExecContext,
    host: Arc<dyn TabHost>,
) -> Result<ExecutionOutcome, ExecError> {
    // An activated prebuilt search entry carries its URL already.
    if let Some(ResultItem::Action {
        effect: ItemEffect::OpenSearch(url),
        ..
    }) = &ctx.target
    {
        host.open_url(url).await?;
        return Ok(ExecutionOutcome::done("Searching the web"));
    }

    let argument = ctx.argument.trim();
    if argument.is_empty() {
        return Err(ExecError::InvalidArgument(
            "please provide a search query".to_string(),
        ));
    }
    let (picked, query) = split_engine_query(&ctx.engines, argument);
    let engine = picked
        .or_else(|| ctx.engines.first())
        .ok_or_else(|| ExecError::InvalidArgument("no search engines configured".to_string()))?;
    host.open_url(&engine.build_url(query)).await?;
    Ok(ExecutionOutcome::done(format!(
        "Searching \"{query}\" on {}",
        engine.name
    )))
}

async fn open_url(
    ctx: &ExecContext,
    host: Arc<dyn TabHost>,
) -> Result<ExecutionOutcome, ExecError> {
    let argument = ctx.argument.trim();
    if argument.is_empty() {
        return Err(ExecError::InvalidArgument(
            "please provide a URL to open".to_string(),
        ));
    }
    if !is_probable_url(argument) {
        return Err(ExecError::InvalidArgument(format!(
            "\"{argument}\" is not a valid URL"
        )));
    }
    let url = normalize_url(argument);
    host.open_url(&url).await?;
    Ok(ExecutionOutcome::done(format!("Opened {url}")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::config::default_engines;
    use crate::domain::host::MockTabHost;
    use crate::domain::models::GroupId;

    fn tab(id: u64, title: &str, url: &str, active: bool) -> Tab {
        Tab {
            id: TabId(id),
            title: title.to_string(),
            url: url.to_string(),
            active,
            group: None,
        }
    }

    fn ctx_with_tabs(tabs: Vec<Tab>) -> ExecContext {
        ExecContext {
            tabs,
            engines: default_engines(),
            ..ExecContext::default()
        }
    }

    #[tokio::test]
    async fn close_duplicates_reports_host_failure() {
        let mut mock = MockTabHost::new();
        mock.expect_close_tabs()
            .returning(|_| Err(anyhow::anyhow!("host unavailable")));
        let ctx = ctx_with_tabs(vec![
            tab(1, "a", "https://same.example", false),
            tab(2, "b", "https://same.example", false),
        ]);

        let outcome = execute(CommandId::CloseDuplicates, ctx, Arc::new(mock)).await;
        assert!(!outcome.success);
        assert!(outcome.error.unwrap().contains("host unavailable"));
        assert!(!outcome.close_palette);
    }

    #[tokio::test]
    async fn close_duplicates_counts_closed_tabs() {
        let mut mock = MockTabHost::new();
        mock.expect_close_tabs()
            .withf(|ids| ids == [TabId(2), TabId(3)])
            .returning(|ids| Ok(ids.len()));
        let ctx = ctx_with_tabs(vec![
            tab(1, "a", "https://same.example", false),
            tab(2, "b", "https://same.example", false),
            tab(3, "c", "https://same.example", false),
            tab(4, "d", "https://unique.example", false),
        ]);

        let outcome = execute(CommandId::CloseDuplicates, ctx, Arc::new(mock)).await;
        assert!(outcome.success);
        assert_eq!(outcome.message.unwrap(), "Closed 2 duplicate tabs");
    }

    #[tokio::test]
    async fn close_duplicates_without_duplicates_skips_the_host() {
        let mut mock = MockTabHost::new();
        mock.expect_close_tabs().never();
        let ctx = ctx_with_tabs(vec![tab(1, "a", "https://one.example", false)]);

        let outcome = execute(CommandId::CloseDuplicates, ctx, Arc::new(mock)).await;
        assert!(outcome.success);
        assert_eq!(outcome.message.unwrap(), "Closed 0 duplicate tabs");
    }

    #[tokio::test]
    async fn group_tabs_with_empty_selection_never_reaches_the_host() {
        let mut mock = MockTabHost::new();
        mock.expect_create_group().never();
        let ctx = ctx_with_tabs(vec![tab(1, "a", "https://a.example", false)]);

        let outcome = execute(CommandId::GroupTabs, ctx, Arc::new(mock)).await;
        assert!(!outcome.success);
        assert_eq!(outcome.error.unwrap(), "nothing selected");
    }

    #[tokio::test]
    async fn group_tabs_requires_two_tabs() {
        let mut mock = MockTabHost::new();
        mock.expect_create_group().never();
        let mut ctx = ctx_with_tabs(Vec::new());
        ctx.selection = vec![TabId(1)];

        let outcome = execute(CommandId::GroupTabs, ctx, Arc::new(mock)).await;
        assert!(!outcome.success);
        assert!(outcome.error.unwrap().contains("at least 2"));
    }

    #[tokio::test]
    async fn group_tabs_without_a_name_requests_input() {
        let mut mock = MockTabHost::new();
        mock.expect_create_group().never();
        let mut ctx = ctx_with_tabs(Vec::new());
        ctx.selection = vec![TabId(1), TabId(2)];

        let outcome = execute(CommandId::GroupTabs, ctx, Arc::new(mock)).await;
        assert!(outcome.success);
        let request = outcome.needs_input.expect("input request");
        assert_eq!(request.title, "Create Tab Group");
        assert!(!outcome.close_palette);
    }

    #[tokio::test]
    async fn group_tabs_with_a_name_creates_the_group_once() {
        let mut mock = MockTabHost::new();
        mock.expect_create_group()
            .withf(|ids, name| ids == [TabId(1), TabId(2)] && name.as_deref() == Some("Work"))
            .times(1)
            .returning(|_, _| Ok(GroupId(1)));
        let mut ctx = ctx_with_tabs(Vec::new());
        ctx.selection = vec![TabId(1), TabId(2)];
        ctx.argument = "Work".to_string();

        let outcome = execute(CommandId::GroupTabs, ctx, Arc::new(mock)).await;
        assert!(outcome.success);
        assert!(outcome.close_palette);
        assert_eq!(outcome.message.unwrap(), "Created group \"Work\" with 2 tabs");
    }

    #[tokio::test]
    async fn close_multiple_rejects_empty_selection() {
        let mut mock = MockTabHost::new();
        mock.expect_close_tabs().never();
        let ctx = ctx_with_tabs(Vec::new());

        let outcome = execute(CommandId::CloseMultiple, ctx, Arc::new(mock)).await;
        assert!(!outcome.success);
    }

    #[tokio::test]
    async fn previous_tab_follows_the_history() {
        let mut mock = MockTabHost::new();
        mock.expect_recent_history()
            .returning(|| Ok(vec![TabId(3), TabId(1), TabId(2)]));
        mock.expect_switch_to_tab()
            .withf(|id| *id == TabId(1))
            .times(1)
            .returning(|_| Ok(()));
        mock.expect_record_access().returning(|_| Ok(()));
        let ctx = ctx_with_tabs(vec![
            tab(1, "older", "https://a.example", false),
            tab(2, "oldest", "https://b.example", false),
            tab(3, "current", "https://c.example", true),
        ]);

        let outcome = execute(CommandId::PreviousTab, ctx, Arc::new(mock)).await;
        assert!(outcome.success);
    }

    #[tokio::test]
    async fn previous_tab_skips_closed_entries() {
        let mut mock = MockTabHost::new();
        // Tab 9 is in the history but no longer open.
        mock.expect_recent_history()
            .returning(|| Ok(vec![TabId(3), TabId(9), TabId(2)]));
        mock.expect_switch_to_tab()
            .withf(|id| *id == TabId(2))
            .times(1)
            .returning(|_| Ok(()));
        mock.expect_record_access().returning(|_| Ok(()));
        let ctx = ctx_with_tabs(vec![
            tab(2, "oldest", "https://b.example", false),
            tab(3, "current", "https://c.example", true),
        ]);

        let outcome = execute(CommandId::PreviousTab, ctx, Arc::new(mock)).await;
        assert!(outcome.success);
    }

    #[tokio::test]
    async fn previous_tab_without_history_fails_softly() {
        let mut mock = MockTabHost::new();
        mock.expect_recent_history().returning(|| Ok(Vec::new()));
        mock.expect_switch_to_tab().never();
        let ctx = ctx_with_tabs(vec![tab(1, "only", "https://a.example", true)]);

        let outcome = execute(CommandId::PreviousTab, ctx, Arc::new(mock)).await;
        assert!(!outcome.success);
        assert_eq!(outcome.error.unwrap(), "no previous tab available");
    }

    #[tokio::test]
    async fn close_single_uses_the_activated_target() {
        let mut mock = MockTabHost::new();
        mock.expect_close_tabs()
            .withf(|ids| ids == [TabId(7)])
            .times(1)
            .returning(|ids| Ok(ids.len()));
        let mut ctx = ctx_with_tabs(Vec::new());
        ctx.target = Some(ResultItem::CloseTab {
            id: TabId(7),
            title: "Docs".to_string(),
        });

        let outcome = execute(CommandId::CloseTab, ctx, Arc::new(mock)).await;
        assert!(outcome.success);
        assert_eq!(outcome.message.unwrap(), "Closed \"Docs\"");
    }

    #[tokio::test]
    async fn web_search_picks_engine_from_leading_token() {
        let mut mock = MockTabHost::new();
        mock.expect_open_url()
            .withf(|url| url.starts_with("https://github.com/search?q=tokio"))
            .times(1)
            .returning(|_| Ok(TabId(99)));
        let mut ctx = ctx_with_tabs(Vec::new());
        ctx.argument = "gh tokio".to_string();

        let outcome = execute(CommandId::WebSearch, ctx, Arc::new(mock)).await;
        assert!(outcome.success);
        assert!(outcome.message.unwrap().contains("GitHub"));
    }

    #[tokio::test]
    async fn open_url_rejects_invalid_input_before_the_host() {
        let mut mock = MockTabHost::new();
        mock.expect_open_url().never();
        let mut ctx = ctx_with_tabs(Vec::new());
        ctx.argument = "not a url".to_string();

        let outcome = execute(CommandId::OpenUrl, ctx, Arc::new(mock)).await;
        assert!(!outcome.success);
        assert!(outcome.error.unwrap().contains("not a valid URL"));
    }

    #[tokio::test]
    async fn open_url_normalizes_schemeless_input() {
        let mut mock = MockTabHost::new();
        mock.expect_open_url()
            .withf(|url| url == "https://docs.rs")
            .times(1)
            .returning(|_| Ok(TabId(5)));
        let mut ctx = ctx_with_tabs(Vec::new());
        ctx.argument = "docs.rs".to_string();

        let outcome = execute(CommandId::OpenUrl, ctx, Arc::new(mock)).await;
        assert!(outcome.success);
        assert_eq!(outcome.message.unwrap(), "Opened https://docs.rs");
    }

    #[tokio::test]
    async fn delete_group_falls_back_to_argument_match() {
        let mut mock = MockTabHost::new();
        mock.expect_delete_group()
            .withf(|id| *id == GroupId(4))
            .times(1)
            .returning(|_| Ok(()));
        let mut ctx = ctx_with_tabs(Vec::new());
        ctx.groups = vec![TabGroup {
            id: GroupId(4),
            title: "Research".to_string(),
        }];
        ctx.argument = "resea".to_string();

        let outcome = execute(CommandId::DeleteGroup, ctx, Arc::new(mock)).await;
        assert!(outcome.success);
        assert_eq!(outcome.message.unwrap(), "Deleted group \"Research\"");
    }
}
