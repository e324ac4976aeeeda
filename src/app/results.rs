use crate::app::config::{split_engine_query, SearchEngine, FALLBACK_TEMPLATE};
use crate::app::parser::{is_probable_url, normalize_url};
use crate::app::registry::{CommandId, CommandRegistry, CommandSpec};
use crate::app::selection::Selection;
use crate::domain::models::{GroupId, Tab, TabGroup, TabId};

/// Deferred payload of an [`ResultItem::Action`] entry.
#[derive(Debug, Clone, PartialEq)]
pub enum ItemEffect {
    RunCommand(CommandId),
    /// A fully built search URL, opened as-is.
    OpenSearch(String),
}

/// One selectable entry in the palette list. Render order is navigation
/// order.
#[derive(Debug, Clone, PartialEq)]
pub enum ResultItem {
    Tab {
        id: TabId,
        title: String,
        url: String,
        active: bool,
    },
    Action {
        id: String,
        label: String,
        effect: ItemEffect,
    },
    /// A tab presented specifically as a close target.
    CloseTab { id: TabId, title: String },
    Group { id: GroupId, title: String },
}

impl ResultItem {
    fn tab(tab: &Tab) -> Self {
        ResultItem::Tab {
            id: tab.id,
            title: tab.title.clone(),
            url: tab.url.clone(),
            active: tab.active,
        }
    }

    fn close_tab(tab: &Tab) -> Self {
        ResultItem::CloseTab {
            id: tab.id,
            title: tab.title.clone(),
        }
    }

    /// Stable identity used for de-duplication across merged sources.
    #[must_use]
    pub fn identity(&self) -> String {
        match self {
            ResultItem::Tab { id, .. } => format!("tab-{id}"),
            ResultItem::Action { id, .. } => format!("action-{id}"),
            ResultItem::CloseTab { id, .. } => format!("tab-{id}"),
            ResultItem::Group { id, .. } => format!("group-{id}"),
        }
    }

    /// The tab this entry points at, if any.
    #[must_use]
    pub fn tab_id(&self) -> Option<TabId> {
        match self {
            ResultItem::Tab { id, .. } | ResultItem::CloseTab { id, .. } => Some(*id),
            _ => None,
        }
    }
}

/// Everything the producer reads. Snapshots only; the function is pure.
pub struct ResultContext<'a> {
    pub tabs: &'a [Tab],
    pub groups: &'a [TabGroup],
    /// Access history, most recent first.
    pub history: &'a [TabId],
    pub selection: &'a Selection,
    pub engines: &'a [SearchEngine],
    pub registry: &'a CommandRegistry,
    pub query: &'a str,
}

/// Produces the ordered result list for the current interaction. Given the
/// same inputs this always yields the same list; keyboard navigation
/// indices depend on it.
#[must_use]
pub fn produce(
    resolved: Option<&CommandSpec>,
    argument: &str,
    ctx: &ResultContext<'_>,
) -> Vec<ResultItem> {
    let items = match resolved {
        Some(spec) => command_listing(spec, argument, ctx),
        None => {
            if ctx.query.trim().is_empty() {
                recent_tabs(ctx)
            } else {
                free_text_listing(ctx)
            }
        }
    };
    dedupe_first_wins(items)
}

/// All tabs, most recently accessed first. Tabs absent from the history
/// sort last, keeping their inventory order.
fn recent_tabs(ctx: &ResultContext<'_>) -> Vec<ResultItem> {
    let rank = |id: TabId| {
        ctx.history
            .iter()
            .position(|h| *h == id)
            .unwrap_or(usize::MAX)
    };
    let mut tabs: Vec<&Tab> = ctx.tabs.iter().collect();
    tabs.sort_by_key(|t| rank(t.id));
    tabs.into_iter().map(ResultItem::tab).collect()
}

/// Free-text mode: matching tabs, then command suggestions, then — only if
/// both came up empty — a synthetic web-search fallback so the list is
/// never empty for non-blank input.
fn free_text_listing(ctx: &ResultContext<'_>) -> Vec<ResultItem> {
    let query = ctx.query.trim();
    let mut items: Vec<ResultItem> = ctx
        .tabs
        .iter()
        .filter(|t| t.matches(query))
        .map(ResultItem::tab)
        .collect();

    for spec in ctx.registry.suggestions(query) {
        let argument = spec.extract_argument(query);
        items.push(ResultItem::Action {
            id: format!("{}-suggestion", spec.id),
            label: spec.display_title(&argument),
            effect: ItemEffect::RunCommand(spec.id),
        });
    }

    if items.is_empty() {
        items.push(fallback_search(query, ctx.engines));
    }
    items
}

fn fallback_search(query: &str, engines: &[SearchEngine]) -> ResultItem {
    let url = engines.first().map_or_else(
        || {
            let encoded = percent_encoding::utf8_percent_encode(
                query,
                percent_encoding::NON_ALPHANUMERIC,
            );
            FALLBACK_TEMPLATE.replacen("%s", &encoded.to_string(), 1)
        },
        |engine| engine.build_url(query),
    );
    ResultItem::Action {
        id: "fallback-search".to_string(),
        label: format!("Search the web for \"{query}\""),
        effect: ItemEffect::OpenSearch(url),
    }
}

/// Listing for a resolved command. An empty per-command listing still gets
/// the command's own suggestion entry so Enter always has a target.
fn command_listing(
    spec: &CommandSpec,
    argument: &str,
    ctx: &ResultContext<'_>,
) -> Vec<ResultItem> {
    let argument = argument.trim();
    let mut items = match spec.id {
        CommandId::CloseTab => ctx
            .tabs
            .iter()
            .filter(|t| argument.is_empty() || t.matches(argument))
            .map(ResultItem::close_tab)
            .collect(),
        CommandId::CloseMultiple => ctx
            .tabs
            .iter()
            .filter(|t| argument.is_empty() || t.matches(argument))
            .map(ResultItem::tab)
            .collect(),
        CommandId::GroupTabs => ctx
            .tabs
            .iter()
            // Selection narrows the candidate pool monotonically.
            .filter(|t| !ctx.selection.contains(t.id))
            .filter(|t| argument.is_empty() || t.matches(argument))
            .map(ResultItem::tab)
            .collect(),
        CommandId::DeleteGroup => ctx
            .groups
            .iter()
            .filter(|g| argument.is_empty() || g.matches(argument))
            .map(|g| ResultItem::Group {
                id: g.id,
                title: g.label(),
            })
            .collect(),
        CommandId::WebSearch => search_listing(argument, ctx.engines),
        CommandId::OpenUrl => open_url_listing(argument),
        CommandId::NewTab | CommandId::PreviousTab | CommandId::CloseDuplicates => Vec::new(),
    };

    if items.is_empty() {
        items.push(ResultItem::Action {
            id: format!("{}-suggestion", spec.id),
            label: spec.display_title(argument),
            effect: ItemEffect::RunCommand(spec.id),
        });
    }
    items
}

fn search_listing(argument: &str, engines: &[SearchEngine]) -> Vec<ResultItem> {
    if argument.is_empty() {
        return engines
            .iter()
            .map(|engine| ResultItem::Action {
                id: format!("search-{}", engine.id),
                label: format!("Search with {}", engine.name),
                effect: ItemEffect::RunCommand(CommandId::WebSearch),
            })
            .collect();
    }

    let (picked, query) = split_engine_query(engines, argument);
    match picked {
        Some(engine) => vec![ResultItem::Action {
            id: format!("search-{}", engine.id),
            label: format!("Search \"{query}\" on {}", engine.name),
            effect: ItemEffect::OpenSearch(engine.build_url(query)),
        }],
        None => engines
            .iter()
            .map(|engine| ResultItem::Action {
                id: format!("search-{}", engine.id),
                label: format!("Search \"{argument}\" on {}", engine.name),
                effect: ItemEffect::OpenSearch(engine.build_url(argument)),
            })
            .collect(),
    }
}

fn open_url_listing(argument: &str) -> Vec<ResultItem> {
    if argument.is_empty() {
        return vec![ResultItem::Action {
            id: "open-url-help".to_string(),
            label: "Enter a URL to open in a new tab".to_string(),
            effect: ItemEffect::RunCommand(CommandId::OpenUrl),
        }];
    }
    if is_probable_url(argument) {
        vec![ResultItem::Action {
            id: format!("open-url-{argument}"),
            label: format!("Open: {}", normalize_url(argument)),
            effect: ItemEffect::RunCommand(CommandId::OpenUrl),
        }]
    } else {
        vec![ResultItem::Action {
            id: "open-url-invalid".to_string(),
            label: format!("\"{argument}\" is not a valid URL"),
            effect: ItemEffect::RunCommand(CommandId::OpenUrl),
        }]
    }
}

/// When the same entity is reachable through several sources, the first
/// occurrence in produce-order wins.
fn dedupe_first_wins(items: Vec<ResultItem>) -> Vec<ResultItem> {
    let mut seen = std::collections::HashSet::new();
    items
        .into_iter()
        .filter(|item| seen.insert(item.identity()))
        .collect()
}
