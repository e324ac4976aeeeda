use std::fmt;

/// Closed set of built-in palette commands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CommandId {
    NewTab,
    CloseTab,
    PreviousTab,
    CloseDuplicates,
    CloseMultiple,
    GroupTabs,
    DeleteGroup,
    WebSearch,
    OpenUrl,
}

impl fmt::Display for CommandId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            CommandId::NewTab => "new_tab",
            CommandId::CloseTab => "close_tab",
            CommandId::PreviousTab => "previous_tab",
            CommandId::CloseDuplicates => "close_duplicates",
            CommandId::CloseMultiple => "close_multiple",
            CommandId::GroupTabs => "group_tabs",
            CommandId::DeleteGroup => "delete_group",
            CommandId::WebSearch => "web_search",
            CommandId::OpenUrl => "open_url",
        };
        write!(f, "{s}")
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExecutionMode {
    /// Executes directly from the result list.
    SingleExecution,
    /// Locks the command in so further keystrokes filter its candidates.
    CommandMode,
}

/// Immutable descriptor for one command. Aliases are ordered longest first
/// so argument extraction strips the most specific prefix.
#[derive(Debug, Clone)]
pub struct CommandSpec {
    pub id: CommandId,
    pub name: &'static str,
    pub description: &'static str,
    pub aliases: &'static [&'static str],
    pub mode: ExecutionMode,
    pub multi_select: bool,
}

impl CommandSpec {
    /// Loose match used by the fuzzy resolution tier and for suggestions.
    #[must_use]
    pub fn matches(&self, query: &str) -> bool {
        let q = query.trim().to_lowercase();
        if q.is_empty() {
            return false;
        }
        self.aliases
            .iter()
            .any(|alias| q.starts_with(alias) || alias.contains(&q))
            || self.name.to_lowercase().contains(&q)
    }

    /// Strips the longest matching alias prefix and returns the remainder.
    /// A query that carries no recognized prefix is returned whole; that is
    /// what lets a locked command treat everything typed as a filter.
    #[must_use]
    pub fn extract_argument(&self, query: &str) -> String {
        let trimmed = query.trim();
        let lower = trimmed.to_lowercase();
        for alias in self.aliases {
            if lower == *alias {
                return String::new();
            }
            if lower.starts_with(alias)
                && lower[alias.len()..].starts_with(' ')
                && trimmed.is_char_boundary(alias.len())
            {
                return trimmed[alias.len()..].trim().to_string();
            }
        }
        trimmed.to_string()
    }

    #[must_use]
    pub fn display_title(&self, argument: &str) -> String {
        if argument.trim().is_empty() {
            self.name.to_string()
        } else {
            format!("{}: {}", self.name, argument.trim())
        }
    }
}

/// Flat catalogue of every command, constructed once at startup and handed
/// to the session that needs it.
#[derive(Debug)]
pub struct CommandRegistry {
    specs: Vec<CommandSpec>,
}

impl Default for CommandRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl CommandRegistry {
    #[must_use]
    pub fn new() -> Self {
        let specs = vec![
            CommandSpec {
                id: CommandId::NewTab,
                name: "New Tab",
                description: "Open a new empty tab",
                aliases: &["new tab", "nt"],
                mode: ExecutionMode::SingleExecution,
                multi_select: false,
            },
            CommandSpec {
                id: CommandId::CloseDuplicates,
                name: "Close Duplicate Tabs",
                description: "Close duplicate tabs, keeping one per URL",
                aliases: &["close duplicates", "close duplicate", "dedupe"],
                mode: ExecutionMode::SingleExecution,
                multi_select: false,
            },
            CommandSpec {
                id: CommandId::CloseMultiple,
                name: "Close Tabs",
                description: "Select and close several tabs at once",
                aliases: &["close multiple", "close tabs"],
                mode: ExecutionMode::CommandMode,
                multi_select: true,
            },
            CommandSpec {
                id: CommandId::CloseTab,
                name: "Close Tab",
                description: "Close a tab found by search",
                aliases: &["close tab", "close"],
                mode: ExecutionMode::SingleExecution,
                multi_select: false,
            },
            CommandSpec {
                id: CommandId::PreviousTab,
                name: "Previous Tab",
                description: "Switch back to the previously active tab",
                aliases: &["previous tab", "prev tab", "previous", "prev"],
                mode: ExecutionMode::SingleExecution,
                multi_select: false,
            },
            CommandSpec {
                id: CommandId::GroupTabs,
                name: "Group Tabs",
                description: "Create a tab group from selected tabs",
                aliases: &["create group", "group tabs", "group"],
                mode: ExecutionMode::CommandMode,
                multi_select: true,
            },
            CommandSpec {
                id: CommandId::DeleteGroup,
                name: "Delete Tab Group",
                description: "Delete a tab group without closing its tabs",
                aliases: &["delete group", "remove group", "ungroup"],
                mode: ExecutionMode::CommandMode,
                multi_select: false,
            },
            CommandSpec {
                id: CommandId::WebSearch,
                name: "Search",
                description: "Search the web with a configured engine",
                aliases: &["search", "find"],
                mode: ExecutionMode::SingleExecution,
                multi_select: false,
            },
            CommandSpec {
                id: CommandId::OpenUrl,
                name: "Open",
                description: "Open a URL in a new tab",
                aliases: &["open", "url"],
                mode: ExecutionMode::SingleExecution,
                multi_select: false,
            },
        ];
        Self { specs }
    }

    #[must_use]
    pub fn get(&self, id: CommandId) -> &CommandSpec {
        self.specs
            .iter()
            .find(|s| s.id == id)
            .expect("every CommandId is registered")
    }

    #[must_use]
    pub fn all(&self) -> &[CommandSpec] {
        &self.specs
    }

    /// Resolves the command governing the current interaction.
    ///
    /// A locked id (command mode) short-circuits resolution entirely so the
    /// user can keep typing a filter without switching commands. Otherwise
    /// three tiers run in strict order over registration order: exact alias
    /// match, alias-prefix match (token boundary), then the loose
    /// [`CommandSpec::matches`] predicate.
    #[must_use]
    pub fn resolve(&self, query: &str, locked: Option<CommandId>) -> Option<&CommandSpec> {
        if let Some(id) = locked {
            return Some(self.get(id));
        }
        let q = query.trim().to_lowercase();
        if q.is_empty() {
            return None;
        }
        if let Some(spec) = self
            .specs
            .iter()
            .find(|s| s.aliases.iter().any(|alias| q == *alias))
        {
            return Some(spec);
        }
        if let Some(spec) = self.specs.iter().find(|s| {
            s.aliases
                .iter()
                .any(|alias| q.starts_with(alias) && q[alias.len()..].starts_with(' '))
        }) {
            return Some(spec);
        }
        self.specs.iter().find(|s| s.matches(&q))
    }

    /// Specs worth suggesting for a free-text query.
    #[must_use]
    pub fn suggestions(&self, query: &str) -> Vec<&CommandSpec> {
        if query.trim().is_empty() {
            return Vec::new();
        }
        self.specs.iter().filter(|s| s.matches(query)).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn no_alias_collisions_after_case_folding() {
        let registry = CommandRegistry::new();
        let mut seen = std::collections::HashSet::new();
        for spec in registry.all() {
            for alias in spec.aliases {
                assert!(
                    seen.insert(alias.to_lowercase()),
                    "alias {alias:?} registered twice"
                );
            }
        }
    }

    #[test]
    fn every_alias_resolves_exactly_to_its_command() {
        let registry = CommandRegistry::new();
        for spec in registry.all() {
            for alias in spec.aliases {
                let resolved = registry.resolve(alias, None).expect("alias must resolve");
                assert_eq!(resolved.id, spec.id, "alias {alias:?}");
            }
        }
    }

    #[test]
    fn locked_resolution_ignores_query() {
        let registry = CommandRegistry::new();
        let resolved = registry
            .resolve("close duplicates", Some(CommandId::GroupTabs))
            .unwrap();
        assert_eq!(resolved.id, CommandId::GroupTabs);
    }

    #[test]
    fn prefix_tier_requires_token_boundary() {
        let registry = CommandRegistry::new();
        let resolved = registry.resolve("close tabs docs", None).unwrap();
        assert_eq!(resolved.id, CommandId::CloseMultiple);
        // "closex y" fails the prefix tier but still lands in the fuzzy tier.
        let loose = registry.resolve("closex y", None).unwrap();
        assert_eq!(loose.id, CommandId::CloseTab);
    }

    #[test]
    fn fuzzy_tier_matches_partial_alias() {
        let registry = CommandRegistry::new();
        let resolved = registry.resolve("dupl", None).unwrap();
        assert_eq!(resolved.id, CommandId::CloseDuplicates);
    }

    #[test]
    fn extract_argument_strips_longest_alias() {
        let registry = CommandRegistry::new();
        let close = registry.get(CommandId::CloseMultiple);
        assert_eq!(close.extract_argument("close tabs docs"), "docs");
        assert_eq!(close.extract_argument("close tabs"), "");
        // No recognized prefix: the whole text is the filter argument.
        assert_eq!(close.extract_argument("docs"), "docs");
    }

    #[test]
    fn display_title_appends_argument() {
        let registry = CommandRegistry::new();
        let spec = registry.get(CommandId::CloseTab);
        assert_eq!(spec.display_title(""), "Close Tab");
        assert_eq!(spec.display_title("mail"), "Close Tab: mail");
    }
}
