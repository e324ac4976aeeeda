use crate::app::config::SearchEngine;
use crate::app::registry::{CommandId, CommandRegistry};

/// Classification of the raw palette input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QueryKind {
    /// Default mode: filter the open tabs.
    TabSearch,
    Command(CommandId),
    /// A search-engine shortcut such as `g rust`.
    Engine(String),
    OpenUrl,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ParsedQuery {
    pub kind: QueryKind,
    pub argument: String,
    pub original: String,
}

#[derive(Debug, Clone)]
struct PrefixEntry {
    prefix: String,
    kind: QueryKind,
    /// Engine shortcuts only fire with a trailing argument; a bare `google`
    /// stays a tab search. Command aliases also match whole.
    requires_argument: bool,
}

/// Priority-ordered prefix table: command aliases first (in registration
/// order, longest alias first per command), then configured engine
/// shortcuts. Rebuilt only when the engine configuration changes.
#[derive(Debug, Clone)]
pub struct PrefixTable {
    entries: Vec<PrefixEntry>,
}

impl PrefixTable {
    #[must_use]
    pub fn new(registry: &CommandRegistry, engines: &[SearchEngine]) -> Self {
        let mut entries = Vec::new();
        for spec in registry.all() {
            for alias in spec.aliases {
                entries.push(PrefixEntry {
                    prefix: (*alias).to_string(),
                    kind: QueryKind::Command(spec.id),
                    requires_argument: false,
                });
            }
        }
        for engine in engines {
            for shortcut in &engine.shortcuts {
                entries.push(PrefixEntry {
                    prefix: shortcut.to_lowercase(),
                    kind: QueryKind::Engine(engine.id.clone()),
                    requires_argument: true,
                });
            }
        }
        Self { entries }
    }

    /// Total and deterministic: every input classifies to something, and
    /// the same input always classifies the same way.
    #[must_use]
    pub fn parse(&self, raw: &str) -> ParsedQuery {
        let trimmed = raw.trim();
        let lower = trimmed.to_lowercase();

        for entry in &self.entries {
            if !entry.requires_argument && lower == entry.prefix {
                // Exactly a prefix: the command with an empty argument,
                // which downstream reads as "all candidates".
                return ParsedQuery {
                    kind: entry.kind.clone(),
                    argument: String::new(),
                    original: raw.to_string(),
                };
            }
            if lower.starts_with(&entry.prefix) && lower[entry.prefix.len()..].starts_with(' ') {
                // Prefixes are ASCII; guard the slice anyway in case folding
                // shifted byte offsets for exotic input.
                let argument = if trimmed.is_char_boundary(entry.prefix.len()) {
                    trimmed[entry.prefix.len()..].trim().to_string()
                } else {
                    lower[entry.prefix.len()..].trim().to_string()
                };
                if argument.is_empty() && entry.requires_argument {
                    continue;
                }
                return ParsedQuery {
                    kind: entry.kind.clone(),
                    argument,
                    original: raw.to_string(),
                };
            }
        }

        if is_probable_url(trimmed) {
            return ParsedQuery {
                kind: QueryKind::OpenUrl,
                argument: trimmed.to_string(),
                original: raw.to_string(),
            };
        }

        ParsedQuery {
            kind: QueryKind::TabSearch,
            argument: trimmed.to_string(),
            original: raw.to_string(),
        }
    }
}

/// Bare-bones URL sniff: a dot, no whitespace, or an explicit scheme.
#[must_use]
pub fn is_probable_url(text: &str) -> bool {
    if text.is_empty() || text.contains(char::is_whitespace) {
        return false;
    }
    text.starts_with("http://") || text.starts_with("https://") || text.contains('.')
}

/// Prefixes `https://` onto schemeless input.
#[must_use]
pub fn normalize_url(url: &str) -> String {
    if url.starts_with("http://") || url.starts_with("https://") {
        url.to_string()
    } else {
        format!("https://{url}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::config::default_engines;

    fn table() -> PrefixTable {
        PrefixTable::new(&CommandRegistry::new(), &default_engines())
    }

    #[test]
    fn parse_is_deterministic() {
        let table = table();
        let a = table.parse("close duplicates");
        let b = table.parse("close duplicates");
        assert_eq!(a, b);
    }

    #[test]
    fn close_duplicate_parses_with_empty_argument() {
        let parsed = table().parse("close duplicate");
        assert_eq!(parsed.kind, QueryKind::Command(CommandId::CloseDuplicates));
        assert_eq!(parsed.argument, "");
    }

    #[test]
    fn progressive_engine_reclassification() {
        let table = table();
        // "goo" is plain tab search.
        assert_eq!(table.parse("goo").kind, QueryKind::TabSearch);
        // "google " trims to a bare shortcut: still tab search.
        assert_eq!(table.parse("google ").kind, QueryKind::TabSearch);
        // Only a real argument flips it to the engine.
        let parsed = table.parse("google foo");
        assert_eq!(parsed.kind, QueryKind::Engine("google".to_string()));
        assert_eq!(parsed.argument, "foo");
    }

    #[test]
    fn short_engine_shortcut_parses() {
        let parsed = table().parse("g rust lifetimes");
        assert_eq!(parsed.kind, QueryKind::Engine("google".to_string()));
        assert_eq!(parsed.argument, "rust lifetimes");
    }

    #[test]
    fn command_prefix_keeps_argument_case() {
        let parsed = table().parse("Close Tab GitHub");
        assert_eq!(parsed.kind, QueryKind::Command(CommandId::CloseTab));
        assert_eq!(parsed.argument, "GitHub");
    }

    #[test]
    fn dotted_word_without_spaces_is_a_url() {
        let table = table();
        let parsed = table.parse("docs.rs");
        assert_eq!(parsed.kind, QueryKind::OpenUrl);
        assert_eq!(parsed.argument, "docs.rs");
        // Whitespace disqualifies it.
        assert_eq!(table.parse("docs rs").kind, QueryKind::TabSearch);
    }

    #[test]
    fn unmatched_input_falls_back_to_tab_search() {
        let parsed = table().parse("meeting notes");
        assert_eq!(parsed.kind, QueryKind::TabSearch);
        assert_eq!(parsed.argument, "meeting notes");
    }

    #[test]
    fn normalize_url_adds_scheme_once() {
        assert_eq!(normalize_url("docs.rs"), "https://docs.rs");
        assert_eq!(normalize_url("https://docs.rs"), "https://docs.rs");
    }
}
