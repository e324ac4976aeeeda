use crate::theme::PaletteType;
use percent_encoding::{utf8_percent_encode, NON_ALPHANUMERIC};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// URL template used when no engine is configured at all.
pub const FALLBACK_TEMPLATE: &str = "https://www.google.com/search?q=%s";

/// One web search engine. The table is data: swapping it out changes both
/// query parsing (shortcut prefixes) and the Search command's listing
/// without touching any dispatch logic.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchEngine {
    pub id: String,
    pub name: String,
    /// Template with a single `%s` placeholder for the encoded query.
    pub url_template: String,
    pub shortcuts: Vec<String>,
}

impl SearchEngine {
    #[must_use]
    pub fn build_url(&self, query: &str) -> String {
        let encoded = utf8_percent_encode(query, NON_ALPHANUMERIC).to_string();
        self.url_template.replacen("%s", &encoded, 1)
    }

    #[must_use]
    pub fn answers_to(&self, token: &str) -> bool {
        let token = token.to_lowercase();
        self.shortcuts.iter().any(|s| s.to_lowercase() == token)
            || self.name.to_lowercase() == token
    }
}

/// Splits an optional leading engine token off a search argument.
/// `"gh tokio"` picks GitHub with `"tokio"`; `"tokio spawn"` picks nothing.
#[must_use]
pub fn split_engine_query<'a, 'q>(
    engines: &'a [SearchEngine],
    argument: &'q str,
) -> (Option<&'a SearchEngine>, &'q str) {
    let argument = argument.trim();
    if let Some((first, rest)) = argument.split_once(char::is_whitespace) {
        if let Some(engine) = engines.iter().find(|e| e.answers_to(first)) {
            return (Some(engine), rest.trim());
        }
    }
    (None, argument)
}

fn engine(id: &str, name: &str, template: &str, shortcuts: &[&str]) -> SearchEngine {
    SearchEngine {
        id: id.to_string(),
        name: name.to_string(),
        url_template: template.to_string(),
        shortcuts: shortcuts.iter().map(ToString::to_string).collect(),
    }
}

#[must_use]
pub fn default_engines() -> Vec<SearchEngine> {
    vec![
        engine("google", "Google", FALLBACK_TEMPLATE, &["g", "google"]),
        engine("duckduckgo", "DuckDuckGo", "https://duckduckgo.com/?q=%s", &["ddg"]),
        engine("bing", "Bing", "https://www.bing.com/search?q=%s", &["b", "bing"]),
        engine(
            "youtube",
            "YouTube",
            "https://www.youtube.com/results?search_query=%s",
            &["y", "yt", "youtube"],
        ),
        engine("github", "GitHub", "https://github.com/search?q=%s", &["gh"]),
        engine(
            "stackoverflow",
            "Stack Overflow",
            "https://stackoverflow.com/search?q=%s",
            &["so"],
        ),
        engine(
            "wikipedia",
            "Wikipedia",
            "https://en.wikipedia.org/wiki/Special:Search?search=%s",
            &["wiki"],
        ),
        engine("reddit", "Reddit", "https://www.reddit.com/search/?q=%s", &["r"]),
    ]
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub theme: PaletteType,
    pub engines: Vec<SearchEngine>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            theme: PaletteType::CatppuccinMocha,
            engines: default_engines(),
        }
    }
}

pub fn config_path() -> Option<PathBuf> {
    home::home_dir().map(|mut path| {
        path.push(".config");
        path.push("tabpilot");
        path.push("config.toml");
        path
    })
}

impl Config {
    #[must_use]
    pub fn load() -> Self {
        config_path().map_or_else(Self::default, |p| Self::load_from(&p))
    }

    #[must_use]
    pub fn load_from(path: &std::path::Path) -> Self {
        if path.exists() {
            if let Ok(content) = std::fs::read_to_string(path) {
                match toml::from_str::<Config>(&content) {
                    Ok(config) => return config,
                    Err(e) => tracing::warn!("ignoring malformed config {}: {e}", path.display()),
                }
            }
        }
        Self::default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn build_url_encodes_query() {
        let engines = default_engines();
        let google = &engines[0];
        assert_eq!(
            google.build_url("rust async"),
            "https://www.google.com/search?q=rust%20async"
        );
    }

    #[test]
    fn split_engine_query_picks_leading_shortcut() {
        let engines = default_engines();
        let (engine, rest) = split_engine_query(&engines, "gh tokio channels");
        assert_eq!(engine.unwrap().id, "github");
        assert_eq!(rest, "tokio channels");

        let (engine, rest) = split_engine_query(&engines, "tokio channels");
        assert!(engine.is_none());
        assert_eq!(rest, "tokio channels");

        // A lone engine token carries no query; it is not an engine pick.
        let (engine, rest) = split_engine_query(&engines, "gh");
        assert!(engine.is_none());
        assert_eq!(rest, "gh");
    }

    #[test]
    fn load_from_round_trips_and_tolerates_garbage() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");

        let mut config = Config::default();
        config.engines.truncate(2);
        std::fs::write(&path, toml::to_string(&config).unwrap()).unwrap();
        assert_eq!(Config::load_from(&path), config);

        std::fs::write(&path, "not [valid toml").unwrap();
        assert_eq!(Config::load_from(&path), Config::default());
    }

    #[test]
    fn missing_file_yields_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config::load_from(&dir.path().join("nope.toml"));
        assert_eq!(config, Config::default());
    }
}
