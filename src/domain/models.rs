use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TabId(pub u64);

impl fmt::Display for TabId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct GroupId(pub u64);

impl fmt::Display for GroupId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// One open tab as reported by the host.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Tab {
    pub id: TabId,
    pub title: String,
    pub url: String,
    #[serde(default)]
    pub active: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub group: Option<GroupId>,
}

impl Tab {
    #[must_use]
    pub fn matches(&self, needle: &str) -> bool {
        let needle = needle.to_lowercase();
        self.title.to_lowercase().contains(&needle) || self.url.to_lowercase().contains(&needle)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TabGroup {
    pub id: GroupId,
    pub title: String,
}

impl TabGroup {
    /// Display title, falling back to the numeric id for unnamed groups.
    #[must_use]
    pub fn label(&self) -> String {
        if self.title.is_empty() {
            format!("Group {}", self.id)
        } else {
            self.title.clone()
        }
    }

    #[must_use]
    pub fn matches(&self, needle: &str) -> bool {
        let needle = needle.to_lowercase();
        self.title.to_lowercase().contains(&needle) || self.id.to_string().contains(&needle)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tab_matches_title_and_url_case_insensitive() {
        let tab = Tab {
            id: TabId(1),
            title: "Rust Programming Language".to_string(),
            url: "https://www.rust-lang.org".to_string(),
            active: false,
            group: None,
        };
        assert!(tab.matches("rust"));
        assert!(tab.matches("LANG.ORG"));
        assert!(!tab.matches("python"));
    }

    #[test]
    fn group_label_falls_back_to_id() {
        let group = TabGroup {
            id: GroupId(7),
            title: String::new(),
        };
        assert_eq!(group.label(), "Group 7");
        assert!(group.matches("7"));
    }
}
