use crate::domain::host::TabHost;
use crate::domain::models::{GroupId, Tab, TabGroup, TabId};
use anyhow::{anyhow, Context, Result};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::sync::Arc;
use tokio::sync::Mutex;

const MAX_HISTORY_SIZE: usize = 100;

/// Serialized form of one tab session. Written back after every mutation so
/// the session survives a restart.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
struct SessionState {
    next_tab_id: u64,
    next_group_id: u64,
    /// Access history, most recent first. Kept ahead of the table arrays so
    /// the serialized document stays valid TOML.
    history: Vec<TabId>,
    tabs: Vec<Tab>,
    groups: Vec<TabGroup>,
}

impl SessionState {
    fn seed() -> Self {
        let mut state = Self {
            next_tab_id: 1,
            next_group_id: 1,
            ..Self::default()
        };
        let id = state.allocate_tab_id();
        state.tabs.push(Tab {
            id,
            title: "New Tab".to_string(),
            url: "about:blank".to_string(),
            active: true,
            group: None,
        });
        state
    }

    fn allocate_tab_id(&mut self) -> TabId {
        let id = TabId(self.next_tab_id);
        self.next_tab_id += 1;
        id
    }

    fn allocate_group_id(&mut self) -> GroupId {
        let id = GroupId(self.next_group_id);
        self.next_group_id += 1;
        id
    }

    fn tab_mut(&mut self, id: TabId) -> Result<&mut Tab> {
        self.tabs
            .iter_mut()
            .find(|t| t.id == id)
            .ok_or_else(|| anyhow!("tab {id} no longer exists"))
    }

    fn activate(&mut self, id: TabId) {
        for tab in &mut self.tabs {
            tab.active = tab.id == id;
        }
    }

    fn touch(&mut self, id: TabId) {
        self.history.retain(|h| *h != id);
        self.history.insert(0, id);
        self.history.truncate(MAX_HISTORY_SIZE);
    }

    /// Guess a readable title from the URL host part.
    fn title_for(url: &str) -> String {
        let stripped = url
            .trim_start_matches("https://")
            .trim_start_matches("http://");
        let host = stripped.split('/').next().unwrap_or(stripped);
        if host.is_empty() {
            "New Tab".to_string()
        } else {
            host.to_string()
        }
    }
}

/// File-backed [`TabHost`]: the palette's view of a browser-like session,
/// persisted as TOML under the data directory.
pub struct SessionHost {
    state: Arc<Mutex<SessionState>>,
    path: PathBuf,
}

pub fn default_session_path() -> Option<PathBuf> {
    home::home_dir().map(|mut path| {
        path.push(".local");
        path.push("share");
        path.push("tabpilot");
        path.push("session.toml");
        path
    })
}

impl SessionHost {
    /// Loads the session at `path`, seeding a fresh one if the file is
    /// missing or unreadable.
    pub fn open(path: PathBuf) -> Result<Self> {
        let state = match std::fs::read_to_string(&path) {
            Ok(content) => match toml::from_str::<SessionState>(&content) {
                Ok(state) => state,
                Err(e) => {
                    tracing::warn!("ignoring malformed session {}: {e}", path.display());
                    SessionState::seed()
                }
            },
            Err(_) => SessionState::seed(),
        };
        let host = Self {
            state: Arc::new(Mutex::new(state)),
            path,
        };
        Ok(host)
    }

    fn persist(&self, state: &SessionState) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("creating {}", parent.display()))?;
        }
        let content = toml::to_string(state).context("serializing session")?;
        std::fs::write(&self.path, content)
            .with_context(|| format!("writing {}", self.path.display()))?;
        Ok(())
    }

    #[cfg(test)]
    fn path(&self) -> &std::path::Path {
        &self.path
    }
}

#[async_trait]
impl TabHost for SessionHost {
    async fn list_tabs(&self) -> Result<Vec<Tab>> {
        Ok(self.state.lock().await.tabs.clone())
    }

    async fn list_groups(&self) -> Result<Vec<TabGroup>> {
        Ok(self.state.lock().await.groups.clone())
    }

    async fn switch_to_tab(&self, id: TabId) -> Result<()> {
        let mut state = self.state.lock().await;
        state.tab_mut(id)?;
        state.activate(id);
        self.persist(&state)
    }

    async fn close_tabs(&self, ids: &[TabId]) -> Result<usize> {
        let mut state = self.state.lock().await;
        let before = state.tabs.len();
        state.tabs.retain(|t| !ids.contains(&t.id));
        let closed = before - state.tabs.len();
        if closed == 0 {
            return Err(anyhow!("no matching tabs left to close"));
        }
        state.history.retain(|h| !ids.contains(h));
        // Keep exactly one active tab if the active one went away.
        if !state.tabs.iter().any(|t| t.active) {
            let fallback = state
                .history
                .iter()
                .find(|h| state.tabs.iter().any(|t| t.id == **h))
                .copied()
                .or_else(|| state.tabs.first().map(|t| t.id));
            if let Some(id) = fallback {
                state.activate(id);
            }
        }
        self.persist(&state)?;
        Ok(closed)
    }

    async fn create_tab(&self, url: Option<String>) -> Result<TabId> {
        let mut state = self.state.lock().await;
        let id = state.allocate_tab_id();
        let url = url.unwrap_or_else(|| "about:blank".to_string());
        state.tabs.push(Tab {
            id,
            title: SessionState::title_for(&url),
            url,
            active: false,
            group: None,
        });
        state.activate(id);
        state.touch(id);
        self.persist(&state)?;
        Ok(id)
    }

    async fn open_url(&self, url: &str) -> Result<TabId> {
        self.create_tab(Some(url.to_string())).await
    }

    async fn create_group(&self, tab_ids: &[TabId], name: Option<String>) -> Result<GroupId> {
        let mut state = self.state.lock().await;
        for id in tab_ids {
            state.tab_mut(*id)?;
        }
        let group_id = state.allocate_group_id();
        state.groups.push(TabGroup {
            id: group_id,
            title: name.unwrap_or_default(),
        });
        for id in tab_ids {
            state.tab_mut(*id)?.group = Some(group_id);
        }
        self.persist(&state)?;
        Ok(group_id)
    }

    async fn delete_group(&self, id: GroupId) -> Result<()> {
        let mut state = self.state.lock().await;
        let before = state.groups.len();
        state.groups.retain(|g| g.id != id);
        if state.groups.len() == before {
            return Err(anyhow!("group {id} no longer exists"));
        }
        // Ungroup the member tabs without closing them.
        for tab in &mut state.tabs {
            if tab.group == Some(id) {
                tab.group = None;
            }
        }
        self.persist(&state)
    }

    async fn tabs_in_group(&self, id: GroupId) -> Result<Vec<TabId>> {
        let state = self.state.lock().await;
        Ok(state
            .tabs
            .iter()
            .filter(|t| t.group == Some(id))
            .map(|t| t.id)
            .collect())
    }

    async fn recent_history(&self) -> Result<Vec<TabId>> {
        Ok(self.state.lock().await.history.clone())
    }

    async fn record_access(&self, id: TabId) -> Result<()> {
        let mut state = self.state.lock().await;
        state.tab_mut(id)?;
        state.touch(id);
        self.persist(&state)
    }
}
