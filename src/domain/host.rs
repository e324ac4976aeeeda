use crate::domain::models::{GroupId, Tab, TabGroup, TabId};
use anyhow::Result;
use async_trait::async_trait;

/// Boundary to the platform that owns the tab session.
///
/// Every call is asynchronous and fallible; callers must never assume a
/// mutation silently succeeded. A target that disappeared between a listing
/// and the call (the user closed it by hand) surfaces as an `Err`.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait TabHost: Send + Sync {
    async fn list_tabs(&self) -> Result<Vec<Tab>>;
    async fn list_groups(&self) -> Result<Vec<TabGroup>>;

    async fn switch_to_tab(&self, id: TabId) -> Result<()>;

    /// Returns the number of tabs actually closed.
    async fn close_tabs(&self, ids: &[TabId]) -> Result<usize>;

    async fn create_tab(&self, url: Option<String>) -> Result<TabId>;
    async fn open_url(&self, url: &str) -> Result<TabId>;

    /// Groups the given tabs; tabs already in another group are moved.
    async fn create_group(&self, tab_ids: &[TabId], name: Option<String>) -> Result<GroupId>;

    /// Ungroups the member tabs; does not close them.
    async fn delete_group(&self, id: GroupId) -> Result<()>;

    async fn tabs_in_group(&self, id: GroupId) -> Result<Vec<TabId>>;

    /// Access history, most recent first. Source of the palette's
    /// most-recently-used ordering; survives a session reload.
    async fn recent_history(&self) -> Result<Vec<TabId>>;

    async fn record_access(&self, id: TabId) -> Result<()>;
}
