//! Runtime configuration for the sync subsystem.

use std::time::Duration;

const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(30);
const DEFAULT_SYNC_INTERVAL: Duration = Duration::from_secs(30);
const DEFAULT_PAGE_SIZE: usize = 10;
const DEFAULT_MAX_PULL_PAGES: u32 = 100;

/// Tunables for the engine and the HTTP client.
///
/// `page_size` is the full-page item count the remote listing serves; the
/// pull loop treats a shorter page as the end of the listing. The page cap
/// bounds a pull pass against a listing that never stops advertising more
/// pages.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyncConfig {
    pub base_url: String,
    pub request_timeout: Duration,
    pub sync_interval: Duration,
    pub page_size: usize,
    pub max_pull_pages: u32,
}

impl SyncConfig {
    #[must_use]
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
            sync_interval: DEFAULT_SYNC_INTERVAL,
            page_size: DEFAULT_PAGE_SIZE,
            max_pull_pages: DEFAULT_MAX_PULL_PAGES,
        }
    }

    #[must_use]
    pub const fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }

    #[must_use]
    pub const fn with_sync_interval(mut self, interval: Duration) -> Self {
        self.sync_interval = interval;
        self
    }

    #[must_use]
    pub fn with_page_size(mut self, page_size: usize) -> Self {
        self.page_size = page_size.max(1);
        self
    }

    #[must_use]
    pub fn with_max_pull_pages(mut self, max_pull_pages: u32) -> Self {
        self.max_pull_pages = max_pull_pages.max(1);
        self
    }
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self::new("")
    }
}
