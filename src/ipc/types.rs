use lru::LruCache;
use serde::Deserialize;

use crate::cache::ReferenceResultCache;
use crate::config::Config;
use crate::headers::HeaderBinding;
use crate::sorting::SortState;

#[derive(Debug, Deserialize, Clone)]
pub struct Request {
    pub id: String,
    pub method: String,
    #[serde(default)]
    pub params: serde_json::Value,
}

/// Sort state and declared headers of one open table.
#[derive(Debug, Clone)]
pub struct TableSession {
    pub sort: SortState,
    pub headers: HeaderBinding,
}

pub struct AppState {
    pub config: Config,
    pub results: ReferenceResultCache,
    /// Open tables by id. Clients that never call `tables.close` are bounded
    /// by `max_open_tables`; the least recently used table goes first.
    pub tables: LruCache<String, TableSession>,
}

impl AppState {
    pub fn new(config: Config) -> Self {
        let results = ReferenceResultCache::new(
            config.status_vocabulary.clone(),
            config.empty_result_token.clone(),
        );
        let tables = LruCache::new(config.max_open_tables);
        Self {
            config,
            results,
            tables,
        }
    }
}
