use serde::Serialize;

use crate::extract::SortKey;
use crate::sorting::{SortDirection, SortState};

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum HeaderError {
    #[error("{0} is not a sortable header of this table")]
    UnknownHeader(SortKey),
}

/// Visual state of one sortable column header.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HeaderIndicator {
    pub key: SortKey,
    pub active: bool,
    /// Direction icon; only set on the active header.
    pub icon: Option<SortDirection>,
}

/// The sortable headers of one rendered table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HeaderBinding {
    headers: Vec<SortKey>,
}

impl Default for HeaderBinding {
    fn default() -> Self {
        Self::new(SortKey::ALL)
    }
}

impl HeaderBinding {
    /// Duplicate headers are kept once, in first-seen order.
    pub fn new(headers: impl IntoIterator<Item = SortKey>) -> Self {
        let mut out: Vec<SortKey> = Vec::new();
        for key in headers {
            if !out.contains(&key) {
                out.push(key);
            }
        }
        Self { headers: out }
    }

    pub fn headers(&self) -> &[SortKey] {
        &self.headers
    }

    pub fn declares(&self, key: SortKey) -> bool {
        self.headers.contains(&key)
    }

    /// A header was clicked: toggle the sort, let the caller re-render, then
    /// report the new indicators.
    pub fn activate<F>(
        &self,
        sort: &mut SortState,
        key: SortKey,
        on_change: F,
    ) -> Result<Vec<HeaderIndicator>, HeaderError>
    where
        F: FnOnce(&SortState),
    {
        if !self.declares(key) {
            return Err(HeaderError::UnknownHeader(key));
        }
        sort.toggle(key);
        on_change(sort);
        Ok(self.indicators(sort))
    }

    pub fn indicators(&self, sort: &SortState) -> Vec<HeaderIndicator> {
        self.headers
            .iter()
            .map(|&key| {
                let active = key == sort.key;
                HeaderIndicator {
                    key,
                    active,
                    icon: active.then_some(sort.direction),
                }
            })
            .collect()
    }
}
