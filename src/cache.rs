use crate::extract::SortingContext;
use crate::model::ReferenceResult;

/// The reference result list last handed to us, plus the rank tables built
/// from it. Owned by the session; there is no process-wide copy.
#[derive(Debug)]
pub struct ReferenceResultCache {
    status_vocabulary: Vec<String>,
    empty_token: String,
    loaded: Option<Loaded>,
    empty_ctx: SortingContext,
}

#[derive(Debug)]
struct Loaded {
    raw: Vec<serde_json::Value>,
    ctx: SortingContext,
}

impl ReferenceResultCache {
    pub fn new(status_vocabulary: Vec<String>, empty_token: String) -> Self {
        let empty_ctx = SortingContext::new(&[], Some(status_vocabulary.as_slice()), &empty_token);
        Self {
            status_vocabulary,
            empty_token,
            loaded: None,
            empty_ctx,
        }
    }

    /// Replace the cached list and rebuild the rank tables. Returns the
    /// number of results that received a rank.
    pub fn load(&mut self, raw: Vec<serde_json::Value>) -> usize {
        let parsed: Vec<ReferenceResult> = raw
            .iter()
            .map(|v| serde_json::from_value(v.clone()).unwrap_or_default())
            .collect();
        let ctx = SortingContext::new(
            &parsed,
            Some(self.status_vocabulary.as_slice()),
            &self.empty_token,
        );
        let ranked = ctx.result_rank.len();
        self.loaded = Some(Loaded { raw, ctx });
        ranked
    }

    pub fn get(&self) -> Option<&[serde_json::Value]> {
        self.loaded.as_ref().map(|l| l.raw.as_slice())
    }

    pub fn is_loaded(&self) -> bool {
        self.loaded.is_some()
    }

    /// Returns whether anything was cached.
    pub fn invalidate(&mut self) -> bool {
        self.loaded.take().is_some()
    }

    /// Rank tables for sorting; empty result ranks when nothing is loaded.
    pub fn context(&self) -> &SortingContext {
        self.loaded.as_ref().map(|l| &l.ctx).unwrap_or(&self.empty_ctx)
    }
}
