// src/blame.rs

use crate::error::VcsError;
use crate::model::BlameMap;
use crate::vcs::VcsProvider;
use std::collections::HashMap;
use std::rc::Rc;
use tracing::debug;

/// Per-file line attribution with an optional `(revision, path)` cache.
///
/// A file that several fix commits touch at the same parent revision is
/// blamed once. Cached and fresh results are identical.
pub struct BlameAttributor<'a, P: VcsProvider + ?Sized> {
    provider: &'a P,
    cache: Option<HashMap<(String, String), Rc<BlameMap>>>,
    hits: usize,
}

impl<'a, P: VcsProvider + ?Sized> BlameAttributor<'a, P> {
    pub fn new(provider: &'a P, use_cache: bool) -> Self {
        Self {
            provider,
            cache: use_cache.then(HashMap::new),
            hits: 0,
        }
    }

    /// Attributes every line of `path` as of `start`.
    pub fn blame(&mut self, start: &str, path: &str) -> Result<Rc<BlameMap>, VcsError> {
        let Some(cache) = self.cache.as_mut() else {
            return Ok(Rc::new(self.provider.blame(start, path)?));
        };

        let key = (start.to_string(), path.to_string());
        if let Some(hit) = cache.get(&key) {
            self.hits += 1;
            debug!(path, revision = start, "blame cache hit");
            return Ok(Rc::clone(hit));
        }

        let result = Rc::new(self.provider.blame(start, path)?);
        cache.insert(key, Rc::clone(&result));
        Ok(result)
    }

    pub fn cache_hits(&self) -> usize {
        self.hits
    }
}
