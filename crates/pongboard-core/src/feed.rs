// Consumer-facing state for one data source: data, loading, error, and the
// last-modified timestamp.
//
// Every load is tagged with a generation number. Results from a load that has
// since been superseded are discarded, so a slow stale response can never
// overwrite a newer one in the consumer's view.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::debug;

use crate::error::FetchError;

/// A normalized payload together with its source's modification time.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Fetched<T> {
    pub data: T,
    pub last_modified: Option<DateTime<Utc>>,
}

/// What the presentation layer reads.
#[derive(Debug, Clone)]
pub struct FeedState<T> {
    pub data: Vec<T>,
    pub loading: bool,
    pub error: Option<Arc<FetchError>>,
    pub last_modified: Option<DateTime<Utc>>,
}

impl<T> Default for FeedState<T> {
    fn default() -> Self {
        Self {
            data: Vec::new(),
            loading: true,
            error: None,
            last_modified: None,
        }
    }
}

#[derive(Debug)]
pub struct Feed<T> {
    generation: u64,
    state: FeedState<T>,
}

impl<T> Default for Feed<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Feed<T> {
    /// A feed that has not loaded anything yet (loading, no data).
    pub fn new() -> Self {
        Self {
            generation: 0,
            state: FeedState::default(),
        }
    }

    pub fn state(&self) -> &FeedState<T> {
        &self.state
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Start a load. Returns the generation to hand back to [`Feed::complete`].
    pub fn begin(&mut self) -> u64 {
        self.generation += 1;
        self.state.loading = true;
        self.generation
    }

    /// Apply the outcome of the load started as `generation`.
    ///
    /// Returns `false` (and changes nothing) when a newer load has begun
    /// since. On failure the previous data is cleared rather than served
    /// stale.
    pub fn complete(
        &mut self,
        generation: u64,
        result: Result<Fetched<Vec<T>>, FetchError>,
    ) -> bool {
        if generation != self.generation {
            debug!(
                generation,
                current = self.generation,
                "discarding superseded load result"
            );
            return false;
        }

        self.state.loading = false;
        match result {
            Ok(fetched) => {
                self.state.data = fetched.data;
                self.state.last_modified = fetched.last_modified;
                self.state.error = None;
            }
            Err(err) => {
                self.state.data = Vec::new();
                self.state.last_modified = None;
                self.state.error = Some(Arc::new(err));
            }
        }
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::TransportError;
    use chrono::TimeZone;

    fn fetched(values: &[u32]) -> Fetched<Vec<u32>> {
        Fetched {
            data: values.to_vec(),
            last_modified: Some(Utc.with_ymd_and_hms(2026, 1, 27, 14, 30, 0).unwrap()),
        }
    }

    fn network_error() -> FetchError {
        TransportError::Network {
            url: "u".into(),
            message: "offline".into(),
        }
        .into()
    }

    #[test]
    fn starts_loading_and_empty() {
        let feed: Feed<u32> = Feed::new();
        assert!(feed.state().loading);
        assert!(feed.state().data.is_empty());
        assert!(feed.state().error.is_none());
        assert!(feed.state().last_modified.is_none());
    }

    #[test]
    fn success_replaces_data() {
        let mut feed = Feed::new();
        let generation = feed.begin();
        assert!(feed.complete(generation, Ok(fetched(&[1, 2]))));

        let state = feed.state();
        assert!(!state.loading);
        assert_eq!(state.data, vec![1, 2]);
        assert!(state.last_modified.is_some());
    }

    #[test]
    fn failure_clears_data_and_sets_error() {
        let mut feed = Feed::new();
        let generation = feed.begin();
        feed.complete(generation, Ok(fetched(&[1])));

        let generation = feed.begin();
        feed.complete(generation, Err(network_error()));

        let state = feed.state();
        assert!(state.data.is_empty());
        assert!(state.last_modified.is_none());
        assert!(state.error.is_some());
        assert!(!state.loading);
    }

    #[test]
    fn success_after_failure_clears_error() {
        let mut feed = Feed::new();
        let generation = feed.begin();
        feed.complete(generation, Err(network_error()));
        let generation = feed.begin();
        feed.complete(generation, Ok(fetched(&[3])));

        assert!(feed.state().error.is_none());
        assert_eq!(feed.state().data, vec![3]);
    }

    #[test]
    fn superseded_result_is_discarded() {
        let mut feed = Feed::new();
        let stale = feed.begin();
        let current = feed.begin();

        assert!(feed.complete(current, Ok(fetched(&[2]))));
        assert!(!feed.complete(stale, Ok(fetched(&[1]))));
        assert_eq!(feed.state().data, vec![2]);
    }

    #[test]
    fn begin_keeps_previous_data_while_loading() {
        let mut feed = Feed::new();
        let generation = feed.begin();
        feed.complete(generation, Ok(fetched(&[7])));

        feed.begin();
        assert!(feed.state().loading);
        assert_eq!(feed.state().data, vec![7]);
    }
}
