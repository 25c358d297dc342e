// Cached CSV data source: fetch, parse, and remember rows per URL.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use tracing::{debug, info, warn};

use crate::cache::TtlCache;
use crate::clock::SystemClock;
use crate::config::Config;
use crate::error::{FetchError, TransportError};
use crate::rows::{parse_csv, CsvRow};
use crate::transport::{HttpTransport, ReqwestTransport};

/// Parsed rows of one CSV file plus the server's modification time.
#[derive(Debug, Clone)]
pub struct CsvSnapshot {
    pub rows: Arc<[CsvRow]>,
    /// From the `Last-Modified` header; `None` when the server omitted it.
    /// Never synthesized from the local clock.
    pub last_modified: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LoadOptions {
    /// Skip the cache lookup. The fresh result is still stored afterwards.
    pub no_cache: bool,
}

impl LoadOptions {
    pub fn bypass_cache() -> Self {
        Self { no_cache: true }
    }
}

/// GET `url` and parse the body. Non-2xx responses are transport errors.
pub async fn fetch_csv(
    transport: &dyn HttpTransport,
    url: &str,
) -> Result<(Vec<CsvRow>, Option<DateTime<Utc>>), FetchError> {
    let response = transport.get(url).await?;
    if !response.is_success() {
        return Err(TransportError::Status {
            url: url.to_string(),
            status: response.status,
            reason: response.reason,
        }
        .into());
    }

    let last_modified = response
        .last_modified
        .as_deref()
        .and_then(|raw| parse_http_date(url, raw));

    debug!(url, bytes = response.body.len(), "parsing CSV body");
    let rows = parse_csv(&response.body)?;
    Ok((rows, last_modified))
}

/// Parse an HTTP-date header value. Unparseable values are logged and
/// treated as absent.
pub fn parse_http_date(url: &str, raw: &str) -> Option<DateTime<Utc>> {
    match DateTime::parse_from_rfc2822(raw.trim()) {
        Ok(date) => Some(date.with_timezone(&Utc)),
        Err(e) => {
            warn!(url, value = raw, "ignoring unparseable Last-Modified header: {e}");
            None
        }
    }
}

/// Fetch layer fronted by a [`TtlCache`].
#[derive(Clone)]
pub struct CsvSource {
    transport: Arc<dyn HttpTransport>,
    cache: Arc<TtlCache>,
}

impl CsvSource {
    pub fn new(transport: Arc<dyn HttpTransport>, cache: Arc<TtlCache>) -> Self {
        Self { transport, cache }
    }

    /// Build the production source: reqwest transport and a wall-clock cache
    /// with the configured TTL.
    pub fn from_config(config: &Config) -> Result<Self, TransportError> {
        let transport = ReqwestTransport::from_config(&config.http)?;
        let cache = TtlCache::new(config.cache.ttl(), Arc::new(SystemClock));
        Ok(Self::new(Arc::new(transport), Arc::new(cache)))
    }

    pub fn transport(&self) -> &Arc<dyn HttpTransport> {
        &self.transport
    }

    pub fn cache(&self) -> &Arc<TtlCache> {
        &self.cache
    }

    /// Rows for `url`, from the cache when fresh, otherwise from the network.
    ///
    /// A successful fetch always refreshes the cache. A failed fetch leaves the
    /// cache untouched and does not fall back to stale rows.
    pub async fn load(&self, url: &str, options: LoadOptions) -> Result<CsvSnapshot, FetchError> {
        if !options.no_cache {
            if let Some(snapshot) = self.cache.get(url) {
                return Ok(snapshot);
            }
        }

        info!(url, no_cache = options.no_cache, "fetching CSV");
        let (rows, last_modified) = fetch_csv(self.transport.as_ref(), url).await?;
        debug!(url, rows = rows.len(), "parsed CSV rows");

        Ok(self.cache.put(url, rows.into(), last_modified))
    }
}
