// Club data facade: the three exports of one club, loaded through the cached
// CSV source and normalized into domain entities.

use chrono::{DateTime, Utc};
use pongboard_core::config::SourceConfig;
use pongboard_core::timestamp::remote_last_modified;
use pongboard_core::{CsvSnapshot, CsvSource, FetchError, Fetched, LoadOptions};
use tracing::debug;

use crate::competitor::{normalize_competitors, Competitor};
use crate::player::{normalize_players, Player};
use crate::team::{aggregate_teams, Team};

/// The CSV files published for a club.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ClubFile {
    Competitors,
    Matches,
    Licenses,
}

impl ClubFile {
    pub fn url(&self, config: &SourceConfig) -> String {
        match self {
            ClubFile::Competitors => config.competitors_url(),
            ClubFile::Matches => config.matches_url(),
            ClubFile::Licenses => config.licenses_url(),
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            ClubFile::Competitors => "competitors",
            ClubFile::Matches => "matches",
            ClubFile::Licenses => "licenses",
        }
    }
}

#[derive(Clone)]
pub struct ClubData {
    source: CsvSource,
    config: SourceConfig,
}

impl ClubData {
    pub fn new(source: CsvSource, config: SourceConfig) -> Self {
        Self { source, config }
    }

    pub fn source(&self) -> &CsvSource {
        &self.source
    }

    pub fn config(&self) -> &SourceConfig {
        &self.config
    }

    pub async fn competitors(
        &self,
        options: LoadOptions,
    ) -> Result<Fetched<Vec<Competitor>>, FetchError> {
        let snapshot = self.load(ClubFile::Competitors, options).await?;
        Ok(Fetched {
            data: normalize_competitors(&snapshot.rows),
            last_modified: snapshot.last_modified,
        })
    }

    pub async fn teams(&self, options: LoadOptions) -> Result<Fetched<Vec<Team>>, FetchError> {
        let snapshot = self.load(ClubFile::Matches, options).await?;
        let teams = aggregate_teams(&snapshot.rows);
        debug!(rows = snapshot.rows.len(), teams = teams.len(), "aggregated teams");
        Ok(Fetched {
            data: teams,
            last_modified: snapshot.last_modified,
        })
    }

    pub async fn players(&self, options: LoadOptions) -> Result<Fetched<Vec<Player>>, FetchError> {
        let snapshot = self.load(ClubFile::Licenses, options).await?;
        Ok(Fetched {
            data: normalize_players(&snapshot.rows),
            last_modified: snapshot.last_modified,
        })
    }

    /// Modification time of one of the club files, without going through
    /// the cache.
    pub async fn modified_at(&self, file: ClubFile) -> Option<DateTime<Utc>> {
        let url = file.url(&self.config);
        remote_last_modified(self.source.transport().as_ref(), &url).await
    }

    async fn load(&self, file: ClubFile, options: LoadOptions) -> Result<CsvSnapshot, FetchError> {
        let url = file.url(&self.config);
        debug!(file = file.label(), url, "loading club file");
        self.source.load(&url, options).await
    }
}
