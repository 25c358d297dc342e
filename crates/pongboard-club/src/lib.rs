// Table-tennis club domain: normalizes the federation CSV exports into
// competitors, players and teams, and derives the dashboard statistics.

pub mod club;
mod coerce;
pub mod competitor;
pub mod export;
pub mod filter;
pub mod player;
pub mod stats;
pub mod team;

pub use club::{ClubData, ClubFile};
pub use competitor::{normalize_competitors, Competitor, Sex};
pub use filter::CompetitorFilter;
pub use player::{normalize_players, Player};
pub use stats::{dashboard_stats, team_record, DashboardStats, MatchResult, TeamRecord};
pub use team::{aggregate_teams, Match, MatchOutcome, Team, TeamGender, TeamRanking, Tour};
