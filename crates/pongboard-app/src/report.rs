// Report rendering: the club dashboard and team standings as plain text or
// JSON, built from the two feed states.

use std::fmt;

use chrono::{DateTime, Utc};
use pongboard_club::stats::{CategoryCount, GenderCount};
use pongboard_club::{
    dashboard_stats, ClubData, Competitor, DashboardStats, Team, TeamRecord,
};
use pongboard_core::timestamp::relative_time;
use pongboard_core::{Feed, FeedState, LoadOptions};
use serde::Serialize;
use tracing::{info, warn};

/// The feeds behind one report: competitors and teams of a club.
pub struct Dashboard {
    club: ClubData,
    competitors: Feed<Competitor>,
    teams: Feed<Team>,
}

impl Dashboard {
    pub fn new(club: ClubData) -> Self {
        Self {
            club,
            competitors: Feed::new(),
            teams: Feed::new(),
        }
    }

    /// Load both sources concurrently and apply the results to the feeds.
    pub async fn refresh(&mut self, options: LoadOptions) {
        let competitors_generation = self.competitors.begin();
        let teams_generation = self.teams.begin();

        let (competitors, teams) = tokio::join!(
            self.club.competitors(options),
            self.club.teams(options)
        );

        if let Err(e) = &competitors {
            warn!("Competitor load failed: {e}");
        }
        if let Err(e) = &teams {
            warn!("Match load failed: {e}");
        }

        self.competitors.complete(competitors_generation, competitors);
        self.teams.complete(teams_generation, teams);

        info!(
            competitors = self.competitors.state().data.len(),
            teams = self.teams.state().data.len(),
            "Dashboard refreshed"
        );
    }

    pub fn competitors(&self) -> &FeedState<Competitor> {
        self.competitors.state()
    }

    pub fn teams(&self) -> &FeedState<Team> {
        self.teams.state()
    }

    pub fn has_errors(&self) -> bool {
        self.competitors().error.is_some() || self.teams().error.is_some()
    }
}

// ---------------------------------------------------------------------------
// Text
// ---------------------------------------------------------------------------

pub fn render_text(
    competitors: &FeedState<Competitor>,
    teams: &FeedState<Team>,
    now: &DateTime<Utc>,
) -> Result<String, fmt::Error> {
    let mut out = String::new();
    write_report(&mut out, competitors, teams, now)?;
    Ok(out)
}

pub fn write_report(
    out: &mut impl fmt::Write,
    competitors: &FeedState<Competitor>,
    teams: &FeedState<Team>,
    now: &DateTime<Utc>,
) -> fmt::Result {
    writeln!(out, "== Joueurs ==")?;
    if let Some(line) = source_line(competitors, now) {
        writeln!(out, "{line}")?;
    }
    if competitors.error.is_none() {
        write_dashboard(out, &dashboard_stats(&competitors.data))?;
    }

    writeln!(out)?;
    writeln!(out, "== Equipes ==")?;
    if let Some(line) = source_line(teams, now) {
        writeln!(out, "{line}")?;
    }
    for team in &teams.data {
        write_team(out, team, &team.record())?;
    }

    Ok(())
}

/// Error or "last updated" line for a feed, if there is anything to say.
fn source_line<T>(state: &FeedState<T>, now: &DateTime<Utc>) -> Option<String> {
    if let Some(error) = &state.error {
        return Some(format!("Erreur: {error}"));
    }
    state
        .last_modified
        .map(|date| format!("Mis à jour {}", relative_time(&date, now)))
}

fn write_dashboard(out: &mut impl fmt::Write, stats: &DashboardStats) -> fmt::Result {
    writeln!(
        out,
        "Licenciés: {}  Actifs: {}  Moyenne: {} pts  Parties: {}",
        stats.total_players, stats.active_players, stats.average_points, stats.total_matches
    )?;

    if !stats.categories.is_empty() {
        let categories: Vec<String> = stats
            .categories
            .iter()
            .map(|CategoryCount { category, count }| format!("{category} {count}"))
            .collect();
        writeln!(out, "Catégories: {}", categories.join(", "))?;
    }

    if !stats.genders.is_empty() {
        let genders: Vec<String> = stats
            .genders
            .iter()
            .map(|GenderCount { gender, count }| {
                let label = if gender.is_empty() { "?" } else { gender.as_str() };
                format!("{label} {count}")
            })
            .collect();
        writeln!(out, "Genres: {}", genders.join(", "))?;
    }

    if let Some(top) = &stats.top_progression {
        writeln!(
            out,
            "Meilleure progression: {} ({:+} pts)",
            top.full_name(),
            top.prg_a
        )?;
    }
    Ok(())
}

fn write_team(out: &mut impl fmt::Write, team: &Team, record: &TeamRecord) -> fmt::Result {
    let phase = format!("Phase {}", team.phase);
    writeln!(
        out,
        "{:<10} {:<10} {:<4} rang {:>2}  {}V {}N {}D  {}%",
        team.name,
        phase,
        team.division,
        team.ranking.rang,
        record.victories,
        record.draws,
        record.defeats,
        record.win_percentage
    )
}

// ---------------------------------------------------------------------------
// JSON
// ---------------------------------------------------------------------------

#[derive(Debug, Serialize)]
pub struct JsonReport<'a> {
    pub generated_at: DateTime<Utc>,
    pub competitors: JsonSource<DashboardStats>,
    pub teams: JsonSource<Vec<JsonTeam<'a>>>,
}

#[derive(Debug, Serialize)]
pub struct JsonSource<T> {
    pub last_modified: Option<DateTime<Utc>>,
    pub error: Option<String>,
    pub data: Option<T>,
}

#[derive(Debug, Serialize)]
pub struct JsonTeam<'a> {
    #[serde(flatten)]
    pub team: &'a Team,
    pub record: TeamRecord,
}

pub fn json_report<'a>(
    competitors: &FeedState<Competitor>,
    teams: &'a FeedState<Team>,
    now: DateTime<Utc>,
) -> JsonReport<'a> {
    JsonReport {
        generated_at: now,
        competitors: json_source(competitors, dashboard_stats),
        teams: json_source(teams, |data| {
            data.iter()
                .map(|team| JsonTeam {
                    team,
                    record: team.record(),
                })
                .collect()
        }),
    }
}

fn json_source<'a, T, U>(
    state: &'a FeedState<T>,
    build: impl FnOnce(&'a [T]) -> U,
) -> JsonSource<U> {
    match &state.error {
        Some(error) => JsonSource {
            last_modified: None,
            error: Some(error.to_string()),
            data: None,
        },
        None => JsonSource {
            last_modified: state.last_modified,
            error: None,
            data: Some(build(&state.data)),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};
    use pongboard_club::{aggregate_teams, normalize_competitors};
    use pongboard_core::rows::parse_csv;
    use pongboard_core::{FetchError, Fetched, TransportError};

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 1, 27, 15, 0, 0).unwrap()
    }

    fn competitors_state() -> FeedState<Competitor> {
        let body = "licence,sexe,cat,prenom,nom,point,parties,prg_a\n\
                    1,M,S,Jean,DUPONT,1200,10,15\n\
                    2,F,V1,Marie,MARTIN,900,4,-3\n";
        let mut feed = Feed::new();
        let generation = feed.begin();
        feed.complete(
            generation,
            Ok(Fetched {
                data: normalize_competitors(&parse_csv(body.as_bytes()).unwrap()),
                last_modified: Some(now() - Duration::minutes(5)),
            }),
        );
        feed.state().clone()
    }

    fn teams_state() -> FeedState<Team> {
        let body = "team_id,team_name,division,tour,score_domicile,score_exterieur,is_home,rang\n\
                    1G,Club A 1 - Phase 1,R1,1,30,12,True,2\n";
        let mut feed = Feed::new();
        let generation = feed.begin();
        feed.complete(
            generation,
            Ok(Fetched {
                data: aggregate_teams(&parse_csv(body.as_bytes()).unwrap()),
                last_modified: None,
            }),
        );
        feed.state().clone()
    }

    fn failed_state<T: Clone>() -> FeedState<T> {
        let mut feed = Feed::new();
        let generation = feed.begin();
        feed.complete(
            generation,
            Err(FetchError::Transport(TransportError::Status {
                url: "http://club.test/competitors.csv".into(),
                status: 404,
                reason: "Not Found".into(),
            })),
        );
        feed.state().clone()
    }

    // -- Text --

    #[test]
    fn text_report_lists_dashboard_and_teams() {
        let text = render_text(&competitors_state(), &teams_state(), &now()).unwrap();

        assert!(text.contains("Mis à jour il y a 5 min"));
        assert!(text.contains("Licenciés: 2  Actifs: 2  Moyenne: 1050 pts  Parties: 14"));
        assert!(text.contains("Catégories: S 1, V1 1"));
        assert!(text.contains("Meilleure progression: Jean DUPONT (+15 pts)"));
        assert!(text.contains("Equipe 1"));
        assert!(text.contains("1V 0N 0D  100%"));
    }

    #[test]
    fn text_report_shows_errors() {
        let text = render_text(&failed_state(), &teams_state(), &now()).unwrap();
        assert!(text.contains("Erreur: "));
        assert!(text.contains("404"));
        assert!(!text.contains("Licenciés"));
    }

    /// Accepts a fixed number of bytes, then refuses every write.
    struct Capped {
        written: String,
        limit: usize,
    }

    impl fmt::Write for Capped {
        fn write_str(&mut self, s: &str) -> fmt::Result {
            if self.written.len() + s.len() > self.limit {
                return Err(fmt::Error);
            }
            self.written.push_str(s);
            Ok(())
        }
    }

    #[test]
    fn write_failure_stops_the_report() {
        let mut out = Capped {
            written: String::new(),
            limit: 20,
        };
        let result = write_report(&mut out, &competitors_state(), &teams_state(), &now());

        assert_eq!(result, Err(fmt::Error));
        assert!(out.written.starts_with("== Joueurs =="));
        assert!(!out.written.contains("Equipes"));
    }

    // -- JSON --

    #[test]
    fn json_report_shape() {
        let competitors = competitors_state();
        let teams = teams_state();
        let report = json_report(&competitors, &teams, now());
        let json = serde_json::to_value(&report).unwrap();

        assert_eq!(json["competitors"]["data"]["active_players"], 2);
        assert!(json["competitors"]["error"].is_null());
        assert_eq!(json["teams"]["data"][0]["id"], "1G-Phase1");
        assert_eq!(json["teams"]["data"][0]["record"]["victories"], 1);
        assert!(json["teams"]["last_modified"].is_null());
    }

    #[test]
    fn json_report_carries_error() {
        let competitors = failed_state();
        let teams = teams_state();
        let json = serde_json::to_value(json_report(&competitors, &teams, now())).unwrap();
        assert!(json["competitors"]["data"].is_null());
        assert!(json["competitors"]["error"].as_str().unwrap().contains("404"));
    }
}
