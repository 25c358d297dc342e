// Team aggregation (rencontres_<club>.csv).
//
// Every row of the matches export is one fixture of one club team. Rows are
// grouped per (team_id, phase), each group becoming a Team whose matches are
// indexed by tour. The ranking columns are repeated on every row; the first
// row of a group is the one kept.

use std::cmp::Ordering;
use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::sync::LazyLock;

use chrono::NaiveDate;
use pongboard_core::scalar::leading_int;
use pongboard_core::CsvRow;
use regex::Regex;
use serde::{Serialize, Serializer};
use tracing::warn;

use crate::coerce::{count_or_zero, int_or_zero};
use crate::stats::{team_record, MatchResult, TeamRecord};

const DEFAULT_PHASE: &str = "1";

static PHASE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"Phase ([0-9]+)").expect("phase pattern is valid"));
static FIRST_NUMBER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[0-9]+").expect("number pattern is valid"));
static LEADING_NUMBER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[0-9]+").expect("leading number pattern is valid"));

// ---------------------------------------------------------------------------
// Tour
// ---------------------------------------------------------------------------

/// Round label as found in the export. Ordered numerically when it starts
/// with a number ("2" < "10"), textually otherwise.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct Tour(String);

impl Tour {
    pub fn new(label: impl Into<String>) -> Self {
        Self(label.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn number(&self) -> Option<i64> {
        leading_int(&self.0)
    }
}

impl Ord for Tour {
    fn cmp(&self, other: &Self) -> Ordering {
        match (self.number(), other.number()) {
            (Some(a), Some(b)) => a.cmp(&b).then_with(|| self.0.cmp(&other.0)),
            (Some(_), None) => Ordering::Less,
            (None, Some(_)) => Ordering::Greater,
            (None, None) => self.0.cmp(&other.0),
        }
    }
}

impl PartialOrd for Tour {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl fmt::Display for Tour {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

// ---------------------------------------------------------------------------
// Match
// ---------------------------------------------------------------------------

/// Score state of a fixture, seen from the club team's side.
///
/// A fixture is played when both score cells are non-blank. A forfeit is a
/// played match (usually with a zero score), never `Unplayed`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum MatchOutcome {
    Unplayed,
    Played { ours: i64, theirs: i64 },
}

impl MatchOutcome {
    pub fn result(&self) -> Option<MatchResult> {
        match *self {
            MatchOutcome::Unplayed => None,
            MatchOutcome::Played { ours, theirs } => Some(match ours.cmp(&theirs) {
                Ordering::Greater => MatchResult::Victory,
                Ordering::Less => MatchResult::Defeat,
                Ordering::Equal => MatchResult::Draw,
            }),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Match {
    pub team_id: String,
    pub team_name: String,
    pub division: String,
    pub tour: Tour,
    pub date: String,
    pub equipe_domicile: String,
    pub equipe_exterieur: String,
    /// Raw score cells, kept for display. Use [`Match::outcome`] for logic.
    pub score_domicile: String,
    pub score_exterieur: String,
    pub is_home: bool,
    pub outcome: MatchOutcome,
}

impl Match {
    pub fn from_row(row: &CsvRow) -> Self {
        let score_domicile = row.text("score_domicile");
        let score_exterieur = row.text("score_exterieur");
        let is_home = match row.get("is_home") {
            None => true,
            Some(value) if value.is_blank() => true,
            Some(value) => value.to_text() == "True",
        };
        let outcome = outcome(&score_domicile, &score_exterieur, is_home);

        Self {
            team_id: row.text("team_id"),
            team_name: row.text("team_name"),
            division: row.text("division"),
            tour: Tour::new(row.text("tour")),
            date: row.text("date"),
            equipe_domicile: row.text("equipe_domicile"),
            equipe_exterieur: row.text("equipe_exterieur"),
            score_domicile,
            score_exterieur,
            is_home,
            outcome,
        }
    }

    pub fn is_played(&self) -> bool {
        matches!(self.outcome, MatchOutcome::Played { .. })
    }

    pub fn result(&self) -> Option<MatchResult> {
        self.outcome.result()
    }

    pub fn opponent(&self) -> &str {
        if self.is_home {
            &self.equipe_exterieur
        } else {
            &self.equipe_domicile
        }
    }

    /// Fixture date, accepting `DD/MM/YYYY` and ISO `YYYY-MM-DD`.
    pub fn parsed_date(&self) -> Option<NaiveDate> {
        let date = self.date.trim();
        NaiveDate::parse_from_str(date, "%d/%m/%Y")
            .or_else(|_| NaiveDate::parse_from_str(date, "%Y-%m-%d"))
            .ok()
    }
}

fn outcome(score_domicile: &str, score_exterieur: &str, is_home: bool) -> MatchOutcome {
    let (home, away) = (score_domicile.trim(), score_exterieur.trim());
    if home.is_empty() || away.is_empty() {
        return MatchOutcome::Unplayed;
    }
    // Forfeit markers ("F", "FF") score zero.
    let home = leading_int(home).unwrap_or(0);
    let away = leading_int(away).unwrap_or(0);
    if is_home {
        MatchOutcome::Played { ours: home, theirs: away }
    } else {
        MatchOutcome::Played { ours: away, theirs: home }
    }
}

// ---------------------------------------------------------------------------
// Team identity
// ---------------------------------------------------------------------------

/// Last character of the team id: `G` for the men's teams, `F` for the
/// women's. Anything else is kept as-is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TeamGender {
    Men,
    Women,
    Other(Option<char>),
}

impl TeamGender {
    pub fn from_team_id(team_id: &str) -> Self {
        match team_id.chars().last() {
            Some('G') => TeamGender::Men,
            Some('F') => TeamGender::Women,
            other => TeamGender::Other(other),
        }
    }

    pub fn code(&self) -> String {
        match self {
            TeamGender::Men => "G".to_string(),
            TeamGender::Women => "F".to_string(),
            TeamGender::Other(c) => c.map(String::from).unwrap_or_default(),
        }
    }

    fn sort_rank(&self) -> u8 {
        match self {
            TeamGender::Men => 0,
            TeamGender::Women => 1,
            TeamGender::Other(_) => 2,
        }
    }
}

impl Serialize for TeamGender {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.code())
    }
}

/// Standing published by the federation, copied from the export.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct TeamRanking {
    pub rang: u32,
    pub points: i64,
    pub joues: u32,
    pub victoires: u32,
    pub nuls: u32,
    pub defaites: u32,
    pub forfaits: u32,
}

impl TeamRanking {
    pub fn from_row(row: &CsvRow) -> Self {
        Self {
            rang: count_or_zero(row, "rang"),
            points: int_or_zero(row, "points"),
            joues: count_or_zero(row, "joues"),
            victoires: count_or_zero(row, "victoires"),
            nuls: count_or_zero(row, "nuls"),
            defaites: count_or_zero(row, "defaites"),
            forfaits: count_or_zero(row, "forfaits"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Team {
    /// `{team_id}-Phase{phase}`, e.g. `1G-Phase1`.
    pub id: String,
    pub name: String,
    pub division: String,
    pub gender: TeamGender,
    pub phase: String,
    pub ranking: TeamRanking,
    pub matches: BTreeMap<Tour, Match>,
}

impl Team {
    pub fn record(&self) -> TeamRecord {
        team_record(self.matches.values())
    }

    pub fn phase_number(&self) -> u64 {
        self.phase.parse().unwrap_or(0)
    }

    fn sort_key(&self) -> (u64, u8, u64) {
        (leading_number(&self.id), self.gender.sort_rank(), self.phase_number())
    }
}

/// Digits following the first `"Phase "` in the team name, `"1"` when absent.
pub fn extract_phase(team_name: &str) -> String {
    PHASE
        .captures(team_name)
        .and_then(|caps| caps.get(1))
        .map_or(DEFAULT_PHASE, |digits| digits.as_str())
        .to_string()
}

/// `"Equipe N"` with N the first number of the team name, or `"Equipe"`.
pub fn display_name(team_name: &str) -> String {
    match FIRST_NUMBER.find(team_name) {
        Some(n) => format!("Equipe {}", n.as_str()),
        None => "Equipe".to_string(),
    }
}

pub fn composite_key(team_id: &str, phase: &str) -> String {
    format!("{team_id}-Phase{phase}")
}

/// Number the team id starts with; 0 when it has none.
fn leading_number(id: &str) -> u64 {
    LEADING_NUMBER
        .find(id)
        .map_or(0, |digits| digits.as_str().parse().unwrap_or(u64::MAX))
}

// ---------------------------------------------------------------------------
// Aggregation
// ---------------------------------------------------------------------------

/// Group match rows into teams, ordered by team number, then gender (men
/// first), then phase.
///
/// Never fails: malformed identities fall back to phase "1" and whatever
/// trailing character the id has. When two rows share a team and a tour the
/// later one is kept.
pub fn aggregate_teams(rows: &[CsvRow]) -> Vec<Team> {
    let mut teams: Vec<Team> = Vec::new();
    let mut index: HashMap<String, usize> = HashMap::new();

    for row in rows {
        let m = Match::from_row(row);
        let phase = extract_phase(&m.team_name);
        let key = composite_key(&m.team_id, &phase);

        let slot = *index.entry(key.clone()).or_insert_with(|| {
            teams.push(Team {
                id: key.clone(),
                name: display_name(&m.team_name),
                division: m.division.clone(),
                gender: TeamGender::from_team_id(&m.team_id),
                phase,
                ranking: TeamRanking::from_row(row),
                matches: BTreeMap::new(),
            });
            teams.len() - 1
        });

        let tour = m.tour.clone();
        if teams[slot].matches.insert(tour.clone(), m).is_some() {
            warn!(team = %key, tour = %tour, "Duplicate fixture row, keeping the later one");
        }
    }

    teams.sort_by_key(Team::sort_key);
    teams
}
