// Derived statistics: per-team records computed from fixtures, and the
// club-wide dashboard aggregates computed from the competitor list.

use serde::Serialize;

use crate::competitor::Competitor;
use crate::team::Match;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchResult {
    Victory,
    Defeat,
    Draw,
}

/// Win/loss/draw counts over the played fixtures of one team.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct TeamRecord {
    pub played: u32,
    pub victories: u32,
    pub defeats: u32,
    pub draws: u32,
    /// Rounded to the nearest integer; 0 when nothing has been played.
    pub win_percentage: u32,
}

/// Unplayed fixtures are ignored entirely.
pub fn team_record<'a>(matches: impl IntoIterator<Item = &'a Match>) -> TeamRecord {
    let mut record = TeamRecord::default();
    for result in matches.into_iter().filter_map(Match::result) {
        record.played += 1;
        match result {
            MatchResult::Victory => record.victories += 1,
            MatchResult::Defeat => record.defeats += 1,
            MatchResult::Draw => record.draws += 1,
        }
    }
    record.win_percentage = percentage(record.victories, record.played);
    record
}

fn percentage(part: u32, total: u32) -> u32 {
    if total == 0 {
        return 0;
    }
    (100.0 * f64::from(part) / f64::from(total)).round() as u32
}

// ---------------------------------------------------------------------------
// Dashboard
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CategoryCount {
    pub category: String,
    pub count: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GenderCount {
    pub gender: String,
    pub count: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DashboardStats {
    pub total_players: usize,
    /// Competitors with at least one match played.
    pub active_players: usize,
    /// Mean rating of the active competitors, rounded.
    pub average_points: f64,
    pub total_matches: u64,
    /// Non-empty categories, most populated first.
    pub categories: Vec<CategoryCount>,
    /// In order of first appearance.
    pub genders: Vec<GenderCount>,
    pub top_progression: Option<Competitor>,
}

pub fn dashboard_stats(competitors: &[Competitor]) -> DashboardStats {
    let active: Vec<&Competitor> = competitors.iter().filter(|c| c.is_active()).collect();

    let average_points = if active.is_empty() {
        0.0
    } else {
        let sum: f64 = active.iter().map(|c| c.point).sum();
        (sum / active.len() as f64).round()
    };

    let total_matches = competitors.iter().map(|c| u64::from(c.parties)).sum();

    let mut categories: Vec<CategoryCount> = Vec::new();
    for competitor in competitors.iter().filter(|c| !c.cat.is_empty()) {
        match categories.iter_mut().find(|entry| entry.category == competitor.cat) {
            Some(entry) => entry.count += 1,
            None => categories.push(CategoryCount {
                category: competitor.cat.clone(),
                count: 1,
            }),
        }
    }
    // Stable: equal counts keep first-seen order.
    categories.sort_by(|a, b| b.count.cmp(&a.count));

    let mut genders: Vec<GenderCount> = Vec::new();
    for competitor in competitors {
        let code = competitor.sexe.code();
        match genders.iter_mut().find(|entry| entry.gender == code) {
            Some(entry) => entry.count += 1,
            None => genders.push(GenderCount {
                gender: code.to_string(),
                count: 1,
            }),
        }
    }

    let top_progression = competitors
        .iter()
        .reduce(|best, c| if c.prg_a > best.prg_a { c } else { best })
        .cloned();

    DashboardStats {
        total_players: competitors.len(),
        active_players: active.len(),
        average_points,
        total_matches,
        categories,
        genders,
        top_progression,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::competitor::normalize_competitors;
    use crate::team::aggregate_teams;
    use pongboard_core::rows::parse_csv;
    use pongboard_core::CsvRow;

    fn competitors(body: &str) -> Vec<Competitor> {
        normalize_competitors(&parse_csv(body.as_bytes()).unwrap())
    }

    fn fixture(home: &str, away: &str, is_home: &str) -> Match {
        Match::from_row(&CsvRow::from_pairs([
            ("score_domicile", home),
            ("score_exterieur", away),
            ("is_home", is_home),
        ]))
    }

    // -- Team record --

    #[test]
    fn counts_sum_to_played() {
        let fixtures = [
            fixture("18", "24", "False"),
            fixture("30", "12", "True"),
            fixture("21", "21", "True"),
            fixture("10", "32", "True"),
            fixture("", "", "True"),
        ];
        let record = team_record(&fixtures);
        assert_eq!(record.played, 4);
        assert_eq!(record.victories, 2);
        assert_eq!(record.defeats, 1);
        assert_eq!(record.draws, 1);
        assert_eq!(record.victories + record.defeats + record.draws, record.played);
        assert_eq!(record.win_percentage, 50);
    }

    #[test]
    fn win_percentage_rounds() {
        let fixtures = [
            fixture("30", "12", "True"),
            fixture("10", "32", "True"),
            fixture("10", "32", "True"),
        ];
        // 1/3 => 33
        assert_eq!(team_record(&fixtures).win_percentage, 33);

        let fixtures = [
            fixture("30", "12", "True"),
            fixture("30", "12", "True"),
            fixture("10", "32", "True"),
        ];
        // 2/3 => 67
        assert_eq!(team_record(&fixtures).win_percentage, 67);
    }

    #[test]
    fn nothing_played_is_zero_percent() {
        let record = team_record(&[fixture("", "", "True")]);
        assert_eq!(record, TeamRecord::default());
    }

    #[test]
    fn record_ignores_sourced_ranking() {
        let body = "\
team_id,team_name,tour,score_domicile,score_exterieur,is_home,rang,victoires
1G,Club A 1,1,30,12,True,8,0
";
        let teams = aggregate_teams(&parse_csv(body.as_bytes()).unwrap());
        assert_eq!(teams[0].ranking.victoires, 0);
        assert_eq!(teams[0].record().victories, 1);
    }

    // -- Dashboard --

    #[test]
    fn active_and_average_scenario() {
        let all = competitors("parties,point\n0,1000\n5,800\n");
        let stats = dashboard_stats(&all);
        assert_eq!(stats.total_players, 2);
        assert_eq!(stats.active_players, 1);
        assert_eq!(stats.average_points, 800.0);
        assert_eq!(stats.total_matches, 5);
    }

    #[test]
    fn empty_collection() {
        let stats = dashboard_stats(&[]);
        assert_eq!(stats.total_players, 0);
        assert_eq!(stats.active_players, 0);
        assert_eq!(stats.average_points, 0.0);
        assert!(stats.categories.is_empty());
        assert!(stats.top_progression.is_none());
    }

    #[test]
    fn average_is_rounded() {
        let all = competitors("parties,point\n1,500\n1,501\n1,501\n");
        assert_eq!(dashboard_stats(&all).average_points, 501.0);
    }

    #[test]
    fn category_breakdown_sorted_by_count() {
        let all = competitors("cat,sexe\nS,M\nV1,F\nV1,M\n,M\nJ,F\nS,M\nV1,M\n");
        let stats = dashboard_stats(&all);
        let categories: Vec<_> = stats
            .categories
            .iter()
            .map(|c| (c.category.as_str(), c.count))
            .collect();
        assert_eq!(categories, vec![("V1", 3), ("S", 2), ("J", 1)]);

        let genders: Vec<_> = stats
            .genders
            .iter()
            .map(|g| (g.gender.as_str(), g.count))
            .collect();
        assert_eq!(genders, vec![("M", 5), ("F", 2)]);
    }

    #[test]
    fn top_progression_first_on_ties() {
        let all = competitors("nom,prg_a\nA,10\nB,25\nC,25\nD,-3\n");
        let top = dashboard_stats(&all).top_progression.unwrap();
        assert_eq!(top.nom, "B");
    }
}
