// Competitor list filtering, as applied by the rankings view.

use std::collections::BTreeSet;

use crate::competitor::{Competitor, Sex};

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CompetitorFilter {
    pub gender: Option<Sex>,
    pub category: Option<String>,
    /// Also list competitors with no match played.
    pub show_inactive: bool,
    /// Case-insensitive substring of "prenom nom".
    pub search: Option<String>,
}

impl CompetitorFilter {
    pub fn matches(&self, competitor: &Competitor) -> bool {
        if self.gender.is_some_and(|gender| competitor.sexe != gender) {
            return false;
        }
        if self
            .category
            .as_deref()
            .is_some_and(|category| competitor.cat != category)
        {
            return false;
        }
        if !self.show_inactive && !competitor.is_active() {
            return false;
        }
        match self.search.as_deref().map(str::trim) {
            Some(needle) if !needle.is_empty() => competitor
                .full_name()
                .to_lowercase()
                .contains(&needle.to_lowercase()),
            _ => true,
        }
    }

    /// Matching competitors, in input order.
    pub fn apply<'a>(&self, competitors: &'a [Competitor]) -> Vec<&'a Competitor> {
        competitors.iter().filter(|c| self.matches(c)).collect()
    }
}

/// Distinct non-empty categories, sorted.
pub fn categories(competitors: &[Competitor]) -> Vec<String> {
    competitors
        .iter()
        .filter(|c| !c.cat.is_empty())
        .map(|c| c.cat.clone())
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::competitor::normalize_competitors;
    use pongboard_core::rows::parse_csv;

    const EXPORT: &str = "\
licence,sexe,cat,prenom,nom,point,parties
1,M,S,Jean,DUPONT,1200,10
2,F,V1,Marie,MARTIN,900,4
3,M,V1,Paul,MARTINEZ,700,0
4,F,,Lea,BERNARD,500,2
";

    fn competitors() -> Vec<Competitor> {
        normalize_competitors(&parse_csv(EXPORT.as_bytes()).unwrap())
    }

    fn licences(selected: &[&Competitor]) -> Vec<String> {
        selected.iter().map(|c| c.licence.clone()).collect()
    }

    #[test]
    fn default_hides_inactive() {
        let all = competitors();
        let selected = CompetitorFilter::default().apply(&all);
        assert_eq!(licences(&selected), vec!["1", "2", "4"]);
    }

    #[test]
    fn show_inactive_keeps_everyone() {
        let all = competitors();
        let filter = CompetitorFilter {
            show_inactive: true,
            ..Default::default()
        };
        assert_eq!(filter.apply(&all).len(), 4);
    }

    #[test]
    fn gender_and_category_are_exact() {
        let all = competitors();
        let filter = CompetitorFilter {
            gender: Some(Sex::Female),
            category: Some("V1".into()),
            ..Default::default()
        };
        assert_eq!(licences(&filter.apply(&all)), vec!["2"]);
    }

    #[test]
    fn search_is_case_insensitive_on_full_name() {
        let all = competitors();
        let filter = CompetitorFilter {
            search: Some("martin".into()),
            show_inactive: true,
            ..Default::default()
        };
        assert_eq!(licences(&filter.apply(&all)), vec!["2", "3"]);

        let filter = CompetitorFilter {
            search: Some("jean dup".into()),
            ..Default::default()
        };
        assert_eq!(licences(&filter.apply(&all)), vec!["1"]);
    }

    #[test]
    fn blank_search_matches_all() {
        let all = competitors();
        let filter = CompetitorFilter {
            search: Some("   ".into()),
            ..Default::default()
        };
        assert_eq!(filter.apply(&all).len(), 3);
    }

    #[test]
    fn category_list() {
        assert_eq!(categories(&competitors()), vec!["S", "V1"]);
    }
}
