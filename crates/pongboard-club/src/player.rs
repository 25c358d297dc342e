// Player normalization (licenses_<club>.csv): official ratings with the
// monthly and phase progressions derived from the previous values.

use pongboard_core::CsvRow;
use serde::Serialize;

use crate::coerce::float_or_zero;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Player {
    pub licence: String,
    pub prenom: String,
    pub nom: String,
    pub categ: String,
    pub point: f64,
    pub aclglob: f64,
    /// Rating at the previous monthly update.
    pub apoint: f64,
    pub valcla: f64,
    /// Rating at the start of the phase.
    pub valinit: f64,
    /// `point - apoint`.
    pub progression_mensuelle: f64,
    /// `point - valinit`.
    pub progression_phase: f64,
}

impl Player {
    pub fn from_row(row: &CsvRow) -> Self {
        let point = float_or_zero(row, "point");
        let apoint = float_or_zero(row, "apoint");
        let valinit = float_or_zero(row, "valinit");

        Self {
            licence: row.text("licence"),
            prenom: row.text("prenom"),
            nom: row.text("nom"),
            categ: row.text("categ"),
            point: round1(point),
            aclglob: round1(float_or_zero(row, "aclglob")),
            apoint: round1(apoint),
            valcla: round1(float_or_zero(row, "valcla")),
            valinit: round1(valinit),
            progression_mensuelle: round1(point - apoint),
            progression_phase: round1(point - valinit),
        }
    }
}

/// Keep integers as-is, round everything else to one decimal. Halves round
/// up, towards positive infinity (-2.25 gives -2.2).
pub fn round1(value: f64) -> f64 {
    if value.fract() == 0.0 {
        value
    } else {
        (value * 10.0 + 0.5).floor() / 10.0
    }
}

pub fn normalize_players(rows: &[CsvRow]) -> Vec<Player> {
    rows.iter().map(Player::from_row).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pongboard_core::rows::parse_csv;

    #[test]
    fn progressions_derived_from_previous_ratings() {
        let body = "\
licence,prenom,nom,categ,point,aclglob,apoint,valcla,valinit
9412345,Jean,DUPONT,S,1234.56,1200,1220.5,1200,1180
";
        let players = normalize_players(&parse_csv(body.as_bytes()).unwrap());
        let jean = &players[0];

        assert_eq!(jean.categ, "S");
        assert!((jean.point - 1234.6).abs() < 1e-9);
        assert!((jean.apoint - 1220.5).abs() < 1e-9);
        assert!((jean.progression_mensuelle - 14.1).abs() < 1e-9);
        assert!((jean.progression_phase - 54.6).abs() < 1e-9);
    }

    #[test]
    fn non_numeric_ratings_coerce_to_zero() {
        let row = CsvRow::from_pairs([("licence", "1"), ("point", "N/A"), ("apoint", "500")]);
        let player = Player::from_row(&row);
        assert_eq!(player.point, 0.0);
        assert_eq!(player.progression_mensuelle, -500.0);
        assert_eq!(player.valinit, 0.0);
    }

    #[test]
    fn round1_behaviour() {
        assert_eq!(round1(12.0), 12.0);
        assert_eq!(round1(12.34), 12.3);
        assert_eq!(round1(-0.06), -0.1);
    }

    #[test]
    fn halves_round_up() {
        assert_eq!(round1(2.25), 2.3);
        assert_eq!(round1(-2.25), -2.2);
    }

    #[test]
    fn negative_half_progression() {
        let row = CsvRow::from_pairs([("point", "1000"), ("apoint", "1002.25")]);
        let player = Player::from_row(&row);
        assert_eq!(player.progression_mensuelle, -2.2);
    }
}
