// Competitor normalization (competitors_<club>.csv).
//
// One competitor per row, in file order. Licences are not deduplicated: the
// export is trusted to keep them unique.

use std::collections::BTreeMap;

use pongboard_core::{CsvRow, Scalar};
use serde::Serialize;

use crate::coerce::{count_or_zero, float_or_zero};

/// Columns mapped onto typed fields. Everything else is kept in
/// [`Competitor::extra`].
const CORE_COLUMNS: &[&str] = &[
    "licence", "sexe", "cat", "prenom", "nom", "point", "parties", "prg_m", "prg_p", "prg_a",
];

const MONTHLY_PREFIX: &str = "pts_";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum Sex {
    #[serde(rename = "M")]
    Male,
    #[serde(rename = "F")]
    Female,
    #[serde(rename = "")]
    Unknown,
}

impl Sex {
    pub fn from_code(code: &str) -> Self {
        match code.trim() {
            "M" => Sex::Male,
            "F" => Sex::Female,
            _ => Sex::Unknown,
        }
    }

    pub fn code(&self) -> &'static str {
        match self {
            Sex::Male => "M",
            Sex::Female => "F",
            Sex::Unknown => "",
        }
    }
}

/// A licensed player as listed in the club's competitor export.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Competitor {
    pub licence: String,
    pub sexe: Sex,
    pub cat: String,
    pub prenom: String,
    pub nom: String,
    /// Official rating. Never negative.
    pub point: f64,
    /// Matches played this season.
    pub parties: u32,
    /// Monthly progression.
    pub prg_m: f64,
    /// Phase progression.
    pub prg_p: f64,
    /// Annual progression.
    pub prg_a: f64,
    /// Columns outside the core set (monthly `pts_YYMM` history and any
    /// other export extras), carried through as parsed.
    pub extra: BTreeMap<String, Scalar>,
}

impl Competitor {
    pub fn from_row(row: &CsvRow) -> Self {
        let extra = row
            .iter()
            .filter(|(column, _)| !CORE_COLUMNS.contains(column))
            .map(|(column, value)| (column.to_string(), value.clone()))
            .collect();

        Self {
            licence: row.text("licence"),
            sexe: Sex::from_code(&row.text("sexe")),
            cat: row.text("cat"),
            prenom: row.text("prenom"),
            nom: row.text("nom"),
            point: float_or_zero(row, "point").max(0.0),
            parties: count_or_zero(row, "parties"),
            prg_m: float_or_zero(row, "prg_m"),
            prg_p: float_or_zero(row, "prg_p"),
            prg_a: float_or_zero(row, "prg_a"),
            extra,
        }
    }

    /// "Prénom Nom", as shown in listings and matched by name search.
    pub fn full_name(&self) -> String {
        format!("{} {}", self.prenom, self.nom)
    }

    pub fn is_active(&self) -> bool {
        self.parties > 0
    }

    /// Monthly rating history from the `pts_YYMM` columns, oldest first.
    /// Blank or non-numeric months are left out.
    pub fn monthly_points(&self) -> Vec<(&str, f64)> {
        self.extra
            .iter()
            .filter(|(column, _)| is_monthly_column(column))
            .filter_map(|(column, value)| Some((column.as_str(), value.as_float()?)))
            .collect()
    }
}

fn is_monthly_column(column: &str) -> bool {
    column
        .strip_prefix(MONTHLY_PREFIX)
        .is_some_and(|yymm| yymm.len() == 4 && yymm.bytes().all(|b| b.is_ascii_digit()))
}

/// Normalize every row of the competitor export, preserving order.
pub fn normalize_competitors(rows: &[CsvRow]) -> Vec<Competitor> {
    rows.iter().map(Competitor::from_row).collect()
}
