// CSV export of the displayed lists.

use chrono::{DateTime, TimeZone};
use pongboard_core::scalar::format_number;
use thiserror::Error;

use crate::competitor::Competitor;
use crate::team::Team;

#[derive(Debug, Error)]
pub enum ExportError {
    #[error("failed to write CSV: {source}")]
    Csv {
        #[from]
        source: csv::Error,
    },

    #[error("CSV output is not valid UTF-8")]
    Encoding,
}

/// One exported column: its header label and how to render an item.
pub struct ExportColumn<T> {
    pub label: &'static str,
    pub value: fn(&T) -> String,
}

impl<T> ExportColumn<T> {
    pub fn new(label: &'static str, value: fn(&T) -> String) -> Self {
        Self { label, value }
    }
}

/// Header row of labels, then one record per item. Quoting follows RFC 4180.
/// No items means no output at all, not even the header.
pub fn to_csv<T>(items: &[T], columns: &[ExportColumn<T>]) -> Result<String, ExportError> {
    if items.is_empty() {
        return Ok(String::new());
    }

    let mut writer = csv::WriterBuilder::new()
        .terminator(csv::Terminator::Any(b'\n'))
        .from_writer(Vec::new());

    writer.write_record(columns.iter().map(|column| column.label))?;
    for item in items {
        writer.write_record(columns.iter().map(|column| (column.value)(item)))?;
    }

    let bytes = writer
        .into_inner()
        .map_err(|err| ExportError::Csv { source: err.into_error().into() })?;
    String::from_utf8(bytes).map_err(|_| ExportError::Encoding)
}

/// `{prefix}_{YYYY-MM-DD_HH-MM-SS}.csv`
pub fn filename<Tz: TimeZone>(prefix: &str, now: &DateTime<Tz>) -> String
where
    Tz::Offset: std::fmt::Display,
{
    format!("{prefix}_{}.csv", now.format("%Y-%m-%d_%H-%M-%S"))
}

pub fn competitor_columns() -> Vec<ExportColumn<Competitor>> {
    vec![
        ExportColumn::new("Licence", |c: &Competitor| c.licence.clone()),
        ExportColumn::new("Prénom", |c: &Competitor| c.prenom.clone()),
        ExportColumn::new("Nom", |c: &Competitor| c.nom.clone()),
        ExportColumn::new("Sexe", |c: &Competitor| c.sexe.code().to_string()),
        ExportColumn::new("Catégorie", |c: &Competitor| c.cat.clone()),
        ExportColumn::new("Points", |c: &Competitor| format_number(c.point)),
        ExportColumn::new("Parties", |c: &Competitor| c.parties.to_string()),
        ExportColumn::new("Progression mensuelle", |c: &Competitor| format_number(c.prg_m)),
        ExportColumn::new("Progression phase", |c: &Competitor| format_number(c.prg_p)),
        ExportColumn::new("Progression annuelle", |c: &Competitor| format_number(c.prg_a)),
    ]
}

pub fn team_columns() -> Vec<ExportColumn<Team>> {
    vec![
        ExportColumn::new("Equipe", |t: &Team| t.name.clone()),
        ExportColumn::new("Phase", |t: &Team| t.phase.clone()),
        ExportColumn::new("Division", |t: &Team| t.division.clone()),
        ExportColumn::new("Genre", |t: &Team| t.gender.code()),
        ExportColumn::new("Rang", |t: &Team| t.ranking.rang.to_string()),
        ExportColumn::new("Points", |t: &Team| t.ranking.points.to_string()),
        ExportColumn::new("Victoires", |t: &Team| t.record().victories.to_string()),
        ExportColumn::new("Nuls", |t: &Team| t.record().draws.to_string()),
        ExportColumn::new("Défaites", |t: &Team| t.record().defeats.to_string()),
        ExportColumn::new("Réussite (%)", |t: &Team| t.record().win_percentage.to_string()),
    ]
}
