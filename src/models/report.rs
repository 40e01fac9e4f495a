//! Reporting models

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Closed set of report types exposed to the presentation layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReportType {
    All,
    ComputersHealth,
    ApproachingEol,
    PastEol,
    Inspections,
    Uninspected,
    ArchivedAuctioned,
    Donated,
    Purchased,
    Movement,
}

impl ReportType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ReportType::All => "all",
            ReportType::ComputersHealth => "computers_health",
            ReportType::ApproachingEol => "approaching_eol",
            ReportType::PastEol => "past_eol",
            ReportType::Inspections => "inspections",
            ReportType::Uninspected => "uninspected",
            ReportType::ArchivedAuctioned => "archived_auctioned",
            ReportType::Donated => "donated",
            ReportType::Purchased => "purchased",
            ReportType::Movement => "movement",
        }
    }

    pub fn parse(value: &str) -> Option<ReportType> {
        match value {
            "all" => Some(ReportType::All),
            "computers_health" => Some(ReportType::ComputersHealth),
            "approaching_eol" => Some(ReportType::ApproachingEol),
            "past_eol" => Some(ReportType::PastEol),
            "inspections" => Some(ReportType::Inspections),
            "uninspected" => Some(ReportType::Uninspected),
            "archived_auctioned" => Some(ReportType::ArchivedAuctioned),
            "donated" => Some(ReportType::Donated),
            "purchased" => Some(ReportType::Purchased),
            "movement" => Some(ReportType::Movement),
            _ => None,
        }
    }
}

/// Optional filters applied after the report-type base predicate.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ReportFilters {
    pub assigned_to: Option<String>,
    pub supplier: Option<String>,
    pub status: Option<String>,
    pub province: Option<String>,
    pub district: Option<String>,
    #[serde(default)]
    pub uninspected: bool,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
}

/// Optional filters for the movement report.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct MovementFilters {
    pub asset_id: Option<Uuid>,
    pub serial: Option<String>,
    pub movement_field: Option<String>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
}

/// One rendered movement report row.
#[derive(Debug, Clone, Serialize)]
pub struct MovementEntry {
    pub occurred_at: DateTime<Utc>,
    pub asset_id: Uuid,
    pub name: String,
    pub serial: String,
    pub province: Option<String>,
    pub district: Option<String>,
    pub action: String,
    pub field: String,
    pub old_value: Option<String>,
    pub new_value: Option<String>,
    pub user: String,
    pub description: String,
}

/// Export formats supported for every report type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExportFormat {
    Csv,
    Excel,
    Word,
    Pdf,
}

impl ExportFormat {
    pub fn parse(value: &str) -> Option<ExportFormat> {
        match value {
            "csv" => Some(ExportFormat::Csv),
            "excel" => Some(ExportFormat::Excel),
            "word" => Some(ExportFormat::Word),
            "pdf" => Some(ExportFormat::Pdf),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_report_type_round_trip() {
        for rt in [
            ReportType::All,
            ReportType::ComputersHealth,
            ReportType::ApproachingEol,
            ReportType::PastEol,
            ReportType::Inspections,
            ReportType::Uninspected,
            ReportType::ArchivedAuctioned,
            ReportType::Donated,
            ReportType::Purchased,
            ReportType::Movement,
        ] {
            assert_eq!(ReportType::parse(rt.as_str()), Some(rt));
        }
        assert_eq!(ReportType::parse("everything"), None);
    }
}
