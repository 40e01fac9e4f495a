//! Reporting
//!
//! Report rows come from one scoped selection per report type; filters
//! that depend on derived lifecycle state (end-of-life) are applied after
//! the fetch because they are computed, not stored. The movement report
//! reads the activity ledger instead of the assets table.

use crate::{
    error::AppError,
    models::{
        asset::{AssetResponse, AssetStatus, COMPUTER_TYPES},
        audit::AuditAction,
        report::{MovementEntry, MovementFilters, ReportFilters, ReportType},
    },
    repository::{
        activity_repo::{MovementRow, MOVEMENT_ROW_LIMIT},
        ActivityRepository, AssetRepository,
        asset_repo::AssetSelection,
    },
    services::{access_scope::ActorContext, audit_service::AuditService},
};
use crate::locations::HEAD_OFFICE;
use chrono::Utc;
use sqlx::PgPool;
use std::collections::BTreeMap;
use std::sync::Arc;
use uuid::Uuid;

pub struct ReportService {
    assets: AssetRepository,
    activities: ActivityRepository,
    audit: Arc<AuditService>,
}

/// A non-movement report: the rows plus a per-status tally.
#[derive(Debug)]
pub struct AssetReport {
    pub assets: Vec<AssetResponse>,
    pub status_counts: BTreeMap<String, i64>,
}

impl ReportService {
    pub fn new(db: PgPool, audit: Arc<AuditService>) -> Self {
        Self {
            assets: AssetRepository::new(db.clone()),
            activities: ActivityRepository::new(db),
            audit,
        }
    }

    /// Translate a report type and its filters into a row selection.
    fn build_selection(report_type: ReportType, filters: &ReportFilters) -> AssetSelection {
        let mut selection = AssetSelection::default();

        match report_type {
            // The general listing hides locked assets; they have their own
            // report.
            ReportType::All => {
                selection.exclude_statuses = Some(locked_statuses());
            }
            ReportType::ComputersHealth => {
                selection.asset_types =
                    Some(COMPUTER_TYPES.iter().map(|t| t.to_string()).collect());
            }
            // Derived from purchase date at read time; post-filtered below.
            ReportType::ApproachingEol | ReportType::PastEol => {}
            ReportType::Inspections => selection.inspected = Some(true),
            ReportType::Uninspected => selection.inspected = Some(false),
            ReportType::ArchivedAuctioned => {
                selection.statuses = Some(locked_statuses());
            }
            ReportType::Donated => selection.acquisition_type = Some("Donated".to_string()),
            ReportType::Purchased => selection.acquisition_type = Some("Purchased".to_string()),
            ReportType::Movement => {}
        }

        let clean = |v: &Option<String>| {
            v.as_deref().map(str::trim).filter(|s| !s.is_empty()).map(str::to_string)
        };
        selection.assigned_to = clean(&filters.assigned_to);
        selection.supplier = clean(&filters.supplier);
        selection.status = clean(&filters.status)
            .and_then(|s| AssetStatus::parse(&s))
            .map(|s| s.as_str().to_string());
        selection.province = clean(&filters.province);
        // The district filter only applies alongside a real province, or on
        // its own; Head Office has no districts.
        let district = clean(&filters.district);
        selection.district = match (&selection.province, district) {
            (Some(p), Some(d)) if p != HEAD_OFFICE => Some(d),
            (Some(_), _) => None,
            (None, d) => d,
        };
        if filters.uninspected {
            selection.inspected = Some(false);
        }
        selection.purchased_from = filters.start_date;
        selection.purchased_to = filters.end_date;

        selection
    }

    pub async fn asset_report(
        &self,
        actor: &ActorContext,
        report_type: ReportType,
        filters: &ReportFilters,
    ) -> Result<AssetReport, AppError> {
        let selection = Self::build_selection(report_type, filters);
        let mut rows = self.assets.select(&actor.scope(), &selection).await?;

        let today = Utc::now().date_naive();
        match report_type {
            ReportType::ApproachingEol => {
                rows.retain(|a| a.is_eol_approaching(today) == Some(true));
            }
            ReportType::PastEol => {
                rows.retain(|a| a.is_eol_passed(today) == Some(true));
            }
            _ => {}
        }

        let mut status_counts: BTreeMap<String, i64> = AssetStatus::ALL
            .iter()
            .map(|s| (s.as_str().to_string(), 0))
            .collect();
        for asset in &rows {
            if let Some(count) = status_counts.get_mut(asset.status.trim()) {
                *count += 1;
            }
        }

        self.audit
            .record(
                Some(actor.user_id),
                AuditAction::ViewReports,
                None,
                None,
                Some(report_type.as_str()),
            )
            .await;

        Ok(AssetReport {
            assets: rows.into_iter().map(|a| AssetResponse::derive(a, today)).collect(),
            status_counts,
        })
    }

    /// Movement report: newest first, capped, each row carrying a
    /// rendered description.
    pub async fn movement_report(
        &self,
        actor: &ActorContext,
        filters: &MovementFilters,
    ) -> Result<Vec<MovementEntry>, AppError> {
        let rows = cap_newest_first(self.activities.movement(&actor.scope(), filters).await?);

        self.audit
            .record(
                Some(actor.user_id),
                AuditAction::ViewReports,
                None,
                None,
                Some(ReportType::Movement.as_str()),
            )
            .await;

        Ok(rows.into_iter().map(render_movement).collect())
    }

    /// Distinct suppliers inside the actor's scope, for filter dropdowns.
    pub async fn suppliers(&self, actor: &ActorContext) -> Result<Vec<String>, AppError> {
        let selection = AssetSelection::default();
        let rows = self.assets.select(&actor.scope(), &selection).await?;
        let mut suppliers: Vec<String> = rows
            .into_iter()
            .filter_map(|a| a.supplier)
            .filter(|s| !s.trim().is_empty())
            .collect();
        suppliers.sort();
        suppliers.dedup();
        Ok(suppliers)
    }

    pub async fn record_export(&self, actor_id: Uuid, report_type: ReportType, format: &str) {
        self.audit
            .record(
                Some(actor_id),
                AuditAction::ExportReport,
                None,
                None,
                Some(&format!("{} as {}", report_type.as_str(), format)),
            )
            .await;
    }
}

/// Movement output is newest first and never exceeds the row cap, however
/// the rows were fetched. The query orders and limits too; this holds the
/// guarantee at the service boundary.
fn cap_newest_first(mut rows: Vec<MovementRow>) -> Vec<MovementRow> {
    rows.sort_by(|a, b| b.occurred_at.cmp(&a.occurred_at));
    rows.truncate(MOVEMENT_ROW_LIMIT as usize);
    rows
}

fn locked_statuses() -> Vec<String> {
    vec![
        AssetStatus::Archived.as_str().to_string(),
        AssetStatus::Auctioned.as_str().to_string(),
    ]
}

fn render_movement(row: MovementRow) -> MovementEntry {
    let field = row.field.clone().unwrap_or_default();
    let description = describe_movement(
        &row.action,
        &field,
        row.old_value.as_deref().unwrap_or(""),
        row.new_value.as_deref().unwrap_or(""),
    );
    MovementEntry {
        occurred_at: row.occurred_at,
        asset_id: row.asset_id,
        name: row.asset_name,
        serial: row.serial_number,
        province: row.province,
        district: row.district,
        action: row.action,
        field,
        old_value: row.old_value,
        new_value: row.new_value,
        user: row.username.unwrap_or_else(|| "System".to_string()),
        description,
    }
}

/// Fixed sentence per movement field; the export and the report page show
/// the same text.
pub fn describe_movement(action: &str, field: &str, old_value: &str, new_value: &str) -> String {
    let desc = match field {
        "status" => match (old_value.is_empty(), new_value.is_empty()) {
            (false, false) => format!("Status changed from {} to {}", old_value, new_value),
            (true, false) => format!("Status set to {}", new_value),
            _ => String::new(),
        },
        "assigned_to" => {
            if new_value.is_empty() && !old_value.is_empty() {
                if action == "archive" {
                    format!("Assignment cleared from {} when asset was archived", old_value)
                } else {
                    format!("Assignment cleared from {}", old_value)
                }
            } else if !old_value.is_empty() && !new_value.is_empty() {
                format!("Assigned to changed from {} to {}", old_value, new_value)
            } else if !new_value.is_empty() {
                format!("Assigned to set to {}", new_value)
            } else {
                String::new()
            }
        }
        "province" => match (old_value.is_empty(), new_value.is_empty()) {
            (false, false) => format!("Province changed from {} to {}", old_value, new_value),
            (true, false) => format!("Province set to {}", new_value),
            _ => String::new(),
        },
        "district" => match (old_value.is_empty(), new_value.is_empty()) {
            (false, false) => format!("District changed from {} to {}", old_value, new_value),
            (true, false) => format!("District set to {}", new_value),
            _ => String::new(),
        },
        _ => String::new(),
    };
    if !desc.is_empty() {
        return desc;
    }
    if !old_value.is_empty() || !new_value.is_empty() {
        let old = if old_value.is_empty() { "-" } else { old_value };
        let new = if new_value.is_empty() { "-" } else { new_value };
        format!("{} changed from {} to {}", field, old, new)
    } else {
        format!("{} changed", field)
    }
}
