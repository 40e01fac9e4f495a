//! Report handlers
//!
//! The report type travels in the path; filters travel as query
//! parameters. Exports reuse the same selection as the on-screen report
//! and stream back as a download.

use crate::{
    auth::middleware::AuthContext,
    error::AppError,
    locations,
    middleware::AppState,
    models::report::{ExportFormat, MovementFilters, ReportFilters, ReportType},
    services::export::{self, ExportPayload, ASSET_EXPORT_HEADERS, MOVEMENT_EXPORT_HEADERS},
};
use axum::{
    extract::{Path, Query, State},
    http::header,
    response::{IntoResponse, Response},
    Json,
};
use chrono::{NaiveDate, Utc};
use serde::Deserialize;
use serde_json::json;
use std::sync::Arc;
use uuid::Uuid;

fn parse_report_type(value: &str) -> Result<ReportType, AppError> {
    match ReportType::parse(value) {
        Some(ReportType::Movement) | None => {
            Err(AppError::BadRequest(format!("Unknown report type: {}", value)))
        }
        Some(rt) => Ok(rt),
    }
}

fn parse_format(value: Option<&str>) -> Result<ExportFormat, AppError> {
    let value = value.unwrap_or("csv");
    ExportFormat::parse(value)
        .ok_or_else(|| AppError::BadRequest(format!("Unknown export format: {}", value)))
}

fn download_response(payload: ExportPayload) -> Response {
    (
        [
            (header::CONTENT_TYPE, payload.content_type.to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{}\"", payload.filename),
            ),
        ],
        payload.body,
    )
        .into_response()
}

pub async fn get_asset_report(
    State(state): State<Arc<AppState>>,
    auth_context: AuthContext,
    Path(report_type): Path<String>,
    Query(filters): Query<ReportFilters>,
) -> Result<impl IntoResponse, AppError> {
    let report_type = parse_report_type(&report_type)?;
    let actor = state.actor(&auth_context).await?;
    let report = state
        .report_service
        .asset_report(&actor, report_type, &filters)
        .await?;

    Ok(Json(json!({
        "report_type": report_type.as_str(),
        "count": report.assets.len(),
        "assets": report.assets,
        "status_counts": report.status_counts,
    })))
}

pub async fn get_movement_report(
    State(state): State<Arc<AppState>>,
    auth_context: AuthContext,
    Query(filters): Query<MovementFilters>,
) -> Result<impl IntoResponse, AppError> {
    let actor = state.actor(&auth_context).await?;
    let entries = state.report_service.movement_report(&actor, &filters).await?;
    Ok(Json(json!({
        "count": entries.len(),
        "entries": entries,
    })))
}

/// Query parameters for an asset report export: the format plus the same
/// filters the report accepts.
#[derive(Debug, Default, Deserialize)]
pub struct AssetExportParams {
    pub format: Option<String>,
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

pub async fn export_asset_report(
    State(state): State<Arc<AppState>>,
    auth_context: AuthContext,
    Path(report_type): Path<String>,
    Query(params): Query<AssetExportParams>,
) -> Result<Response, AppError> {
    let report_type = parse_report_type(&report_type)?;
    let format = parse_format(params.format.as_deref())?;
    let actor = state.actor(&auth_context).await?;

    let filters = ReportFilters {
        assigned_to: params.assigned_to,
        supplier: params.supplier,
        status: params.status,
        province: params.province,
        district: params.district,
        uninspected: params.uninspected,
        start_date: params.start_date,
        end_date: params.end_date,
    };
    let report = state
        .report_service
        .asset_report(&actor, report_type, &filters)
        .await?;

    let rows = export::asset_rows(&report.assets);
    let payload = export::render(report_type, format, &ASSET_EXPORT_HEADERS, &rows, Utc::now())?;
    state
        .report_service
        .record_export(actor.user_id, report_type, params.format.as_deref().unwrap_or("csv"))
        .await;

    Ok(download_response(payload))
}

#[derive(Debug, Default, Deserialize)]
pub struct MovementExportParams {
    pub format: Option<String>,
    pub asset_id: Option<Uuid>,
    pub serial: Option<String>,
    pub movement_field: Option<String>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
}

pub async fn export_movement_report(
    State(state): State<Arc<AppState>>,
    auth_context: AuthContext,
    Query(params): Query<MovementExportParams>,
) -> Result<Response, AppError> {
    let format = parse_format(params.format.as_deref())?;
    let actor = state.actor(&auth_context).await?;

    let filters = MovementFilters {
        asset_id: params.asset_id,
        serial: params.serial,
        movement_field: params.movement_field,
        start_date: params.start_date,
        end_date: params.end_date,
    };
    let entries = state.report_service.movement_report(&actor, &filters).await?;

    let rows = export::movement_rows(&entries);
    let payload = export::render(
        ReportType::Movement,
        format,
        &MOVEMENT_EXPORT_HEADERS,
        &rows,
        Utc::now(),
    )?;
    state
        .report_service
        .record_export(
            actor.user_id,
            ReportType::Movement,
            params.format.as_deref().unwrap_or("csv"),
        )
        .await;

    Ok(download_response(payload))
}

/// Distinct suppliers inside the actor's scope, for the filter dropdown.
pub async fn list_suppliers(
    State(state): State<Arc<AppState>>,
    auth_context: AuthContext,
) -> Result<impl IntoResponse, AppError> {
    let actor = state.actor(&auth_context).await?;
    let suppliers = state.report_service.suppliers(&actor).await?;
    Ok(Json(json!({ "suppliers": suppliers })))
}

/// The fixed province and district reference data.
pub async fn get_locations(_auth_context: AuthContext) -> Result<impl IntoResponse, AppError> {
    let provinces: Vec<_> = locations::all_provinces()
        .into_iter()
        .map(|p| {
            json!({
                "province": p,
                "districts": locations::districts_of(p),
            })
        })
        .collect();
    Ok(Json(json!({ "locations": provinces })))
}
