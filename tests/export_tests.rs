//! Report export tests

use chrono::{NaiveDate, TimeZone, Utc};
use ict_inventory::{
    models::{
        asset::{Asset, AssetResponse},
        report::{ExportFormat, MovementEntry, ReportType},
    },
    services::export::{
        asset_rows, movement_rows, render, ASSET_EXPORT_HEADERS, MOVEMENT_EXPORT_HEADERS,
    },
};
use uuid::Uuid;

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn sample_asset() -> AssetResponse {
    let asset = Asset {
        id: Uuid::new_v4(),
        name: "Lenovo ThinkPad".to_string(),
        asset_type: "Laptop".to_string(),
        serial_number: "SN-42".to_string(),
        purchase_date: Some(date(2024, 6, 1)),
        assigned_to: Some("S. Ncube".to_string()),
        supplier: Some("First Pack".to_string()),
        status: "In Use".to_string(),
        acquisition_type: Some("Purchased".to_string()),
        donor_name: None,
        capture_date: Some(date(2024, 6, 3)),
        antivirus_name: Some("ESET".to_string()),
        antivirus_license_date: Some(date(2026, 1, 1)),
        office_name: None,
        office_license_date: None,
        os_name: Some("Windows 11".to_string()),
        province: Some("Midlands".to_string()),
        district: Some("Gweru".to_string()),
        inspected_by_ict: true,
        inspection_date: Some(date(2024, 7, 1)),
        created_by: None,
        created_at: Utc::now(),
        updated_at: Utc::now(),
    };
    AssetResponse::derive(asset, date(2026, 8, 23))
}

fn sample_movement() -> MovementEntry {
    MovementEntry {
        occurred_at: Utc.with_ymd_and_hms(2026, 8, 1, 9, 30, 0).unwrap(),
        asset_id: Uuid::new_v4(),
        name: "Lenovo ThinkPad".to_string(),
        serial: "SN-42".to_string(),
        province: Some("Midlands".to_string()),
        district: Some("Gweru".to_string()),
        action: "update".to_string(),
        field: "district".to_string(),
        old_value: Some("Gweru".to_string()),
        new_value: Some("Kwekwe".to_string()),
        user: "mdlprovince".to_string(),
        description: "District changed from Gweru to Kwekwe".to_string(),
    }
}

#[test]
fn test_asset_rows_match_header_width() {
    let rows = asset_rows(&[sample_asset()]);
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].len(), ASSET_EXPORT_HEADERS.len());
    assert!(rows[0].contains(&"SN-42".to_string()));
    assert!(rows[0].contains(&"Yes".to_string()));
}

#[test]
fn test_movement_rows_match_header_width() {
    let rows = movement_rows(&[sample_movement()]);
    assert_eq!(rows[0].len(), MOVEMENT_EXPORT_HEADERS.len());
    assert_eq!(rows[0][11], "District changed from Gweru to Kwekwe");
}

#[test]
fn test_every_format_renders_every_report_type() {
    let rows = asset_rows(&[sample_asset()]);
    let now = Utc.with_ymd_and_hms(2026, 8, 23, 12, 0, 0).unwrap();

    for report_type in [ReportType::All, ReportType::PastEol, ReportType::Donated] {
        for format in [
            ExportFormat::Csv,
            ExportFormat::Excel,
            ExportFormat::Word,
            ExportFormat::Pdf,
        ] {
            let payload =
                render(report_type, format, &ASSET_EXPORT_HEADERS, &rows, now).unwrap();
            assert!(!payload.body.is_empty());
            assert!(payload.filename.contains("20260823_120000"));
        }
    }
}

#[test]
fn test_format_specific_extensions_and_content_types() {
    let rows = movement_rows(&[sample_movement()]);
    let now = Utc::now();

    let csv = render(ReportType::Movement, ExportFormat::Csv, &MOVEMENT_EXPORT_HEADERS, &rows, now)
        .unwrap();
    assert!(csv.filename.ends_with(".csv"));
    assert_eq!(csv.content_type, "text/csv");

    let excel =
        render(ReportType::Movement, ExportFormat::Excel, &MOVEMENT_EXPORT_HEADERS, &rows, now)
            .unwrap();
    assert!(excel.filename.ends_with(".csv"));
    assert_eq!(excel.content_type, "application/vnd.ms-excel");
    assert_eq!(excel.body, csv.body);

    let word =
        render(ReportType::Movement, ExportFormat::Word, &MOVEMENT_EXPORT_HEADERS, &rows, now)
            .unwrap();
    assert!(word.filename.ends_with(".doc"));
    assert_eq!(word.content_type, "application/msword");

    let pdf = render(ReportType::Movement, ExportFormat::Pdf, &MOVEMENT_EXPORT_HEADERS, &rows, now)
        .unwrap();
    assert!(pdf.filename.ends_with(".html"));
    assert_eq!(pdf.content_type, "text/html");
}

#[test]
fn test_csv_quotes_values_with_commas() {
    let mut entry = sample_movement();
    entry.description = "District changed from Gweru, Midlands to Kwekwe".to_string();
    let rows = movement_rows(&[entry]);
    let payload = render(
        ReportType::Movement,
        ExportFormat::Csv,
        &MOVEMENT_EXPORT_HEADERS,
        &rows,
        Utc::now(),
    )
    .unwrap();
    let text = String::from_utf8(payload.body).unwrap();
    assert!(text.contains("\"District changed from Gweru, Midlands to Kwekwe\""));
}
