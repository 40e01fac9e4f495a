//! Report exports
//!
//! Every report type exports through the same tabular shape. CSV and
//! Excel share one CSV body under different content types; Word is an
//! HTML table served as .doc; PDF renders a printable HTML page the
//! browser can print to PDF.

use crate::{
    error::AppError,
    models::{
        asset::AssetResponse,
        report::{ExportFormat, MovementEntry, ReportType},
    },
};
use chrono::{DateTime, Utc};

pub const ASSET_EXPORT_HEADERS: [&str; 21] = [
    "ID",
    "Name",
    "Type",
    "Serial",
    "Purchase Date",
    "Acquisition Type",
    "Status",
    "Assigned To",
    "Supplier",
    "Donor Name",
    "Province",
    "District",
    "OS",
    "Antivirus",
    "Antivirus License",
    "Office",
    "Office License",
    "EOL Date",
    "EOL Status",
    "Inspected",
    "Inspection Date",
];

pub const MOVEMENT_EXPORT_HEADERS: [&str; 12] = [
    "Date / Time",
    "Asset ID",
    "Name",
    "Serial",
    "Province",
    "District",
    "Action",
    "Field",
    "Old Value",
    "New Value",
    "User",
    "Description",
];

/// A fully rendered download.
#[derive(Debug)]
pub struct ExportPayload {
    pub filename: String,
    pub content_type: &'static str,
    pub body: Vec<u8>,
}

fn opt(value: &Option<String>) -> String {
    value.clone().unwrap_or_default()
}

fn date_opt(value: Option<chrono::NaiveDate>) -> String {
    value.map(|d| d.to_string()).unwrap_or_default()
}

pub fn asset_rows(assets: &[AssetResponse]) -> Vec<Vec<String>> {
    assets
        .iter()
        .map(|r| {
            let a = &r.asset;
            vec![
                a.id.to_string(),
                a.name.clone(),
                a.asset_type.clone(),
                a.serial_number.clone(),
                date_opt(a.purchase_date),
                opt(&a.acquisition_type),
                a.status.clone(),
                opt(&a.assigned_to),
                opt(&a.supplier),
                opt(&a.donor_name),
                opt(&a.province),
                opt(&a.district),
                opt(&a.os_name),
                opt(&a.antivirus_name),
                date_opt(a.antivirus_license_date),
                opt(&a.office_name),
                date_opt(a.office_license_date),
                date_opt(r.eol_date),
                r.eol_status.clone().unwrap_or_default(),
                if a.inspected_by_ict { "Yes" } else { "No" }.to_string(),
                date_opt(a.inspection_date),
            ]
        })
        .collect()
}

pub fn movement_rows(entries: &[MovementEntry]) -> Vec<Vec<String>> {
    entries
        .iter()
        .map(|m| {
            vec![
                m.occurred_at.to_rfc3339(),
                m.asset_id.to_string(),
                m.name.clone(),
                m.serial.clone(),
                opt(&m.province),
                opt(&m.district),
                m.action.clone(),
                m.field.clone(),
                opt(&m.old_value),
                opt(&m.new_value),
                m.user.clone(),
                m.description.clone(),
            ]
        })
        .collect()
}

fn to_csv(headers: &[&str], rows: &[Vec<String>]) -> Result<Vec<u8>, AppError> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    writer
        .write_record(headers)
        .map_err(|e| AppError::Internal(format!("CSV write failed: {}", e)))?;
    for row in rows {
        writer
            .write_record(row)
            .map_err(|e| AppError::Internal(format!("CSV write failed: {}", e)))?;
    }
    writer
        .into_inner()
        .map_err(|e| AppError::Internal(format!("CSV write failed: {}", e)))
}

fn escape_html(value: &str) -> String {
    value
        .replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

fn to_html_table(title: &str, headers: &[&str], rows: &[Vec<String>]) -> String {
    let mut html = String::from("<html><body>");
    html.push_str(&format!("<h2>{}</h2>", escape_html(title)));
    html.push_str("<table border='1' cellspacing='0' cellpadding='4'>");
    html.push_str("<tr>");
    for h in headers {
        html.push_str(&format!("<th>{}</th>", escape_html(h)));
    }
    html.push_str("</tr>");
    for row in rows {
        html.push_str("<tr>");
        for cell in row {
            html.push_str(&format!("<td>{}</td>", escape_html(cell)));
        }
        html.push_str("</tr>");
    }
    html.push_str("</table></body></html>");
    html
}

fn filename_base(report_type: ReportType, now: DateTime<Utc>) -> String {
    let stamp = now.format("%Y%m%d_%H%M%S");
    if report_type == ReportType::Movement {
        format!("movement_report_{}", stamp)
    } else {
        format!("report_{}_{}", report_type.as_str(), stamp)
    }
}

/// Render headers and rows into the requested format. Empty reports still
/// produce a well-formed file with the header row.
pub fn render(
    report_type: ReportType,
    format: ExportFormat,
    headers: &[&str],
    rows: &[Vec<String>],
    now: DateTime<Utc>,
) -> Result<ExportPayload, AppError> {
    let base = filename_base(report_type, now);
    let payload = match format {
        ExportFormat::Csv => ExportPayload {
            filename: format!("{}.csv", base),
            content_type: "text/csv",
            body: to_csv(headers, rows)?,
        },
        ExportFormat::Excel => ExportPayload {
            filename: format!("{}.csv", base),
            content_type: "application/vnd.ms-excel",
            body: to_csv(headers, rows)?,
        },
        ExportFormat::Word => ExportPayload {
            filename: format!("{}.doc", base),
            content_type: "application/msword",
            body: to_html_table("ICT Asset Report", headers, rows).into_bytes(),
        },
        // Served inline; the browser's print dialog produces the PDF.
        ExportFormat::Pdf => ExportPayload {
            filename: format!("{}.html", base),
            content_type: "text/html",
            body: to_html_table("ICT Asset Report", headers, rows).into_bytes(),
        },
    };
    Ok(payload)
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    fn entry() -> MovementEntry {
        MovementEntry {
            occurred_at: Utc::now(),
            asset_id: Uuid::new_v4(),
            name: "Dell Latitude".to_string(),
            serial: "SN-100".to_string(),
            province: Some("Harare".to_string()),
            district: Some("Harare District".to_string()),
            action: "status".to_string(),
            field: "status".to_string(),
            old_value: Some("In Stock".to_string()),
            new_value: Some("In Use".to_string()),
            user: "itadmin".to_string(),
            description: "Status changed from In Stock to In Use".to_string(),
        }
    }

    #[test]
    fn test_empty_export_is_well_formed() {
        let payload = render(
            ReportType::All,
            ExportFormat::Csv,
            &ASSET_EXPORT_HEADERS,
            &[],
            Utc::now(),
        )
        .unwrap();
        let text = String::from_utf8(payload.body).unwrap();
        assert!(text.starts_with("ID,Name,Type,Serial"));
        assert_eq!(text.lines().count(), 1);
        assert!(payload.filename.starts_with("report_all_"));
        assert!(payload.filename.ends_with(".csv"));
    }

    #[test]
    fn test_movement_csv_includes_description() {
        let rows = movement_rows(&[entry()]);
        let payload = render(
            ReportType::Movement,
            ExportFormat::Csv,
            &MOVEMENT_EXPORT_HEADERS,
            &rows,
            Utc::now(),
        )
        .unwrap();
        let text = String::from_utf8(payload.body).unwrap();
        assert!(text.contains("Status changed from In Stock to In Use"));
        assert!(payload.filename.starts_with("movement_report_"));
    }

    #[test]
    fn test_excel_shares_csv_body() {
        let rows = movement_rows(&[entry()]);
        let csv_payload = render(
            ReportType::Movement,
            ExportFormat::Csv,
            &MOVEMENT_EXPORT_HEADERS,
            &rows,
            Utc::now(),
        )
        .unwrap();
        let excel_payload = render(
            ReportType::Movement,
            ExportFormat::Excel,
            &MOVEMENT_EXPORT_HEADERS,
            &rows,
            Utc::now(),
        )
        .unwrap();
        assert_eq!(csv_payload.body, excel_payload.body);
        assert_eq!(excel_payload.content_type, "application/vnd.ms-excel");
    }

    #[test]
    fn test_word_export_escapes_html() {
        let mut e = entry();
        e.name = "<script>alert(1)</script>".to_string();
        let rows = movement_rows(&[e]);
        let payload = render(
            ReportType::Movement,
            ExportFormat::Word,
            &MOVEMENT_EXPORT_HEADERS,
            &rows,
            Utc::now(),
        )
        .unwrap();
        let html = String::from_utf8(payload.body).unwrap();
        assert!(!html.contains("<script>"));
        assert!(html.contains("&lt;script&gt;"));
    }
}
