//! Asset domain models
//! The aggregate root plus its derived lifecycle fields

use crate::models::activity::DocumentUpload;
use chrono::{DateTime, Duration, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Asset lifecycle statuses. `Archived` and `Auctioned` are locked: once
/// reached, the only legal change is Archived -> Auctioned.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AssetStatus {
    InUse,
    InStock,
    Broken,
    LostStolen,
    Auctioned,
    Archived,
}

impl AssetStatus {
    pub const ALL: [AssetStatus; 6] = [
        AssetStatus::InUse,
        AssetStatus::InStock,
        AssetStatus::Broken,
        AssetStatus::LostStolen,
        AssetStatus::Auctioned,
        AssetStatus::Archived,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            AssetStatus::InUse => "In Use",
            AssetStatus::InStock => "In Stock",
            AssetStatus::Broken => "Broken",
            AssetStatus::LostStolen => "Lost / Stolen",
            AssetStatus::Auctioned => "Auctioned",
            AssetStatus::Archived => "Archived",
        }
    }

    /// Parse a submitted status. The legacy value "Lost" normalizes to
    /// "Lost / Stolen".
    pub fn parse(value: &str) -> Option<AssetStatus> {
        match value.trim() {
            "In Use" => Some(AssetStatus::InUse),
            "In Stock" => Some(AssetStatus::InStock),
            "Broken" => Some(AssetStatus::Broken),
            "Lost" | "Lost / Stolen" => Some(AssetStatus::LostStolen),
            "Auctioned" => Some(AssetStatus::Auctioned),
            "Archived" => Some(AssetStatus::Archived),
            _ => None,
        }
    }

    pub fn is_locked(&self) -> bool {
        matches!(self, AssetStatus::Archived | AssetStatus::Auctioned)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AcquisitionType {
    Purchased,
    Donated,
}

impl AcquisitionType {
    pub fn as_str(&self) -> &'static str {
        match self {
            AcquisitionType::Purchased => "Purchased",
            AcquisitionType::Donated => "Donated",
        }
    }

    pub fn parse(value: &str) -> Option<AcquisitionType> {
        match value.trim() {
            "Purchased" => Some(AcquisitionType::Purchased),
            "Donated" => Some(AcquisitionType::Donated),
            _ => None,
        }
    }
}

/// Warning window before end-of-life, in days (roughly eight months).
pub const EOL_WARNING_DAYS: i64 = 240;

/// Software licenses older than one year are considered expired.
pub const LICENSE_VALID_DAYS: i64 = 365;

/// Service lifespan in years by asset type. Types without a mapping have
/// no end-of-life date.
pub fn eol_years(asset_type: &str) -> Option<i64> {
    match asset_type {
        "Laptop" => Some(3),
        "Desktop" | "All-in-One" => Some(5),
        "Cellphone" | "Tablet" => Some(2),
        _ => None,
    }
}

/// Asset types counted as computers in dashboards and reports.
pub const COMPUTER_TYPES: [&str; 3] = ["Laptop", "Desktop", "All-in-One"];
pub const MOBILE_TYPES: [&str; 2] = ["Cellphone", "Tablet"];

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Asset {
    pub id: Uuid,
    pub name: String,
    pub asset_type: String,
    pub serial_number: String,
    pub purchase_date: Option<NaiveDate>,
    pub assigned_to: Option<String>,
    pub supplier: Option<String>,
    pub status: String,
    pub acquisition_type: Option<String>,
    pub donor_name: Option<String>,
    pub capture_date: Option<NaiveDate>,
    pub antivirus_name: Option<String>,
    pub antivirus_license_date: Option<NaiveDate>,
    pub office_name: Option<String>,
    pub office_license_date: Option<NaiveDate>,
    pub os_name: Option<String>,
    pub province: Option<String>,
    pub district: Option<String>,
    pub inspected_by_ict: bool,
    pub inspection_date: Option<NaiveDate>,
    pub created_by: Option<Uuid>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Asset {
    /// Current status parsed to the closed set; legacy "Lost" rows normalize.
    pub fn lifecycle_status(&self) -> Option<AssetStatus> {
        AssetStatus::parse(&self.status)
    }

    pub fn is_locked(&self) -> bool {
        self.lifecycle_status().map(|s| s.is_locked()).unwrap_or(false)
    }

    pub fn eol_date(&self) -> Option<NaiveDate> {
        let years = eol_years(&self.asset_type)?;
        let purchase = self.purchase_date?;
        Some(purchase + Duration::days(years * 365))
    }

    pub fn is_eol_passed(&self, today: NaiveDate) -> Option<bool> {
        self.eol_date().map(|eol| today >= eol)
    }

    pub fn is_eol_approaching(&self, today: NaiveDate) -> Option<bool> {
        self.eol_date()
            .map(|eol| today >= eol - Duration::days(EOL_WARNING_DAYS) && today < eol)
    }

    /// Human-readable end-of-life status, computed at read time.
    pub fn eol_status(&self, today: NaiveDate) -> Option<String> {
        let eol = self.eol_date()?;
        if today >= eol {
            return Some("Past End-of-Life".to_string());
        }
        if today >= eol - Duration::days(EOL_WARNING_DAYS) {
            let remaining = (eol - today).num_days();
            return Some(format!("Approaching EOL ({} days left)", remaining));
        }
        Some(format!("EOL on {}", eol))
    }

    pub fn is_antivirus_expired(&self, today: NaiveDate) -> Option<bool> {
        self.antivirus_license_date
            .map(|d| (today - d).num_days() > LICENSE_VALID_DAYS)
    }

    pub fn is_office_expired(&self, today: NaiveDate) -> Option<bool> {
        self.office_license_date
            .map(|d| (today - d).num_days() > LICENSE_VALID_DAYS)
    }
}

/// Asset plus its derived read-time fields.
#[derive(Debug, Serialize)]
pub struct AssetResponse {
    #[serde(flatten)]
    pub asset: Asset,
    pub eol_date: Option<NaiveDate>,
    pub eol_status: Option<String>,
    pub is_eol_passed: Option<bool>,
    pub is_eol_approaching: Option<bool>,
    pub is_antivirus_expired: Option<bool>,
    pub is_office_expired: Option<bool>,
}

impl AssetResponse {
    pub fn derive(asset: Asset, today: NaiveDate) -> Self {
        AssetResponse {
            eol_date: asset.eol_date(),
            eol_status: asset.eol_status(today),
            is_eol_passed: asset.is_eol_passed(today),
            is_eol_approaching: asset.is_eol_approaching(today),
            is_antivirus_expired: asset.is_antivirus_expired(today),
            is_office_expired: asset.is_office_expired(today),
            asset,
        }
    }
}

/// Create asset request. Evidence documents travel inline as base64
/// payloads; the lifecycle engine decides which are mandatory.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CreateAssetRequest {
    pub name: String,
    pub asset_type: String,
    pub serial_number: String,
    pub purchase_date: Option<NaiveDate>,
    pub acquisition_type: Option<String>,
    pub donor_name: Option<String>,
    pub assigned_to: Option<String>,
    pub supplier: Option<String>,
    pub status: String,
    pub antivirus_name: Option<String>,
    pub antivirus_license_date: Option<NaiveDate>,
    pub office_name: Option<String>,
    pub office_license_date: Option<NaiveDate>,
    pub os_name: Option<String>,
    pub province: Option<String>,
    pub district: Option<String>,
    #[serde(default)]
    pub inspected_by_ict: bool,
    pub inspection_date: Option<NaiveDate>,
    pub loss_evidence: Option<DocumentUpload>,
    pub specification_document: Option<DocumentUpload>,
    pub inspection_document: Option<DocumentUpload>,
}

/// Update asset request. Immutable fields may be submitted but are ignored
/// with a warning when they differ from the stored values.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateAssetRequest {
    pub name: Option<String>,
    pub asset_type: Option<String>,
    pub serial_number: Option<String>,
    pub supplier: Option<String>,
    pub purchase_date: Option<NaiveDate>,
    pub status: Option<String>,
    pub assigned_to: Option<String>,
    pub province: Option<String>,
    pub district: Option<String>,
    pub os_name: Option<String>,
    pub antivirus_name: Option<String>,
    pub antivirus_license_date: Option<NaiveDate>,
    pub office_name: Option<String>,
    pub office_license_date: Option<NaiveDate>,
    #[serde(default)]
    pub inspected_by_ict: bool,
    pub inspection_date: Option<NaiveDate>,
    pub repair_note: Option<String>,
    pub recovery_note: Option<String>,
    pub loss_evidence: Option<DocumentUpload>,
    pub inspection_document: Option<DocumentUpload>,
}

/// Search filters for the dashboard listing
#[derive(Debug, Default, Deserialize)]
pub struct AssetListFilters {
    pub name: Option<String>,
    pub serial: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn asset_of(asset_type: &str, purchase_date: NaiveDate) -> Asset {
        Asset {
            id: Uuid::new_v4(),
            name: "Test".to_string(),
            asset_type: asset_type.to_string(),
            serial_number: "SN-1".to_string(),
            purchase_date: Some(purchase_date),
            assigned_to: None,
            supplier: None,
            status: "In Stock".to_string(),
            acquisition_type: None,
            donor_name: None,
            capture_date: None,
            antivirus_name: None,
            antivirus_license_date: None,
            office_name: None,
            office_license_date: None,
            os_name: None,
            province: None,
            district: None,
            inspected_by_ict: false,
            inspection_date: None,
            created_by: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_status_parse_normalizes_legacy_lost() {
        assert_eq!(AssetStatus::parse("Lost"), Some(AssetStatus::LostStolen));
        assert_eq!(AssetStatus::parse("Lost / Stolen"), Some(AssetStatus::LostStolen));
        assert_eq!(AssetStatus::parse("Retired"), None);
    }

    #[test]
    fn test_locked_statuses() {
        assert!(AssetStatus::Archived.is_locked());
        assert!(AssetStatus::Auctioned.is_locked());
        assert!(!AssetStatus::Broken.is_locked());
    }

    #[test]
    fn test_laptop_eol_at_exactly_three_years_is_passed() {
        let today = date(2026, 8, 23);
        // 3 * 365 days before today
        let purchased = today - Duration::days(3 * 365);
        let asset = asset_of("Laptop", purchased);
        assert_eq!(asset.eol_date(), Some(today));
        assert_eq!(asset.is_eol_passed(today), Some(true));
        assert_eq!(asset.eol_status(today).as_deref(), Some("Past End-of-Life"));
    }

    #[test]
    fn test_laptop_just_inside_warning_window_is_approaching() {
        let today = date(2026, 8, 23);
        // EOL falls 240 days from today: purchased 3y minus 240d ago, so
        // today is exactly at the start of the warning window... push one
        // day further in to be strictly inside it.
        let purchased = today - Duration::days(3 * 365 - 239);
        let asset = asset_of("Laptop", purchased);
        assert_eq!(asset.is_eol_approaching(today), Some(true));
        assert_eq!(asset.is_eol_passed(today), Some(false));
        let status = asset.eol_status(today).unwrap();
        assert!(status.starts_with("Approaching EOL"), "got: {status}");
    }

    #[test]
    fn test_unmapped_type_has_no_eol() {
        let asset = asset_of("Printer", date(2019, 1, 1));
        assert_eq!(asset.eol_date(), None);
        assert_eq!(asset.eol_status(date(2026, 1, 1)), None);
    }

    #[test]
    fn test_license_expiry_window() {
        let today = date(2026, 8, 23);
        let mut asset = asset_of("Laptop", today);
        asset.antivirus_license_date = Some(today - Duration::days(366));
        asset.office_license_date = Some(today - Duration::days(365));
        assert_eq!(asset.is_antivirus_expired(today), Some(true));
        // exactly 365 days old is still valid
        assert_eq!(asset.is_office_expired(today), Some(false));
        asset.antivirus_license_date = None;
        assert_eq!(asset.is_antivirus_expired(today), None);
    }
}
