//! Asset data access

use crate::{
    error::AppError,
    models::asset::{Asset, AssetListFilters, AssetStatus},
    services::{access_scope::AccessScope, lifecycle::AssetDraft},
};
use chrono::NaiveDate;
use sqlx::{PgPool, Postgres, Row, Transaction};
use uuid::Uuid;

/// Row-selection criteria assembled by the report service. Every field is
/// optional; unset fields do not constrain the query.
#[derive(Debug, Default)]
pub struct AssetSelection {
    pub assigned_to: Option<String>,
    pub supplier: Option<String>,
    pub status: Option<String>,
    pub statuses: Option<Vec<String>>,
    pub exclude_statuses: Option<Vec<String>>,
    pub province: Option<String>,
    pub district: Option<String>,
    pub asset_types: Option<Vec<String>>,
    pub acquisition_type: Option<String>,
    pub inspected: Option<bool>,
    pub purchased_from: Option<NaiveDate>,
    pub purchased_to: Option<NaiveDate>,
}

pub struct AssetRepository {
    db: PgPool,
}

impl AssetRepository {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }

    pub async fn get(&self, id: Uuid) -> Result<Option<Asset>, AppError> {
        let asset = sqlx::query_as::<_, Asset>("SELECT * FROM assets WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.db)
            .await?;

        Ok(asset)
    }

    pub async fn serial_exists(&self, serial_number: &str) -> Result<bool, AppError> {
        let row = sqlx::query("SELECT 1 FROM assets WHERE serial_number = $1")
            .bind(serial_number)
            .fetch_optional(&self.db)
            .await?;

        Ok(row.is_some())
    }

    /// Dashboard listing: scope restriction plus optional name/serial search.
    pub async fn list(
        &self,
        scope: &AccessScope,
        filters: &AssetListFilters,
    ) -> Result<Vec<Asset>, AppError> {
        let mut query = String::from("SELECT * FROM assets WHERE 1=1");
        let mut index = 0;

        if scope.province().is_some() {
            index += 1;
            query.push_str(&format!(" AND province = ${}", index));
        }
        if scope.district().is_some() {
            index += 1;
            query.push_str(&format!(" AND district = ${}", index));
        }
        if filters.name.as_deref().is_some_and(|s| !s.trim().is_empty()) {
            index += 1;
            query.push_str(&format!(" AND name ILIKE ${}", index));
        }
        if filters.serial.as_deref().is_some_and(|s| !s.trim().is_empty()) {
            index += 1;
            query.push_str(&format!(" AND serial_number ILIKE ${}", index));
        }
        query.push_str(" ORDER BY created_at DESC");

        let mut query_builder = sqlx::query_as::<_, Asset>(&query);
        if let Some(province) = scope.province() {
            query_builder = query_builder.bind(province.to_string());
        }
        if let Some(district) = scope.district() {
            query_builder = query_builder.bind(district.to_string());
        }
        let name_pattern;
        if let Some(name) = filters.name.as_deref().map(str::trim).filter(|s| !s.is_empty()) {
            name_pattern = format!("%{}%", name);
            query_builder = query_builder.bind(&name_pattern);
        }
        let serial_pattern;
        if let Some(serial) = filters.serial.as_deref().map(str::trim).filter(|s| !s.is_empty()) {
            serial_pattern = format!("%{}%", serial);
            query_builder = query_builder.bind(&serial_pattern);
        }

        let assets = query_builder.fetch_all(&self.db).await?;
        Ok(assets)
    }

    /// Report row selection. Scope applies first, then the caller's
    /// criteria; lifecycle-derived filters are applied by the caller.
    pub async fn select(
        &self,
        scope: &AccessScope,
        selection: &AssetSelection,
    ) -> Result<Vec<Asset>, AppError> {
        let mut query = String::from("SELECT * FROM assets WHERE 1=1");
        let mut index = 0;

        if scope.province().is_some() {
            index += 1;
            query.push_str(&format!(" AND province = ${}", index));
        }
        if scope.district().is_some() {
            index += 1;
            query.push_str(&format!(" AND district = ${}", index));
        }
        if selection.assigned_to.is_some() {
            index += 1;
            query.push_str(&format!(" AND assigned_to = ${}", index));
        }
        if selection.supplier.is_some() {
            index += 1;
            query.push_str(&format!(" AND supplier = ${}", index));
        }
        if selection.status.is_some() {
            index += 1;
            query.push_str(&format!(" AND status = ${}", index));
        }
        if selection.statuses.is_some() {
            index += 1;
            query.push_str(&format!(" AND status = ANY(${})", index));
        }
        if selection.exclude_statuses.is_some() {
            index += 1;
            query.push_str(&format!(" AND NOT (status = ANY(${}))", index));
        }
        if selection.province.is_some() {
            index += 1;
            query.push_str(&format!(" AND province = ${}", index));
        }
        if selection.district.is_some() {
            index += 1;
            query.push_str(&format!(" AND district = ${}", index));
        }
        if selection.asset_types.is_some() {
            index += 1;
            query.push_str(&format!(" AND asset_type = ANY(${})", index));
        }
        if selection.acquisition_type.is_some() {
            index += 1;
            query.push_str(&format!(" AND acquisition_type = ${}", index));
        }
        if selection.inspected.is_some() {
            index += 1;
            query.push_str(&format!(" AND inspected_by_ict = ${}", index));
        }
        if selection.purchased_from.is_some() {
            index += 1;
            query.push_str(&format!(" AND purchase_date >= ${}", index));
        }
        if selection.purchased_to.is_some() {
            index += 1;
            query.push_str(&format!(" AND purchase_date <= ${}", index));
        }
        query.push_str(" ORDER BY created_at DESC");

        let mut query_builder = sqlx::query_as::<_, Asset>(&query);
        if let Some(province) = scope.province() {
            query_builder = query_builder.bind(province.to_string());
        }
        if let Some(district) = scope.district() {
            query_builder = query_builder.bind(district.to_string());
        }
        if let Some(assigned_to) = &selection.assigned_to {
            query_builder = query_builder.bind(assigned_to);
        }
        if let Some(supplier) = &selection.supplier {
            query_builder = query_builder.bind(supplier);
        }
        if let Some(status) = &selection.status {
            query_builder = query_builder.bind(status);
        }
        if let Some(statuses) = &selection.statuses {
            query_builder = query_builder.bind(statuses);
        }
        if let Some(excluded) = &selection.exclude_statuses {
            query_builder = query_builder.bind(excluded);
        }
        if let Some(province) = &selection.province {
            query_builder = query_builder.bind(province);
        }
        if let Some(district) = &selection.district {
            query_builder = query_builder.bind(district);
        }
        if let Some(types) = &selection.asset_types {
            query_builder = query_builder.bind(types);
        }
        if let Some(acquisition) = &selection.acquisition_type {
            query_builder = query_builder.bind(acquisition);
        }
        if let Some(inspected) = selection.inspected {
            query_builder = query_builder.bind(inspected);
        }
        if let Some(from) = selection.purchased_from {
            query_builder = query_builder.bind(from);
        }
        if let Some(to) = selection.purchased_to {
            query_builder = query_builder.bind(to);
        }

        let assets = query_builder.fetch_all(&self.db).await?;
        Ok(assets)
    }

    /// Count by status for the dashboard summary cards. Locked statuses
    /// appear as their own rows.
    pub async fn status_counts(&self, scope: &AccessScope) -> Result<Vec<(String, i64)>, AppError> {
        self.grouped_counts("status", scope, false).await
    }

    /// Count active (non-locked) assets by type.
    pub async fn type_counts(&self, scope: &AccessScope) -> Result<Vec<(String, i64)>, AppError> {
        self.grouped_counts("asset_type", scope, true).await
    }

    /// Count active (non-locked) assets by province.
    pub async fn province_counts(
        &self,
        scope: &AccessScope,
    ) -> Result<Vec<(String, i64)>, AppError> {
        self.grouped_counts("province", scope, true).await
    }

    // `column` is one of the fixed identifiers above, never user input.
    async fn grouped_counts(
        &self,
        column: &str,
        scope: &AccessScope,
        exclude_locked: bool,
    ) -> Result<Vec<(String, i64)>, AppError> {
        let mut query = format!(
            "SELECT COALESCE({column}, '') AS k, COUNT(*) AS n FROM assets WHERE 1=1"
        );
        let mut index = 0;
        if scope.province().is_some() {
            index += 1;
            query.push_str(&format!(" AND province = ${}", index));
        }
        if scope.district().is_some() {
            index += 1;
            query.push_str(&format!(" AND district = ${}", index));
        }
        if exclude_locked {
            index += 1;
            query.push_str(&format!(" AND NOT (status = ANY(${}))", index));
        }
        query.push_str(&format!(" GROUP BY COALESCE({column}, '')"));

        let mut query_builder = sqlx::query(&query);
        if let Some(province) = scope.province() {
            query_builder = query_builder.bind(province.to_string());
        }
        if let Some(district) = scope.district() {
            query_builder = query_builder.bind(district.to_string());
        }
        if exclude_locked {
            let locked: Vec<String> = AssetStatus::ALL
                .iter()
                .filter(|s| s.is_locked())
                .map(|s| s.as_str().to_string())
                .collect();
            query_builder = query_builder.bind(locked);
        }

        let rows = query_builder.fetch_all(&self.db).await?;
        let counts = rows
            .into_iter()
            .map(|row| (row.get::<String, _>("k"), row.get::<i64, _>("n")))
            .collect();
        Ok(counts)
    }

    /// Insert a validated draft inside the mutation's transaction.
    pub async fn insert(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        draft: &AssetDraft,
        capture_date: NaiveDate,
        created_by: Uuid,
    ) -> Result<Asset, AppError> {
        let asset = sqlx::query_as::<_, Asset>(
            r#"
            INSERT INTO assets (
                name, asset_type, serial_number, purchase_date, assigned_to,
                supplier, status, acquisition_type, donor_name, capture_date,
                antivirus_name, antivirus_license_date, office_name,
                office_license_date, os_name, province, district,
                inspected_by_ict, inspection_date, created_by
            )
            VALUES (
                $1, $2, $3, $4, $5, $6, $7, $8, $9, $10,
                $11, $12, $13, $14, $15, $16, $17, $18, $19, $20
            )
            RETURNING *
            "#,
        )
        .bind(&draft.name)
        .bind(&draft.asset_type)
        .bind(&draft.serial_number)
        .bind(draft.purchase_date)
        .bind(&draft.assigned_to)
        .bind(&draft.supplier)
        .bind(draft.status.as_str())
        .bind(draft.acquisition_type.as_str())
        .bind(&draft.donor_name)
        .bind(capture_date)
        .bind(&draft.antivirus_name)
        .bind(draft.antivirus_license_date)
        .bind(&draft.office_name)
        .bind(draft.office_license_date)
        .bind(&draft.os_name)
        .bind(&draft.province)
        .bind(&draft.district)
        .bind(draft.inspected_by_ict)
        .bind(draft.inspection_date)
        .bind(created_by)
        .fetch_one(&mut **tx)
        .await?;

        Ok(asset)
    }

    /// Persist the mutable fields of an update plan.
    #[allow(clippy::too_many_arguments)]
    pub async fn apply_update(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        id: Uuid,
        status: &str,
        province: &Option<String>,
        district: &Option<String>,
        assigned_to: &Option<String>,
        os_name: &Option<String>,
        antivirus_name: &Option<String>,
        antivirus_license_date: Option<NaiveDate>,
        office_name: &Option<String>,
        office_license_date: Option<NaiveDate>,
        inspected_by_ict: bool,
        inspection_date: Option<NaiveDate>,
    ) -> Result<Asset, AppError> {
        let asset = sqlx::query_as::<_, Asset>(
            r#"
            UPDATE assets
            SET
                status = $2,
                province = $3,
                district = $4,
                assigned_to = $5,
                os_name = $6,
                antivirus_name = $7,
                antivirus_license_date = $8,
                office_name = $9,
                office_license_date = $10,
                inspected_by_ict = $11,
                inspection_date = $12,
                updated_at = NOW()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(status)
        .bind(province)
        .bind(district)
        .bind(assigned_to)
        .bind(os_name)
        .bind(antivirus_name)
        .bind(antivirus_license_date)
        .bind(office_name)
        .bind(office_license_date)
        .bind(inspected_by_ict)
        .bind(inspection_date)
        .fetch_one(&mut **tx)
        .await?;

        Ok(asset)
    }

    /// Archive: the terminal status plus the assignment clear, atomically.
    pub async fn set_archived(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        id: Uuid,
    ) -> Result<Asset, AppError> {
        let asset = sqlx::query_as::<_, Asset>(
            r#"
            UPDATE assets
            SET status = 'Archived', assigned_to = NULL, updated_at = NOW()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .fetch_one(&mut **tx)
        .await?;

        Ok(asset)
    }
}
