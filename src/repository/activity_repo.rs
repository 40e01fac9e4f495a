//! Activity ledger data access
//! Rows are insert-only; there is no update or delete path.

use crate::{
    error::AppError,
    models::{
        activity::{ActivityDraft, AssetActivity, MOVEMENT_FIELDS},
        report::MovementFilters,
    },
    services::access_scope::AccessScope,
};
use chrono::{DateTime, Utc};
use sqlx::{PgPool, Postgres, Transaction};
use uuid::Uuid;

/// Cap on movement report rows, newest first.
pub const MOVEMENT_ROW_LIMIT: i64 = 500;

/// One movement row joined with its asset and actor.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct MovementRow {
    pub occurred_at: DateTime<Utc>,
    pub asset_id: Uuid,
    pub asset_name: String,
    pub serial_number: String,
    pub province: Option<String>,
    pub district: Option<String>,
    pub action: String,
    pub field: Option<String>,
    pub old_value: Option<String>,
    pub new_value: Option<String>,
    pub username: Option<String>,
}

pub struct ActivityRepository {
    db: PgPool,
}

impl ActivityRepository {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }

    /// Append ledger rows inside the mutation's transaction.
    pub async fn insert_all(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        asset_id: Uuid,
        actor_id: Uuid,
        drafts: &[ActivityDraft],
    ) -> Result<(), AppError> {
        for draft in drafts {
            sqlx::query(
                r#"
                INSERT INTO asset_activity (asset_id, actor_id, action, field, old_value, new_value)
                VALUES ($1, $2, $3, $4, $5, $6)
                "#,
            )
            .bind(asset_id)
            .bind(actor_id)
            .bind(draft.action.as_str())
            .bind(&draft.field)
            .bind(&draft.old_value)
            .bind(&draft.new_value)
            .execute(&mut **tx)
            .await?;
        }
        Ok(())
    }

    /// Full history for one asset, newest first.
    pub async fn list_for_asset(&self, asset_id: Uuid) -> Result<Vec<AssetActivity>, AppError> {
        let rows = sqlx::query_as::<_, AssetActivity>(
            "SELECT * FROM asset_activity WHERE asset_id = $1 ORDER BY occurred_at DESC",
        )
        .bind(asset_id)
        .fetch_all(&self.db)
        .await?;

        Ok(rows)
    }

    /// Movement rows: changes to location, assignment or status, joined with
    /// the asset and the acting user, scoped to the caller's jurisdiction.
    pub async fn movement(
        &self,
        scope: &AccessScope,
        filters: &MovementFilters,
    ) -> Result<Vec<MovementRow>, AppError> {
        let mut query = String::from(
            r#"
            SELECT
                aa.occurred_at, aa.asset_id, a.name AS asset_name,
                a.serial_number, a.province, a.district,
                aa.action, aa.field, aa.old_value, aa.new_value,
                u.username
            FROM asset_activity aa
            JOIN assets a ON a.id = aa.asset_id
            LEFT JOIN users u ON u.id = aa.actor_id
            WHERE aa.field = ANY($1)
            "#,
        );
        let mut index = 1;

        if scope.province().is_some() {
            index += 1;
            query.push_str(&format!(" AND a.province = ${}", index));
        }
        if scope.district().is_some() {
            index += 1;
            query.push_str(&format!(" AND a.district = ${}", index));
        }
        if filters.asset_id.is_some() {
            index += 1;
            query.push_str(&format!(" AND aa.asset_id = ${}", index));
        }
        if filters.serial.as_deref().is_some_and(|s| !s.trim().is_empty()) {
            index += 1;
            query.push_str(&format!(" AND a.serial_number = ${}", index));
        }
        if filters
            .movement_field
            .as_deref()
            .is_some_and(|f| MOVEMENT_FIELDS.contains(&f))
        {
            index += 1;
            query.push_str(&format!(" AND aa.field = ${}", index));
        }
        if filters.start_date.is_some() {
            index += 1;
            query.push_str(&format!(" AND aa.occurred_at >= ${}::date", index));
        }
        if filters.end_date.is_some() {
            index += 1;
            // The end date is inclusive: activity from the whole end day is
            // returned, hence the strict comparison against the next day.
            query.push_str(&format!(
                " AND aa.occurred_at < ${}::date + INTERVAL '1 day'",
                index
            ));
        }
        query.push_str(&format!(
            " ORDER BY aa.occurred_at DESC LIMIT {}",
            MOVEMENT_ROW_LIMIT
        ));

        let movement_fields: Vec<String> =
            MOVEMENT_FIELDS.iter().map(|f| f.to_string()).collect();
        let mut query_builder =
            sqlx::query_as::<_, MovementRow>(&query).bind(movement_fields);

        if let Some(province) = scope.province() {
            query_builder = query_builder.bind(province.to_string());
        }
        if let Some(district) = scope.district() {
            query_builder = query_builder.bind(district.to_string());
        }
        if let Some(asset_id) = filters.asset_id {
            query_builder = query_builder.bind(asset_id);
        }
        if let Some(serial) = filters.serial.as_deref().map(str::trim).filter(|s| !s.is_empty()) {
            query_builder = query_builder.bind(serial.to_string());
        }
        if let Some(field) = filters
            .movement_field
            .as_deref()
            .filter(|f| MOVEMENT_FIELDS.contains(f))
        {
            query_builder = query_builder.bind(field.to_string());
        }
        if let Some(from) = filters.start_date {
            query_builder = query_builder.bind(from);
        }
        if let Some(to) = filters.end_date {
            query_builder = query_builder.bind(to);
        }

        let rows = query_builder.fetch_all(&self.db).await?;
        Ok(rows)
    }

    /// Whether any ledger row references the user, for the delete
    /// footprint check.
    pub async fn user_has_rows(&self, actor_id: Uuid) -> Result<bool, AppError> {
        let row = sqlx::query("SELECT 1 FROM asset_activity WHERE actor_id = $1 LIMIT 1")
            .bind(actor_id)
            .fetch_optional(&self.db)
            .await?;

        Ok(row.is_some())
    }
}
