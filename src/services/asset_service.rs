//! Asset service
//!
//! Orchestrates the lifecycle engine's plans: loads the current row,
//! plans the mutation, then executes it inside one transaction so the
//! asset row, its ledger rows and its document rows commit together.
//! Document files are written before the commit; a failed transaction can
//! leave an orphan file but never a dangling database reference.

use crate::{
    error::AppError,
    models::{
        activity::{ActivityAction, ActivityDraft, AssetActivity, AssetDocument, DocumentType, DocumentUpload},
        asset::{Asset, AssetListFilters, AssetResponse, CreateAssetRequest, UpdateAssetRequest},
        audit::AuditAction,
    },
    repository::{ActivityRepository, AssetRepository, DocumentRepository},
    services::{
        access_scope::{AccessScope, ActorContext},
        audit_service::AuditService,
        lifecycle::{self, ArchivePlan, Outcome},
        storage::DocumentStore,
    },
};
use chrono::Utc;
use sqlx::{PgPool, Postgres, Transaction};
use std::sync::Arc;
use tracing::info;
use uuid::Uuid;

/// How a per-asset lookup will be used. Reads hide out-of-scope assets as
/// missing so their existence does not leak across jurisdictions; writes
/// are refused outright.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScopedAccess {
    Read,
    Write,
}

/// Scope gate shared by every per-asset path.
pub fn check_asset_scope(
    scope: &AccessScope,
    province: Option<&str>,
    district: Option<&str>,
    access: ScopedAccess,
) -> Result<(), AppError> {
    if scope.permits(province, district) {
        return Ok(());
    }
    match access {
        ScopedAccess::Read => Err(AppError::NotFound),
        ScopedAccess::Write => Err(AppError::Forbidden),
    }
}

/// Grouped asset counts for the dashboard cards.
#[derive(Debug)]
pub struct DashboardSummary {
    pub status_counts: Vec<(String, i64)>,
    pub type_counts: Vec<(String, i64)>,
    pub province_counts: Vec<(String, i64)>,
}

pub struct AssetService {
    db: PgPool,
    assets: AssetRepository,
    activities: ActivityRepository,
    documents: DocumentRepository,
    store: Arc<DocumentStore>,
    audit: Arc<AuditService>,
}

impl AssetService {
    pub fn new(db: PgPool, store: Arc<DocumentStore>, audit: Arc<AuditService>) -> Self {
        Self {
            assets: AssetRepository::new(db.clone()),
            activities: ActivityRepository::new(db.clone()),
            documents: DocumentRepository::new(db.clone()),
            db,
            store,
            audit,
        }
    }

    /// Scoped dashboard listing with optional name/serial search.
    pub async fn list(
        &self,
        actor: &ActorContext,
        filters: &AssetListFilters,
    ) -> Result<Vec<AssetResponse>, AppError> {
        let assets = self.assets.list(&actor.scope(), filters).await?;
        let today = Utc::now().date_naive();
        self.audit
            .record(Some(actor.user_id), AuditAction::ViewDashboard, None, None, None)
            .await;
        Ok(assets.into_iter().map(|a| AssetResponse::derive(a, today)).collect())
    }

    /// Dashboard summary: counts by status (locked statuses included as
    /// their own rows) plus active assets by type and province.
    pub async fn dashboard_summary(
        &self,
        actor: &ActorContext,
    ) -> Result<DashboardSummary, AppError> {
        let scope = actor.scope();
        Ok(DashboardSummary {
            status_counts: self.assets.status_counts(&scope).await?,
            type_counts: self.assets.type_counts(&scope).await?,
            province_counts: self.assets.province_counts(&scope).await?,
        })
    }

    /// Load one asset inside the actor's scope.
    async fn load_scoped(
        &self,
        actor: &ActorContext,
        id: Uuid,
        access: ScopedAccess,
    ) -> Result<Asset, AppError> {
        let asset = self.assets.get(id).await?.ok_or(AppError::NotFound)?;
        check_asset_scope(
            &actor.scope(),
            asset.province.as_deref(),
            asset.district.as_deref(),
            access,
        )?;
        Ok(asset)
    }

    pub async fn get(
        &self,
        actor: &ActorContext,
        id: Uuid,
    ) -> Result<(AssetResponse, Vec<AssetActivity>, Vec<AssetDocument>), AppError> {
        let asset = self.load_scoped(actor, id, ScopedAccess::Read).await?;
        let activity = self.activities.list_for_asset(id).await?;
        let documents = self.documents.list_for_asset(id).await?;
        self.audit
            .record_asset(actor.user_id, AuditAction::ViewAsset, id, None)
            .await;
        Ok((
            AssetResponse::derive(asset, Utc::now().date_naive()),
            activity,
            documents,
        ))
    }

    pub async fn create(
        &self,
        actor: &ActorContext,
        req: &CreateAssetRequest,
    ) -> Result<Outcome<AssetResponse>, AppError> {
        let serial_taken = match req.serial_number.trim() {
            "" => false,
            serial => self.assets.serial_exists(serial).await?,
        };
        let outcome = lifecycle::plan_create(req, actor, serial_taken)?;
        let draft = outcome.value;

        let mut tx = self.db.begin().await?;
        let asset = self
            .assets
            .insert(&mut tx, &draft, Utc::now().date_naive(), actor.user_id)
            .await?;

        let mut rows = vec![lifecycle::creation_activity(&draft)];
        for (doc_type, upload) in &draft.documents {
            let upload_row = self
                .store_document(&mut tx, asset.id, actor.user_id, *doc_type, upload)
                .await?;
            rows.push(upload_row);
        }
        self.activities
            .insert_all(&mut tx, asset.id, actor.user_id, &rows)
            .await?;
        tx.commit().await?;

        info!(asset_id = %asset.id, serial = %asset.serial_number, "Asset registered");
        self.audit
            .record_asset(actor.user_id, AuditAction::AssetCreate, asset.id, Some(&asset.serial_number))
            .await;

        Ok(Outcome {
            value: AssetResponse::derive(asset, Utc::now().date_naive()),
            warnings: outcome.warnings,
        })
    }

    pub async fn update(
        &self,
        actor: &ActorContext,
        id: Uuid,
        req: &UpdateAssetRequest,
    ) -> Result<Outcome<AssetResponse>, AppError> {
        let asset = self.load_scoped(actor, id, ScopedAccess::Write).await?;
        let has_loss_evidence = self
            .documents
            .has_doc_of_type(id, DocumentType::LossEvidence.as_str())
            .await?;
        let plan = lifecycle::plan_update(&asset, req, actor, has_loss_evidence)?;

        let mut tx = self.db.begin().await?;
        let updated = self
            .assets
            .apply_update(
                &mut tx,
                id,
                plan.status.as_str(),
                &plan.province,
                &plan.district,
                &plan.assigned_to,
                &plan.os_name,
                &plan.antivirus_name,
                plan.antivirus_license_date,
                &plan.office_name,
                plan.office_license_date,
                plan.inspected_by_ict,
                plan.inspection_date,
            )
            .await?;

        let mut rows = plan.activities.clone();
        for (doc_type, upload) in &plan.documents {
            let upload_row = self
                .store_document(&mut tx, id, actor.user_id, *doc_type, upload)
                .await?;
            rows.push(upload_row);
        }
        self.activities
            .insert_all(&mut tx, id, actor.user_id, &rows)
            .await?;
        tx.commit().await?;

        let changed = plan.activities.len();
        self.audit
            .record_asset(
                actor.user_id,
                AuditAction::AssetUpdate,
                id,
                Some(&format!("{} field(s) changed", changed)),
            )
            .await;

        Ok(Outcome {
            value: AssetResponse::derive(updated, Utc::now().date_naive()),
            warnings: plan.warnings,
        })
    }

    /// Archive an asset. Re-archiving is a no-op reported as a warning,
    /// not an error.
    pub async fn archive(
        &self,
        actor: &ActorContext,
        id: Uuid,
    ) -> Result<Outcome<AssetResponse>, AppError> {
        let asset = self.load_scoped(actor, id, ScopedAccess::Write).await?;
        let today = Utc::now().date_naive();

        match lifecycle::plan_archive(&asset, actor)? {
            ArchivePlan::AlreadyArchived => Ok(Outcome {
                value: AssetResponse::derive(asset, today),
                warnings: vec!["Asset is already archived".to_string()],
            }),
            ArchivePlan::Archive { old_status, activities, .. } => {
                let mut tx = self.db.begin().await?;
                let archived = self.assets.set_archived(&mut tx, id).await?;
                self.activities
                    .insert_all(&mut tx, id, actor.user_id, &activities)
                    .await?;
                tx.commit().await?;

                info!(asset_id = %id, from = %old_status, "Asset archived");
                self.audit
                    .record_asset(actor.user_id, AuditAction::AssetArchive, id, Some(&old_status))
                    .await;

                Ok(Outcome::clean(AssetResponse::derive(archived, today)))
            }
        }
    }

    /// Fetch a document's metadata and bytes, scope-checked through its
    /// asset.
    pub async fn download_document(
        &self,
        actor: &ActorContext,
        document_id: Uuid,
    ) -> Result<(AssetDocument, Vec<u8>), AppError> {
        let doc = self
            .documents
            .get(document_id)
            .await?
            .ok_or(AppError::NotFound)?;
        self.load_scoped(actor, doc.asset_id, ScopedAccess::Read).await?;
        let bytes = self.store.load(&doc.stored_filename).await?;
        Ok((doc, bytes))
    }

    /// Write the file, record its row, and return the ledger row noting
    /// the upload.
    async fn store_document(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        asset_id: Uuid,
        actor_id: Uuid,
        doc_type: DocumentType,
        upload: &DocumentUpload,
    ) -> Result<ActivityDraft, AppError> {
        let stored_name = self.store.store(asset_id, upload).await?;
        self.documents
            .insert(
                tx,
                asset_id,
                actor_id,
                doc_type.as_str(),
                &upload.file_name,
                &stored_name,
            )
            .await?;
        Ok(ActivityDraft::new(
            ActivityAction::UploadDocument,
            doc_type.as_str(),
            "",
            upload.file_name.clone(),
        ))
    }
}
