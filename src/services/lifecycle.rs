//! Asset lifecycle engine rules
//!
//! Pure planning functions for create, update and archive. Each one takes
//! the submitted request plus the acting user's context and either returns
//! a plan (the values to persist, the ledger rows to append, the documents
//! to store, and any advisory warnings) or the full list of rule
//! violations. No I/O happens here; `asset_service` executes plans inside
//! a single transaction.

use crate::{
    error::AppError,
    locations::HEAD_OFFICE,
    models::{
        activity::{ActivityAction, ActivityDraft, DocumentType, DocumentUpload},
        asset::{AcquisitionType, Asset, AssetStatus, CreateAssetRequest, UpdateAssetRequest},
        user::Role,
    },
    services::access_scope::ActorContext,
};
use chrono::NaiveDate;

/// A committed result plus the advisory notices produced while computing
/// it. Silently-coerced changes (immutable-field edits, jurisdiction
/// overrides, auto-cleared assignment) surface here instead of failing the
/// mutation.
#[derive(Debug)]
pub struct Outcome<T> {
    pub value: T,
    pub warnings: Vec<String>,
}

impl<T> Outcome<T> {
    pub fn clean(value: T) -> Self {
        Outcome { value, warnings: Vec::new() }
    }
}

fn trimmed(value: &str) -> Option<String> {
    let t = value.trim();
    if t.is_empty() {
        None
    } else {
        Some(t.to_string())
    }
}

fn opt_trimmed(value: &Option<String>) -> Option<String> {
    value.as_deref().and_then(trimmed)
}

// ---------------------------------------------------------------------------
// Create
// ---------------------------------------------------------------------------

/// Validated field values for a new asset, ready to insert.
#[derive(Debug)]
pub struct AssetDraft {
    pub name: String,
    pub asset_type: String,
    pub serial_number: String,
    pub purchase_date: NaiveDate,
    pub acquisition_type: AcquisitionType,
    pub donor_name: Option<String>,
    pub supplier: Option<String>,
    pub assigned_to: Option<String>,
    pub status: AssetStatus,
    pub antivirus_name: Option<String>,
    pub antivirus_license_date: Option<NaiveDate>,
    pub office_name: Option<String>,
    pub office_license_date: Option<NaiveDate>,
    pub os_name: Option<String>,
    pub province: String,
    pub district: Option<String>,
    pub inspected_by_ict: bool,
    pub inspection_date: Option<NaiveDate>,
    /// Documents to store alongside the insert, in upload order.
    pub documents: Vec<(DocumentType, DocumentUpload)>,
}

/// The ledger row recorded at registration. Its field is empty so
/// registrations never surface in the movement report, which selects on
/// the movement field set.
pub fn creation_activity(draft: &AssetDraft) -> ActivityDraft {
    ActivityDraft::new(ActivityAction::Create, "", "", draft.status.as_str())
}

/// Validate a creation request. Every violation accumulates; nothing is
/// applied unless the whole list is empty.
pub fn plan_create(
    req: &CreateAssetRequest,
    actor: &ActorContext,
    serial_taken: bool,
) -> Result<Outcome<AssetDraft>, AppError> {
    if !actor.role.can_edit_assets() {
        return Err(AppError::Forbidden);
    }

    let mut errors = Vec::new();

    let name = trimmed(&req.name);
    let asset_type = trimmed(&req.asset_type);
    let serial_number = trimmed(&req.serial_number);
    let donor_name = opt_trimmed(&req.donor_name);
    let supplier = opt_trimmed(&req.supplier);
    let mut assigned_to = opt_trimmed(&req.assigned_to);

    // Software and inspection fields are accepted from IT only; everyone
    // else has them silently discarded.
    let (antivirus_name, antivirus_license_date, office_name, office_license_date, os_name) =
        if actor.is_it() {
            (
                opt_trimmed(&req.antivirus_name),
                req.antivirus_license_date,
                opt_trimmed(&req.office_name),
                req.office_license_date,
                opt_trimmed(&req.os_name),
            )
        } else {
            (None, None, None, None, None)
        };
    let inspected_by_ict = actor.is_it() && req.inspected_by_ict;
    let inspection_date = if inspected_by_ict { req.inspection_date } else { None };

    // Non-IT actors can only place assets inside their own jurisdiction;
    // submitted locations are silently overridden, not rejected.
    let mut province = opt_trimmed(&req.province);
    let mut district = opt_trimmed(&req.district);
    if !actor.is_it() {
        if let Some(p) = actor.province.as_deref().and_then(trimmed) {
            if p != HEAD_OFFICE {
                province = Some(p);
            }
        }
        if actor.role == Role::AdminDistrict {
            if let Some(d) = actor.district.as_deref().and_then(trimmed) {
                district = Some(d);
            }
        }
    }

    if name.is_none() {
        errors.push("Asset name is required".to_string());
    }
    if asset_type.is_none() {
        errors.push("Asset type is required".to_string());
    }
    match &serial_number {
        None => errors.push("Serial number is required".to_string()),
        Some(_) if serial_taken => errors.push("Serial number already exists".to_string()),
        Some(_) => {}
    }
    if req.purchase_date.is_none() {
        errors.push("Purchase date is required".to_string());
    }

    let acquisition_type = match opt_trimmed(&req.acquisition_type) {
        None => {
            errors.push("Acquisition Type is required".to_string());
            None
        }
        Some(value) => match AcquisitionType::parse(&value) {
            Some(at) => Some(at),
            None => {
                errors.push("Invalid Acquisition Type selected".to_string());
                None
            }
        },
    };
    match acquisition_type {
        Some(AcquisitionType::Purchased) => {
            if supplier.is_none() {
                errors.push("Supplier is required for purchased assets".to_string());
            }
            if req.specification_document.is_none() {
                errors.push(
                    "Procurement specification document is required for purchased assets"
                        .to_string(),
                );
            }
        }
        Some(AcquisitionType::Donated) => {
            if donor_name.is_none() {
                errors.push("Donor Name is required for donated assets".to_string());
            }
        }
        None => {}
    }

    let status = match AssetStatus::parse(&req.status) {
        Some(s) => Some(s),
        None => {
            errors.push("Invalid status selected".to_string());
            None
        }
    };
    if status == Some(AssetStatus::InUse) && assigned_to.is_none() {
        errors.push("Assigned To is required when status is In Use".to_string());
    }
    if status != Some(AssetStatus::InUse) {
        // Assignment only exists while the asset is in use.
        assigned_to = None;
    }
    if status == Some(AssetStatus::LostStolen) && req.loss_evidence.is_none() {
        errors.push(
            "Police report / evidence document is required for Lost / Stolen assets".to_string(),
        );
    }

    if inspected_by_ict {
        if inspection_date.is_none() {
            errors.push("Inspection date is required when marking inspected".to_string());
        }
        if req.inspection_document.is_none() {
            errors.push("Inspection document is required when marking inspected".to_string());
        }
    }

    match &province {
        None => errors.push("Province is required".to_string()),
        Some(p) if p != HEAD_OFFICE && district.is_none() => {
            errors.push("District is required for the selected province".to_string());
        }
        Some(_) => {}
    }

    if !errors.is_empty() {
        return Err(AppError::Validation(errors));
    }

    let mut documents = Vec::new();
    if let Some(doc) = &req.loss_evidence {
        documents.push((DocumentType::LossEvidence, doc.clone()));
    }
    if let Some(doc) = &req.specification_document {
        documents.push((DocumentType::Specification, doc.clone()));
    }
    if inspected_by_ict {
        if let Some(doc) = &req.inspection_document {
            documents.push((DocumentType::Inspection, doc.clone()));
        }
    }

    // Unwraps are safe: each required field pushed an error above.
    Ok(Outcome::clean(AssetDraft {
        name: name.unwrap(),
        asset_type: asset_type.unwrap(),
        serial_number: serial_number.unwrap(),
        purchase_date: req.purchase_date.unwrap(),
        acquisition_type: acquisition_type.unwrap(),
        donor_name,
        supplier,
        assigned_to,
        status: status.unwrap(),
        antivirus_name,
        antivirus_license_date,
        office_name,
        office_license_date,
        os_name,
        province: province.unwrap(),
        district,
        inspected_by_ict,
        inspection_date,
        documents,
    }))
}

// ---------------------------------------------------------------------------
// Update
// ---------------------------------------------------------------------------

/// The values an update will persist, plus the ledger rows it will append.
#[derive(Debug)]
pub struct UpdatePlan {
    pub status: AssetStatus,
    pub province: Option<String>,
    pub district: Option<String>,
    pub assigned_to: Option<String>,
    pub os_name: Option<String>,
    pub antivirus_name: Option<String>,
    pub antivirus_license_date: Option<NaiveDate>,
    pub office_name: Option<String>,
    pub office_license_date: Option<NaiveDate>,
    pub inspected_by_ict: bool,
    pub inspection_date: Option<NaiveDate>,
    pub activities: Vec<ActivityDraft>,
    pub documents: Vec<(DocumentType, DocumentUpload)>,
    pub warnings: Vec<String>,
}

fn merge_text(submitted: &Option<String>, current: &Option<String>) -> Option<String> {
    match submitted {
        None => current.clone(),
        Some(value) => trimmed(value),
    }
}

fn date_str(value: Option<NaiveDate>) -> String {
    value.map(|d| d.to_string()).unwrap_or_default()
}

/// Validate an update request against the current asset. Transition rules,
/// evidentiary requirements and field mutability all apply here; every
/// violation accumulates into one list.
pub fn plan_update(
    asset: &Asset,
    req: &UpdateAssetRequest,
    actor: &ActorContext,
    has_loss_evidence_on_file: bool,
) -> Result<UpdatePlan, AppError> {
    if !actor.role.can_edit_assets() {
        return Err(AppError::Forbidden);
    }

    let mut errors = Vec::new();
    let mut warnings = Vec::new();

    let current_status = asset.lifecycle_status();
    // Rows predating the closed status set render under their raw value.
    let current_status_label = current_status
        .map(|s| s.as_str().to_string())
        .unwrap_or_else(|| asset.status.trim().to_string());

    let posted_status = match &req.status {
        None => {
            if current_status.is_none() {
                // Legacy row with an unrecognized status and no replacement.
                errors.push("Invalid status selected".to_string());
            }
            current_status
        }
        Some(value) => match AssetStatus::parse(value) {
            Some(s) => Some(s),
            None => {
                errors.push("Invalid status selected".to_string());
                current_status
            }
        },
    };

    // Locked statuses admit exactly one transition: Archived -> Auctioned.
    if let Some(current) = current_status {
        if current.is_locked()
            && !(current == AssetStatus::Archived && posted_status == Some(AssetStatus::Auctioned))
            && posted_status != Some(current)
        {
            return Err(AppError::Validation(vec![
                "Archived or Auctioned assets cannot be reactivated".to_string(),
            ]));
        }
    }

    // Jurisdiction coercion mirrors creation: submitted locations outside
    // the actor's own are overridden, with a warning on relocation attempts.
    let mut province = merge_text(&req.province, &asset.province);
    let mut district = merge_text(&req.district, &asset.district);
    if !actor.is_it() {
        if let Some(p) = actor.province.as_deref().and_then(trimmed) {
            if p != HEAD_OFFICE {
                province = Some(p);
            }
        }
    }
    if actor.role == Role::AdminDistrict {
        if let Some(own) = actor.district.as_deref().and_then(trimmed) {
            if let Some(posted) = district.as_deref() {
                if posted != own {
                    warnings.push(
                        "You have no right to relocate an asset to another district".to_string(),
                    );
                }
            }
            district = Some(own);
        }
    }

    let mut assigned_to = merge_text(&req.assigned_to, &asset.assigned_to);

    // Evidence and note requirements per transition.
    let entering_lost = posted_status == Some(AssetStatus::LostStolen)
        && current_status != Some(AssetStatus::LostStolen);
    let leaving_lost = current_status == Some(AssetStatus::LostStolen)
        && posted_status != Some(AssetStatus::LostStolen);
    let leaving_broken = current_status == Some(AssetStatus::Broken)
        && matches!(posted_status, Some(AssetStatus::InStock) | Some(AssetStatus::InUse));

    if entering_lost && req.loss_evidence.is_none() && !has_loss_evidence_on_file {
        errors.push(
            "Police report / evidence document is required for Lost / Stolen assets".to_string(),
        );
    }
    let recovery_note = opt_trimmed(&req.recovery_note);
    if leaving_lost && recovery_note.is_none() {
        errors.push(
            "Recovery notes are required when recovering a Lost / Stolen asset".to_string(),
        );
    }
    let repair_note = opt_trimmed(&req.repair_note);
    if leaving_broken && repair_note.is_none() {
        errors.push("Repair notes are required when marking a Broken asset as repaired".to_string());
    }

    if posted_status == Some(AssetStatus::InUse) && assigned_to.is_none() {
        errors.push("Assigned To is required when status is In Use".to_string());
    }
    if posted_status != Some(AssetStatus::InUse) && assigned_to.is_some() {
        assigned_to = None;
        if asset.assigned_to.is_some() || req.assigned_to.is_some() {
            warnings.push("Assigned To was cleared because the asset is not In Use".to_string());
        }
    }

    // Immutable fields: submitted changes are dropped, not rejected.
    let mut immutable_attempted = false;
    if let Some(submitted) = opt_trimmed(&req.name) {
        immutable_attempted |= submitted != asset.name;
    }
    if let Some(submitted) = opt_trimmed(&req.serial_number) {
        immutable_attempted |= submitted != asset.serial_number;
    }
    if let Some(submitted) = opt_trimmed(&req.supplier) {
        immutable_attempted |= Some(submitted) != asset.supplier.as_deref().and_then(trimmed);
    }
    if let Some(submitted) = opt_trimmed(&req.asset_type) {
        immutable_attempted |= submitted != asset.asset_type;
    }
    if let Some(submitted) = req.purchase_date {
        immutable_attempted |= asset.purchase_date.is_some_and(|d| d != submitted);
    }
    if immutable_attempted {
        warnings.push("Some fields are immutable and were not changed".to_string());
    }

    // Software fields change only at IT's hand; others keep current values.
    let (os_name, antivirus_name, antivirus_license_date, office_name, office_license_date) =
        if actor.is_it() {
            (
                merge_text(&req.os_name, &asset.os_name),
                merge_text(&req.antivirus_name, &asset.antivirus_name),
                req.antivirus_license_date.or(asset.antivirus_license_date),
                merge_text(&req.office_name, &asset.office_name),
                req.office_license_date.or(asset.office_license_date),
            )
        } else {
            (
                asset.os_name.clone(),
                asset.antivirus_name.clone(),
                asset.antivirus_license_date,
                asset.office_name.clone(),
                asset.office_license_date,
            )
        };

    // Inspection is set exactly once, by IT, with a date and a document.
    let mut inspected_by_ict = asset.inspected_by_ict;
    let mut inspection_date = asset.inspection_date;
    let mut inspection_document = None;
    if !asset.inspected_by_ict && asset.inspection_date.is_none() && req.inspected_by_ict {
        if actor.is_it() {
            if req.inspection_date.is_none() {
                errors.push("Inspection date is required when marking inspected".to_string());
            }
            if req.inspection_document.is_none() {
                errors.push("Inspection document is required when marking inspected".to_string());
            }
            if errors.is_empty() {
                inspected_by_ict = true;
                inspection_date = req.inspection_date;
                inspection_document = req.inspection_document.clone();
            }
        }
        // Non-IT attempts are silently ignored, matching creation.
    }

    if !errors.is_empty() {
        return Err(AppError::Validation(errors));
    }

    let Some(status) = posted_status else {
        return Err(AppError::Validation(vec!["Invalid status selected".to_string()]));
    };

    // One ledger row per actually-changed field; no-op edits produce none.
    let mut activities = Vec::new();
    let add_change =
        |action: ActivityAction, field: &str, old: String, new: String, list: &mut Vec<ActivityDraft>| {
            if old != new {
                list.push(ActivityDraft::new(action, field, old, new));
            }
        };

    let str_of = |v: &Option<String>| v.clone().unwrap_or_default();
    add_change(
        ActivityAction::Update,
        "province",
        str_of(&asset.province),
        str_of(&province),
        &mut activities,
    );
    add_change(
        ActivityAction::Update,
        "district",
        str_of(&asset.district),
        str_of(&district),
        &mut activities,
    );
    add_change(
        ActivityAction::Update,
        "assigned_to",
        str_of(&asset.assigned_to),
        str_of(&assigned_to),
        &mut activities,
    );
    add_change(
        ActivityAction::Status,
        "status",
        current_status_label,
        status.as_str().to_string(),
        &mut activities,
    );
    add_change(
        ActivityAction::Software,
        "os_name",
        str_of(&asset.os_name),
        str_of(&os_name),
        &mut activities,
    );
    add_change(
        ActivityAction::Software,
        "antivirus_name",
        str_of(&asset.antivirus_name),
        str_of(&antivirus_name),
        &mut activities,
    );
    add_change(
        ActivityAction::Software,
        "antivirus_license_date",
        date_str(asset.antivirus_license_date),
        date_str(antivirus_license_date),
        &mut activities,
    );
    add_change(
        ActivityAction::Software,
        "office_name",
        str_of(&asset.office_name),
        str_of(&office_name),
        &mut activities,
    );
    add_change(
        ActivityAction::Software,
        "office_license_date",
        date_str(asset.office_license_date),
        date_str(office_license_date),
        &mut activities,
    );
    add_change(
        ActivityAction::Inspection,
        "inspected_by_ict",
        if asset.inspected_by_ict { "Yes" } else { "No" }.to_string(),
        if inspected_by_ict { "Yes" } else { "No" }.to_string(),
        &mut activities,
    );
    add_change(
        ActivityAction::Inspection,
        "inspection_date",
        date_str(asset.inspection_date),
        date_str(inspection_date),
        &mut activities,
    );

    if leaving_broken {
        if let Some(note) = &repair_note {
            activities.push(ActivityDraft::new(ActivityAction::Repair, "note", "", note.clone()));
        }
    }
    if leaving_lost {
        if let Some(note) = &recovery_note {
            activities.push(ActivityDraft::new(ActivityAction::Recover, "note", "", note.clone()));
        }
    }

    let mut documents = Vec::new();
    if let Some(doc) = &req.loss_evidence {
        documents.push((DocumentType::LossEvidence, doc.clone()));
    }
    if let Some(doc) = inspection_document {
        documents.push((DocumentType::Inspection, doc));
    }

    Ok(UpdatePlan {
        status,
        province,
        district,
        assigned_to,
        os_name,
        antivirus_name,
        antivirus_license_date,
        office_name,
        office_license_date,
        inspected_by_ict,
        inspection_date,
        activities,
        documents,
        warnings,
    })
}

// ---------------------------------------------------------------------------
// Archive
// ---------------------------------------------------------------------------

/// Result of planning an archive ("delete") request.
#[derive(Debug)]
pub enum ArchivePlan {
    /// Re-archiving is informational, not an error.
    AlreadyArchived,
    Archive {
        old_status: String,
        cleared_assignment: Option<String>,
        activities: Vec<ActivityDraft>,
    },
}

/// Archival is the only deletion the system has. AdminDistrict may not
/// archive; Auctioned assets are locked and stay Auctioned.
pub fn plan_archive(asset: &Asset, actor: &ActorContext) -> Result<ArchivePlan, AppError> {
    if !actor.role.can_edit_assets() || actor.role == Role::AdminDistrict {
        return Err(AppError::Forbidden);
    }

    match asset.lifecycle_status() {
        Some(AssetStatus::Archived) => return Ok(ArchivePlan::AlreadyArchived),
        Some(AssetStatus::Auctioned) => {
            return Err(AppError::Validation(vec![
                "Auctioned assets cannot be archived".to_string(),
            ]))
        }
        _ => {}
    }

    let old_status = asset.status.trim().to_string();
    let cleared_assignment = asset.assigned_to.as_deref().and_then(trimmed);

    let mut activities = vec![ActivityDraft::new(
        ActivityAction::Archive,
        "status",
        old_status.clone(),
        AssetStatus::Archived.as_str(),
    )];
    if let Some(assignee) = &cleared_assignment {
        activities.push(ActivityDraft::new(
            ActivityAction::Archive,
            "assigned_to",
            assignee.clone(),
            "",
        ));
    }

    Ok(ArchivePlan::Archive { old_status, cleared_assignment, activities })
}

/// The core assignment invariant: an asset carries an assignee exactly
/// while it is In Use.
pub fn assignment_invariant_holds(status: AssetStatus, assigned_to: Option<&str>) -> bool {
    let has_assignee = assigned_to.map(|s| !s.trim().is_empty()).unwrap_or(false);
    (status == AssetStatus::InUse) == has_assignee
}
