//! Lifecycle flow tests
//!
//! Walk a single asset through a realistic life: registration, assignment,
//! loss, recovery and archival, checking the ledger rows and the
//! assignment invariant at every step.

use chrono::NaiveDate;
use ict_inventory::{
    models::{
        activity::{ActivityAction, DocumentUpload},
        asset::{Asset, AssetStatus, CreateAssetRequest, UpdateAssetRequest},
        user::Role,
    },
    services::{
        access_scope::ActorContext,
        lifecycle::{self, assignment_invariant_holds, ArchivePlan},
        report_service::describe_movement,
    },
};
use uuid::Uuid;

fn it_actor() -> ActorContext {
    ActorContext {
        user_id: Uuid::new_v4(),
        username: "itadmin".to_string(),
        role: Role::It,
        province: Some("Head Office".to_string()),
        district: None,
    }
}

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn upload(name: &str) -> DocumentUpload {
    DocumentUpload {
        file_name: name.to_string(),
        content: "cGRmIGJ5dGVz".to_string(),
    }
}

/// Materialize a draft into a stored row, the way the insert would.
fn asset_from_plan(status: &str, assigned_to: Option<&str>) -> Asset {
    Asset {
        id: Uuid::new_v4(),
        name: "HP ProBook".to_string(),
        asset_type: "Laptop".to_string(),
        serial_number: "SN-2000".to_string(),
        purchase_date: Some(date(2025, 3, 1)),
        assigned_to: assigned_to.map(|s| s.to_string()),
        supplier: Some("TelOne".to_string()),
        status: status.to_string(),
        acquisition_type: Some("Purchased".to_string()),
        donor_name: None,
        capture_date: Some(date(2025, 3, 2)),
        antivirus_name: None,
        antivirus_license_date: None,
        office_name: None,
        office_license_date: None,
        os_name: None,
        province: Some("Harare".to_string()),
        district: Some("Harare District".to_string()),
        inspected_by_ict: false,
        inspection_date: None,
        created_by: None,
        created_at: chrono::Utc::now(),
        updated_at: chrono::Utc::now(),
    }
}

#[test]
fn test_full_life_of_a_purchased_laptop() {
    let actor = it_actor();

    // 1. Registration into stock.
    let create = CreateAssetRequest {
        name: "HP ProBook".to_string(),
        asset_type: "Laptop".to_string(),
        serial_number: "SN-2000".to_string(),
        purchase_date: Some(date(2025, 3, 1)),
        acquisition_type: Some("Purchased".to_string()),
        supplier: Some("TelOne".to_string()),
        specification_document: Some(upload("procurement_spec.pdf")),
        status: "In Stock".to_string(),
        province: Some("Harare".to_string()),
        district: Some("Harare District".to_string()),
        ..Default::default()
    };
    let draft = lifecycle::plan_create(&create, &actor, false).unwrap().value;
    assert_eq!(draft.status, AssetStatus::InStock);
    assert!(assignment_invariant_holds(draft.status, draft.assigned_to.as_deref()));

    // 2. Assignment to an officer.
    let asset = asset_from_plan("In Stock", None);
    let assign = UpdateAssetRequest {
        status: Some("In Use".to_string()),
        assigned_to: Some("T. Moyo".to_string()),
        ..Default::default()
    };
    let plan = lifecycle::plan_update(&asset, &assign, &actor, false).unwrap();
    assert_eq!(plan.status, AssetStatus::InUse);
    assert!(assignment_invariant_holds(plan.status, plan.assigned_to.as_deref()));
    let narrated: Vec<String> = plan
        .activities
        .iter()
        .map(|a| describe_movement(a.action.as_str(), &a.field, &a.old_value, &a.new_value))
        .collect();
    assert!(narrated.contains(&"Status changed from In Stock to In Use".to_string()));
    assert!(narrated.contains(&"Assigned to set to T. Moyo".to_string()));

    // 3. The laptop is stolen; evidence is mandatory and the assignment
    //    clears because the asset is no longer in use.
    let asset = asset_from_plan("In Use", Some("T. Moyo"));
    let report_lost = UpdateAssetRequest {
        status: Some("Lost / Stolen".to_string()),
        ..Default::default()
    };
    assert!(lifecycle::plan_update(&asset, &report_lost, &actor, false).is_err());

    let report_lost = UpdateAssetRequest {
        status: Some("Lost / Stolen".to_string()),
        loss_evidence: Some(upload("police_report.pdf")),
        ..Default::default()
    };
    let plan = lifecycle::plan_update(&asset, &report_lost, &actor, false).unwrap();
    assert_eq!(plan.assigned_to, None);
    assert!(plan
        .warnings
        .contains(&"Assigned To was cleared because the asset is not In Use".to_string()));
    let narrated: Vec<String> = plan
        .activities
        .iter()
        .map(|a| describe_movement(a.action.as_str(), &a.field, &a.old_value, &a.new_value))
        .collect();
    assert!(narrated.contains(&"Assignment cleared from T. Moyo".to_string()));

    // 4. Recovery back into stock needs a note; the note lands in the
    //    ledger verbatim.
    let asset = asset_from_plan("Lost / Stolen", None);
    let recover = UpdateAssetRequest {
        status: Some("In Stock".to_string()),
        recovery_note: Some("Recovered at the central police station".to_string()),
        ..Default::default()
    };
    let plan = lifecycle::plan_update(&asset, &recover, &actor, true).unwrap();
    assert!(plan
        .activities
        .iter()
        .any(|a| a.action == ActivityAction::Recover
            && a.new_value == "Recovered at the central police station"));

    // 5. End of the road: archived, then auctioned, then nothing.
    let asset = asset_from_plan("In Stock", None);
    let plan = lifecycle::plan_archive(&asset, &actor).unwrap();
    assert!(matches!(plan, ArchivePlan::Archive { .. }));

    let archived = asset_from_plan("Archived", None);
    let auction = UpdateAssetRequest {
        status: Some("Auctioned".to_string()),
        ..Default::default()
    };
    let plan = lifecycle::plan_update(&archived, &auction, &actor, false).unwrap();
    assert_eq!(plan.status, AssetStatus::Auctioned);

    let auctioned = asset_from_plan("Auctioned", None);
    let revive = UpdateAssetRequest {
        status: Some("In Stock".to_string()),
        ..Default::default()
    };
    assert!(lifecycle::plan_update(&auctioned, &revive, &actor, false).is_err());
    assert!(lifecycle::plan_archive(&auctioned, &actor).is_err());
}

#[test]
fn test_district_admin_cannot_move_or_archive() {
    let admin = ActorContext {
        user_id: Uuid::new_v4(),
        username: "hredistrict".to_string(),
        role: Role::AdminDistrict,
        province: Some("Harare".to_string()),
        district: Some("Harare District".to_string()),
    };

    let asset = asset_from_plan("In Stock", None);
    let relocate = UpdateAssetRequest {
        province: Some("Bulawayo".to_string()),
        district: Some("Bulawayo District".to_string()),
        ..Default::default()
    };
    let plan = lifecycle::plan_update(&asset, &relocate, &admin, false).unwrap();
    // location snaps back to the admin's own jurisdiction
    assert_eq!(plan.province.as_deref(), Some("Harare"));
    assert_eq!(plan.district.as_deref(), Some("Harare District"));
    assert!(plan
        .warnings
        .contains(&"You have no right to relocate an asset to another district".to_string()));

    assert!(matches!(
        lifecycle::plan_archive(&asset, &admin),
        Err(ict_inventory::error::AppError::Forbidden)
    ));
}

#[test]
fn test_out_of_scope_asset_hidden_on_read_refused_on_write() {
    use ict_inventory::error::AppError;
    use ict_inventory::services::asset_service::{check_asset_scope, ScopedAccess};

    let admin = ActorContext {
        user_id: Uuid::new_v4(),
        username: "hredistrict".to_string(),
        role: Role::AdminDistrict,
        province: Some("Harare".to_string()),
        district: Some("Harare District".to_string()),
    };
    let scope = admin.scope();

    // Reads keep out-of-scope assets indistinguishable from missing ones.
    assert!(matches!(
        check_asset_scope(
            &scope,
            Some("Bulawayo"),
            Some("Bulawayo District"),
            ScopedAccess::Read
        ),
        Err(AppError::NotFound)
    ));
    // Writes are refused outright, never hidden.
    assert!(matches!(
        check_asset_scope(
            &scope,
            Some("Bulawayo"),
            Some("Bulawayo District"),
            ScopedAccess::Write
        ),
        Err(AppError::Forbidden)
    ));
    // Inside the jurisdiction both pass.
    assert!(check_asset_scope(
        &scope,
        Some("Harare"),
        Some("Harare District"),
        ScopedAccess::Write
    )
    .is_ok());
}

#[test]
fn test_broken_repair_cycle_keeps_ledger_order() {
    let actor = it_actor();
    let asset = asset_from_plan("In Use", Some("T. Moyo"));

    let breakdown = UpdateAssetRequest {
        status: Some("Broken".to_string()),
        ..Default::default()
    };
    let plan = lifecycle::plan_update(&asset, &breakdown, &actor, false).unwrap();
    assert!(assignment_invariant_holds(plan.status, plan.assigned_to.as_deref()));

    let broken = asset_from_plan("Broken", None);
    let repair = UpdateAssetRequest {
        status: Some("In Use".to_string()),
        assigned_to: Some("T. Moyo".to_string()),
        repair_note: Some("New motherboard fitted".to_string()),
        ..Default::default()
    };
    let plan = lifecycle::plan_update(&broken, &repair, &actor, false).unwrap();
    // field rows come first, the repair note row last
    let last = plan.activities.last().unwrap();
    assert_eq!(last.action, ActivityAction::Repair);
    assert_eq!(last.new_value, "New motherboard fitted");
}
