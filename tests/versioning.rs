mod common;

use chrono::{Duration, Utc};
use common::{count, create_test_db, fail_on, jane};
use staffpilot::model::department::Department;
use staffpilot::model::employee::EmployeeProfile;
use staffpilot::model::employment_record::{EmploymentRecord, PayBasis, active_record_of};
use staffpilot::service::{
    self,
    employment::{EmployeeUpdate, UpdateEmployeeRequest},
};
use sqlx::AnyPool;

async fn update(
    pool: &AnyPool,
    employee_id: &str,
    req: UpdateEmployeeRequest,
) -> Result<EmployeeProfile, staffpilot::error::ServiceError> {
    let update = EmployeeUpdate::try_from(req)?;
    service::update_employee(pool, employee_id, update).await
}

fn open_records(records: &[EmploymentRecord]) -> usize {
    records.iter().filter(|r| r.end_date.is_none()).count()
}

#[actix_web::test]
async fn promotion_closes_old_record_and_opens_new_one() {
    let pool = create_test_db().await;
    let jane = service::onboard(&pool, jane()).await.unwrap();
    let id = jane.employee.id.as_str();
    let analyst = jane.active_record().unwrap().clone();

    let after = update(
        &pool,
        id,
        UpdateEmployeeRequest {
            job_title: Some("Senior Analyst".into()),
            ..Default::default()
        },
    )
    .await
    .unwrap();

    assert_eq!(after.records.len(), 2);
    assert_eq!(open_records(&after.records), 1);

    let senior = after.active_record().unwrap();
    assert_eq!(senior.job_title, "Senior Analyst");
    assert_eq!(senior.revision, 2);
    assert_eq!(senior.change_reason, "Employment Update");
    // Unsupplied job fields carry forward.
    assert_eq!(senior.department, Department::Finance);
    assert_eq!(senior.pay_amount, 30000.0);

    let old = after.records.iter().find(|r| r.id == analyst.id).unwrap();
    assert_eq!(old.job_title, "Analyst");
    let closed_at = old.end_date.expect("previous record closed");
    assert!(senior.start_date >= closed_at);

    // Most recent assignment first.
    assert_eq!(after.records[0].id, senior.id);
    assert_eq!(after.records[1].id, analyst.id);
}

#[actix_web::test]
async fn address_only_edit_does_not_touch_history() {
    let pool = create_test_db().await;
    let jane = service::onboard(&pool, jane()).await.unwrap();
    let id = jane.employee.id.as_str();
    let before = jane.active_record().unwrap().clone();

    let after = update(
        &pool,
        id,
        UpdateEmployeeRequest {
            first_name: Some("Janet".into()),
            address_line1: Some("2 Park Row".into()),
            ..Default::default()
        },
    )
    .await
    .unwrap();

    assert_eq!(after.employee.address_line1, "2 Park Row");
    assert_eq!(after.employee.first_name, "Janet");
    assert_eq!(after.employee.city, "Leeds");
    assert_eq!(after.records.len(), 1);
    assert_eq!(after.active_record(), Some(&before));
}

#[actix_web::test]
async fn exactly_one_open_record_after_any_sequence() {
    let pool = create_test_db().await;
    let jane = service::onboard(&pool, jane()).await.unwrap();
    let id = jane.employee.id.as_str();

    let steps = [
        UpdateEmployeeRequest {
            pay_amount: Some(31000.0),
            ..Default::default()
        },
        UpdateEmployeeRequest {
            city: Some("York".into()),
            ..Default::default()
        },
        UpdateEmployeeRequest {
            department: Some(Department::Operations),
            hours_per_week: Some(30.0),
            change_reason: Some("Transfer".into()),
            ..Default::default()
        },
        UpdateEmployeeRequest {
            job_title: Some("Team Lead".into()),
            pay_amount: Some(18.5),
            pay_basis: Some(PayBasis::Hourly),
            ..Default::default()
        },
    ];

    let mut expected_len = 1;
    for (i, req) in steps.into_iter().enumerate() {
        let versions = req.job_title.is_some() || req.department.is_some() || req.pay_amount.is_some();
        let profile = update(&pool, id, req).await.unwrap();
        if versions {
            expected_len += 1;
        }
        assert_eq!(profile.records.len(), expected_len, "step {i}");
        assert_eq!(open_records(&profile.records), 1, "step {i}");
    }

    let profile = service::get_employee(&pool, id).await.unwrap();
    let active = profile.active_record().unwrap();
    assert_eq!(active.job_title, "Team Lead");
    assert_eq!(active.department, Department::Operations);
    assert_eq!(active.pay_basis, PayBasis::Hourly);
    assert_eq!(active.hours_per_week, 30.0);
    assert_eq!(active.revision, 4);

    let revisions: Vec<i64> = profile.records.iter().map(|r| r.revision).collect();
    assert_eq!(revisions, vec![4, 3, 2, 1]);

    let transfer = profile.records.iter().find(|r| r.revision == 3).unwrap();
    assert_eq!(transfer.change_reason, "Transfer");
}

#[actix_web::test]
async fn closed_records_keep_their_terms() {
    let pool = create_test_db().await;
    let jane = service::onboard(&pool, jane()).await.unwrap();
    let id = jane.employee.id.as_str();
    let hired = jane.active_record().unwrap().clone();

    let promoted = update(
        &pool,
        id,
        UpdateEmployeeRequest {
            job_title: Some("Senior Analyst".into()),
            pay_amount: Some(35000.0),
            ..Default::default()
        },
    )
    .await
    .unwrap();
    let first_closed_at = promoted
        .records
        .iter()
        .find(|r| r.id == hired.id)
        .and_then(|r| r.end_date)
        .unwrap();

    let profile = update(
        &pool,
        id,
        UpdateEmployeeRequest {
            department: Some(Department::Technology),
            ..Default::default()
        },
    )
    .await
    .unwrap();

    let first = profile.records.iter().find(|r| r.id == hired.id).unwrap();
    assert_eq!(first.job_title, hired.job_title);
    assert_eq!(first.department, hired.department);
    assert_eq!(first.pay_amount, hired.pay_amount);
    assert_eq!(first.start_date, hired.start_date);
    // A later close leaves earlier end dates alone.
    assert_eq!(first.end_date, Some(first_closed_at));

    let second = profile.records.iter().find(|r| r.revision == 2).unwrap();
    assert_eq!(second.job_title, "Senior Analyst");
    assert_eq!(second.pay_amount, 35000.0);
    assert!(second.end_date.is_some());
}

#[actix_web::test]
async fn failed_insert_rolls_back_the_close() {
    let pool = create_test_db().await;
    let jane = service::onboard(&pool, jane()).await.unwrap();
    let id = jane.employee.id.as_str();
    fail_on(&pool, "INSERT", "employment_records").await;

    let err = update(
        &pool,
        id,
        UpdateEmployeeRequest {
            job_title: Some("Senior Analyst".into()),
            address_line1: Some("2 Park Row".into()),
            ..Default::default()
        },
    )
    .await
    .unwrap_err();

    assert_eq!(err.code(), "TRANSACTION_FAILURE");

    let profile = service::get_employee(&pool, id).await.unwrap();
    assert_eq!(profile.records.len(), 1);
    assert!(profile.records[0].end_date.is_none());
    assert_eq!(profile.employee.address_line1, "1 High Street");
}

#[actix_web::test]
async fn unknown_employee_is_not_found() {
    let pool = create_test_db().await;

    let err = update(
        &pool,
        "no-such-employee",
        UpdateEmployeeRequest {
            job_title: Some("Ghost".into()),
            ..Default::default()
        },
    )
    .await
    .unwrap_err();

    assert_eq!(err.code(), "NOT_FOUND");
    assert_eq!(
        count(&pool, "SELECT COUNT(*) FROM employment_records WHERE employee_id = ?", "no-such-employee").await,
        0
    );
}

#[actix_web::test]
async fn empty_or_partial_job_update_is_rejected() {
    let err = EmployeeUpdate::try_from(UpdateEmployeeRequest::default()).unwrap_err();
    assert_eq!(err.code(), "VALIDATION");

    let err = EmployeeUpdate::try_from(UpdateEmployeeRequest {
        change_reason: Some("Because".into()),
        ..Default::default()
    })
    .unwrap_err();
    assert_eq!(err.code(), "VALIDATION");

    let err = EmployeeUpdate::try_from(UpdateEmployeeRequest {
        pay_amount: Some(f64::NAN),
        ..Default::default()
    })
    .unwrap_err();
    assert_eq!(err.code(), "VALIDATION");
}

#[actix_web::test]
async fn versioning_heals_more_than_one_open_record() {
    let pool = create_test_db().await;
    let jane = service::onboard(&pool, jane()).await.unwrap();
    let id = jane.employee.id.as_str();

    // A stray second open row, as left behind by older data.
    let stray_start = Utc::now() - Duration::days(30);
    sqlx::query(
        r#"
        INSERT INTO employment_records
        (id, employee_id, revision, job_title, department, pay_amount,
         pay_basis, hours_per_week, start_date, end_date, change_reason)
        VALUES ('stray', ?, 7, 'Clerk', 'SALES', 1.0, 'HOURLY', 10.0, ?, NULL, 'Import')
        "#,
    )
    .bind(id)
    .bind(stray_start.timestamp_millis())
    .execute(&pool)
    .await
    .unwrap();

    let before = service::get_employee(&pool, id).await.unwrap();
    assert_eq!(open_records(&before.records), 2);
    // The newest open record wins, wherever it sits in the list.
    assert_eq!(before.active_record().unwrap().job_title, "Analyst");

    let after = update(
        &pool,
        id,
        UpdateEmployeeRequest {
            job_title: Some("Senior Analyst".into()),
            ..Default::default()
        },
    )
    .await
    .unwrap();

    assert_eq!(open_records(&after.records), 1);
    let active = active_record_of(&after.records).unwrap();
    assert_eq!(active.job_title, "Senior Analyst");
    assert_eq!(active.revision, 8);
    assert_eq!(active.department, Department::Finance);
}

#[actix_web::test]
async fn concurrent_revision_is_a_conflict() {
    let pool = create_test_db().await;
    let jane = service::onboard(&pool, jane()).await.unwrap();
    let id = jane.employee.id.as_str();

    // Another writer takes the next revision between our MAX(revision) read
    // and our insert: the moment our close step runs, it appends its own row.
    sqlx::query(
        r#"
        CREATE TRIGGER competing_writer AFTER UPDATE OF end_date ON employment_records
        WHEN NEW.end_date IS NOT NULL
        BEGIN
            INSERT INTO employment_records
            (id, employee_id, revision, job_title, department, pay_amount,
             pay_basis, hours_per_week, start_date, end_date, change_reason)
            VALUES (lower(hex(randomblob(16))), NEW.employee_id,
                    (SELECT MAX(revision) + 1 FROM employment_records WHERE employee_id = NEW.employee_id),
                    'Competing Title', 'SALES', 1.0, 'HOURLY', 10.0, NEW.end_date, NULL, 'Competing');
        END
        "#,
    )
    .execute(&pool)
    .await
    .unwrap();

    let err = update(
        &pool,
        id,
        UpdateEmployeeRequest {
            job_title: Some("Senior Analyst".into()),
            ..Default::default()
        },
    )
    .await
    .unwrap_err();

    assert_eq!(err.code(), "CONFLICT");

    sqlx::query("DROP TRIGGER competing_writer")
        .execute(&pool)
        .await
        .unwrap();
    let profile = service::get_employee(&pool, id).await.unwrap();
    assert_eq!(profile.records.len(), 1);
    assert_eq!(open_records(&profile.records), 1);
    assert_eq!(profile.active_record().unwrap().job_title, "Analyst");
}
