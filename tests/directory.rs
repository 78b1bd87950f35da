mod common;

use common::{create_test_db, jane, starter};
use staffpilot::model::department::Department;
use staffpilot::service::{
    self,
    directory::{self, EmployeeQuery},
    employment::{EmployeeUpdate, UpdateEmployeeRequest},
};

#[actix_web::test]
async fn list_includes_history_newest_first() {
    let pool = create_test_db().await;
    let jane = service::onboard(&pool, jane()).await.unwrap();

    for title in ["Senior Analyst", "Lead Analyst"] {
        let update = EmployeeUpdate::try_from(UpdateEmployeeRequest {
            job_title: Some(title.into()),
            ..Default::default()
        })
        .unwrap();
        service::update_employee(&pool, &jane.employee.id, update)
            .await
            .unwrap();
    }

    let page = service::list_employees(&pool, &EmployeeQuery::default()).await.unwrap();
    assert_eq!(page.total, 1);
    assert_eq!(page.page, 1);
    assert_eq!(page.per_page, 20);

    let titles: Vec<&str> = page.data[0]
        .records
        .iter()
        .map(|r| r.job_title.as_str())
        .collect();
    assert_eq!(titles, vec!["Lead Analyst", "Senior Analyst", "Analyst"]);
    assert_eq!(page.data[0].active_record().unwrap().job_title, "Lead Analyst");
    assert_eq!(page.data[0].active_record().unwrap().department, Department::Finance);
}

#[actix_web::test]
async fn pagination_and_search() {
    let pool = create_test_db().await;
    service::onboard(&pool, jane()).await.unwrap();
    for (email, first, last) in [
        ("sam@company.co.uk", "Sam", "Smith"),
        ("priya@company.co.uk", "Priya", "Patel"),
        ("john@company.co.uk", "John", "Doe"),
    ] {
        service::onboard(&pool, starter(email, first, last)).await.unwrap();
    }

    let first_page = service::list_employees(
        &pool,
        &EmployeeQuery {
            page: Some(1),
            per_page: Some(3),
            search: None,
        },
    )
    .await
    .unwrap();
    assert_eq!(first_page.total, 4);
    assert_eq!(first_page.data.len(), 3);

    let second_page = service::list_employees(
        &pool,
        &EmployeeQuery {
            page: Some(2),
            per_page: Some(3),
            search: None,
        },
    )
    .await
    .unwrap();
    assert_eq!(second_page.data.len(), 1);
    assert!(
        first_page
            .data
            .iter()
            .all(|p| p.employee.id != second_page.data[0].employee.id)
    );

    let does = service::list_employees(
        &pool,
        &EmployeeQuery {
            search: Some("DOE".into()),
            ..Default::default()
        },
    )
    .await
    .unwrap();
    assert_eq!(does.total, 2);
    assert!(does.data.iter().all(|p| p.employee.last_name == "Doe"));
    assert!(does.data.iter().all(|p| p.records.len() == 1));

    let by_email = service::list_employees(
        &pool,
        &EmployeeQuery {
            search: Some("priya@".into()),
            ..Default::default()
        },
    )
    .await
    .unwrap();
    assert_eq!(by_email.total, 1);
    assert_eq!(by_email.data[0].employee.first_name, "Priya");
}

#[actix_web::test]
async fn oversized_page_is_clamped() {
    let pool = create_test_db().await;
    service::onboard(&pool, jane()).await.unwrap();

    let page = service::list_employees(
        &pool,
        &EmployeeQuery {
            page: Some(0),
            per_page: Some(10_000),
            search: None,
        },
    )
    .await
    .unwrap();

    assert_eq!(page.page, 1);
    assert_eq!(page.per_page, 100);
    assert_eq!(page.data.len(), 1);
}

#[actix_web::test]
async fn profile_is_found_by_owning_login() {
    let pool = create_test_db().await;
    let jane = service::onboard(&pool, jane()).await.unwrap();

    let found = directory::find_by_user(&pool, &jane.employee.user_id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(found.employee.id, jane.employee.id);

    assert!(directory::find_by_user(&pool, "no-such-user").await.unwrap().is_none());
}

#[actix_web::test]
async fn nullable_columns_read_back() {
    let pool = create_test_db().await;

    // No date of birth, second address line, emergency contact or end date.
    let bare = service::onboard(&pool, starter("sam@company.co.uk", "Sam", "Smith"))
        .await
        .unwrap();
    let stored = service::get_employee(&pool, &bare.employee.id).await.unwrap();
    assert_eq!(stored.employee.ni_number, None);
    assert_eq!(stored.employee.date_of_birth, None);
    assert_eq!(stored.employee.address_line2, None);
    assert_eq!(stored.employee.emergency_contact_name, None);
    assert_eq!(stored.employee.emergency_contact_phone, None);
    assert_eq!(stored.records[0].end_date, None);
    assert_eq!(stored, bare);

    let mut full = jane();
    full.date_of_birth = chrono::NaiveDate::from_ymd_opt(1990, 4, 12);
    full.address_line2 = Some("Flat 2".into());
    full.emergency_contact_name = Some("John Doe".into());
    full.emergency_contact_phone = Some("+447700900123".into());
    let full = service::onboard(&pool, full).await.unwrap();

    let stored = service::get_employee(&pool, &full.employee.id).await.unwrap();
    assert_eq!(stored.employee.date_of_birth, chrono::NaiveDate::from_ymd_opt(1990, 4, 12));
    assert_eq!(stored.employee.address_line2.as_deref(), Some("Flat 2"));
    assert_eq!(stored.employee.emergency_contact_phone.as_deref(), Some("+447700900123"));
    assert_eq!(stored, full);
}
