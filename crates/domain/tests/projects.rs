//! Project operations: defaults, the implicit client, filters, and client
//! propagation.

mod common;

use assert_matches::assert_matches;
use chrono::{Duration, SecondsFormat};
use common::{add_member, harness, t0};
use crm_core::error::CoreError;
use crm_core::filters::{ProjectFilter, ProjectQuery};
use crm_domain::DomainError;
use serde_json::json;
use sqlx::PgPool;

fn iso(ts: chrono::DateTime<chrono::Utc>) -> String {
    ts.to_rfc3339_opts(SecondsFormat::Millis, true)
}

// ---------------------------------------------------------------------------
// Create
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../db/migrations")]
async fn test_direct_project_without_client_creates_one(pool: PgPool) {
    let h = harness(pool);
    add_member(&h.service, "Alice").await;

    let contacted = t0() - Duration::days(1);
    let project = h
        .service
        .create_project(&json!({
            "name": "Acme Advisory",
            "status": "pending",
            "lastContacted": iso(contacted),
        }))
        .await
        .unwrap();

    assert_eq!(project.project_type, "direct");
    assert_eq!(project.has_invoice, "no");
    let client_id = project.client_id.expect("direct project gets a client");

    let client = h.service.get_client(client_id).await.unwrap();
    assert_eq!(client.client.name, "Acme Advisory");
    assert_eq!(client.client.status, "pending");
    assert_eq!(client.client.last_contacted, Some(contacted));
    assert_eq!(client.document_count, 0);
}

#[sqlx::test(migrations = "../db/migrations")]
async fn test_affiliate_project_gets_no_client(pool: PgPool) {
    let h = harness(pool);
    add_member(&h.service, "Alice").await;

    let project = h
        .service
        .create_project(&json!({
            "name": "Referral",
            "type": "affiliate",
            "affiliatePartner": "Northwind",
        }))
        .await
        .unwrap();
    assert_eq!(project.client_id, None);
    assert!(h.service.list_clients(None).await.unwrap().is_empty());
}

#[sqlx::test(migrations = "../db/migrations")]
async fn test_missing_assignee_falls_back_to_first_by_name(pool: PgPool) {
    let h = harness(pool);
    add_member(&h.service, "Zed").await;
    let amy = add_member(&h.service, "Amy").await;

    let project = h
        .service
        .create_project(&json!({ "name": "Acme" }))
        .await
        .unwrap();
    assert_eq!(project.assigned_to_id, amy);
}

#[sqlx::test(migrations = "../db/migrations")]
async fn test_create_without_team_members_fails_validation(pool: PgPool) {
    let h = harness(pool);
    let err = h
        .service
        .create_project(&json!({ "name": "Acme" }))
        .await
        .unwrap_err();
    assert_matches!(err, DomainError::Core(CoreError::Validation(_)));
    // The implicit client must not survive the failed create.
    assert!(h.service.list_clients(None).await.unwrap().is_empty());
}

#[sqlx::test(migrations = "../db/migrations")]
async fn test_invalid_last_contacted_stored_as_null(pool: PgPool) {
    let h = harness(pool);
    add_member(&h.service, "Alice").await;

    let project = h
        .service
        .create_project(&json!({ "name": "Acme", "lastContacted": "not a date" }))
        .await
        .unwrap();
    assert_eq!(project.last_contacted, None);
}

#[sqlx::test(migrations = "../db/migrations")]
async fn test_create_with_existing_client_advances_its_contact(pool: PgPool) {
    let h = harness(pool);
    add_member(&h.service, "Alice").await;
    let newer = t0() - Duration::days(1);
    let older = t0() - Duration::days(10);

    let client = h
        .service
        .create_client(&json!({ "name": "Globex", "lastContacted": iso(older) }))
        .await
        .unwrap();

    h.service
        .create_project(&json!({
            "name": "Globex Tax",
            "clientId": client.id,
            "lastContacted": iso(newer),
        }))
        .await
        .unwrap();
    let after = h.service.get_client(client.id).await.unwrap();
    assert_eq!(after.client.last_contacted, Some(newer));

    // An older contact on a second project does not move it back.
    h.service
        .create_project(&json!({
            "name": "Globex Audit",
            "clientId": client.id,
            "lastContacted": iso(older - Duration::days(5)),
        }))
        .await
        .unwrap();
    let after = h.service.get_client(client.id).await.unwrap();
    assert_eq!(after.client.last_contacted, Some(newer));
}

// ---------------------------------------------------------------------------
// Update
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../db/migrations")]
async fn test_update_propagates_monotonically(pool: PgPool) {
    let h = harness(pool);
    add_member(&h.service, "Alice").await;

    let d2 = t0() - Duration::days(2);
    let d5 = t0() - Duration::days(5);
    let d1 = t0() - Duration::days(1);

    let project = h
        .service
        .create_project(&json!({ "name": "Acme", "lastContacted": iso(d2) }))
        .await
        .unwrap();
    let client_id = project.client_id.unwrap();

    h.service
        .update_project(project.id, &json!({ "lastContacted": iso(d5) }))
        .await
        .unwrap();
    let client = h.service.get_client(client_id).await.unwrap();
    assert_eq!(client.client.last_contacted, Some(d2));

    h.service
        .update_project(project.id, &json!({ "lastContacted": iso(d1) }))
        .await
        .unwrap();
    let client = h.service.get_client(client_id).await.unwrap();
    assert_eq!(client.client.last_contacted, Some(d1));

    // Clearing the project's date leaves the client alone.
    let cleared = h
        .service
        .update_project(project.id, &json!({ "lastContacted": null }))
        .await
        .unwrap();
    assert_eq!(cleared.last_contacted, None);
    let client = h.service.get_client(client_id).await.unwrap();
    assert_eq!(client.client.last_contacted, Some(d1));
}

#[sqlx::test(migrations = "../db/migrations")]
async fn test_status_change_overwrites_client_status(pool: PgPool) {
    let h = harness(pool);
    add_member(&h.service, "Alice").await;

    let project = h
        .service
        .create_project(&json!({ "name": "Acme" }))
        .await
        .unwrap();
    let client_id = project.client_id.unwrap();

    h.service
        .update_project(project.id, &json!({ "status": "completed" }))
        .await
        .unwrap();
    assert_eq!(
        h.service.get_client(client_id).await.unwrap().client.status,
        "completed"
    );

    // The client may be edited directly; an unrelated project edit keeps it.
    h.service
        .update_client(client_id, &json!({ "status": "on-hold" }))
        .await
        .unwrap();
    h.service
        .update_project(project.id, &json!({ "phone": "555-0100" }))
        .await
        .unwrap();
    assert_eq!(
        h.service.get_client(client_id).await.unwrap().client.status,
        "on-hold"
    );
}

#[sqlx::test(migrations = "../db/migrations")]
async fn test_update_missing_project_is_not_found(pool: PgPool) {
    let h = harness(pool);
    let err = h
        .service
        .update_project(4242, &json!({ "name": "Ghost" }))
        .await
        .unwrap_err();
    assert_matches!(
        err,
        DomainError::Core(CoreError::NotFound { entity: "Project", id: 4242 })
    );
}

#[sqlx::test(migrations = "../db/migrations")]
async fn test_update_to_affiliate_requires_partner(pool: PgPool) {
    let h = harness(pool);
    add_member(&h.service, "Alice").await;
    let project = h
        .service
        .create_project(&json!({ "name": "Acme" }))
        .await
        .unwrap();

    let err = h
        .service
        .update_project(project.id, &json!({ "type": "affiliate" }))
        .await
        .unwrap_err();
    assert_matches!(err, DomainError::Core(CoreError::Validation(ref m)) if m.contains("affiliatePartner"));

    // The rejected update was rolled back.
    let stored = h.service.get_project(project.id).await.unwrap();
    assert_eq!(stored.project_type, "direct");
}

#[sqlx::test(migrations = "../db/migrations")]
async fn test_update_bumps_updated_at(pool: PgPool) {
    let h = harness(pool);
    add_member(&h.service, "Alice").await;
    let project = h
        .service
        .create_project(&json!({ "name": "Acme" }))
        .await
        .unwrap();

    let later = h.clock.advance(Duration::hours(3));
    let updated = h
        .service
        .update_project(project.id, &json!({ "hasInvoice": true }))
        .await
        .unwrap();
    assert_eq!(updated.has_invoice, "yes");
    assert_eq!(updated.created_at, t0());
    assert_eq!(updated.updated_at, later);
}

// ---------------------------------------------------------------------------
// Delete and list
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../db/migrations")]
async fn test_delete_project_keeps_client(pool: PgPool) {
    let h = harness(pool);
    add_member(&h.service, "Alice").await;
    let project = h
        .service
        .create_project(&json!({ "name": "Acme" }))
        .await
        .unwrap();

    h.service.delete_project(project.id).await.unwrap();
    h.service.delete_project(project.id).await.unwrap();

    assert_matches!(
        h.service.get_project(project.id).await,
        Err(DomainError::Core(CoreError::NotFound { .. }))
    );
    assert!(h.service.get_client(project.client_id.unwrap()).await.is_ok());
}

#[sqlx::test(migrations = "../db/migrations")]
async fn test_list_filters_and_buckets(pool: PgPool) {
    let h = harness(pool);
    let alice = add_member(&h.service, "Alice").await;
    let bob = add_member(&h.service, "Bob").await;

    // t0 is Wednesday; the week began Sunday the 12th.
    for (name, assignee, status, contacted) in [
        ("This week", alice, "active", Some(t0() - Duration::days(1))),
        ("Last month", alice, "active", Some(t0() - Duration::days(30))),
        ("Pending", alice, "pending", Some(t0())),
        ("Bob's", bob, "active", Some(t0())),
        ("Never", alice, "active", None),
    ] {
        h.clock.advance(Duration::seconds(1));
        h.service
            .create_project(&json!({
                "name": name,
                "assignedToId": assignee,
                "status": status,
                "lastContacted": contacted.map(iso),
            }))
            .await
            .unwrap();
    }
    h.clock.set(t0());

    let filter = ProjectFilter::try_from(ProjectQuery {
        status: Some("active".into()),
        assigned_to: Some(alice.to_string()),
        project_type: Some("all".into()),
        last_contacted: Some("week".into()),
    })
    .unwrap();
    let listed = h.service.list_projects(&filter).await.unwrap();
    let names: Vec<_> = listed.iter().map(|p| p.project.name.as_str()).collect();
    assert_eq!(names, vec!["This week"]);
    assert_eq!(listed[0].assigned_to.name, "Alice");

    let everything = h.service.list_projects(&ProjectFilter::default()).await.unwrap();
    let names: Vec<_> = everything.iter().map(|p| p.project.name.as_str()).collect();
    assert_eq!(names, vec!["Never", "Bob's", "Pending", "Last month", "This week"]);
}

#[sqlx::test(migrations = "../db/migrations")]
async fn test_status_and_assignee_filter_orders_matches_by_update(pool: PgPool) {
    let h = harness(pool);
    let alice = add_member(&h.service, "Alice").await;
    let bob = add_member(&h.service, "Bob").await;

    let mut ids = Vec::new();
    for (name, assignee, status) in [
        ("x1", alice, "active"),
        ("x2", bob, "active"),
        ("x3", alice, "pending"),
        ("x4", alice, "completed"),
        ("x5", alice, "active"),
        ("x6", bob, "on-hold"),
        ("x7", alice, "active"),
    ] {
        h.clock.advance(Duration::minutes(1));
        let project = h
            .service
            .create_project(&json!({ "name": name, "assignedToId": assignee, "status": status }))
            .await
            .unwrap();
        ids.push(project.id);
    }

    let alice_with_status = |status: &str| {
        ProjectFilter::try_from(ProjectQuery {
            status: Some(status.into()),
            assigned_to: Some(alice.to_string()),
            project_type: None,
            last_contacted: None,
        })
        .unwrap()
    };
    let names = |listed: Vec<crm_db::models::project::ProjectWithAssignee>| {
        listed.into_iter().map(|p| p.project.name).collect::<Vec<_>>()
    };

    let listed = h.service.list_projects(&alice_with_status("active")).await.unwrap();
    assert_eq!(names(listed), vec!["x7", "x5", "x1"]);

    // Touching x1 moves it ahead of the later-created matches.
    h.clock.advance(Duration::minutes(1));
    h.service
        .update_project(ids[0], &json!({ "phone": "555-0100" }))
        .await
        .unwrap();
    let listed = h.service.list_projects(&alice_with_status("active")).await.unwrap();
    assert_eq!(names(listed), vec!["x1", "x7", "x5"]);

    let listed = h.service.list_projects(&alice_with_status("completed")).await.unwrap();
    assert_eq!(names(listed), vec!["x4"]);
    assert!(h
        .service
        .list_projects(&alice_with_status("on-hold"))
        .await
        .unwrap()
        .is_empty());
}

#[sqlx::test(migrations = "../db/migrations")]
async fn test_partner_category_and_client_listings(pool: PgPool) {
    let h = harness(pool);
    add_member(&h.service, "Alice").await;

    h.service
        .create_project(&json!({ "name": "Ref A", "type": "affiliate", "affiliatePartner": "Northwind" }))
        .await
        .unwrap();
    h.service
        .create_project(&json!({ "name": "Ref B", "type": "affiliate", "affiliatePartner": "Contoso" }))
        .await
        .unwrap();
    h.service
        .create_project(&json!({ "name": "Misc", "type": "other", "category": "marketing" }))
        .await
        .unwrap();
    let direct = h
        .service
        .create_project(&json!({ "name": "Direct" }))
        .await
        .unwrap();

    let northwind = h
        .service
        .list_projects_by_affiliate_partner("Northwind")
        .await
        .unwrap();
    assert_eq!(northwind.len(), 1);
    assert_eq!(northwind[0].project.name, "Ref A");

    let marketing = h.service.list_projects_by_category("marketing").await.unwrap();
    assert_eq!(marketing.len(), 1);
    assert_eq!(marketing[0].project.name, "Misc");

    let by_client = h
        .service
        .list_projects_by_client(direct.client_id.unwrap())
        .await
        .unwrap();
    assert_eq!(by_client.len(), 1);
    assert_eq!(by_client[0].project.id, direct.id);
}
