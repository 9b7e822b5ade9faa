//! Repository integration tests against a real database.
//!
//! Covers the query-level behaviour the domain layer relies on:
//! - Filter combination and list ordering
//! - Partial updates touching only supplied columns
//! - Document counts and client-scoped deletes
//! - Foreign key and unique constraint violations

use assert_matches::assert_matches;
use chrono::{Duration, TimeZone, Utc};
use crm_core::filters::{ContactWindow, ProjectFilter};
use crm_core::normalize::{ClientPatch, NewClient, NewDocument, NewProject, NewTeamMember, ProjectPatch};
use crm_core::status::{EngagementStatus, ProjectType};
use crm_core::types::{DbId, Timestamp};
use crm_db::repositories::{ClientRepo, DocumentRepo, ProjectRepo, TeamMemberRepo};
use sqlx::PgPool;

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn t0() -> Timestamp {
    Utc.with_ymd_and_hms(2024, 5, 15, 12, 0, 0).unwrap()
}

async fn member(pool: &PgPool, name: &str) -> DbId {
    TeamMemberRepo::create(
        pool,
        &NewTeamMember {
            name: name.to_string(),
            email: format!("{}@firm.test", name.to_lowercase()),
            role: "Advisor".to_string(),
            avatar: None,
        },
    )
    .await
    .unwrap()
    .id
}

async fn client(pool: &PgPool, name: &str) -> DbId {
    ClientRepo::create(
        pool,
        &NewClient {
            name: name.to_string(),
            status: EngagementStatus::Active,
            last_contacted: None,
        },
        t0(),
    )
    .await
    .unwrap()
    .id
}

fn project(name: &str, assignee: DbId) -> NewProject {
    NewProject {
        name: name.to_string(),
        phone: None,
        contact_name: None,
        project_type: ProjectType::Direct,
        affiliate_partner: None,
        category: None,
        last_contacted: None,
        status: EngagementStatus::Active,
        active_stage: None,
        has_invoice: "no".to_string(),
        assigned_to_id: Some(assignee),
        client_id: None,
    }
}

fn document(client_id: DbId, name: &str) -> NewDocument {
    NewDocument {
        name: name.to_string(),
        file_path: format!("{client_id}/{name}"),
        mime_type: "application/pdf".to_string(),
        size_bytes: 42,
        client_id,
    }
}

// ---------------------------------------------------------------------------
// Projects
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "./migrations")]
async fn test_project_list_joins_assignee(pool: PgPool) {
    let alice = member(&pool, "Alice").await;
    ProjectRepo::create(&pool, &project("Acme", alice), t0()).await.unwrap();

    let rows = ProjectRepo::list(&pool, &ProjectFilter::default(), None)
        .await
        .unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].assignee_name, "Alice");
    assert_eq!(rows[0].project.assigned_to_id, alice);
}

#[sqlx::test(migrations = "./migrations")]
async fn test_project_list_orders_by_updated_at_desc(pool: PgPool) {
    let alice = member(&pool, "Alice").await;
    let old = ProjectRepo::create(&pool, &project("Old", alice), t0()).await.unwrap();
    let new = ProjectRepo::create(&pool, &project("New", alice), t0() + Duration::hours(1))
        .await
        .unwrap();

    let rows = ProjectRepo::list(&pool, &ProjectFilter::default(), None)
        .await
        .unwrap();
    let ids: Vec<_> = rows.iter().map(|r| r.project.id).collect();
    assert_eq!(ids, vec![new.id, old.id]);

    // Touching the older project moves it to the front.
    let patch = ProjectPatch {
        phone: Some(Some("555".into())),
        ..ProjectPatch::default()
    };
    ProjectRepo::update(&pool, old.id, &patch, t0() + Duration::hours(2))
        .await
        .unwrap();
    let rows = ProjectRepo::list(&pool, &ProjectFilter::default(), None)
        .await
        .unwrap();
    assert_eq!(rows[0].project.id, old.id);
}

#[sqlx::test(migrations = "./migrations")]
async fn test_project_filters_combine(pool: PgPool) {
    let alice = member(&pool, "Alice").await;
    let bob = member(&pool, "Bob").await;

    let fixture = [
        ("x1", alice, EngagementStatus::Active),
        ("x2", bob, EngagementStatus::Active),
        ("x3", alice, EngagementStatus::Pending),
        ("x4", alice, EngagementStatus::Completed),
        ("x5", alice, EngagementStatus::Active),
        ("x6", bob, EngagementStatus::OnHold),
        ("x7", alice, EngagementStatus::OnHold),
    ];
    for (i, (name, assignee, status)) in fixture.into_iter().enumerate() {
        let mut input = project(name, assignee);
        input.status = status;
        ProjectRepo::create(&pool, &input, t0() + Duration::minutes(i as i64))
            .await
            .unwrap();
    }

    let names = |rows: Vec<crm_db::models::project::ProjectListRow>| {
        rows.into_iter().map(|r| r.project.name).collect::<Vec<_>>()
    };

    let active_alice = ProjectFilter {
        status: Some("active".into()),
        assigned_to_id: Some(alice),
        ..ProjectFilter::default()
    };
    let rows = ProjectRepo::list(&pool, &active_alice, None).await.unwrap();
    assert_eq!(names(rows), vec!["x5", "x1"]);

    let on_hold_bob = ProjectFilter {
        status: Some("on-hold".into()),
        assigned_to_id: Some(bob),
        ..ProjectFilter::default()
    };
    let rows = ProjectRepo::list(&pool, &on_hold_bob, None).await.unwrap();
    assert_eq!(names(rows), vec!["x6"]);

    let bob_any = ProjectFilter {
        assigned_to_id: Some(bob),
        ..ProjectFilter::default()
    };
    let rows = ProjectRepo::list(&pool, &bob_any, None).await.unwrap();
    assert_eq!(names(rows), vec!["x6", "x2"]);
}

#[sqlx::test(migrations = "./migrations")]
async fn test_project_contact_window_is_inclusive_and_skips_null(pool: PgPool) {
    let alice = member(&pool, "Alice").await;

    let mut at_start = project("Start", alice);
    at_start.last_contacted = Some(t0() - Duration::days(2));
    ProjectRepo::create(&pool, &at_start, t0()).await.unwrap();

    let mut before = project("Before", alice);
    before.last_contacted = Some(t0() - Duration::days(2) - Duration::seconds(1));
    ProjectRepo::create(&pool, &before, t0()).await.unwrap();

    ProjectRepo::create(&pool, &project("Never", alice), t0()).await.unwrap();

    let window = ContactWindow {
        from: t0() - Duration::days(2),
        to: t0(),
    };
    let rows = ProjectRepo::list(&pool, &ProjectFilter::default(), Some(window))
        .await
        .unwrap();
    let names: Vec<_> = rows.iter().map(|r| r.project.name.as_str()).collect();
    assert_eq!(names, vec!["Start"]);
}

#[sqlx::test(migrations = "./migrations")]
async fn test_project_update_only_touches_supplied_fields(pool: PgPool) {
    let alice = member(&pool, "Alice").await;
    let mut input = project("Acme", alice);
    input.phone = Some("111".into());
    input.contact_name = Some("Carol".into());
    let created = ProjectRepo::create(&pool, &input, t0()).await.unwrap();

    let patch = ProjectPatch {
        phone: Some(None),
        status: Some(EngagementStatus::OnHold),
        ..ProjectPatch::default()
    };
    let later = t0() + Duration::minutes(5);
    let updated = ProjectRepo::update(&pool, created.id, &patch, later)
        .await
        .unwrap()
        .unwrap();

    assert_eq!(updated.phone, None);
    assert_eq!(updated.status, "on-hold");
    assert_eq!(updated.contact_name.as_deref(), Some("Carol"));
    assert_eq!(updated.name, "Acme");
    assert_eq!(updated.created_at, t0());
    assert_eq!(updated.updated_at, later);
}

#[sqlx::test(migrations = "./migrations")]
async fn test_project_update_missing_returns_none(pool: PgPool) {
    let patch = ProjectPatch {
        name: Some("Ghost".into()),
        ..ProjectPatch::default()
    };
    let result = ProjectRepo::update(&pool, 9999, &patch, t0()).await.unwrap();
    assert!(result.is_none());
}

#[sqlx::test(migrations = "./migrations")]
async fn test_project_unknown_assignee_is_fk_violation(pool: PgPool) {
    let err = ProjectRepo::create(&pool, &project("Orphan", 9999), t0())
        .await
        .unwrap_err();
    assert_matches!(
        err,
        sqlx::Error::Database(ref db) if db.code().as_deref() == Some("23503")
    );
}

#[sqlx::test(migrations = "./migrations")]
async fn test_project_reporting_queries(pool: PgPool) {
    let alice = member(&pool, "Alice").await;
    ProjectRepo::create(&pool, &project("A", alice), t0() - Duration::days(40))
        .await
        .unwrap();
    let mut done = project("B", alice);
    done.status = EngagementStatus::Completed;
    ProjectRepo::create(&pool, &done, t0()).await.unwrap();

    let mut counts = ProjectRepo::count_by_status(&pool).await.unwrap();
    counts.sort();
    assert_eq!(
        counts,
        vec![("active".to_string(), 1), ("completed".to_string(), 1)]
    );

    let since = t0() - Duration::days(1);
    assert_eq!(ProjectRepo::count_created_since(&pool, since).await.unwrap(), 1);

    let active = ProjectRepo::last_contacted_for_status(&pool, "active")
        .await
        .unwrap();
    assert_eq!(active, vec![None]);

    let recent = ProjectRepo::list_recently_updated(&pool, 1).await.unwrap();
    assert_eq!(recent.len(), 1);
    assert_eq!(recent[0].name, "B");
}

// ---------------------------------------------------------------------------
// Clients and documents
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "./migrations")]
async fn test_client_document_count_and_status_filter(pool: PgPool) {
    let acme = client(&pool, "Acme").await;
    let globex = client(&pool, "Globex").await;
    ClientRepo::set_status(&pool, globex, "pending", t0()).await.unwrap();

    DocumentRepo::create(&pool, &document(acme, "a.pdf"), t0()).await.unwrap();
    DocumentRepo::create(&pool, &document(acme, "b.pdf"), t0()).await.unwrap();

    let found = ClientRepo::find_with_document_count(&pool, acme)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(found.document_count, 2);

    let all = ClientRepo::list_with_document_counts(&pool, None).await.unwrap();
    assert_eq!(all.len(), 2);

    let pending = ClientRepo::list_with_document_counts(&pool, Some("pending"))
        .await
        .unwrap();
    assert_eq!(pending.len(), 1);
    assert_eq!(pending[0].client.id, globex);
    assert_eq!(pending[0].document_count, 0);

    assert_eq!(ClientRepo::count(&pool).await.unwrap(), 2);
    assert_eq!(ClientRepo::count_with_status(&pool, "active").await.unwrap(), 1);
}

#[sqlx::test(migrations = "./migrations")]
async fn test_client_patch_clears_last_contacted(pool: PgPool) {
    let acme = client(&pool, "Acme").await;
    ClientRepo::set_last_contacted(&pool, acme, t0(), t0()).await.unwrap();

    let patch = ClientPatch {
        last_contacted: Some(None),
        ..ClientPatch::default()
    };
    let updated = ClientRepo::update(&pool, acme, &patch, t0())
        .await
        .unwrap()
        .unwrap();
    assert_eq!(updated.last_contacted, None);
    assert_eq!(updated.name, "Acme");
}

#[sqlx::test(migrations = "./migrations")]
async fn test_documents_scoped_to_client(pool: PgPool) {
    let acme = client(&pool, "Acme").await;
    let globex = client(&pool, "Globex").await;

    let first = DocumentRepo::create(&pool, &document(acme, "first.pdf"), t0())
        .await
        .unwrap();
    let second = DocumentRepo::create(&pool, &document(acme, "second.pdf"), t0() + Duration::minutes(1))
        .await
        .unwrap();
    DocumentRepo::create(&pool, &document(globex, "other.pdf"), t0())
        .await
        .unwrap();

    let listed = DocumentRepo::list_by_client(&pool, acme).await.unwrap();
    let ids: Vec<_> = listed.iter().map(|d| d.id).collect();
    assert_eq!(ids, vec![second.id, first.id]);

    assert_eq!(DocumentRepo::delete_by_client(&pool, acme).await.unwrap(), 2);
    assert!(DocumentRepo::list_by_client(&pool, acme).await.unwrap().is_empty());
    assert_eq!(DocumentRepo::list_by_client(&pool, globex).await.unwrap().len(), 1);
}

#[sqlx::test(migrations = "./migrations")]
async fn test_client_with_documents_cannot_be_deleted_alone(pool: PgPool) {
    let acme = client(&pool, "Acme").await;
    DocumentRepo::create(&pool, &document(acme, "a.pdf"), t0()).await.unwrap();

    let err = ClientRepo::delete(&pool, acme).await.unwrap_err();
    assert_matches!(
        err,
        sqlx::Error::Database(ref db) if db.code().as_deref() == Some("23503")
    );
}

// ---------------------------------------------------------------------------
// Team members
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "./migrations")]
async fn test_team_members_sorted_and_email_unique(pool: PgPool) {
    assert_eq!(TeamMemberRepo::first_by_name(&pool).await.unwrap(), None);

    member(&pool, "Zed").await;
    let amy = member(&pool, "Amy").await;

    let names: Vec<_> = TeamMemberRepo::list(&pool)
        .await
        .unwrap()
        .into_iter()
        .map(|m| m.name)
        .collect();
    assert_eq!(names, vec!["Amy", "Zed"]);
    assert_eq!(TeamMemberRepo::first_by_name(&pool).await.unwrap(), Some(amy));

    let err = TeamMemberRepo::create(
        &pool,
        &NewTeamMember {
            name: "Zed Again".into(),
            email: "zed@firm.test".into(),
            role: "Advisor".into(),
            avatar: None,
        },
    )
    .await
    .unwrap_err();
    assert_matches!(
        err,
        sqlx::Error::Database(ref db) if db.code().as_deref() == Some("23505")
    );
}
