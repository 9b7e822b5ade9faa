pub mod client;
pub mod health;
pub mod project;
pub mod stats;
pub mod team_member;

use axum::Router;

use crate::state::AppState;

/// Build the `/api` route tree.
///
/// Route hierarchy:
///
/// ```text
/// /team-members                                    list
///
/// /projects                                        list (filtered), create
/// /projects/affiliate/{partner}                    list by affiliate partner
/// /projects/other/{category}                       list by category
/// /projects/{id}                                   get, update (PATCH), delete
///
/// /clients                                         list, create
/// /clients/{id}                                    get, update (PATCH), delete (cascade)
/// /clients/{id}/projects                           client's projects
/// /clients/{id}/documents                          list, upload (multipart)
/// /clients/{id}/documents/{document_id}            delete
/// /clients/{id}/documents/{document_id}/download   stream file
///
/// /stats/projects                                  project dashboard
/// /stats/clients                                   client dashboard
/// ```
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .nest("/team-members", team_member::router())
        .nest("/projects", project::router())
        .nest("/clients", client::router())
        .nest("/stats", stats::router())
}
