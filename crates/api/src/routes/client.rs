//! Route definitions for the `/clients` resource.
//!
//! Also nests document routes under `/clients/{id}/documents`.

use axum::routing::{delete, get};
use axum::Router;

use crate::handlers::{client, document};
use crate::state::AppState;

/// Routes mounted at `/clients`.
///
/// ```text
/// GET    /                                        -> list
/// POST   /                                        -> create
/// GET    /{id}                                    -> get_by_id
/// PATCH  /{id}                                    -> update
/// DELETE /{id}                                    -> delete
/// GET    /{id}/projects                           -> list_projects
///
/// GET    /{id}/documents                          -> list_by_client
/// POST   /{id}/documents                          -> upload
/// DELETE /{id}/documents/{document_id}            -> delete
/// GET    /{id}/documents/{document_id}/download   -> download
/// ```
pub fn router() -> Router<AppState> {
    let document_routes = Router::new()
        .route("/", get(document::list_by_client).post(document::upload))
        .route("/{document_id}", delete(document::delete))
        .route("/{document_id}/download", get(document::download));

    Router::new()
        .route("/", get(client::list).post(client::create))
        .route(
            "/{id}",
            get(client::get_by_id)
                .patch(client::update)
                .delete(client::delete),
        )
        .route("/{id}/projects", get(client::list_projects))
        .nest("/{id}/documents", document_routes)
}
