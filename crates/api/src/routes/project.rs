//! Route definitions for the `/projects` resource.

use axum::routing::get;
use axum::Router;

use crate::handlers::project;
use crate::state::AppState;

/// Routes mounted at `/projects`.
///
/// ```text
/// GET    /                        -> list
/// POST   /                        -> create
/// GET    /affiliate/{partner}     -> list_by_affiliate_partner
/// GET    /other/{category}        -> list_by_category
/// GET    /{id}                    -> get_by_id
/// PATCH  /{id}                    -> update
/// DELETE /{id}                    -> delete
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(project::list).post(project::create))
        .route(
            "/affiliate/{partner}",
            get(project::list_by_affiliate_partner),
        )
        .route("/other/{category}", get(project::list_by_category))
        .route(
            "/{id}",
            get(project::get_by_id)
                .patch(project::update)
                .delete(project::delete),
        )
}
