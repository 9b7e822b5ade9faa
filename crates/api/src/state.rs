use crm_domain::DomainService;

/// Shared application state available to all Axum handlers via `State<AppState>`.
///
/// Cheaply cloneable: every field is a shared handle.
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool, used directly by the health check.
    pub pool: crm_db::DbPool,
    /// Business operations. Handlers never touch repositories directly.
    pub domain: DomainService,
}
