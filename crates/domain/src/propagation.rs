//! Copying project state onto the owning client.
//!
//! Both rules run on the caller's connection so they join its transaction.

use crm_core::propagation::advances_last_contacted;
use crm_core::types::{DbId, Timestamp};
use crm_db::repositories::ClientRepo;
use sqlx::PgConnection;
use tracing::{debug, warn};

use crate::DomainResult;

/// Monotonic merge of a project's contact date into its client.
///
/// Reads the client's current value and writes only when it is empty or
/// `candidate` is strictly newer. Returns whether the client changed.
pub(crate) async fn last_contacted(
    conn: &mut PgConnection,
    client_id: DbId,
    candidate: Timestamp,
    now: Timestamp,
) -> DomainResult<bool> {
    let Some(client) = ClientRepo::find_by_id_for_update(&mut *conn, client_id).await? else {
        warn!(client_id, "Skipping lastContacted propagation to missing client");
        return Ok(false);
    };

    if !advances_last_contacted(client.last_contacted, candidate) {
        debug!(client_id, %candidate, "Client already has a newer lastContacted");
        return Ok(false);
    }

    ClientRepo::set_last_contacted(&mut *conn, client_id, candidate, now).await?;
    debug!(client_id, %candidate, "Propagated lastContacted to client");
    Ok(true)
}

/// Unconditionally copy a project's status onto its client.
pub(crate) async fn status(
    conn: &mut PgConnection,
    client_id: DbId,
    status: &str,
    now: Timestamp,
) -> DomainResult<bool> {
    let changed = ClientRepo::set_status(&mut *conn, client_id, status, now).await?;
    if changed {
        debug!(client_id, status, "Propagated status to client");
    } else {
        warn!(client_id, "Skipping status propagation to missing client");
    }
    Ok(changed)
}
