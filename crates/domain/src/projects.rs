//! Project operations and their client side effects.

use crm_core::error::CoreError;
use crm_core::filters::ProjectFilter;
use crm_core::normalize::{self, NewClient, NewProject, ProjectPatch};
use crm_core::status::ProjectType;
use crm_core::types::DbId;
use crm_db::models::project::{Project, ProjectWithAssignee};
use crm_db::repositories::{ClientRepo, ProjectRepo};
use serde_json::Value;
use tracing::info;

use crate::{propagation, DomainResult, DomainService};

fn not_found(id: DbId) -> CoreError {
    CoreError::NotFound {
        entity: "Project",
        id,
    }
}

impl DomainService {
    /// List projects matching `filter`, most recently updated first.
    pub async fn list_projects(
        &self,
        filter: &ProjectFilter,
    ) -> DomainResult<Vec<ProjectWithAssignee>> {
        let window = filter.contact_window(self.now());
        let rows = ProjectRepo::list(&self.pool, filter, window).await?;
        Ok(rows.into_iter().map(ProjectWithAssignee::from).collect())
    }

    pub async fn list_projects_by_affiliate_partner(
        &self,
        partner: &str,
    ) -> DomainResult<Vec<ProjectWithAssignee>> {
        self.list_projects(&ProjectFilter::affiliate(partner)).await
    }

    pub async fn list_projects_by_category(
        &self,
        category: &str,
    ) -> DomainResult<Vec<ProjectWithAssignee>> {
        self.list_projects(&ProjectFilter::category(category)).await
    }

    pub async fn list_projects_by_client(
        &self,
        client_id: DbId,
    ) -> DomainResult<Vec<ProjectWithAssignee>> {
        self.list_projects(&ProjectFilter::client(client_id)).await
    }

    pub async fn get_project(&self, id: DbId) -> DomainResult<Project> {
        ProjectRepo::find_by_id(&self.pool, id)
            .await?
            .ok_or_else(|| not_found(id).into())
    }

    /// Normalize `body` and create the project it describes.
    pub async fn create_project(&self, body: &Value) -> DomainResult<Project> {
        let input = normalize::new_project(body)?;
        self.insert_project(input).await
    }

    /// Create an already-normalized project.
    ///
    /// Runs in one transaction: the fallback assignee lookup, the implicit
    /// client for direct projects, the insert, and contact-date propagation.
    pub async fn insert_project(&self, mut input: NewProject) -> DomainResult<Project> {
        let now = self.now();
        let mut tx = self.pool.begin().await?;

        if input.assigned_to_id.is_none() {
            input.assigned_to_id = Some(Self::fallback_assignee(&mut tx).await?);
        }
        let mut input = normalize::check(input)?;
        normalize::check_type_requirements(
            input.project_type.as_str(),
            input.affiliate_partner.as_deref(),
            input.category.as_deref(),
        )?;

        if input.project_type == ProjectType::Direct && input.client_id.is_none() {
            let client = ClientRepo::create(
                &mut *tx,
                &NewClient {
                    name: input.name.clone(),
                    status: input.status,
                    last_contacted: input.last_contacted,
                },
                now,
            )
            .await?;
            info!(client_id = client.id, name = %client.name, "Created client for direct project");
            input.client_id = Some(client.id);
        }

        let project = ProjectRepo::create(&mut *tx, &input, now).await?;

        if let (Some(client_id), Some(contacted)) = (project.client_id, project.last_contacted) {
            propagation::last_contacted(&mut tx, client_id, contacted, now).await?;
        }

        tx.commit().await?;
        info!(project_id = project.id, project_type = %project.project_type, "Project created");
        Ok(project)
    }

    /// Normalize `body` as a partial update and apply it.
    pub async fn update_project(&self, id: DbId, body: &Value) -> DomainResult<Project> {
        let patch = normalize::project_patch(body)?;
        self.patch_project(id, &patch).await
    }

    /// Apply a partial update, then propagate to the linked client.
    ///
    /// A changed contact date is merged monotonically into the client. A
    /// changed status overwrites the client's status with no recency check.
    pub async fn patch_project(&self, id: DbId, patch: &ProjectPatch) -> DomainResult<Project> {
        let now = self.now();
        let mut tx = self.pool.begin().await?;

        let prior = ProjectRepo::find_by_id_for_update(&mut *tx, id)
            .await?
            .ok_or_else(|| not_found(id))?;
        let updated = ProjectRepo::update(&mut *tx, id, patch, now)
            .await?
            .ok_or_else(|| not_found(id))?;

        normalize::check_type_requirements(
            &updated.project_type,
            updated.affiliate_partner.as_deref(),
            updated.category.as_deref(),
        )?;

        if let Some(client_id) = updated.client_id {
            if updated.last_contacted != prior.last_contacted {
                if let Some(contacted) = updated.last_contacted {
                    propagation::last_contacted(&mut tx, client_id, contacted, now).await?;
                }
            }
            if updated.status != prior.status {
                propagation::status(&mut tx, client_id, &updated.status, now).await?;
            }
        }

        tx.commit().await?;
        info!(project_id = id, "Project updated");
        Ok(updated)
    }

    /// Delete a project. The linked client is left untouched.
    pub async fn delete_project(&self, id: DbId) -> DomainResult<()> {
        let deleted = ProjectRepo::delete(&self.pool, id).await?;
        info!(project_id = id, deleted, "Project delete requested");
        Ok(())
    }
}
