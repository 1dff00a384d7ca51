use futures_util::future::BoxFuture;
use migration::{Migrator, MigratorTrait};
use sea_orm::sea_query::OnConflict;
use sea_orm::*;
use tracing::info;

use crate::error::StoreError;
use crate::models::jobs::{self, Job, JobFilter, JobGuard, JobPatch, UpdateOutcome};
use crate::models::profiles::{self, UserProfile};
use crate::store::backend::{BackendResult, RemoteBackend};

/// Postgres-backed store, one logical namespace per application id.
pub struct SqlBackend {
    db: DatabaseConnection,
    app_id: String,
}

impl SqlBackend {
    /// Connect and bring the schema up to date.
    pub async fn connect(database_url: &str, app_id: &str) -> Result<Self, StoreError> {
        let db = Database::connect(database_url).await?;
        Migrator::up(&db, None).await?;
        info!(app_id, "Connected to remote backend");

        Ok(Self {
            db,
            app_id: app_id.to_string(),
        })
    }

    async fn fetch_profile(&self, uid: &str) -> BackendResult<Option<UserProfile>> {
        let row = profiles::Entity::find_by_id((self.app_id.clone(), uid.to_string()))
            .one(&self.db)
            .await?;

        match row {
            Some(m) => Ok(Some(serde_json::from_value(m.document)?)),
            None => Ok(None),
        }
    }

    async fn upsert_profile(&self, profile: &UserProfile) -> BackendResult<()> {
        let model = profiles::ActiveModel {
            app_id: Set(self.app_id.clone()),
            uid: Set(profile.uid.clone()),
            role: Set(profile.role()),
            document: Set(serde_json::to_value(profile)?),
            updated_at: Set(chrono::Utc::now()),
        };

        profiles::Entity::insert(model)
            .on_conflict(
                OnConflict::columns([profiles::Column::AppId, profiles::Column::Uid])
                    .update_columns([
                        profiles::Column::Role,
                        profiles::Column::Document,
                        profiles::Column::UpdatedAt,
                    ])
                    .to_owned(),
            )
            .exec_without_returning(&self.db)
            .await?;

        Ok(())
    }

    async fn fetch_job(&self, id: &str) -> BackendResult<Option<Job>> {
        let row = jobs::Entity::find_by_id(id.to_string())
            .filter(jobs::Column::AppId.eq(self.app_id.as_str()))
            .one(&self.db)
            .await?;
        Ok(row.map(Job::from))
    }

    async fn guarded_update(
        &self,
        id: &str,
        patch: &JobPatch,
        guard: &JobGuard,
    ) -> BackendResult<UpdateOutcome> {
        let mut active = jobs::ActiveModel::new();
        if let Some(status) = patch.status {
            active.status = Set(status);
        }
        if let Some(escrow) = patch.escrow_status {
            active.escrow_status = Set(escrow);
        }
        if let Some(tailor_id) = &patch.tailor_id {
            active.tailor_id = Set(Some(tailor_id.clone()));
        }
        if let Some(tailor_name) = &patch.tailor_name {
            active.tailor_name = Set(Some(tailor_name.clone()));
        }

        // The guard goes into the WHERE clause so check and write are one statement.
        let mut update = jobs::Entity::update_many()
            .set(active)
            .filter(jobs::Column::AppId.eq(self.app_id.as_str()))
            .filter(jobs::Column::Id.eq(id));
        if !guard.status_in.is_empty() {
            update = update.filter(jobs::Column::Status.is_in(guard.status_in.clone()));
        }
        if let Some(escrow) = guard.escrow {
            update = update.filter(jobs::Column::EscrowStatus.eq(escrow));
        }
        let result = update.exec(&self.db).await?;

        Ok(match (result.rows_affected, self.fetch_job(id).await?) {
            (_, None) => UpdateOutcome::Missing,
            (0, Some(current)) => UpdateOutcome::Rejected(current),
            (_, Some(updated)) => UpdateOutcome::Updated(updated),
        })
    }

    async fn fetch_jobs(&self, filter: &JobFilter) -> BackendResult<Vec<Job>> {
        let mut query = jobs::Entity::find().filter(jobs::Column::AppId.eq(self.app_id.as_str()));
        if let Some(brand_id) = &filter.brand_id {
            query = query.filter(jobs::Column::BrandId.eq(brand_id.as_str()));
        }

        let rows = query
            .order_by_desc(jobs::Column::CreatedAt)
            .order_by_desc(jobs::Column::Id)
            .all(&self.db)
            .await?;

        Ok(rows.into_iter().map(Job::from).collect())
    }
}

impl RemoteBackend for SqlBackend {
    fn read_profile<'a>(&'a self, uid: &'a str) -> BoxFuture<'a, BackendResult<Option<UserProfile>>> {
        Box::pin(self.fetch_profile(uid))
    }

    fn write_profile<'a>(&'a self, profile: &'a UserProfile) -> BoxFuture<'a, BackendResult<()>> {
        Box::pin(self.upsert_profile(profile))
    }

    fn insert_job<'a>(&'a self, job: &'a Job) -> BoxFuture<'a, BackendResult<()>> {
        Box::pin(async move {
            job.to_active_model(&self.app_id).insert(&self.db).await?;
            Ok(())
        })
    }

    fn get_job<'a>(&'a self, id: &'a str) -> BoxFuture<'a, BackendResult<Option<Job>>> {
        Box::pin(self.fetch_job(id))
    }

    fn update_job<'a>(
        &'a self,
        id: &'a str,
        patch: &'a JobPatch,
        guard: &'a JobGuard,
    ) -> BoxFuture<'a, BackendResult<UpdateOutcome>> {
        Box::pin(self.guarded_update(id, patch, guard))
    }

    fn list_jobs<'a>(&'a self, filter: &'a JobFilter) -> BoxFuture<'a, BackendResult<Vec<Job>>> {
        Box::pin(self.fetch_jobs(filter))
    }
}
