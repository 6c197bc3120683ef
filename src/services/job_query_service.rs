use std::collections::HashMap;
use std::sync::Arc;

use tracing::instrument;
use uuid::Uuid;

use crate::dto::job_dto::{JobSearchQuery, JobView};
use crate::error::{Error, Result};
use crate::models::job::{CreatorSummary, Job};
use crate::store::{JobBoardStore, JobFilter, JobOrder};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum CreatorFields {
    Basic,
    WithEmail,
}

/// Read side of the job board. Never writes.
#[derive(Clone)]
pub struct JobQueryService {
    store: Arc<dyn JobBoardStore>,
}

impl JobQueryService {
    pub fn new(store: Arc<dyn JobBoardStore>) -> Self {
        Self { store }
    }

    #[instrument(skip(self))]
    pub async fn search(&self, query: JobSearchQuery) -> Result<Vec<JobView>> {
        let filter = query.into_filter();
        let jobs = self.store.find_jobs(&filter, JobOrder::Natural).await?;
        self.with_creators(jobs, CreatorFields::Basic).await
    }

    /// Every job, newest first.
    pub async fn list_all(&self) -> Result<Vec<JobView>> {
        let jobs = self
            .store
            .find_jobs(&JobFilter::default(), JobOrder::NewestFirst)
            .await?;
        self.with_creators(jobs, CreatorFields::WithEmail).await
    }

    pub async fn list_by_user(&self, user_id: Uuid) -> Result<Vec<JobView>> {
        let user = self
            .store
            .find_user(user_id)
            .await?
            .ok_or_else(|| Error::NotFound("User not found".to_string()))?;
        let jobs = self
            .store
            .find_jobs(&JobFilter::created_by(user.id), JobOrder::Natural)
            .await?;
        self.with_creators(jobs, CreatorFields::Basic).await
    }

    pub async fn get_by_id(&self, job_id: Uuid) -> Result<JobView> {
        let job = self
            .store
            .find_job(job_id)
            .await?
            .ok_or_else(|| Error::NotFound("Job not found".to_string()))?;
        let mut views = self.with_creators(vec![job], CreatorFields::Basic).await?;
        views
            .pop()
            .ok_or_else(|| Error::Internal("job vanished while resolving creator".to_string()))
    }

    async fn with_creators(&self, jobs: Vec<Job>, fields: CreatorFields) -> Result<Vec<JobView>> {
        let mut creator_ids: Vec<Uuid> = jobs.iter().map(|job| job.created_by).collect();
        creator_ids.sort();
        creator_ids.dedup();

        let creators: HashMap<Uuid, CreatorSummary> = self
            .store
            .find_users(&creator_ids)
            .await?
            .into_iter()
            .map(|user| {
                let summary = CreatorSummary {
                    id: user.id,
                    name: user.name,
                    email: (fields == CreatorFields::WithEmail).then_some(user.email),
                    profile_picture: user.profile_picture,
                };
                (summary.id, summary)
            })
            .collect();

        Ok(jobs
            .into_iter()
            .map(|job| {
                let creator = creators.get(&job.created_by).cloned();
                JobView::new(job, creator)
            })
            .collect())
    }
}
