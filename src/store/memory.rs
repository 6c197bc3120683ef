use async_trait::async_trait;
use tokio::sync::RwLock;
use uuid::Uuid;

use super::{JobBoardStore, JobFilter, JobOrder};
use crate::error::Result;
use crate::models::job::Job;
use crate::models::user::User;
use crate::utils::time::now;

#[derive(Default)]
struct Collections {
    users: Vec<User>,
    jobs: Vec<Job>,
}

/// In-process store used by tests and by local runs without `DATABASE_URL`.
#[derive(Default)]
pub struct MemoryStore {
    inner: RwLock<Collections>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl JobBoardStore for MemoryStore {
    fn backend(&self) -> &'static str {
        "memory"
    }

    async fn ping(&self) -> Result<()> {
        Ok(())
    }

    async fn find_user(&self, id: Uuid) -> Result<Option<User>> {
        let guard = self.inner.read().await;
        Ok(guard.users.iter().find(|u| u.id == id).cloned())
    }

    async fn find_user_by_auth0_id(&self, auth0_id: &str) -> Result<Option<User>> {
        let guard = self.inner.read().await;
        Ok(guard.users.iter().find(|u| u.auth0_id == auth0_id).cloned())
    }

    async fn find_users(&self, ids: &[Uuid]) -> Result<Vec<User>> {
        let guard = self.inner.read().await;
        Ok(guard
            .users
            .iter()
            .filter(|u| ids.contains(&u.id))
            .cloned()
            .collect())
    }

    async fn insert_user(&self, user: &User) -> Result<User> {
        let mut guard = self.inner.write().await;
        if let Some(existing) = guard.users.iter().find(|u| u.auth0_id == user.auth0_id) {
            return Ok(existing.clone());
        }
        guard.users.push(user.clone());
        Ok(user.clone())
    }

    async fn add_applied_job(&self, user_id: Uuid, job_id: Uuid) -> Result<Option<User>> {
        let mut guard = self.inner.write().await;
        let Some(user) = guard.users.iter_mut().find(|u| u.id == user_id) else {
            return Ok(None);
        };
        if !user.applied_jobs.contains(&job_id) {
            user.applied_jobs.push(job_id);
            user.updated_at = now();
        }
        Ok(Some(user.clone()))
    }

    async fn find_job(&self, id: Uuid) -> Result<Option<Job>> {
        let guard = self.inner.read().await;
        Ok(guard.jobs.iter().find(|j| j.id == id).cloned())
    }

    async fn find_jobs(&self, filter: &JobFilter, order: JobOrder) -> Result<Vec<Job>> {
        let guard = self.inner.read().await;
        let mut jobs: Vec<Job> = guard
            .jobs
            .iter()
            .filter(|job| filter.matches(job))
            .cloned()
            .collect();
        if order == JobOrder::NewestFirst {
            // later inserts win ties on equal timestamps
            jobs.reverse();
            jobs.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        }
        Ok(jobs)
    }

    async fn insert_job(&self, job: &Job) -> Result<Job> {
        let mut guard = self.inner.write().await;
        guard.jobs.push(job.clone());
        Ok(job.clone())
    }

    async fn add_applicant(&self, job_id: Uuid, user_id: Uuid) -> Result<Option<Job>> {
        let mut guard = self.inner.write().await;
        let Some(job) = guard.jobs.iter_mut().find(|j| j.id == job_id) else {
            return Ok(None);
        };
        if job.has_applicant(user_id) {
            return Ok(None);
        }
        job.applicants.push(user_id);
        job.updated_at = now();
        Ok(Some(job.clone()))
    }

    async fn remove_applicant(&self, job_id: Uuid, user_id: Uuid) -> Result<Option<Job>> {
        let mut guard = self.inner.write().await;
        let Some(job) = guard.jobs.iter_mut().find(|j| j.id == job_id) else {
            return Ok(None);
        };
        job.applicants.retain(|id| *id != user_id);
        job.updated_at = now();
        Ok(Some(job.clone()))
    }

    async fn toggle_like(&self, job_id: Uuid, user_id: Uuid) -> Result<Option<Job>> {
        let mut guard = self.inner.write().await;
        let Some(job) = guard.jobs.iter_mut().find(|j| j.id == job_id) else {
            return Ok(None);
        };
        job.toggle_like(user_id);
        job.updated_at = now();
        Ok(Some(job.clone()))
    }

    async fn delete_job(&self, id: Uuid) -> Result<bool> {
        let mut guard = self.inner.write().await;
        let before = guard.jobs.len();
        guard.jobs.retain(|j| j.id != id);
        Ok(guard.jobs.len() != before)
    }
}
