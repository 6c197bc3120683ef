//! Persistence port for the two collections the job board keeps: users and jobs.

pub mod memory;
pub mod postgres;

use async_trait::async_trait;
use uuid::Uuid;

use crate::error::Result;
use crate::models::job::Job;
use crate::models::user::User;

pub use memory::MemoryStore;
pub use postgres::PgStore;

/// Conjunctive job filter. `None` fields impose no constraint.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct JobFilter {
    /// Matches jobs whose tag set intersects this list.
    pub tags: Option<Vec<String>>,
    /// Case-insensitive substring of the job location.
    pub location: Option<String>,
    /// Case-insensitive substring of the job title.
    pub title: Option<String>,
    pub created_by: Option<Uuid>,
}

impl JobFilter {
    pub fn created_by(user_id: Uuid) -> Self {
        Self {
            created_by: Some(user_id),
            ..Self::default()
        }
    }

    pub fn matches(&self, job: &Job) -> bool {
        if let Some(tags) = &self.tags {
            if !job.tags.iter().any(|tag| tags.contains(tag)) {
                return false;
            }
        }
        if let Some(location) = &self.location {
            if !contains_ignore_case(&job.location, location) {
                return false;
            }
        }
        if let Some(title) = &self.title {
            if !contains_ignore_case(&job.title, title) {
                return false;
            }
        }
        if let Some(created_by) = self.created_by {
            if job.created_by != created_by {
                return false;
            }
        }
        true
    }
}

fn contains_ignore_case(haystack: &str, needle: &str) -> bool {
    haystack.to_lowercase().contains(&needle.to_lowercase())
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum JobOrder {
    /// Whatever order the backing store returns (insertion order).
    #[default]
    Natural,
    NewestFirst,
}

/// Database repository abstraction.
///
/// Every write is a single-record operation; implementations make each one
/// atomic, array edits included, but nothing spans two calls.
#[async_trait]
pub trait JobBoardStore: Send + Sync {
    /// Short backend name reported by the health endpoint.
    fn backend(&self) -> &'static str;

    /// Fails when the backend cannot serve requests.
    async fn ping(&self) -> Result<()>;

    // === Users ===

    async fn find_user(&self, id: Uuid) -> Result<Option<User>>;

    async fn find_user_by_auth0_id(&self, auth0_id: &str) -> Result<Option<User>>;

    /// Users for the given ids; unknown ids are skipped.
    async fn find_users(&self, ids: &[Uuid]) -> Result<Vec<User>>;

    /// Inserts `user`, or returns the record already stored under its `auth0_id`.
    async fn insert_user(&self, user: &User) -> Result<User>;

    /// Appends `job_id` to the user's `applied_jobs` unless already present.
    /// `None` when the user does not exist.
    async fn add_applied_job(&self, user_id: Uuid, job_id: Uuid) -> Result<Option<User>>;

    // === Jobs ===

    async fn find_job(&self, id: Uuid) -> Result<Option<Job>>;

    async fn find_jobs(&self, filter: &JobFilter, order: JobOrder) -> Result<Vec<Job>>;

    async fn insert_job(&self, job: &Job) -> Result<Job>;

    /// Appends `user_id` to `applicants` in one step. `None` when the job is
    /// missing or already lists the user.
    async fn add_applicant(&self, job_id: Uuid, user_id: Uuid) -> Result<Option<Job>>;

    /// Removes `user_id` from `applicants`. `None` when the job is missing.
    async fn remove_applicant(&self, job_id: Uuid, user_id: Uuid) -> Result<Option<Job>>;

    /// Adds or removes `user_id` in `likes` in one step. `None` when the job is missing.
    async fn toggle_like(&self, job_id: Uuid, user_id: Uuid) -> Result<Option<Job>>;

    /// Returns whether a job was removed.
    async fn delete_job(&self, id: Uuid) -> Result<bool>;
}
