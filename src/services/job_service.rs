use std::sync::Arc;

use tracing::{error, info, instrument, warn};
use uuid::Uuid;

use crate::dto::job_dto::CreateJobPayload;
use crate::error::{Error, Result};
use crate::models::job::Job;
use crate::models::principal::Principal;
use crate::models::user::User;
use crate::store::JobBoardStore;

/// Guarded mutations on jobs: create, delete, like, apply.
#[derive(Clone)]
pub struct JobService {
    store: Arc<dyn JobBoardStore>,
    enforce_ownership: bool,
}

impl JobService {
    pub fn new(store: Arc<dyn JobBoardStore>, enforce_ownership: bool) -> Self {
        Self {
            store,
            enforce_ownership,
        }
    }

    #[instrument(skip(self, principal, payload), fields(sub = %principal.sub))]
    pub async fn create(&self, principal: &Principal, payload: CreateJobPayload) -> Result<Job> {
        let user = self
            .store
            .find_user_by_auth0_id(&principal.sub)
            .await?
            .ok_or_else(|| Error::Unauthorized("Not Authorized".to_string()))?;

        let new_job = payload.into_new_job()?;
        let now = crate::utils::time::now();
        let job = Job {
            id: Uuid::new_v4(),
            title: new_job.title,
            description: new_job.description,
            location: new_job.location,
            salary: new_job.salary,
            salary_type: new_job.salary_type,
            negotiable: new_job.negotiable,
            job_type: new_job.job_type,
            tags: new_job.tags,
            skills: new_job.skills,
            created_by: user.id,
            applicants: Vec::new(),
            likes: Vec::new(),
            created_at: now,
            updated_at: now,
        };

        let job = self.store.insert_job(&job).await?;
        info!(job_id = %job.id, user_id = %user.id, "job created");
        Ok(job)
    }

    /// Deletes a job. Ownership is only checked when enforcement is enabled.
    #[instrument(skip(self, principal), fields(sub = %principal.sub))]
    pub async fn delete(&self, principal: &Principal, job_id: Uuid) -> Result<()> {
        let job = self.find_job(job_id).await?;
        let user = self.find_user(principal).await?;

        if job.created_by != user.id {
            if self.enforce_ownership {
                return Err(Error::Forbidden(
                    "Only the job owner can delete this job".to_string(),
                ));
            }
            warn!(job_id = %job.id, user_id = %user.id, "job deleted by a user who does not own it");
        }

        if !self.store.delete_job(job.id).await? {
            return Err(Error::NotFound("Job not found".to_string()));
        }
        info!(job_id = %job.id, "job deleted");
        Ok(())
    }

    #[instrument(skip(self, principal), fields(sub = %principal.sub))]
    pub async fn like(&self, principal: &Principal, job_id: Uuid) -> Result<Job> {
        self.find_job(job_id).await?;
        let user = self.find_user(principal).await?;

        let job = self
            .store
            .toggle_like(job_id, user.id)
            .await?
            .ok_or_else(|| Error::NotFound("Job not found".to_string()))?;
        info!(job_id = %job.id, user_id = %user.id, liked = job.is_liked_by(user.id), "job like toggled");
        Ok(job)
    }

    /// Records the application on both the job and the user.
    ///
    /// Each write is atomic on its own; the pair is not. When the user write
    /// fails the applicant is removed again and the request fails.
    #[instrument(skip(self, principal), fields(sub = %principal.sub))]
    pub async fn apply(&self, principal: &Principal, job_id: Uuid) -> Result<Job> {
        self.find_job(job_id).await?;
        let user = self.find_user(principal).await?;

        let Some(job) = self.store.add_applicant(job_id, user.id).await? else {
            // no row changed: either the job vanished or the user is already listed
            self.find_job(job_id).await?;
            return Err(Error::Conflict("Already applied for this job".to_string()));
        };

        let recorded = match self.store.add_applied_job(user.id, job.id).await {
            Ok(Some(_)) => Ok(()),
            Ok(None) => Err(Error::NotFound("User not found".to_string())),
            Err(err) => Err(err),
        };
        if let Err(err) = recorded {
            error!(
                job_id = %job.id,
                user_id = %user.id,
                error = %err,
                "failed to record application on user, rolling back applicant"
            );
            self.rollback_applicant(job.id, user.id).await;
            return Err(match err {
                Error::NotFound(msg) => Error::NotFound(msg),
                _ => Error::Internal(format!(
                    "application to job {} could not be recorded",
                    job.id
                )),
            });
        }

        info!(job_id = %job.id, user_id = %user.id, "applied to job");
        Ok(job)
    }

    async fn rollback_applicant(&self, job_id: Uuid, user_id: Uuid) {
        if let Err(err) = self.store.remove_applicant(job_id, user_id).await {
            error!(
                job_id = %job_id,
                user_id = %user_id,
                error = %err,
                "rollback failed: job lists an applicant the user record does not"
            );
        }
    }

    async fn find_job(&self, job_id: Uuid) -> Result<Job> {
        self.store
            .find_job(job_id)
            .await?
            .ok_or_else(|| Error::NotFound("Job not found".to_string()))
    }

    async fn find_user(&self, principal: &Principal) -> Result<User> {
        self.store
            .find_user_by_auth0_id(&principal.sub)
            .await?
            .ok_or_else(|| Error::NotFound("User not found".to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dto::job_dto::{JobTypeInput, LocationInput};
    use crate::models::job::EmploymentType;
    use crate::services::user_service::UserService;
    use crate::store::{JobFilter, JobOrder, MemoryStore};
    use async_trait::async_trait;
    use rust_decimal::Decimal;
    use tokio::sync::Barrier;

    fn principal(sub: &str) -> Principal {
        Principal {
            sub: format!("auth0|{}", sub),
            email: format!("{}@example.com", sub),
            name: sub.into(),
            picture: None,
        }
    }

    fn payload() -> CreateJobPayload {
        CreateJobPayload {
            title: Some("Backend Dev".into()),
            description: Some("desc".into()),
            location: Some(LocationInput::Text("Lagos".into())),
            salary: Some(Decimal::from(50_000)),
            job_type: Some(JobTypeInput::One(EmploymentType::FullTime)),
            tags: Some(vec!["node".into()]),
            skills: Some(vec!["js".into()]),
            ..Default::default()
        }
    }

    async fn setup(store: Arc<dyn JobBoardStore>, enforce: bool) -> (JobService, Principal, Principal) {
        let users = UserService::new(store.clone());
        let a = principal("alice");
        let b = principal("bob");
        users.ensure_user(&a).await.unwrap();
        users.ensure_user(&b).await.unwrap();
        (JobService::new(store, enforce), a, b)
    }

    #[tokio::test]
    async fn create_requires_known_user() {
        let store: Arc<dyn JobBoardStore> = Arc::new(MemoryStore::new());
        let service = JobService::new(store, false);
        let err = service
            .create(&principal("ghost"), payload())
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Unauthorized(_)));
    }

    #[tokio::test]
    async fn create_sets_owner_and_empty_sets() {
        let store: Arc<dyn JobBoardStore> = Arc::new(MemoryStore::new());
        let (service, alice, _) = setup(store.clone(), false).await;

        let job = service.create(&alice, payload()).await.unwrap();
        let owner = store.find_user_by_auth0_id(&alice.sub).await.unwrap().unwrap();
        assert_eq!(job.created_by, owner.id);
        assert!(job.applicants.is_empty());
        assert!(job.likes.is_empty());
    }

    #[tokio::test]
    async fn apply_twice_conflicts_and_records_once() {
        let store: Arc<dyn JobBoardStore> = Arc::new(MemoryStore::new());
        let (service, alice, bob) = setup(store.clone(), false).await;
        let job = service.create(&alice, payload()).await.unwrap();

        let applied = service.apply(&bob, job.id).await.unwrap();
        let err = service.apply(&bob, job.id).await.unwrap_err();
        assert!(matches!(err, Error::Conflict(_)));

        let bob_user = store.find_user_by_auth0_id(&bob.sub).await.unwrap().unwrap();
        assert_eq!(applied.applicants, vec![bob_user.id]);
        assert_eq!(bob_user.applied_jobs, vec![job.id]);
        let stored = store.find_job(job.id).await.unwrap().unwrap();
        assert_eq!(stored.applicants.len(), 1);
    }

    #[tokio::test]
    async fn like_and_delete_need_existing_job() {
        let store: Arc<dyn JobBoardStore> = Arc::new(MemoryStore::new());
        let (service, alice, _) = setup(store, false).await;

        let err = service.like(&alice, Uuid::new_v4()).await.unwrap_err();
        assert_eq!(err.public_message(), "Job not found");
        let err = service.delete(&alice, Uuid::new_v4()).await.unwrap_err();
        assert_eq!(err.public_message(), "Job not found");
    }

    #[tokio::test]
    async fn like_needs_existing_user() {
        let store: Arc<dyn JobBoardStore> = Arc::new(MemoryStore::new());
        let (service, alice, _) = setup(store, false).await;
        let job = service.create(&alice, payload()).await.unwrap();

        let err = service.like(&principal("ghost"), job.id).await.unwrap_err();
        assert_eq!(err.public_message(), "User not found");
    }

    #[tokio::test]
    async fn non_owner_delete_succeeds_unless_enforced() {
        // Deleting someone else's job is allowed by default. Kept deliberately; see DESIGN.md.
        let store: Arc<dyn JobBoardStore> = Arc::new(MemoryStore::new());
        let (service, alice, bob) = setup(store.clone(), false).await;
        let job = service.create(&alice, payload()).await.unwrap();
        service.delete(&bob, job.id).await.unwrap();
        assert!(store.find_job(job.id).await.unwrap().is_none());

        let (strict, alice, bob) = setup(store.clone(), true).await;
        let job = strict.create(&alice, payload()).await.unwrap();
        let err = strict.delete(&bob, job.id).await.unwrap_err();
        assert!(matches!(err, Error::Forbidden(_)));
        strict.delete(&alice, job.id).await.unwrap();
    }

    /// Memory store that can hold readers at a barrier and refuse user writes.
    struct ScriptedStore {
        inner: Arc<MemoryStore>,
        read_barrier: Option<Barrier>,
        fail_user_writes: bool,
    }

    impl ScriptedStore {
        fn wrap(inner: Arc<MemoryStore>) -> Self {
            Self {
                inner,
                read_barrier: None,
                fail_user_writes: false,
            }
        }
    }

    #[async_trait]
    impl JobBoardStore for ScriptedStore {
        fn backend(&self) -> &'static str {
            self.inner.backend()
        }
        async fn ping(&self) -> Result<()> {
            self.inner.ping().await
        }
        async fn find_user(&self, id: Uuid) -> Result<Option<User>> {
            self.inner.find_user(id).await
        }
        async fn find_user_by_auth0_id(&self, auth0_id: &str) -> Result<Option<User>> {
            self.inner.find_user_by_auth0_id(auth0_id).await
        }
        async fn find_users(&self, ids: &[Uuid]) -> Result<Vec<User>> {
            self.inner.find_users(ids).await
        }
        async fn insert_user(&self, user: &User) -> Result<User> {
            self.inner.insert_user(user).await
        }
        async fn add_applied_job(&self, user_id: Uuid, job_id: Uuid) -> Result<Option<User>> {
            if self.fail_user_writes {
                return Err(Error::Internal("user collection unavailable".to_string()));
            }
            self.inner.add_applied_job(user_id, job_id).await
        }
        async fn find_job(&self, id: Uuid) -> Result<Option<Job>> {
            let job = self.inner.find_job(id).await;
            if let Some(barrier) = &self.read_barrier {
                barrier.wait().await;
            }
            job
        }
        async fn find_jobs(&self, filter: &JobFilter, order: JobOrder) -> Result<Vec<Job>> {
            self.inner.find_jobs(filter, order).await
        }
        async fn insert_job(&self, job: &Job) -> Result<Job> {
            self.inner.insert_job(job).await
        }
        async fn add_applicant(&self, job_id: Uuid, user_id: Uuid) -> Result<Option<Job>> {
            self.inner.add_applicant(job_id, user_id).await
        }
        async fn remove_applicant(&self, job_id: Uuid, user_id: Uuid) -> Result<Option<Job>> {
            self.inner.remove_applicant(job_id, user_id).await
        }
        async fn toggle_like(&self, job_id: Uuid, user_id: Uuid) -> Result<Option<Job>> {
            self.inner.toggle_like(job_id, user_id).await
        }
        async fn delete_job(&self, id: Uuid) -> Result<bool> {
            self.inner.delete_job(id).await
        }
    }

    #[tokio::test]
    async fn failed_user_write_rolls_back_applicant() {
        let memory = Arc::new(MemoryStore::new());
        let store: Arc<dyn JobBoardStore> = Arc::new(ScriptedStore {
            fail_user_writes: true,
            ..ScriptedStore::wrap(memory.clone())
        });
        let (service, alice, bob) = setup(store, false).await;
        let job = service.create(&alice, payload()).await.unwrap();

        let err = service.apply(&bob, job.id).await.unwrap_err();
        assert!(matches!(err, Error::Internal(_)));

        let stored = memory.find_job(job.id).await.unwrap().unwrap();
        assert!(stored.applicants.is_empty());
    }

    #[tokio::test]
    async fn concurrent_applies_and_likes_are_all_kept() {
        let memory = Arc::new(MemoryStore::new());
        let (service, alice, bob) = setup(memory.clone(), false).await;
        let carol = principal("carol");
        UserService::new(memory.clone()).ensure_user(&carol).await.unwrap();
        let job = service.create(&alice, payload()).await.unwrap();

        // both requests finish reading the job before either one writes
        let racing = JobService::new(
            Arc::new(ScriptedStore {
                read_barrier: Some(Barrier::new(2)),
                ..ScriptedStore::wrap(memory.clone())
            }),
            false,
        );

        let (bob_apply, carol_apply) =
            tokio::join!(racing.apply(&bob, job.id), racing.apply(&carol, job.id));
        bob_apply.unwrap();
        carol_apply.unwrap();

        let (bob_like, carol_like) =
            tokio::join!(racing.like(&bob, job.id), racing.like(&carol, job.id));
        bob_like.unwrap();
        carol_like.unwrap();

        let stored = memory.find_job(job.id).await.unwrap().unwrap();
        assert_eq!(stored.applicants.len(), 2);
        assert_eq!(stored.likes.len(), 2);
        for who in [&bob, &carol] {
            let user = memory.find_user_by_auth0_id(&who.sub).await.unwrap().unwrap();
            assert!(stored.has_applicant(user.id));
            assert!(stored.is_liked_by(user.id));
            assert_eq!(user.applied_jobs, vec![job.id]);
        }
    }
}
