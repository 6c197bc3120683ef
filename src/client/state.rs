use std::sync::Arc;

use tracing::error;
use uuid::Uuid;

use super::api::JobsApi;
use super::draft::JobDraft;
use crate::dto::job_dto::{JobSearchQuery, JobView};
use crate::dto::user_dto::UserProfileResponse;
use crate::models::job::{CreatorSummary, Job};
use crate::models::principal::Principal;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeKind {
    Success,
    Error,
}

/// A message for the user, rendered by the UI as a toast.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub kind: NoticeKind,
    pub message: String,
}

impl Notice {
    fn success(message: &str) -> Self {
        Self {
            kind: NoticeKind::Success,
            message: message.to_string(),
        }
    }

    fn error(message: String) -> Self {
        Self {
            kind: NoticeKind::Error,
            message,
        }
    }
}

/// Session-wide state: who is signed in, their profile, and the job-post draft.
pub struct GlobalState {
    api: Arc<dyn JobsApi>,
    is_authenticated: bool,
    auth_user: Option<Principal>,
    user_profile: Option<UserProfileResponse>,
    loading: bool,
    pub draft: JobDraft,
}

impl GlobalState {
    pub fn new(api: Arc<dyn JobsApi>) -> Self {
        Self {
            api,
            is_authenticated: false,
            auth_user: None,
            user_profile: None,
            loading: false,
            draft: JobDraft::new(),
        }
    }

    pub fn is_authenticated(&self) -> bool {
        self.is_authenticated
    }

    pub fn auth_user(&self) -> Option<&Principal> {
        self.auth_user.as_ref()
    }

    pub fn user_profile(&self) -> Option<&UserProfileResponse> {
        self.user_profile.as_ref()
    }

    pub fn loading(&self) -> bool {
        self.loading
    }

    /// Asks the server who we are, then loads the profile of an authenticated caller.
    pub async fn refresh_auth(&mut self) {
        self.loading = true;
        match self.api.check_auth().await {
            Ok(status) => {
                self.is_authenticated = status.is_authenticated;
                self.auth_user = status.user;
            }
            Err(err) => error!(error = %err, "Error checking auth"),
        }
        self.loading = false;

        if self.is_authenticated {
            if let Some(sub) = self.auth_user.as_ref().map(|user| user.sub.clone()) {
                self.load_profile(&sub).await;
            }
        }
    }

    pub async fn load_profile(&mut self, auth0_id: &str) {
        match self.api.user_profile(auth0_id.to_string()).await {
            Ok(profile) => self.user_profile = Some(profile),
            Err(err) => error!(error = %err, "Error getting user profile"),
        }
    }
}

/// Job lists shown by the UI and the actions that change them.
pub struct JobsState {
    api: Arc<dyn JobsApi>,
    jobs: Vec<JobView>,
    user_jobs: Vec<JobView>,
    loading: bool,
    notices: Vec<Notice>,
}

impl JobsState {
    pub fn new(api: Arc<dyn JobsApi>) -> Self {
        Self {
            api,
            jobs: Vec::new(),
            user_jobs: Vec::new(),
            loading: false,
            notices: Vec::new(),
        }
    }

    pub fn jobs(&self) -> &[JobView] {
        &self.jobs
    }

    pub fn user_jobs(&self) -> &[JobView] {
        &self.user_jobs
    }

    pub fn loading(&self) -> bool {
        self.loading
    }

    pub fn take_notices(&mut self) -> Vec<Notice> {
        std::mem::take(&mut self.notices)
    }

    /// Replaces `jobs` with the full list, newest first.
    pub async fn load(&mut self) {
        self.loading = true;
        match self.api.list_jobs().await {
            Ok(jobs) => self.jobs = jobs,
            Err(err) => error!(error = %err, "Error getting jobs"),
        }
        self.loading = false;
    }

    pub async fn load_user_jobs(&mut self, user_id: Uuid) {
        self.loading = true;
        match self.api.jobs_by_user(user_id).await {
            Ok(jobs) => self.user_jobs = jobs,
            Err(err) => error!(error = %err, "Error getting user jobs"),
        }
        self.loading = false;
    }

    /// Submits `draft` and prepends the created job locally. The draft is left as is.
    pub async fn create_job(
        &mut self,
        draft: &JobDraft,
        profile: Option<&UserProfileResponse>,
    ) -> Option<Job> {
        let job = match self.api.create_job(draft.to_payload()).await {
            Ok(job) => job,
            Err(err) => {
                error!(error = %err, "Error creating job");
                return None;
            }
        };

        self.notices.push(Notice::success("Job created successfully"));

        let creator = profile
            .filter(|p| p.id == job.created_by)
            .map(|p| CreatorSummary {
                id: p.id,
                name: p.name.clone(),
                email: None,
                profile_picture: p.profile_picture.clone(),
            });
        let view = JobView::new(job.clone(), creator);
        self.jobs.insert(0, view.clone());
        if profile.is_some() {
            self.user_jobs.insert(0, view);
        }
        Some(job)
    }

    /// Replaces `jobs` with the search results. Blank arguments are not sent.
    pub async fn search(&mut self, tags: &str, location: &str, title: &str) {
        let non_blank = |value: &str| Some(value.to_string()).filter(|v| !v.trim().is_empty());
        let query = JobSearchQuery {
            tags: non_blank(tags),
            location: non_blank(location),
            title: non_blank(title),
        };

        self.loading = true;
        match self.api.search_jobs(query).await {
            Ok(jobs) => self.jobs = jobs,
            Err(err) => error!(error = %err, "Error searching jobs"),
        }
        self.loading = false;
    }

    pub async fn get_job(&mut self, job_id: Uuid) -> Option<JobView> {
        self.loading = true;
        let result = self.api.get_job(job_id).await;
        self.loading = false;
        match result {
            Ok(job) => Some(job),
            Err(err) => {
                error!(error = %err, "Error getting job by id");
                None
            }
        }
    }

    pub async fn like(&mut self, job_id: Uuid) {
        match self.api.like_job(job_id).await {
            Ok(_) => self.notices.push(Notice::success("Job liked successfully")),
            Err(err) => error!(error = %err, "Error liking the job"),
        }
        self.load().await;
    }

    /// Apply is the one action whose failure is shown to the user.
    pub async fn apply(&mut self, job_id: Uuid) {
        match self.api.apply_job(job_id).await {
            Ok(_) => self
                .notices
                .push(Notice::success("Applied to job successfully")),
            Err(err) => {
                error!(error = %err, "Error applying to the job");
                self.notices.push(Notice::error(err.public_message()));
            }
        }
        self.load().await;
    }

    pub async fn delete(&mut self, job_id: Uuid) {
        match self.api.delete_job(job_id).await {
            Ok(()) => {
                self.user_jobs.retain(|job| job.id != job_id);
                self.notices.push(Notice::success("Job deleted successfully"));
            }
            Err(err) => error!(error = %err, "Error deleting the job"),
        }
        self.load().await;
    }
}
