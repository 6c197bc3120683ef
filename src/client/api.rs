use async_trait::async_trait;
use reqwest::{Client, Method, RequestBuilder, Url};
use serde::de::DeserializeOwned;
use serde_json::Value as JsonValue;
use uuid::Uuid;

use crate::dto::job_dto::{CreateJobPayload, JobSearchQuery, JobView};
use crate::dto::user_dto::{CheckAuthResponse, UserProfileResponse};
use crate::error::{Error, Result};
use crate::models::job::Job;

/// The job board API as seen from a client.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait JobsApi: Send + Sync {
    async fn check_auth(&self) -> Result<CheckAuthResponse>;

    async fn user_profile(&self, auth0_id: String) -> Result<UserProfileResponse>;

    async fn list_jobs(&self) -> Result<Vec<JobView>>;

    async fn search_jobs(&self, query: JobSearchQuery) -> Result<Vec<JobView>>;

    async fn jobs_by_user(&self, user_id: Uuid) -> Result<Vec<JobView>>;

    async fn get_job(&self, job_id: Uuid) -> Result<JobView>;

    async fn create_job(&self, payload: CreateJobPayload) -> Result<Job>;

    async fn like_job(&self, job_id: Uuid) -> Result<Job>;

    async fn apply_job(&self, job_id: Uuid) -> Result<Job>;

    async fn delete_job(&self, job_id: Uuid) -> Result<()>;
}

/// `reqwest`-backed [`JobsApi`]. Sends the session token as a bearer token.
#[derive(Clone)]
pub struct HttpJobsApi {
    client: Client,
    base_url: Url,
    session_token: Option<String>,
}

impl HttpJobsApi {
    pub fn new(base_url: &str) -> Result<Self> {
        let base_url = Url::parse(base_url)
            .map_err(|e| Error::Config(format!("invalid API base URL {}: {}", base_url, e)))?;
        if base_url.cannot_be_a_base() {
            return Err(Error::Config(format!("{} cannot be used as a base URL", base_url)));
        }
        let client = Client::builder()
            .timeout(std::time::Duration::from_secs(30))
            .build()?;
        Ok(Self {
            client,
            base_url,
            session_token: None,
        })
    }

    pub fn with_session_token(mut self, token: impl Into<String>) -> Self {
        self.session_token = Some(token.into());
        self
    }

    /// `/api/v1/<segments>` under the base URL. Each segment is percent-encoded.
    fn endpoint(&self, segments: &[&str]) -> Result<Url> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| Error::Config(format!("{} cannot be used as a base URL", self.base_url)))?
            .pop_if_empty()
            .extend(["api", "v1"])
            .extend(segments);
        Ok(url)
    }

    fn request(&self, method: Method, segments: &[&str]) -> Result<RequestBuilder> {
        let builder = self.client.request(method, self.endpoint(segments)?);
        Ok(match &self.session_token {
            Some(token) => builder.bearer_auth(token),
            None => builder,
        })
    }

    async fn send<T: DeserializeOwned>(builder: RequestBuilder) -> Result<T> {
        let resp = builder.send().await?;
        if !resp.status().is_success() {
            return Err(error_from_response(resp).await);
        }
        Ok(resp.json::<T>().await?)
    }

    async fn send_empty(builder: RequestBuilder) -> Result<()> {
        let resp = builder.send().await?;
        if !resp.status().is_success() {
            return Err(error_from_response(resp).await);
        }
        Ok(())
    }
}

/// Rebuilds the server's error from its status and `{message}` body.
async fn error_from_response(resp: reqwest::Response) -> Error {
    let status = resp.status().as_u16();
    let message = resp
        .json::<JsonValue>()
        .await
        .ok()
        .and_then(|body| body.get("message").and_then(|m| m.as_str()).map(str::to_string))
        .unwrap_or_else(|| format!("request failed with status {}", status));
    error_from_status(status, message)
}

pub fn error_from_status(status: u16, message: String) -> Error {
    match status {
        400 => Error::BadRequest(message),
        401 => Error::Unauthorized(message),
        403 => Error::Forbidden(message),
        404 => Error::NotFound(message),
        _ => Error::Internal(message),
    }
}

#[async_trait]
impl JobsApi for HttpJobsApi {
    async fn check_auth(&self) -> Result<CheckAuthResponse> {
        Self::send(self.request(Method::GET, &["check-auth"])?).await
    }

    async fn user_profile(&self, auth0_id: String) -> Result<UserProfileResponse> {
        Self::send(self.request(Method::GET, &["users", &auth0_id])?).await
    }

    async fn list_jobs(&self) -> Result<Vec<JobView>> {
        Self::send(self.request(Method::GET, &["jobs"])?).await
    }

    async fn search_jobs(&self, query: JobSearchQuery) -> Result<Vec<JobView>> {
        Self::send(self.request(Method::GET, &["jobs", "search"])?.query(&query)).await
    }

    async fn jobs_by_user(&self, user_id: Uuid) -> Result<Vec<JobView>> {
        let user_id = user_id.to_string();
        Self::send(self.request(Method::GET, &["jobs", "users", &user_id])?).await
    }

    async fn get_job(&self, job_id: Uuid) -> Result<JobView> {
        let job_id = job_id.to_string();
        Self::send(self.request(Method::GET, &["jobs", &job_id])?).await
    }

    async fn create_job(&self, payload: CreateJobPayload) -> Result<Job> {
        Self::send(self.request(Method::POST, &["jobs"])?.json(&payload)).await
    }

    async fn like_job(&self, job_id: Uuid) -> Result<Job> {
        let job_id = job_id.to_string();
        Self::send(self.request(Method::PUT, &["jobs", &job_id, "like"])?).await
    }

    async fn apply_job(&self, job_id: Uuid) -> Result<Job> {
        let job_id = job_id.to_string();
        Self::send(self.request(Method::PUT, &["jobs", &job_id, "apply"])?).await
    }

    async fn delete_job(&self, job_id: Uuid) -> Result<()> {
        let job_id = job_id.to_string();
        Self::send_empty(self.request(Method::DELETE, &["jobs", &job_id])?).await
    }
}
