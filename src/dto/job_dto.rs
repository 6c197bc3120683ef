use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{Error, Result};
use crate::models::job::{CreatorSummary, EmploymentType, Job, SalaryType};
use crate::store::JobFilter;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Location {
    pub country: String,
    pub city: String,
    pub address: String,
}

impl Location {
    /// Free-text form used for storage and substring search: "address, city, country".
    pub fn to_text(&self) -> String {
        [&self.address, &self.city, &self.country]
            .iter()
            .map(|part| part.trim())
            .filter(|part| !part.is_empty())
            .collect::<Vec<_>>()
            .join(", ")
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum LocationInput {
    Text(String),
    Structured(Location),
}

impl LocationInput {
    pub fn to_text(&self) -> String {
        match self {
            LocationInput::Text(text) => text.trim().to_string(),
            LocationInput::Structured(location) => location.to_text(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum JobTypeInput {
    One(EmploymentType),
    Many(Vec<EmploymentType>),
}

impl JobTypeInput {
    pub fn into_vec(self) -> Vec<EmploymentType> {
        let mut kinds = match self {
            JobTypeInput::One(kind) => vec![kind],
            JobTypeInput::Many(kinds) => kinds,
        };
        kinds.sort();
        kinds.dedup();
        kinds
    }
}

/// Salaries are stored as `NUMERIC(14, 2)`.
const SALARY_SCALE: u32 = 2;
const MAX_SALARY_EXCLUSIVE: i64 = 1_000_000_000_000;

/// Body of `POST /jobs`. Every field is optional on the wire so that a
/// missing field is reported by name instead of as a decode failure.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct CreateJobPayload {
    pub title: Option<String>,
    pub description: Option<String>,
    pub location: Option<LocationInput>,
    pub salary: Option<Decimal>,
    pub job_type: Option<JobTypeInput>,
    pub tags: Option<Vec<String>>,
    pub skills: Option<Vec<String>>,
    pub salary_type: Option<SalaryType>,
    pub negotiable: Option<bool>,
}

/// A create request that passed validation.
#[derive(Debug, Clone, PartialEq)]
pub struct NewJob {
    pub title: String,
    pub description: String,
    pub location: String,
    pub salary: Decimal,
    pub salary_type: SalaryType,
    pub negotiable: bool,
    pub job_type: Vec<EmploymentType>,
    pub tags: Vec<String>,
    pub skills: Vec<String>,
}

impl CreateJobPayload {
    /// Checks required fields in form order and reports the first one missing.
    pub fn into_new_job(self) -> Result<NewJob> {
        let title = required_text(self.title, "Title")?;
        let description = required_text(self.description, "Description")?;
        let location = self
            .location
            .map(|location| location.to_text())
            .filter(|text| !text.is_empty())
            .ok_or_else(|| missing("Location"))?;
        let salary = self
            .salary
            .filter(|salary| !salary.is_zero())
            .ok_or_else(|| missing("Salary"))?;
        if salary.is_sign_negative() {
            return Err(Error::BadRequest(
                "Salary must be a positive number".to_string(),
            ));
        }
        if salary.normalize().scale() > SALARY_SCALE {
            return Err(Error::BadRequest(format!(
                "Salary must have at most {} decimal places",
                SALARY_SCALE
            )));
        }
        if salary >= Decimal::from(MAX_SALARY_EXCLUSIVE) {
            return Err(Error::BadRequest("Salary is too large".to_string()));
        }
        let job_type = self
            .job_type
            .map(JobTypeInput::into_vec)
            .filter(|kinds| !kinds.is_empty())
            .ok_or_else(|| missing("JobType"))?;
        let tags = required_list(self.tags, "Tags")?;
        let skills = required_list(self.skills, "Skills")?;

        Ok(NewJob {
            title,
            description,
            location,
            salary,
            salary_type: self.salary_type.unwrap_or_default(),
            negotiable: self.negotiable.unwrap_or(false),
            job_type,
            tags,
            skills,
        })
    }
}

fn missing(field: &str) -> Error {
    Error::BadRequest(format!("{} is required", field))
}

fn required_text(value: Option<String>, field: &str) -> Result<String> {
    value
        .map(|text| text.trim().to_string())
        .filter(|text| !text.is_empty())
        .ok_or_else(|| missing(field))
}

fn required_list(value: Option<Vec<String>>, field: &str) -> Result<Vec<String>> {
    value
        .map(normalize_labels)
        .filter(|items| !items.is_empty())
        .ok_or_else(|| missing(field))
}

/// Trims entries, drops blanks and repeats, keeps first-seen order.
pub fn normalize_labels<I, S>(items: I) -> Vec<String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut out: Vec<String> = Vec::new();
    for item in items {
        let item = item.as_ref().trim();
        if !item.is_empty() && !out.iter().any(|existing| existing == item) {
            out.push(item.to_string());
        }
    }
    out
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct JobSearchQuery {
    pub tags: Option<String>,
    pub location: Option<String>,
    pub title: Option<String>,
}

impl JobSearchQuery {
    pub fn into_filter(self) -> JobFilter {
        let tags = self
            .tags
            .map(|raw| normalize_labels(raw.split(',')))
            .filter(|tags| !tags.is_empty());
        let location = self
            .location
            .map(|text| text.trim().to_string())
            .filter(|text| !text.is_empty());
        let title = self
            .title
            .map(|text| text.trim().to_string())
            .filter(|text| !text.is_empty());

        JobFilter {
            tags,
            location,
            title,
            created_by: None,
        }
    }
}

/// A job with its creator resolved, as returned by the listing endpoints.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JobView {
    pub id: Uuid,
    pub title: String,
    pub description: String,
    pub location: String,
    pub salary: Decimal,
    pub salary_type: SalaryType,
    pub negotiable: bool,
    pub job_type: Vec<EmploymentType>,
    pub tags: Vec<String>,
    pub skills: Vec<String>,
    pub created_by: Option<CreatorSummary>,
    pub applicants: Vec<Uuid>,
    pub likes: Vec<Uuid>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl JobView {
    pub fn new(job: Job, creator: Option<CreatorSummary>) -> Self {
        Self {
            id: job.id,
            title: job.title,
            description: job.description,
            location: job.location,
            salary: job.salary,
            salary_type: job.salary_type,
            negotiable: job.negotiable,
            job_type: job.job_type,
            tags: job.tags,
            skills: job.skills,
            created_by: creator,
            applicants: job.applicants,
            likes: job.likes,
            created_at: job.created_at,
            updated_at: job.updated_at,
        }
    }
}
