use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::{FromRow, PgPool};
use uuid::Uuid;

use super::{JobBoardStore, JobFilter, JobOrder};
use crate::error::{Error, Result};
use crate::models::job::{EmploymentType, Job};
use crate::models::user::User;

const USER_COLUMNS: &str =
    "id, auth0_id, email, name, role, profile_picture, applied_jobs, created_at, updated_at";

const JOB_COLUMNS: &str = "id, title, description, location, salary, salary_type, negotiable, job_type, tags, skills, created_by, applicants, likes, created_at, updated_at";

#[derive(Debug, FromRow)]
struct UserRow {
    id: Uuid,
    auth0_id: String,
    email: String,
    name: String,
    role: String,
    profile_picture: Option<String>,
    applied_jobs: Vec<Uuid>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<UserRow> for User {
    type Error = Error;

    fn try_from(row: UserRow) -> Result<Self> {
        Ok(Self {
            id: row.id,
            auth0_id: row.auth0_id,
            email: row.email,
            name: row.name,
            role: row.role.parse().map_err(Error::Internal)?,
            profile_picture: row.profile_picture,
            applied_jobs: row.applied_jobs,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

#[derive(Debug, FromRow)]
struct JobRow {
    id: Uuid,
    title: String,
    description: String,
    location: String,
    salary: Decimal,
    salary_type: String,
    negotiable: bool,
    job_type: Vec<String>,
    tags: Vec<String>,
    skills: Vec<String>,
    created_by: Uuid,
    applicants: Vec<Uuid>,
    likes: Vec<Uuid>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<JobRow> for Job {
    type Error = Error;

    fn try_from(row: JobRow) -> Result<Self> {
        let job_type = row
            .job_type
            .iter()
            .map(|label| label.parse::<EmploymentType>())
            .collect::<std::result::Result<Vec<_>, _>>()
            .map_err(Error::Internal)?;

        Ok(Self {
            id: row.id,
            title: row.title,
            description: row.description,
            location: row.location,
            salary: row.salary,
            salary_type: row.salary_type.parse().map_err(Error::Internal)?,
            negotiable: row.negotiable,
            job_type,
            tags: row.tags,
            skills: row.skills,
            created_by: row.created_by,
            applicants: row.applicants,
            likes: row.likes,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

fn job_type_labels(job: &Job) -> Vec<String> {
    job.job_type.iter().map(|kind| kind.label().to_string()).collect()
}

enum FilterArg {
    Text(String),
    TextList(Vec<String>),
    Id(Uuid),
}

/// PostgreSQL-backed store. Queries are checked at runtime so builds need no database.
#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl JobBoardStore for PgStore {
    fn backend(&self) -> &'static str {
        "postgres"
    }

    async fn ping(&self) -> Result<()> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }

    async fn find_user(&self, id: Uuid) -> Result<Option<User>> {
        let row = sqlx::query_as::<_, UserRow>(&format!(
            "SELECT {} FROM users WHERE id = $1",
            USER_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        row.map(User::try_from).transpose()
    }

    async fn find_user_by_auth0_id(&self, auth0_id: &str) -> Result<Option<User>> {
        let row = sqlx::query_as::<_, UserRow>(&format!(
            "SELECT {} FROM users WHERE auth0_id = $1",
            USER_COLUMNS
        ))
        .bind(auth0_id)
        .fetch_optional(&self.pool)
        .await?;

        row.map(User::try_from).transpose()
    }

    async fn find_users(&self, ids: &[Uuid]) -> Result<Vec<User>> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        let rows = sqlx::query_as::<_, UserRow>(&format!(
            "SELECT {} FROM users WHERE id = ANY($1)",
            USER_COLUMNS
        ))
        .bind(ids.to_vec())
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(User::try_from).collect()
    }

    async fn insert_user(&self, user: &User) -> Result<User> {
        let row = sqlx::query_as::<_, UserRow>(&format!(
            r#"
            INSERT INTO users (id, auth0_id, email, name, role, profile_picture, applied_jobs, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            ON CONFLICT (auth0_id) DO UPDATE SET auth0_id = EXCLUDED.auth0_id -- dummy update to return row
            RETURNING {}
            "#,
            USER_COLUMNS
        ))
        .bind(user.id)
        .bind(&user.auth0_id)
        .bind(&user.email)
        .bind(&user.name)
        .bind(user.role.as_str())
        .bind(&user.profile_picture)
        .bind(user.applied_jobs.clone())
        .bind(user.created_at)
        .bind(user.updated_at)
        .fetch_one(&self.pool)
        .await?;

        row.try_into()
    }

    async fn add_applied_job(&self, user_id: Uuid, job_id: Uuid) -> Result<Option<User>> {
        let row = sqlx::query_as::<_, UserRow>(&format!(
            r#"
            UPDATE users
            SET
                applied_jobs = CASE
                    WHEN $2::uuid = ANY(applied_jobs) THEN applied_jobs
                    ELSE array_append(applied_jobs, $2::uuid)
                END,
                updated_at = NOW()
            WHERE id = $1
            RETURNING {}
            "#,
            USER_COLUMNS
        ))
        .bind(user_id)
        .bind(job_id)
        .fetch_optional(&self.pool)
        .await?;

        row.map(User::try_from).transpose()
    }

    async fn find_job(&self, id: Uuid) -> Result<Option<Job>> {
        let row = sqlx::query_as::<_, JobRow>(&format!(
            "SELECT {} FROM jobs WHERE id = $1",
            JOB_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        row.map(Job::try_from).transpose()
    }

    async fn find_jobs(&self, filter: &JobFilter, order: JobOrder) -> Result<Vec<Job>> {
        let mut filters = Vec::new();
        let mut args: Vec<FilterArg> = Vec::new();

        if let Some(tags) = &filter.tags {
            filters.push(format!("tags && ${}::text[]", args.len() + 1));
            args.push(FilterArg::TextList(tags.clone()));
        }
        // STRPOS keeps user input literal; no LIKE wildcards to escape
        if let Some(location) = &filter.location {
            filters.push(format!("STRPOS(LOWER(location), LOWER(${})) > 0", args.len() + 1));
            args.push(FilterArg::Text(location.clone()));
        }
        if let Some(title) = &filter.title {
            filters.push(format!("STRPOS(LOWER(title), LOWER(${})) > 0", args.len() + 1));
            args.push(FilterArg::Text(title.clone()));
        }
        if let Some(created_by) = filter.created_by {
            filters.push(format!("created_by = ${}", args.len() + 1));
            args.push(FilterArg::Id(created_by));
        }

        let where_clause = if filters.is_empty() {
            "".to_string()
        } else {
            format!("WHERE {}", filters.join(" AND "))
        };
        let order_clause = match order {
            JobOrder::Natural => "ORDER BY seq ASC",
            JobOrder::NewestFirst => "ORDER BY created_at DESC, seq DESC",
        };

        let items_query = format!(
            "SELECT {} FROM jobs {} {}",
            JOB_COLUMNS, where_clause, order_clause
        );

        let mut statement = sqlx::query_as::<_, JobRow>(&items_query);
        for value in args {
            statement = match value {
                FilterArg::Text(text) => statement.bind(text),
                FilterArg::TextList(list) => statement.bind(list),
                FilterArg::Id(id) => statement.bind(id),
            };
        }
        let rows = statement.fetch_all(&self.pool).await?;

        rows.into_iter().map(Job::try_from).collect()
    }

    async fn insert_job(&self, job: &Job) -> Result<Job> {
        let row = sqlx::query_as::<_, JobRow>(&format!(
            r#"
            INSERT INTO jobs (
                id, title, description, location, salary, salary_type, negotiable,
                job_type, tags, skills, created_by, applicants, likes, created_at, updated_at
            ) VALUES (
                $1,$2,$3,$4,$5,$6,$7,
                $8,$9,$10,$11,$12,$13,$14,$15
            )
            RETURNING {}
            "#,
            JOB_COLUMNS
        ))
        .bind(job.id)
        .bind(&job.title)
        .bind(&job.description)
        .bind(&job.location)
        .bind(job.salary)
        .bind(job.salary_type.as_str())
        .bind(job.negotiable)
        .bind(job_type_labels(job))
        .bind(job.tags.clone())
        .bind(job.skills.clone())
        .bind(job.created_by)
        .bind(job.applicants.clone())
        .bind(job.likes.clone())
        .bind(job.created_at)
        .bind(job.updated_at)
        .fetch_one(&self.pool)
        .await?;

        row.try_into()
    }

    async fn add_applicant(&self, job_id: Uuid, user_id: Uuid) -> Result<Option<Job>> {
        let row = sqlx::query_as::<_, JobRow>(&format!(
            r#"
            UPDATE jobs
            SET applicants = array_append(applicants, $2::uuid), updated_at = NOW()
            WHERE id = $1 AND NOT ($2::uuid = ANY(applicants))
            RETURNING {}
            "#,
            JOB_COLUMNS
        ))
        .bind(job_id)
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;

        row.map(Job::try_from).transpose()
    }

    async fn remove_applicant(&self, job_id: Uuid, user_id: Uuid) -> Result<Option<Job>> {
        let row = sqlx::query_as::<_, JobRow>(&format!(
            r#"
            UPDATE jobs
            SET applicants = array_remove(applicants, $2::uuid), updated_at = NOW()
            WHERE id = $1
            RETURNING {}
            "#,
            JOB_COLUMNS
        ))
        .bind(job_id)
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;

        row.map(Job::try_from).transpose()
    }

    async fn toggle_like(&self, job_id: Uuid, user_id: Uuid) -> Result<Option<Job>> {
        let row = sqlx::query_as::<_, JobRow>(&format!(
            r#"
            UPDATE jobs
            SET
                likes = CASE
                    WHEN $2::uuid = ANY(likes) THEN array_remove(likes, $2::uuid)
                    ELSE array_append(likes, $2::uuid)
                END,
                updated_at = NOW()
            WHERE id = $1
            RETURNING {}
            "#,
            JOB_COLUMNS
        ))
        .bind(job_id)
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;

        row.map(Job::try_from).transpose()
    }

    async fn delete_job(&self, id: Uuid) -> Result<bool> {
        let res = sqlx::query("DELETE FROM jobs WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(res.rows_affected() > 0)
    }
}
