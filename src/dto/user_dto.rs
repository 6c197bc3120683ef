use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::principal::Principal;
use crate::models::user::{Role, User};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserProfileResponse {
    pub id: Uuid,
    pub auth0_id: String,
    pub email: String,
    pub name: String,
    pub role: Role,
    pub profile_picture: Option<String>,
    pub applied_jobs: Vec<Uuid>,
    pub created_at: DateTime<Utc>,
}

impl From<User> for UserProfileResponse {
    fn from(value: User) -> Self {
        Self {
            id: value.id,
            auth0_id: value.auth0_id,
            email: value.email,
            name: value.name,
            role: value.role,
            profile_picture: value.profile_picture,
            applied_jobs: value.applied_jobs,
            created_at: value.created_at,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckAuthResponse {
    pub is_authenticated: bool,
    pub user: Option<Principal>,
}
