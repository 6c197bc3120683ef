use std::sync::Arc;

use tracing::{info, instrument};
use uuid::Uuid;
use validator::Validate;

use crate::error::{Error, Result};
use crate::models::principal::Principal;
use crate::models::user::{Role, User};
use crate::store::JobBoardStore;

/// Resolves authenticated principals to user records.
#[derive(Clone)]
pub struct UserService {
    store: Arc<dyn JobBoardStore>,
}

impl UserService {
    pub fn new(store: Arc<dyn JobBoardStore>) -> Self {
        Self { store }
    }

    /// Returns the user for `principal`, creating it on first sight.
    #[instrument(skip(self, principal), fields(sub = %principal.sub))]
    pub async fn ensure_user(&self, principal: &Principal) -> Result<User> {
        principal.validate()?;
        if let Some(user) = self.store.find_user_by_auth0_id(&principal.sub).await? {
            return Ok(user);
        }

        let now = crate::utils::time::now();
        let name = if principal.name.trim().is_empty() {
            principal.email.clone()
        } else {
            principal.name.trim().to_string()
        };
        let user = User {
            id: Uuid::new_v4(),
            auth0_id: principal.sub.clone(),
            email: principal.email.clone(),
            name,
            role: Role::default(),
            profile_picture: principal.picture.clone(),
            applied_jobs: Vec::new(),
            created_at: now,
            updated_at: now,
        };
        let user = self.store.insert_user(&user).await?;
        info!(user_id = %user.id, "created user for new principal");
        Ok(user)
    }

    pub async fn get_profile(&self, auth0_id: &str) -> Result<User> {
        self.store
            .find_user_by_auth0_id(auth0_id)
            .await?
            .ok_or_else(|| Error::NotFound("User not found".to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;

    fn principal(sub: &str) -> Principal {
        Principal {
            sub: sub.into(),
            email: "carol@example.com".into(),
            name: String::new(),
            picture: Some("https://cdn.example.com/carol.png".into()),
        }
    }

    #[tokio::test]
    async fn ensure_user_creates_once() {
        let service = UserService::new(Arc::new(MemoryStore::new()));
        let first = service.ensure_user(&principal("auth0|carol")).await.unwrap();
        let second = service.ensure_user(&principal("auth0|carol")).await.unwrap();

        assert_eq!(first.id, second.id);
        assert_eq!(first.role, Role::Jobseeker);
        assert_eq!(first.name, "carol@example.com");
        assert!(first.applied_jobs.is_empty());
    }

    #[tokio::test]
    async fn ensure_user_rejects_malformed_claims() {
        let service = UserService::new(Arc::new(MemoryStore::new()));
        let mut bad = principal("auth0|dave");
        bad.email = "not-an-email".into();
        let err = service.ensure_user(&bad).await.unwrap_err();
        assert!(matches!(err, Error::Validation(_)));
    }

    #[tokio::test]
    async fn missing_profile_is_not_found() {
        let service = UserService::new(Arc::new(MemoryStore::new()));
        let err = service.get_profile("auth0|nobody").await.unwrap_err();
        assert_eq!(err.public_message(), "User not found");
    }
}
