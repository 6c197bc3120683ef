use serde::{Deserialize, Serialize};
use validator::Validate;

/// The authenticated caller as reported by the identity provider.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
pub struct Principal {
    #[validate(length(min = 1))]
    pub sub: String,
    #[validate(email)]
    pub email: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    #[validate(url)]
    pub picture: Option<String>,
}
