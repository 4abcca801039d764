//! Authenticated caller identity

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::role::UserRole;

/// Identity established by the authentication layer before any approval
/// operation runs
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Caller {
    pub user_id: Uuid,
    pub role: UserRole,
    pub business_id: Uuid,
}

impl Caller {
    pub fn new(user_id: Uuid, role: impl Into<UserRole>, business_id: Uuid) -> Self {
        Self {
            user_id,
            role: role.into(),
            business_id,
        }
    }
}
