//! Role-based access to approval queues
//!
//! Managers see and decide only their own queue. Admins may read any
//! manager's queue (defaulting to the inventory queue) but never decide.

use tracing::warn;

use crate::error::{ApprovalError, ApprovalResult};
use crate::models::{Caller, ManagerRole, UserRole};

/// Queue an admin reads when no role is requested
pub const ADMIN_DEFAULT_ROLE: ManagerRole = ManagerRole::InventoryManager;

/// Resolve the manager role whose queue `caller` may read
pub fn resolve_readable_role(
    caller: Option<&Caller>,
    requested_role: Option<&str>,
) -> ApprovalResult<ManagerRole> {
    let caller = caller.ok_or(ApprovalError::Unauthenticated)?;
    let requested_role = requested_role.map(str::trim).filter(|r| !r.is_empty());

    match &caller.role {
        UserRole::Manager(own) => match requested_role {
            None => Ok(*own),
            Some(requested) if requested == own.as_str() => Ok(*own),
            Some(requested) => {
                warn!(
                    user_id = %caller.user_id,
                    role = %own,
                    requested,
                    "Manager requested another manager's queue"
                );
                Err(ApprovalError::forbidden(
                    "Managers can only access their own queue",
                ))
            }
        },
        UserRole::Admin => match requested_role {
            None => Ok(ADMIN_DEFAULT_ROLE),
            Some(requested) => requested.parse::<ManagerRole>().map_err(|_| {
                ApprovalError::invalid_input(format!("Invalid role: {}", requested))
            }),
        },
        UserRole::Other(role) => {
            warn!(user_id = %caller.user_id, role = %role, "Role has no approval queue");
            Err(ApprovalError::forbidden(format!(
                "Role '{}' cannot access approvals",
                role
            )))
        }
    }
}

/// Require a manager role; decisions are never made by admins
pub fn ensure_manager_role(caller: Option<&Caller>) -> ApprovalResult<ManagerRole> {
    let caller = caller.ok_or(ApprovalError::Unauthenticated)?;

    caller.role.manager_role().ok_or_else(|| {
        warn!(
            user_id = %caller.user_id,
            role = %caller.role,
            "Non-manager attempted an approval decision"
        );
        ApprovalError::forbidden("Only managers can review approvals")
    })
}
