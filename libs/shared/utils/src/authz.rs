use tracing::debug;

use shared_models::auth::{Role, User};
use shared_models::error::AppError;

const DENIED_NOTICE: &str = "You do not have permission to access this page.";

/// Declarative authorization policy: the set of roles allowed to perform an
/// operation. Evaluated once per request as a pure predicate; the deny
/// branch carries the redirect target the caller should be sent to.
#[derive(Debug, Clone, Copy)]
pub struct RolePolicy {
    allowed: &'static [Role],
}

impl RolePolicy {
    pub const ADMIN_ONLY: RolePolicy = RolePolicy::new(&[Role::Admin]);
    pub const DOCTOR_ONLY: RolePolicy = RolePolicy::new(&[Role::Doctor]);
    pub const PATIENT_ONLY: RolePolicy = RolePolicy::new(&[Role::Patient]);
    pub const DOCTOR_OR_ADMIN: RolePolicy = RolePolicy::new(&[Role::Doctor, Role::Admin]);
    pub const PATIENT_OR_ADMIN: RolePolicy = RolePolicy::new(&[Role::Patient, Role::Admin]);
    pub const ANY_ROLE: RolePolicy =
        RolePolicy::new(&[Role::Admin, Role::Doctor, Role::Patient]);

    pub const fn new(allowed: &'static [Role]) -> Self {
        Self { allowed }
    }

    /// Decide allow/deny for the caller. Unauthenticated callers are always
    /// denied toward the login entry point; authenticated callers outside
    /// the permitted set are denied toward their own landing route with a
    /// user-visible notice. No partial access, no elevation.
    pub fn authorize(&self, user: Option<&User>) -> Result<Role, AppError> {
        let user = match user {
            Some(user) => user,
            None => {
                debug!("Denying unauthenticated request");
                return Err(AppError::Auth("Login required".to_string()));
            }
        };

        if self.allowed.contains(&user.role) {
            return Ok(user.role);
        }

        debug!(
            "Denying user {} with role {} (allowed: {:?})",
            user.id, user.role, self.allowed
        );
        Err(AppError::Forbidden {
            notice: DENIED_NOTICE.to_string(),
            redirect_to: user.role.landing_route().to_string(),
        })
    }
}
