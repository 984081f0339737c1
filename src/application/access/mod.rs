use uuid::Uuid;

use crate::application::error::ServiceError;
use crate::domain::users::user::{ADMIN_ROLE, RoleWithPermissions, User};

const INSUFFICIENT: &str = "Access denied. Insufficient permissions.";

/// Authenticated caller with its active roles resolved.
#[derive(Debug, Clone)]
pub struct Principal {
    pub user: User,
    pub roles: Vec<RoleWithPermissions>,
}

impl Principal {
    pub fn id(&self) -> Uuid {
        self.user.id
    }

    pub fn role_names(&self) -> impl Iterator<Item = &str> {
        self.roles.iter().map(|r| r.role.name.as_str())
    }

    pub fn is_admin(&self) -> bool {
        has_role(self, ADMIN_ROLE)
    }
}

pub fn has_role(principal: &Principal, role: &str) -> bool {
    principal.role_names().any(|r| r == role)
}

pub fn has_permission(principal: &Principal, permission: &str) -> bool {
    principal
        .roles
        .iter()
        .flat_map(|r| r.permissions.iter())
        .any(|p| p.name == permission)
}

/// Every permission granted through any role, first occurrence kept.
pub fn permissions_of(principal: &Principal) -> Vec<String> {
    let mut out: Vec<String> = Vec::new();
    for perm in principal.roles.iter().flat_map(|r| r.permissions.iter()) {
        if !out.iter().any(|p| p == &perm.name) {
            out.push(perm.name.clone());
        }
    }
    out
}

pub fn require_roles(principal: &Principal, required: &[&str]) -> Result<(), ServiceError> {
    if required.is_empty() {
        return Ok(());
    }
    if principal.roles.is_empty() {
        return Err(ServiceError::forbidden("Access denied. No roles assigned."));
    }
    if required.iter().any(|r| has_role(principal, r)) {
        Ok(())
    } else {
        Err(ServiceError::forbidden(INSUFFICIENT))
    }
}

/// Admins pass regardless of the permissions they hold.
pub fn require_permissions(principal: &Principal, required: &[&str]) -> Result<(), ServiceError> {
    if required.is_empty() || principal.is_admin() {
        return Ok(());
    }
    if required.iter().any(|p| has_permission(principal, p)) {
        Ok(())
    } else {
        Err(ServiceError::forbidden(INSUFFICIENT))
    }
}

pub fn require_self_or_admin(principal: &Principal, target: Uuid) -> Result<(), ServiceError> {
    if principal.id() == target || principal.is_admin() {
        Ok(())
    } else {
        Err(ServiceError::forbidden("You can only access your own data"))
    }
}

/// Declarative requirement attached to a route: roles first, then permissions.
#[derive(Debug, Clone, Copy)]
pub struct Guard {
    pub roles: &'static [&'static str],
    pub permissions: &'static [&'static str],
}

impl Guard {
    pub const fn roles(roles: &'static [&'static str]) -> Self {
        Self {
            roles,
            permissions: &[],
        }
    }

    pub const fn admin_with(permissions: &'static [&'static str]) -> Self {
        Self {
            roles: &[ADMIN_ROLE],
            permissions,
        }
    }

    pub fn check(&self, principal: &Principal) -> Result<(), ServiceError> {
        require_roles(principal, self.roles)?;
        require_permissions(principal, self.permissions)
    }
}

#[cfg(test)]
pub(crate) mod testing {
    use chrono::Utc;

    use super::*;
    use crate::domain::users::user::{Permission, Role};

    pub fn principal(roles: &[(&str, &[&str])]) -> Principal {
        let now = Utc::now();
        let user = User {
            id: Uuid::new_v4(),
            email: "someone@example.com".into(),
            name: Some("Someone".into()),
            password_hash: String::new(),
            is_email_verified: true,
            email_verification_token: None,
            password_reset_token: None,
            password_reset_expires: None,
            avatar: None,
            created_at: now,
            updated_at: now,
            deleted_at: None,
        };
        let roles = roles
            .iter()
            .map(|(name, perms)| RoleWithPermissions {
                role: Role {
                    id: Uuid::new_v4(),
                    name: (*name).to_string(),
                    description: None,
                    is_active: true,
                    created_at: now,
                    updated_at: now,
                },
                permissions: perms
                    .iter()
                    .map(|p| {
                        let (module, action) = p.split_once('.').unwrap_or((*p, ""));
                        Permission {
                            id: Uuid::new_v4(),
                            name: (*p).to_string(),
                            description: None,
                            module: module.to_string(),
                            action: action.to_string(),
                            created_at: now,
                            updated_at: now,
                        }
                    })
                    .collect(),
            })
            .collect();
        Principal { user, roles }
    }
}
