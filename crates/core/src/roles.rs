//! Well-known role name constants.
//!
//! These must match the CHECK constraint on `users.role` in
//! `20260301000001_create_users.sql`.

pub const ROLE_ADMIN: &str = "admin";
pub const ROLE_MANAGER: &str = "manager";
pub const ROLE_CLOTHING_MANAGER: &str = "clothing_manager";
pub const ROLE_BRIC_A_BRAC_MANAGER: &str = "bric_a_brac_manager";
pub const ROLE_EMPLOYEE: &str = "employee";

/// All valid role values.
pub const VALID_ROLES: &[&str] = &[
    ROLE_ADMIN,
    ROLE_MANAGER,
    ROLE_CLOTHING_MANAGER,
    ROLE_BRIC_A_BRAC_MANAGER,
    ROLE_EMPLOYEE,
];

/// Validate that a role string is one of the accepted values.
pub fn validate_role(role: &str) -> Result<(), String> {
    if VALID_ROLES.contains(&role) {
        Ok(())
    } else {
        Err(format!(
            "Invalid role '{role}'. Must be one of: {}",
            VALID_ROLES.join(", ")
        ))
    }
}

pub fn is_admin(role: &str) -> bool {
    role == ROLE_ADMIN
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn all_known_roles_validate() {
        for role in VALID_ROLES {
            assert!(validate_role(role).is_ok());
        }
    }

    #[test]
    fn unknown_role_rejected() {
        let err = validate_role("superuser").unwrap_err();
        assert!(err.contains("Invalid role"));
    }

    #[test]
    fn only_admin_is_admin() {
        assert!(is_admin(ROLE_ADMIN));
        assert!(!is_admin(ROLE_MANAGER));
        assert!(!is_admin("Admin"));
    }
}
