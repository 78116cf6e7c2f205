//! Well-known role name constants.
//!
//! These must match the CHECK constraint on `users.role` in
//! `20260301000002_create_users_table.sql`.

pub const ROLE_ADMIN: &str = "admin";
pub const ROLE_PMO_DIRECTOR: &str = "pmo_director";
pub const ROLE_PROJECT_MANAGER: &str = "project_manager";
pub const ROLE_TEAM_MEMBER: &str = "team_member";
pub const ROLE_STAKEHOLDER: &str = "stakeholder";

/// Every assignable role, in descending order of privilege.
pub const ALL_ROLES: &[&str] = &[
    ROLE_ADMIN,
    ROLE_PMO_DIRECTOR,
    ROLE_PROJECT_MANAGER,
    ROLE_TEAM_MEMBER,
    ROLE_STAKEHOLDER,
];

/// Role given to self-registered accounts.
pub const DEFAULT_ROLE: &str = ROLE_TEAM_MEMBER;

pub fn is_valid_role(role: &str) -> bool {
    ALL_ROLES.contains(&role)
}

/// Admins and PMO directors see portfolio-wide administration screens.
pub fn is_pmo_director(role: &str) -> bool {
    matches!(role, ROLE_ADMIN | ROLE_PMO_DIRECTOR)
}

/// Project managers and above may create, edit, and delete project data.
pub fn can_edit_projects(role: &str) -> bool {
    matches!(role, ROLE_ADMIN | ROLE_PMO_DIRECTOR | ROLE_PROJECT_MANAGER)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn edit_permission_follows_role_hierarchy() {
        assert!(can_edit_projects(ROLE_ADMIN));
        assert!(can_edit_projects(ROLE_PMO_DIRECTOR));
        assert!(can_edit_projects(ROLE_PROJECT_MANAGER));
        assert!(!can_edit_projects(ROLE_TEAM_MEMBER));
        assert!(!can_edit_projects(ROLE_STAKEHOLDER));
    }

    #[test]
    fn director_check_excludes_managers() {
        assert!(is_pmo_director(ROLE_PMO_DIRECTOR));
        assert!(!is_pmo_director(ROLE_PROJECT_MANAGER));
    }

    #[test]
    fn unknown_role_is_invalid() {
        assert!(is_valid_role("stakeholder"));
        assert!(!is_valid_role("superuser"));
        assert!(!can_edit_projects("superuser"));
    }
}
