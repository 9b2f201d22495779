use crate::auth::permission::Permission;

#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum Role {
    Admin = 1,
    Hr = 2,
    Employee = 3,
    System = 4,
    ApiUser = 5,
}

impl Role {
    pub fn from_id(id: u8) -> Option<Self> {
        match id {
            1 => Some(Role::Admin),
            2 => Some(Role::Hr),
            3 => Some(Role::Employee),
            4 => Some(Role::System),
            5 => Some(Role::ApiUser),
            _ => None,
        }
    }

    /// Permission tokens granted to the role, in `module:action` form.
    fn grants(&self) -> &'static [&'static str] {
        match self {
            Role::Admin => &["*:*"],
            Role::Hr => &[
                "attendance:*",
                "leave:*",
                "holiday:*",
                "employee:*",
                "dashboard:read",
                "settings:read",
                "activity_log:read",
            ],
            Role::Employee => &[
                "attendance:punch",
                "leave:create",
                "holiday:read",
                "dashboard:read",
            ],
            Role::System => &["attendance:read", "dashboard:read", "activity_log:read"],
            Role::ApiUser => &["attendance:read", "holiday:read"],
        }
    }

    pub fn permissions(&self) -> Vec<Permission> {
        self.grants()
            .iter()
            .filter_map(|token| token.parse().ok())
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_grant_parses() {
        for role in [Role::Admin, Role::Hr, Role::Employee, Role::System, Role::ApiUser] {
            assert_eq!(role.permissions().len(), role.grants().len(), "{role:?}");
        }
    }

    #[test]
    fn unknown_role_id_is_rejected() {
        assert_eq!(Role::from_id(2), Some(Role::Hr));
        assert_eq!(Role::from_id(9), None);
    }
}
