use std::str::FromStr;

use derive_more::Display;
use strum_macros::{Display as StrumDisplay, EnumString};

#[derive(Debug, Copy, Clone, Eq, PartialEq, StrumDisplay, EnumString)]
#[strum(serialize_all = "snake_case")]
pub enum Module {
    Attendance,
    Leave,
    Holiday,
    Employee,
    Dashboard,
    Settings,
    ActivityLog,
}

#[derive(Debug, Copy, Clone, Eq, PartialEq, StrumDisplay, EnumString)]
#[strum(serialize_all = "snake_case")]
pub enum Action {
    Read,
    Create,
    Update,
    Delete,
    Approve,
    Punch,
}

/// One side of a permission token: a concrete value or `*`.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum Scope<T> {
    Any,
    Only(T),
}

impl<T: PartialEq> Scope<T> {
    fn covers(&self, wanted: &T) -> bool {
        match self {
            Scope::Any => true,
            Scope::Only(v) => v == wanted,
        }
    }
}

impl<T: FromStr> FromStr for Scope<T> {
    type Err = T::Err;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s == "*" {
            Ok(Scope::Any)
        } else {
            s.parse().map(Scope::Only)
        }
    }
}

/// A `module:action` permission token, either side may be `*`.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub struct Permission {
    pub module: Scope<Module>,
    pub action: Scope<Action>,
}

impl Permission {
    pub const fn new(module: Module, action: Action) -> Self {
        Permission {
            module: Scope::Only(module),
            action: Scope::Only(action),
        }
    }

    /// Whether this (possibly wildcard) grant satisfies a concrete requirement.
    pub fn grants(&self, module: Module, action: Action) -> bool {
        self.module.covers(&module) && self.action.covers(&action)
    }
}

#[derive(Debug, Display, Eq, PartialEq)]
#[display(fmt = "invalid permission token: {}", _0)]
pub struct ParsePermissionError(String);

impl FromStr for Permission {
    type Err = ParsePermissionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || ParsePermissionError(s.to_string());
        let (module, action) = s.trim().split_once(':').ok_or_else(invalid)?;

        Ok(Permission {
            module: module.parse().map_err(|_| invalid())?,
            action: action.parse().map_err(|_| invalid())?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_concrete_and_wildcard_tokens() {
        let p: Permission = "attendance:punch".parse().unwrap();
        assert_eq!(p, Permission::new(Module::Attendance, Action::Punch));

        let any: Permission = "*:*".parse().unwrap();
        assert_eq!(any.module, Scope::Any);
        assert_eq!(any.action, Scope::Any);

        let p: Permission = "activity_log:read".parse().unwrap();
        assert!(p.grants(Module::ActivityLog, Action::Read));
    }

    #[test]
    fn rejects_malformed_tokens() {
        assert!("attendance".parse::<Permission>().is_err());
        assert!("payroll:read".parse::<Permission>().is_err());
        assert!("attendance:fly".parse::<Permission>().is_err());
    }

    #[test]
    fn wildcards_match() {
        let all: Permission = "*:*".parse().unwrap();
        assert!(all.grants(Module::Settings, Action::Update));

        let leave_any: Permission = "leave:*".parse().unwrap();
        assert!(leave_any.grants(Module::Leave, Action::Approve));
        assert!(!leave_any.grants(Module::Holiday, Action::Read));

        let exact = Permission::new(Module::Dashboard, Action::Read);
        assert!(exact.grants(Module::Dashboard, Action::Read));
        assert!(!exact.grants(Module::Dashboard, Action::Update));
    }
}
