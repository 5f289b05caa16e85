use std::convert::TryFrom;
use std::fmt;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{AppError, AppResult};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Admin,
    Planner,
    Viewer,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Admin => "admin",
            Role::Planner => "planner",
            Role::Viewer => "viewer",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl TryFrom<&str> for Role {
    type Error = String;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value {
            "admin" => Ok(Role::Admin),
            "planner" => Ok(Role::Planner),
            "viewer" => Ok(Role::Viewer),
            other => Err(format!("unsupported role: {other}")),
        }
    }
}

/// What a command needs from the caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Access {
    Read,
    /// Commitment and absence writes.
    Plan,
    /// Organisation, people, teams and projects.
    Administer,
}

impl Access {
    fn allows(self, role: Role) -> bool {
        match self {
            Access::Read => true,
            Access::Plan => matches!(role, Role::Planner | Role::Admin),
            Access::Administer => role == Role::Admin,
        }
    }

    fn as_str(self) -> &'static str {
        match self {
            Access::Read => "read",
            Access::Plan => "plan",
            Access::Administer => "administer",
        }
    }
}

/// Identity of whoever invokes a command, bound to one organisation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CallerContext {
    pub organisation_id: String,
    #[serde(default)]
    pub roles: Vec<Role>,
}

impl CallerContext {
    pub fn new(organisation_id: impl Into<String>, roles: Vec<Role>) -> Self {
        Self {
            organisation_id: organisation_id.into(),
            roles,
        }
    }

    pub fn has_role(&self, role: Role) -> bool {
        self.roles.contains(&role)
    }

    /// Access to anything outside a specific organisation, such as creating
    /// a new one.
    pub fn authorize_global(&self, access: Access) -> AppResult<()> {
        if self.roles.iter().any(|role| access.allows(*role)) {
            return Ok(());
        }
        Err(AppError::forbidden(format!(
            "{} access requires another role",
            access.as_str()
        )))
    }

    pub fn authorize(&self, organisation_id: &str, access: Access) -> AppResult<()> {
        if self.organisation_id != organisation_id {
            return Err(AppError::forbidden(format!(
                "caller is not a member of organisation {organisation_id}"
            )));
        }
        self.authorize_global(access)?;
        debug!(
            target: "app::auth",
            organisation_id,
            access = access.as_str(),
            "caller authorized"
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn roles_map_to_access_levels() {
        let viewer = CallerContext::new("o1", vec![Role::Viewer]);
        assert!(viewer.authorize("o1", Access::Read).is_ok());
        assert!(viewer.authorize("o1", Access::Plan).unwrap_err().is_forbidden());
        assert!(viewer.authorize("o1", Access::Administer).is_err());

        let planner = CallerContext::new("o1", vec![Role::Planner]);
        assert!(planner.authorize("o1", Access::Plan).is_ok());
        assert!(planner.authorize("o1", Access::Administer).is_err());

        let admin = CallerContext::new("o1", vec![Role::Admin]);
        assert!(admin.authorize("o1", Access::Plan).is_ok());
        assert!(admin.authorize("o1", Access::Administer).is_ok());
    }

    #[test]
    fn other_organisations_and_empty_roles_are_forbidden() {
        let admin = CallerContext::new("o1", vec![Role::Admin]);
        assert!(admin.authorize("o2", Access::Read).unwrap_err().is_forbidden());

        let nobody = CallerContext::new("o1", Vec::new());
        assert!(nobody.authorize("o1", Access::Read).is_err());
    }

    #[test]
    fn caller_context_deserializes_from_camel_case() {
        let caller: CallerContext =
            serde_json::from_str(r#"{"organisationId":"o1","roles":["planner","viewer"]}"#)
                .unwrap();
        assert!(caller.has_role(Role::Planner));
        assert_eq!(Role::try_from("admin").unwrap(), Role::Admin);
        assert!(Role::try_from("root").is_err());
    }
}
