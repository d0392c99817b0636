//! Authorization for the admin backend
//!
//! Access is role based and static: every list declares which roles may
//! query, create, update and delete its records, and the check runs at the
//! request boundary before any lifecycle hook sees the payload.

use crate::core::error::RequestError;
use async_trait::async_trait;
use axum::extract::FromRequestParts;
use axum::http::HeaderMap;
use axum::http::request::Parts;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;
use uuid::Uuid;

/// Header carrying the authenticated user's id
pub const USER_ID_HEADER: &str = "x-user-id";

/// Header carrying the authenticated user's roles, comma separated
pub const USER_ROLES_HEADER: &str = "x-user-roles";

/// Roles known to the admin backend
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    Admin,
    Moderator,
    Editor,
    Contributor,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Admin => "admin",
            Role::Moderator => "moderator",
            Role::Editor => "editor",
            Role::Contributor => "contributor",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "admin" => Ok(Role::Admin),
            "moderator" => Ok(Role::Moderator),
            "editor" => Ok(Role::Editor),
            "contributor" => Ok(Role::Contributor),
            other => Err(format!("unknown role '{}'", other)),
        }
    }
}

/// Kind of operation a request performs on a list
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Operation {
    Query,
    Create,
    Update,
    Delete,
}

impl Operation {
    pub const ALL: [Operation; 4] = [
        Operation::Query,
        Operation::Create,
        Operation::Update,
        Operation::Delete,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Operation::Query => "query",
            Operation::Create => "create",
            Operation::Update => "update",
            Operation::Delete => "delete",
        }
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Authorization context extracted from a request
#[derive(Debug, Clone, PartialEq)]
pub enum AuthContext {
    /// Authenticated user
    User { user_id: Uuid, roles: Vec<Role> },

    /// No credentials on the request
    Anonymous,
}

impl AuthContext {
    /// Convenience constructor used by services and tests
    pub fn user(user_id: Uuid, roles: impl IntoIterator<Item = Role>) -> Self {
        AuthContext::User {
            user_id,
            roles: roles.into_iter().collect(),
        }
    }

    /// Get user_id if available
    pub fn user_id(&self) -> Option<Uuid> {
        match self {
            AuthContext::User { user_id, .. } => Some(*user_id),
            AuthContext::Anonymous => None,
        }
    }

    pub fn has_role(&self, role: Role) -> bool {
        match self {
            AuthContext::User { roles, .. } => roles.contains(&role),
            AuthContext::Anonymous => false,
        }
    }

    pub fn is_anonymous(&self) -> bool {
        matches!(self, AuthContext::Anonymous)
    }
}

/// Authorization policy for an operation
#[derive(Debug, Clone, PartialEq)]
pub enum AuthPolicy {
    /// Public access (no auth required)
    Public,

    /// Any authenticated user
    Authenticated,

    /// User must have one of these roles
    HasRole(Vec<Role>),

    /// Nobody, not even admins
    Deny,

    /// Combination of policies (AND)
    And(Vec<AuthPolicy>),

    /// Combination of policies (OR)
    Or(Vec<AuthPolicy>),
}

impl AuthPolicy {
    /// Shorthand for `HasRole`, reads like the list declarations
    pub fn allow_roles(roles: &[Role]) -> Self {
        AuthPolicy::HasRole(roles.to_vec())
    }

    /// Check if auth context satisfies this policy
    pub fn check(&self, context: &AuthContext) -> bool {
        match self {
            AuthPolicy::Public => true,

            AuthPolicy::Authenticated => !context.is_anonymous(),

            AuthPolicy::HasRole(required) => required.iter().any(|r| context.has_role(*r)),

            AuthPolicy::Deny => false,

            AuthPolicy::And(policies) => policies.iter().all(|p| p.check(context)),

            AuthPolicy::Or(policies) => policies.iter().any(|p| p.check(context)),
        }
    }

    /// Parse a policy from its config string
    ///
    /// Accepted forms: `public`, `authenticated`, `deny`, `role:<name>` and
    /// `roles:<a>,<b>,...`.
    pub fn parse_policy(s: &str) -> Result<Self, String> {
        let s = s.trim();
        match s {
            "public" => Ok(AuthPolicy::Public),
            "authenticated" => Ok(AuthPolicy::Authenticated),
            "deny" => Ok(AuthPolicy::Deny),
            _ => {
                let names = s
                    .strip_prefix("roles:")
                    .or_else(|| s.strip_prefix("role:"))
                    .ok_or_else(|| format!("unknown policy '{}'", s))?;
                let roles = names
                    .split(',')
                    .filter(|n| !n.trim().is_empty())
                    .map(Role::from_str)
                    .collect::<Result<Vec<_>, _>>()?;
                if roles.is_empty() {
                    return Err(format!("policy '{}' names no roles", s));
                }
                Ok(AuthPolicy::HasRole(roles))
            }
        }
    }
}

/// Static operation → policy map for one list
///
/// Operations without an entry are denied.
#[derive(Debug, Clone)]
pub struct ListAccess {
    list: String,
    operations: HashMap<Operation, AuthPolicy>,
}

impl ListAccess {
    pub fn new(list: impl Into<String>) -> Self {
        Self {
            list: list.into(),
            operations: HashMap::new(),
        }
    }

    /// Set the policy for one operation
    pub fn allow(mut self, operation: Operation, policy: AuthPolicy) -> Self {
        self.operations.insert(operation, policy);
        self
    }

    pub fn policy(&self, operation: Operation) -> Option<&AuthPolicy> {
        self.operations.get(&operation)
    }

    /// Check an operation against the map
    ///
    /// Anonymous callers get `Unauthorized`, authenticated callers without a
    /// matching role get `Forbidden`.
    pub fn check(&self, operation: Operation, context: &AuthContext) -> Result<(), RequestError> {
        let allowed = self
            .operations
            .get(&operation)
            .is_some_and(|policy| policy.check(context));

        if allowed {
            return Ok(());
        }

        tracing::warn!(
            list = %self.list,
            operation = %operation,
            user_id = ?context.user_id(),
            "access denied"
        );

        if context.is_anonymous() {
            Err(RequestError::Unauthorized {
                message: format!("authentication required to {} {}", operation, self.list),
            })
        } else {
            Err(RequestError::Forbidden {
                message: format!("not allowed to {} {}", operation, self.list),
            })
        }
    }
}

/// Trait for auth providers
#[async_trait]
pub trait AuthProvider: Send + Sync {
    /// Extract auth context from HTTP request headers
    async fn extract_context(&self, headers: &HeaderMap) -> Result<AuthContext, RequestError>;
}

/// Reads the caller from `x-user-id` / `x-user-roles`
///
/// Meant to sit behind a gateway that authenticates the session and forwards
/// the identity. Unknown role names are ignored.
#[derive(Debug, Clone, Default)]
pub struct HeaderAuthProvider;

#[async_trait]
impl AuthProvider for HeaderAuthProvider {
    async fn extract_context(&self, headers: &HeaderMap) -> Result<AuthContext, RequestError> {
        let Some(raw_id) = headers.get(USER_ID_HEADER) else {
            return Ok(AuthContext::Anonymous);
        };

        let user_id = raw_id
            .to_str()
            .ok()
            .and_then(|s| Uuid::parse_str(s.trim()).ok())
            .ok_or_else(|| RequestError::Unauthorized {
                message: format!("malformed {} header", USER_ID_HEADER),
            })?;

        let roles = headers
            .get(USER_ROLES_HEADER)
            .and_then(|v| v.to_str().ok())
            .map(|raw| {
                raw.split(',')
                    .filter_map(|name| match Role::from_str(name) {
                        Ok(role) => Some(role),
                        Err(e) => {
                            tracing::debug!(error = %e, "ignoring role");
                            None
                        }
                    })
                    .collect()
            })
            .unwrap_or_default();

        Ok(AuthContext::User { user_id, roles })
    }
}

/// Shared handle to the configured provider, stored as a request extension
#[derive(Clone)]
pub struct SharedAuthProvider(pub Arc<dyn AuthProvider>);

/// Axum extractor for the caller's [`AuthContext`]
///
/// Uses the provider installed by the server builder and falls back to
/// [`HeaderAuthProvider`] when none is installed.
#[derive(Debug, Clone)]
pub struct CurrentUser(pub AuthContext);

impl<S> FromRequestParts<S> for CurrentUser
where
    S: Send + Sync,
{
    type Rejection = crate::core::error::AdminError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let context = match parts.extensions.get::<SharedAuthProvider>() {
            Some(SharedAuthProvider(provider)) => provider.extract_context(&parts.headers).await?,
            None => HeaderAuthProvider.extract_context(&parts.headers).await?,
        };
        Ok(CurrentUser(context))
    }
}
