//! Session context and page-access gate
//!
//! The host builds a `Session` explicitly (at login) and hands it to
//! `authorize`. Navigation on denial is the host's decision.

use crate::gateway::SlotGateway;
use serde::{Deserialize, Serialize};

/// Page identifier of the slot limit workflow
pub const SLOT_LIMIT_PAGE_ID: u32 = 110;

/// Role allowed to open the slot limit page
pub const REGISTRAR_ROLE: &str = "registrar";

/// User role as stored by the login flow
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Role(String);

impl Role {
    /// Create role
    #[inline]
    #[must_use]
    pub fn new(role: impl Into<String>) -> Self {
        Self(role.into())
    }

    /// Check if this is the registrar role
    #[inline]
    #[must_use]
    pub fn is_registrar(&self) -> bool {
        self.0 == REGISTRAR_ROLE
    }

    /// Role name
    #[inline]
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Signed-in user context
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    /// Login email
    pub email: String,
    /// User role
    pub role: Role,
    /// Person identifier
    pub person_id: String,
    /// Employee identifier, used for the page-access check
    pub employee_id: Option<String>,
}

impl Session {
    /// Build a session from stored identifiers
    ///
    /// Returns `None` unless email, role and person id are all present and
    /// non-empty.
    #[must_use]
    pub fn from_parts(
        email: Option<String>,
        role: Option<String>,
        person_id: Option<String>,
        employee_id: Option<String>,
    ) -> Option<Self> {
        let non_empty = |v: Option<String>| v.filter(|s| !s.trim().is_empty());
        Some(Self {
            email: non_empty(email)?,
            role: Role::new(non_empty(role)?),
            person_id: non_empty(person_id)?,
            employee_id: non_empty(employee_id),
        })
    }
}

/// Why access was refused
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum DenialReason {
    /// No usable session
    NoSession,
    /// Session role is not registrar
    WrongRole(String),
    /// Page privilege not granted
    NoPrivilege,
    /// Access check call failed
    CheckFailed(String),
}

impl std::fmt::Display for DenialReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NoSession => f.write_str("no active session"),
            Self::WrongRole(role) => write!(f, "role {role:?} may not open this page"),
            Self::NoPrivilege => f.write_str("page privilege not granted"),
            Self::CheckFailed(e) => write!(f, "access check failed: {e}"),
        }
    }
}

/// Result of the page-access gate
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Authorization {
    /// Check still outstanding
    #[default]
    Pending,
    /// Workflow may be shown
    Authorized,
    /// Workflow must not be shown
    Unauthorized(DenialReason),
}

impl Authorization {
    /// Check if access was granted
    #[inline]
    #[must_use]
    pub fn is_authorized(&self) -> bool {
        matches!(self, Self::Authorized)
    }
}

/// Decide whether `session` may open page `page_id`
///
/// A failed or non-privileged check is a hard stop; it is never retried.
pub async fn authorize<G>(session: Option<&Session>, gateway: &G, page_id: u32) -> Authorization
where
    G: SlotGateway + ?Sized,
{
    let Some(session) = session else {
        tracing::warn!("access denied: no session");
        return Authorization::Unauthorized(DenialReason::NoSession);
    };

    if !session.role.is_registrar() {
        tracing::warn!(role = %session.role, "access denied: wrong role");
        return Authorization::Unauthorized(DenialReason::WrongRole(session.role.to_string()));
    }

    let Some(employee_id) = session.employee_id.as_deref() else {
        tracing::warn!(email = %session.email, "access denied: no employee id");
        return Authorization::Unauthorized(DenialReason::NoSession);
    };

    match gateway.page_access(employee_id, page_id).await {
        Ok(access) if access.is_granted() => {
            tracing::info!(employee_id, page_id, "page access granted");
            Authorization::Authorized
        }
        Ok(access) => {
            tracing::warn!(
                employee_id,
                page_id,
                privilege = access.page_privilege,
                "page access not granted"
            );
            Authorization::Unauthorized(DenialReason::NoPrivilege)
        }
        Err(e) => {
            tracing::error!(employee_id, page_id, error = %e, "access check failed");
            Authorization::Unauthorized(DenialReason::CheckFailed(e.to_string()))
        }
    }
}
