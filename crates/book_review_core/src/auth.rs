//! crates/book_review_core/src/auth.rs
//!
//! The authorization gate. A verified credential produces one
//! [`AuthContext`] per request, which is passed explicitly to handlers;
//! there is no ambient session state.

use chrono::{DateTime, Utc};
use uuid::Uuid;

/// The identity and role a request acts under, decoded once from the
/// bearer credential.
#[derive(Debug, Clone, Copy)]
pub struct AuthContext {
    pub user_id: Uuid,
    /// Embedded in the credential at issuance; an admin revocation takes
    /// effect at the next login, not mid-session.
    pub is_admin: bool,
    pub issued_at: DateTime<Utc>,
}

/// An authorization failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum GateError {
    /// The credential is missing, malformed or expired.
    #[error("authentication required")]
    Unauthenticated,
    /// The caller is authenticated but not permitted.
    #[error("permission denied")]
    Forbidden,
}

impl AuthContext {
    /// Succeeds only for admin callers. Gates catalog creation.
    pub fn require_admin(&self) -> Result<(), GateError> {
        if self.is_admin {
            Ok(())
        } else {
            Err(GateError::Forbidden)
        }
    }

    /// Succeeds only when the caller owns the resource. Gates review
    /// edit and delete.
    pub fn require_owner(&self, owner_id: Uuid) -> Result<(), GateError> {
        if self.user_id == owner_id {
            Ok(())
        } else {
            Err(GateError::Forbidden)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn context(is_admin: bool) -> AuthContext {
        AuthContext {
            user_id: Uuid::new_v4(),
            is_admin,
            issued_at: Utc::now(),
        }
    }

    #[test]
    fn admin_gate() {
        assert!(context(true).require_admin().is_ok());
        assert_eq!(context(false).require_admin(), Err(GateError::Forbidden));
    }

    #[test]
    fn owner_gate() {
        let ctx = context(false);
        assert!(ctx.require_owner(ctx.user_id).is_ok());
        assert_eq!(
            ctx.require_owner(Uuid::new_v4()),
            Err(GateError::Forbidden)
        );
    }

    #[test]
    fn admin_flag_does_not_bypass_ownership() {
        let ctx = context(true);
        assert_eq!(
            ctx.require_owner(Uuid::new_v4()),
            Err(GateError::Forbidden)
        );
    }
}
