//! Authorization policy.
//!
//! A single capability check maps `(role, staff)` to a query [`Scope`] that
//! the storage layer applies to every read and write, instead of comparing
//! role strings per endpoint. Privileged identities currently see everything;
//! scoping a company account to its own employees is an acknowledged TODO
//! carried over from the production deployment plan.

use thiserror::Error;

use crate::types::{Identity, Role, UserId};

/// Errors raised by scope checks.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ScopeError {
    /// A non-privileged caller asked for another user's segments.
    #[error("role {role} may not access segments owned by {requested}")]
    Forbidden { role: Role, requested: UserId },
}

/// The set of segments a caller may see and modify.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Scope {
    /// Only segments owned by this user.
    Mine(UserId),
    /// Every segment.
    All,
}

impl Scope {
    /// Derives the scope for an authenticated identity.
    #[must_use]
    pub fn for_identity(identity: &Identity) -> Self {
        if identity.is_privileged() {
            Self::All
        } else {
            Self::Mine(identity.user.clone())
        }
    }

    /// Narrows the scope to one user, typically from a `--user` filter.
    ///
    /// Privileged callers may narrow to anyone; a worker may only "narrow"
    /// to themselves.
    pub fn narrow_to(
        &self,
        identity: &Identity,
        requested: Option<UserId>,
    ) -> Result<Self, ScopeError> {
        match (self, requested) {
            (scope, None) => Ok(scope.clone()),
            (Self::All, Some(user)) => Ok(Self::Mine(user)),
            (Self::Mine(own), Some(user)) if *own == user => Ok(self.clone()),
            (Self::Mine(_), Some(user)) => Err(ScopeError::Forbidden {
                role: identity.role,
                requested: user,
            }),
        }
    }

    /// The owner predicate the storage layer must apply, if any.
    #[must_use]
    pub const fn owner_filter(&self) -> Option<&UserId> {
        match self {
            Self::Mine(user) => Some(user),
            Self::All => None,
        }
    }
}

/// Whether the identity may reassign a segment's owner on edit.
///
/// A worker edit supplying a different owner is not an error; the original
/// owner is silently kept.
#[must_use]
pub const fn can_reassign_owner(identity: &Identity) -> bool {
    identity.is_privileged()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn worker(name: &str) -> Identity {
        Identity {
            user: UserId::new(name).unwrap(),
            role: Role::Worker,
            staff: false,
        }
    }

    fn admin(name: &str) -> Identity {
        Identity {
            user: UserId::new(name).unwrap(),
            role: Role::Admin,
            staff: false,
        }
    }

    #[test]
    fn worker_is_scoped_to_own_segments() {
        let identity = worker("alice");
        let scope = Scope::for_identity(&identity);
        assert_eq!(scope, Scope::Mine(identity.user.clone()));
        assert_eq!(scope.owner_filter(), Some(&identity.user));
    }

    #[test]
    fn privileged_roles_see_everything() {
        assert_eq!(Scope::for_identity(&admin("root")), Scope::All);
        assert_eq!(
            Scope::for_identity(&Identity {
                staff: true,
                ..worker("carol")
            }),
            Scope::All
        );
        assert_eq!(Scope::All.owner_filter(), None);
    }

    #[test]
    fn worker_cannot_narrow_to_other_user() {
        let identity = worker("alice");
        let scope = Scope::for_identity(&identity);

        let same = scope
            .narrow_to(&identity, Some(UserId::new("alice").unwrap()))
            .unwrap();
        assert_eq!(same, scope);

        let err = scope
            .narrow_to(&identity, Some(UserId::new("bob").unwrap()))
            .unwrap_err();
        assert!(matches!(err, ScopeError::Forbidden { .. }));
    }

    #[test]
    fn admin_narrows_to_any_user() {
        let identity = admin("root");
        let scope = Scope::for_identity(&identity);
        let narrowed = scope
            .narrow_to(&identity, Some(UserId::new("bob").unwrap()))
            .unwrap();
        assert_eq!(narrowed, Scope::Mine(UserId::new("bob").unwrap()));
    }

    #[test]
    fn only_privileged_identities_reassign_owners() {
        assert!(!can_reassign_owner(&worker("alice")));
        assert!(can_reassign_owner(&admin("root")));
    }
}
