//! Service identity used as the registration ledger key.

use super::HandlerDomainError;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Runtime type name of a service instance.
///
/// Two live instances of the same type share one identity, so the ledger
/// holds at most one registration record per service type.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ServiceIdentity(String);

impl ServiceIdentity {
    /// Creates an identity from an explicit name.
    ///
    /// # Errors
    ///
    /// Returns [`HandlerDomainError::EmptyServiceIdentity`] when the value is
    /// empty after trimming.
    pub fn new(value: impl Into<String>) -> Result<Self, HandlerDomainError> {
        let raw = value.into();
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(HandlerDomainError::EmptyServiceIdentity);
        }
        Ok(Self(trimmed.to_owned()))
    }

    /// Derives the identity of `T` from its unqualified type name.
    ///
    /// Module paths and generic arguments are dropped, so
    /// `app::users::UserService<Pg>` becomes `UserService`.
    #[must_use]
    pub fn of<T: ?Sized>() -> Self {
        let full = std::any::type_name::<T>();
        let without_generics = full.split('<').next().unwrap_or(full);
        let short = without_generics
            .rsplit("::")
            .next()
            .unwrap_or(without_generics);
        Self(short.to_owned())
    }

    /// Returns the identity as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl AsRef<str> for ServiceIdentity {
    fn as_ref(&self) -> &str {
        self.as_str()
    }
}

impl fmt::Display for ServiceIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
