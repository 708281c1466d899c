//! Owner resolution seam.

use crate::model::owner::OwnerId;

/// Resolves the requesting owner. `None` means unauthenticated.
pub trait IdentityResolver {
    fn resolve_owner(&self) -> Option<OwnerId>;
}

impl<T: IdentityResolver + ?Sized> IdentityResolver for &T {
    fn resolve_owner(&self) -> Option<OwnerId> {
        (**self).resolve_owner()
    }
}

/// Identity already resolved by the host (session lookup, FFI argument).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StaticIdentity(Option<OwnerId>);

impl StaticIdentity {
    pub fn authenticated(owner: OwnerId) -> Self {
        Self(Some(owner))
    }

    pub fn anonymous() -> Self {
        Self(None)
    }

    /// Raw host value. Missing or malformed ids resolve to no owner.
    pub fn from_raw(raw: Option<&str>) -> Self {
        Self(raw.and_then(|value| OwnerId::new(value).ok()))
    }
}

impl IdentityResolver for StaticIdentity {
    fn resolve_owner(&self) -> Option<OwnerId> {
        self.0.clone()
    }
}
