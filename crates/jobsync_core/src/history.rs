use std::collections::HashSet;

use crate::Listing;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DuplicateReason {
    Role,
    Link,
    RoleAndLink,
}

/// Every role and every link already present in the store, looked up independently.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct History {
    roles: HashSet<String>,
    links: HashSet<String>,
}

impl History {
    pub fn empty() -> Self {
        Self::default()
    }

    /// Build from the store's role column and link column. The columns may differ in length.
    pub fn from_columns<R, L>(roles: R, links: L) -> Self
    where
        R: IntoIterator<Item = String>,
        L: IntoIterator<Item = String>,
    {
        Self {
            roles: roles.into_iter().collect(),
            links: links.into_iter().collect(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.roles.is_empty() && self.links.is_empty()
    }

    pub fn role_count(&self) -> usize {
        self.roles.len()
    }

    pub fn link_count(&self) -> usize {
        self.links.len()
    }

    /// A listing is known when its role OR its link has been seen before.
    pub fn duplicate_reason(&self, listing: &Listing) -> Option<DuplicateReason> {
        let role = self.roles.contains(&listing.role);
        let link = self.links.contains(&listing.link);
        match (role, link) {
            (true, true) => Some(DuplicateReason::RoleAndLink),
            (true, false) => Some(DuplicateReason::Role),
            (false, true) => Some(DuplicateReason::Link),
            (false, false) => None,
        }
    }

    pub fn contains(&self, listing: &Listing) -> bool {
        self.duplicate_reason(listing).is_some()
    }
}
