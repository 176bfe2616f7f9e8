use std::fmt;

use serde::{Deserialize, Serialize};

/// One scraped row: the role title and the application link.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Listing {
    pub role: String,
    pub link: String,
}

impl Listing {
    pub fn new(role: impl Into<String>, link: impl Into<String>) -> Self {
        Self {
            role: role.into(),
            link: link.into(),
        }
    }

    pub fn matches(&self, role: &str, link: &str) -> bool {
        self.role == role && self.link == link
    }
}

impl fmt::Display for Listing {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} <{}>", self.role, self.link)
    }
}

/// The most recently stored listing. The parser stops when it reaches it.
///
/// `None` means the store is empty (or unreadable) and the whole page is scanned.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct StopMarker(Option<Listing>);

impl StopMarker {
    pub fn absent() -> Self {
        Self(None)
    }

    pub fn at(listing: Listing) -> Self {
        Self(Some(listing))
    }

    pub fn is_absent(&self) -> bool {
        self.0.is_none()
    }

    pub fn listing(&self) -> Option<&Listing> {
        self.0.as_ref()
    }

    pub fn is_reached_by(&self, role: &str, link: &str) -> bool {
        self.0
            .as_ref()
            .is_some_and(|marker| marker.matches(role, link))
    }
}

impl From<Option<Listing>> for StopMarker {
    fn from(value: Option<Listing>) -> Self {
        Self(value)
    }
}
