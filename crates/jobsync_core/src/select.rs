use crate::{DuplicateReason, History, Listing};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Suppressed {
    pub listing: Listing,
    pub reason: DuplicateReason,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Selection {
    /// Listings to append, in candidate order.
    pub new: Vec<Listing>,
    pub suppressed: Vec<Suppressed>,
}

/// Split parsed candidates into new listings and ones already known to `history`.
///
/// Candidates are only compared against history, not against each other.
pub fn select_new_listings(candidates: Vec<Listing>, history: &History) -> Selection {
    let mut selection = Selection::default();
    for listing in candidates {
        match history.duplicate_reason(&listing) {
            Some(reason) => selection.suppressed.push(Suppressed { listing, reason }),
            None => selection.new.push(listing),
        }
    }
    selection
}
