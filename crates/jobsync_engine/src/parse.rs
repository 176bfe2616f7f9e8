use jobsync_core::{Listing, StopMarker};
use jobsync_logging::{jobsync_debug, jobsync_info};
use scraper::{ElementRef, Html, Selector};

const MIN_CELLS: usize = 4;
const ROLE_CELL: usize = 1;
const LINK_CELL: usize = 3;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ParseRowError {
    #[error("expected at least 4 cells, found {found}")]
    TooFewCells { found: usize },
    #[error("no link in the application cell")]
    MissingAnchor,
    #[error("link without href in the application cell")]
    MissingHref,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkippedRow {
    /// Zero-based index of the `<tr>` in document order.
    pub row: usize,
    pub error: ParseRowError,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ParsedPage {
    /// Listings above the stop marker, in document order.
    pub listings: Vec<Listing>,
    pub skipped: Vec<SkippedRow>,
    pub rows_seen: usize,
    pub reached_marker: bool,
}

/// Reads `(role, link)` pairs out of every table row on a page.
///
/// The role is the trimmed text of the second cell and the link is the `href`
/// of the first anchor in the fourth cell.
pub struct ListingParser {
    rows: Selector,
    cells: Selector,
    anchors: Selector,
}

impl ListingParser {
    pub fn new() -> Self {
        Self {
            rows: static_selector("tr"),
            cells: static_selector("td"),
            anchors: static_selector("a"),
        }
    }

    /// Scan rows until one equals `marker`. That row and everything after it are left out.
    pub fn parse(&self, markup: &str, marker: &StopMarker) -> ParsedPage {
        let document = Html::parse_document(markup);
        let mut page = ParsedPage::default();

        for (index, row) in document.select(&self.rows).enumerate() {
            page.rows_seen += 1;
            let listing = match self.read_row(row) {
                Ok(listing) => listing,
                Err(error) => {
                    jobsync_debug!("Skipping row {}: {}", index, error);
                    page.skipped.push(SkippedRow { row: index, error });
                    continue;
                }
            };
            if marker.is_reached_by(&listing.role, &listing.link) {
                jobsync_info!("Reached stop marker at row {}", index);
                page.reached_marker = true;
                break;
            }
            page.listings.push(listing);
        }

        page
    }

    fn read_row(&self, row: ElementRef<'_>) -> Result<Listing, ParseRowError> {
        let cells: Vec<ElementRef<'_>> = row.select(&self.cells).collect();
        if cells.len() < MIN_CELLS {
            return Err(ParseRowError::TooFewCells { found: cells.len() });
        }
        let role = cells[ROLE_CELL].text().collect::<String>().trim().to_string();
        let anchor = cells[LINK_CELL]
            .select(&self.anchors)
            .next()
            .ok_or(ParseRowError::MissingAnchor)?;
        let link = anchor
            .value()
            .attr("href")
            .ok_or(ParseRowError::MissingHref)?;
        Ok(Listing::new(role, link))
    }
}

impl Default for ListingParser {
    fn default() -> Self {
        Self::new()
    }
}

fn static_selector(css: &'static str) -> Selector {
    // Only called with the literal tag names above.
    Selector::parse(css).expect("tag selector parses")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cells_inside_nested_markup_are_read() {
        let html = r#"<table><tr>
            <td><strong>Acme</strong></td>
            <td>
                <span> Backend Intern </span>
            </td>
            <td>NYC</td>
            <td><div><a href="https://acme.example/apply"><img alt="Apply"></a></div></td>
        </tr></table>"#;
        let page = ListingParser::new().parse(html, &StopMarker::absent());
        assert_eq!(
            page.listings,
            vec![Listing::new("Backend Intern", "https://acme.example/apply")]
        );
    }

    #[test]
    fn header_rows_without_data_cells_are_skipped() {
        let html = "<table><tr><th>Company</th><th>Role</th><th>Location</th><th>Link</th></tr></table>";
        let page = ListingParser::new().parse(html, &StopMarker::absent());
        assert!(page.listings.is_empty());
        assert_eq!(
            page.skipped,
            vec![SkippedRow {
                row: 0,
                error: ParseRowError::TooFewCells { found: 0 }
            }]
        );
    }

    #[test]
    fn anchor_without_href_is_skipped() {
        let html = "<table><tr><td>a</td><td>b</td><td>c</td><td><a name=x>d</a></td></tr></table>";
        let page = ListingParser::new().parse(html, &StopMarker::absent());
        assert_eq!(page.skipped[0].error, ParseRowError::MissingHref);
    }
}
