//! Per-retailer pagination modeled as an explicit state machine.
//!
//! Each paginated extractor feeds the records of the page it just parsed
//! into a [`Paginator`], which classifies the page and answers with either
//! the next page number or a stop reason. This keeps the termination rules
//! in one place instead of scattering break/continue logic across loop
//! bodies.
//!
//! Policies per retailer:
//!
//! | Retailer    | Termination                                   | Bound |
//! |-------------|-----------------------------------------------|-------|
//! | Food Basics | empty page                                    | 20    |
//! | No Frills   | empty page, all invalid, or duplicate name set| 20    |
//!
//! The empty-page rule always applies; the other two are opt-in flags.

use std::collections::BTreeSet;

use flyerhub_core::ProductRecord;

/// Why pagination stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopReason {
    /// No product tiles matched on the current page.
    EmptyPage,
    /// Every record on the page failed validation.
    AllInvalid,
    /// The page's name set is identical to the previous page's; the site
    /// keeps serving the last real page for out-of-range page numbers.
    DuplicatePage,
    /// The max-page safety bound was hit.
    BoundReached,
}

impl std::fmt::Display for StopReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StopReason::EmptyPage => write!(f, "no tiles on page"),
            StopReason::AllInvalid => write!(f, "all records invalid"),
            StopReason::DuplicatePage => write!(f, "page repeats previous page"),
            StopReason::BoundReached => write!(f, "max page bound reached"),
        }
    }
}

/// Decision after classifying a page.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    /// Fetch the contained page number next.
    Continue(u32),
    Stop(StopReason),
}

/// Pagination state for one extractor run. Pages are 1-based.
#[derive(Debug)]
pub struct Paginator {
    page: u32,
    max_pages: u32,
    stop_when_all_invalid: bool,
    stop_on_duplicate_names: bool,
    prev_names: Option<BTreeSet<String>>,
}

impl Paginator {
    /// Paginator that stops only on an empty page or the bound.
    #[must_use]
    pub fn new(max_pages: u32) -> Self {
        Self {
            page: 1,
            max_pages,
            stop_when_all_invalid: false,
            stop_on_duplicate_names: false,
            prev_names: None,
        }
    }

    /// Also stop when every record on a page is invalid.
    #[must_use]
    pub fn stop_when_all_invalid(mut self) -> Self {
        self.stop_when_all_invalid = true;
        self
    }

    /// Also stop when a page's record names exactly repeat the previous
    /// page's.
    #[must_use]
    pub fn stop_on_duplicate_names(mut self) -> Self {
        self.stop_on_duplicate_names = true;
        self
    }

    /// Current 1-based page number.
    #[must_use]
    pub fn page(&self) -> u32 {
        self.page
    }

    /// Classifies the records parsed from the current page and either
    /// advances to the next page or stops.
    pub fn advance(&mut self, records: &[ProductRecord]) -> Decision {
        if records.is_empty() {
            return Decision::Stop(StopReason::EmptyPage);
        }
        if self.stop_when_all_invalid && records.iter().all(|r| !r.valid) {
            return Decision::Stop(StopReason::AllInvalid);
        }
        if self.stop_on_duplicate_names {
            let names: BTreeSet<String> =
                records.iter().filter_map(|r| r.name.clone()).collect();
            if self.prev_names.as_ref() == Some(&names) {
                return Decision::Stop(StopReason::DuplicatePage);
            }
            self.prev_names = Some(names);
        }
        if self.page >= self.max_pages {
            return Decision::Stop(StopReason::BoundReached);
        }
        self.page += 1;
        Decision::Continue(self.page)
    }
}
