//! Compliance-rate arithmetic.
//!
//! Kept free of storage access so the window and rounding rules can be
//! tested directly. The contract feeds it the dose-log pages of one
//! medication and opens a page only when it straddles a window bound.

use crate::types::{DoseMark, DosePage};

/// How a dose-log page sits relative to an inclusive window.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum PageOverlap {
    /// No mark on the page can fall inside the window.
    Outside,
    /// Every mark on the page falls inside the window.
    Inside,
    /// The page straddles a bound; its marks must be checked one by one.
    Partial,
}

/// Classify `page` against `[period_start, period_end]`.
pub fn page_overlap(page: &DosePage, period_start: u64, period_end: u64) -> PageOverlap {
    if page.latest < period_start || page.earliest > period_end {
        PageOverlap::Outside
    } else if page.earliest >= period_start && page.latest <= period_end {
        PageOverlap::Inside
    } else {
        PageOverlap::Partial
    }
}

impl DosePage {
    /// Summary of a page holding only `mark`.
    pub fn first(mark: &DoseMark) -> Self {
        DosePage {
            earliest: mark.scheduled_time,
            latest: mark.scheduled_time,
            scheduled: 1,
            taken: u32::from(mark.taken),
        }
    }

    /// Fold another mark into the summary.
    pub fn include(&mut self, mark: &DoseMark) {
        self.earliest = self.earliest.min(mark.scheduled_time);
        self.latest = self.latest.max(mark.scheduled_time);
        self.scheduled = self.scheduled.saturating_add(1);
        if mark.taken {
            self.taken = self.taken.saturating_add(1);
        }
    }
}

/// Running tally of scheduled and taken doses inside a window.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct ComplianceTally {
    pub scheduled: u32,
    pub taken: u32,
}

impl ComplianceTally {
    /// Count `mark` if its scheduled time lies in `[period_start, period_end]`.
    pub fn observe(&mut self, mark: &DoseMark, period_start: u64, period_end: u64) {
        if mark.scheduled_time < period_start || mark.scheduled_time > period_end {
            return;
        }
        self.scheduled = self.scheduled.saturating_add(1);
        if mark.taken {
            self.taken = self.taken.saturating_add(1);
        }
    }

    /// Count a page that lies entirely inside the window.
    pub fn absorb(&mut self, page: &DosePage) {
        self.scheduled = self.scheduled.saturating_add(page.scheduled);
        self.taken = self.taken.saturating_add(page.taken);
    }

    /// `floor(taken * 100 / scheduled)`, or 0 when nothing was scheduled.
    pub fn rate(&self) -> u32 {
        compliance_rate(self.taken, self.scheduled)
    }
}

/// Integer percentage of taken doses, rounded down. Zero scheduled doses
/// yields 0.
pub fn compliance_rate(taken: u32, scheduled: u32) -> u32 {
    if scheduled == 0 {
        return 0;
    }
    let pct = (taken.min(scheduled) as u64) * 100 / scheduled as u64;
    pct as u32
}
