// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use std::collections::BTreeSet;

use tracing::{debug, info, warn};

use crate::{PageSource, RecordId, SelectionStore, SourceUnavailable};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PreselectStop {
    /// Target was zero or negative; nothing was fetched.
    NothingRequested,
    TargetReached,
    SourceExhausted,
    /// The walk aborted; ids gathered before the failure are kept.
    Failed(SourceUnavailable),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PreselectOutcome {
    pub target: i64,
    /// Distinct ids in source order, at most `target` of them.
    pub ids: Vec<RecordId>,
    pub pages_fetched: u32,
    pub stop: PreselectStop,
}

impl PreselectOutcome {
    pub fn error(&self) -> Option<&SourceUnavailable> {
        match &self.stop {
            PreselectStop::Failed(error) => Some(error),
            _ => None,
        }
    }

    pub fn is_partial(&self) -> bool {
        (self.ids.len() as u64) < self.target.max(0) as u64
    }
}

/// Walks pages 1, 2, 3, ... one at a time, collecting the first `target`
/// distinct ids in source order. Stops at the target, an empty page, a short
/// page, or the first failed fetch. Does not touch any selection.
pub fn collect_first<S>(source: &S, target: i64) -> PreselectOutcome
where
    S: PageSource + ?Sized,
{
    let mut outcome = PreselectOutcome {
        target,
        ids: Vec::new(),
        pages_fetched: 0,
        stop: PreselectStop::NothingRequested,
    };
    if target <= 0 {
        return outcome;
    }

    let wanted = usize::try_from(target).unwrap_or(usize::MAX);
    let page_size = source.page_size();
    let mut seen = BTreeSet::new();
    let mut page_number = 1_u32;

    loop {
        let page = match source.fetch_page(page_number) {
            Ok(page) => page,
            Err(error) => {
                warn!(
                    page = page_number,
                    collected = outcome.ids.len(),
                    error = %error,
                    "preselect walk aborted"
                );
                outcome.stop = PreselectStop::Failed(error);
                return outcome;
            }
        };
        outcome.pages_fetched += 1;
        debug!(
            page = page_number,
            records = page.len(),
            total = page.total_count,
            "preselect fetched page"
        );

        if page.is_empty() {
            outcome.stop = PreselectStop::SourceExhausted;
            return outcome;
        }

        for id in page.ids() {
            if outcome.ids.len() == wanted {
                break;
            }
            if seen.insert(id) {
                outcome.ids.push(id);
            }
        }

        if outcome.ids.len() >= wanted {
            outcome.stop = PreselectStop::TargetReached;
            return outcome;
        }

        // The reported total is not trusted to end the walk; only the pages are.
        if page.len() < page_size {
            outcome.stop = PreselectStop::SourceExhausted;
            return outcome;
        }

        let Some(next) = page_number.checked_add(1) else {
            outcome.stop = PreselectStop::SourceExhausted;
            return outcome;
        };
        page_number = next;
    }
}

/// Replaces the selection with the walk's ids. Prior selections are discarded,
/// including when the walk failed part way.
pub fn commit(store: &mut SelectionStore, outcome: &PreselectOutcome) {
    store.replace(outcome.ids.iter().copied());
    info!(
        wanted = outcome.target,
        selected = store.len(),
        pages = outcome.pages_fetched,
        partial = outcome.is_partial(),
        "preselect committed"
    );
}

/// Runs the walk and commits it in one step.
pub fn preselect<S>(source: &S, store: &mut SelectionStore, target: i64) -> PreselectOutcome
where
    S: PageSource + ?Sized,
{
    let outcome = collect_first(source, target);
    commit(store, &outcome);
    outcome
}
