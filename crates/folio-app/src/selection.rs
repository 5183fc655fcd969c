// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use std::collections::BTreeSet;

use crate::{Record, RecordId};

/// Canonical set of selected record ids. It does not know which page is
/// loaded; pages only ever affect it through [`SelectionStore::reconcile_with_page`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SelectionStore {
    ids: BTreeSet<RecordId>,
}

impl SelectionStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, id: RecordId) {
        self.ids.insert(id);
    }

    pub fn remove(&mut self, id: RecordId) {
        self.ids.remove(&id);
    }

    pub fn contains(&self, id: RecordId) -> bool {
        self.ids.contains(&id)
    }

    pub fn clear(&mut self) {
        self.ids.clear();
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    pub fn ids(&self) -> impl Iterator<Item = RecordId> + '_ {
        self.ids.iter().copied()
    }

    /// Overwrites the whole set.
    pub fn replace<I>(&mut self, ids: I)
    where
        I: IntoIterator<Item = RecordId>,
    {
        self.ids = ids.into_iter().collect();
    }

    /// Applies the widget's report of which records on the current page are
    /// selected. Page records missing from `selected` are deselected, every id
    /// in `selected` is selected, and ids belonging to other pages are kept.
    pub fn reconcile_with_page(&mut self, page_records: &[Record], selected: &[RecordId]) {
        let reported = selected.iter().copied().collect::<BTreeSet<_>>();
        for record in page_records {
            if !reported.contains(&record.id) {
                self.ids.remove(&record.id);
            }
        }
        self.ids.extend(reported);
    }

    pub fn materialize<'a>(&self, page_records: &'a [Record]) -> Vec<&'a Record> {
        page_records
            .iter()
            .filter(|record| self.contains(record.id))
            .collect()
    }

    pub fn materialized_ids(&self, page_records: &[Record]) -> Vec<RecordId> {
        page_records
            .iter()
            .map(|record| record.id)
            .filter(|id| self.contains(*id))
            .collect()
    }
}
