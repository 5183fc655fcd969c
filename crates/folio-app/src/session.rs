// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use std::collections::VecDeque;

use crate::preselect::collect_first;
use crate::{
    CatalogCommand, CatalogEvent, CatalogState, PageSource, Record, RecordId, SourceUnavailable,
};

/// Drives a [`CatalogState`] on the caller's thread, performing each fetch
/// effect inline before returning.
#[derive(Debug)]
pub struct CatalogSession<S> {
    state: CatalogState,
    source: S,
}

impl<S: PageSource> CatalogSession<S> {
    pub fn new(source: S) -> Self {
        let state = CatalogState::new(source.page_size());
        Self { state, source }
    }

    pub fn state(&self) -> &CatalogState {
        &self.state
    }

    /// Dispatches `command` and then every effect it spawns, returning all
    /// events in the order they were produced.
    pub fn dispatch(&mut self, command: CatalogCommand) -> Vec<CatalogEvent> {
        let mut produced = Vec::new();
        let mut queue = VecDeque::from([command]);
        while let Some(command) = queue.pop_front() {
            for event in self.state.dispatch(command) {
                match &event {
                    CatalogEvent::FetchPage { request_id, page } => {
                        queue.push_back(CatalogCommand::PageLoaded {
                            request_id: *request_id,
                            result: self.source.fetch_page(*page),
                        });
                    }
                    CatalogEvent::PreselectStarted { request_id, target } => {
                        queue.push_back(CatalogCommand::PreselectFinished {
                            request_id: *request_id,
                            outcome: collect_first(&self.source, *target),
                        });
                    }
                    _ => {}
                }
                produced.push(event);
            }
        }
        produced
    }

    pub fn request_page(&mut self, page: u32) -> Result<(), SourceUnavailable> {
        let failure = self
            .dispatch(CatalogCommand::RequestPage(page))
            .into_iter()
            .find_map(|event| match event {
                CatalogEvent::FetchFailed(error) => Some(error),
                _ => None,
            });
        failure.map_or(Ok(()), Err)
    }

    pub fn set_page_selection(&mut self, selected: Vec<RecordId>) {
        self.dispatch(CatalogCommand::SetPageSelection(selected));
    }

    pub fn toggle(&mut self, id: RecordId) {
        self.dispatch(CatalogCommand::ToggleRecord(id));
    }

    /// Returns the resulting selection in ascending id order.
    pub fn preselect(&mut self, target: i64) -> Vec<RecordId> {
        self.dispatch(CatalogCommand::BulkSelect(target));
        self.state.selection().ids().collect()
    }

    pub fn clear_selection(&mut self) {
        self.dispatch(CatalogCommand::ClearSelection);
    }

    pub fn materialized_selection(&self) -> Vec<&Record> {
        self.state.materialized_selection()
    }
}
