// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use tracing::{debug, info, warn};

use crate::preselect::{self, PreselectOutcome, PreselectStop};
use crate::{Page, Record, RecordId, RequestId, SelectionStore, SourceUnavailable, page_count};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadState {
    Idle,
    Loading,
    Loaded,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CatalogCommand {
    RequestPage(u32),
    PageLoaded {
        request_id: RequestId,
        result: Result<Page, SourceUnavailable>,
    },
    /// The widget's full report of which records on the displayed page are selected.
    SetPageSelection(Vec<RecordId>),
    ToggleRecord(RecordId),
    SelectPage,
    DeselectPage,
    BulkSelect(i64),
    PreselectFinished {
        request_id: RequestId,
        outcome: PreselectOutcome,
    },
    ClearSelection,
    SetStatus(String),
    ClearStatus,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CatalogEvent {
    LoadStateChanged(LoadState),
    /// Effect: the caller must fetch `page` and answer with `PageLoaded`.
    FetchPage {
        request_id: RequestId,
        page: u32,
    },
    /// Effect: the caller must run a preselect walk and answer with `PreselectFinished`.
    PreselectStarted {
        request_id: RequestId,
        target: i64,
    },
    PageChanged {
        page: u32,
        total_count: u64,
    },
    FetchFailed(SourceUnavailable),
    StaleResponseDropped {
        request_id: RequestId,
    },
    SelectionChanged {
        selected: usize,
    },
    SelectionMaterialized(Vec<RecordId>),
    StatusUpdated(String),
    StatusCleared,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct PendingFetch {
    request_id: RequestId,
    page: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct PendingPreselect {
    request_id: RequestId,
    target: i64,
}

/// Page view controller. Owns the displayed page and the selection; all
/// mutation goes through [`CatalogState::dispatch`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CatalogState {
    pub load: LoadState,
    pub status_line: Option<String>,
    page_size: usize,
    page: Option<Page>,
    selection: SelectionStore,
    last_request: RequestId,
    pending_fetch: Option<PendingFetch>,
    pending_preselect: Option<PendingPreselect>,
    last_error: Option<SourceUnavailable>,
}

impl CatalogState {
    pub fn new(page_size: usize) -> Self {
        Self {
            load: LoadState::Idle,
            status_line: None,
            page_size: page_size.max(1),
            page: None,
            selection: SelectionStore::new(),
            last_request: RequestId::new(0),
            pending_fetch: None,
            pending_preselect: None,
            last_error: None,
        }
    }

    pub fn page(&self) -> Option<&Page> {
        self.page.as_ref()
    }

    pub fn records(&self) -> &[Record] {
        match &self.page {
            Some(page) => &page.records,
            None => &[],
        }
    }

    pub fn selection(&self) -> &SelectionStore {
        &self.selection
    }

    pub fn materialized_selection(&self) -> Vec<&Record> {
        self.selection.materialize(self.records())
    }

    pub fn is_selected(&self, id: RecordId) -> bool {
        self.selection.contains(id)
    }

    pub fn selected_count(&self) -> usize {
        self.selection.len()
    }

    pub fn total_count(&self) -> u64 {
        self.page.as_ref().map_or(0, |page| page.total_count)
    }

    /// Number of the page on screen, or 0 before the first successful load.
    pub fn current_page(&self) -> u32 {
        self.page.as_ref().map_or(0, |page| page.number)
    }

    /// The page most recently asked for, whether or not it has arrived.
    pub fn requested_page(&self) -> Option<u32> {
        self.pending_fetch.map(|pending| pending.page)
    }

    pub fn page_count(&self) -> u32 {
        page_count(self.total_count(), self.page_size)
    }

    pub fn page_size(&self) -> usize {
        self.page_size
    }

    pub fn is_loading(&self) -> bool {
        self.load == LoadState::Loading
    }

    pub fn is_preselecting(&self) -> bool {
        self.pending_preselect.is_some()
    }

    pub fn preselect_target(&self) -> Option<i64> {
        self.pending_preselect.map(|pending| pending.target)
    }

    pub fn last_error(&self) -> Option<&SourceUnavailable> {
        self.last_error.as_ref()
    }

    pub fn dispatch(&mut self, command: CatalogCommand) -> Vec<CatalogEvent> {
        match command {
            CatalogCommand::RequestPage(page) => self.request_page(page),
            CatalogCommand::PageLoaded { request_id, result } => {
                self.apply_page(request_id, result)
            }
            CatalogCommand::SetPageSelection(ids) => self.reconcile(&ids),
            CatalogCommand::ToggleRecord(id) => {
                if !self.page.as_ref().is_some_and(|page| page.contains(id)) {
                    return Vec::new();
                }
                let mut reported = self.selection.materialized_ids(self.records());
                if let Some(position) = reported.iter().position(|selected| *selected == id) {
                    reported.remove(position);
                } else {
                    reported.push(id);
                }
                self.reconcile(&reported)
            }
            CatalogCommand::SelectPage => {
                let everything = self.records().iter().map(|record| record.id).collect::<Vec<_>>();
                self.reconcile(&everything)
            }
            CatalogCommand::DeselectPage => self.reconcile(&[]),
            CatalogCommand::BulkSelect(target) => self.start_preselect(target),
            CatalogCommand::PreselectFinished {
                request_id,
                outcome,
            } => self.finish_preselect(request_id, outcome),
            CatalogCommand::ClearSelection => {
                if let Some(pending) = self.pending_preselect.take() {
                    debug!(request_id = %pending.request_id, "preselect abandoned by clear");
                }
                self.selection.clear();
                let mut events = self.selection_events();
                events.push(self.set_status("selection cleared"));
                events
            }
            CatalogCommand::SetStatus(message) => vec![self.set_status(&message)],
            CatalogCommand::ClearStatus => {
                self.status_line = None;
                vec![CatalogEvent::StatusCleared]
            }
        }
    }

    fn next_request_id(&mut self) -> RequestId {
        self.last_request = self.last_request.next();
        self.last_request
    }

    fn request_page(&mut self, page: u32) -> Vec<CatalogEvent> {
        if page == 0 {
            return vec![self.set_status("page numbers start at 1")];
        }

        let request_id = self.next_request_id();
        if let Some(superseded) = self.pending_fetch.replace(PendingFetch { request_id, page }) {
            debug!(
                superseded = %superseded.request_id,
                page = superseded.page,
                "page request superseded"
            );
        }
        self.load = LoadState::Loading;
        vec![
            CatalogEvent::LoadStateChanged(LoadState::Loading),
            CatalogEvent::FetchPage { request_id, page },
        ]
    }

    fn apply_page(
        &mut self,
        request_id: RequestId,
        result: Result<Page, SourceUnavailable>,
    ) -> Vec<CatalogEvent> {
        let Some(pending) = self.pending_fetch else {
            return vec![CatalogEvent::StaleResponseDropped { request_id }];
        };
        if pending.request_id != request_id {
            debug!(%request_id, latest = %pending.request_id, "dropping stale page response");
            return vec![CatalogEvent::StaleResponseDropped { request_id }];
        }
        self.pending_fetch = None;

        match result {
            Ok(page) => {
                debug!(page = page.number, records = page.len(), "page loaded");
                let event = CatalogEvent::PageChanged {
                    page: page.number,
                    total_count: page.total_count,
                };
                self.page = Some(page);
                self.load = LoadState::Loaded;
                self.last_error = None;
                vec![
                    CatalogEvent::LoadStateChanged(LoadState::Loaded),
                    event,
                    CatalogEvent::SelectionMaterialized(
                        self.selection.materialized_ids(self.records()),
                    ),
                ]
            }
            Err(error) => {
                warn!(page = pending.page, error = %error, "page fetch failed");
                self.last_error = Some(error.clone());
                let status = self.set_status(&format!("load failed: {error}"));
                self.load = LoadState::Idle;
                vec![
                    CatalogEvent::LoadStateChanged(LoadState::Error),
                    CatalogEvent::FetchFailed(error),
                    CatalogEvent::LoadStateChanged(LoadState::Idle),
                    status,
                ]
            }
        }
    }

    fn reconcile(&mut self, selected: &[RecordId]) -> Vec<CatalogEvent> {
        let Some(page) = &self.page else {
            return Vec::new();
        };
        self.selection.reconcile_with_page(&page.records, selected);
        self.selection_events()
    }

    fn start_preselect(&mut self, target: i64) -> Vec<CatalogEvent> {
        if target <= 0 {
            self.pending_preselect = None;
            self.selection.clear();
            let mut events = self.selection_events();
            events.push(self.set_status("selected 0 records"));
            return events;
        }

        let request_id = self.next_request_id();
        self.pending_preselect = Some(PendingPreselect { request_id, target });
        info!(%request_id, wanted = target, "preselect started");
        vec![
            CatalogEvent::PreselectStarted { request_id, target },
            self.set_status(&format!("selecting first {target} records...")),
        ]
    }

    fn finish_preselect(
        &mut self,
        request_id: RequestId,
        outcome: PreselectOutcome,
    ) -> Vec<CatalogEvent> {
        let latest = self.pending_preselect.map(|pending| pending.request_id);
        if latest != Some(request_id) {
            debug!(%request_id, "dropping stale preselect outcome");
            return vec![CatalogEvent::StaleResponseDropped { request_id }];
        }
        self.pending_preselect = None;

        preselect::commit(&mut self.selection, &outcome);
        let mut events = self.selection_events();
        match &outcome.stop {
            PreselectStop::Failed(error) => {
                self.last_error = Some(error.clone());
                events.push(CatalogEvent::FetchFailed(error.clone()));
                events.push(self.set_status(&format!(
                    "selected {} of {} records before failure: {error}",
                    outcome.ids.len(),
                    outcome.target
                )));
            }
            _ => {
                events.push(self.set_status(&format!("selected {} records", outcome.ids.len())));
            }
        }
        events
    }

    fn selection_events(&self) -> Vec<CatalogEvent> {
        vec![
            CatalogEvent::SelectionChanged {
                selected: self.selection.len(),
            },
            CatalogEvent::SelectionMaterialized(self.selection.materialized_ids(self.records())),
        ]
    }

    fn set_status(&mut self, message: &str) -> CatalogEvent {
        self.status_line = Some(message.to_owned());
        CatalogEvent::StatusUpdated(message.to_owned())
    }
}
