// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use anyhow::{Context, Result};
use folio_app::{Page, PageSource, PreselectOutcome, RequestId, SourceUnavailable, collect_first};
use folio_tui::InternalEvent;
use std::sync::Arc;
use std::sync::mpsc::Sender;
use std::thread;
use tracing::debug;

pub type SharedSource = Arc<dyn PageSource + Send + Sync>;

/// Runs fetches and preselect walks on short-lived worker threads. Workers
/// only report back over the channel; the UI thread owns all state.
pub struct SourceRuntime {
    source: SharedSource,
}

impl SourceRuntime {
    pub fn new(source: SharedSource) -> Self {
        Self { source }
    }

    pub fn page_size(&self) -> usize {
        self.source.page_size()
    }
}

impl folio_tui::CatalogRuntime for SourceRuntime {
    fn fetch_page(&mut self, page: u32) -> Result<Page, SourceUnavailable> {
        self.source.fetch_page(page)
    }

    fn collect_first(&mut self, target: i64) -> PreselectOutcome {
        collect_first(self.source.as_ref(), target)
    }

    fn spawn_fetch(
        &mut self,
        request_id: RequestId,
        page: u32,
        tx: Sender<InternalEvent>,
    ) -> Result<()> {
        let source = Arc::clone(&self.source);
        thread::Builder::new()
            .name(format!("folio-fetch-{page}"))
            .spawn(move || {
                let result = source.fetch_page(page);
                if tx
                    .send(InternalEvent::PageFetched { request_id, result })
                    .is_err()
                {
                    debug!(%request_id, "ui gone before page arrived");
                }
            })
            .context("spawn page fetch worker")?;
        Ok(())
    }

    fn spawn_preselect(
        &mut self,
        request_id: RequestId,
        target: i64,
        tx: Sender<InternalEvent>,
    ) -> Result<()> {
        let source = Arc::clone(&self.source);
        thread::Builder::new()
            .name("folio-preselect".to_owned())
            .spawn(move || {
                let outcome = collect_first(source.as_ref(), target);
                if tx
                    .send(InternalEvent::PreselectFinished {
                        request_id,
                        outcome,
                    })
                    .is_err()
                {
                    debug!(%request_id, "ui gone before preselect finished");
                }
            })
            .context("spawn preselect worker")?;
        Ok(())
    }
}
