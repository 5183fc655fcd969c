// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use std::sync::Arc;

use crate::{Page, Record, RecordId, SourceUnavailable};

/// A read-only, 1-based paged view over a remote record collection.
pub trait PageSource {
    fn page_size(&self) -> usize;
    fn fetch_page(&self, page: u32) -> Result<Page, SourceUnavailable>;
}

impl<T: PageSource + ?Sized> PageSource for &T {
    fn page_size(&self) -> usize {
        (**self).page_size()
    }

    fn fetch_page(&self, page: u32) -> Result<Page, SourceUnavailable> {
        (**self).fetch_page(page)
    }
}

impl<T: PageSource + ?Sized> PageSource for Arc<T> {
    fn page_size(&self) -> usize {
        (**self).page_size()
    }

    fn fetch_page(&self, page: u32) -> Result<Page, SourceUnavailable> {
        (**self).fetch_page(page)
    }
}

/// Serves pages out of a record list held in memory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MemorySource {
    records: Vec<Record>,
    page_size: usize,
}

impl MemorySource {
    pub fn new(records: Vec<Record>, page_size: usize) -> Self {
        Self {
            records,
            page_size: page_size.max(1),
        }
    }

    /// Offline catalog for `--demo`.
    pub fn demo(total: usize, page_size: usize) -> Self {
        let records = (1..=total)
            .map(|index| demo_record(index as i64))
            .collect::<Vec<_>>();
        Self::new(records, page_size)
    }
}

impl PageSource for MemorySource {
    fn page_size(&self) -> usize {
        self.page_size
    }

    fn fetch_page(&self, page: u32) -> Result<Page, SourceUnavailable> {
        if page == 0 {
            return Err(SourceUnavailable::payload(page, "page numbers start at 1"));
        }
        let start = (page as usize - 1).saturating_mul(self.page_size);
        let records = self
            .records
            .iter()
            .skip(start)
            .take(self.page_size)
            .cloned()
            .collect();
        Ok(Page {
            number: page,
            records,
            total_count: self.records.len() as u64,
        })
    }
}

const DEMO_SUBJECTS: [&str; 8] = [
    "Study of a Harbor",
    "Water Lilies",
    "Portrait of a Woman",
    "Still Life with Pears",
    "Mountain Landscape",
    "Seated Figure",
    "Bowl with Lotus Decoration",
    "Street in Winter",
];

const DEMO_ORIGINS: [&str; 6] = ["France", "Japan", "United States", "Italy", "China", "Mexico"];

const DEMO_ARTISTS: [&str; 5] = [
    "Claude Monet\nFrench, 1840-1926",
    "Katsushika Hokusai\nJapanese, 1760-1849",
    "Mary Cassatt\nAmerican, 1844-1926",
    "Unknown Maker",
    "Diego Rivera\nMexican, 1886-1957",
];

fn demo_record(index: i64) -> Record {
    let slot = index.unsigned_abs() as usize;
    let start = 1600 + (index * 37) % 400;
    Record {
        id: RecordId::new(index),
        title: Some(format!("{} No. {index}", DEMO_SUBJECTS[slot % DEMO_SUBJECTS.len()])),
        place_of_origin: (slot % 7 != 0).then(|| DEMO_ORIGINS[slot % DEMO_ORIGINS.len()].to_owned()),
        artist_display: Some(DEMO_ARTISTS[slot % DEMO_ARTISTS.len()].to_owned()),
        inscriptions: (slot % 3 == 0).then(|| format!("Signed lower right, {start}")),
        date_start: Some(start),
        date_end: (slot % 5 != 0).then_some(start + (index % 4)),
    }
}
