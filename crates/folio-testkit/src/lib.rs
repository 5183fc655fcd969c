// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use anyhow::{Context, Result};
use folio_app::{MemorySource, Page, PageSource, Record, RecordId, SourceUnavailable};
use std::collections::BTreeSet;
use std::sync::Mutex;

const TITLE_NOUNS: [&str; 14] = [
    "Harbor",
    "Haystacks",
    "Lilies",
    "Bridge",
    "Cathedral",
    "Garden",
    "Courtyard",
    "Orchard",
    "Bather",
    "Dancer",
    "Vase",
    "Screen",
    "Tea Bowl",
    "Mask",
];

const TITLE_FORMS: [&str; 6] = [
    "Study of a",
    "The",
    "View of the",
    "Fragment of a",
    "Sketch for a",
    "Evening",
];

const ORIGINS: [&str; 10] = [
    "France",
    "Japan",
    "United States",
    "Italy",
    "China",
    "Mexico",
    "Netherlands",
    "Egypt",
    "India",
    "Peru",
];

const ARTISTS: [&str; 10] = [
    "Claude Monet",
    "Mary Cassatt",
    "Katsushika Hokusai",
    "Georges Seurat",
    "Berthe Morisot",
    "Utagawa Hiroshige",
    "Winslow Homer",
    "Frida Kahlo",
    "Rembrandt van Rijn",
    "Unknown Maker",
];

const NATIONALITIES: [&str; 6] = [
    "French",
    "American",
    "Japanese",
    "Dutch",
    "Mexican",
    "Italian",
];

#[derive(Debug, Clone)]
struct DeterministicRng {
    state: u64,
}

impl DeterministicRng {
    fn new(seed: u64) -> Self {
        let mut state = seed ^ 0x9E37_79B9_7F4A_7C15;
        if state == 0 {
            state = 0xA409_3822_299F_31D0;
        }
        Self { state }
    }

    fn next_u64(&mut self) -> u64 {
        self.state = self
            .state
            .wrapping_mul(6_364_136_223_846_793_005)
            .wrapping_add(1_442_695_040_888_963_407);

        let mut x = self.state;
        x ^= x >> 13;
        x ^= x << 7;
        x ^= x >> 17;
        x
    }

    fn int_n(&mut self, n: usize) -> usize {
        if n <= 1 {
            return 0;
        }
        (self.next_u64() % (n as u64)) as usize
    }

    fn chance(&mut self, percent: u64) -> bool {
        self.next_u64() % 100 < percent
    }
}

/// Seeded generator of plausible catalog records.
#[derive(Debug, Clone)]
pub struct RecordFaker {
    rng: DeterministicRng,
    seed: u64,
}

impl RecordFaker {
    pub fn new(seed: u64) -> Self {
        let normalized = if seed == 0 { 1 } else { seed };
        Self {
            rng: DeterministicRng::new(normalized),
            seed: normalized,
        }
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }

    pub fn record(&mut self, id: i64) -> Record {
        let title = format!("{} {}", self.pick(&TITLE_FORMS), self.pick(&TITLE_NOUNS));
        let born = self.int_range(1600, 1950);
        let artist = format!(
            "{}\n{}, {}-{}",
            self.pick(&ARTISTS),
            self.pick(&NATIONALITIES),
            born,
            born + self.int_range(30, 90)
        );
        let start = born + self.int_range(18, 30);

        Record {
            id: RecordId::new(id),
            title: Some(title),
            place_of_origin: (!self.rng.chance(10)).then(|| self.pick(&ORIGINS).to_owned()),
            artist_display: (!self.rng.chance(5)).then_some(artist),
            inscriptions: self
                .rng
                .chance(30)
                .then(|| format!("Signed and dated lower left: {start}")),
            date_start: (!self.rng.chance(5)).then_some(start),
            date_end: (!self.rng.chance(15)).then(|| start + self.int_range(0, 4)),
        }
    }

    /// Records with ids `1..=total`, in source order.
    pub fn catalog(&mut self, total: usize) -> Vec<Record> {
        (1..=total as i64).map(|id| self.record(id)).collect()
    }

    fn pick<'a>(&mut self, items: &'a [&'a str]) -> &'a str {
        items[self.rng.int_n(items.len())]
    }

    fn int_range(&mut self, min: i64, max: i64) -> i64 {
        if max <= min {
            return min;
        }
        let span = max - min + 1;
        min + (self.rng.next_u64() % (span as u64)) as i64
    }
}

/// Deterministic paged source that records every fetch and can be told to
/// fail specific pages.
#[derive(Debug)]
pub struct FixedSource {
    inner: MemorySource,
    fetched: Mutex<Vec<u32>>,
    failing: Mutex<BTreeSet<u32>>,
}

impl FixedSource {
    pub fn new(records: Vec<Record>, page_size: usize) -> Self {
        Self {
            inner: MemorySource::new(records, page_size),
            fetched: Mutex::new(Vec::new()),
            failing: Mutex::new(BTreeSet::new()),
        }
    }

    /// `total` faker records with ids `1..=total`.
    pub fn catalog(total: usize, page_size: usize) -> Self {
        Self::new(RecordFaker::new(7).catalog(total), page_size)
    }

    pub fn fail_page(&self, page: u32) {
        lock(&self.failing).insert(page);
    }

    pub fn heal_page(&self, page: u32) {
        lock(&self.failing).remove(&page);
    }

    pub fn fetched(&self) -> Vec<u32> {
        lock(&self.fetched).clone()
    }

    pub fn fetch_count(&self) -> usize {
        lock(&self.fetched).len()
    }

}

impl PageSource for FixedSource {
    fn page_size(&self) -> usize {
        self.inner.page_size()
    }

    fn fetch_page(&self, page: u32) -> Result<Page, SourceUnavailable> {
        lock(&self.fetched).push(page);
        if lock(&self.failing).contains(&page) {
            return Err(SourceUnavailable::connection(
                page,
                "connection refused (scripted)",
            ));
        }
        self.inner.fetch_page(page)
    }
}

fn lock<T>(mutex: &Mutex<T>) -> std::sync::MutexGuard<'_, T> {
    match mutex.lock() {
        Ok(guard) => guard,
        Err(poisoned) => poisoned.into_inner(),
    }
}

pub fn ids(values: &[i64]) -> Vec<RecordId> {
    values.iter().copied().map(RecordId::new).collect()
}

pub fn id_range(first: i64, last: i64) -> Vec<RecordId> {
    (first..=last).map(RecordId::new).collect()
}

/// Body shaped like the upstream collection endpoint for one page.
pub fn page_body(records: &[Record], total: u64, page: u32, limit: usize) -> Result<String> {
    let data = records
        .iter()
        .map(|record| {
            serde_json::json!({
                "id": record.id.get(),
                "title": record.title,
                "place_of_origin": record.place_of_origin,
                "artist_display": record.artist_display,
                "inscriptions": record.inscriptions,
                "date_start": record.date_start,
                "date_end": record.date_end,
            })
        })
        .collect::<Vec<_>>();
    let body = serde_json::json!({
        "pagination": {
            "total": total,
            "limit": limit,
            "offset": u64::from(page.saturating_sub(1)) * limit as u64,
            "current_page": page,
        },
        "data": data,
    });
    serde_json::to_string(&body).context("encode page body")
}

#[cfg(test)]
mod tests {
    use super::{FixedSource, RecordFaker, id_range, page_body};
    use folio_app::{PageSource, RecordId};

    #[test]
    fn new_deterministic_seed() {
        let mut left = RecordFaker::new(42);
        let mut right = RecordFaker::new(42);
        assert_eq!(left.record(1), right.record(1));
    }

    #[test]
    fn zero_seed_is_normalized() {
        assert_eq!(RecordFaker::new(0).seed(), 1);
    }

    #[test]
    fn catalog_ids_are_sequential() {
        let records = RecordFaker::new(3).catalog(5);
        let ids = records.iter().map(|record| record.id).collect::<Vec<_>>();
        assert_eq!(ids, id_range(1, 5));
        assert!(records.iter().all(|record| record.title.is_some()));
    }

    #[test]
    fn fixed_source_logs_fetches_and_scripted_failures() {
        let source = FixedSource::catalog(30, 12);
        source.fail_page(2);

        assert!(source.fetch_page(1).is_ok());
        let error = source.fetch_page(2).expect_err("page 2 is scripted to fail");
        assert_eq!(error.page, 2);

        source.heal_page(2);
        assert_eq!(source.fetch_page(2).expect("healed").records[0].id, RecordId::new(13));
        assert_eq!(source.fetched(), vec![1, 2, 2]);
    }

    #[test]
    fn page_body_has_data_and_pagination() -> anyhow::Result<()> {
        let records = RecordFaker::new(5).catalog(2);
        let body = page_body(&records, 30, 1, 12)?;
        let value: serde_json::Value = serde_json::from_str(&body)?;
        assert_eq!(value["pagination"]["total"], 30);
        assert_eq!(value["data"].as_array().map(Vec::len), Some(2));
        Ok(())
    }
}
