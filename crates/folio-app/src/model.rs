// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use serde::{Deserialize, Serialize};

use crate::ids::RecordId;

pub const DEFAULT_PAGE_SIZE: usize = 12;

/// One catalog item. Every display attribute is present as a field, even when
/// the source left it out.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Record {
    pub id: RecordId,
    pub title: Option<String>,
    pub place_of_origin: Option<String>,
    pub artist_display: Option<String>,
    pub inscriptions: Option<String>,
    pub date_start: Option<i64>,
    pub date_end: Option<i64>,
}

impl Record {
    pub fn bare(id: RecordId) -> Self {
        Self {
            id,
            title: None,
            place_of_origin: None,
            artist_display: None,
            inscriptions: None,
            date_start: None,
            date_end: None,
        }
    }

    pub fn cell(&self, column: Column) -> String {
        match column {
            Column::Title => flatten_text(self.title.as_deref()),
            Column::Origin => flatten_text(self.place_of_origin.as_deref()),
            Column::Artist => flatten_text(self.artist_display.as_deref()),
            Column::Inscriptions => flatten_text(self.inscriptions.as_deref()),
            Column::StartDate => self.date_start.map(|year| year.to_string()).unwrap_or_default(),
            Column::EndDate => self.date_end.map(|year| year.to_string()).unwrap_or_default(),
        }
    }
}

fn flatten_text(value: Option<&str>) -> String {
    value
        .map(|text| text.split_whitespace().collect::<Vec<_>>().join(" "))
        .unwrap_or_default()
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Page {
    pub number: u32,
    pub records: Vec<Record>,
    pub total_count: u64,
}

impl Page {
    pub fn empty(number: u32, total_count: u64) -> Self {
        Self {
            number,
            records: Vec::new(),
            total_count,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn ids(&self) -> impl Iterator<Item = RecordId> + '_ {
        self.records.iter().map(|record| record.id)
    }

    pub fn contains(&self, id: RecordId) -> bool {
        self.records.iter().any(|record| record.id == id)
    }

    /// Zero-based offset of this page's first row within the whole collection.
    pub fn first_index(&self, page_size: usize) -> u64 {
        u64::from(self.number.saturating_sub(1)) * page_size as u64
    }

    pub fn page_count(&self, page_size: usize) -> u32 {
        page_count(self.total_count, page_size)
    }
}

pub fn page_count(total_count: u64, page_size: usize) -> u32 {
    if page_size == 0 {
        return 0;
    }
    let pages = total_count.div_ceil(page_size as u64);
    u32::try_from(pages).unwrap_or(u32::MAX)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Column {
    Title,
    Origin,
    Artist,
    Inscriptions,
    StartDate,
    EndDate,
}

impl Column {
    pub const ALL: [Self; 6] = [
        Self::Title,
        Self::Origin,
        Self::Artist,
        Self::Inscriptions,
        Self::StartDate,
        Self::EndDate,
    ];

    pub const fn label(self) -> &'static str {
        match self {
            Self::Title => "Title",
            Self::Origin => "Origin",
            Self::Artist => "Artist",
            Self::Inscriptions => "Inscriptions",
            Self::StartDate => "Start Date",
            Self::EndDate => "End Date",
        }
    }
}
