// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use anyhow::{Context, Result, anyhow, bail};
use folio_app::{Page, PageSource, Record, RecordId, SourceUnavailable};
use reqwest::StatusCode;
use reqwest::blocking::Client as HttpClient;
use serde::Deserialize;
use std::time::Duration;
use tracing::debug;
use url::Url;

pub const DEFAULT_BASE_URL: &str = "https://api.artic.edu/api/v1/artworks";

const USER_AGENT: &str = concat!("folio/", env!("CARGO_PKG_VERSION"));

/// Blocking client for a `?page=<n>` collection endpoint.
#[derive(Debug, Clone)]
pub struct Client {
    base_url: Url,
    page_size: usize,
    http: HttpClient,
}

impl Client {
    pub fn new(base_url: &str, page_size: usize, timeout: Duration) -> Result<Self> {
        let trimmed = base_url.trim().trim_end_matches('/');
        if trimmed.is_empty() {
            bail!("source.base_url must not be empty");
        }
        let base_url = Url::parse(trimmed)
            .with_context(|| format!("source.base_url {trimmed:?} is not a valid URL"))?;
        if !matches!(base_url.scheme(), "http" | "https") {
            bail!(
                "source.base_url must use http or https, got {:?}",
                base_url.scheme()
            );
        }
        if page_size == 0 {
            bail!("source.page_size must be positive");
        }

        let http = HttpClient::builder()
            .timeout(timeout)
            .user_agent(USER_AGENT)
            .build()
            .context("build HTTP client")?;

        Ok(Self {
            base_url,
            page_size,
            http,
        })
    }

    pub fn base_url(&self) -> &str {
        self.base_url.as_str()
    }

    pub fn page_url(&self, page: u32) -> Url {
        let mut url = self.base_url.clone();
        url.query_pairs_mut()
            .append_pair("page", &page.to_string())
            .append_pair("limit", &self.page_size.to_string());
        url
    }

    pub fn fetch(&self, page: u32) -> Result<Page, SourceUnavailable> {
        let url = self.page_url(page);
        debug!(%url, "fetching page");

        let response = self
            .http
            .get(url)
            .send()
            .map_err(|error| connection_error(page, self.base_url.as_str(), error))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().unwrap_or_default();
            return Err(clean_error_response(page, status, &body));
        }

        let body = response
            .text()
            .map_err(|error| SourceUnavailable::payload(page, format!("read body: {error}")))?;
        decode_page(page, &body)
    }

    /// Fetches page 1 once so startup checks fail early with a readable message.
    pub fn ping(&self) -> Result<u64> {
        let page = self.fetch(1).map_err(|error| {
            anyhow!(
                "{error} -- check [source].base_url ({}) and your network",
                self.base_url
            )
        })?;
        Ok(page.total_count)
    }
}

impl PageSource for Client {
    fn page_size(&self) -> usize {
        self.page_size
    }

    fn fetch_page(&self, page: u32) -> Result<Page, SourceUnavailable> {
        self.fetch(page).inspect_err(|error| {
            debug!(page, error = %error, "page request failed");
        })
    }
}

/// Decodes one page body. Every record field the payload leaves out, or sets
/// to null, comes back as `None`; a missing total comes back as 0.
pub fn decode_page(page: u32, body: &str) -> Result<Page, SourceUnavailable> {
    let parsed: PageResponse = serde_json::from_str(body)
        .map_err(|error| SourceUnavailable::payload(page, error.to_string()))?;

    let total_count = parsed
        .pagination
        .and_then(|pagination| pagination.total)
        .unwrap_or(0);
    let records = parsed.data.into_iter().map(RawRecord::into_record).collect();

    Ok(Page {
        number: page,
        records,
        total_count,
    })
}

fn connection_error(page: u32, base_url: &str, error: reqwest::Error) -> SourceUnavailable {
    let message = if error.is_timeout() {
        format!("request to {base_url} timed out")
    } else {
        format!("cannot reach {base_url} ({error})")
    };
    SourceUnavailable::connection(page, message)
}

fn clean_error_response(page: u32, status: StatusCode, body: &str) -> SourceUnavailable {
    let code = status.as_u16();
    if let Ok(parsed) = serde_json::from_str::<ErrorEnvelope>(body) {
        if let Some(detail) = parsed.detail
            && !detail.is_empty()
        {
            return SourceUnavailable::status(page, code, detail);
        }
        if let Some(error) = parsed.error
            && !error.is_empty()
        {
            return SourceUnavailable::status(page, code, error);
        }
    }

    let trimmed = body.trim();
    if !trimmed.is_empty() && trimmed.len() < 100 && !trimmed.contains('{') {
        return SourceUnavailable::status(page, code, trimmed);
    }

    SourceUnavailable::status(
        page,
        code,
        status.canonical_reason().unwrap_or("unexpected status"),
    )
}

#[derive(Debug, Deserialize)]
struct PageResponse {
    data: Vec<RawRecord>,
    pagination: Option<Pagination>,
}

#[derive(Debug, Deserialize)]
struct Pagination {
    total: Option<u64>,
}

#[derive(Debug, Deserialize)]
struct RawRecord {
    id: i64,
    title: Option<String>,
    place_of_origin: Option<String>,
    artist_display: Option<String>,
    inscriptions: Option<String>,
    date_start: Option<i64>,
    date_end: Option<i64>,
}

impl RawRecord {
    fn into_record(self) -> Record {
        Record {
            id: RecordId::new(self.id),
            title: self.title,
            place_of_origin: self.place_of_origin,
            artist_display: self.artist_display,
            inscriptions: self.inscriptions,
            date_start: self.date_start,
            date_end: self.date_end,
        }
    }
}

#[derive(Debug, Deserialize)]
struct ErrorEnvelope {
    error: Option<String>,
    detail: Option<String>,
}
