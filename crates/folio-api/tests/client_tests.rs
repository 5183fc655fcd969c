// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use anyhow::{Result, anyhow};
use folio_api::Client;
use folio_app::{CatalogSession, PageSource, SourceFailure, collect_first};
use folio_testkit::{RecordFaker, id_range, page_body};
use std::thread;
use std::time::Duration;
use tiny_http::{Header, Response, Server};

fn json_header() -> Header {
    Header::from_bytes("Content-Type", "application/json").expect("valid content type header")
}

fn page_from_url(url: &str) -> u32 {
    url.split(['?', '&'])
        .find_map(|pair| pair.strip_prefix("page="))
        .and_then(|value| value.parse().ok())
        .expect("page query parameter expected")
}

#[test]
fn unreachable_source_maps_to_connection_failure() {
    let client = Client::new("http://127.0.0.1:1/artworks", 12, Duration::from_millis(50))
        .expect("client should initialize");

    let error = client.fetch_page(1).expect_err("fetch should fail");
    assert_eq!(error.page, 1);
    assert!(matches!(error.reason, SourceFailure::Connection(_)));

    let ping = client.ping().expect_err("ping should fail");
    assert!(ping.to_string().contains("[source].base_url"));
}

#[test]
fn fetch_page_requests_page_and_limit_and_decodes_body() -> Result<()> {
    let server =
        Server::http("127.0.0.1:0").map_err(|error| anyhow!("start mock server: {error}"))?;
    let addr = format!("http://{}/api/v1/artworks", server.server_addr());
    let records = RecordFaker::new(11).catalog(3);
    let body = page_body(&records, 3, 1, 12)?;

    let handle = thread::spawn(move || {
        let request = server.recv().expect("request expected");
        assert_eq!(request.url(), "/api/v1/artworks?page=1&limit=12");
        let response = Response::from_string(body)
            .with_status_code(200)
            .with_header(json_header());
        request.respond(response).expect("response should succeed");
    });

    let client = Client::new(&addr, 12, Duration::from_secs(1))?;
    let page = client.fetch_page(1)?;
    assert_eq!(page.number, 1);
    assert_eq!(page.total_count, 3);
    assert_eq!(page.records, records);

    handle.join().expect("server thread should join");
    Ok(())
}

#[test]
fn non_success_status_maps_to_status_failure() -> Result<()> {
    let server =
        Server::http("127.0.0.1:0").map_err(|error| anyhow!("start mock server: {error}"))?;
    let addr = format!("http://{}/artworks", server.server_addr());

    let handle = thread::spawn(move || {
        let request = server.recv().expect("request expected");
        let response = Response::from_string(
            r#"{"status":403,"error":"Forbidden","detail":"Too many requests"}"#,
        )
        .with_status_code(403)
        .with_header(json_header());
        request.respond(response).expect("response should succeed");
    });

    let client = Client::new(&addr, 12, Duration::from_secs(1))?;
    let error = client.fetch_page(7).expect_err("403 should fail");
    assert_eq!(error.page, 7);
    assert_eq!(
        error.reason,
        SourceFailure::Status {
            status: 403,
            message: "Too many requests".to_owned(),
        }
    );

    handle.join().expect("server thread should join");
    Ok(())
}

#[test]
fn malformed_body_maps_to_payload_failure() -> Result<()> {
    let server =
        Server::http("127.0.0.1:0").map_err(|error| anyhow!("start mock server: {error}"))?;
    let addr = format!("http://{}/artworks", server.server_addr());

    let handle = thread::spawn(move || {
        let request = server.recv().expect("request expected");
        let response = Response::from_string(r#"{"data": "not a list"}"#)
            .with_status_code(200)
            .with_header(json_header());
        request.respond(response).expect("response should succeed");
    });

    let client = Client::new(&addr, 12, Duration::from_secs(1))?;
    let error = client.fetch_page(1).expect_err("bad payload should fail");
    assert!(matches!(error.reason, SourceFailure::Payload(_)));

    handle.join().expect("server thread should join");
    Ok(())
}

#[test]
fn preselect_walks_http_pages_in_order() -> Result<()> {
    let server =
        Server::http("127.0.0.1:0").map_err(|error| anyhow!("start mock server: {error}"))?;
    let addr = format!("http://{}/artworks", server.server_addr());
    let catalog = RecordFaker::new(2).catalog(30);

    let handle = thread::spawn(move || {
        let mut served = Vec::new();
        for _ in 0..2 {
            let request = server.recv().expect("request expected");
            let page = page_from_url(request.url());
            served.push(page);
            let start = (page as usize - 1) * 12;
            let end = (start + 12).min(catalog.len());
            let body = page_body(&catalog[start..end], 30, page, 12).expect("encode page");
            let response = Response::from_string(body)
                .with_status_code(200)
                .with_header(json_header());
            request.respond(response).expect("response should succeed");
        }
        served
    });

    let client = Client::new(&addr, 12, Duration::from_secs(1))?;
    let outcome = collect_first(&client, 15);
    assert_eq!(outcome.ids, id_range(1, 15));
    assert_eq!(outcome.pages_fetched, 2);

    let served = handle.join().expect("server thread should join");
    assert_eq!(served, vec![1, 2]);
    Ok(())
}

#[test]
fn session_keeps_previous_page_when_http_fails() -> Result<()> {
    let server =
        Server::http("127.0.0.1:0").map_err(|error| anyhow!("start mock server: {error}"))?;
    let addr = format!("http://{}/artworks", server.server_addr());
    let records = RecordFaker::new(9).catalog(12);
    let body = page_body(&records, 40, 1, 12)?;

    let handle = thread::spawn(move || {
        let first = server.recv().expect("first request expected");
        first
            .respond(
                Response::from_string(body)
                    .with_status_code(200)
                    .with_header(json_header()),
            )
            .expect("response should succeed");

        let second = server.recv().expect("second request expected");
        second
            .respond(Response::from_string("busy").with_status_code(503))
            .expect("response should succeed");
    });

    let client = Client::new(&addr, 12, Duration::from_secs(1))?;
    let mut session = CatalogSession::new(client);
    session.request_page(1)?;
    let error = session.request_page(2).expect_err("page 2 should fail");
    assert!(error.to_string().contains("503"));

    assert_eq!(session.state().current_page(), 1);
    assert_eq!(session.state().records(), records.as_slice());
    assert!(!session.state().is_loading());

    handle.join().expect("server thread should join");
    Ok(())
}
