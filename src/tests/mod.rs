use std::time::Duration;

use serde_json::Value;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;

use crate::fetch::{DataSource, FetchError, HttpOptions, HttpSource, RecordSource};
use crate::filter::{SearchField, StatusFilter};
use crate::output::{self, OutputFormat};
use crate::state::{Action, Flow, QueryState, Screen, Session, LOAD_ERROR_MESSAGE};
use crate::view;

const PERMITS: &str = include_str!("fixtures/permits.json");

fn fixture() -> DataSource {
    let values: Vec<Value> = serde_json::from_str(PERMITS).unwrap();
    DataSource::Inline(values)
}

async fn loaded() -> Session {
    let mut session = Session::new(QueryState::default());
    session.load(&fixture()).await;
    session
}

fn page_ids(session: &Session) -> Vec<String> {
    match session.screen() {
        Screen::Ready(listing) => listing.page().items.iter().map(|r| r.id.clone()).collect(),
        other => panic!("expected a listing, got {other:?}"),
    }
}

fn rendered(session: &Session) -> String {
    colored::control::set_override(false);
    view::render_screen(&session.screen(), session.search_pending())
}

async fn settle(session: &mut Session) {
    let settled = session.next_settled().await.unwrap();
    assert!(session.apply_settled(settled));
}

struct Unreachable;

impl RecordSource for Unreachable {
    async fn fetch_records(&self) -> Result<Vec<Value>, FetchError> {
        Err(FetchError::NotAnArray {
            origin: "stub".to_string(),
        })
    }
}

/// Answers a single HTTP request with `status_line` and `body`, then closes.
async fn serve_once(status_line: &'static str, body: &'static str) -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        let (mut socket, _) = listener.accept().await.unwrap();
        let mut request = Vec::new();
        let mut buf = [0u8; 1024];
        while !request.windows(4).any(|w| w == b"\r\n\r\n") {
            match socket.read(&mut buf).await {
                Ok(0) | Err(_) => break,
                Ok(n) => request.extend_from_slice(&buf[..n]),
            }
        }
        let response = format!(
            "HTTP/1.1 {status_line}\r\ncontent-type: application/json\r\ncontent-length: {}\r\nconnection: close\r\n\r\n{body}",
            body.len()
        );
        let _ = socket.write_all(response.as_bytes()).await;
        let _ = socket.shutdown().await;
    });
    format!("http://{addr}/p.json")
}

fn http_source(url: &str) -> HttpSource {
    let options = HttpOptions {
        timeout_seconds: 5,
        ..HttpOptions::default()
    };
    HttpSource::new(url, options).unwrap()
}

#[tokio::test]
async fn http_source_decodes_the_array() {
    let url = serve_once("200 OK", PERMITS).await;
    let values = http_source(&url).fetch_records().await.unwrap();
    assert_eq!(values.len(), 11);
}

#[tokio::test]
async fn server_error_status_leads_to_the_error_screen() {
    let url = serve_once("500 Internal Server Error", "").await;
    let err = http_source(&url).fetch_records().await.unwrap_err();
    assert!(
        matches!(&err, FetchError::Status { status, .. } if status.as_u16() == 500),
        "unexpected error: {err}"
    );

    let url = serve_once("500 Internal Server Error", "").await;
    let mut session = Session::new(QueryState::default());
    session.load(&http_source(&url)).await;
    assert!(matches!(session.screen(), Screen::Error(LOAD_ERROR_MESSAGE)));
}

#[tokio::test]
async fn refused_connection_is_a_request_error() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let url = format!("http://{addr}/p.json");
    let err = http_source(&url).fetch_records().await.unwrap_err();
    assert!(
        matches!(err, FetchError::Request { .. }),
        "unexpected error: {err}"
    );

    let mut session = Session::new(QueryState::default());
    session.load(&http_source(&url)).await;
    assert!(matches!(session.screen(), Screen::Error(_)));
}

#[tokio::test]
async fn first_page_of_the_full_dataset() {
    let session = loaded().await;
    assert_eq!(session.records().unwrap().len(), 11);
    assert_eq!(page_ids(&session).len(), 10);

    let Screen::Ready(listing) = session.screen() else {
        panic!("dataset should be ready");
    };
    let page = listing.page();
    assert_eq!(page.summary(), "Showing 1–10 of 11");
    assert_eq!(page.indicator(), "Page 1 of 2");
    assert!(!page.has_previous());
    assert!(page.has_next());

    let out = rendered(&session);
    assert!(out.contains("Showing 1–10 of 11"));
    assert!(out.contains("Donuts, Coffee, Hot Chocolate"));
}

#[tokio::test]
async fn next_page_shows_the_remainder() {
    let mut session = loaded().await;
    assert_eq!(session.dispatch(Action::NextPage), Flow::Continue);
    assert_eq!(page_ids(&session), vec!["556677"]);

    let Screen::Ready(listing) = session.screen() else {
        panic!("dataset should be ready");
    };
    let page = listing.page();
    assert_eq!(page.summary(), "Showing 11–11 of 11");
    assert!(page.has_previous());
    assert!(!page.has_next());

    // already on the last page
    session.dispatch(Action::NextPage);
    assert_eq!(session.query().page, 2);
    session.dispatch(Action::PreviousPage);
    session.dispatch(Action::PreviousPage);
    assert_eq!(session.query().page, 1);
}

#[tokio::test(start_paused = true)]
async fn search_applies_after_the_quiet_period() {
    let mut session = loaded().await;
    session.dispatch(Action::NextPage);
    session.dispatch(Action::SetSearchText("bob".to_string()));
    assert_eq!(session.query().page, 1);
    assert!(session.search_pending());
    // the typed text is visible before it takes effect
    assert_eq!(page_ids(&session).len(), 10);

    settle(&mut session).await;
    assert_eq!(page_ids(&session), vec!["123"]);
    assert!(rendered(&session).contains("Showing 1–1 of 1"));
}

#[tokio::test(start_paused = true)]
async fn rapid_typing_yields_one_update() {
    let mut session = loaded().await;
    for text in ["t", "ti", "tin", "tina"] {
        session.dispatch(Action::SetSearchText(text.to_string()));
        tokio::time::sleep(Duration::from_millis(120)).await;
        assert_eq!(session.query().effective_search, "");
    }

    settle(&mut session).await;
    assert_eq!(session.query().effective_search, "tina");
    assert_eq!(page_ids(&session), vec!["234"]);
    assert!(
        tokio::time::timeout(Duration::from_secs(2), session.next_settled())
            .await
            .is_err()
    );
}

#[tokio::test(start_paused = true)]
async fn address_search() {
    let mut session = loaded().await;
    session.dispatch(Action::SetSearchField(SearchField::Address));
    session.dispatch(Action::SetSearchText("Washington".to_string()));
    settle(&mut session).await;
    assert_eq!(page_ids(&session), vec!["556677"]);
}

#[tokio::test(start_paused = true)]
async fn field_change_clears_the_search() {
    let mut session = loaded().await;
    session.dispatch(Action::SetSearchText("bob".to_string()));
    settle(&mut session).await;
    session.dispatch(Action::SetSearchField(SearchField::Address));
    assert_eq!(session.query().raw_search, "");
    assert_eq!(session.query().page, 1);

    settle(&mut session).await;
    assert_eq!(session.query().effective_search, "");
    assert_eq!(page_ids(&session).len(), 10);
}

#[tokio::test]
async fn status_filter_is_immediate() {
    let mut session = loaded().await;
    session.dispatch(Action::NextPage);
    session.dispatch(Action::SetStatus(StatusFilter::Expired));
    assert_eq!(session.query().page, 1);
    assert_eq!(page_ids(&session), vec!["234"]);

    session.dispatch(Action::SetStatus(StatusFilter::Requested));
    assert!(page_ids(&session).is_empty());
    let out = rendered(&session);
    assert!(out.contains("Showing 0 of 0"));
    assert!(out.contains("Page 1 of 1"));
    assert!(out.contains("No food trucks match the current filters."));
}

#[tokio::test]
async fn failed_load_shows_the_error_screen() {
    let mut session = Session::new(QueryState::default());
    session.load(&Unreachable).await;
    assert!(matches!(session.screen(), Screen::Error(LOAD_ERROR_MESSAGE)));
    assert!(session.records().is_none());

    let out = rendered(&session);
    assert!(out.contains(LOAD_ERROR_MESSAGE));
    assert!(!out.contains("Applicant"));

    assert_eq!(session.dispatch(Action::NextPage), Flow::Continue);
    assert_eq!(session.dispatch(Action::Reload), Flow::Reload);
}

#[tokio::test]
async fn a_settled_session_ignores_further_loads() {
    let mut session = loaded().await;
    session.load(&Unreachable).await;
    assert_eq!(session.records().unwrap().len(), 11);
}

#[tokio::test]
async fn filtered_set_is_exported_whole() {
    let mut session = loaded().await;
    session.dispatch(Action::SetStatus(StatusFilter::Approved));
    let Screen::Ready(listing) = session.screen() else {
        panic!("dataset should be ready");
    };
    assert_eq!(listing.matches.len(), 10);

    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("approved.json");
    let path = path.to_string_lossy().to_string();
    output::write_export(&path, OutputFormat::Json, &listing.matches)
        .await
        .unwrap();

    let written: Vec<Value> =
        serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
    assert_eq!(written.len(), 10);
    assert!(written.iter().all(|r| r["status"] == "APPROVED"));
    assert_eq!(written[0]["latitude"], "37.79");
}
