use std::sync::Mutex;

use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;

use cloud_csv::*;

/// Serves a single HTTP response on a random local port and returns the URL of `path` on it.
/// The query string mimics the signature of an Azure SAS URL.
async fn serve_once(status: &'static str, body: &'static [u8], path: &str) -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let address = listener.local_addr().unwrap();
    tokio::spawn(async move {
        let (mut socket, _) = listener.accept().await.unwrap();
        let mut request: Vec<u8> = vec![];
        let mut chunk = [0u8; 1024];
        while !request.windows(4).any(|w| w == b"\r\n\r\n") {
            let n = socket.read(&mut chunk).await.unwrap();
            if n == 0 {
                break;
            }
            request.extend_from_slice(&chunk[..n]);
        }
        let head = format!(
            "HTTP/1.1 {status}\r\nContent-Length: {}\r\nContent-Type: text/csv\r\nConnection: close\r\n\r\n",
            body.len()
        );
        socket.write_all(head.as_bytes()).await.unwrap();
        socket.write_all(body).await.unwrap();
        socket.shutdown().await.unwrap();
    });
    format!("http://{address}{path}?sv=2022-11-02&sig=secret_signature")
}

/// A [`log::Log`] that keeps every message in memory
#[derive(Default)]
struct Capture(Mutex<Vec<(log::Level, String)>>);

impl log::Log for Capture {
    fn enabled(&self, _: &log::Metadata) -> bool {
        true
    }

    fn log(&self, record: &log::Record) {
        self.0
            .lock()
            .unwrap()
            .push((record.level(), record.args().to_string()));
    }

    fn flush(&self) {}
}

async fn run(url: &str) -> (Result<Outcome, Error>, Vec<(log::Level, String)>) {
    let capture = Capture::default();
    // local test servers must not go through a proxy configured in the environment
    let fetcher = HttpFetcher::with_client(reqwest::Client::builder().no_proxy().build().unwrap());
    let outcome = {
        let logger = Logger::new(&capture, "it");
        fetch_and_load(Some(url), &fetcher, &Dialect::default(), &logger).await
    };
    let records = capture.0.into_inner().unwrap();
    (outcome, records)
}

#[tokio::test]
async fn http_end_to_end() {
    let url = serve_once("200 OK", b"name,age\nAlice,24\nBob,30", "/data/people.csv").await;

    let (outcome, records) = run(&url).await;

    let Ok(Outcome::Table(table)) = &outcome else {
        panic!("expected a table, got {outcome:?}")
    };
    assert_eq!(table.column_names().collect::<Vec<_>>(), vec!["name", "age"]);
    assert_eq!(
        table.column("age").unwrap().cloned().collect::<Vec<_>>(),
        vec![Value::Integer(24), Value::Integer(30)]
    );
    assert_eq!(
        report::preview(&table, 5),
        "    name  age\n0  Alice   24\n1    Bob   30"
    );
    assert!(records
        .iter()
        .all(|(_, message)| !message.contains("secret_signature")));
}

#[tokio::test]
async fn http_not_found() {
    let url = serve_once("404 Not Found", b"", "/data/missing.csv").await;

    let (outcome, records) = run(&url).await;

    let Ok(Outcome::Failed(Error::NotFound { url, .. })) = &outcome else {
        panic!("expected not found, got {outcome:?}")
    };
    assert!(url.ends_with("/data/missing.csv"));
    assert!(records
        .iter()
        .any(|(level, _)| *level == log::Level::Error));
}

#[tokio::test]
async fn http_expired_signature() {
    let url = serve_once(
        "403 Server failed to authenticate the request",
        b"<?xml version=\"1.0\" encoding=\"utf-8\"?><Error><Code>AuthenticationFailed</Code></Error>",
        "/data/people.csv",
    )
    .await;

    let (outcome, _) = run(&url).await;

    assert!(matches!(outcome, Ok(Outcome::Failed(Error::Access { .. }))));
}

#[tokio::test]
async fn http_malformed_signature() {
    let url = serve_once(
        "400 Bad Request",
        b"<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n<Error><Code>AuthorizationQueryParametersError</Code><Message>X-Amz-Expires must be less than a week (in seconds) that is 604800</Message></Error>",
        "/data/people.csv",
    )
    .await;

    let (outcome, _) = run(&url).await;

    assert!(matches!(outcome, Ok(Outcome::Failed(Error::Access { .. }))));
}

#[tokio::test]
async fn large_error_body_is_cut() {
    // a single line, so only the read limit bounds the detail
    let body: &'static [u8] = Vec::leak(b"x".repeat(256 * 1024));
    let url = serve_once("500 Internal Server Error", body, "/data/people.csv").await;

    let (outcome, records) = run(&url).await;

    let Ok(Outcome::Failed(Error::Transport { detail, .. })) = &outcome else {
        panic!("expected a transport error, got {outcome:?}")
    };
    assert!(detail.len() <= 4096 + "500 Internal Server Error: ".len());
    assert_eq!(
        records
            .iter()
            .filter(|(level, _)| *level == log::Level::Error)
            .count(),
        1
    );
}

#[tokio::test]
async fn http_zero_bytes() {
    let url = serve_once("200 OK", b"", "/data/empty.csv").await;

    let (outcome, _) = run(&url).await;

    assert!(matches!(
        outcome,
        Ok(Outcome::Failed(Error::EmptyFetch { .. }))
    ));
}

#[tokio::test]
async fn http_server_error_is_transport() {
    let url = serve_once("503 Service Unavailable", b"", "/data/people.csv").await;

    let (outcome, _) = run(&url).await;

    assert!(matches!(
        outcome,
        Ok(Outcome::Failed(Error::Transport { .. }))
    ));
}

#[tokio::test]
async fn connection_refused_is_transport() {
    // bind and drop to get a port nothing listens on
    let address = TcpListener::bind("127.0.0.1:0")
        .await
        .unwrap()
        .local_addr()
        .unwrap();
    let url = format!("http://{address}/data.csv?sig=secret_signature");

    let (outcome, records) = run(&url).await;

    let Ok(Outcome::Failed(Error::Transport { detail, .. })) = &outcome else {
        panic!("expected a transport error, got {outcome:?}")
    };
    assert!(!detail.contains("secret_signature"));
    assert!(records
        .iter()
        .all(|(_, message)| !message.contains("secret_signature")));
}

#[tokio::test]
async fn header_only_is_empty() {
    let url = serve_once("200 OK", b"name,age\n", "/data/people.csv").await;

    let (outcome, _) = run(&url).await;

    let Ok(Outcome::Empty(table)) = &outcome else {
        panic!("expected an empty outcome, got {outcome:?}")
    };
    assert_eq!(table.column_names().collect::<Vec<_>>(), vec!["name", "age"]);
}

#[tokio::test]
async fn ragged_is_parse_error() {
    let url = serve_once("200 OK", b"name,age\nAlice\n", "/data/people.csv").await;

    let (outcome, _) = run(&url).await;

    assert!(matches!(outcome, Ok(Outcome::Failed(Error::Parse(_)))));
}

#[test]
fn env_var_name() {
    assert_eq!(ENV_VAR, "CLOUD_DATA_URL");
}
