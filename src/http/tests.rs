use std::sync::{Arc, Mutex};
use std::time::Duration;

use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;
use tokio::task::JoinHandle;

use super::*;
use crate::error::{HarError, HttpError};
use crate::har::{Entry, HarCookie, NameValue, PostData, PostParam, RequestDescriptor};
use reqwest::Url;
use reqwest::header::COOKIE;

fn descriptor(method: &str, url: &str) -> RequestDescriptor {
    RequestDescriptor {
        method: method.to_owned(),
        url: url.to_owned(),
        ..RequestDescriptor::default()
    }
}

fn cookie(name: &str, value: &str) -> HarCookie {
    HarCookie {
        name: name.to_owned(),
        value: value.to_owned(),
        ..HarCookie::default()
    }
}

#[test]
fn build_request_copies_method_url_and_headers() -> Result<(), HttpError> {
    let mut desc = descriptor("get", "http://localhost:8080/a%2Fb/c?x=1");
    desc.headers = vec![
        NameValue::new("Accept", "text/html"),
        NameValue::new(":authority", "localhost"),
        NameValue::new("Content-Length", "42"),
        NameValue::new("Cookie", "stale=1"),
        NameValue::new("X-Trace", "abc"),
    ];

    let request = build_request(&desc, false)?;
    if request.method() != reqwest::Method::GET {
        return Err(HttpError::from(format!("unexpected method {}", request.method())));
    }
    if request.url().path() != "/a%2Fb/c" {
        return Err(HttpError::from(format!("path was rewritten: {}", request.url().path())));
    }
    let headers = request.headers();
    if headers.get("accept").and_then(|v| v.to_str().ok()) != Some("text/html") {
        return Err(HttpError::from("expected Accept header"));
    }
    if headers.get("x-trace").is_none() {
        return Err(HttpError::from("expected X-Trace header"));
    }
    if headers.get("content-length").is_some() || headers.get(COOKIE).is_some() {
        return Err(HttpError::from("client-owned headers must not be copied"));
    }
    if headers.len() != 2 {
        return Err(HttpError::from(format!("unexpected header count {}", headers.len())));
    }
    Ok(())
}

#[test]
fn build_request_adds_recorded_cookies_unless_ignored() -> Result<(), HttpError> {
    let mut desc = descriptor("GET", "http://localhost/");
    desc.cookies = vec![cookie("a", "1"), cookie("b", "2")];

    let request = build_request(&desc, false)?;
    let header = request
        .headers()
        .get(COOKIE)
        .and_then(|v| v.to_str().ok())
        .map(str::to_owned);
    if header.as_deref() != Some("a=1; b=2") {
        return Err(HttpError::from(format!("unexpected cookie header {:?}", header)));
    }

    let ignored = build_request(&desc, true)?;
    if ignored.headers().get(COOKIE).is_some() {
        return Err(HttpError::from("cookies should be ignored"));
    }
    Ok(())
}

#[test]
fn build_request_encodes_form_params() -> Result<(), HttpError> {
    let mut desc = descriptor("POST", "http://localhost/login");
    desc.post_data = Some(PostData {
        mime_type: "application/x-www-form-urlencoded".to_owned(),
        text: "ignored".to_owned(),
        params: vec![
            PostParam {
                name: "user".to_owned(),
                value: "alice smith".to_owned(),
            },
            PostParam {
                name: "pw".to_owned(),
                value: "a&b".to_owned(),
            },
        ],
    });

    let request = build_request(&desc, false)?;
    let body = request
        .body()
        .and_then(reqwest::Body::as_bytes)
        .map(|bytes| String::from_utf8_lossy(bytes).into_owned());
    if body.as_deref() != Some("user=alice+smith&pw=a%26b") {
        return Err(HttpError::from(format!("unexpected body {:?}", body)));
    }
    Ok(())
}

#[test]
fn build_request_uses_text_body() -> Result<(), HttpError> {
    let mut desc = descriptor("PUT", "http://localhost/doc");
    desc.post_data = Some(PostData {
        mime_type: "application/json".to_owned(),
        text: "{\"k\":1}".to_owned(),
        params: vec![],
    });
    let request = build_request(&desc, false)?;
    let body = request.body().and_then(reqwest::Body::as_bytes);
    if body != Some(b"{\"k\":1}".as_slice()) {
        return Err(HttpError::from("unexpected text body"));
    }
    Ok(())
}

#[test]
fn build_request_rejects_bad_url_and_method() -> Result<(), HttpError> {
    match build_request(&descriptor("GET", "not a url"), false) {
        Err(HttpError::InvalidUrl { .. }) => {}
        Err(err) => return Err(HttpError::from(format!("unexpected error: {}", err))),
        Ok(_) => return Err(HttpError::from("expected invalid url")),
    }
    match build_request(&descriptor("BAD METHOD", "http://localhost/"), false) {
        Err(HttpError::InvalidMethod { .. }) => Ok(()),
        Err(err) => Err(HttpError::from(format!("unexpected error: {}", err))),
        Ok(_) => Err(HttpError::from("expected invalid method")),
    }
}

#[test]
fn validate_entries_reports_first_bad_index() -> Result<(), HttpError> {
    let entries = vec![
        Entry::new(descriptor("GET", "http://localhost/ok")),
        Entry::new(descriptor("POST", "http://localhost/ok")),
        Entry::new(descriptor("GET", "/relative")),
        Entry::new(descriptor("BAD METHOD", "http://localhost/")),
    ];
    match validate_entries(&entries, false) {
        Err(HarError::InvalidEntry { index: 2, .. }) => {}
        Err(err) => return Err(HttpError::from(format!("unexpected error: {}", err))),
        Ok(_) => return Err(HttpError::from("expected invalid entry")),
    }
    let valid = entries
        .get(..2)
        .ok_or(HttpError::from("missing valid entries"))?;
    if validate_entries(valid, false).ok() != Some(2) {
        return Err(HttpError::from("expected two valid entries"));
    }
    Ok(())
}

#[test]
fn seed_cookies_populates_session_jar() -> Result<(), HttpError> {
    let session = WorkerSession::new()?;
    let mut desc = descriptor("GET", "http://localhost:9000/app/");
    desc.cookies = vec![cookie("sid", "42"), cookie("theme", "dark")];
    let mut request = build_request(&desc, false)?;

    let seeded = session.seed_cookies(&mut request);
    if seeded != 2 {
        return Err(HttpError::from(format!("expected 2 seeded cookies, got {}", seeded)));
    }
    if request.headers().get(COOKIE).is_some() {
        return Err(HttpError::from("seeded cookies must leave the request header"));
    }

    let url = Url::parse("http://localhost:9000/app/next")
        .map_err(|err| HttpError::from(format!("url parse failed: {}", err)))?;
    let header = session.cookie_header(&url).unwrap_or_default();
    if !header.contains("sid=42") || !header.contains("theme=dark") {
        return Err(HttpError::from(format!("unexpected jar contents {}", header)));
    }
    Ok(())
}

#[test]
fn sessions_do_not_share_cookies() -> Result<(), HttpError> {
    let first = WorkerSession::new()?;
    let second = WorkerSession::new()?;
    let mut desc = descriptor("GET", "http://localhost:9000/");
    desc.cookies = vec![cookie("sid", "1")];
    let mut request = build_request(&desc, false)?;
    first.seed_cookies(&mut request);

    if second.cookie_header(request.url()).is_some() {
        return Err(HttpError::from("cookie leaked across sessions"));
    }
    if first.cookie_header(request.url()).is_none() {
        return Err(HttpError::from("expected cookie in seeded session"));
    }
    Ok(())
}

/// What the target server saw for one request: path and `Cookie` header.
type Seen = Arc<Mutex<Vec<(String, Option<String>)>>>;

/// Serves `/login` with `Set-Cookie: srv=1`, `/start` with a redirect to
/// `/a%2Fb/c`, `/stall` without ever answering, and `200 OK` otherwise.
async fn spawn_session_server() -> Result<(String, Seen, JoinHandle<()>), HttpError> {
    let listener = TcpListener::bind("127.0.0.1:0")
        .await
        .map_err(|err| HttpError::from(format!("bind test server failed: {}", err)))?;
    let addr = listener
        .local_addr()
        .map_err(|err| HttpError::from(format!("server addr failed: {}", err)))?;
    let seen: Seen = Arc::new(Mutex::new(Vec::new()));
    let log = Arc::clone(&seen);
    let handle = tokio::spawn(async move {
        while let Ok((mut stream, _)) = listener.accept().await {
            let log = Arc::clone(&log);
            tokio::spawn(async move {
                let mut raw = Vec::new();
                let mut chunk = [0u8; 4096];
                while !raw.windows(4).any(|window| window == b"\r\n\r\n") {
                    match stream.read(&mut chunk).await {
                        Ok(0) | Err(_) => return,
                        Ok(read) => raw.extend_from_slice(chunk.get(..read).unwrap_or_default()),
                    }
                }
                let head = String::from_utf8_lossy(&raw).into_owned();
                let path = head
                    .split_whitespace()
                    .nth(1)
                    .unwrap_or_default()
                    .to_owned();
                let cookie = head
                    .lines()
                    .filter_map(|line| line.split_once(':'))
                    .find(|(name, _)| name.eq_ignore_ascii_case("cookie"))
                    .map(|(_, value)| value.trim().to_owned());
                if let Ok(mut requests) = log.lock() {
                    requests.push((path.clone(), cookie));
                }

                let response: &[u8] = match path.as_str() {
                    "/login" => b"HTTP/1.1 200 OK\r\nSet-Cookie: srv=1; Path=/\r\nContent-Length: 0\r\nConnection: close\r\n\r\n",
                    "/start" => b"HTTP/1.1 302 Found\r\nLocation: /a%2Fb/c\r\nContent-Length: 0\r\nConnection: close\r\n\r\n",
                    "/stall" => {
                        tokio::time::sleep(Duration::from_secs(30)).await;
                        return;
                    }
                    _ => b"HTTP/1.1 200 OK\r\nContent-Length: 2\r\nConnection: close\r\n\r\nOK",
                };
                drop(stream.write_all(response).await);
            });
        }
    });
    Ok((format!("http://{}", addr), seen, handle))
}

fn seen_requests(seen: &Seen) -> Result<Vec<(String, Option<String>)>, HttpError> {
    seen.lock()
        .map(|requests| requests.clone())
        .map_err(|_| HttpError::from("request log poisoned"))
}

async fn send(session: &WorkerSession, desc: &RequestDescriptor) -> Result<u16, HttpError> {
    let mut request = build_request(desc, false)?;
    session.seed_cookies(&mut request);
    session
        .dispatch(request)
        .await
        .map_err(|err| HttpError::from(format!("dispatch failed: {}", err)))
}

#[tokio::test]
async fn recorded_cookies_merge_with_server_cookies() -> Result<(), HttpError> {
    let (base, seen, server) = spawn_session_server().await?;
    let session = WorkerSession::new()?;

    send(&session, &descriptor("GET", &format!("{}/login", base))).await?;
    let mut with_recorded = descriptor("GET", &format!("{}/a", base));
    with_recorded.cookies = vec![cookie("har", "x")];
    send(&session, &with_recorded).await?;
    send(&session, &descriptor("GET", &format!("{}/b", base))).await?;
    server.abort();

    let requests = seen_requests(&seen)?;
    let cookies_for = |path: &str| {
        requests
            .iter()
            .find(|(seen_path, _)| seen_path == path)
            .and_then(|(_, cookie)| cookie.clone())
            .unwrap_or_default()
    };
    let on_a = cookies_for("/a");
    if !on_a.contains("srv=1") || !on_a.contains("har=x") {
        return Err(HttpError::from(format!("expected merged cookies on /a, got {:?}", on_a)));
    }
    if on_a.matches("har=").count() != 1 {
        return Err(HttpError::from(format!("recorded cookie sent twice: {:?}", on_a)));
    }
    let on_b = cookies_for("/b");
    if !on_b.contains("srv=1") || !on_b.contains("har=x") {
        return Err(HttpError::from(format!("session cookies lost on /b: {:?}", on_b)));
    }
    Ok(())
}

#[tokio::test]
async fn redirect_keeps_escaped_path() -> Result<(), HttpError> {
    let (base, seen, server) = spawn_session_server().await?;
    let session = WorkerSession::new()?;

    let status = send(&session, &descriptor("GET", &format!("{}/start", base))).await?;
    server.abort();
    if status != 200 {
        return Err(HttpError::from(format!("expected redirect to be followed, got {}", status)));
    }
    let paths: Vec<String> = seen_requests(&seen)?
        .into_iter()
        .map(|(path, _)| path)
        .collect();
    if paths != ["/start", "/a%2Fb/c"] {
        return Err(HttpError::from(format!("unexpected paths {:?}", paths)));
    }
    Ok(())
}

#[tokio::test]
async fn stalled_server_hits_response_timeout() -> Result<(), HttpError> {
    let (base, _seen, server) = spawn_session_server().await?;
    let session = WorkerSession::with_timeouts(SessionTimeouts {
        response_header: Duration::from_millis(200),
        ..SessionTimeouts::default()
    })?;

    let started = tokio::time::Instant::now();
    let result = send(&session, &descriptor("GET", &format!("{}/stall", base))).await;
    server.abort();
    if result.is_ok() {
        return Err(HttpError::from("stalled request should fail"));
    }
    if started.elapsed() > Duration::from_secs(5) {
        return Err(HttpError::from(format!(
            "stall was not cut short: {:?}",
            started.elapsed()
        )));
    }
    Ok(())
}

#[test]
fn default_timeouts_bound_each_phase() {
    let timeouts = SessionTimeouts::default();
    assert_eq!(timeouts.dial, DIAL_TIMEOUT);
    assert_eq!(timeouts.response_header, RESPONSE_HEADER_TIMEOUT);
    assert_eq!(timeouts.total, Duration::from_secs(50));
}
