use reqwest::header::{COOKIE, HeaderMap, HeaderName, HeaderValue};
use reqwest::{Method, Request, Url};
use tracing::debug;

use crate::error::{HarError, HttpError};
use crate::har::{Entry, RequestDescriptor};

/// Headers owned by the client or by the cookie handling below.
const SKIPPED_HEADERS: [&str; 4] = ["cookie", "content-length", "host", "connection"];

/// Converts one recorded request into an executable request.
///
/// Cookies recorded on the descriptor are sent as a single `Cookie` header
/// unless `ignore_har_cookies` is set. The recorded `Cookie` header itself is
/// never copied. The URL path is kept exactly as recorded.
///
/// # Errors
///
/// Returns an error when the URL or method cannot be parsed.
pub fn build_request(
    descriptor: &RequestDescriptor,
    ignore_har_cookies: bool,
) -> Result<Request, HttpError> {
    let url = Url::parse(&descriptor.url).map_err(|err| HttpError::InvalidUrl {
        url: descriptor.url.clone(),
        source: err,
    })?;
    let method = parse_method(&descriptor.method)?;

    let mut request = Request::new(method, url);
    *request.headers_mut() = build_headers(descriptor, ignore_har_cookies);

    let body = build_body(descriptor);
    if !body.is_empty() {
        *request.body_mut() = Some(body.into());
    }

    Ok(request)
}

/// Builds every entry once so a bad capture is reported before any load.
///
/// Returns the number of entries checked.
///
/// # Errors
///
/// Returns `HarError::InvalidEntry` for the first entry that cannot be built.
pub fn validate_entries(entries: &[Entry], ignore_har_cookies: bool) -> Result<usize, HarError> {
    for (index, entry) in entries.iter().enumerate() {
        build_request(&entry.request, ignore_har_cookies).map_err(|err| {
            HarError::InvalidEntry {
                index,
                reason: err.to_string(),
            }
        })?;
    }
    Ok(entries.len())
}

fn parse_method(raw: &str) -> Result<Method, HttpError> {
    let normalized = raw.trim().to_ascii_uppercase();
    if normalized.is_empty() {
        return Err(HttpError::InvalidMethod {
            method: raw.to_owned(),
        });
    }
    Method::from_bytes(normalized.as_bytes())
        .ok()
        .ok_or_else(|| HttpError::InvalidMethod {
            method: raw.to_owned(),
        })
}

fn build_headers(descriptor: &RequestDescriptor, ignore_har_cookies: bool) -> HeaderMap {
    let mut headers = HeaderMap::with_capacity(descriptor.headers.len());
    for header in &descriptor.headers {
        if header.name.starts_with(':') || is_skipped(&header.name) {
            continue;
        }
        let (Ok(name), Ok(value)) = (
            HeaderName::from_bytes(header.name.as_bytes()),
            HeaderValue::from_str(&header.value),
        ) else {
            debug!("Skipping invalid header '{}'", header.name);
            continue;
        };
        headers.append(name, value);
    }

    if !ignore_har_cookies
        && let Some(cookie) = cookie_header(descriptor)
    {
        headers.insert(COOKIE, cookie);
    }

    headers
}

fn is_skipped(name: &str) -> bool {
    SKIPPED_HEADERS
        .iter()
        .any(|skipped| name.eq_ignore_ascii_case(skipped))
}

fn cookie_header(descriptor: &RequestDescriptor) -> Option<HeaderValue> {
    let pairs: Vec<String> = descriptor
        .cookies
        .iter()
        .filter(|cookie| !cookie.name.is_empty())
        .map(|cookie| format!("{}={}", cookie.name, cookie.value))
        .collect();
    if pairs.is_empty() {
        return None;
    }
    match HeaderValue::from_str(&pairs.join("; ")) {
        Ok(value) => Some(value),
        Err(err) => {
            debug!("Skipping recorded cookies: {}", err);
            None
        }
    }
}

fn build_body(descriptor: &RequestDescriptor) -> String {
    let Some(post_data) = descriptor.post_data.as_ref() else {
        return String::new();
    };
    if post_data.params.is_empty() {
        return post_data.text.clone();
    }
    let mut form = url::form_urlencoded::Serializer::new(String::new());
    for param in &post_data.params {
        form.append_pair(&param.name, &param.value);
    }
    form.finish()
}
