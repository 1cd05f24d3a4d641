use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;
use log::warn;
use serde_json::Value;

use crate::feature::FeatureCollection;

/// Query parameter carrying the encoded collection.
pub const URL_PARAM: &str = "data";

/// Share URLs longer than this deserve a user-facing warning.
pub const URL_SIZE_WARNING_CHARS: usize = 4000;

/// Encode a collection as standard base64 over its UTF-8 JSON bytes.
pub fn features_to_base64(features: &FeatureCollection) -> String {
    let json = serde_json::to_string(features)
        .expect("FeatureCollection always serializes to JSON");
    STANDARD.encode(json.as_bytes())
}

/// Decode a base64 payload back into a collection. Returns `None` for
/// invalid base64, unparseable JSON, a `type` other than
/// `"FeatureCollection"`, or a non-array `features` member — never an
/// error, by contract.
pub fn base64_to_features(base64: &str) -> Option<FeatureCollection> {
    let bytes = STANDARD.decode(base64).ok()?;
    let json = String::from_utf8(bytes).ok()?;
    let parsed: Value = serde_json::from_str(&json).ok()?;
    if parsed.get("type").and_then(Value::as_str) != Some("FeatureCollection") {
        return None;
    }
    if !parsed.get("features").is_some_and(Value::is_array) {
        return None;
    }
    serde_json::from_value(parsed).ok()
}

/// Percent-encode the three base64 characters that are unsafe in a query
/// value. Everything else in the alphabet passes through.
fn encode_query_value(base64: &str) -> String {
    let mut encoded = String::with_capacity(base64.len());
    for ch in base64.chars() {
        match ch {
            '+' => encoded.push_str("%2B"),
            '/' => encoded.push_str("%2F"),
            '=' => encoded.push_str("%3D"),
            other => encoded.push(other),
        }
    }
    encoded
}

fn decode_query_value(value: &str) -> Option<String> {
    let bytes = value.as_bytes();
    let mut decoded = Vec::with_capacity(bytes.len());
    let mut i = 0;
    while i < bytes.len() {
        if bytes[i] == b'%' {
            let hex = bytes.get(i + 1..i + 3)?;
            let hex = std::str::from_utf8(hex).ok()?;
            decoded.push(u8::from_str_radix(hex, 16).ok()?);
            i += 3;
        } else {
            decoded.push(bytes[i]);
            i += 1;
        }
    }
    String::from_utf8(decoded).ok()
}

/// Build a shareable URL: `base_url` with any existing query or fragment
/// stripped and the encoded collection attached as the single `data`
/// parameter.
pub fn encode_features_to_url(base_url: &str, features: &FeatureCollection) -> String {
    let bare = base_url
        .split_once(['?', '#'])
        .map_or(base_url, |(head, _)| head);
    let url = format!(
        "{bare}?{URL_PARAM}={}",
        encode_query_value(&features_to_base64(features))
    );
    if url.len() > URL_SIZE_WARNING_CHARS {
        warn!(
            "share URL is {} chars (threshold {}); the link may be rejected by some platforms",
            url.len(),
            URL_SIZE_WARNING_CHARS
        );
    }
    url
}

/// Restore a collection from a URL or bare query string. A missing `data`
/// parameter is normal, not an error.
pub fn decode_url_to_features(url_or_query: &str) -> Option<FeatureCollection> {
    let query = match url_or_query.split_once('?') {
        Some((_, query)) => query,
        None => url_or_query,
    };
    let query = query.split('#').next().unwrap_or(query);
    for pair in query.split('&') {
        let Some((key, value)) = pair.split_once('=') else {
            continue;
        };
        if key == URL_PARAM {
            return base64_to_features(&decode_query_value(value)?);
        }
    }
    None
}
