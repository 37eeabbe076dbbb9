//! Page view enrichment.

use chrono::{Local, Timelike};
use serde_json::{Map, Value};
use sha2::{Digest, Sha256};

const SOCIAL: [&str; 5] = [
    "facebook.com",
    "instagram.com",
    "twitter.com",
    "linkedin.com",
    "pinterest.com",
];

const SEARCH: [&str; 4] = ["google.com", "bing.com", "yahoo.com", "duckduckgo.com"];

/// Adds `referrer_type`, `device_fingerprint` and `time_bucket` to a page
/// view record.
pub fn enhance(mut data: Map<String, Value>) -> Map<String, Value> {
    enhance_at(&mut data, Local::now().hour());
    data
}

fn enhance_at(data: &mut Map<String, Value>, hour: u32) {
    if let Some(referrer) = data.get("referrer_url").and_then(Value::as_str) {
        let kind = categorize_referrer(referrer);
        data.insert("referrer_type".into(), Value::from(kind));
    }

    let fingerprint = device_fingerprint(data);
    data.insert("device_fingerprint".into(), Value::from(fingerprint));
    data.insert("time_bucket".into(), Value::from(time_bucket(hour)));
}

pub fn categorize_referrer(url: &str) -> &'static str {
    if url.is_empty() {
        return "direct";
    }

    let host = host_of(url);
    if SOCIAL.iter().any(|site| host.contains(site)) {
        "social"
    } else if SEARCH.iter().any(|engine| host.contains(engine)) {
        "search"
    } else {
        "referral"
    }
}

fn host_of(url: &str) -> String {
    let rest = url.split_once("://").map_or(url, |(_, rest)| rest);
    let authority = rest.split(['/', '?', '#']).next().unwrap_or_default();
    let host = authority.rsplit_once('@').map_or(authority, |(_, host)| host);
    host.split(':').next().unwrap_or_default().to_ascii_lowercase()
}

/// Short hash of user agent, screen resolution and platform.
pub fn device_fingerprint(data: &Map<String, Value>) -> String {
    let component = |key: &str| data.get(key).and_then(Value::as_str).unwrap_or_default();
    let joined = format!(
        "{}|{}|{}",
        component("user_agent"),
        component("screen_resolution"),
        component("platform")
    );

    let digest = Sha256::digest(joined.as_bytes());
    digest.iter().take(8).map(|b| format!("{b:02x}")).collect()
}

pub fn time_bucket(hour: u32) -> &'static str {
    match hour {
        6..=11 => "morning",
        12..=17 => "afternoon",
        18..=21 => "evening",
        _ => "night",
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn referrers_are_categorized() {
        assert_eq!(categorize_referrer(""), "direct");
        assert_eq!(categorize_referrer("https://www.Google.com/search?q=x"), "search");
        assert_eq!(categorize_referrer("https://l.instagram.com/"), "social");
        assert_eq!(categorize_referrer("http://blog.example.org:8080/post"), "referral");
    }

    #[test]
    fn buckets_cover_the_day() {
        assert_eq!(time_bucket(5), "night");
        assert_eq!(time_bucket(6), "morning");
        assert_eq!(time_bucket(12), "afternoon");
        assert_eq!(time_bucket(21), "evening");
        assert_eq!(time_bucket(22), "night");
    }

    #[test]
    fn enhance_adds_fields() {
        let mut data = json!({
            "referrer_url": "https://duckduckgo.com/",
            "user_agent": "Mozilla/5.0",
            "platform": "Linux"
        })
        .as_object()
        .cloned()
        .expect("object");

        enhance_at(&mut data, 9);
        assert_eq!(data["referrer_type"], "search");
        assert_eq!(data["time_bucket"], "morning");

        let fingerprint = data["device_fingerprint"].as_str().expect("fingerprint");
        assert_eq!(fingerprint.len(), 16);
        assert_eq!(fingerprint, device_fingerprint(&data));
    }

    #[test]
    fn missing_referrer_is_left_alone() {
        let out = enhance(Map::new());
        assert!(!out.contains_key("referrer_type"));
        assert!(out.contains_key("device_fingerprint"));
    }
}
