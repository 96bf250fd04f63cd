use chrono::{DateTime, NaiveDate, NaiveTime};
use regex::Regex;
use std::net::Ipv4Addr;
use std::sync::OnceLock;

fn re_uri() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"^[A-Za-z][A-Za-z0-9+.\-]*:[^\s]+$").expect("uri pattern should compile")
    })
}

fn re_uuid() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"^[0-9a-fA-F]{8}-[0-9a-fA-F]{4}-[0-9a-fA-F]{4}-[0-9a-fA-F]{4}-[0-9a-fA-F]{12}$")
            .expect("uuid pattern should compile")
    })
}

/// Returns false only when `format` is known and `text` does not conform.
/// Unknown formats are annotations and always pass.
pub fn conforms(format: &str, text: &str) -> bool {
    match format {
        "date" => text.len() == 10 && NaiveDate::parse_from_str(text, "%Y-%m-%d").is_ok(),
        "date-time" => DateTime::parse_from_rfc3339(text).is_ok(),
        "time" => is_time(text),
        "email" => text.contains('@'),
        "uri" => re_uri().is_match(text),
        "uuid" => re_uuid().is_match(text),
        "ipv4" => text.parse::<Ipv4Addr>().is_ok(),
        _ => true,
    }
}

fn is_time(text: &str) -> bool {
    let clock = if let Some(stripped) = text.strip_suffix(&['Z', 'z'][..]) {
        stripped
    } else {
        match text.rfind(&['+', '-'][..]) {
            Some(index) if index >= 8 => {
                let offset = &text[index + 1..];
                if NaiveTime::parse_from_str(&format!("{offset}:00"), "%H:%M:%S").is_err() {
                    return false;
                }
                &text[..index]
            }
            _ => text,
        }
    };
    NaiveTime::parse_from_str(clock, "%H:%M:%S%.f").is_ok()
}
