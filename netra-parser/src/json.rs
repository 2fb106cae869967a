//! Decoder for the parser's JSON export.
//!
//! The document may be preceded by progress lines and followed by trailing
//! chatter; only the first JSON value starting on a line beginning with `{`
//! is read. Field types are loose: counts may arrive as strings, services as
//! a comma list or an array, and the count may be missing entirely when a
//! `ports` array is present.

use netra_types::{Asset, UNKNOWN_VENDOR};
use serde_json::Value;
use tracing::{debug, warn};

use crate::error::ParseError;
use crate::traits::AssetDecoder;

#[derive(Debug, Default, Clone, Copy)]
pub struct JsonDecoder;

impl JsonDecoder {
    pub fn new() -> Self {
        Self
    }
}

impl AssetDecoder for JsonDecoder {
    fn decode(&self, input: &str) -> Result<Vec<Asset>, ParseError> {
        let start = document_start(input)
            .ok_or_else(|| ParseError::Malformed("no JSON object in output".into()))?;

        let mut stream = serde_json::Deserializer::from_str(&input[start..]).into_iter::<Value>();
        let document = match stream.next() {
            Some(value) => value?,
            None => return Err(ParseError::Malformed("empty JSON document".into())),
        };

        let entries = document
            .get("assets")
            .and_then(Value::as_array)
            .ok_or_else(|| ParseError::Malformed("document has no \"assets\" array".into()))?;

        let mut assets = Vec::with_capacity(entries.len());
        for (index, entry) in entries.iter().enumerate() {
            match asset_from_value(entry) {
                Some(asset) => assets.push(asset),
                None => warn!(index, "skipping asset entry without an IP address"),
            }
        }
        debug!(decoded = assets.len(), entries = entries.len(), "decoded JSON assets");
        Ok(assets)
    }
}

/// Byte offset of the first line whose first non-blank character is `{`.
pub(crate) fn document_start(input: &str) -> Option<usize> {
    let mut offset = 0;
    for line in input.split_inclusive('\n') {
        let trimmed = line.trim_start();
        if trimmed.starts_with('{') {
            return Some(offset + (line.len() - trimmed.len()));
        }
        offset += line.len();
    }
    None
}

fn asset_from_value(entry: &Value) -> Option<Asset> {
    let ip = entry
        .get("ip_address")
        .or_else(|| entry.get("ip"))
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|ip| !ip.is_empty())?;

    let hostname = match text_field(entry, "hostname") {
        Some(h) if !h.eq_ignore_ascii_case("n/a") => h,
        _ => String::new(),
    };
    let vendor = text_field(entry, "vendor")
        .filter(|v| !v.is_empty())
        .unwrap_or_else(|| UNKNOWN_VENDOR.to_string());

    let open_ports = entry.get("ports").and_then(Value::as_array).map(|ports| {
        ports
            .iter()
            .filter(|p| {
                p.get("state")
                    .and_then(Value::as_str)
                    .is_some_and(|s| s.eq_ignore_ascii_case("open"))
            })
            .collect::<Vec<_>>()
    });

    let count = entry
        .get("open_port_count")
        .and_then(lenient_count)
        .or_else(|| open_ports.as_ref().map(|p| p.len() as u32))
        .unwrap_or(0);

    let services = match entry.get("open_services") {
        Some(Value::String(s)) => s.trim().to_string(),
        Some(Value::Array(items)) => join_strings(items.iter()),
        _ => open_ports
            .as_ref()
            .map(|ports| join_strings(ports.iter().filter_map(|p| p.get("service"))))
            .unwrap_or_default(),
    };

    Some(Asset {
        ip_address: ip.to_string(),
        hostname,
        vendor,
        open_port_count: count,
        open_services: services,
    })
}

fn text_field(entry: &Value, key: &str) -> Option<String> {
    entry
        .get(key)
        .and_then(Value::as_str)
        .map(|s| s.trim().to_string())
}

fn lenient_count(value: &Value) -> Option<u32> {
    match value {
        Value::Number(n) => n.as_u64().and_then(|n| u32::try_from(n).ok()),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

fn join_strings<'a>(items: impl Iterator<Item = &'a Value>) -> String {
    items
        .filter_map(Value::as_str)
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .collect::<Vec<_>>()
        .join(", ")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn decode(input: &str) -> Vec<Asset> {
        JsonDecoder::new().decode(input).unwrap()
    }

    #[test]
    fn decodes_plain_document() {
        let assets = decode(
            r#"{"assets": [
                {"ip_address": "10.0.0.1", "hostname": "web01", "vendor": "Dell",
                 "open_port_count": 2, "open_services": "http, ssh"}
            ]}"#,
        );
        assert_eq!(
            assets,
            vec![Asset::new("10.0.0.1")
                .with_hostname("web01")
                .with_vendor("Dell")
                .with_open_ports(2)
                .with_services("http, ssh")]
        );
    }

    #[test]
    fn skips_progress_lines_and_trailing_text() {
        let input = "Enhanced parser processing 2 files...\n\
                     Processed scan1.txt: 1 assets found\n\
                     {\"assets\": [{\"ip_address\": \"10.0.0.5\"}]}\n\
                     Enhanced data exported\n";
        let assets = decode(input);
        assert_eq!(assets.len(), 1);
        assert_eq!(assets[0].ip_address, "10.0.0.5");
        assert_eq!(assets[0].vendor, "Unknown");
        assert_eq!(assets[0].open_port_count, 0);
    }

    #[test]
    fn lenient_field_types() {
        let assets = decode(
            r#"{"assets": [
                {"ip_address": "10.0.0.1", "open_port_count": "3",
                 "open_services": ["http", " ssh ", "", "ftp"], "hostname": "N/A", "vendor": ""}
            ]}"#,
        );
        let a = &assets[0];
        assert_eq!(a.open_port_count, 3);
        assert_eq!(a.open_services, "http, ssh, ftp");
        assert_eq!(a.hostname, "");
        assert_eq!(a.vendor, "Unknown");
    }

    #[test]
    fn count_derived_from_open_ports() {
        let assets = decode(
            r#"{"assets": [{"ip_address": "10.0.0.9", "ports": [
                {"port": 22, "state": "open", "service": "ssh"},
                {"port": 25, "state": "filtered", "service": "smtp"},
                {"port": 443, "state": "OPEN", "service": "ssl/https"}
            ]}]}"#,
        );
        assert_eq!(assets[0].open_port_count, 2);
        assert_eq!(assets[0].open_services, "ssh, ssl/https");
    }

    #[test]
    fn explicit_count_wins_over_ports() {
        let assets = decode(
            r#"{"assets": [{"ip_address": "10.0.0.9", "open_port_count": 7,
                "ports": [{"state": "open"}]}]}"#,
        );
        assert_eq!(assets[0].open_port_count, 7);
    }

    #[test]
    fn entries_without_ip_are_skipped() {
        let assets = decode(
            r#"{"assets": [{"hostname": "ghost"}, {"ip_address": "  "}, {"ip": "10.0.0.2"}]}"#,
        );
        assert_eq!(assets.len(), 1);
        assert_eq!(assets[0].ip_address, "10.0.0.2");
    }

    #[test]
    fn missing_assets_array_is_malformed() {
        let err = JsonDecoder::new().decode(r#"{"summary": {}}"#).unwrap_err();
        assert!(matches!(err, ParseError::Malformed(_)));
    }

    #[test]
    fn truncated_document_is_json_error() {
        let err = JsonDecoder::new()
            .decode("{\"assets\": [{\"ip_address\": \"10.0.")
            .unwrap_err();
        assert!(matches!(err, ParseError::Json(_)));
    }

    #[test]
    fn no_object_is_malformed() {
        assert!(matches!(
            JsonDecoder::new().decode("no json here"),
            Err(ParseError::Malformed(_))
        ));
    }

    #[test]
    fn document_start_skips_indentation() {
        assert_eq!(document_start("a\n  {}"), Some(4));
        assert_eq!(document_start("{}"), Some(0));
        assert_eq!(document_start("x { y"), None);
    }
}
