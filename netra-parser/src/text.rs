use std::net::IpAddr;

use netra_types::{Asset, UNKNOWN_VENDOR};
use regex::Regex;
use tracing::debug;

use crate::error::ParseError;
use crate::traits::AssetDecoder;

/// Decoder for the parser's human-readable breakdown.
///
/// Each asset is a block headed by its IPv4 or IPv6 address, optionally numbered
/// (`[  3] 10.0.0.7`), followed by indented `Key: value` lines. Services are
/// either inline (`Services: None`, `Services: http, ssh`) or listed as
/// `- name` bullets below a bare `Services:` line. Everything outside an
/// asset block is ignored.
pub struct TextDecoder {
    header: Regex,
    field: Regex,
    bullet: Regex,
}

impl TextDecoder {
    pub fn new() -> Result<Self, ParseError> {
        Ok(Self {
            header: Regex::new(r"^\s*(?:\[\s*\d+\]\s*)?([0-9A-Fa-f:.]*[.:][0-9A-Fa-f:.]*)\s*$")?,
            field: Regex::new(r"^\s*([A-Za-z][A-Za-z ]*?)\s*:\s*(.*?)\s*$")?,
            bullet: Regex::new(r"^\s*-\s+(\S.*?)\s*$")?,
        })
    }
}

#[derive(Debug)]
struct Block {
    asset: Asset,
    services: Vec<String>,
    in_services: bool,
}

impl Block {
    fn new(ip: &str) -> Self {
        Self {
            asset: Asset::new(ip),
            services: Vec::new(),
            in_services: false,
        }
    }

    fn finish(mut self) -> Asset {
        if !self.services.is_empty() {
            self.asset.open_services = self.services.join(", ");
        }
        self.asset
    }
}

impl AssetDecoder for TextDecoder {
    fn decode(&self, input: &str) -> Result<Vec<Asset>, ParseError> {
        let mut assets = Vec::new();
        let mut current: Option<Block> = None;

        for line in input.lines() {
            if let Some(caps) = self.header.captures(line) {
                let ip = &caps[1];
                if ip.parse::<IpAddr>().is_ok() {
                    if let Some(block) = current.take() {
                        assets.push(block.finish());
                    }
                    current = Some(Block::new(ip));
                    continue;
                }
                debug!(header = %ip, "skipping block with unparseable address");
            }

            let Some(block) = current.as_mut() else {
                continue;
            };

            if block.in_services {
                if let Some(caps) = self.bullet.captures(line) {
                    block.services.push(caps[1].to_string());
                    continue;
                }
                if line.trim().is_empty() {
                    continue;
                }
                block.in_services = false;
            }

            let Some(caps) = self.field.captures(line) else {
                continue;
            };
            let value = &caps[2];
            match caps[1].to_ascii_lowercase().as_str() {
                "hostname" => {
                    block.asset.hostname = if value.eq_ignore_ascii_case("n/a") {
                        String::new()
                    } else {
                        value.to_string()
                    };
                }
                "vendor" => {
                    block.asset.vendor = if value.is_empty() {
                        UNKNOWN_VENDOR.to_string()
                    } else {
                        value.to_string()
                    };
                }
                "open ports" => {
                    block.asset.open_port_count = value.parse().unwrap_or(0);
                }
                "services" => {
                    if value.is_empty() {
                        block.in_services = true;
                    } else if !value.eq_ignore_ascii_case("none") {
                        block.asset.open_services = value.to_string();
                    }
                }
                _ => {}
            }
        }

        if let Some(block) = current.take() {
            assets.push(block.finish());
        }
        debug!(decoded = assets.len(), "decoded text assets");
        Ok(assets)
    }
}
