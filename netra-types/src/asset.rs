use serde::{Deserialize, Serialize};

/// Vendor recorded when the parser could not resolve one.
pub const UNKNOWN_VENDOR: &str = "Unknown";

/// One discovered network host within a dataset's scan batch.
///
/// Assets are written once, together with their owning dataset, and are
/// never updated in place.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Asset {
    pub ip_address: String,
    #[serde(default)]
    pub hostname: String,
    #[serde(default = "default_vendor")]
    pub vendor: String,
    #[serde(default)]
    pub open_port_count: u32,
    /// Comma-separated service names (e.g. "http, ssh").
    #[serde(default)]
    pub open_services: String,
}

fn default_vendor() -> String {
    UNKNOWN_VENDOR.to_string()
}

impl Asset {
    pub fn new(ip_address: impl Into<String>) -> Self {
        Self {
            ip_address: ip_address.into(),
            hostname: String::new(),
            vendor: default_vendor(),
            open_port_count: 0,
            open_services: String::new(),
        }
    }

    pub fn with_hostname(mut self, hostname: impl Into<String>) -> Self {
        self.hostname = hostname.into();
        self
    }

    pub fn with_vendor(mut self, vendor: impl Into<String>) -> Self {
        self.vendor = vendor.into();
        self
    }

    pub fn with_open_ports(mut self, count: u32) -> Self {
        self.open_port_count = count;
        self
    }

    pub fn with_services(mut self, services: impl Into<String>) -> Self {
        self.open_services = services.into();
        self
    }

    /// An asset is active when it exposes at least one open port.
    pub fn is_active(&self) -> bool {
        self.open_port_count > 0
    }

    /// Individual service names from `open_services`.
    pub fn services(&self) -> impl Iterator<Item = &str> {
        service_tokens(&self.open_services)
    }
}

/// Split a services field on comma, semicolon or pipe, trimming whitespace
/// and dropping empty tokens.
pub fn service_tokens(field: &str) -> impl Iterator<Item = &str> {
    field
        .split([',', ';', '|'])
        .map(str::trim)
        .filter(|s| !s.is_empty())
}
