pub mod asset;
pub mod dataset;
pub mod time;

pub use asset::{Asset, UNKNOWN_VENDOR, service_tokens};
pub use dataset::{Dataset, DatasetId, RISK_NOT_COMPUTED};
pub use time::{
    DATE_FORMAT, TIMESTAMP_FORMAT, format_date, format_timestamp, now_timestamp, parse_date,
    parse_timestamp,
};
