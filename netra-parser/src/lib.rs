//! Running the external nmap parser and turning its output into assets.

mod decode;
mod error;
mod files;
mod json;
mod runner;
mod text;
mod traits;

pub use decode::{OutputFormat, ParseReport, decode_output, sniff_format};
pub use error::ParseError;
pub use files::{DEFAULT_EXTENSIONS, FileSelection, partition_scan_files};
pub use json::JsonDecoder;
pub use runner::{
    DEFAULT_TIMEOUT, ParserConfig, ParserRunner, default_interpreter, default_script_path,
};
pub use text::TextDecoder;
pub use traits::AssetDecoder;
