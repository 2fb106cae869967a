use netra_types::Asset;
use serde::Serialize;
use tracing::warn;

use crate::json::{JsonDecoder, document_start};
use crate::text::TextDecoder;
use crate::traits::AssetDecoder;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    Json,
    Text,
}

/// Result of decoding one parser run.
#[derive(Debug, Clone, Serialize)]
pub struct ParseReport {
    pub format: OutputFormat,
    pub assets: Vec<Asset>,
    /// Problems that caused output to be dropped. Never fatal.
    pub warnings: Vec<String>,
}

impl ParseReport {
    pub fn is_empty(&self) -> bool {
        self.assets.is_empty()
    }
}

/// Pick a decoder by looking at the output.
pub fn sniff_format(output: &str) -> OutputFormat {
    if document_start(output).is_some() && output.contains("\"assets\"") {
        OutputFormat::Json
    } else {
        OutputFormat::Text
    }
}

/// Decode parser stdout with the sniffed decoder.
///
/// A decode failure is reported as a warning with no assets rather than an
/// error: the parser ran, it just produced nothing usable.
pub fn decode_output(output: &str) -> ParseReport {
    let format = sniff_format(output);
    let decoded = match format {
        OutputFormat::Json => JsonDecoder::new().decode(output),
        OutputFormat::Text => TextDecoder::new().and_then(|d| d.decode(output)),
    };

    match decoded {
        Ok(assets) => ParseReport {
            format,
            assets,
            warnings: Vec::new(),
        },
        Err(e) => {
            warn!(?format, error = %e, "parser output could not be decoded");
            ParseReport {
                format,
                assets: Vec::new(),
                warnings: vec![e.to_string()],
            }
        }
    }
}
