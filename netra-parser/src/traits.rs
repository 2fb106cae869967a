use netra_types::Asset;

use crate::error::ParseError;

/// Turns raw parser output into asset records.
///
/// Implementations tolerate partial input: entries that cannot be read are
/// skipped, and only a document that cannot be interpreted at all is an error.
pub trait AssetDecoder: Send + Sync {
    fn decode(&self, input: &str) -> Result<Vec<Asset>, ParseError>;
}
