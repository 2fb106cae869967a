#[derive(Debug, thiserror::Error)]
pub enum DbError {
    #[error("database error: {0}")]
    Sqlite(#[from] rusqlite::Error),
    #[error("invalid dataset: {0}")]
    Invalid(String),
    #[error("{0}")]
    Other(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn invalid_display() {
        let err = DbError::Invalid("company name is required".into());
        assert_eq!(err.to_string(), "invalid dataset: company name is required");
    }

    #[test]
    fn sqlite_from_conversion() {
        let err = DbError::from(rusqlite::Error::QueryReturnedNoRows);
        assert!(matches!(err, DbError::Sqlite(_)));
        assert!(err.to_string().starts_with("database error:"));
    }
}
