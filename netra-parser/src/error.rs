use std::time::Duration;

#[derive(Debug, thiserror::Error)]
pub enum ParseError {
    #[error("failed to start parser {program}: {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },
    #[error("parser timed out after {}s", .0.as_secs())]
    Timeout(Duration),
    #[error("parser exited with {}: {stderr}", exit_code_label(.code))]
    Exit { code: Option<i32>, stderr: String },
    #[error("invalid parser JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("malformed parser output: {0}")]
    Malformed(String),
    #[error("no scan files to parse")]
    NoInput,
    #[error("invalid text pattern: {0}")]
    Pattern(#[from] regex::Error),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

fn exit_code_label(code: &Option<i32>) -> String {
    match *code {
        Some(code) => format!("status {code}"),
        None => "a signal".to_string(),
    }
}
