use std::path::{Path, PathBuf};

/// Scan-file extensions accepted when none are configured.
pub const DEFAULT_EXTENSIONS: &[&str] = &["zip", "txt", "nmap"];

/// Candidate input files split by whether the parser accepts their type.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FileSelection {
    pub accepted: Vec<PathBuf>,
    pub ignored: Vec<PathBuf>,
}

impl FileSelection {
    pub fn is_empty(&self) -> bool {
        self.accepted.is_empty()
    }

    /// One-line summary suitable for a status bar.
    pub fn status_line(&self) -> String {
        match (self.accepted.len(), self.ignored.len()) {
            (0, 0) => "No files selected".to_string(),
            (0, _) => "Invalid file types detected".to_string(),
            (valid, 0) => format!("{valid} files ready"),
            (valid, ignored) => format!("{valid} valid files, {ignored} ignored"),
        }
    }
}

/// Split `paths` by extension, compared case-insensitively. Extensions may be
/// given with or without the leading dot. Input order is preserved.
pub fn partition_scan_files<P, S>(paths: &[P], extensions: &[S]) -> FileSelection
where
    P: AsRef<Path>,
    S: AsRef<str>,
{
    let mut selection = FileSelection::default();
    for path in paths {
        let path = path.as_ref();
        if has_extension(path, extensions) {
            selection.accepted.push(path.to_path_buf());
        } else {
            selection.ignored.push(path.to_path_buf());
        }
    }
    selection
}

fn has_extension<S: AsRef<str>>(path: &Path, extensions: &[S]) -> bool {
    let Some(ext) = path.extension().and_then(|e| e.to_str()) else {
        return false;
    };
    extensions
        .iter()
        .any(|want| want.as_ref().trim_start_matches('.').eq_ignore_ascii_case(ext))
}
