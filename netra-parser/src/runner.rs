use std::io::Read;
use std::path::{Path, PathBuf};
use std::process::{Child, Command, ExitStatus, Stdio};
use std::sync::OnceLock;
use std::thread::JoinHandle;
use std::time::{Duration, Instant};

use tracing::{debug, info, warn};

use crate::decode::{ParseReport, decode_output};
use crate::error::ParseError;
use crate::files::{DEFAULT_EXTENSIONS, FileSelection, partition_scan_files};

/// Default hard limit for one parser run.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(300);

const POLL_INTERVAL: Duration = Duration::from_millis(50);

/// How to invoke the external scan parser.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParserConfig {
    pub interpreter: String,
    pub script: PathBuf,
    pub timeout: Duration,
    /// Accepted scan-file extensions, without the leading dot.
    pub extensions: Vec<String>,
}

impl Default for ParserConfig {
    fn default() -> Self {
        Self {
            interpreter: default_interpreter(),
            script: default_script_path(),
            timeout: DEFAULT_TIMEOUT,
            extensions: DEFAULT_EXTENSIONS.iter().map(|e| e.to_string()).collect(),
        }
    }
}

/// Interpreters to try, in order. Windows installs often lack `python3`
/// or ship only the `py` launcher.
const INTERPRETER_CANDIDATES: &[&str] = if cfg!(windows) {
    &["python", "python3", "py"]
} else {
    &["python3", "python"]
};

/// First Python interpreter on this machine that actually runs.
///
/// Checked once per process. Falls back to the first candidate, so a missing
/// interpreter still surfaces as a spawn error naming it.
pub fn default_interpreter() -> String {
    static FOUND: OnceLock<String> = OnceLock::new();
    FOUND
        .get_or_init(|| {
            first_working_interpreter(INTERPRETER_CANDIDATES)
                .unwrap_or(INTERPRETER_CANDIDATES[0])
                .to_string()
        })
        .clone()
}

/// Run `<candidate> -c ""` for each candidate and return the first that exits cleanly.
fn first_working_interpreter<'a>(candidates: &[&'a str]) -> Option<&'a str> {
    candidates.iter().copied().find(|candidate| {
        let ok = Command::new(candidate)
            .args(["-c", ""])
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .status()
            .is_ok_and(|status| status.success());
        debug!(interpreter = %candidate, ok, "checked interpreter");
        ok
    })
}

/// `parser/nmap_parser.py` next to the running executable.
pub fn default_script_path() -> PathBuf {
    let relative = Path::new("parser").join("nmap_parser.py");
    std::env::current_exe()
        .ok()
        .and_then(|exe| exe.parent().map(|dir| dir.join(&relative)))
        .unwrap_or(relative)
}

/// Runs `<interpreter> <script> parse <file>...` and decodes what it prints.
#[derive(Debug, Clone, Default)]
pub struct ParserRunner {
    config: ParserConfig,
}

impl ParserRunner {
    pub fn new(config: ParserConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &ParserConfig {
        &self.config
    }

    /// Split candidate files by the configured extensions.
    pub fn select_files<P: AsRef<Path>>(&self, paths: &[P]) -> FileSelection {
        partition_scan_files(paths, self.config.extensions.as_slice())
    }

    /// Run the parser over `files` and decode its output.
    ///
    /// Process failures are errors. Output that cannot be decoded is not:
    /// it yields an empty report carrying a warning.
    pub fn parse_files(&self, files: &[PathBuf]) -> Result<ParseReport, ParseError> {
        let stdout = self.run(files)?;
        let report = decode_output(&stdout);
        info!(
            files = files.len(),
            assets = report.assets.len(),
            format = ?report.format,
            "scan files parsed"
        );
        Ok(report)
    }

    /// Run the parser and return its raw stdout.
    pub fn run(&self, files: &[PathBuf]) -> Result<String, ParseError> {
        if files.is_empty() {
            return Err(ParseError::NoInput);
        }

        let program = &self.config.interpreter;
        debug!(
            program = %program,
            script = %self.config.script.display(),
            files = files.len(),
            "starting parser"
        );

        let mut child = Command::new(program)
            .arg(&self.config.script)
            .arg("parse")
            .args(files)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|source| ParseError::Spawn {
                program: program.clone(),
                source,
            })?;

        let output = wait_with_timeout(&mut child, self.config.timeout)?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
            return Err(ParseError::Exit {
                code: output.status.code(),
                stderr,
            });
        }
        if !output.stderr.is_empty() {
            debug!(
                stderr = %String::from_utf8_lossy(&output.stderr).trim(),
                "parser wrote to stderr"
            );
        }
        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }
}

struct Output {
    status: ExitStatus,
    stdout: Vec<u8>,
    stderr: Vec<u8>,
}

/// Drain a pipe on its own thread so a chatty child cannot block on a full buffer.
fn drain<R: Read + Send + 'static>(pipe: Option<R>) -> JoinHandle<Vec<u8>> {
    std::thread::spawn(move || {
        let mut buf = Vec::new();
        if let Some(mut pipe) = pipe {
            let _ = pipe.read_to_end(&mut buf);
        }
        buf
    })
}

/// Wait for the child, killing it once `timeout` has elapsed.
fn wait_with_timeout(child: &mut Child, timeout: Duration) -> Result<Output, ParseError> {
    let stdout = drain(child.stdout.take());
    let stderr = drain(child.stderr.take());
    let start = Instant::now();

    let status = loop {
        match child.try_wait()? {
            Some(status) => break status,
            None if start.elapsed() > timeout => {
                warn!(timeout_secs = timeout.as_secs(), "parser timed out, killing it");
                let _ = child.kill();
                let _ = child.wait();
                return Err(ParseError::Timeout(timeout));
            }
            None => std::thread::sleep(POLL_INTERVAL),
        }
    };

    Ok(Output {
        status,
        stdout: stdout.join().unwrap_or_default(),
        stderr: stderr.join().unwrap_or_default(),
    })
}
