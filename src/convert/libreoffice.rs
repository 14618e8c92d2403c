//! LibreOffice (`soffice --headless`) converter.
//!
//! `soffice` is usually a launcher that starts the real office process as a
//! grandchild. The converter runs in its own process group so a timeout can
//! take down the whole tree before the working directory goes away.

use crate::convert::{ConversionError, Converter};
use std::fs::File;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::time::{Duration, Instant};
use tokio::process::{Child, Command};
use tokio::time::timeout;
use tracing::{debug, warn};

pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(120);

const INPUT_NAME: &str = "deck.pptx";
const OUTPUT_NAME: &str = "deck.pdf";
/// Longest stderr tail kept in errors
const STDERR_LIMIT: usize = 2048;

/// Converts decks to PDF with a headless LibreOffice.
///
/// Every conversion runs in its own temporary directory with its own user
/// profile, and the directory is removed however the conversion ends.
#[derive(Debug, Clone)]
pub struct LibreOfficeConverter {
    program: PathBuf,
    timeout: Duration,
}

impl LibreOfficeConverter {
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
            timeout: DEFAULT_TIMEOUT,
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    #[inline]
    pub fn program(&self) -> &Path {
        &self.program
    }

    #[inline]
    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    fn command(&self, workdir: &Path, input: &Path, stderr: File) -> Command {
        let mut command = Command::new(&self.program);
        command
            .arg("--headless")
            .arg(format!(
                "-env:UserInstallation=file://{}",
                workdir.join("profile").display()
            ))
            .arg("--convert-to")
            .arg("pdf")
            .arg(input)
            .arg("--outdir")
            .arg(workdir)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::from(stderr))
            .kill_on_drop(true);
        #[cfg(unix)]
        command.process_group(0);
        command
    }

    /// Convert `deck` on the current tokio runtime.
    pub async fn convert_async(&self, deck: &[u8]) -> Result<Vec<u8>, ConversionError> {
        let workdir = tempfile::Builder::new().prefix("deckrender-").tempdir()?;
        let input = workdir.path().join(INPUT_NAME);
        tokio::fs::write(&input, deck).await?;

        let stderr_path = workdir.path().join("stderr.log");
        let stderr = File::create(&stderr_path)?;

        let started = Instant::now();
        let mut child = self
            .command(workdir.path(), &input, stderr)
            .spawn()
            .map_err(|source| ConversionError::Launch {
                program: self.program.display().to_string(),
                source,
            })?;

        let waited = timeout(self.timeout, child.wait()).await;
        let status = match waited {
            Ok(status) => status?,
            Err(_) => {
                kill_tree(&mut child).await;
                let err = ConversionError::TimedOut(self.timeout);
                warn!(program = %self.program.display(), error = %err, "conversion aborted");
                return Err(err);
            },
        };

        if !status.success() {
            let stderr = tokio::fs::read_to_string(&stderr_path).await.unwrap_or_default();
            let err = ConversionError::Failed {
                status: status.to_string(),
                stderr: stderr_tail(&stderr),
            };
            warn!(program = %self.program.display(), error = %err, "conversion failed");
            return Err(err);
        }

        let output = workdir.path().join(OUTPUT_NAME);
        let pdf = match tokio::fs::read(&output).await {
            Ok(pdf) => pdf,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                warn!(program = %self.program.display(), "converter wrote no output");
                return Err(ConversionError::MissingOutput);
            },
            Err(e) => return Err(e.into()),
        };

        debug!(
            elapsed_ms = started.elapsed().as_millis() as u64,
            bytes = pdf.len(),
            "converted deck"
        );
        Ok(pdf)
    }
}

impl Default for LibreOfficeConverter {
    fn default() -> Self {
        Self::new("libreoffice")
    }
}

/// Blocking entry point: drives [`LibreOfficeConverter::convert_async`] on a
/// private current-thread runtime. Call it from a plain or blocking-pool
/// thread, never from inside an async task.
impl Converter for LibreOfficeConverter {
    fn convert(&self, deck: &[u8]) -> Result<Vec<u8>, ConversionError> {
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()?;
        runtime.block_on(self.convert_async(deck))
    }
}

/// Kill the converter's process group, then the child itself, and reap it.
async fn kill_tree(child: &mut Child) {
    #[cfg(unix)]
    if let Some(pid) = child.id() {
        // SAFETY: killpg only sends a signal; the group was created for this child.
        let ret = unsafe { libc::killpg(pid as libc::pid_t, libc::SIGKILL) };
        if ret != 0 {
            debug!(pid, error = %std::io::Error::last_os_error(), "killpg after timeout failed");
        }
    }
    if let Err(e) = child.kill().await {
        debug!(error = %e, "kill after timeout failed");
    }
}

fn stderr_tail(stderr: &str) -> String {
    let trimmed = stderr.trim();
    if trimmed.len() <= STDERR_LIMIT {
        return trimmed.to_string();
    }
    let mut start = trimmed.len() - STDERR_LIMIT;
    while !trimmed.is_char_boundary(start) {
        start += 1;
    }
    trimmed[start..].to_string()
}
