use super::engine::Recognizer;
use super::preprocessing::image_to_png_bytes;
use crate::error::RecognitionError;
use async_trait::async_trait;
use image::DynamicImage;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::time::Duration;
use tokio::io::AsyncWriteExt;
use tokio::process::Command;

const TESSERACT_BIN: &str = "tesseract";

/// Tesseract OCR engine driven through its command-line binary
pub struct TesseractEngine {
    command: PathBuf,
    lang: String,
    timeout: Duration,
}

impl TesseractEngine {
    /// Resolve the binary: configured path first, then PATH lookup.
    ///
    /// An unresolved binary is not an error here; recognition reports it
    /// every cycle until Tesseract is installed.
    pub fn new(configured: Option<&str>, lang: &str, timeout: Duration) -> Self {
        let command = Self::resolve_command(configured);
        Self {
            command,
            lang: lang.to_string(),
            timeout,
        }
    }

    fn resolve_command(configured: Option<&str>) -> PathBuf {
        if let Some(cmd) = configured {
            let path = PathBuf::from(cmd);
            if path.exists() {
                tracing::info!(path = %path.display(), "Using tesseract binary");
                return path;
            }
            tracing::warn!(path = %path.display(), "Configured tesseract_cmd does not exist");
        }

        match find_on_path(TESSERACT_BIN) {
            Some(found) => {
                tracing::info!(path = %found.display(), "Found tesseract on PATH");
                found
            }
            None => {
                tracing::warn!(
                    "Tesseract not found. Install it or set tesseract_cmd; OCR fails until then"
                );
                configured
                    .map(PathBuf::from)
                    .unwrap_or_else(|| PathBuf::from(TESSERACT_BIN))
            }
        }
    }

    pub fn command(&self) -> &Path {
        &self.command
    }

    fn spawn_error(&self, e: std::io::Error) -> RecognitionError {
        if e.kind() == std::io::ErrorKind::NotFound {
            RecognitionError::EngineMissing(self.command.display().to_string())
        } else {
            RecognitionError::Io(e)
        }
    }

    /// Build `tesseract stdin stdout -l <lang> <options...>`.
    ///
    /// Options are split with shell quoting rules.
    fn build_args(&self, options: &str) -> Result<Vec<String>, RecognitionError> {
        let extra = shlex::split(options).ok_or_else(|| {
            RecognitionError::Options(format!("unbalanced quotes in {:?}", options))
        })?;

        let mut args = vec![
            "stdin".to_string(),
            "stdout".to_string(),
            "-l".to_string(),
            self.lang.clone(),
        ];
        args.extend(extra);
        Ok(args)
    }
}

#[async_trait]
impl Recognizer for TesseractEngine {
    async fn recognize(
        &self,
        image: &DynamicImage,
        options: &str,
    ) -> Result<String, RecognitionError> {
        let args = self.build_args(options)?;
        let png = image_to_png_bytes(image)?;

        let mut child = Command::new(&self.command)
            .args(args)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| self.spawn_error(e))?;

        let run = async {
            if let Some(mut stdin) = child.stdin.take() {
                stdin.write_all(&png).await?;
                stdin.shutdown().await?;
            }
            child.wait_with_output().await
        };

        let output = tokio::time::timeout(self.timeout, run)
            .await
            .map_err(|_| RecognitionError::Timeout(self.timeout))??;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(RecognitionError::Engine(format!(
                "{} ({})",
                stderr.trim(),
                output.status
            )));
        }

        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }

    async fn probe(&self) -> Result<String, RecognitionError> {
        let mut command = Command::new(&self.command);
        command.arg("--version").kill_on_drop(true);
        let output = tokio::time::timeout(self.timeout, command.output())
            .await
            .map_err(|_| RecognitionError::Timeout(self.timeout))?
            .map_err(|e| self.spawn_error(e))?;

        // Older builds print the version banner on stderr
        let banner = if output.stdout.is_empty() {
            output.stderr
        } else {
            output.stdout
        };
        let first_line = String::from_utf8_lossy(&banner)
            .lines()
            .next()
            .unwrap_or_default()
            .trim()
            .to_string();

        if !output.status.success() && first_line.is_empty() {
            return Err(RecognitionError::Engine(format!(
                "{} --version exited with {}",
                self.command.display(),
                output.status
            )));
        }
        Ok(first_line)
    }

    fn name(&self) -> &'static str {
        "tesseract"
    }
}

/// Look a binary up on PATH
fn find_on_path(name: &str) -> Option<PathBuf> {
    let path = std::env::var_os("PATH")?;
    std::env::split_paths(&path).find_map(|dir| {
        let candidate = dir.join(name);
        if candidate.is_file() {
            return Some(candidate);
        }
        let exe = candidate.with_extension("exe");
        exe.is_file().then_some(exe)
    })
}
