use std::{process::Stdio, time::Duration};

use tokio::{
    io::{AsyncRead, AsyncReadExt},
    process::Command,
};
use tracing::{debug, info, warn};

use super::{dedup_dates, parse_scoreboard, FetchError, ScoreSource, Scoreboard};
use crate::{config::FetchConfig, dates::DateKey};

const STDERR_LIMIT: u64 = 16 * 1024;

/// Runs the external score scraper once per fetch.
///
/// Dates are appended to the configured arguments as discrete argv entries;
/// nothing passes through a shell.
#[derive(Debug, Clone)]
pub struct ScriptGateway {
    program: String,
    args: Vec<String>,
    timeout: Option<Duration>,
    max_output_bytes: usize,
}

impl ScriptGateway {
    /// Gateway for `program` with no base arguments, default limits.
    pub fn new(program: impl Into<String>) -> Self {
        let defaults = FetchConfig::default();
        Self {
            program: program.into(),
            args: Vec::new(),
            timeout: defaults.timeout(),
            max_output_bytes: defaults.max_output_bytes,
        }
    }

    /// Gateway described by the `[fetch]` config section.
    pub fn from_config(config: &FetchConfig) -> Self {
        Self {
            program: config.program.clone(),
            args: config.args.clone(),
            timeout: config.timeout(),
            max_output_bytes: config.max_output_bytes,
        }
    }

    /// Arguments placed before the dates.
    pub fn with_args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args = args.into_iter().map(Into::into).collect();
        self
    }

    /// Kill the scraper after `timeout`; `None` waits forever.
    pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }

    /// Largest accepted stdout.
    pub fn with_max_output_bytes(mut self, limit: usize) -> Self {
        self.max_output_bytes = limit;
        self
    }

    /// Executable this gateway spawns.
    pub fn program(&self) -> &str {
        &self.program
    }

    async fn run(&self, dates: &[DateKey]) -> Result<Scoreboard, FetchError> {
        let mut command = Command::new(&self.program);
        command
            .args(&self.args)
            .args(dates.iter().map(ToString::to_string))
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);

        let mut child = command.spawn().map_err(|source| FetchError::Launch {
            program: self.program.clone(),
            source,
        })?;
        let stdout = child
            .stdout
            .take()
            .ok_or_else(|| FetchError::Malformed("scraper stdout unavailable".to_string()))?;
        let stderr = child.stderr.take();
        let stderr_task = tokio::spawn(async move {
            match stderr {
                Some(stream) => read_bounded(stream, STDERR_LIMIT).await.unwrap_or_default(),
                None => Vec::new(),
            }
        });

        let output = read_bounded(stdout, self.max_output_bytes as u64 + 1).await?;
        if output.len() > self.max_output_bytes {
            warn!(limit = self.max_output_bytes, "scraper output too large, killing it");
            if let Err(err) = child.kill().await {
                debug!(?err, "failed to kill oversized scraper");
            }
            stderr_task.abort();
            return Err(FetchError::OutputTooLarge {
                limit: self.max_output_bytes,
            });
        }

        let status = child.wait().await?;
        let stderr = stderr_task.await.unwrap_or_default();
        if !status.success() {
            return Err(FetchError::Exit {
                status,
                stderr: String::from_utf8_lossy(&stderr).trim().to_string(),
            });
        }
        if !stderr.is_empty() {
            debug!(stderr = %String::from_utf8_lossy(&stderr).trim(), "scraper stderr");
        }

        parse_scoreboard(&output, dates)
    }
}

impl ScoreSource for ScriptGateway {
    async fn fetch(&self, dates: &[DateKey]) -> Result<Scoreboard, FetchError> {
        let dates = dedup_dates(dates.iter().copied());
        if dates.is_empty() {
            return Ok(Scoreboard::new());
        }

        info!(program = %self.program, dates = ?dates.iter().map(ToString::to_string).collect::<Vec<_>>(), "fetching scores");
        match self.timeout {
            Some(limit) => tokio::time::timeout(limit, self.run(&dates))
                .await
                .map_err(|_| FetchError::TimedOut(limit))?,
            None => self.run(&dates).await,
        }
    }
}

async fn read_bounded<R>(reader: R, limit: u64) -> std::io::Result<Vec<u8>>
where
    R: AsyncRead + Unpin,
{
    let mut buffer = Vec::new();
    reader.take(limit).read_to_end(&mut buffer).await?;
    Ok(buffer)
}
