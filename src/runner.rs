use log::{debug, info, warn};
use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::time::{Duration, Instant};
use tokio::process::Command;
use tokio::time::timeout;
use uuid::Uuid;

use crate::error::{PipelineError, Result};

/// Temporary files owned by a single run. Both paths carry the run id so
/// concurrent runs never collide, and both are removed when the value is
/// dropped, whichever way the run ends.
#[derive(Debug)]
pub struct RunArtifacts {
    run_id: Uuid,
    script_path: PathBuf,
    summary_path: PathBuf,
}

impl RunArtifacts {
    pub fn new() -> Self {
        Self::in_dir(std::env::temp_dir())
    }

    pub fn in_dir(dir: impl AsRef<Path>) -> Self {
        let run_id = Uuid::new_v4();
        let dir = dir.as_ref();
        Self {
            run_id,
            script_path: dir.join(format!("k6-reporter-{}.js", run_id)),
            summary_path: dir.join(format!("k6-reporter-{}.json", run_id)),
        }
    }

    pub fn run_id(&self) -> Uuid {
        self.run_id
    }

    pub fn script_path(&self) -> &Path {
        &self.script_path
    }

    pub fn summary_path(&self) -> &Path {
        &self.summary_path
    }
}

impl Default for RunArtifacts {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for RunArtifacts {
    fn drop(&mut self) {
        for path in [&self.script_path, &self.summary_path] {
            match std::fs::remove_file(path) {
                Ok(()) => debug!("🧹 Removed {}", path.display()),
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
                Err(e) => warn!("⚠️ Could not remove {}: {}", path.display(), e),
            }
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EngineOutcome {
    pub exit_code: Option<i32>,
    pub elapsed: Duration,
}

impl EngineOutcome {
    pub fn success(&self) -> bool {
        self.exit_code == Some(0)
    }
}

pub struct EngineRunner {
    binary: String,
    deadline: Option<Duration>,
}

impl EngineRunner {
    pub fn new(binary: impl Into<String>, deadline: Option<Duration>) -> Self {
        Self {
            binary: binary.into(),
            deadline,
        }
    }

    /// Writes `script` into the run's script file and runs
    /// `<binary> run <script> --summary-export <summary>`, streaming the
    /// engine's output to this process's terminal.
    ///
    /// A non-zero exit is reported but not an error: failed checks make the
    /// engine exit non-zero while still writing a usable summary.
    pub async fn run(&self, artifacts: &RunArtifacts, script: &str) -> Result<EngineOutcome> {
        tokio::fs::write(artifacts.script_path(), script)
            .await
            .map_err(|e| PipelineError::io(artifacts.script_path(), e))?;

        let mut cmd = Command::new(&self.binary);
        cmd.kill_on_drop(true);
        cmd.stdin(Stdio::null());
        cmd.stdout(Stdio::inherit());
        cmd.stderr(Stdio::inherit());
        cmd.arg("run")
            .arg(artifacts.script_path())
            .arg("--summary-export")
            .arg(artifacts.summary_path());

        info!(
            "🚀 Launching {} for run {}",
            self.binary,
            artifacts.run_id()
        );
        let start = Instant::now();
        let mut child = cmd.spawn().map_err(|source| PipelineError::Spawn {
            binary: self.binary.clone(),
            source,
        })?;

        let status = match self.deadline {
            Some(limit) => match timeout(limit, child.wait()).await {
                Ok(status) => status,
                Err(_) => {
                    warn!("⏱️ Engine exceeded {:?}; terminating", limit);
                    if let Err(e) = child.kill().await {
                        warn!("⚠️ Failed to kill engine: {}", e);
                    }
                    return Err(PipelineError::EngineTimeout(limit));
                }
            },
            None => child.wait().await,
        }
        .map_err(|e| PipelineError::io(artifacts.script_path(), e))?;

        let outcome = EngineOutcome {
            exit_code: status.code(),
            elapsed: start.elapsed(),
        };

        if outcome.success() {
            info!(
                "✅ Engine finished in {:.2}s",
                outcome.elapsed.as_secs_f64()
            );
        } else {
            warn!(
                "⚠️ Engine exited with {:?}; continuing with whatever summary it wrote",
                outcome.exit_code
            );
        }

        Ok(outcome)
    }
}
