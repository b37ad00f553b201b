// Copyright 2025 dentsusoken
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

use crate::error::{P2SiteError, Result};
use crate::publisher::cancellation::CancellationToken;
use log::{debug, info};
use std::path::{Path, PathBuf};
use std::process::{Child, Command, ExitStatus};
use std::thread;
use std::time::{Duration, Instant};

pub const PUBLISHER_BINARY: &str = "p2site-publisher";

const POLL_INTERVAL: Duration = Duration::from_millis(100);

/// Runs the external publisher program with a deadline.
#[derive(Debug, Clone)]
pub struct PublisherLauncher {
    program: PathBuf,
    timeout: Option<Duration>,
    token: CancellationToken,
}

impl PublisherLauncher {
    /// A `timeout_secs` of 0 waits forever.
    pub fn new(program: PathBuf, timeout_secs: u64, token: CancellationToken) -> Self {
        Self {
            program,
            timeout: (timeout_secs > 0).then(|| Duration::from_secs(timeout_secs)),
            token,
        }
    }

    pub fn program(&self) -> &Path {
        &self.program
    }

    pub fn token(&self) -> &CancellationToken {
        &self.token
    }

    /// Uses `configured` when given, otherwise looks next to the running executable
    /// and then on `PATH`.
    pub fn discover(configured: Option<&Path>) -> Result<PathBuf> {
        if let Some(program) = configured {
            return Ok(program.to_path_buf());
        }

        let binary_name = format!("{PUBLISHER_BINARY}{}", std::env::consts::EXE_SUFFIX);
        let mut searched = Vec::new();

        if let Ok(current_exe) = std::env::current_exe()
            && let Some(parent) = current_exe.parent()
        {
            let candidate = parent.join(&binary_name);
            if candidate.is_file() {
                return Ok(candidate);
            }
            searched.push(candidate.display().to_string());
        }

        if let Ok(found) = which::which(&binary_name) {
            return Ok(found);
        }
        searched.push("PATH".to_string());

        Err(P2SiteError::Publishing(format!(
            "Cannot find {binary_name} (searched: {})",
            searched.join(", ")
        )))
    }

    pub fn launch(&self, args: &[String]) -> Result<()> {
        info!("Running {} {}", self.program.display(), args.join(" "));

        let mut child = Command::new(&self.program).args(args).spawn().map_err(|e| {
            P2SiteError::Publishing(format!("Failed to start {}: {e}", self.program.display()))
        })?;

        let status = self.wait(&mut child)?;
        debug!("{} exited with {status}", self.program.display());
        check_status(&self.program, status)
    }

    fn wait(&self, child: &mut Child) -> Result<ExitStatus> {
        let start = Instant::now();
        loop {
            match child.try_wait() {
                Ok(Some(status)) => return Ok(status),
                Ok(None) => {
                    if self.token.is_cancelled() {
                        terminate(child);
                        return Err(P2SiteError::Interrupted(format!(
                            "{} was stopped",
                            self.program.display()
                        )));
                    }
                    if let Some(timeout) = self.timeout
                        && start.elapsed() >= timeout
                    {
                        terminate(child);
                        return Err(P2SiteError::Publishing(format!(
                            "{} timed out after {} seconds",
                            self.program.display(),
                            timeout.as_secs()
                        )));
                    }
                    thread::sleep(POLL_INTERVAL);
                }
                Err(e) => {
                    return Err(P2SiteError::Publishing(format!(
                        "Failed to wait for {}: {e}",
                        self.program.display()
                    )));
                }
            }
        }
    }
}

fn terminate(child: &mut Child) {
    if let Err(e) = child.kill() {
        debug!("Failed to kill publisher process {}: {e}", child.id());
    }
    let _ = child.wait();
}

fn check_status(program: &Path, status: ExitStatus) -> Result<()> {
    if status.success() {
        return Ok(());
    }

    if let Some(code) = status.code() {
        return Err(P2SiteError::Publishing(format!(
            "{} failed with exit code {code}",
            program.display()
        )));
    }

    #[cfg(unix)]
    {
        use std::os::unix::process::ExitStatusExt;
        if let Some(signal) = status.signal() {
            return Err(P2SiteError::Publishing(format!(
                "{} was killed by signal {signal}",
                program.display()
            )));
        }
    }

    Err(P2SiteError::Publishing(format!(
        "{} terminated abnormally ({status})",
        program.display()
    )))
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;

    fn launcher(program: &str, timeout_secs: u64) -> PublisherLauncher {
        PublisherLauncher::new(PathBuf::from(program), timeout_secs, CancellationToken::new())
    }

    #[test]
    fn successful_run() {
        assert!(launcher("true", 0).launch(&[]).is_ok());
    }

    #[test]
    fn non_zero_exit_is_a_publishing_error() {
        let err = launcher("false", 0).launch(&[]).unwrap_err();
        assert!(matches!(err, P2SiteError::Publishing(msg) if msg.contains("exit code 1")));
    }

    #[test]
    fn deadline_kills_the_child() {
        let start = Instant::now();
        let err = launcher("sleep", 1).launch(&["5".to_string()]).unwrap_err();
        assert!(matches!(err, P2SiteError::Publishing(ref msg) if msg.contains("timed out")));
        assert!(start.elapsed() < Duration::from_secs(4));
    }

    #[test]
    fn signal_death_is_reported() {
        let err = launcher("sh", 0)
            .launch(&["-c".to_string(), "kill -9 $$".to_string()])
            .unwrap_err();
        assert!(matches!(err, P2SiteError::Publishing(msg) if msg.contains("signal 9")));
    }

    #[test]
    fn cancellation_stops_the_child() {
        let token = CancellationToken::new();
        token.cancel();
        let start = Instant::now();
        let err = PublisherLauncher::new(PathBuf::from("sleep"), 0, token)
            .launch(&["5".to_string()])
            .unwrap_err();
        assert!(matches!(err, P2SiteError::Interrupted(msg) if msg.contains("stopped")));
        assert!(start.elapsed() < Duration::from_secs(4));
    }

    #[test]
    fn missing_program_fails_to_start() {
        let err = launcher("/nonexistent/p2site-publisher", 0).launch(&[]).unwrap_err();
        assert!(matches!(err, P2SiteError::Publishing(msg) if msg.contains("Failed to start")));
    }

    #[test]
    fn configured_program_wins_discovery() {
        let configured = PathBuf::from("/opt/tools/publisher");
        assert_eq!(
            PublisherLauncher::discover(Some(&configured)).unwrap(),
            configured
        );
    }
}
