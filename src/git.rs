use std::io::{self, Read};
#[cfg(unix)]
use std::io::ErrorKind;
#[cfg(unix)]
use std::os::unix::process::CommandExt;
use std::path::{Path, PathBuf};
use std::process::{Child, Command as ProcessCommand, Stdio};
use std::thread;
use std::time::{Duration, Instant};

#[cfg(unix)]
use nix::sys::signal::{kill, Signal};
#[cfg(unix)]
use nix::unistd::{setpgid, Pid};

/// Wall-clock budget for a single git invocation.
pub const COMMAND_TIMEOUT: Duration = Duration::from_secs(5 * 60);
/// Total attempts per invocation, first try included.
pub const RETRY_ATTEMPTS: u32 = 5;
/// Fixed pause between attempts. Deliberately not exponential: the expected
/// failure is short-lived lock or network contention on a shared remote.
pub const RETRY_DELAY: Duration = Duration::from_secs(1);

const WAIT_POLL: Duration = Duration::from_millis(40);

#[derive(Debug)]
pub enum GitError {
    Launch {
        command: String,
        error: io::Error,
    },
    Timeout {
        command: String,
        timeout: Duration,
    },
    Failed {
        command: String,
        code: Option<i32>,
        detail: String,
    },
}

impl std::fmt::Display for GitError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            GitError::Launch { command, error } => {
                write!(f, "failed to launch `{command}`: {error}")
            }
            GitError::Timeout { command, timeout } => {
                write!(f, "`{command}` timed out after {}s", timeout.as_secs())
            }
            GitError::Failed {
                command,
                code,
                detail,
            } => {
                match code {
                    Some(code) => write!(f, "`{command}` exited with status {code}")?,
                    None => write!(f, "`{command}` was terminated by a signal")?,
                }
                if !detail.is_empty() {
                    write!(f, ": {detail}")?;
                }
                Ok(())
            }
        }
    }
}

impl std::error::Error for GitError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            GitError::Launch { error, .. } => Some(error),
            _ => None,
        }
    }
}

/// One-shot executor: exactly one subprocess per call, no retries here.
#[derive(Debug, Clone)]
pub struct GitRunner {
    program: PathBuf,
    timeout: Duration,
}

impl Default for GitRunner {
    fn default() -> Self {
        Self::new("git", COMMAND_TIMEOUT)
    }
}

impl GitRunner {
    pub fn new(program: impl Into<PathBuf>, timeout: Duration) -> Self {
        Self {
            program: program.into(),
            timeout,
        }
    }

    /// Runs the program in `dir` with the caller's environment plus
    /// `PWD=<dir>`, so the subprocess-observed and OS-reported working
    /// directories agree. Returns combined stdout+stderr, trimmed.
    pub fn run(&self, dir: &Path, args: &[&str]) -> Result<String, GitError> {
        let command_line = render_command_line(&self.program, args);
        let mut command = ProcessCommand::new(&self.program);
        command
            .args(args)
            .current_dir(dir)
            .env("PWD", dir)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped());
        #[cfg(unix)]
        unsafe {
            command.pre_exec(|| {
                setpgid(Pid::from_raw(0), Pid::from_raw(0))
                    .map_err(|error| io::Error::new(ErrorKind::Other, error.to_string()))
            });
        }

        let mut child = command.spawn().map_err(|error| GitError::Launch {
            command: command_line.clone(),
            error,
        })?;
        let stdout = child.stdout.take().map(capture_pipe);
        let stderr = child.stderr.take().map(capture_pipe);

        let deadline = Instant::now() + self.timeout;
        let status = loop {
            match child.try_wait() {
                Ok(Some(status)) => break status,
                Ok(None) => {
                    if Instant::now() >= deadline {
                        terminate(&mut child);
                        let _ = child.wait();
                        return Err(GitError::Timeout {
                            command: command_line,
                            timeout: self.timeout,
                        });
                    }
                    thread::sleep(WAIT_POLL);
                }
                Err(error) => {
                    terminate(&mut child);
                    let _ = child.wait();
                    return Err(GitError::Launch {
                        command: command_line,
                        error,
                    });
                }
            }
        };

        let out_text = join_capture(stdout);
        let err_text = join_capture(stderr);
        if !status.success() {
            return Err(GitError::Failed {
                command: command_line,
                code: status.code(),
                detail: failure_detail(&out_text, &err_text),
            });
        }

        let mut combined = out_text;
        if !err_text.trim().is_empty() {
            if !combined.is_empty() {
                combined.push('\n');
            }
            combined.push_str(&err_text);
        }
        Ok(combined.trim().to_owned())
    }
}

fn render_command_line(program: &Path, args: &[&str]) -> String {
    let mut rendered = program.display().to_string();
    for arg in args {
        rendered.push(' ');
        rendered.push_str(arg);
    }
    rendered
}

fn capture_pipe<R: Read + Send + 'static>(mut pipe: R) -> thread::JoinHandle<Vec<u8>> {
    thread::spawn(move || {
        let mut buffer = Vec::new();
        let _ = pipe.read_to_end(&mut buffer);
        buffer
    })
}

fn join_capture(handle: Option<thread::JoinHandle<Vec<u8>>>) -> String {
    let bytes = handle
        .map(|handle| handle.join().unwrap_or_default())
        .unwrap_or_default();
    String::from_utf8_lossy(&bytes).into_owned()
}

/// Picks the line most likely to explain a non-zero exit: git writes its
/// diagnostics to stderr, so stderr wins over stdout.
fn failure_detail(stdout: &str, stderr: &str) -> String {
    stderr
        .lines()
        .chain(stdout.lines())
        .map(str::trim)
        .find(|line| !line.is_empty())
        .unwrap_or("")
        .to_owned()
}

fn terminate(child: &mut Child) {
    #[cfg(unix)]
    {
        // The child leads its own process group; signal the whole group so
        // anything git spawned underneath goes down with it.
        let pid = child.id() as i32;
        if pid > 0 {
            let _ = kill(Pid::from_raw(-pid), Signal::SIGKILL);
        }
    }
    let _ = child.kill();
}

/// Retry wrapper around [`GitRunner`]: up to [`RETRY_ATTEMPTS`] tries with a
/// fixed [`RETRY_DELAY`] between them. The notice callback fires after every
/// failed attempt except the last; exhaustion returns the final error
/// unchanged.
#[derive(Debug, Clone)]
pub struct Invoker {
    runner: GitRunner,
    attempts: u32,
    delay: Duration,
}

impl Default for Invoker {
    fn default() -> Self {
        Self::new(GitRunner::default())
    }
}

impl Invoker {
    pub fn new(runner: GitRunner) -> Self {
        Self {
            runner,
            attempts: RETRY_ATTEMPTS,
            delay: RETRY_DELAY,
        }
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    pub fn with_attempts(mut self, attempts: u32) -> Self {
        self.attempts = attempts.max(1);
        self
    }

    pub fn run<F>(&self, dir: &Path, args: &[&str], mut on_retry: F) -> Result<String, GitError>
    where
        F: FnMut(u32, &GitError),
    {
        let mut attempt = 1;
        loop {
            match self.runner.run(dir, args) {
                Ok(output) => return Ok(output),
                Err(error) => {
                    if attempt >= self.attempts {
                        return Err(error);
                    }
                    on_retry(attempt, &error);
                    attempt += 1;
                    thread::sleep(self.delay);
                }
            }
        }
    }
}

#[cfg(test)]
#[path = "tests/git_tests.rs"]
mod tests;
