use super::*;

use std::fs;
use std::time::{SystemTime, UNIX_EPOCH};

fn temp_workspace(name: &str) -> PathBuf {
    let ts = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .expect("time")
        .as_nanos();
    let root = std::env::temp_dir().join(format!("multipull-git-{name}-{ts}"));
    fs::create_dir_all(&root).expect("mkdir workspace");
    root
}

fn sh(timeout: Duration) -> GitRunner {
    GitRunner::new("sh", timeout)
}

#[cfg(unix)]
#[test]
fn run_returns_trimmed_combined_output() {
    let dir = temp_workspace("trim");
    let output = sh(COMMAND_TIMEOUT)
        .run(&dir, &["-c", "printf '  hello  '; printf 'world' 1>&2"])
        .expect("run");
    assert_eq!(output, "hello  \nworld");
}

#[cfg(unix)]
#[test]
fn run_overrides_pwd_to_match_working_directory() {
    let dir = temp_workspace("pwd");
    let canonical = dir.canonicalize().expect("canonicalize");
    let output = sh(COMMAND_TIMEOUT)
        .run(&canonical, &["-c", "printf '%s' \"$PWD\""])
        .expect("run");
    assert_eq!(PathBuf::from(output), canonical);
}

#[cfg(unix)]
#[test]
fn nonzero_exit_reports_command_line_code_and_stderr_detail() {
    let dir = temp_workspace("fail");
    let err = sh(COMMAND_TIMEOUT)
        .run(&dir, &["-c", "echo ignored; echo 'fatal: boom' 1>&2; exit 3"])
        .expect_err("should fail");
    match &err {
        GitError::Failed {
            command,
            code,
            detail,
        } => {
            assert!(command.starts_with("sh -c "), "command was {command}");
            assert_eq!(*code, Some(3));
            assert_eq!(detail, "fatal: boom");
        }
        other => panic!("expected Failed, got {other:?}"),
    }
    assert!(err.to_string().contains("exited with status 3"));
    assert!(err.to_string().contains("fatal: boom"));
}

#[cfg(unix)]
#[test]
fn exceeding_the_deadline_kills_the_subprocess() {
    let dir = temp_workspace("timeout");
    let started = Instant::now();
    let err = sh(Duration::from_millis(200))
        .run(&dir, &["-c", "sleep 30"])
        .expect_err("should time out");
    assert!(matches!(err, GitError::Timeout { .. }), "got {err:?}");
    assert!(
        started.elapsed() < Duration::from_secs(5),
        "timeout was not enforced promptly"
    );
}

#[test]
fn missing_program_surfaces_a_launch_error_with_cause() {
    let dir = temp_workspace("launch");
    let err = GitRunner::new("multipull-no-such-binary", COMMAND_TIMEOUT)
        .run(&dir, &["pull"])
        .expect_err("should fail to launch");
    match &err {
        GitError::Launch { command, .. } => {
            assert_eq!(command, "multipull-no-such-binary pull");
        }
        other => panic!("expected Launch, got {other:?}"),
    }
    assert!(std::error::Error::source(&err).is_some());
}

#[cfg(unix)]
#[test]
fn invoker_retries_until_exhaustion_with_one_notice_per_non_final_failure() {
    let dir = temp_workspace("retries");
    let invoker = Invoker::new(sh(COMMAND_TIMEOUT)).with_delay(Duration::ZERO);

    let mut notices = Vec::new();
    let err = invoker
        .run(&dir, &["-c", "exit 1"], |attempt, error| {
            notices.push((attempt, error.to_string()));
        })
        .expect_err("should exhaust retries");

    assert_eq!(notices.len(), RETRY_ATTEMPTS as usize - 1);
    assert_eq!(
        notices.iter().map(|(n, _)| *n).collect::<Vec<u32>>(),
        vec![1, 2, 3, 4]
    );
    assert!(matches!(err, GitError::Failed { code: Some(1), .. }));
}

#[cfg(unix)]
#[test]
fn invoker_stops_retrying_after_the_first_success() {
    let dir = temp_workspace("recover");
    let invoker = Invoker::new(sh(COMMAND_TIMEOUT)).with_delay(Duration::ZERO);

    // Fails once, then succeeds: the marker file survives between attempts.
    let script = "if [ -f ready ]; then printf 'ok'; else touch ready; exit 1; fi";
    let mut notices = 0usize;
    let output = invoker
        .run(&dir, &["-c", script], |_, _| notices += 1)
        .expect("second attempt should succeed");

    assert_eq!(output, "ok");
    assert_eq!(notices, 1);
}

#[cfg(unix)]
#[test]
fn invoker_success_on_first_attempt_emits_no_notices() {
    let dir = temp_workspace("first-try");
    let invoker = Invoker::new(sh(COMMAND_TIMEOUT)).with_delay(Duration::ZERO);

    let mut notices = 0usize;
    let output = invoker
        .run(&dir, &["-c", "printf 'clean'"], |_, _| notices += 1)
        .expect("run");
    assert_eq!(output, "clean");
    assert_eq!(notices, 0);
}
