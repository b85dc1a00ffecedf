//! Blocking child process execution with a timeout and bounded output capture.

use std::io::Read;
use std::process::{Command, ExitStatus, Stdio};
use std::thread;
use std::time::Duration;

use anyhow::{Context, Result, anyhow};
use tracing::{debug, instrument, warn};
use wait_timeout::ChildExt;

/// Captured child process output, decoded lossily as UTF-8.
#[derive(Debug)]
pub struct CapturedOutput {
    pub status: ExitStatus,
    pub stdout: String,
    pub stderr: String,
    pub timed_out: bool,
}

/// Run `cmd` to completion, killing it after `timeout`.
///
/// Stdin is closed. Stdout and stderr are drained on reader threads while the
/// child runs so a chatty child cannot block on a full pipe; at most
/// `output_limit_bytes` of each stream is kept.
///
/// Returns `Err` only when the child could not be spawned or waited on.
#[instrument(skip_all, fields(timeout_secs = timeout.as_secs(), output_limit_bytes))]
pub fn run_with_timeout(
    mut cmd: Command,
    timeout: Duration,
    output_limit_bytes: usize,
) -> Result<CapturedOutput> {
    cmd.stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped());

    debug!("spawning child process");
    let mut child = cmd.spawn().context("spawn command")?;

    let stdout = child
        .stdout
        .take()
        .ok_or_else(|| anyhow!("stdout was not piped"))?;
    let stderr = child
        .stderr
        .take()
        .ok_or_else(|| anyhow!("stderr was not piped"))?;

    let stdout_handle = thread::spawn(move || read_limited(stdout, output_limit_bytes));
    let stderr_handle = thread::spawn(move || read_limited(stderr, output_limit_bytes));

    let (status, timed_out) = match child.wait_timeout(timeout).context("wait for command")? {
        Some(status) => (status, false),
        None => {
            warn!(timeout_secs = timeout.as_secs(), "deadline passed, killing child");
            child.kill().context("kill command")?;
            (child.wait().context("reap killed command")?, true)
        }
    };

    let stdout = collect_stream("stdout", stdout_handle)?;
    let stderr = collect_stream("stderr", stderr_handle)?;

    debug!(exit_code = ?status.code(), timed_out, "command finished");
    Ok(CapturedOutput {
        status,
        stdout,
        stderr,
        timed_out,
    })
}

/// Join a reader thread and decode what it kept. Dropped bytes are only logged.
fn collect_stream(
    stream: &'static str,
    handle: thread::JoinHandle<Result<(Vec<u8>, usize)>>,
) -> Result<String> {
    let (kept, dropped) = match handle.join() {
        Ok(result) => result.with_context(|| format!("capture {stream}"))?,
        Err(_) => return Err(anyhow!("{stream} reader thread panicked")),
    };
    if dropped > 0 {
        warn!(stream, dropped, "control tool output truncated");
    }
    Ok(String::from_utf8_lossy(&kept).into_owned())
}

/// Read `reader` to EOF, keeping at most `limit` bytes. Returns the kept bytes
/// and the number dropped.
fn read_limited<R: Read>(mut reader: R, limit: usize) -> Result<(Vec<u8>, usize)> {
    let mut buf = Vec::new();
    let mut dropped = 0usize;
    let mut chunk = [0u8; 8192];

    loop {
        let n = reader.read(&mut chunk).context("read output")?;
        if n == 0 {
            break;
        }
        let room = limit.saturating_sub(buf.len());
        let keep = n.min(room);
        buf.extend_from_slice(&chunk[..keep]);
        dropped += n - keep;
    }

    Ok((buf, dropped))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn read_limited_drops_overflow() {
        let data = vec![b'x'; 20_000];
        let (kept, dropped) = read_limited(data.as_slice(), 100).expect("read");
        assert_eq!(kept.len(), 100);
        assert_eq!(dropped, 19_900);
    }

    #[cfg(unix)]
    #[test]
    fn captures_stdout_and_status() {
        let mut cmd = Command::new("sh");
        cmd.arg("-c").arg("printf 'abc123\\n'; echo oops >&2; exit 3");
        let output = run_with_timeout(cmd, Duration::from_secs(10), 1000).expect("run");
        assert_eq!(output.stdout, "abc123\n");
        assert_eq!(output.stderr, "oops\n");
        assert_eq!(output.status.code(), Some(3));
        assert!(!output.timed_out);
    }

    #[cfg(unix)]
    #[test]
    fn caps_chatty_output_at_limit() {
        let mut cmd = Command::new("sh");
        cmd.arg("-c")
            .arg("i=0; while [ $i -lt 500 ]; do echo 'token-line'; i=$((i+1)); done");
        let output = run_with_timeout(cmd, Duration::from_secs(10), 64).expect("run");
        assert_eq!(output.stdout.len(), 64);
        assert!(output.stdout.starts_with("token-line\n"));
        assert!(output.status.success());
    }

    #[cfg(unix)]
    #[test]
    fn kills_on_timeout() {
        let mut cmd = Command::new("sh");
        cmd.arg("-c").arg("exec sleep 5");
        let output = run_with_timeout(cmd, Duration::from_millis(200), 1000).expect("run");
        assert!(output.timed_out);
        assert!(!output.status.success());
    }

    #[test]
    fn spawn_failure_is_error() {
        let cmd = Command::new("/nonexistent/keiji-seed-test-binary");
        let err = run_with_timeout(cmd, Duration::from_secs(1), 1000).unwrap_err();
        assert!(err.to_string().contains("spawn command"));
    }
}
