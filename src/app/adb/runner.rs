use std::io::Read;
use std::process::{Command, Stdio};
use std::thread::JoinHandle;
use std::time::{Duration, Instant};

use crate::app::error::AppError;

pub const DEFAULT_PROBE_TIMEOUT: Duration = Duration::from_secs(5);

#[derive(Debug, Clone)]
pub struct CommandOutput {
    pub stdout: String,
    pub stderr: String,
    pub exit_code: Option<i32>,
}

impl CommandOutput {
    pub fn succeeded(&self) -> bool {
        self.exit_code.unwrap_or_default() == 0
    }

    /// stderr when present, stdout otherwise. adb writes some host errors to
    /// one stream and some to the other.
    pub fn failure_detail(&self) -> &str {
        let stderr = self.stderr.trim();
        if stderr.is_empty() {
            self.stdout.trim()
        } else {
            stderr
        }
    }
}

pub fn run_adb(program: &str, args: &[String], trace_id: &str) -> Result<CommandOutput, AppError> {
    run_command_with_timeout(program, args, DEFAULT_PROBE_TIMEOUT, trace_id)
}

pub fn run_command_with_timeout(
    program: &str,
    args: &[String],
    timeout: Duration,
    trace_id: &str,
) -> Result<CommandOutput, AppError> {
    let mut child = Command::new(program)
        .args(args)
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .map_err(|err| {
            // A missing executable is actionable ("install platform-tools"),
            // unlike a timeout, so it gets its own code and message.
            AppError::dependency(format!("Failed to launch {program}: {err}"), trace_id)
        })?;

    // Drain stdout/stderr in parallel; otherwise, a chatty child process can
    // block once the pipe buffer fills, and we will incorrectly hit the
    // timeout.
    let stdout = child
        .stdout
        .take()
        .ok_or_else(|| AppError::system("Failed to capture stdout", trace_id))?;
    let stderr = child
        .stderr
        .take()
        .ok_or_else(|| AppError::system("Failed to capture stderr", trace_id))?;

    let stdout_handle = drain_in_background(stdout);
    let stderr_handle = drain_in_background(stderr);

    let start = Instant::now();
    let exit_code = loop {
        match child.try_wait() {
            Ok(Some(status)) => break status.code(),
            Ok(None) => {
                if start.elapsed() > timeout {
                    let _ = child.kill();
                    let _ = child.wait();
                    let _ = stdout_handle.join();
                    let _ = stderr_handle.join();
                    return Err(AppError::system(
                        format!("Command timed out after {}s", timeout.as_secs()),
                        trace_id,
                    ));
                }
                std::thread::sleep(Duration::from_millis(50));
            }
            Err(err) => {
                let _ = stdout_handle.join();
                let _ = stderr_handle.join();
                return Err(AppError::system(
                    format!("Failed to poll command: {err}"),
                    trace_id,
                ));
            }
        }
    };

    let stdout_bytes = stdout_handle.join().unwrap_or_default();
    let stderr_bytes = stderr_handle.join().unwrap_or_default();

    Ok(CommandOutput {
        stdout: String::from_utf8_lossy(&stdout_bytes).to_string(),
        stderr: String::from_utf8_lossy(&stderr_bytes).to_string(),
        exit_code,
    })
}

fn drain_in_background(mut reader: impl Read + Send + 'static) -> JoinHandle<Vec<u8>> {
    std::thread::spawn(move || {
        let mut buffer = Vec::<u8>::new();
        let mut temp = [0u8; 4096];
        loop {
            match reader.read(&mut temp) {
                Ok(0) => break,
                Ok(count) => buffer.extend_from_slice(&temp[..count]),
                Err(_) => break,
            }
        }
        buffer
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn does_not_deadlock_on_large_stdout() {
        // Regression guard: if stdout/stderr are piped but not drained, the
        // child blocks once the pipe buffer fills and an otherwise-fast
        // command "hangs" until the timeout.
        let trace_id = "test-trace-large-output";

        let (program, args, min_stdout_len) = if cfg!(windows) {
            (
                "cmd.exe".to_string(),
                vec![
                    "/C".to_string(),
                    "for /L %i in (1,1,100000) do @echo 1234567890".to_string(),
                ],
                1_000_000usize,
            )
        } else {
            (
                "sh".to_string(),
                vec![
                    "-c".to_string(),
                    "i=0; while [ $i -lt 100000 ]; do echo 1234567890; i=$((i+1)); done"
                        .to_string(),
                ],
                1_000_000usize,
            )
        };

        let output = run_command_with_timeout(&program, &args, Duration::from_secs(10), trace_id)
            .expect("expected large-output command to complete without timing out");

        assert_eq!(output.exit_code, Some(0));
        assert!(
            output.stdout.len() >= min_stdout_len,
            "expected stdout >= {min_stdout_len}, got {}",
            output.stdout.len()
        );
    }

    #[test]
    fn kills_child_on_timeout() {
        let (program, args) = if cfg!(windows) {
            (
                "cmd.exe".to_string(),
                vec!["/C".to_string(), "ping 127.0.0.1 -n 30".to_string()],
            )
        } else {
            ("sh".to_string(), vec!["-c".to_string(), "sleep 30".to_string()])
        };

        let started = Instant::now();
        let err =
            run_command_with_timeout(&program, &args, Duration::from_millis(200), "trace-timeout")
                .expect_err("expected timeout");
        assert_eq!(err.code, "ERR_SYSTEM");
        assert!(err.error.contains("timed out"));
        assert!(started.elapsed() < Duration::from_secs(10));
    }

    #[test]
    fn missing_program_is_a_dependency_error() {
        let err = run_command_with_timeout(
            "/this/program/does/not/exist",
            &[],
            Duration::from_secs(1),
            "trace-missing",
        )
        .expect_err("expected spawn failure");
        assert_eq!(err.code, "ERR_DEPENDENCY");
        assert!(err.error.contains("Failed to launch"));
    }

    #[test]
    fn failure_detail_prefers_stderr() {
        let output = CommandOutput {
            stdout: "stdout text".to_string(),
            stderr: " stderr text \n".to_string(),
            exit_code: Some(1),
        };
        assert_eq!(output.failure_detail(), "stderr text");

        let quiet = CommandOutput {
            stdout: "only stdout".to_string(),
            stderr: String::new(),
            exit_code: Some(1),
        };
        assert_eq!(quiet.failure_detail(), "only stdout");
    }
}
