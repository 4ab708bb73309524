use std::sync::OnceLock;

use regex::Regex;

use crate::app::adb::runner::CommandOutput;
use crate::app::keys::MediaKey;

pub fn build_keyevent_args(key: MediaKey, serial: Option<&str>) -> Vec<String> {
    let mut args = Vec::with_capacity(5);
    if let Some(serial) = serial {
        args.push("-s".to_string());
        args.push(serial.to_string());
    }
    args.push("shell".to_string());
    args.push("input".to_string());
    args.push("keyevent".to_string());
    args.push(key.keycode().to_string());
    args
}

// `cmd input` reports injection failures ("Error: Injecting to another
// application requires INJECT_EVENTS permission", stack traces) on stdout and
// still exits 0, so the exit code alone is not trustworthy.
fn failure_marker() -> &'static Regex {
    static MARKER: OnceLock<Regex> = OnceLock::new();
    MARKER.get_or_init(|| Regex::new(r"(?i)\berror:|\bexception\b").expect("valid regex"))
}

/// `None` when the keyevent landed; otherwise the line worth showing in the
/// status label.
pub fn keyevent_failure(output: &CommandOutput) -> Option<String> {
    if !output.succeeded() {
        let detail = output.failure_detail();
        return Some(if detail.is_empty() {
            format!(
                "adb exited with code {}",
                output.exit_code.map_or_else(|| "unknown".to_string(), |code| code.to_string())
            )
        } else {
            detail.to_string()
        });
    }

    let marker = failure_marker();
    for line in output.stdout.lines().chain(output.stderr.lines()) {
        let trimmed = line.trim();
        if !trimmed.is_empty() && marker.is_match(trimmed) {
            return Some(trimmed.to_string());
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    fn output(stdout: &str, stderr: &str, exit_code: Option<i32>) -> CommandOutput {
        CommandOutput {
            stdout: stdout.to_string(),
            stderr: stderr.to_string(),
            exit_code,
        }
    }

    #[test]
    fn builds_args_without_serial() {
        let args = build_keyevent_args(MediaKey::PlayPause, None);
        assert_eq!(args, vec!["shell", "input", "keyevent", "85"]);
    }

    #[test]
    fn builds_args_with_serial() {
        let args = build_keyevent_args(MediaKey::Next, Some("emulator-5554"));
        assert_eq!(
            args,
            vec!["-s", "emulator-5554", "shell", "input", "keyevent", "87"]
        );
    }

    #[test]
    fn clean_exit_is_success() {
        assert_eq!(keyevent_failure(&output("", "", Some(0))), None);
    }

    #[test]
    fn nonzero_exit_reports_stderr_detail() {
        let failure = keyevent_failure(&output(
            "",
            "adb: no devices/emulators found\n",
            Some(1),
        ))
        .expect("failure");
        assert!(failure.contains("no devices/emulators found"));
    }

    #[test]
    fn nonzero_exit_without_output_reports_code() {
        let failure = keyevent_failure(&output("", "", Some(127))).expect("failure");
        assert!(failure.contains("127"));
    }

    #[test]
    fn error_marker_on_stdout_is_a_failure_despite_exit_zero() {
        let failure = keyevent_failure(&output(
            "Error: Injecting to another application requires INJECT_EVENTS permission\n",
            "",
            Some(0),
        ))
        .expect("failure");
        assert!(failure.starts_with("Error:"));
    }

    #[test]
    fn exception_marker_is_a_failure() {
        let failure = keyevent_failure(&output(
            "java.lang.SecurityException: denied\n",
            "",
            Some(0),
        ))
        .expect("failure");
        assert!(failure.contains("SecurityException"));
    }

    #[test]
    fn ordinary_stdout_chatter_is_not_a_failure() {
        assert_eq!(
            keyevent_failure(&output("* daemon started successfully\n", "", Some(0))),
            None
        );
    }
}
