use std::fs;
use std::path::PathBuf;

use chrono::Utc;
use serde::Serialize;

use crate::app::adb::parse::parse_adb_devices;
use crate::app::adb::runner::run_adb;
use crate::app::config::AppConfig;
use crate::app::error::AppError;
use crate::app::models::{DeviceSummary, SendRecord};

#[derive(Debug, Serialize)]
struct DiagnosticsManifest {
    app_version: &'static str,
    os: &'static str,
    arch: &'static str,
    timestamp_utc: String,
    trace_id: String,
}

#[derive(Debug, Serialize)]
struct DevicesPayload {
    parsed: Vec<DeviceSummary>,
    raw_stdout: String,
    raw_stderr: String,
    exit_code: Option<i32>,
    error: Option<String>,
}

#[derive(Debug, Serialize)]
struct AdbPayload {
    resolved_program: String,
    configured_path: String,
}

#[derive(Debug, Serialize)]
struct DiagnosticsPayload {
    manifest: DiagnosticsManifest,
    adb: AdbPayload,
    config: AppConfig,
    devices: DevicesPayload,
    recent_sends: Vec<SendRecord>,
}

fn resolve_output_dir(output_dir: Option<String>) -> PathBuf {
    match output_dir
        .as_deref()
        .map(str::trim)
        .filter(|value| !value.is_empty())
    {
        Some(dir) => PathBuf::from(dir),
        None => std::env::temp_dir().join("media_remote_diagnostics"),
    }
}

/// A failed device probe still produces a bundle; the error lands inline so
/// a "nothing works" report captures exactly what adb said.
fn probe_devices(adb_program: &str, trace_id: &str) -> DevicesPayload {
    let args = vec!["devices".to_string(), "-l".to_string()];
    match run_adb(adb_program, &args, trace_id) {
        Ok(output) => DevicesPayload {
            parsed: parse_adb_devices(&output.stdout),
            raw_stdout: output.stdout,
            raw_stderr: output.stderr,
            exit_code: output.exit_code,
            error: None,
        },
        Err(err) => DevicesPayload {
            parsed: Vec::new(),
            raw_stdout: String::new(),
            raw_stderr: String::new(),
            exit_code: None,
            error: Some(err.error),
        },
    }
}

pub fn export_diagnostics_bundle(
    adb_program: &str,
    config: &AppConfig,
    recent_sends: Vec<SendRecord>,
    output_dir: Option<String>,
    trace_id: &str,
) -> Result<PathBuf, AppError> {
    let payload = DiagnosticsPayload {
        manifest: DiagnosticsManifest {
            app_version: env!("CARGO_PKG_VERSION"),
            os: std::env::consts::OS,
            arch: std::env::consts::ARCH,
            timestamp_utc: Utc::now().to_rfc3339(),
            trace_id: trace_id.to_string(),
        },
        adb: AdbPayload {
            resolved_program: adb_program.to_string(),
            configured_path: config.adb.command_path.clone(),
        },
        config: config.clone(),
        devices: probe_devices(adb_program, trace_id),
        recent_sends,
    };

    let dir = resolve_output_dir(output_dir);
    fs::create_dir_all(&dir).map_err(|err| {
        AppError::system(format!("Failed to create output directory: {err}"), trace_id)
    })?;

    let filename = format!(
        "media_remote_diagnostics_{}.json",
        Utc::now().format("%Y%m%d_%H%M%S")
    );
    let path = dir.join(filename);

    let body = serde_json::to_string_pretty(&payload).map_err(|err| {
        AppError::system(format!("Failed to serialize diagnostics: {err}"), trace_id)
    })?;
    fs::write(&path, body)
        .map_err(|err| AppError::system(format!("Failed to write diagnostics: {err}"), trace_id))?;

    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn writes_bundle_even_when_adb_is_unreachable() {
        let tmp = tempfile::TempDir::new().expect("tmp");
        let path = export_diagnostics_bundle(
            "/this/adb/does/not/exist",
            &AppConfig::default(),
            Vec::new(),
            Some(tmp.path().to_string_lossy().to_string()),
            "trace-diag-1",
        )
        .expect("bundle path");

        let raw = fs::read_to_string(&path).expect("read bundle");
        let value: serde_json::Value = serde_json::from_str(&raw).expect("valid json");
        assert_eq!(value["manifest"]["trace_id"], "trace-diag-1");
        assert!(value["devices"]["error"].is_string());
        assert_eq!(value["devices"]["parsed"].as_array().map(Vec::len), Some(0));
    }

    #[test]
    fn defaults_to_temp_dir() {
        let dir = resolve_output_dir(None);
        assert!(dir.ends_with("media_remote_diagnostics"));
        assert_eq!(resolve_output_dir(Some("  ".to_string())), dir);
    }
}
