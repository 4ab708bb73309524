use std::time::{Duration, Instant};

use chrono::Utc;
use tauri::State;
use tracing::{info, warn};
use uuid::Uuid;

use crate::app::adb::input::{build_keyevent_args, keyevent_failure};
use crate::app::adb::locator::{normalize_command_path, resolve_adb_program, validate_adb_program};
use crate::app::adb::parse::{first_ready_device, parse_adb_devices};
use crate::app::adb::runner::{run_command_with_timeout, CommandOutput};
use crate::app::config::{load_config, normalize_config_for_save, save_config, AppConfig};
use crate::app::diagnostics;
use crate::app::error::AppError;
use crate::app::keys::MediaKey;
use crate::app::models::{
    AdbInfo, CommandResponse, DeviceProbe, DiagnosticsExportResult, KeySendResult, SendRecord,
};
use crate::app::state::AppState;


fn resolve_trace_id(input: Option<String>) -> String {
    input
        .filter(|value| !value.trim().is_empty())
        .unwrap_or_else(|| Uuid::new_v4().to_string())
}

fn ensure_non_empty(value: &str, field: &str, trace_id: &str) -> Result<(), AppError> {
    if value.trim().is_empty() {
        return Err(AppError::validation(
            format!("{field} is required"),
            trace_id,
        ));
    }
    Ok(())
}

fn get_adb_program(config: &AppConfig, trace_id: &str) -> Result<String, AppError> {
    let program = resolve_adb_program(&config.adb.command_path);
    if let Err(message) = validate_adb_program(&program) {
        return Err(AppError::validation(message, trace_id));
    }
    Ok(program)
}

/// Explicit serial wins, then the configured default; with neither, adb's own
/// default-device resolution applies. An explicit blank is caller error.
fn resolve_target_serial(
    explicit: Option<String>,
    config: &AppConfig,
    trace_id: &str,
) -> Result<Option<String>, AppError> {
    if let Some(serial) = explicit {
        ensure_non_empty(&serial, "serial", trace_id)?;
        return Ok(Some(serial.trim().to_string()));
    }
    let configured = config.default_serial.trim();
    if configured.is_empty() {
        Ok(None)
    } else {
        Ok(Some(configured.to_string()))
    }
}

fn send_media_key_inner(
    key: MediaKey,
    serial: Option<&str>,
    adb_program: &str,
    timeout: Duration,
    trace_id: &str,
    run: impl FnOnce(&str, &[String], Duration, &str) -> Result<CommandOutput, AppError>,
) -> Result<KeySendResult, AppError> {
    if let Some(serial) = serial {
        ensure_non_empty(serial, "serial", trace_id)?;
    }

    let args = build_keyevent_args(key, serial);
    let started = Instant::now();
    let output = run(adb_program, &args, timeout, trace_id)?;
    let duration_ms = started.elapsed().as_millis() as u64;

    if let Some(reason) = keyevent_failure(&output) {
        return Err(AppError::dependency(
            format!("{} failed: {reason}", key.android_name()),
            trace_id,
        ));
    }

    Ok(KeySendResult {
        key,
        keycode: key.keycode(),
        android_name: key.android_name().to_string(),
        serial: serial.map(|value| value.to_string()),
        stdout: output.stdout,
        stderr: output.stderr,
        exit_code: output.exit_code,
        duration_ms,
    })
}

fn list_devices_inner(
    adb_program: &str,
    timeout: Duration,
    trace_id: &str,
    run: impl FnOnce(&str, &[String], Duration, &str) -> Result<CommandOutput, AppError>,
) -> Result<DeviceProbe, AppError> {
    let args = vec!["devices".to_string(), "-l".to_string()];
    let output = run(adb_program, &args, timeout, trace_id)?;
    if !output.succeeded() {
        return Err(AppError::dependency(
            format!("adb devices failed: {}", output.failure_detail()),
            trace_id,
        ));
    }
    let devices = parse_adb_devices(&output.stdout);
    let ready = first_ready_device(&devices).cloned();
    Ok(DeviceProbe { devices, ready })
}

fn check_adb_inner(
    program: String,
    timeout: Duration,
    trace_id: &str,
    run: impl FnOnce(&str, &[String], Duration, &str) -> Result<CommandOutput, AppError>,
) -> AdbInfo {
    if let Err(message) = validate_adb_program(&program) {
        return AdbInfo {
            available: false,
            version_output: String::new(),
            command_path: program,
            error: Some(message),
        };
    }

    let args = vec!["version".to_string()];
    let output = match run(&program, &args, timeout, trace_id) {
        Ok(output) => output,
        Err(err) => {
            return AdbInfo {
                available: false,
                version_output: String::new(),
                command_path: program,
                error: Some(err.error),
            };
        }
    };

    let mut version_output = output.stdout.trim().to_string();
    let stderr = output.stderr.trim();
    if !stderr.is_empty() {
        if !version_output.is_empty() {
            version_output.push('\n');
        }
        version_output.push_str(stderr);
    }

    let available = output.succeeded();
    let error = if available {
        None
    } else if version_output.is_empty() {
        Some("adb version probe failed".to_string())
    } else {
        Some(version_output.clone())
    };

    AdbInfo {
        available,
        version_output,
        command_path: program,
        error,
    }
}

#[tauri::command(async)]
pub fn get_config(trace_id: Option<String>) -> Result<CommandResponse<AppConfig>, AppError> {
    let trace_id = resolve_trace_id(trace_id);
    let config = load_config(&trace_id)?;
    Ok(CommandResponse {
        trace_id,
        data: config,
    })
}

#[tauri::command(async)]
pub fn save_app_config(
    config: AppConfig,
    trace_id: Option<String>,
) -> Result<CommandResponse<AppConfig>, AppError> {
    let trace_id = resolve_trace_id(trace_id);
    let config = normalize_config_for_save(config);
    save_config(&config, &trace_id)?;
    Ok(CommandResponse {
        trace_id,
        data: config,
    })
}

#[tauri::command(async)]
pub fn reset_config(trace_id: Option<String>) -> Result<CommandResponse<AppConfig>, AppError> {
    let trace_id = resolve_trace_id(trace_id);
    let config = normalize_config_for_save(AppConfig::default());
    save_config(&config, &trace_id)?;
    Ok(CommandResponse {
        trace_id,
        data: config,
    })
}

#[tauri::command(async)]
pub fn check_adb(
    command_path: Option<String>,
    trace_id: Option<String>,
) -> Result<CommandResponse<AdbInfo>, AppError> {
    let trace_id = resolve_trace_id(trace_id);
    info!(trace_id = %trace_id, "check_adb");

    let config = load_config(&trace_id)?;
    let program = command_path
        .as_deref()
        .map(normalize_command_path)
        .filter(|value| !value.is_empty())
        .unwrap_or_else(|| resolve_adb_program(&config.adb.command_path));
    let timeout = Duration::from_secs(config.command.probe_timeout_secs.max(1));

    let data = check_adb_inner(program, timeout, &trace_id, run_command_with_timeout);
    if let Some(error) = data.error.as_deref() {
        warn!(trace_id = %trace_id, error = %error, "adb check failed");
    }
    Ok(CommandResponse { trace_id, data })
}

#[tauri::command(async)]
pub fn list_devices(trace_id: Option<String>) -> Result<CommandResponse<DeviceProbe>, AppError> {
    let trace_id = resolve_trace_id(trace_id);
    info!(trace_id = %trace_id, "list_devices");

    let config = load_config(&trace_id)?;
    let adb_program = get_adb_program(&config, &trace_id)?;
    let timeout = Duration::from_secs(config.command.probe_timeout_secs.max(1));

    let probe = list_devices_inner(&adb_program, timeout, &trace_id, run_command_with_timeout)?;
    info!(
        trace_id = %trace_id,
        device_count = probe.devices.len(),
        ready = probe.ready.is_some(),
        "list_devices done"
    );
    Ok(CommandResponse {
        trace_id,
        data: probe,
    })
}

#[tauri::command(async)]
pub fn send_media_key(
    key: String,
    serial: Option<String>,
    state: State<'_, AppState>,
    trace_id: Option<String>,
) -> Result<CommandResponse<KeySendResult>, AppError> {
    let trace_id = resolve_trace_id(trace_id);
    info!(trace_id = %trace_id, key = %key, "send_media_key");

    let key = MediaKey::parse(&key)
        .ok_or_else(|| AppError::validation(format!("Unknown media key: {key}"), &trace_id))?;

    let config = load_config(&trace_id)?;
    let adb_program = get_adb_program(&config, &trace_id)?;
    let serial = resolve_target_serial(serial, &config, &trace_id)?;
    let timeout = Duration::from_secs(config.command.key_timeout_secs.max(1));

    // Cap concurrent adb processes and order sends per device; a mashed
    // button queues instead of stampeding.
    let _permit = state.scheduler.permit();
    let serial_lock = state.scheduler.serial_lock(serial.as_deref().unwrap_or(""));
    let _serial_guard = serial_lock
        .lock()
        .map_err(|_| AppError::locked("Device send queue", &trace_id))?;

    let started = Instant::now();
    let result = send_media_key_inner(
        key,
        serial.as_deref(),
        &adb_program,
        timeout,
        &trace_id,
        run_command_with_timeout,
    );
    let duration_ms = started.elapsed().as_millis() as u64;

    state.record_send(SendRecord {
        key,
        serial,
        success: result.is_ok(),
        duration_ms,
        timestamp_utc: Utc::now().to_rfc3339(),
        trace_id: trace_id.clone(),
    });

    match result {
        Ok(data) => {
            info!(
                trace_id = %trace_id,
                keycode = data.keycode,
                duration_ms = data.duration_ms,
                "send_media_key done"
            );
            Ok(CommandResponse { trace_id, data })
        }
        Err(err) => {
            warn!(trace_id = %trace_id, error = %err.error, "send_media_key failed");
            Err(err)
        }
    }
}

#[tauri::command(async)]
pub fn export_diagnostics_bundle(
    output_dir: Option<String>,
    state: State<'_, AppState>,
    trace_id: Option<String>,
) -> Result<CommandResponse<DiagnosticsExportResult>, AppError> {
    let trace_id = resolve_trace_id(trace_id);
    info!(trace_id = %trace_id, "export_diagnostics_bundle");

    let config = load_config(&trace_id)?;
    // No validation here: a bundle is most useful exactly when adb is broken.
    let adb_program = resolve_adb_program(&config.adb.command_path);
    let path = diagnostics::export_diagnostics_bundle(
        &adb_program,
        &config,
        state.send_history(),
        output_dir,
        &trace_id,
    )?;

    Ok(CommandResponse {
        trace_id,
        data: DiagnosticsExportResult {
            output_path: path.to_string_lossy().to_string(),
        },
    })
}

// Smoke helpers: real-device checks without a Tauri window. They reuse the
// same inner logic as the commands.
pub fn smoke_check_adb(program: String, timeout: Duration, trace_id: &str) -> AdbInfo {
    check_adb_inner(program, timeout, trace_id, run_command_with_timeout)
}

pub fn smoke_list_devices(
    adb_program: &str,
    timeout: Duration,
    trace_id: &str,
) -> Result<DeviceProbe, AppError> {
    list_devices_inner(adb_program, timeout, trace_id, run_command_with_timeout)
}

pub fn smoke_send_media_key(
    key: MediaKey,
    serial: Option<&str>,
    adb_program: &str,
    timeout: Duration,
    trace_id: &str,
) -> Result<KeySendResult, AppError> {
    send_media_key_inner(
        key,
        serial,
        adb_program,
        timeout,
        trace_id,
        run_command_with_timeout,
    )
}
