use std::time::{Duration, Instant};

use serde::Serialize;
use uuid::Uuid;

use media_remote_lib::app::adb::locator::resolve_adb_program;
use media_remote_lib::app::commands::{smoke_check_adb, smoke_list_devices, smoke_send_media_key};
use media_remote_lib::app::config::load_config;
use media_remote_lib::app::keys::MediaKey;
use media_remote_lib::app::logging::init_logging;

#[derive(Debug, Clone)]
struct Args {
    serial: Option<String>,
    key: Option<MediaKey>,
    json: bool,
}

#[derive(Serialize)]
struct SmokeSummary {
    tool: &'static str,
    status: &'static str,
    trace_id: String,
    adb_program: String,
    serial: Option<String>,
    checks: Vec<SmokeCheck>,
}

#[derive(Serialize)]
struct SmokeCheck {
    name: &'static str,
    status: &'static str, // pass|fail|skip
    duration_ms: u128,
    detail: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

fn parse_args() -> Result<Args, String> {
    let mut serial = std::env::var("ANDROID_SERIAL")
        .ok()
        .filter(|value| !value.trim().is_empty());
    let mut key = None;
    let mut json = false;

    let mut iter = std::env::args().skip(1);
    while let Some(arg) = iter.next() {
        match arg.as_str() {
            "--serial" => {
                serial = Some(
                    iter.next()
                        .filter(|value| !value.trim().is_empty())
                        .ok_or("--serial requires a value")?,
                );
            }
            "--key" => {
                let value = iter.next().ok_or("--key requires a value")?;
                key = Some(MediaKey::parse(&value).ok_or_else(|| {
                    format!("unknown key '{value}' (expected play_pause|stop|next|previous)")
                })?);
            }
            "--json" => json = true,
            "--help" | "-h" => {
                print_usage();
                std::process::exit(0);
            }
            other => return Err(format!("unknown argument '{other}'")),
        }
    }

    Ok(Args { serial, key, json })
}

fn print_usage() {
    eprintln!(
        "usage: smoke [--serial <serial>] [--key play_pause|stop|next|previous] [--json]"
    );
}

fn main() {
    init_logging();

    let args = match parse_args() {
        Ok(args) => args,
        Err(message) => {
            eprintln!("smoke: {message}");
            print_usage();
            std::process::exit(2);
        }
    };

    let trace_id = Uuid::new_v4().to_string();
    let config = load_config(&trace_id).unwrap_or_default();
    let adb_program = resolve_adb_program(&config.adb.command_path);
    let probe_timeout = Duration::from_secs(config.command.probe_timeout_secs.max(1));
    let key_timeout = Duration::from_secs(config.command.key_timeout_secs.max(1));

    let mut checks = Vec::new();

    let started = Instant::now();
    let adb_info = smoke_check_adb(adb_program.clone(), probe_timeout, &trace_id);
    checks.push(SmokeCheck {
        name: "check_adb",
        status: if adb_info.available { "pass" } else { "fail" },
        duration_ms: started.elapsed().as_millis(),
        detail: adb_info
            .version_output
            .lines()
            .next()
            .unwrap_or_default()
            .to_string(),
        error: adb_info.error.clone(),
    });

    if adb_info.available {
        let started = Instant::now();
        match smoke_list_devices(&adb_program, probe_timeout, &trace_id) {
            Ok(probe) => {
                let detail = match &probe.ready {
                    Some(ready) => format!(
                        "{} device(s), ready: {}",
                        probe.devices.len(),
                        ready.serial
                    ),
                    None => format!("{} device(s), none ready", probe.devices.len()),
                };
                checks.push(SmokeCheck {
                    name: "list_devices",
                    status: if probe.ready.is_some() { "pass" } else { "fail" },
                    duration_ms: started.elapsed().as_millis(),
                    detail,
                    error: None,
                });
            }
            Err(err) => checks.push(SmokeCheck {
                name: "list_devices",
                status: "fail",
                duration_ms: started.elapsed().as_millis(),
                detail: String::new(),
                error: Some(err.error),
            }),
        }
    } else {
        checks.push(SmokeCheck {
            name: "list_devices",
            status: "skip",
            duration_ms: 0,
            detail: "adb unavailable".to_string(),
            error: None,
        });
    }

    match args.key {
        Some(key) if checks.iter().all(|check| check.status != "fail") => {
            let started = Instant::now();
            match smoke_send_media_key(
                key,
                args.serial.as_deref(),
                &adb_program,
                key_timeout,
                &trace_id,
            ) {
                Ok(result) => checks.push(SmokeCheck {
                    name: "send_media_key",
                    status: "pass",
                    duration_ms: started.elapsed().as_millis(),
                    detail: format!("sent {} ({})", result.android_name, result.keycode),
                    error: None,
                }),
                Err(err) => checks.push(SmokeCheck {
                    name: "send_media_key",
                    status: "fail",
                    duration_ms: started.elapsed().as_millis(),
                    detail: String::new(),
                    error: Some(err.error),
                }),
            }
        }
        Some(_) => checks.push(SmokeCheck {
            name: "send_media_key",
            status: "skip",
            duration_ms: 0,
            detail: "earlier check failed".to_string(),
            error: None,
        }),
        None => {}
    }

    let failed = checks.iter().any(|check| check.status == "fail");
    let summary = SmokeSummary {
        tool: "media_remote_smoke",
        status: if failed { "fail" } else { "pass" },
        trace_id,
        adb_program,
        serial: args.serial,
        checks,
    };

    if args.json {
        match serde_json::to_string_pretty(&summary) {
            Ok(body) => println!("{body}"),
            Err(err) => {
                eprintln!("smoke: failed to serialize summary: {err}");
                std::process::exit(1);
            }
        }
    } else {
        println!("smoke: {} ({})", summary.status, summary.adb_program);
        for check in &summary.checks {
            let detail = if check.detail.is_empty() {
                check.error.clone().unwrap_or_default()
            } else {
                check.detail.clone()
            };
            println!("  {:<16} {:<5} {:>5}ms  {}", check.name, check.status, check.duration_ms, detail);
        }
    }

    std::process::exit(if failed { 1 } else { 0 });
}
