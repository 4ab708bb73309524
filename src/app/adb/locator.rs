use std::path::{Path, PathBuf};

pub fn normalize_command_path(value: &str) -> String {
    let trimmed = value.trim();
    if let Some(inner) = trimmed
        .strip_prefix('"')
        .and_then(|candidate| candidate.strip_suffix('"'))
    {
        return inner.trim().to_string();
    }
    if let Some(inner) = trimmed
        .strip_prefix('\'')
        .and_then(|candidate| candidate.strip_suffix('\''))
    {
        return inner.trim().to_string();
    }
    trimmed.to_string()
}

/// Resolution order: configured override, then the platform-tools binary of
/// `ANDROID_HOME` / `ANDROID_SDK_ROOT`, then whatever `adb` PATH finds.
pub fn resolve_adb_program(config_command_path: &str) -> String {
    let normalized = normalize_command_path(config_command_path);
    if !normalized.is_empty() {
        return normalized;
    }
    for var in ["ANDROID_HOME", "ANDROID_SDK_ROOT"] {
        if let Some(candidate) = sdk_platform_tools_adb(var) {
            return candidate;
        }
    }
    "adb".to_string()
}

fn sdk_platform_tools_adb(env_var: &str) -> Option<String> {
    let root = std::env::var(env_var).ok()?;
    let root = root.trim();
    if root.is_empty() {
        return None;
    }
    let binary = if cfg!(windows) { "adb.exe" } else { "adb" };
    let candidate: PathBuf = Path::new(root).join("platform-tools").join(binary);
    if candidate.is_file() {
        Some(candidate.to_string_lossy().to_string())
    } else {
        None
    }
}

pub fn validate_adb_program(program: &str) -> Result<(), String> {
    if program.trim().is_empty() {
        return Err("ADB command is empty".to_string());
    }
    if program == "adb" {
        return Ok(());
    }
    let path = Path::new(program);
    if path.is_dir() {
        return Err("ADB path must point to an executable file".to_string());
    }
    if !path.exists() {
        return Err("ADB executable not found at the configured path".to_string());
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn env_lock() -> std::sync::MutexGuard<'static, ()> {
        static LOCK: std::sync::OnceLock<std::sync::Mutex<()>> = std::sync::OnceLock::new();
        LOCK.get_or_init(|| std::sync::Mutex::new(()))
            .lock()
            .expect("env lock")
    }

    #[test]
    fn strips_wrapping_quotes() {
        assert_eq!(
            normalize_command_path("  \"/opt/android/platform-tools/adb\"  "),
            "/opt/android/platform-tools/adb"
        );
        assert_eq!(
            normalize_command_path("  '/opt/android/platform-tools/adb'  "),
            "/opt/android/platform-tools/adb"
        );
    }

    #[test]
    fn configured_override_wins() {
        let _guard = env_lock();
        std::env::set_var("ANDROID_HOME", "/somewhere/else");
        assert_eq!(resolve_adb_program("\"/custom/adb\""), "/custom/adb");
        std::env::remove_var("ANDROID_HOME");
    }

    #[test]
    fn resolves_sdk_platform_tools_when_present() {
        let _guard = env_lock();
        let tmp = tempfile::TempDir::new().expect("tmp");
        let tools = tmp.path().join("platform-tools");
        fs::create_dir_all(&tools).expect("mkdir");
        let binary = if cfg!(windows) { "adb.exe" } else { "adb" };
        let adb = tools.join(binary);
        fs::write(&adb, b"").expect("touch adb");

        std::env::set_var("ANDROID_HOME", tmp.path());
        let resolved = resolve_adb_program("");
        std::env::remove_var("ANDROID_HOME");

        assert_eq!(resolved, adb.to_string_lossy());
    }

    #[test]
    fn missing_platform_tools_falls_back_to_path_lookup() {
        let _guard = env_lock();
        let tmp = tempfile::TempDir::new().expect("tmp");
        std::env::set_var("ANDROID_HOME", tmp.path());
        std::env::remove_var("ANDROID_SDK_ROOT");
        let resolved = resolve_adb_program("   ");
        std::env::remove_var("ANDROID_HOME");

        assert_eq!(resolved, "adb");
    }

    #[test]
    fn validates_nonexistent_path() {
        let err = validate_adb_program("/this/path/should/not/exist/adb").unwrap_err();
        assert!(err.to_lowercase().contains("not found"));
    }

    #[test]
    fn rejects_directories() {
        let tmp = tempfile::TempDir::new().expect("tmp");
        let err = validate_adb_program(&tmp.path().to_string_lossy()).unwrap_err();
        assert!(err.contains("executable file"));
    }
}
