use std::path::PathBuf;

pub const APP_ID: &str = "io.github.lightdash";
pub const APP_NAME: &str = "Lightdash";

const HOME_ENV: &str = "LIGHTDASH_HOME";

// All derived paths hang off one overridable base so tests can redirect
// the whole application into a temp directory with a single env var.
pub fn stable_app_dir() -> PathBuf {
    if let Ok(base) = std::env::var(HOME_ENV) {
        if !base.is_empty() {
            return PathBuf::from(base);
        }
    }

    dirs::config_dir()
        .unwrap_or_else(std::env::temp_dir)
        .join("lightdash")
}

pub fn settings_path() -> PathBuf {
    stable_app_dir().join("settings.toml")
}

pub fn logs_dir() -> PathBuf {
    stable_app_dir().join("logs")
}

pub fn extensions_dir() -> PathBuf {
    stable_app_dir().join("extensions")
}

fn runtime_dir() -> PathBuf {
    if std::env::var(HOME_ENV).is_ok() {
        return stable_app_dir().join("run");
    }

    dirs::runtime_dir()
        .unwrap_or_else(std::env::temp_dir)
        .join("lightdash")
}

pub fn control_socket_path() -> PathBuf {
    runtime_dir().join("control.sock")
}

pub fn extension_socket_path() -> PathBuf {
    runtime_dir().join("extensions.sock")
}

#[cfg(test)]
mod tests {
    use super::{control_socket_path, extensions_dir, logs_dir, settings_path};

    #[test]
    fn derived_paths_share_the_app_base() {
        for path in [settings_path(), logs_dir(), extensions_dir()] {
            assert!(path
                .to_string_lossy()
                .to_ascii_lowercase()
                .contains("lightdash"));
        }
        assert!(control_socket_path().ends_with("control.sock"));
    }
}
