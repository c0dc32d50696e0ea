use std::{
    path::{Path, PathBuf},
    sync::Mutex,
};

use tracing::{debug, warn};

use crate::{env_subst::substitute_env, schema::SmsGateConfig};

/// Recognized config file names, in preference order.
const CONFIG_FILENAMES: &[&str] = &["smsgate.toml", "smsgate.yaml", "smsgate.yml", "smsgate.json"];

/// When set, discovery looks only in this directory. Test isolation hook.
static CONFIG_DIR_OVERRIDE: Mutex<Option<PathBuf>> = Mutex::new(None);

/// Serializes read-modify-write cycles on the config file.
static CONFIG_SAVE_LOCK: Mutex<()> = Mutex::new(());

pub fn set_config_dir(path: PathBuf) {
    *CONFIG_DIR_OVERRIDE.lock().unwrap() = Some(path);
}

pub fn clear_config_dir() {
    *CONFIG_DIR_OVERRIDE.lock().unwrap() = None;
}

/// Directories considered during discovery, in order. An override pins the
/// search to a single directory; the normal ladder is the working
/// directory, then `~/.config/smsgate/`.
fn search_dirs() -> Vec<PathBuf> {
    if let Some(dir) = CONFIG_DIR_OVERRIDE.lock().unwrap().clone() {
        return vec![dir];
    }
    let mut dirs = vec![PathBuf::from(".")];
    if let Some(base) = directories::BaseDirs::new() {
        dirs.push(base.home_dir().join(".config").join("smsgate"));
    }
    dirs
}

fn find_config_file() -> Option<PathBuf> {
    search_dirs()
        .iter()
        .flat_map(|dir| CONFIG_FILENAMES.iter().map(move |name| dir.join(name)))
        .find(|candidate| candidate.exists())
}

/// Where a new config file would be written: the override directory when
/// set, otherwise the user-global one.
fn default_config_path() -> PathBuf {
    search_dirs()
        .into_iter()
        .next_back()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("smsgate.toml")
}

/// The file `save_config`/`update_config` would touch: an existing
/// discovered file wins over the default location.
pub fn find_or_default_config_path() -> PathBuf {
    find_config_file().unwrap_or_else(default_config_path)
}

/// Read and parse one config file. The format follows the file extension;
/// `${ENV_VAR}` placeholders are substituted before parsing.
pub fn load_config(path: &Path) -> anyhow::Result<SmsGateConfig> {
    let raw = std::fs::read_to_string(path)
        .map_err(|e| anyhow::anyhow!("failed to read {}: {e}", path.display()))?;
    let raw = substitute_env(&raw);
    match path.extension().and_then(|e| e.to_str()).unwrap_or("toml") {
        "toml" => Ok(toml::from_str(&raw)?),
        "yaml" | "yml" => Ok(serde_yaml::from_str(&raw)?),
        "json" => Ok(serde_json::from_str(&raw)?),
        ext => anyhow::bail!("unsupported config format: .{ext}"),
    }
}

/// Load the first discovered config file, falling back to defaults on any
/// failure. A fresh install (no file anywhere) gets a default TOML file
/// seeded so there is something to edit.
pub fn discover_and_load() -> SmsGateConfig {
    let Some(path) = find_config_file() else {
        debug!("no config file found, seeding default");
        let config = SmsGateConfig::default();
        if let Err(e) = write_config(&default_config_path(), &config) {
            warn!(error = %e, "could not write default config file");
        }
        return config;
    };

    debug!(path = %path.display(), "loading config");
    load_config(&path).unwrap_or_else(|e| {
        warn!(path = %path.display(), error = %e, "bad config file, using defaults");
        SmsGateConfig::default()
    })
}

/// Serialize `config` as pretty TOML to the resolved config path.
///
/// Prefer [`update_config`] for read-modify-write cycles.
pub fn save_config(config: &SmsGateConfig) -> anyhow::Result<PathBuf> {
    let _guard = CONFIG_SAVE_LOCK.lock().unwrap();
    let path = find_or_default_config_path();
    write_config(&path, config)?;
    Ok(path)
}

/// Load the current config, apply `f`, and save — all under the save lock
/// so concurrent writers cannot interleave. Returns the path written.
pub fn update_config(f: impl FnOnce(&mut SmsGateConfig)) -> anyhow::Result<PathBuf> {
    let _guard = CONFIG_SAVE_LOCK.lock().unwrap();
    let mut config = discover_and_load();
    f(&mut config);
    let path = find_or_default_config_path();
    write_config(&path, &config)?;
    Ok(path)
}

fn write_config(path: &Path, config: &SmsGateConfig) -> anyhow::Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(path, toml::to_string_pretty(config)?)?;
    debug!(path = %path.display(), "wrote config");
    Ok(())
}

#[cfg(test)]
#[allow(unsafe_code)] // env var mutation is unsafe in edition 2024
mod tests {
    use super::*;
    use crate::schema::ReceiveMethod;

    #[test]
    fn loads_toml() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("smsgate.toml");
        std::fs::write(
            &path,
            "[gateway]\npath = \"/sms\"\nmethod = \"GET\"\nport = 9090\n",
        )
        .unwrap();

        let config = load_config(&path).unwrap();
        assert_eq!(config.gateway.path, "/sms");
        assert_eq!(config.gateway.method, ReceiveMethod::Get);
        assert_eq!(config.gateway.port, 9090);
        // Untouched sections keep defaults.
        assert!(!config.gateway.password.required);
    }

    #[test]
    fn loads_json() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("smsgate.json");
        std::fs::write(
            &path,
            r#"{"gateway": {"password": {"required": true, "value": "secret"}}}"#,
        )
        .unwrap();

        let config = load_config(&path).unwrap();
        assert!(config.gateway.password.required);
        assert_eq!(config.gateway.password.value, "secret");
    }

    #[test]
    fn env_substitution_in_config() {
        unsafe { std::env::set_var("SMSGATE_LOADER_TEST_PW", "s3cret") };
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("smsgate.toml");
        std::fs::write(
            &path,
            "[gateway.password]\nrequired = true\nvalue = \"${SMSGATE_LOADER_TEST_PW}\"\n",
        )
        .unwrap();

        let config = load_config(&path).unwrap();
        assert_eq!(config.gateway.password.value, "s3cret");
        unsafe { std::env::remove_var("SMSGATE_LOADER_TEST_PW") };
    }

    // One test for everything that touches the global override, so
    // parallel test runs never see each other's directories.
    #[test]
    fn override_dir_discovery_seeding_and_update() {
        // Empty dir: discovery falls back to defaults and seeds a file.
        let empty = tempfile::tempdir().unwrap();
        set_config_dir(empty.path().to_path_buf());
        let config = discover_and_load();
        assert_eq!(config.gateway.path, "/send");
        assert!(empty.path().join("smsgate.toml").exists());

        // Dir with a YAML file: discovery picks it up.
        let populated = tempfile::tempdir().unwrap();
        std::fs::write(
            populated.path().join("smsgate.yaml"),
            "gateway:\n  path: /y\n",
        )
        .unwrap();
        set_config_dir(populated.path().to_path_buf());
        let config = discover_and_load();
        assert_eq!(config.gateway.path, "/y");

        // update_config persists through a reload.
        let fresh = tempfile::tempdir().unwrap();
        set_config_dir(fresh.path().to_path_buf());
        let written = update_config(|c| c.gateway.path = "/updated".into()).unwrap();
        assert!(written.starts_with(fresh.path()));
        let config = discover_and_load();
        assert_eq!(config.gateway.path, "/updated");

        clear_config_dir();
    }

    #[test]
    fn rejects_unknown_extension() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("smsgate.ini");
        std::fs::write(&path, "whatever").unwrap();
        assert!(load_config(&path).is_err());
    }

    #[test]
    fn missing_file_is_error() {
        assert!(load_config(Path::new("/nonexistent/smsgate.toml")).is_err());
    }
}
