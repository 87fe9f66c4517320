use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::env;
use std::io::IsTerminal;
use std::path::{Path, PathBuf};

pub const PROJECT_CONFIG_PATH: &str = ".storysync/config.toml";

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProjectConfig {
    #[serde(default)]
    pub dedupe: DedupeConfig,
    #[serde(default)]
    pub labels: LabelsConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DedupeConfig {
    /// Drop duplicate stories before grouping them by issue.
    #[serde(default = "default_true")]
    pub enabled: bool,
}

impl Default for DedupeConfig {
    fn default() -> Self {
        Self {
            enabled: default_true(),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LabelsConfig {
    /// Report stories that are not linked to any issue.
    #[serde(default)]
    pub include_unlinked: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct UserConfig {
    #[serde(default)]
    pub output: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EffectiveConfig {
    pub project: ProjectConfig,
    pub user: UserConfig,
    pub resolved_output: String,
}

/// Load project config from `path`, or from `.storysync/config.toml` under
/// `project_root` when no explicit path is given.
///
/// A missing default file yields defaults; a missing explicit file is an error.
///
/// # Errors
///
/// Fails when the file cannot be read or is not valid TOML for [`ProjectConfig`].
pub fn load_project_config(project_root: &Path, path: Option<&Path>) -> Result<ProjectConfig> {
    let path = match path {
        Some(explicit) => explicit.to_path_buf(),
        None => {
            let default_path = project_root.join(PROJECT_CONFIG_PATH);
            if !default_path.exists() {
                return Ok(ProjectConfig::default());
            }
            default_path
        }
    };

    let content = std::fs::read_to_string(&path)
        .with_context(|| format!("Failed to read {}", path.display()))?;

    toml::from_str::<ProjectConfig>(&content)
        .with_context(|| format!("Failed to parse {}", path.display()))
}

fn user_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("storysync/config.toml"))
}

/// Load `<config_dir>/storysync/config.toml`, or defaults when absent.
///
/// # Errors
///
/// Fails when the file exists but cannot be read or parsed.
pub fn load_user_config() -> Result<UserConfig> {
    let Some(path) = user_config_path() else {
        return Ok(UserConfig::default());
    };

    if !path.exists() {
        return Ok(UserConfig::default());
    }

    let content = std::fs::read_to_string(&path)
        .with_context(|| format!("Failed to read {}", path.display()))?;

    toml::from_str::<UserConfig>(&content)
        .with_context(|| format!("Failed to parse {}", path.display()))
}

/// Resolve project and user config plus the output mode name.
///
/// # Errors
///
/// Propagates config load failures.
pub fn resolve_config(
    project_root: &Path,
    config_path: Option<&Path>,
    cli_json: bool,
) -> Result<EffectiveConfig> {
    let project = load_project_config(project_root, config_path)?;
    let user = load_user_config()?;

    let env_format = env::var("FORMAT").ok();
    let resolved_output = resolve_output(
        cli_json,
        user.output.clone(),
        env_format,
        std::io::stdout().is_terminal(),
    );

    Ok(EffectiveConfig {
        project,
        user,
        resolved_output,
    })
}

fn resolve_output(
    cli_json: bool,
    user_output: Option<String>,
    env_format: Option<String>,
    is_tty: bool,
) -> String {
    fn normalize_output_mode(raw: &str) -> Option<&'static str> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "pretty" | "human" => Some("pretty"),
            "text" | "table" => Some("text"),
            "json" => Some("json"),
            _ => None,
        }
    }

    if cli_json {
        return "json".to_string();
    }

    if let Some(mode) = env_format.as_deref().and_then(normalize_output_mode) {
        return mode.to_string();
    }

    if let Some(mode) = user_output.as_deref().and_then(normalize_output_mode) {
        return mode.to_string();
    }

    if is_tty {
        "pretty".to_string()
    } else {
        "text".to_string()
    }
}

const fn default_true() -> bool {
    true
}
