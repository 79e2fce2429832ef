//! Configuration management utilities.

use std::collections::BTreeSet;
use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use dirs_next::config_dir;
use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};

static DEFAULT_CONFIG: Lazy<&'static str> =
    Lazy::new(|| include_str!("../../assets/default-config.toml"));
static DEFAULT_WORKSPACE_CONFIG_PATH: &str = ".cfn-propgen/config.toml";

/// Layered configuration loaded from defaults, user, workspace, and env.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub defaults: Defaults,
    #[serde(default)]
    pub pages: Pages,
    #[serde(default)]
    pub ignore: Ignore,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Defaults {
    #[serde(default = "Defaults::default_format")]
    pub format: String,
    #[serde(default)]
    pub show_hidden: bool,
}

impl Defaults {
    fn default_format() -> String {
        "json".into()
    }
}

impl Default for Defaults {
    fn default() -> Self {
        Self {
            format: Self::default_format(),
            show_hidden: false,
        }
    }
}

/// Selection rules for documentation pages under the source root.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pages {
    /// Filename globs identifying resource documentation pages.
    #[serde(default = "Pages::default_globs")]
    pub globs: Vec<String>,
    /// Exact filenames included even when no glob matches.
    #[serde(default = "Pages::default_extra")]
    pub extra: Vec<String>,
}

impl Pages {
    fn default_globs() -> Vec<String> {
        vec!["aws-resource-*.md".into()]
    }

    // The S3 bucket page lives under aws-properties-* in the upstream docs.
    fn default_extra() -> Vec<String> {
        vec!["aws-properties-s3-bucket.md".into()]
    }
}

impl Default for Pages {
    fn default() -> Self {
        Self {
            globs: Self::default_globs(),
            extra: Self::default_extra(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Ignore {
    #[serde(default)]
    pub paths: Vec<String>,
    #[serde(default)]
    pub globs: Vec<String>,
}

impl Default for Ignore {
    fn default() -> Self {
        Self {
            paths: vec![".git/".into()],
            globs: Vec::new(),
        }
    }
}

/// Environment overrides for critical settings.
#[derive(Debug, Default, Clone)]
pub struct EnvOverrides {
    format: Option<String>,
    page_glob: Option<String>,
}

impl EnvOverrides {
    fn from_env() -> Self {
        Self {
            format: env::var("CFN_PROPGEN_FORMAT").ok(),
            page_glob: env::var("CFN_PROPGEN_PAGE_GLOB").ok(),
        }
    }

    #[cfg(test)]
    fn for_tests(format: &str, page_glob: &str) -> Self {
        Self {
            format: Some(format.to_owned()),
            page_glob: Some(page_glob.to_owned()),
        }
    }
}

impl Config {
    /// Load configuration from defaults, user/global config, workspace config, and env overrides.
    pub fn load() -> Result<Self> {
        let env = EnvOverrides::from_env();
        let global = global_config_path();
        let workspace = workspace_config_path()?;
        Self::load_with_layers(global, workspace, env)
    }

    fn load_with_layers(
        global: Option<PathBuf>,
        workspace: Option<PathBuf>,
        env_overrides: EnvOverrides,
    ) -> Result<Self> {
        let mut layers: Vec<Config> = Vec::new();

        layers.push(Self::from_str(&DEFAULT_CONFIG)?);

        if let Some(global_path) = global.filter(|path| path.exists()) {
            layers.push(Self::from_file(&global_path)?);
        }

        if let Some(workspace_path) = workspace.filter(|path| path.exists()) {
            layers.push(Self::from_file(&workspace_path)?);
        }

        let merged = layers.into_iter().reduce(Config::merge).unwrap_or_default();
        Ok(apply_env_overrides(merged, env_overrides))
    }

    fn from_file(path: &Path) -> Result<Self> {
        let data = fs::read_to_string(path)
            .with_context(|| format!("failed to read config file: {}", path.display()))?;
        Self::from_str(&data)
    }

    fn from_str(contents: &str) -> Result<Self> {
        let config: Config =
            toml::from_str(contents).with_context(|| "failed to parse TOML config".to_string())?;
        Ok(config)
    }

    fn merge(self, other: Self) -> Self {
        Self {
            defaults: merge_defaults(self.defaults, other.defaults),
            pages: merge_pages(self.pages, other.pages),
            ignore: merge_ignore(self.ignore, other.ignore),
        }
    }
}

fn merge_defaults(base: Defaults, overlay: Defaults) -> Defaults {
    Defaults {
        format: if overlay.format != Defaults::default_format() {
            overlay.format
        } else {
            base.format
        },
        show_hidden: overlay.show_hidden || base.show_hidden,
    }
}

fn merge_pages(base: Pages, overlay: Pages) -> Pages {
    Pages {
        globs: if overlay.globs != Pages::default_globs() {
            overlay.globs
        } else {
            base.globs
        },
        extra: if overlay.extra != Pages::default_extra() {
            overlay.extra
        } else {
            base.extra
        },
    }
}

fn merge_ignore(base: Ignore, overlay: Ignore) -> Ignore {
    let mut paths: BTreeSet<String> = base.paths.into_iter().collect();
    paths.extend(overlay.paths);

    let mut globs: BTreeSet<String> = base.globs.into_iter().collect();
    globs.extend(overlay.globs);

    Ignore {
        paths: paths.into_iter().collect(),
        globs: globs.into_iter().collect(),
    }
}

fn global_config_path() -> Option<PathBuf> {
    config_dir().map(|base| base.join("cfn-propgen/config.toml"))
}

fn workspace_config_path() -> Result<Option<PathBuf>> {
    let cwd = env::current_dir()?;
    let root = find_repo_root(&cwd).unwrap_or(cwd);
    Ok(Some(root.join(DEFAULT_WORKSPACE_CONFIG_PATH)))
}

fn find_repo_root(start: &Path) -> Option<PathBuf> {
    let mut current = start;
    loop {
        if current.join(".git").exists() {
            return Some(current.to_path_buf());
        }
        match current.parent() {
            Some(parent) => current = parent,
            None => return None,
        }
    }
}

fn apply_env_overrides(mut config: Config, env: EnvOverrides) -> Config {
    if let Some(format) = env.format {
        config.defaults.format = format;
    }
    if let Some(glob) = env.page_glob {
        if !config.pages.globs.contains(&glob) {
            config.pages.globs.push(glob);
        }
    }
    config
}
