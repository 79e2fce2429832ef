//! Documentation source tree scanning services.

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use globset::{Glob, GlobSet, GlobSetBuilder};
use ignore::WalkBuilder;

use crate::domain::errors::ExtractError;
use crate::infra::config::Config;

/// A documentation page discovered under the source root.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageFile {
    pub path: PathBuf,
    /// Root-relative path used for ordering and diagnostics.
    pub display_path: String,
    pub file_name: String,
}

/// Result of scanning a documentation root.
#[derive(Debug, Default)]
pub struct ScanResult {
    pub pages: Vec<PageFile>,
    pub root: PathBuf,
}

/// Configuration inputs for the scanner.
#[derive(Debug, Clone)]
pub struct ScannerConfig {
    pub root: PathBuf,
    pub config: Config,
}

impl ScannerConfig {
    pub fn from_root(root: PathBuf, config: Config) -> Self {
        Self { root, config }
    }
}

/// Walks the source tree and selects documentation pages by filename.
///
/// The walk is serial and the result sorted by display path, so repeated
/// scans of the same tree produce the same page order.
#[derive(Debug, Default)]
pub struct Scanner;

impl Scanner {
    pub fn new() -> Self {
        Self
    }

    pub fn scan(&self, cfg: &ScannerConfig) -> Result<ScanResult> {
        let pages_matcher = build_page_matcher(&cfg.config)?;
        let ignore_matcher = build_ignore_matcher(&cfg.config)?;

        let mut builder = WalkBuilder::new(&cfg.root);
        builder
            .git_ignore(false)
            .hidden(!cfg.config.defaults.show_hidden);

        let root = cfg.root.clone();
        builder.filter_entry(move |entry| {
            if entry.depth() == 0 {
                return true;
            }
            let rel = entry.path().strip_prefix(&root).unwrap_or(entry.path());
            !ignore_matcher.should_skip(rel)
        });

        let mut pages = Vec::new();
        for result in builder.build() {
            let entry = match result {
                Ok(entry) => entry,
                Err(err) => {
                    tracing::warn!(error = %err, "scanner error");
                    continue;
                }
            };

            if !entry.file_type().is_some_and(|ty| ty.is_file()) {
                continue;
            }

            let file_name = entry.file_name().to_string_lossy().into_owned();
            if !pages_matcher.is_page(&file_name) {
                continue;
            }

            pages.push(PageFile {
                path: entry.path().to_path_buf(),
                display_path: to_display_path(&cfg.root, entry.path()),
                file_name,
            });
        }

        pages.sort_by(|a, b| a.display_path.cmp(&b.display_path));

        if pages.is_empty() {
            return Err(ExtractError::NoPagesFound {
                root: cfg.root.clone(),
            }
            .into());
        }

        Ok(ScanResult {
            pages,
            root: cfg.root.clone(),
        })
    }
}

fn to_display_path(root: &Path, path: &Path) -> String {
    path.strip_prefix(root)
        .unwrap_or(path)
        .display()
        .to_string()
}

/// Matches filenames against the configured page globs and extra pages.
#[derive(Debug)]
struct PageMatcher {
    globs: GlobSet,
    extra: BTreeSet<String>,
}

impl PageMatcher {
    fn is_page(&self, file_name: &str) -> bool {
        self.globs.is_match(file_name) || self.extra.contains(file_name)
    }
}

fn build_page_matcher(config: &Config) -> Result<PageMatcher> {
    let mut builder = GlobSetBuilder::new();
    for pattern in &config.pages.globs {
        let glob = Glob::new(pattern).context("invalid page glob")?;
        builder.add(glob);
    }
    let globs = builder.build().context("failed to build page matcher")?;

    Ok(PageMatcher {
        globs,
        extra: config.pages.extra.iter().cloned().collect(),
    })
}

#[derive(Debug, Clone)]
struct IgnoreMatcher {
    globs: Option<GlobSet>,
}

impl IgnoreMatcher {
    fn should_skip(&self, rel: &Path) -> bool {
        self.globs.as_ref().is_some_and(|set| set.is_match(rel))
    }
}

fn build_ignore_matcher(config: &Config) -> Result<IgnoreMatcher> {
    let mut builder = GlobSetBuilder::new();

    for pattern in &config.ignore.paths {
        for expanded in expand_dir_pattern(pattern) {
            let glob = Glob::new(&expanded).context("invalid ignore path pattern")?;
            builder.add(glob);
        }
    }

    for glob in &config.ignore.globs {
        let glob = Glob::new(glob).context("invalid ignore glob")?;
        builder.add(glob);
    }

    let globs = builder.build().context("failed to build ignore matcher")?;

    Ok(IgnoreMatcher { globs: Some(globs) })
}

fn expand_dir_pattern(raw: &str) -> Vec<String> {
    let trimmed = raw.trim().trim_matches('/');
    if trimmed.is_empty() {
        return Vec::new();
    }
    vec![
        trimmed.to_owned(),
        format!("{trimmed}/**"),
        format!("**/{trimmed}"),
        format!("**/{trimmed}/**"),
    ]
}
