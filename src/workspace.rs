//! Work group layout on disk.
//!
//! A work group is a directory `<work_root>/<selector>/` holding the ledger, the
//! progress log and the instruction prompt. Creating those files is a setup step
//! outside Wiggum; this module only resolves and discovers them.

use glob::Pattern;
use std::path::{Component, Path, PathBuf};

use crate::config::FilesConfig;
use crate::error::{Result, WiggumError};

/// Resolved paths for one work group
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkPaths {
    pub selector: String,
    pub dir: PathBuf,
    pub ledger: PathBuf,
    pub progress: PathBuf,
    pub prompt: PathBuf,
}

impl WorkPaths {
    /// Resolve the paths for `selector` under `root`
    pub fn resolve(root: &Path, selector: &str, files: &FilesConfig) -> Result<Self> {
        validate_selector(selector)?;

        let dir = root.join(selector);
        Ok(Self {
            selector: selector.to_string(),
            ledger: dir.join(&files.ledger),
            progress: dir.join(&files.progress),
            prompt: dir.join(&files.prompt),
            dir,
        })
    }

    /// Files handed to the agent on every invocation, in the order it receives them
    pub fn context_paths(&self) -> Vec<PathBuf> {
        vec![self.ledger.clone(), self.progress.clone(), self.prompt.clone()]
    }
}

/// A selector must name exactly one directory directly under the work root
fn validate_selector(selector: &str) -> Result<()> {
    let mut components = Path::new(selector).components();
    match (components.next(), components.next()) {
        (Some(Component::Normal(_)), None) if !selector.contains(['/', '\\']) => Ok(()),
        _ => Err(WiggumError::InvalidSelector(selector.to_string())),
    }
}

/// List the selectors under `root` that have a ledger file, sorted by name
pub fn discover_selectors(root: &Path, ledger_file: &str) -> Vec<String> {
    let Some(root_str) = root.to_str() else {
        log::warn!("Work root is not valid UTF-8: {}", root.display());
        return Vec::new();
    };

    let pattern = format!(
        "{}/*/{}",
        Pattern::escape(root_str.trim_end_matches('/')),
        Pattern::escape(ledger_file)
    );

    let entries = match glob::glob(&pattern) {
        Ok(entries) => entries,
        Err(e) => {
            log::warn!("Bad selector pattern {}: {}", pattern, e);
            return Vec::new();
        }
    };

    let mut selectors: Vec<String> = entries
        .filter_map(|entry| entry.ok())
        .filter_map(|ledger| {
            ledger
                .parent()
                .and_then(|dir| dir.file_name())
                .and_then(|name| name.to_str())
                .map(str::to_string)
        })
        .collect();
    selectors.sort();
    selectors.dedup();
    selectors
}
