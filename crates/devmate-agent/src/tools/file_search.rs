// SPDX-FileCopyrightText: 2026 DevMate Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! File search tool: case-insensitive substring match under the configured
//! files root.
//!
//! The walk runs on a blocking thread with a timeout; unreadable
//! directories and symlinks are skipped.

use std::path::{Path, PathBuf};
use std::time::Duration;

use async_trait::async_trait;

use devmate_core::DevmateError;

use crate::tool::{Tool, ToolOutput};

/// Searches the files root for a file by name or partial name.
pub struct SearchFileTool {
    root: PathBuf,
    timeout: Duration,
}

impl SearchFileTool {
    /// Create a search tool over `root` with the given walk timeout.
    pub fn new(root: impl Into<PathBuf>, timeout: Duration) -> Self {
        Self {
            root: root.into(),
            timeout,
        }
    }
}

#[async_trait]
impl Tool for SearchFileTool {
    fn name(&self) -> &str {
        "search_file"
    }

    fn description(&self) -> &str {
        "Search the user's computer for a file by name or partial name. \
         Returns the full file path if found."
    }

    fn parameters_schema(&self) -> serde_json::Value {
        serde_json::json!({
            "type": "object",
            "properties": {
                "filename": {
                    "type": "string",
                    "description": "The name or partial name of the file to find"
                }
            },
            "required": ["filename"]
        })
    }

    async fn invoke(&self, input: serde_json::Value) -> Result<ToolOutput, DevmateError> {
        let Some(filename) = input["filename"].as_str() else {
            return Ok(ToolOutput::error("missing required 'filename' parameter"));
        };

        let root = self.root.clone();
        let needle = filename.to_ascii_lowercase();
        let walk = tokio::task::spawn_blocking(move || walk_matching(&root, &needle));

        let matches = match tokio::time::timeout(self.timeout, walk).await {
            Ok(Ok(matches)) => matches,
            Ok(Err(e)) => {
                return Ok(ToolOutput::error(format!("Error searching for file: {e}")));
            }
            Err(_) => {
                return Ok(ToolOutput::error(
                    "File search timed out. Try a more specific filename.",
                ));
            }
        };

        if matches.is_empty() {
            return Ok(ToolOutput::ok(format!(
                "No file matching '{}' found under {}.",
                filename,
                self.root.display()
            )));
        }

        let best_match = &matches[0];
        if matches.len() > 1 {
            let all: Vec<String> = matches.iter().map(|p| p.display().to_string()).collect();
            return Ok(ToolOutput::ok(format!(
                "Found {} matches. Using: {}\nAll matches:\n{}",
                matches.len(),
                best_match.display(),
                all.join("\n")
            )));
        }

        Ok(ToolOutput::ok(format!("Found file: {}", best_match.display())))
    }
}

/// Collect regular files under `root` whose name contains `needle`
/// (lowercased). Sorted for stable "best match" selection.
fn walk_matching(root: &Path, needle: &str) -> Vec<PathBuf> {
    let mut matches = Vec::new();
    let mut stack = vec![root.to_path_buf()];

    while let Some(dir) = stack.pop() {
        let Ok(entries) = std::fs::read_dir(&dir) else {
            continue;
        };
        for entry in entries.flatten() {
            let Ok(file_type) = entry.file_type() else {
                continue;
            };
            // Symlinks are skipped entirely: they can cycle.
            if file_type.is_symlink() {
                continue;
            }
            let path = entry.path();
            if file_type.is_dir() {
                stack.push(path);
            } else if file_type.is_file() {
                let name = entry.file_name();
                if name.to_string_lossy().to_ascii_lowercase().contains(needle) {
                    matches.push(path);
                }
            }
        }
    }

    matches.sort();
    matches
}
