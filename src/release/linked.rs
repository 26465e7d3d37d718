// release-manager: Multi-Repository Release Coordinator
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

//! Linked-repository configuration rewrite.
//!
//! Each linked repository is described by a URL line followed by a SRCREV
//! line:
//!
//! ```text
//! MBL_X_URI = "git://git@github.com/armmbed/mbl-x.git;protocol=ssh;branch=warrior;"
//! MBL_X_SRCREV = "0123456789abcdef0123456789abcdef01234567"
//!                            |
//!   branch=<new branch>      v   "<new commit>"
//! ```

use std::path::Path;

use regex::Regex;

use crate::error::{FsError, Result};
use crate::manifest::backup_path;

/// New state of one external repository.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LinkedPin {
    pub repo: String,
    pub branch: String,
    pub commit: String,
}

/// Rewrite configuration text. Returns `None` if nothing changed.
///
/// # Errors
///
/// Returns `FsError::BadFormat` if the line after a matching URL line does
/// not hold exactly one quoted value.
pub fn rewrite_conf(text: &str, path: &Path, host: &str, pins: &[LinkedPin]) -> Result<Option<String>> {
    let branch_re = Regex::new(r";branch=[^;]*;")?;
    let quoted_re = Regex::new(r#""[^"]*""#)?;

    // The repository name must end at the URL boundary, so `org/foo` never
    // matches `org/foo-tools`.
    let needles = pins
        .iter()
        .map(|pin| {
            let url = regex::escape(&format!("{host}/{}", pin.repo));
            Regex::new(&format!(r#"(?i){url}(?:\.git)?(?:[;"\s]|$)"#))
        })
        .collect::<std::result::Result<Vec<_>, _>>()?;

    let mut output = String::with_capacity(text.len());
    let mut pending: Option<&LinkedPin> = None;

    for (index, line) in text.split_inclusive('\n').enumerate() {
        if let Some(pin) = pending.take() {
            if line.matches('"').count() != 2 {
                return Err(FsError::BadFormat {
                    path: path.display().to_string(),
                    line: index + 1,
                    content: line.trim_end().to_string(),
                }
                .into());
            }
            let replacement = format!("\"{}\"", pin.commit);
            output.push_str(&quoted_re.replace(line, regex::NoExpand(&replacement)));
            continue;
        }

        if let Some(pin) = needles
            .iter()
            .position(|needle| needle.is_match(line))
            .map(|i| &pins[i])
        {
            let replacement = format!(";branch={};", pin.branch);
            output.push_str(&branch_re.replace_all(line, regex::NoExpand(&replacement)));
            pending = Some(pin);
            continue;
        }

        output.push_str(line);
    }

    if let Some(pin) = pending {
        return Err(FsError::BadFormat {
            path: path.display().to_string(),
            line: text.lines().count(),
            content: format!("missing SRCREV line for {}", pin.repo),
        }
        .into());
    }

    Ok((output != text).then_some(output))
}

/// Result of updating one configuration file on disk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfUpdate {
    pub backup: std::path::PathBuf,
    pub changed: bool,
}

/// Back up `file`, then rewrite it in place.
///
/// # Errors
///
/// Returns an `FsError` if the file is missing or cannot be written, or if
/// its format is not recognised.
pub fn update_conf_file(file: &Path, host: &str, pins: &[LinkedPin], backup_suffix: &str) -> Result<ConfUpdate> {
    if !file.is_file() {
        return Err(FsError::NotFound(file.display().to_string()).into());
    }
    let text = std::fs::read_to_string(file).map_err(|e| FsError::io(file, e))?;
    let backup = backup_path(file, backup_suffix);
    std::fs::copy(file, &backup).map_err(|e| FsError::io(&backup, e))?;

    let rewritten = rewrite_conf(&text, file, host, pins)?;
    let changed = rewritten.is_some();
    if let Some(new_text) = rewritten {
        std::fs::write(file, new_text).map_err(|e| FsError::io(file, e))?;
    }
    Ok(ConfUpdate { backup, changed })
}
