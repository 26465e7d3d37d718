// release-manager: Multi-Repository Release Coordinator
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

//! Streaming read of one manifest document.
//!
//! Only direct children of the root element are considered:
//!
//! ```text
//! <manifest>
//!   <remote  name=".." fetch=".."/>         -> remotes
//!   <default revision=".." remote=".."/>    -> default revision / remote
//!   <project name=".." remote=".." revision=".."> .. </project>
//! </manifest>
//! ```

use std::collections::BTreeMap;
use std::path::Path;

use quick_xml::Reader;
use quick_xml::events::{BytesStart, Event};

use super::{ManifestDocument, ManifestProject};
use crate::config::types::RemoteConfig;
use crate::error::ManifestError;
use crate::git::repo::RepoName;

/// Attributes of one tag, in document order, unescaped.
pub(super) type Attributes = Vec<(String, String)>;

pub(super) fn attribute<'a>(attrs: &'a Attributes, key: &str) -> Option<&'a str> {
    attrs
        .iter()
        .find(|(k, _)| k == key)
        .map(|(_, v)| v.as_str())
}

pub(super) fn read_attributes(
    path: &Path,
    tag: &BytesStart<'_>,
    position: u64,
) -> Result<Attributes, ManifestError> {
    let xml_error = |message: String| ManifestError::Xml {
        path: path.display().to_string(),
        position,
        message,
    };

    let mut attrs = Vec::new();
    for attr in tag.attributes() {
        let attr = attr.map_err(|e| xml_error(e.to_string()))?;
        let key = String::from_utf8_lossy(attr.key.as_ref()).into_owned();
        let value = attr
            .unescape_value()
            .map_err(|e| xml_error(e.to_string()))?
            .into_owned();
        attrs.push((key, value));
    }
    Ok(attrs)
}

pub(super) fn position(reader: &Reader<&[u8]>) -> u64 {
    u64::try_from(reader.buffer_position()).unwrap_or(u64::MAX)
}

struct RawProject {
    index: usize,
    attrs: Attributes,
}

/// Parse `text` read from `path` into a document identified by `id`.
pub(super) fn parse_document(
    path: &Path,
    id: &str,
    text: &str,
    remote_config: &RemoteConfig,
    fallback_revision: &str,
) -> Result<ManifestDocument, ManifestError> {
    let display = path.display().to_string();
    let mut reader = Reader::from_str(text);

    let mut depth = 0usize;
    let mut default_revision: Option<String> = None;
    let mut default_remote: Option<String> = None;
    let mut remotes = BTreeMap::new();
    let mut raw_projects = Vec::new();

    loop {
        let event = reader.read_event().map_err(|e| ManifestError::Xml {
            path: display.clone(),
            position: position(&reader),
            message: e.to_string(),
        })?;

        let (tag, opens) = match &event {
            Event::Start(tag) => (tag, true),
            Event::Empty(tag) => (tag, false),
            Event::End(_) => {
                depth = depth.saturating_sub(1);
                continue;
            }
            Event::Eof => break,
            _ => continue,
        };

        if depth == 1 {
            let attrs = read_attributes(path, tag, position(&reader))?;
            match tag.name().as_ref() {
                b"default" => {
                    default_revision = attribute(&attrs, "revision").map(str::to_string);
                    default_remote = attribute(&attrs, "remote").map(str::to_string);
                }
                b"remote" => {
                    let name = required(&display, "remote", &attrs, "name")?;
                    let fetch = required(&display, "remote", &attrs, "fetch")?;
                    remotes.insert(name.to_string(), fetch.to_string());
                }
                b"project" => raw_projects.push(RawProject {
                    index: raw_projects.len(),
                    attrs,
                }),
                _ => {}
            }
        }

        if opens {
            depth += 1;
        }
    }

    let default_revision = default_revision.unwrap_or_else(|| fallback_revision.to_string());

    let mut projects = BTreeMap::new();
    let mut short_names = std::collections::HashSet::new();
    for raw in raw_projects {
        let full = required(&display, "project", &raw.attrs, "name")?;
        let name = RepoName::parse(full).ok_or_else(|| ManifestError::MalformedName {
            path: display.clone(),
            name: full.to_string(),
        })?;

        if !short_names.insert(name.short().to_string()) {
            return Err(ManifestError::DuplicateProject {
                path: display,
                short_name: name.short().to_string(),
            });
        }

        let remote = attribute(&raw.attrs, "remote")
            .or(default_remote.as_deref())
            .ok_or_else(|| ManifestError::MissingAttribute {
                path: display.clone(),
                element: "project",
                attribute: "remote",
            })?;
        let fetch = remotes
            .get(remote)
            .ok_or_else(|| ManifestError::UnknownRemote {
                path: display.clone(),
                project: name.full().to_string(),
                remote: remote.to_string(),
            })?;

        let explicit = attribute(&raw.attrs, "revision").filter(|r| !r.is_empty());
        let project = ManifestProject {
            url: remote_config.url_for(fetch, name.full()),
            managed: remote_config.is_managed(name.prefix(), remote),
            remote: remote.to_string(),
            fetch: fetch.clone(),
            revision: explicit.unwrap_or(default_revision.as_str()).to_string(),
            explicit_revision: explicit.is_some(),
            index: raw.index,
            name,
        };
        projects.insert(project.name.full().to_string(), project);
    }

    Ok(ManifestDocument {
        id: id.to_string(),
        path: path.to_path_buf(),
        default_revision,
        remotes,
        projects,
        source: text.to_string(),
        edits: BTreeMap::new(),
    })
}

fn required<'a>(
    path: &str,
    element: &'static str,
    attrs: &'a Attributes,
    key: &'static str,
) -> Result<&'a str, ManifestError> {
    attribute(attrs, key).ok_or_else(|| ManifestError::MissingAttribute {
        path: path.to_string(),
        element,
        attribute: key,
    })
}
