// release-manager: Multi-Repository Release Coordinator
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

//! Byte-preserving rewrite of `<project>` tags.
//!
//! ```text
//! source:  ..<project name="a/b" revision="warrior" upstream="x"/>..
//!            ^-------------- span of project #n --------------^
//! output:  ..<project name="a/b" revision="mbl-os-0.9"/>..
//! ```
//!
//! Only the spans of edited projects are replaced; everything else is copied
//! verbatim from the source text.

use std::collections::BTreeMap;
use std::path::Path;

use quick_xml::events::{BytesStart, Event};
use quick_xml::{Reader, Writer};

use super::RevisionEdit;
use super::parse::{position, read_attributes};
use crate::error::ManifestError;

/// Apply `edits` (keyed by project ordinal) to `source`.
pub(super) fn rewrite(
    path: &Path,
    source: &str,
    edits: &BTreeMap<usize, RevisionEdit>,
) -> Result<String, ManifestError> {
    let xml_error = |position: u64, message: String| ManifestError::Xml {
        path: path.display().to_string(),
        position,
        message,
    };

    let mut reader = Reader::from_str(source);
    let mut spans: Vec<(usize, usize, String)> = Vec::new();
    let mut depth = 0usize;
    let mut project_index = 0usize;

    loop {
        let start = offset(&reader);
        let event = reader
            .read_event()
            .map_err(|e| xml_error(position(&reader), e.to_string()))?;

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

        if depth == 1 && tag.name().as_ref() == b"project" {
            if let Some(edit) = edits.get(&project_index) {
                let replacement = rebuild(path, tag, opens, edit, position(&reader))?;
                spans.push((start, offset(&reader), replacement));
            }
            project_index += 1;
        }

        if opens {
            depth += 1;
        }
    }

    let mut output = String::with_capacity(source.len());
    let mut cursor = 0;
    for (start, end, replacement) in spans {
        output.push_str(&source[cursor..start]);
        output.push_str(&replacement);
        cursor = end;
    }
    output.push_str(&source[cursor..]);
    Ok(output)
}

fn offset(reader: &Reader<&[u8]>) -> usize {
    usize::try_from(reader.buffer_position()).unwrap_or(usize::MAX)
}

/// Serialize a replacement tag: attribute order kept, `upstream` dropped,
/// `revision` replaced in place, removed, or appended.
fn rebuild(
    path: &Path,
    tag: &BytesStart<'_>,
    opens: bool,
    edit: &RevisionEdit,
    at: u64,
) -> Result<String, ManifestError> {
    let attrs = read_attributes(path, tag, at)?;
    let name = String::from_utf8_lossy(tag.name().as_ref()).into_owned();

    let mut rebuilt = BytesStart::new(name);
    let mut wrote_revision = false;
    for (key, value) in &attrs {
        match key.as_str() {
            "upstream" => {}
            "revision" => {
                if let RevisionEdit::Set(revision) = edit {
                    rebuilt.push_attribute((key.as_str(), revision.as_str()));
                    wrote_revision = true;
                }
            }
            _ => rebuilt.push_attribute((key.as_str(), value.as_str())),
        }
    }
    if let RevisionEdit::Set(revision) = edit
        && !wrote_revision
    {
        rebuilt.push_attribute(("revision", revision.as_str()));
    }

    let event = if opens {
        Event::Start(rebuilt)
    } else {
        Event::Empty(rebuilt)
    };

    let mut writer = Writer::new(Vec::new());
    writer
        .write_event(event)
        .map_err(|e| ManifestError::Xml {
            path: path.display().to_string(),
            position: at,
            message: e.to_string(),
        })?;
    Ok(String::from_utf8_lossy(&writer.into_inner()).into_owned())
}
