//! File-backed conversation history
//!
//! Each conversation is one JSONL record named after its percent-encoded
//! identifier: a metadata line followed by one line per turn. Records are replaced
//! atomically on save. Several processes writing the same directory is
//! unsupported; the last writer wins.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

use super::turn::{Conversation, ConversationSummary, Turn, DEFAULT_TITLE};
use crate::{Error, Result};

const RECORD_EXTENSION: &str = "jsonl";
const TEMP_EXTENSION: &str = "jsonl.tmp";
const METADATA_TYPE: &str = "metadata";

/// First line of every record
#[derive(Debug, Serialize, Deserialize)]
struct RecordHeader {
    #[serde(rename = "_type")]
    kind: String,
    id: String,
    title: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

/// Directory-backed store holding one record per conversation
#[derive(Debug, Clone)]
pub struct ConversationStore {
    dir: PathBuf,
}

impl ConversationStore {
    /// Create a store rooted at `dir`. The directory is created on first save.
    pub fn new<P: AsRef<Path>>(dir: P) -> Self {
        Self {
            dir: dir.as_ref().to_path_buf(),
        }
    }

    /// History directory
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Write the full conversation, replacing any record with the same id.
    ///
    /// The creation time of an existing record is kept.
    pub fn save(&self, conversation: &Conversation) -> Result<()> {
        let write_failure = |source: io::Error| Error::WriteFailure {
            id: conversation.id.clone(),
            source,
        };

        let path = self
            .record_path(&conversation.id)
            .ok_or_else(|| Error::InvalidId(conversation.id.clone()))?;
        std::fs::create_dir_all(&self.dir).map_err(write_failure)?;

        let created_at = read_header(&path)
            .map(|header| header.created_at)
            .unwrap_or(conversation.created_at);

        let header = RecordHeader {
            kind: METADATA_TYPE.to_string(),
            id: conversation.id.clone(),
            title: conversation.title(),
            created_at,
            updated_at: conversation.updated_at,
        };

        let mut content = serde_json::to_string(&header)?;
        content.push('\n');
        for turn in conversation.turns() {
            content.push_str(&serde_json::to_string(turn)?);
            content.push('\n');
        }

        write_atomic(&path, content.as_bytes()).map_err(write_failure)?;
        debug!(
            "Saved conversation {} ({} turns) to {}",
            conversation.id,
            conversation.len(),
            path.display()
        );
        Ok(())
    }

    /// Load a full conversation.
    ///
    /// Fails with [`Error::NotFound`] when no record exists and with
    /// [`Error::CorruptRecord`] when the record cannot be parsed.
    pub fn load(&self, id: &str) -> Result<Conversation> {
        let path = self
            .record_path(id)
            .ok_or_else(|| Error::NotFound(id.to_string()))?;
        let content = match std::fs::read_to_string(&path) {
            Ok(content) => content,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                return Err(Error::NotFound(id.to_string()));
            }
            Err(e) => return Err(Error::Io(e)),
        };

        let conversation = parse_record(&path, &content)?;
        if conversation.id != id {
            // Record was renamed or copied by hand.
            return Err(Error::NotFound(id.to_string()));
        }
        Ok(conversation)
    }

    /// Summaries of all readable records, most recently updated first.
    ///
    /// Corrupt records are skipped with a warning.
    pub fn list(&self) -> impl Iterator<Item = ConversationSummary> {
        let mut summaries = Vec::new();

        let entries = match std::fs::read_dir(&self.dir) {
            Ok(entries) => entries,
            Err(e) => {
                if e.kind() != io::ErrorKind::NotFound {
                    warn!("Failed to read history directory {}: {}", self.dir.display(), e);
                }
                return summaries.into_iter();
            }
        };

        for entry in entries.flatten() {
            let path = entry.path();
            if !is_record_file(&path) {
                continue;
            }

            let parsed = std::fs::read_to_string(&path)
                .map_err(Error::Io)
                .and_then(|content| parse_record(&path, &content));

            match parsed {
                Ok(conversation) => summaries.push(conversation.summary()),
                Err(e) => warn!("Skipping conversation record {}: {}", path.display(), e),
            }
        }

        summaries.sort_by(|a, b| {
            b.updated_at
                .cmp(&a.updated_at)
                .then_with(|| a.id.cmp(&b.id))
        });
        summaries.into_iter()
    }

    /// Remove a record. Succeeds when it is already absent and reports
    /// whether anything was removed.
    ///
    /// A file whose header names another conversation is left in place.
    pub fn delete(&self, id: &str) -> Result<bool> {
        let Some(path) = self.record_path(id) else {
            return Ok(false);
        };
        if let Some(header) = read_header(&path) {
            if header.id != id {
                warn!(
                    "Not deleting {}: record belongs to conversation {}",
                    path.display(),
                    header.id
                );
                return Ok(false);
            }
        }

        match std::fs::remove_file(&path) {
            Ok(()) => {
                debug!("Deleted conversation {}", id);
                Ok(true)
            }
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(false),
            Err(source) => Err(Error::WriteFailure {
                id: id.to_string(),
                source,
            }),
        }
    }

    /// Whether a record exists for the identifier
    pub fn exists(&self, id: &str) -> bool {
        self.record_path(id).is_some_and(|path| path.is_file())
    }

    /// Record file for an identifier; `None` for the empty identifier.
    ///
    /// Percent-encoding keeps distinct identifiers on distinct files and
    /// leaves no path separators in the stem.
    fn record_path(&self, id: &str) -> Option<PathBuf> {
        if id.is_empty() {
            return None;
        }
        Some(
            self.dir
                .join(format!("{}.{}", urlencoding::encode(id), RECORD_EXTENSION)),
        )
    }
}

fn is_record_file(path: &Path) -> bool {
    path.is_file()
        && path
            .extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| ext == RECORD_EXTENSION)
}

/// Write to a sibling temp file, flush it, then rename over the target
fn write_atomic(path: &Path, bytes: &[u8]) -> io::Result<()> {
    let tmp_path = path.with_extension(TEMP_EXTENSION);

    let result = (|| {
        let mut tmp_file = File::create(&tmp_path)?;
        tmp_file.write_all(bytes)?;
        tmp_file.sync_all()?;
        drop(tmp_file);
        std::fs::rename(&tmp_path, path)
    })();

    if result.is_err() {
        let _ = std::fs::remove_file(&tmp_path);
    }
    result
}

fn read_header(path: &Path) -> Option<RecordHeader> {
    let content = std::fs::read_to_string(path).ok()?;
    let first_line = content.lines().find(|line| !line.trim().is_empty())?;
    serde_json::from_str::<RecordHeader>(first_line)
        .ok()
        .filter(|header| header.kind == METADATA_TYPE)
}

fn parse_record(path: &Path, content: &str) -> Result<Conversation> {
    let corrupt = |reason: String| Error::CorruptRecord {
        path: path.to_path_buf(),
        reason,
    };

    let mut lines = content
        .lines()
        .enumerate()
        .filter(|(_, line)| !line.trim().is_empty());

    let (_, first_line) = lines
        .next()
        .ok_or_else(|| corrupt("empty record".to_string()))?;
    let header: RecordHeader = serde_json::from_str(first_line)
        .map_err(|e| corrupt(format!("invalid metadata line: {}", e)))?;
    if header.kind != METADATA_TYPE {
        return Err(corrupt(format!("unexpected record type '{}'", header.kind)));
    }

    let mut turns = Vec::new();
    for (index, line) in lines {
        let turn: Turn = serde_json::from_str(line)
            .map_err(|e| corrupt(format!("invalid turn on line {}: {}", index + 1, e)))?;
        turns.push(turn);
    }

    let title = Some(header.title).filter(|title| title != DEFAULT_TITLE);
    Ok(Conversation::restore(
        header.id,
        title,
        header.created_at,
        header.updated_at,
        turns,
    ))
}
