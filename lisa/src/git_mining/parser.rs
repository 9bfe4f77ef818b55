//! Git output parsing for tree listings and commit logs.

use super::MiningError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Separator between fields of one log record (ASCII Unit Separator).
pub const FIELD_SEPARATOR: char = '\u{1f}';
/// Separator between log records (ASCII Record Separator).
pub const COMMIT_SEPARATOR: char = '\u{1e}';

/// Git log format for [`CommitSummary`] records.
pub const LOG_FORMAT: &str = concat!(
    "%H", "%x1f", // hash
    "%aI", "%x1f", // author date (strict ISO 8601)
    "%s", "%x1f", // subject
    "%b", // body
    "%x1e"  // commit separator
);

/// Kind of object named by a tree entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ObjectType {
    Commit,
    Blob,
    Tree,
}

impl FromStr for ObjectType {
    type Err = MiningError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "commit" => Ok(ObjectType::Commit),
            "blob" => Ok(ObjectType::Blob),
            "tree" => Ok(ObjectType::Tree),
            other => Err(MiningError::malformed(format!(
                "unknown object type {:?}",
                other
            ))),
        }
    }
}

impl fmt::Display for ObjectType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ObjectType::Commit => "commit",
            ObjectType::Blob => "blob",
            ObjectType::Tree => "tree",
        };
        f.write_str(s)
    }
}

/// One entry of `git ls-tree` output.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TreeItem {
    pub mode: String,
    pub object_type: ObjectType,
    pub object_name: String,
    pub path: String,
}

/// Summary of one commit as recorded in the catalog metadata.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommitSummary {
    pub hash: String,
    pub date: String,
    pub message: String,
    pub body: String,
}

/// Parse a single `<mode> SP <type> SP <object>\t<path>` record.
///
/// The path is taken verbatim after the first tab and may contain spaces or
/// further tabs.
pub fn parse_tree_line(line: &str) -> Result<TreeItem, MiningError> {
    let (metadata, path) = line.split_once('\t').ok_or_else(|| {
        MiningError::malformed(format!("no tab separator in tree record {:?}", line))
    })?;

    let fields: Vec<&str> = metadata.split(' ').collect();
    let [mode, object_type, object_name] = fields.as_slice() else {
        return Err(MiningError::malformed(format!(
            "expected 3 metadata fields in tree record {:?}",
            line
        )));
    };

    Ok(TreeItem {
        mode: mode.to_string(),
        object_type: object_type.parse()?,
        object_name: object_name.to_string(),
        path: path.to_string(),
    })
}

/// Parse NUL-terminated `git ls-tree -z` output.
///
/// Any malformed record fails the whole listing.
pub fn parse_tree_output(output: &str) -> Result<Vec<TreeItem>, MiningError> {
    let output = output.strip_suffix('\0').unwrap_or(output);
    if output.is_empty() {
        return Ok(Vec::new());
    }
    output.split('\0').map(parse_tree_line).collect()
}

/// Parse git log output produced with [`LOG_FORMAT`].
pub fn parse_log_output(output: &str) -> Result<Vec<CommitSummary>, MiningError> {
    let mut commits = Vec::new();

    for record in output.split(COMMIT_SEPARATOR) {
        // git puts a newline between records
        let record = record.trim_start_matches('\n');
        if record.trim().is_empty() {
            continue;
        }

        let fields: Vec<&str> = record.splitn(4, FIELD_SEPARATOR).collect();
        let [hash, date, message, body] = fields.as_slice() else {
            return Err(MiningError::malformed(format!(
                "expected 4 fields in log record {:?}",
                record
            )));
        };

        commits.push(CommitSummary {
            hash: hash.to_string(),
            date: date.to_string(),
            message: message.to_string(),
            body: body.trim_end().to_string(),
        });
    }

    Ok(commits)
}

/// Parse one-hash-per-line output of `git log --format=%H`.
pub fn parse_hash_lines(output: &str) -> Vec<String> {
    output
        .lines()
        .map(str::trim)
        .filter(|l| !l.is_empty())
        .map(String::from)
        .collect()
}
