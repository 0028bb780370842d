//! `git blame --line-porcelain` parser
//!
//! The porcelain stream is a sequence of header blocks, each introduced by a
//! commit line (`<40 hex> <orig-line> <final-line> [<group-size>]`), followed
//! by `key value` lines and finally one tab-prefixed content line.
//!
//! [`parse_blame`] folds over the lines carrying a single [`Attribution`];
//! every content line emits one [`BlameLine`] from whatever attribution is
//! current at that point.

use chrono::{DateTime, Datelike, Local, TimeZone};
use serde::Serialize;

/// One attributed source line
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BlameLine {
    pub line_number: Option<u32>,
    /// First 8 characters of the commit hash
    pub commit_hash: Option<String>,
    pub author: Option<String>,
    /// Local `M/D/YYYY` date of `author-time`
    pub date: Option<String>,
    pub content: String,
}

/// Attribution carried between header lines and the content line
#[derive(Debug, Clone, Default, PartialEq, Eq)]
struct Attribution {
    line_number: Option<u32>,
    commit_hash: Option<String>,
    author: Option<String>,
    date: Option<String>,
}

impl Attribution {
    fn from_commit_line(line: &str) -> Self {
        let mut tokens = line.split_whitespace();
        let hash = tokens.next().unwrap_or_default();
        let original = tokens.next();
        let final_line = tokens.next();

        Self {
            line_number: final_line.or(original).and_then(|n| n.parse().ok()),
            commit_hash: Some(hash.chars().take(8).collect()),
            author: None,
            date: None,
        }
    }

    fn emit(&self, content: &str) -> BlameLine {
        BlameLine {
            line_number: self.line_number,
            commit_hash: self.commit_hash.clone(),
            author: self.author.clone(),
            date: self.date.clone(),
            content: content.to_string(),
        }
    }
}

/// Parse porcelain blame output into per-line records, in input order
pub fn parse_blame(raw: &str) -> Vec<BlameLine> {
    let (_, lines) = raw.lines().fold(
        (Attribution::default(), Vec::new()),
        |(mut current, mut out), line| {
            if let Some(content) = line.strip_prefix('\t') {
                out.push(current.emit(content));
            } else if is_commit_line(line) {
                current = Attribution::from_commit_line(line);
            } else if let Some(author) = line.strip_prefix("author ") {
                current.author = Some(author.to_string());
            } else if let Some(time) = line.strip_prefix("author-time ") {
                current.date = time.trim().parse().ok().and_then(local_date);
            }
            (current, out)
        },
    );
    lines
}

fn is_commit_line(line: &str) -> bool {
    line.len() >= 40 && line.as_bytes()[..40].iter().all(u8::is_ascii_hexdigit)
}

/// Unix seconds rendered as a local `M/D/YYYY` date
pub fn local_date(secs: i64) -> Option<String> {
    Local.timestamp_opt(secs, 0).single().map(|dt| short_date(&dt))
}

fn short_date<Tz: TimeZone>(dt: &DateTime<Tz>) -> String {
    format!("{}/{}/{}", dt.month(), dt.day(), dt.year())
}
