//! Conventional-commit suggestion from a staged change list
//!
//! [`classify`] is a pure, ordered heuristic over `(status, path)` records.
//! It is intentionally simple: mixed changesets (e.g. a feature that also
//! touches docs) may be classified by whichever rule matches first.

use serde::Serialize;

/// File names that mark a dependency or project-config change
pub const DEPENDENCY_MANIFESTS: &[&str] = &[
    "package.json",
    "package-lock.json",
    "yarn.lock",
    "pnpm-lock.yaml",
    "tsconfig.json",
    "Cargo.toml",
    "Cargo.lock",
    "requirements.txt",
    "pyproject.toml",
    "Pipfile",
    "Pipfile.lock",
    "go.mod",
    "go.sum",
    "Gemfile",
    "Gemfile.lock",
    "composer.json",
    "composer.lock",
];

/// Status of one staged path
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ChangeStatus {
    Added,
    Modified,
    Deleted,
    Renamed,
    Other,
}

impl ChangeStatus {
    /// Map a `--name-status` code (`A`, `M`, `D`, `R100`, ...)
    pub fn from_code(code: &str) -> Self {
        match code.chars().next() {
            Some('A') => ChangeStatus::Added,
            Some('M') => ChangeStatus::Modified,
            Some('D') => ChangeStatus::Deleted,
            Some('R') => ChangeStatus::Renamed,
            _ => ChangeStatus::Other,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ChangeStatus::Added => "added",
            ChangeStatus::Modified => "modified",
            ChangeStatus::Deleted => "deleted",
            ChangeStatus::Renamed => "renamed",
            ChangeStatus::Other => "other",
        }
    }
}

impl std::fmt::Display for ChangeStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// One staged change
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChangeRecord {
    pub status: ChangeStatus,
    pub path: String,
}

impl ChangeRecord {
    pub fn new(status: ChangeStatus, path: impl Into<String>) -> Self {
        Self {
            status,
            path: path.into(),
        }
    }

    /// Parse one `git diff --name-status` line.
    ///
    /// Renames and copies carry two paths; the destination is kept.
    pub fn parse_status_line(line: &str) -> Option<Self> {
        let mut fields = line.split('\t');
        let code = fields.next()?.trim();
        let path = fields.last()?.trim();
        if code.is_empty() || path.is_empty() {
            return None;
        }
        Some(Self::new(ChangeStatus::from_code(code), path))
    }

    /// Parse a whole `--name-status` listing, skipping blank or malformed lines
    pub fn parse_name_status(raw: &str) -> Vec<Self> {
        raw.lines().filter_map(Self::parse_status_line).collect()
    }

    fn file_name(&self) -> &str {
        self.path.rsplit('/').next().unwrap_or(&self.path)
    }

    fn is_documentation(&self) -> bool {
        let lower = self.path.to_lowercase();
        lower.ends_with(".md") || lower.contains("readme")
    }

    fn is_test(&self) -> bool {
        self.path.contains("test") || self.path.contains("spec")
    }

    fn is_dependency_manifest(&self) -> bool {
        DEPENDENCY_MANIFESTS.contains(&self.file_name())
    }
}

/// Suggested commit message parts
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CommitSuggestion {
    #[serde(rename = "type")]
    pub commit_type: String,
    pub summary: String,
    pub body: String,
}

impl CommitSuggestion {
    fn new(commit_type: &str, summary: impl Into<String>, body: String) -> Self {
        Self {
            commit_type: commit_type.to_string(),
            summary: summary.into(),
            body,
        }
    }

    /// `<type>: <summary>`, followed by the body after a blank line
    pub fn message(&self) -> String {
        if self.body.is_empty() {
            format!("{}: {}", self.commit_type, self.summary)
        } else {
            format!("{}: {}\n\n{}", self.commit_type, self.summary, self.body)
        }
    }
}

/// Classify a change list into a conventional-commit suggestion
pub fn classify(changes: &[ChangeRecord]) -> CommitSuggestion {
    let body = changes
        .iter()
        .map(|c| format!("- {}: {}", c.status, c.path))
        .collect::<Vec<_>>()
        .join("\n");

    if changes.iter().any(ChangeRecord::is_dependency_manifest) {
        return CommitSuggestion::new("chore", "update dependencies or project config", body);
    }

    let non_empty = !changes.is_empty();
    if non_empty && changes.iter().all(|c| c.status == ChangeStatus::Added) {
        let summary = match changes {
            [only] => format!("add '{}'", only.path),
            _ => format!("add {} new files", changes.len()),
        };
        return CommitSuggestion::new("feat", summary, body);
    }

    if non_empty && changes.iter().all(ChangeRecord::is_documentation) {
        return CommitSuggestion::new("docs", "update documentation", body);
    }

    if changes.iter().any(ChangeRecord::is_test) {
        return CommitSuggestion::new("test", "update tests", body);
    }

    if changes.iter().any(|c| c.status == ChangeStatus::Modified) {
        let summary = match changes {
            [only] => format!("update '{}'", only.path),
            _ => format!("update {} files", changes.len()),
        };
        return CommitSuggestion::new("fix", summary, body);
    }

    CommitSuggestion::new("chore", "update project structure", body)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn added(path: &str) -> ChangeRecord {
        ChangeRecord::new(ChangeStatus::Added, path)
    }

    fn modified(path: &str) -> ChangeRecord {
        ChangeRecord::new(ChangeStatus::Modified, path)
    }

    #[test]
    fn test_all_added_is_feat() {
        let s = classify(&[added("a.ts"), added("b.ts")]);
        assert_eq!(s.commit_type, "feat");
        assert_eq!(s.summary, "add 2 new files");

        let s = classify(&[added("src/new.rs")]);
        assert_eq!(s.summary, "add 'src/new.rs'");
    }

    #[test]
    fn test_dependency_manifest_overrides() {
        let s = classify(&[modified("package.json")]);
        assert_eq!(s.commit_type, "chore");
        assert_eq!(s.summary, "update dependencies or project config");

        let s = classify(&[added("crates/core/Cargo.toml"), added("crates/core/src/lib.rs")]);
        assert_eq!(s.commit_type, "chore");
    }

    #[test]
    fn test_manifest_match_is_on_file_name() {
        let s = classify(&[modified("docs/package.json.md")]);
        assert_eq!(s.commit_type, "docs");
    }

    #[test]
    fn test_documentation_only_is_docs() {
        assert_eq!(classify(&[modified("README.md")]).commit_type, "docs");
        assert_eq!(
            classify(&[modified("docs/guide.MD"), modified("ReadMe.txt")]).commit_type,
            "docs"
        );
    }

    #[test]
    fn test_any_test_path_is_test() {
        let s = classify(&[modified("src/lib.rs"), modified("tests/lib_test.rs")]);
        assert_eq!(s.commit_type, "test");
        assert_eq!(s.summary, "update tests");
    }

    #[test]
    fn test_modified_is_fix() {
        let s = classify(&[modified("src/lib.rs")]);
        assert_eq!(s.commit_type, "fix");
        assert_eq!(s.summary, "update 'src/lib.rs'");

        let s = classify(&[
            modified("src/a.rs"),
            ChangeRecord::new(ChangeStatus::Deleted, "src/b.rs"),
        ]);
        assert_eq!(s.summary, "update 2 files");
    }

    #[test]
    fn test_fallback_is_chore() {
        let s = classify(&[ChangeRecord::new(ChangeStatus::Deleted, "old.rs")]);
        assert_eq!(s.commit_type, "chore");
        assert_eq!(s.summary, "update project structure");

        assert_eq!(classify(&[]).commit_type, "chore");
    }

    #[test]
    fn test_body_lists_changes_in_order() {
        let s = classify(&[modified("src/b.rs"), added("src/a.rs")]);
        assert_eq!(s.body, "- modified: src/b.rs\n- added: src/a.rs");
        assert_eq!(
            s.message(),
            "fix: update 2 files\n\n- modified: src/b.rs\n- added: src/a.rs"
        );
    }

    #[test]
    fn test_parse_name_status() {
        let raw = "M\tsrc/lib.rs\nA\tnew.txt\nR100\told/name.rs\tnew/name.rs\n\nD\tgone.rs\n";
        let changes = ChangeRecord::parse_name_status(raw);
        assert_eq!(
            changes,
            vec![
                modified("src/lib.rs"),
                added("new.txt"),
                ChangeRecord::new(ChangeStatus::Renamed, "new/name.rs"),
                ChangeRecord::new(ChangeStatus::Deleted, "gone.rs"),
            ]
        );
    }

    #[test]
    fn test_classification_is_deterministic() {
        let changes = [modified("src/a.rs"), added("b.md")];
        assert_eq!(classify(&changes), classify(&changes));
    }
}
