//! Architectural Enforcement Integration Tests
//!
//! This package contains integration tests that enforce architectural principles
//! on the Five-By crates:
//! - No sleep() calls in production code (wait on I/O or use intervals)
//! - No blocking I/O inside async functions
//! - No unwrap()/expect() in the core library
//!
//! The helpers here walk a crate's `src/` tree and yield production lines only.
//! Everything from the first `#[cfg(test)]` in a file onward is treated as test
//! code, matching the layout used across the workspace.

use std::fs;
use std::path::{Path, PathBuf};

/// Production source directories checked by every rule
pub const PRODUCTION_DIRS: &[&str] = &["fiveby/core/src", "fiveby/cli/src"];

/// One production line, with the code part (comments stripped)
#[derive(Debug, Clone)]
pub struct SourceLine {
    /// File the line came from
    pub path: PathBuf,
    /// 1-based line number
    pub number: usize,
    /// Full line, trimmed
    pub text: String,
    /// The line with any `//` comment removed
    pub code: String,
    /// Whether the nearest enclosing `fn` is `async`
    pub in_async_fn: bool,
}

impl SourceLine {
    /// `path:line - text` for violation reports
    #[must_use]
    pub fn describe(&self, what: &str) -> String {
        format!(
            "{}:{} - {what}: {}",
            self.path.display(),
            self.number,
            self.text
        )
    }
}

/// Workspace root, two levels above this package
#[must_use]
pub fn workspace_root() -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR")).join("../..")
}

/// Whether `line` opens a function, and if so whether it is async
///
/// Handles visibility and qualifier prefixes (`pub(crate) async fn`,
/// `pub const fn`, ...).
#[must_use]
pub fn fn_signature(line: &str) -> Option<bool> {
    let line = line.trim_start();
    let mut is_async = false;
    for word in line.split_whitespace() {
        match word {
            "fn" => return Some(is_async),
            "async" => is_async = true,
            "pub" | "const" | "unsafe" | "extern" => {}
            w if w.starts_with("pub(") => {}
            _ => return None,
        }
    }
    None
}

/// Production lines of one file
#[must_use]
pub fn production_lines(path: &Path, content: &str) -> Vec<SourceLine> {
    let mut lines = Vec::new();
    let mut in_async_fn = false;

    for (idx, raw) in content.lines().enumerate() {
        let trimmed = raw.trim();
        if trimmed.starts_with("#[cfg(test)]") {
            break;
        }
        if let Some(is_async) = fn_signature(trimmed) {
            in_async_fn = is_async;
        }
        let code = raw.split("//").next().unwrap_or(raw);
        if trimmed.starts_with("//") || code.trim().is_empty() {
            continue;
        }
        lines.push(SourceLine {
            path: path.to_path_buf(),
            number: idx + 1,
            text: trimmed.to_string(),
            code: code.to_string(),
            in_async_fn,
        });
    }
    lines
}

/// Production lines of every `.rs` file under `dir` (relative to the workspace root)
#[must_use]
pub fn scan_dir(dir: &str) -> Vec<SourceLine> {
    let root = workspace_root().join(dir);
    if !root.exists() {
        return Vec::new();
    }

    let mut lines = Vec::new();
    for entry in walkdir::WalkDir::new(&root)
        .into_iter()
        .filter_map(Result::ok)
    {
        let path = entry.path();
        if path.extension().and_then(|s| s.to_str()) != Some("rs") {
            continue;
        }
        if let Ok(content) = fs::read_to_string(path) {
            lines.extend(production_lines(path, &content));
        }
    }
    lines
}

/// Print violations and panic when there are any
pub fn report(rule: &str, violations: &[String]) {
    if violations.is_empty() {
        return;
    }
    eprintln!("\n{rule}:");
    for violation in violations {
        eprintln!("  {violation}");
    }
    panic!("\nFound {} violation(s) of: {rule}", violations.len());
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fn_signature_detection() {
        assert_eq!(fn_signature("fn main() {"), Some(false));
        assert_eq!(fn_signature("pub async fn load(&self) {"), Some(true));
        assert_eq!(fn_signature("pub(crate) fn normalize(x: &str) {"), Some(false));
        assert_eq!(fn_signature("    async fn run(store: Arc<S>) {"), Some(true));
        assert_eq!(fn_signature("let f = function();"), None);
        assert_eq!(fn_signature("// fn in a comment"), None);
    }

    #[test]
    fn test_production_lines_stop_at_test_module() {
        let content = "\
pub async fn load() {
    let text = std::fs::read_to_string(path); // trailing
}

#[cfg(test)]
mod tests {
    fn helper() { x.unwrap(); }
}
";
        let lines = production_lines(Path::new("lib.rs"), content);
        assert_eq!(lines.len(), 3);
        assert!(lines[1].in_async_fn);
        assert!(!lines[1].code.contains("trailing"));
        assert!(lines.iter().all(|line| !line.code.contains("unwrap")));
    }
}
