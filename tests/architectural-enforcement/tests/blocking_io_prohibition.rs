//! Integration Test: Blocking I/O Prohibition
//!
//! **Policy**: async functions MUST NOT use blocking I/O.
//! **Required**: `tokio::fs`, `tokio::net`, `reqwest` (async client).
//! **Acceptable**: blocking calls in non-async functions (config loading runs
//! before any request is made) and test code.

use architectural_enforcement::{report, scan_dir, SourceLine, PRODUCTION_DIRS};

const FORBIDDEN_ANYWHERE: &[(&str, &str)] = &[("reqwest::blocking", "Blocking HTTP client")];

const FORBIDDEN_IN_ASYNC: &[(&str, &str)] = &[
    ("std::fs::", "Blocking file I/O"),
    ("std::net::", "Blocking network I/O"),
    ("std::process::Command", "Blocking process I/O"),
    ("std::io::stdin()", "Blocking stdin"),
    ("std::thread::sleep", "Blocking sleep"),
];

fn violations_in(line: &SourceLine) -> Vec<String> {
    let mut found: Vec<String> = FORBIDDEN_ANYWHERE
        .iter()
        .filter(|(pattern, _)| line.code.contains(pattern))
        .map(|(_, what)| line.describe(what))
        .collect();
    if line.in_async_fn {
        found.extend(
            FORBIDDEN_IN_ASYNC
                .iter()
                .filter(|(pattern, _)| line.code.contains(pattern))
                .map(|(_, what)| line.describe(what)),
        );
    }
    found
}

fn find_blocking_io_violations() -> Vec<String> {
    PRODUCTION_DIRS
        .iter()
        .flat_map(|dir| scan_dir(dir))
        .flat_map(|line| violations_in(&line))
        .collect()
}

#[test]
fn test_no_blocking_io_in_async_code() {
    report(
        "No blocking I/O in async functions",
        &find_blocking_io_violations(),
    );
}

#[test]
fn test_detector_flags_fs_in_async_fn() {
    let lines = architectural_enforcement::production_lines(
        std::path::Path::new("sample.rs"),
        "async fn bad() {\n    let s = std::fs::read_to_string(p);\n}\n",
    );
    assert_eq!(violations_in(&lines[1]).len(), 1);
}

#[test]
fn test_detector_allows_fs_in_sync_fn() {
    let lines = architectural_enforcement::production_lines(
        std::path::Path::new("sample.rs"),
        "pub fn load() {\n    let s = std::fs::read_to_string(p);\n}\n",
    );
    assert!(violations_in(&lines[1]).is_empty());
}
