//! Integration Test: Unwrap Prohibition
//!
//! **Policy**: the core library propagates errors. `unwrap()` and `expect()`
//! are allowed only in test code.

use architectural_enforcement::{report, scan_dir};

#[test]
fn test_no_unwrap_in_core_library() {
    let violations: Vec<String> = scan_dir("fiveby/core/src")
        .into_iter()
        .filter(|line| line.code.contains(".unwrap()") || line.code.contains(".expect("))
        .map(|line| line.describe("Panicking unwrap"))
        .collect();

    report("No unwrap()/expect() in fiveby-core", &violations);
}
