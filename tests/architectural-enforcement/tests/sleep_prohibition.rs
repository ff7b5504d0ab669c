//! Integration Test: Sleep Prohibition
//!
//! **Policy**: Production code MUST NOT call sleep methods. Periodic work uses
//! `tokio::time::interval()`; waiting for a result awaits the result itself.
//! **Exceptions**: test code.

use architectural_enforcement::{report, scan_dir, PRODUCTION_DIRS};

fn find_sleep_violations() -> Vec<String> {
    PRODUCTION_DIRS
        .iter()
        .flat_map(|dir| scan_dir(dir))
        .filter(|line| line.code.contains("::sleep(") || line.code.contains(".sleep("))
        .map(|line| line.describe("Sleep call"))
        .collect()
}

#[test]
fn test_no_sleep_in_production_code() {
    report(
        "No sleep in production code (use interval() or await the I/O)",
        &find_sleep_violations(),
    );
}
