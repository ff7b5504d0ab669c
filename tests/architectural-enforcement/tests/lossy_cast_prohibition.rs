//! Integration Test: Lossy Duration Cast Prohibition
//!
//! **Policy**: `Duration::as_millis()` and friends return `u128`; narrowing
//! them with `as` truncates silently. Log the `Duration` itself (`?d`) or
//! convert with `try_from`.

use architectural_enforcement::{report, scan_dir, SourceLine, PRODUCTION_DIRS};

const WIDE_GETTERS: &[&str] = &[".as_millis()", ".as_micros()", ".as_nanos()"];

fn is_lossy_cast(line: &SourceLine) -> bool {
    WIDE_GETTERS.iter().any(|getter| {
        line.code
            .split(getter)
            .skip(1)
            .any(|rest| rest.trim_start().starts_with("as "))
    })
}

#[test]
fn test_no_truncating_duration_casts() {
    let violations: Vec<String> = PRODUCTION_DIRS
        .iter()
        .flat_map(|dir| scan_dir(dir))
        .filter(is_lossy_cast)
        .map(|line| line.describe("Truncating duration cast"))
        .collect();

    report("No `as` casts of u128 duration getters", &violations);
}

#[test]
fn test_detector_flags_as_millis_cast() {
    let lines = architectural_enforcement::production_lines(
        std::path::Path::new("sample.rs"),
        "fn log(d: Duration) {\n    let ms = d.as_millis() as u64;\n    let ok = u64::try_from(d.as_millis());\n}\n",
    );
    assert!(is_lossy_cast(&lines[1]));
    assert!(!is_lossy_cast(&lines[2]));
}
