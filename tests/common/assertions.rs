//! Domain-specific assertion macros for logchain harnesses.
//!
//! These wrap `pretty_assertions` and add context-rich failure messages that
//! name the file being checked.

/// Assert that the file at `$path` holds exactly `$expected` lines, in order.
///
/// ```rust
/// assert_file_lines!(dir.resolve("x"), ["[INFO] | a"]);
/// ```
#[macro_export]
macro_rules! assert_file_lines {
    ($path:expr, $expected:expr) => {{
        let path: std::path::PathBuf = ($path).into();
        let actual = logchain::read_lines(&path)
            .unwrap_or_else(|e| panic!("assert_file_lines! could not read {}: {e}", path.display()));
        let expected: Vec<String> = ($expected).into_iter().map(|s| s.to_string()).collect();
        pretty_assertions::assert_eq!(
            actual,
            expected,
            "assert_file_lines! failed for {}",
            path.display()
        );
    }};
}

/// Assert that a `Result<(), LogError>` failed with the given pattern.
#[macro_export]
macro_rules! assert_log_err {
    ($result:expr, $pattern:pat) => {{
        match $result {
            Err($pattern) => {}
            other => panic!(
                "assert_log_err! failed: expected Err({}), got {:?}",
                stringify!($pattern),
                other
            ),
        }
    }};
}
