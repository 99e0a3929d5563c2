//! Static call corpora used across harnesses.

use logchain::{values, Level, Value};

/// The canonical round-trip corpus.
pub fn roundtrip_calls() -> Vec<(Level, Vec<Value>)> {
    vec![
        (Level::Info, values!["a", "b"]),
        (Level::Error, values!["c"]),
    ]
}

/// Calls alternating between two topics: `(topic, level, values)`.
pub fn two_topic_calls(n: usize) -> Vec<(&'static str, Level, Vec<Value>)> {
    (0..n)
        .map(|i| {
            let topic = if i % 3 == 0 { "y" } else { "x" };
            let level = match i % 4 {
                0 => Level::Warn,
                1 => Level::Info,
                2 => Level::Debug,
                _ => Level::Error,
            };
            (topic, level, values![format!("call {i}"), i])
        })
        .collect()
}
