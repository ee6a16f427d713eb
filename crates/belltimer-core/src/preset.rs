//! Query-string presets.
//!
//! A preset is the `?bell_count=3&w1=300&w2=600&w3=900` part of a shared
//! link. Parsing never fails: malformed or out-of-range values are dropped and
//! the engine falls back to held values or defaults.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use tracing::warn;
use url::form_urlencoded;
use url::Url;

use crate::timer::{is_valid_count, is_valid_seconds, TimerEngine};

const BELL_COUNT_KEY: &str = "bell_count";
const WARNING_KEY_PREFIX: &str = "w";

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Preset {
    /// Requested warning count, already range-checked.
    pub bell_count: Option<usize>,
    /// Threshold seconds keyed by 1-based warning position.
    pub warnings: BTreeMap<usize, u64>,
}

impl Preset {
    /// Parse a query string. A leading `?` is allowed.
    pub fn from_query(query: &str) -> Self {
        let query = query.strip_prefix('?').unwrap_or(query);
        let mut preset = Self::default();

        for (key, value) in form_urlencoded::parse(query.as_bytes()) {
            if key == BELL_COUNT_KEY {
                match leading_integer(&value).and_then(|n| usize::try_from(n).ok()) {
                    Some(n) if is_valid_count(n) => preset.bell_count = Some(n),
                    _ => warn!(value = %value, "ignoring invalid bell_count"),
                }
            } else if let Some(position) = warning_position(&key) {
                match leading_integer(&value) {
                    Some(secs) if is_valid_seconds(secs) => {
                        preset.warnings.insert(position, secs as u64);
                    }
                    _ => warn!(key = %key, value = %value, "ignoring invalid warning value"),
                }
            }
        }
        preset
    }

    /// Parse the query part of a full URL. An unparsable URL yields an
    /// empty preset.
    pub fn from_url(url: &str) -> Self {
        match Url::parse(url) {
            Ok(url) => Self::from_query(url.query().unwrap_or_default()),
            Err(err) => {
                warn!(%err, url, "ignoring unparsable preset URL");
                Self::default()
            }
        }
    }

    /// Capture the engine's current warnings as a preset.
    pub fn from_engine(engine: &TimerEngine) -> Self {
        Self {
            bell_count: Some(engine.warning_count()),
            warnings: engine
                .thresholds()
                .into_iter()
                .enumerate()
                .map(|(i, secs)| (i + 1, secs))
                .collect(),
        }
    }

    /// Candidate threshold for 1-based `position`.
    pub fn warning(&self, position: usize) -> Option<u64> {
        self.warnings.get(&position).copied()
    }

    pub fn is_empty(&self) -> bool {
        self.bell_count.is_none() && self.warnings.is_empty()
    }

    /// Encode as `bell_count=N&w1=..`. Only positions up to the bell count
    /// are written when a count is set.
    pub fn to_query(&self) -> String {
        let mut out = form_urlencoded::Serializer::new(String::new());
        if let Some(count) = self.bell_count {
            out.append_pair(BELL_COUNT_KEY, &count.to_string());
        }
        for (position, secs) in &self.warnings {
            if self.bell_count.is_some_and(|count| *position > count) {
                continue;
            }
            out.append_pair(&format!("{WARNING_KEY_PREFIX}{position}"), &secs.to_string());
        }
        out.finish()
    }

    /// Attach this preset to `base` as its query string.
    pub fn to_url(&self, base: &str) -> Result<String, url::ParseError> {
        let mut url = Url::parse(base)?;
        let query = self.to_query();
        url.set_query((!query.is_empty()).then_some(query.as_str()));
        Ok(url.into())
    }
}

/// `w3` -> `Some(3)`. Position 0 and non-numeric suffixes are rejected.
fn warning_position(key: &str) -> Option<usize> {
    key.strip_prefix(WARNING_KEY_PREFIX)
        .filter(|digits| !digits.is_empty() && digits.bytes().all(|b| b.is_ascii_digit()))
        .and_then(|digits| digits.parse::<usize>().ok())
        .filter(|&position| position > 0)
}

/// Leading integer of a value: `60s` -> 60, `2.0` -> 2, ` -4` -> -4.
/// `None` when no digits lead the value or it overflows.
fn leading_integer(value: &str) -> Option<i64> {
    let value = value.trim_start();
    let unsigned = value.strip_prefix(['+', '-']).unwrap_or(value);
    let sign_len = value.len() - unsigned.len();
    let digits = unsigned.bytes().take_while(u8::is_ascii_digit).count();
    if digits == 0 {
        return None;
    }
    value[..sign_len + digits].parse().ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::timer::MAX_SECONDS;

    #[test]
    fn parses_count_and_warnings() {
        let preset = Preset::from_query("?bell_count=2&w1=60&w2=120");
        assert_eq!(preset.bell_count, Some(2));
        assert_eq!(preset.warning(1), Some(60));
        assert_eq!(preset.warning(2), Some(120));
        assert_eq!(preset.warning(3), None);
    }

    #[test]
    fn drops_malformed_values() {
        let preset = Preset::from_query("bell_count=2&w1=60&w2=abc&w3=-4");
        assert_eq!(preset.bell_count, Some(2));
        assert_eq!(preset.warning(1), Some(60));
        assert_eq!(preset.warning(2), None);
        assert_eq!(preset.warning(3), None);
    }

    #[test]
    fn reads_leading_integer_of_value() {
        let preset = Preset::from_query("bell_count=2.0&w1=60s&w2=%2B90&w3=1e3");
        assert_eq!(preset.bell_count, Some(2));
        assert_eq!(preset.warning(1), Some(60));
        assert_eq!(preset.warning(2), Some(90));
        assert_eq!(preset.warning(3), Some(1));
        assert_eq!(leading_integer("  -4x"), Some(-4));
        assert_eq!(leading_integer("x4"), None);
        assert_eq!(leading_integer("-"), None);
    }

    #[test]
    fn out_of_range_values_are_ignored() {
        let preset = Preset::from_query(&format!("bell_count=99&w1={}", MAX_SECONDS + 1));
        assert!(preset.is_empty());
    }

    #[test]
    fn unknown_keys_are_ignored() {
        let preset = Preset::from_query("w0=5&wx=6&w=7&lang=ja&w2=8");
        assert_eq!(preset.warnings.len(), 1);
        assert_eq!(preset.warning(2), Some(8));
    }

    #[test]
    fn from_url_reads_query() {
        let preset = Preset::from_url("https://example.com/timer/?bell_count=1&w1=90");
        assert_eq!(preset.bell_count, Some(1));
        assert_eq!(preset.warning(1), Some(90));
        assert!(Preset::from_url("not a url").is_empty());
    }

    #[test]
    fn query_is_truncated_to_count() {
        let mut preset = Preset::from_query("w1=10&w2=20&w3=30");
        preset.bell_count = Some(2);
        assert_eq!(preset.to_query(), "bell_count=2&w1=10&w2=20");
    }

    #[test]
    fn to_url_replaces_query() {
        let preset = Preset::from_query("bell_count=1&w1=45");
        let url = preset.to_url("https://example.com/?old=1").unwrap();
        assert_eq!(url, "https://example.com/?bell_count=1&w1=45");
    }

    #[test]
    fn engine_roundtrip() {
        let engine = TimerEngine::from_preset(&Preset::from_query("bell_count=2&w1=60&w2=abc"));
        assert_eq!(engine.thresholds(), vec![60, 600]);
        let preset = Preset::from_engine(&engine);
        assert_eq!(preset.to_query(), "bell_count=2&w1=60&w2=600");
    }
}
