//! References from a table row back into a mass spectrometry run,
//! `ms_run[2]:index=7` or `ms_run[1]:controllerType=0 controllerNumber=1 scan=1296`.

use std::fmt::Display;
use std::str::FromStr;
use std::sync::OnceLock;

use regex::Regex;
use thiserror::Error;

use crate::values::{parse_list_with, SplitList, BAR};

#[derive(Debug, Error)]
pub enum SpectraRefParseError {
    #[error("{0:?} is not of the form ms_run[n]:reference")]
    Malformed(String),
}

/// A pointer to one spectrum inside a declared `ms_run`. The run id is the
/// 1-based index of the `ms_run[n]` metadata element; the reference half is
/// kept verbatim since its grammar depends on the run's declared id format.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SpectraRef {
    ms_run_id: u32,
    reference: String,
}

impl SpectraRef {
    /// `ms_run_id` must be a valid 1-based element id.
    pub fn new(ms_run_id: u32, reference: impl Into<String>) -> Option<Self> {
        if ms_run_id == 0 {
            return None;
        }
        Some(Self {
            ms_run_id,
            reference: reference.into(),
        })
    }

    pub const fn ms_run_id(&self) -> u32 {
        self.ms_run_id
    }

    pub fn reference(&self) -> &str {
        &self.reference
    }
}

impl Display for SpectraRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "ms_run[{}]:{}", self.ms_run_id, self.reference)
    }
}

fn spectra_ref_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"^ms_run\[(\d+)\]:(.+)$").expect("static spectra_ref pattern"))
}

pub fn parse_spectra_ref(token: &str) -> Option<SpectraRef> {
    let captures = spectra_ref_pattern().captures(token.trim())?;
    SpectraRef::new(captures[1].parse().ok()?, &captures[2])
}

impl FromStr for SpectraRef {
    type Err = SpectraRefParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse_spectra_ref(s).ok_or_else(|| SpectraRefParseError::Malformed(s.to_string()))
    }
}

pub fn parse_spectra_ref_list(token: &str) -> SplitList<SpectraRef> {
    parse_list_with(token, BAR, parse_spectra_ref)
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_parse() {
        let r = parse_spectra_ref("ms_run[2]:index=7").unwrap();
        assert_eq!(r.ms_run_id(), 2);
        assert_eq!(r.reference(), "index=7");
        assert_eq!(r.to_string(), "ms_run[2]:index=7");
    }

    #[test]
    fn test_rejects() {
        assert!(parse_spectra_ref("ms_run[0]:index=7").is_none());
        assert!(parse_spectra_ref("run[2]:index=7").is_none());
        assert!(parse_spectra_ref("ms_run[2]").is_none());
    }

    #[test]
    fn test_list() {
        let list =
            parse_spectra_ref_list("ms_run[1]:scan=1296|ms_run[2]:scan=1297");
        assert_eq!(list.len(), 2);
        assert_eq!(
            list.to_string(),
            "ms_run[1]:scan=1296|ms_run[2]:scan=1297"
        );
        assert!(parse_spectra_ref_list("ms_run[1]:scan=1296|nope").is_empty());
    }
}
