//! The mandatory `mzTab-version`/`mzTab-mode`/`mzTab-type` block that opens
//! every metadata section.

use std::fmt::Display;
use std::str::FromStr;

use thiserror::Error;

pub const MZTAB_VERSION: &str = "1.0";

#[derive(Debug, Error)]
pub enum DescriptionParseError {
    #[error("{0:?} is not a recognized mzTab mode, expected Complete or Summary")]
    UnknownMode(String),
    #[error("{0:?} is not a recognized mzTab type, expected Identification or Quantification")]
    UnknownType(String),
}

/// Whether the file carries the full evidence trail or only summarized
/// results.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum MZTabMode {
    Complete,
    #[default]
    Summary,
}

impl Display for MZTabMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            Self::Complete => "Complete",
            Self::Summary => "Summary",
        })
    }
}

impl FromStr for MZTabMode {
    type Err = DescriptionParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "Complete" => Ok(Self::Complete),
            "Summary" => Ok(Self::Summary),
            _ => Err(DescriptionParseError::UnknownMode(s.to_string())),
        }
    }
}

/// The kind of result the file reports.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum MZTabType {
    #[default]
    Identification,
    Quantification,
}

impl Display for MZTabType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            Self::Identification => "Identification",
            Self::Quantification => "Quantification",
        })
    }
}

impl FromStr for MZTabType {
    type Err = DescriptionParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "Identification" => Ok(Self::Identification),
            "Quantification" => Ok(Self::Quantification),
            _ => Err(DescriptionParseError::UnknownType(s.to_string())),
        }
    }
}

/// The file-level description block. Mode and type are mandatory; the id is
/// free-form and optional.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct MZTabDescription {
    pub version: String,
    pub mode: MZTabMode,
    pub file_type: MZTabType,
    pub id: Option<String>,
}

impl MZTabDescription {
    pub fn new(mode: MZTabMode, file_type: MZTabType) -> Self {
        Self {
            version: MZTAB_VERSION.to_string(),
            mode,
            file_type,
            id: None,
        }
    }

    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }
}

impl Default for MZTabDescription {
    fn default() -> Self {
        Self::new(MZTabMode::default(), MZTabType::default())
    }
}

impl Display for MZTabDescription {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "MTD\tmzTab-version\t{}", self.version)?;
        writeln!(f, "MTD\tmzTab-mode\t{}", self.mode)?;
        writeln!(f, "MTD\tmzTab-type\t{}", self.file_type)?;
        if let Some(id) = &self.id {
            writeln!(f, "MTD\tmzTab-ID\t{id}")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_display() {
        let description = MZTabDescription::new(MZTabMode::Summary, MZTabType::Identification)
            .with_id("PRIDE_1234");
        assert_eq!(
            description.to_string(),
            "MTD\tmzTab-version\t1.0\nMTD\tmzTab-mode\tSummary\nMTD\tmzTab-type\tIdentification\nMTD\tmzTab-ID\tPRIDE_1234\n"
        );
    }

    #[test]
    fn test_parse_enums() {
        assert_eq!("Complete".parse::<MZTabMode>().unwrap(), MZTabMode::Complete);
        assert!("complete".parse::<MZTabMode>().is_err());
        assert_eq!(
            "Quantification".parse::<MZTabType>().unwrap(),
            MZTabType::Quantification
        );
        assert!("Both".parse::<MZTabType>().is_err());
    }
}
