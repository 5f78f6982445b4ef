use std::fmt::Display;
use std::str::FromStr;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum SectionParseError {
    #[error("{0:?} is not a recognized mzTab section prefix or name")]
    Unknown(String),
}

/// The ten statement kinds an mzTab document is made of. Every physical line
/// belongs to exactly one section, identified by its three-letter prefix.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Section {
    Comment,
    Metadata,
    ProteinHeader,
    Protein,
    PeptideHeader,
    Peptide,
    PSMHeader,
    PSM,
    SmallMoleculeHeader,
    SmallMolecule,
}

impl Section {
    /// The three-letter line prefix, e.g. `PRT` for protein data rows.
    pub const fn prefix(&self) -> &'static str {
        match self {
            Self::Comment => "COM",
            Self::Metadata => "MTD",
            Self::ProteinHeader => "PRH",
            Self::Protein => "PRT",
            Self::PeptideHeader => "PEH",
            Self::Peptide => "PEP",
            Self::PSMHeader => "PSH",
            Self::PSM => "PSM",
            Self::SmallMoleculeHeader => "SMH",
            Self::SmallMolecule => "SML",
        }
    }

    /// The long section name used in metadata keys and abundance headers.
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Comment => "comment",
            Self::Metadata => "metadata",
            Self::ProteinHeader => "protein_header",
            Self::Protein => "protein",
            Self::PeptideHeader => "peptide_header",
            Self::Peptide => "peptide",
            Self::PSMHeader => "psm_header",
            Self::PSM => "psm",
            Self::SmallMoleculeHeader => "small_molecule_header",
            Self::SmallMolecule => "small_molecule",
        }
    }

    /// Statement ordering level within a document. Comments may appear
    /// anywhere, metadata precedes headers, headers precede data.
    pub const fn level(&self) -> u8 {
        match self {
            Self::Comment => 0,
            Self::Metadata => 1,
            Self::ProteinHeader
            | Self::PeptideHeader
            | Self::PSMHeader
            | Self::SmallMoleculeHeader => 2,
            Self::Protein | Self::Peptide | Self::PSM | Self::SmallMolecule => 3,
        }
    }

    pub const fn is_comment(&self) -> bool {
        matches!(self, Self::Comment)
    }

    pub const fn is_metadata(&self) -> bool {
        matches!(self, Self::Metadata)
    }

    pub const fn is_header(&self) -> bool {
        self.level() == 2
    }

    pub const fn is_data(&self) -> bool {
        self.level() == 3
    }

    /// The data section this section's rows live in, if any.
    pub const fn to_data(&self) -> Option<Section> {
        match self {
            Self::ProteinHeader | Self::Protein => Some(Self::Protein),
            Self::PeptideHeader | Self::Peptide => Some(Self::Peptide),
            Self::PSMHeader | Self::PSM => Some(Self::PSM),
            Self::SmallMoleculeHeader | Self::SmallMolecule => Some(Self::SmallMolecule),
            _ => None,
        }
    }

    /// The header section paired with this section, if any.
    pub const fn to_header(&self) -> Option<Section> {
        match self {
            Self::ProteinHeader | Self::Protein => Some(Self::ProteinHeader),
            Self::PeptideHeader | Self::Peptide => Some(Self::PeptideHeader),
            Self::PSMHeader | Self::PSM => Some(Self::PSMHeader),
            Self::SmallMoleculeHeader | Self::SmallMolecule => Some(Self::SmallMoleculeHeader),
            _ => None,
        }
    }

    /// The section name as it appears inside abundance column headers.
    /// `small_molecule` loses its underscore there, a presentation quirk
    /// of the format.
    pub const fn abundance_name(&self) -> &'static str {
        match self {
            Self::SmallMoleculeHeader | Self::SmallMolecule => "smallmolecule",
            _ => self.name(),
        }
    }
}

impl Display for Section {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.prefix())
    }
}

impl FromStr for Section {
    type Err = SectionParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "COM" | "comment" => Ok(Self::Comment),
            "MTD" | "metadata" => Ok(Self::Metadata),
            "PRH" | "protein_header" => Ok(Self::ProteinHeader),
            "PRT" | "protein" => Ok(Self::Protein),
            "PEH" | "peptide_header" => Ok(Self::PeptideHeader),
            "PEP" | "peptide" => Ok(Self::Peptide),
            "PSH" | "psm_header" => Ok(Self::PSMHeader),
            "PSM" | "psm" => Ok(Self::PSM),
            "SMH" | "small_molecule_header" => Ok(Self::SmallMoleculeHeader),
            "SML" | "small_molecule" => Ok(Self::SmallMolecule),
            _ => Err(SectionParseError::Unknown(s.to_string())),
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_prefix_round_trip() {
        for section in [
            Section::Comment,
            Section::Metadata,
            Section::ProteinHeader,
            Section::Protein,
            Section::PeptideHeader,
            Section::Peptide,
            Section::PSMHeader,
            Section::PSM,
            Section::SmallMoleculeHeader,
            Section::SmallMolecule,
        ] {
            assert_eq!(section.prefix().parse::<Section>().unwrap(), section);
            assert_eq!(section.name().parse::<Section>().unwrap(), section);
        }
        assert!("XYZ".parse::<Section>().is_err());
    }

    #[test]
    fn test_levels() {
        assert!(Section::Protein.is_data());
        assert!(Section::ProteinHeader.is_header());
        assert!(!Section::Metadata.is_data());
        assert_eq!(Section::PSMHeader.to_data(), Some(Section::PSM));
        assert_eq!(Section::Peptide.to_header(), Some(Section::PeptideHeader));
        assert_eq!(Section::Metadata.to_data(), None);
    }

    #[test]
    fn test_abundance_name_translation() {
        assert_eq!(Section::SmallMolecule.abundance_name(), "smallmolecule");
        assert_eq!(Section::Protein.abundance_name(), "protein");
    }
}
