//! Modification cells: `3[param]|4-MOD:00412|[neutral loss]` and friends.

use std::collections::BTreeMap;
use std::fmt::Display;
use std::str::FromStr;
use std::sync::OnceLock;

use regex::Regex;
use thiserror::Error;

use crate::params::{parse_param, Param};
use crate::section::Section;
use crate::values::{parse_list_with, SplitList, BAR, COMMA};

#[derive(Debug, Error)]
pub enum ModificationError {
    #[error("Modifications may only appear in a data section, not {0:?}")]
    NotADataSection(Section),
}

/// The vocabulary a modification accession is drawn from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ModificationType {
    Mod,
    Unimod,
    Chemmod,
    Subst,
    Unknown,
}

impl ModificationType {
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Mod => "MOD",
            Self::Unimod => "UNIMOD",
            Self::Chemmod => "CHEMMOD",
            Self::Subst => "SUBST",
            Self::Unknown => "UNKNOWN",
        }
    }
}

impl Display for ModificationType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for ModificationType {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "MOD" => Ok(Self::Mod),
            "UNIMOD" => Ok(Self::Unimod),
            "CHEMMOD" => Ok(Self::Chemmod),
            "SUBST" => Ok(Self::Subst),
            "UNKNOWN" => Ok(Self::Unknown),
            _ => Err(()),
        }
    }
}

/// One modification of a sequence, with optional per-position ambiguity
/// parameters and an optional neutral loss.
///
/// The "found but unidentified" sentinel is a modification of type
/// [`ModificationType::Unknown`] with accession `0`, which prints as a bare
/// `0`.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Modification {
    section: Section,
    mod_type: ModificationType,
    accession: String,
    position_map: BTreeMap<u32, Option<Param>>,
    neutral_loss: Option<Param>,
}

impl Modification {
    /// Create a modification bound to one of the four data sections.
    pub fn new(
        section: Section,
        mod_type: ModificationType,
        accession: impl Into<String>,
    ) -> Result<Self, ModificationError> {
        if !section.is_data() {
            return Err(ModificationError::NotADataSection(section));
        }
        Ok(Self {
            section,
            mod_type,
            accession: accession.into(),
            position_map: BTreeMap::new(),
            neutral_loss: None,
        })
    }

    /// The sentinel reported when a modification was observed but could not
    /// be identified.
    pub fn no_modification(section: Section) -> Result<Self, ModificationError> {
        Self::new(section, ModificationType::Unknown, "0")
    }

    pub fn is_no_modification(&self) -> bool {
        self.mod_type == ModificationType::Unknown
            && self.accession == "0"
            && self.position_map.is_empty()
            && self.neutral_loss.is_none()
    }

    pub const fn section(&self) -> Section {
        self.section
    }

    pub const fn mod_type(&self) -> ModificationType {
        self.mod_type
    }

    pub fn accession(&self) -> &str {
        &self.accession
    }

    /// Record a position this modification applies to, with an optional
    /// reliability parameter. Re-adding a position overwrites its parameter.
    pub fn add_position(&mut self, position: u32, param: Option<Param>) {
        self.position_map.insert(position, param);
    }

    pub fn positions(&self) -> &BTreeMap<u32, Option<Param>> {
        &self.position_map
    }

    pub fn set_neutral_loss(&mut self, param: Option<Param>) {
        self.neutral_loss = param;
    }

    pub fn neutral_loss(&self) -> Option<&Param> {
        self.neutral_loss.as_ref()
    }

    fn core(&self) -> Option<String> {
        if self.accession.is_empty() {
            return None;
        }
        match self.mod_type {
            ModificationType::Unknown => Some(self.accession.clone()),
            t => Some(format!("{}:{}", t.name(), self.accession)),
        }
    }
}

impl Display for Modification {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut wrote = false;
        let mut first = true;
        for (position, param) in &self.position_map {
            if !first {
                write!(f, "{BAR}")?;
            }
            write!(f, "{position}")?;
            if let Some(param) = param {
                write!(f, "{param}")?;
            }
            first = false;
            wrote = true;
        }
        let core = self.core();
        if let Some(core) = &core {
            if wrote {
                write!(f, "-")?;
            }
            write!(f, "{core}")?;
        }
        if let Some(loss) = &self.neutral_loss {
            if core.is_some() {
                write!(f, "{BAR}")?;
            } else if wrote {
                // a loss pinned to a position with no accession: `23-[param]`
                write!(f, "-")?;
            }
            write!(f, "{loss}")?;
        }
        Ok(())
    }
}

fn position_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"^(\d+)(\[.*\])?$").expect("static position pattern"))
}

fn accession_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"^(?:(\d+)(\[.*\])?-)?(MOD|UNIMOD|CHEMMOD|SUBST):(.+)$")
            .expect("static modification pattern")
    })
}

fn position_loss_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"^(\d+)-(\[.*\])$").expect("static positioned-loss pattern")
    })
}

/// Parse one modification token. `None` on any grammar violation; the
/// caller's list then resolves to empty as a whole.
pub fn parse_modification(section: Section, token: &str) -> Option<Modification> {
    let token = token.trim();
    if token == "0" {
        return Modification::no_modification(section).ok();
    }

    let mut segments = crate::values::split_outside_brackets(token, BAR);

    // a trailing bare parameter is the neutral loss
    let mut neutral_loss = None;
    if let Some(last) = segments.last() {
        let last = last.trim();
        if last.starts_with('[') && last.ends_with(']') {
            neutral_loss = Some(parse_param(last)?);
            segments.pop();
        }
    }

    let mut modification = if let Some(last) = segments.pop() {
        let last = last.trim();
        if let Some(captures) = accession_pattern().captures(last) {
            let mod_type: ModificationType = captures[3].parse().ok()?;
            let mut modification = Modification::new(section, mod_type, &captures[4]).ok()?;
            if let Some(position) = captures.get(1) {
                let position = position.as_str().parse().ok()?;
                let param = match captures.get(2) {
                    Some(p) => Some(parse_param(p.as_str())?),
                    None => None,
                };
                modification.add_position(position, param);
            }
            modification
        } else if let Some(captures) = position_loss_pattern().captures(last) {
            // a neutral loss pinned to a position, with no accession at all
            let mut modification =
                Modification::new(section, ModificationType::Unknown, "").ok()?;
            modification.add_position(captures[1].parse().ok()?, None);
            modification.neutral_loss = Some(parse_param(&captures[2])?);
            modification
        } else {
            return None;
        }
    } else {
        // nothing but a neutral loss
        let mut modification = Modification::new(section, ModificationType::Unknown, "").ok()?;
        modification.neutral_loss = neutral_loss.take();
        return Some(modification);
    };

    for segment in segments {
        let captures = position_pattern().captures(segment.trim())?;
        let position = captures[1].parse().ok()?;
        let param = match captures.get(2) {
            Some(p) => Some(parse_param(p.as_str())?),
            None => None,
        };
        modification.add_position(position, param);
    }
    if neutral_loss.is_some() {
        modification.neutral_loss = neutral_loss;
    }
    Some(modification)
}

/// Parse a comma-delimited modification cell. Atomic: one bad entry empties
/// the whole list.
pub fn parse_modification_list(section: Section, token: &str) -> SplitList<Modification> {
    parse_list_with(token, COMMA, |t| parse_modification(section, t))
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_sentinel() {
        let m = parse_modification(Section::Peptide, "0").unwrap();
        assert!(m.is_no_modification());
        assert_eq!(m.to_string(), "0");
    }

    #[test]
    fn test_simple_modification() {
        let m = parse_modification(Section::Peptide, "3-MOD:00412").unwrap();
        assert_eq!(m.mod_type(), ModificationType::Mod);
        assert_eq!(m.accession(), "00412");
        assert_eq!(m.positions().len(), 1);
        assert_eq!(m.to_string(), "3-MOD:00412");
    }

    #[test]
    fn test_positionless_modification() {
        let m = parse_modification(Section::Protein, "UNIMOD:35").unwrap();
        assert!(m.positions().is_empty());
        assert_eq!(m.to_string(), "UNIMOD:35");
    }

    #[test]
    fn test_chemmod_signed_mass() {
        let m = parse_modification(Section::SmallMolecule, "CHEMMOD:+159.93").unwrap();
        assert_eq!(m.mod_type(), ModificationType::Chemmod);
        assert_eq!(m.accession(), "+159.93");

        let m = parse_modification(Section::SmallMolecule, "5-CHEMMOD:-18.0106").unwrap();
        assert_eq!(m.accession(), "-18.0106");
        assert_eq!(m.to_string(), "5-CHEMMOD:-18.0106");
    }

    #[test]
    fn test_ambiguity_positions() {
        let raw = "3[MS,MS:1001876,modification probability,0.8]|4[MS,MS:1001876,modification probability,0.2]-MOD:00412";
        let m = parse_modification(Section::Peptide, raw).unwrap();
        assert_eq!(m.positions().len(), 2);
        assert!(m.positions()[&3].is_some());
        assert_eq!(m.to_string(), raw);
    }

    #[test]
    fn test_neutral_loss() {
        let raw = "7-MOD:00425|[MS,MS:1001524,fragment neutral loss,63.998285]";
        let m = parse_modification(Section::PSM, raw).unwrap();
        assert!(m.neutral_loss().is_some());
        assert_eq!(m.to_string(), raw);

        let bare = "[MS,MS:1001524,fragment neutral loss,63.998285]";
        let m = parse_modification(Section::PSM, bare).unwrap();
        assert!(m.neutral_loss().is_some());
        assert!(m.positions().is_empty());
        assert_eq!(m.to_string(), bare);

        let pinned = "23-[MS,MS:1001524,fragment neutral loss,63.998285]";
        let m = parse_modification(Section::PSM, pinned).unwrap();
        assert!(m.neutral_loss().is_some());
        assert_eq!(m.positions().len(), 1);
        assert_eq!(m.to_string(), pinned);
    }

    #[test]
    fn test_modification_list() {
        let list = parse_modification_list(
            Section::Peptide,
            "3-MOD:00412,8[MS,MS:1000035,oxidation,]-MOD:00425",
        );
        assert_eq!(list.len(), 2);
        assert_eq!(
            list.to_string(),
            "3-MOD:00412,8[MS,MS:1000035,oxidation,]-MOD:00425"
        );

        // atomic failure empties the list
        assert!(parse_modification_list(Section::Peptide, "3-MOD:00412,garbage").is_empty());
        assert!(parse_modification_list(Section::Peptide, "null").is_empty());
    }

    #[test]
    fn test_section_gate() {
        assert!(Modification::new(Section::Metadata, ModificationType::Mod, "1").is_err());
        assert!(parse_modification(Section::Peptide, "not a modification").is_none());
    }
}
