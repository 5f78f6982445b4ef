//! The indexed entities of the metadata section. Every one of them is keyed
//! by a 1-based id and addressed in the document as `{kind}[{id}]`.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt::Display;

use crate::params::Param;
use crate::values::Uri;

/// Identity shared by every metadata entity: an element kind plus a positive
/// numeric id, spelled `{kind}[{id}]` in references.
pub trait IndexedElement {
    fn element_name(&self) -> &'static str;

    fn id(&self) -> u32;

    fn reference(&self) -> String {
        format!("{}[{}]", self.element_name(), self.id())
    }
}

/// An external mass spectrometry data file that rows point into via
/// `spectra_ref` cells.
#[derive(Debug, Clone, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct MsRun {
    pub id: u32,
    pub format: Option<Param>,
    pub location: Option<Uri>,
    pub id_format: Option<Param>,
    pub fragmentation_method: Option<Param>,
    pub hash: Option<String>,
    pub hash_method: Option<Param>,
}

impl MsRun {
    pub fn new(id: u32) -> Self {
        Self {
            id,
            ..Default::default()
        }
    }
}

impl IndexedElement for MsRun {
    fn element_name(&self) -> &'static str {
        "ms_run"
    }

    fn id(&self) -> u32 {
        self.id
    }
}

/// A biological or technical specimen. The descriptive fields are themselves
/// indexed sub-lists (`sample[1]-species[2]`).
#[derive(Debug, Clone, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Sample {
    pub id: u32,
    pub species: BTreeMap<u32, Param>,
    pub tissue: BTreeMap<u32, Param>,
    pub cell_type: BTreeMap<u32, Param>,
    pub disease: BTreeMap<u32, Param>,
    pub description: Option<String>,
    pub custom: Vec<Param>,
}

impl Sample {
    pub fn new(id: u32) -> Self {
        Self {
            id,
            ..Default::default()
        }
    }
}

impl IndexedElement for Sample {
    fn element_name(&self) -> &'static str {
        "sample"
    }

    fn id(&self) -> u32 {
        self.id
    }
}

/// A quantification modification declared on one assay.
#[derive(Debug, Clone, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct AssayQuantificationMod {
    pub param: Option<Param>,
    pub site: Option<String>,
    pub position: Option<String>,
}

/// One application of a quantification reagent to a sample measured in an
/// ms_run. The sample and run are held as ids and resolved through the
/// owning [`Metadata`](super::Metadata).
#[derive(Debug, Clone, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Assay {
    pub id: u32,
    pub quantification_reagent: Option<Param>,
    pub quantification_mods: BTreeMap<u32, AssayQuantificationMod>,
    pub sample_ref: Option<u32>,
    pub ms_run_ref: Option<u32>,
}

impl Assay {
    pub fn new(id: u32) -> Self {
        Self {
            id,
            ..Default::default()
        }
    }
}

impl IndexedElement for Assay {
    fn element_name(&self) -> &'static str {
        "assay"
    }

    fn id(&self) -> u32 {
        self.id
    }
}

/// A grouping of assays and samples representing one experimental factor.
#[derive(Debug, Clone, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct StudyVariable {
    pub id: u32,
    pub description: Option<String>,
    pub assay_refs: BTreeSet<u32>,
    pub sample_refs: BTreeSet<u32>,
}

impl StudyVariable {
    pub fn new(id: u32) -> Self {
        Self {
            id,
            ..Default::default()
        }
    }
}

impl IndexedElement for StudyVariable {
    fn element_name(&self) -> &'static str {
        "study_variable"
    }

    fn id(&self) -> u32 {
        self.id
    }
}

/// An instrument configuration: name, source, one or more analyzers, and a
/// detector, all vocabulary terms.
#[derive(Debug, Clone, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Instrument {
    pub id: u32,
    pub name: Option<Param>,
    pub source: Option<Param>,
    pub analyzers: BTreeMap<u32, Param>,
    pub detector: Option<Param>,
}

impl Instrument {
    pub fn new(id: u32) -> Self {
        Self {
            id,
            ..Default::default()
        }
    }
}

impl IndexedElement for Instrument {
    fn element_name(&self) -> &'static str {
        "instrument"
    }

    fn id(&self) -> u32 {
        self.id
    }
}

/// Analysis software, with free-text settings lines.
#[derive(Debug, Clone, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Software {
    pub id: u32,
    pub param: Option<Param>,
    pub settings: Vec<String>,
}

impl Software {
    pub fn new(id: u32) -> Self {
        Self {
            id,
            ..Default::default()
        }
    }
}

impl IndexedElement for Software {
    fn element_name(&self) -> &'static str {
        "software"
    }

    fn id(&self) -> u32 {
        self.id
    }
}

/// A person responsible for the file.
#[derive(Debug, Clone, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Contact {
    pub id: u32,
    pub name: Option<String>,
    pub affiliation: Option<String>,
    pub email: Option<String>,
}

impl Contact {
    pub fn new(id: u32) -> Self {
        Self {
            id,
            ..Default::default()
        }
    }
}

impl IndexedElement for Contact {
    fn element_name(&self) -> &'static str {
        "contact"
    }

    fn id(&self) -> u32 {
        self.id
    }
}

/// A controlled vocabulary the file draws terms from.
#[derive(Debug, Clone, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CV {
    pub id: u32,
    pub label: Option<String>,
    pub full_name: Option<String>,
    pub version: Option<String>,
    pub url: Option<String>,
}

impl CV {
    pub fn new(id: u32) -> Self {
        Self {
            id,
            ..Default::default()
        }
    }
}

impl IndexedElement for CV {
    fn element_name(&self) -> &'static str {
        "cv"
    }

    fn id(&self) -> u32 {
        self.id
    }
}

/// A search modification, fixed or variable depending on the registry it is
/// stored in.
#[derive(Debug, Clone, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Mod {
    pub id: u32,
    pub param: Option<Param>,
    pub site: Option<String>,
    pub position: Option<String>,
}

impl Mod {
    pub fn new(id: u32) -> Self {
        Self {
            id,
            ..Default::default()
        }
    }
}

/// A column-unit declaration, `colunit-{section}\t{column_header}=[param]`.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ColUnit {
    pub column_header: String,
    pub unit: Param,
}

impl Display for ColUnit {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}={}", self.column_header, self.unit)
    }
}
