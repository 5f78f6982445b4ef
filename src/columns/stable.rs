//! The fixed column schemas of the four data tables.

use crate::section::Section;
use crate::values::{BAR, COMMA};

use super::DataType;

/// How a stable column enters a table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnScope {
    /// Seeded into every factory for the section.
    Mandatory,
    /// Added on demand, once.
    Optional,
    /// Added once per search engine score id, `name[id]`.
    PerScore,
    /// Added once per (score id, ms_run) pair, `name[id]_ms_run[m]`.
    PerScoreAndRun,
    /// Added once per ms_run, `name_ms_run[m]`.
    PerRun,
}

macro_rules! stable_columns {
    ($(#[$outer:meta])* $enum_name:ident, $section:expr, [
        $($variant:ident => ($name:literal, $order:literal, $data_type:expr, $scope:expr)),+ $(,)?
    ]) => {
        $(#[$outer])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq)]
        pub enum $enum_name {
            $($variant),+
        }

        impl $enum_name {
            pub const ALL: &'static [Self] = &[$(Self::$variant),+];

            pub const fn section(&self) -> Section {
                $section
            }

            pub const fn name(&self) -> &'static str {
                match self {
                    $(Self::$variant => $name),+
                }
            }

            pub const fn order(&self) -> u32 {
                match self {
                    $(Self::$variant => $order),+
                }
            }

            pub const fn data_type(&self) -> DataType {
                match self {
                    $(Self::$variant => $data_type),+
                }
            }

            pub const fn scope(&self) -> ColumnScope {
                match self {
                    $(Self::$variant => $scope),+
                }
            }
        }
    };
}

stable_columns!(
    /// The protein table schema, orders `01` through `18`.
    ProteinColumn, Section::Protein, [
    Accession => ("accession", 1, DataType::String, ColumnScope::Mandatory),
    Description => ("description", 2, DataType::String, ColumnScope::Mandatory),
    Taxid => ("taxid", 3, DataType::Integer, ColumnScope::Mandatory),
    Species => ("species", 4, DataType::String, ColumnScope::Mandatory),
    Database => ("database", 5, DataType::String, ColumnScope::Mandatory),
    DatabaseVersion => ("database_version", 6, DataType::String, ColumnScope::Mandatory),
    SearchEngine => ("search_engine", 7, DataType::ParamList, ColumnScope::Mandatory),
    BestSearchEngineScore => ("best_search_engine_score", 8, DataType::Double, ColumnScope::PerScore),
    SearchEngineScore => ("search_engine_score", 9, DataType::Double, ColumnScope::PerScoreAndRun),
    Reliability => ("reliability", 10, DataType::Reliability, ColumnScope::Optional),
    NumPsms => ("num_psms", 11, DataType::Integer, ColumnScope::PerRun),
    NumPeptidesDistinct => ("num_peptides_distinct", 12, DataType::Integer, ColumnScope::PerRun),
    NumPeptidesUnique => ("num_peptides_unique", 13, DataType::Integer, ColumnScope::PerRun),
    AmbiguityMembers => ("ambiguity_members", 14, DataType::StringList(COMMA), ColumnScope::Mandatory),
    Modifications => ("modifications", 15, DataType::ModificationList, ColumnScope::Mandatory),
    Uri => ("uri", 16, DataType::Uri, ColumnScope::Optional),
    GoTerms => ("go_terms", 17, DataType::StringList(COMMA), ColumnScope::Optional),
    ProteinCoverage => ("protein_coverage", 18, DataType::Double, ColumnScope::Optional),
]);

stable_columns!(
    /// The peptide table schema, orders `01` through `16`.
    PeptideColumn, Section::Peptide, [
    Sequence => ("sequence", 1, DataType::String, ColumnScope::Mandatory),
    Accession => ("accession", 2, DataType::String, ColumnScope::Mandatory),
    Unique => ("unique", 3, DataType::Boolean, ColumnScope::Mandatory),
    Database => ("database", 4, DataType::String, ColumnScope::Mandatory),
    DatabaseVersion => ("database_version", 5, DataType::String, ColumnScope::Mandatory),
    SearchEngine => ("search_engine", 6, DataType::ParamList, ColumnScope::Mandatory),
    BestSearchEngineScore => ("best_search_engine_score", 7, DataType::Double, ColumnScope::PerScore),
    SearchEngineScore => ("search_engine_score", 8, DataType::Double, ColumnScope::PerScoreAndRun),
    Reliability => ("reliability", 9, DataType::Reliability, ColumnScope::Optional),
    Modifications => ("modifications", 10, DataType::ModificationList, ColumnScope::Mandatory),
    RetentionTime => ("retention_time", 11, DataType::DoubleList, ColumnScope::Mandatory),
    RetentionTimeWindow => ("retention_time_window", 12, DataType::DoubleList, ColumnScope::Mandatory),
    Charge => ("charge", 13, DataType::Integer, ColumnScope::Mandatory),
    MassToCharge => ("mass_to_charge", 14, DataType::Double, ColumnScope::Mandatory),
    Uri => ("uri", 15, DataType::Uri, ColumnScope::Optional),
    SpectraRef => ("spectra_ref", 16, DataType::SpectraRefList, ColumnScope::Mandatory),
]);

stable_columns!(
    /// The PSM table schema, orders `01` through `20`.
    PsmColumn, Section::PSM, [
    Sequence => ("sequence", 1, DataType::String, ColumnScope::Mandatory),
    PsmId => ("PSM_ID", 2, DataType::Integer, ColumnScope::Mandatory),
    Accession => ("accession", 3, DataType::String, ColumnScope::Mandatory),
    Unique => ("unique", 4, DataType::Boolean, ColumnScope::Mandatory),
    Database => ("database", 5, DataType::String, ColumnScope::Mandatory),
    DatabaseVersion => ("database_version", 6, DataType::String, ColumnScope::Mandatory),
    SearchEngine => ("search_engine", 7, DataType::ParamList, ColumnScope::Mandatory),
    SearchEngineScore => ("search_engine_score", 8, DataType::Double, ColumnScope::PerScore),
    Reliability => ("reliability", 9, DataType::Reliability, ColumnScope::Optional),
    Modifications => ("modifications", 10, DataType::ModificationList, ColumnScope::Mandatory),
    RetentionTime => ("retention_time", 11, DataType::DoubleList, ColumnScope::Mandatory),
    Charge => ("charge", 12, DataType::Integer, ColumnScope::Mandatory),
    ExpMassToCharge => ("exp_mass_to_charge", 13, DataType::Double, ColumnScope::Mandatory),
    CalcMassToCharge => ("calc_mass_to_charge", 14, DataType::Double, ColumnScope::Mandatory),
    Uri => ("uri", 15, DataType::Uri, ColumnScope::Optional),
    SpectraRef => ("spectra_ref", 16, DataType::SpectraRefList, ColumnScope::Mandatory),
    Pre => ("pre", 17, DataType::String, ColumnScope::Mandatory),
    Post => ("post", 18, DataType::String, ColumnScope::Mandatory),
    Start => ("start", 19, DataType::String, ColumnScope::Mandatory),
    End => ("end", 20, DataType::String, ColumnScope::Mandatory),
]);

stable_columns!(
    /// The small molecule table schema, orders `01` through `20`.
    SmallMoleculeColumn, Section::SmallMolecule, [
    Identifier => ("identifier", 1, DataType::StringList(BAR), ColumnScope::Mandatory),
    ChemicalFormula => ("chemical_formula", 2, DataType::String, ColumnScope::Mandatory),
    Smiles => ("smiles", 3, DataType::StringList(BAR), ColumnScope::Mandatory),
    InchiKey => ("inchi_key", 4, DataType::StringList(BAR), ColumnScope::Mandatory),
    Description => ("description", 5, DataType::String, ColumnScope::Mandatory),
    ExpMassToCharge => ("exp_mass_to_charge", 6, DataType::Double, ColumnScope::Mandatory),
    CalcMassToCharge => ("calc_mass_to_charge", 7, DataType::Double, ColumnScope::Mandatory),
    Charge => ("charge", 8, DataType::Integer, ColumnScope::Mandatory),
    RetentionTime => ("retention_time", 9, DataType::DoubleList, ColumnScope::Mandatory),
    Taxid => ("taxid", 10, DataType::Integer, ColumnScope::Mandatory),
    Species => ("species", 11, DataType::String, ColumnScope::Mandatory),
    Database => ("database", 12, DataType::String, ColumnScope::Mandatory),
    DatabaseVersion => ("database_version", 13, DataType::String, ColumnScope::Mandatory),
    Reliability => ("reliability", 14, DataType::Reliability, ColumnScope::Optional),
    Uri => ("uri", 15, DataType::Uri, ColumnScope::Optional),
    SpectraRef => ("spectra_ref", 16, DataType::SpectraRefList, ColumnScope::Mandatory),
    SearchEngine => ("search_engine", 17, DataType::ParamList, ColumnScope::Mandatory),
    BestSearchEngineScore => ("best_search_engine_score", 18, DataType::Double, ColumnScope::PerScore),
    SearchEngineScore => ("search_engine_score", 19, DataType::Double, ColumnScope::PerScoreAndRun),
    Modifications => ("modifications", 20, DataType::ModificationList, ColumnScope::Mandatory),
]);

/// A section-tagged handle onto one stable column definition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StableColumn {
    Protein(ProteinColumn),
    Peptide(PeptideColumn),
    Psm(PsmColumn),
    SmallMolecule(SmallMoleculeColumn),
}

impl StableColumn {
    pub const fn section(&self) -> Section {
        match self {
            Self::Protein(_) => Section::Protein,
            Self::Peptide(_) => Section::Peptide,
            Self::Psm(_) => Section::PSM,
            Self::SmallMolecule(_) => Section::SmallMolecule,
        }
    }

    pub const fn name(&self) -> &'static str {
        match self {
            Self::Protein(c) => c.name(),
            Self::Peptide(c) => c.name(),
            Self::Psm(c) => c.name(),
            Self::SmallMolecule(c) => c.name(),
        }
    }

    pub const fn order(&self) -> u32 {
        match self {
            Self::Protein(c) => c.order(),
            Self::Peptide(c) => c.order(),
            Self::Psm(c) => c.order(),
            Self::SmallMolecule(c) => c.order(),
        }
    }

    pub const fn data_type(&self) -> DataType {
        match self {
            Self::Protein(c) => c.data_type(),
            Self::Peptide(c) => c.data_type(),
            Self::Psm(c) => c.data_type(),
            Self::SmallMolecule(c) => c.data_type(),
        }
    }

    pub const fn scope(&self) -> ColumnScope {
        match self {
            Self::Protein(c) => c.scope(),
            Self::Peptide(c) => c.scope(),
            Self::Psm(c) => c.scope(),
            Self::SmallMolecule(c) => c.scope(),
        }
    }

    /// Every stable column of the given data section.
    pub fn all_for(section: Section) -> Vec<StableColumn> {
        match section {
            Section::Protein | Section::ProteinHeader => {
                ProteinColumn::ALL.iter().copied().map(Self::Protein).collect()
            }
            Section::Peptide | Section::PeptideHeader => {
                PeptideColumn::ALL.iter().copied().map(Self::Peptide).collect()
            }
            Section::PSM | Section::PSMHeader => {
                PsmColumn::ALL.iter().copied().map(Self::Psm).collect()
            }
            Section::SmallMolecule | Section::SmallMoleculeHeader => SmallMoleculeColumn::ALL
                .iter()
                .copied()
                .map(Self::SmallMolecule)
                .collect(),
            _ => Vec::new(),
        }
    }

    /// Look a stable column up by its bare header name.
    pub fn by_name(section: Section, name: &str) -> Option<StableColumn> {
        Self::all_for(section).into_iter().find(|c| c.name() == name)
    }
}

impl From<ProteinColumn> for StableColumn {
    fn from(value: ProteinColumn) -> Self {
        Self::Protein(value)
    }
}

impl From<PeptideColumn> for StableColumn {
    fn from(value: PeptideColumn) -> Self {
        Self::Peptide(value)
    }
}

impl From<PsmColumn> for StableColumn {
    fn from(value: PsmColumn) -> Self {
        Self::Psm(value)
    }
}

impl From<SmallMoleculeColumn> for StableColumn {
    fn from(value: SmallMoleculeColumn) -> Self {
        Self::SmallMolecule(value)
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_peptide_schema_bounds() {
        assert_eq!(PeptideColumn::Sequence.order(), 1);
        assert_eq!(PeptideColumn::SpectraRef.order(), 16);
        assert_eq!(PeptideColumn::ALL.len(), 16);
        assert_eq!(PsmColumn::ALL.len(), 20);
        assert_eq!(ProteinColumn::ALL.len(), 18);
        assert_eq!(SmallMoleculeColumn::ALL.len(), 20);
    }

    #[test]
    fn test_lookup_by_name() {
        let c = StableColumn::by_name(Section::Protein, "ambiguity_members").unwrap();
        assert_eq!(c.order(), 14);
        assert!(matches!(c.data_type(), DataType::StringList(',')));
        assert!(StableColumn::by_name(Section::Protein, "sequence").is_none());
    }

    #[test]
    fn test_scopes() {
        assert_eq!(
            StableColumn::from(ProteinColumn::NumPsms).scope(),
            ColumnScope::PerRun
        );
        assert_eq!(
            StableColumn::from(PsmColumn::SearchEngineScore).scope(),
            ColumnScope::PerScore
        );
        assert_eq!(
            StableColumn::from(PeptideColumn::SearchEngineScore).scope(),
            ColumnScope::PerScoreAndRun
        );
    }
}
