//! The dynamic table schema: a fixed stable column set per section plus
//! runtime-appended abundance, `opt_` and score columns, all held in one
//! ordered registry keyed by logical position.

pub mod abundance;
pub mod optional;
mod stable;

use std::collections::BTreeMap;

use indexmap::IndexMap;
use thiserror::Error;

use crate::metadata::{Assay, IndexedElement, MsRun, StudyVariable};
use crate::params::Param;
use crate::section::Section;

pub use abundance::{create_assay_column, create_study_variable_columns, AbundanceField};
pub use optional::{create_cv_option_column, create_option_column, cv_option_header, option_header};
pub use stable::{
    ColumnScope, PeptideColumn, ProteinColumn, PsmColumn, SmallMoleculeColumn, StableColumn,
};

#[derive(Debug, Error)]
pub enum ColumnError {
    #[error("{0:?} is not a data section")]
    NotADataSection(Section),
    #[error("this factory describes {expected:?}, not {found:?}")]
    SectionMismatch { expected: Section, found: Section },
    #[error("a column with header {0:?} already exists")]
    DuplicateHeader(String),
    #[error("{0:?} contains characters outside [A-Za-z0-9_\\-\\[\\]:]")]
    InvalidHeader(String),
    #[error("score ids are 1-based, 0 is not a valid id")]
    InvalidScoreId,
    #[error("{section:?} has no {column} column")]
    NoSuchColumn {
        section: Section,
        column: &'static str,
    },
    #[error("{column} is not an on-demand optional column")]
    NotOnDemand { column: &'static str },
    #[error("search_engine_score in {0:?} is scoped per ms_run, one must be given")]
    MsRunRequired(Section),
    #[error("search_engine_score in {0:?} takes no ms_run")]
    MsRunNotAllowed(Section),
}

/// The declared value kind of a column. Row writes are gated on this tag;
/// for list kinds the embedded char is the serialization delimiter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum DataType {
    String,
    Integer,
    Double,
    Boolean,
    Reliability,
    Uri,
    StringList(char),
    DoubleList,
    ParamList,
    ModificationList,
    SpectraRefList,
}

impl DataType {
    /// Type equality as the write gate sees it: the delimiter of a string
    /// list is presentation, not type.
    pub fn compatible(&self, other: &DataType) -> bool {
        matches!(
            (self, other),
            (DataType::StringList(_), DataType::StringList(_))
        ) || self == other
    }
}

/// Compose a sortable logical position: a two-digit base order, then the
/// score id, then the scoping element's id, all as decimal strings. Element
/// scoped columns thereby sort directly after their base column and before
/// the next stable order.
pub fn logical_position(order: u32, id: Option<u32>, element_id: Option<u32>) -> String {
    let mut position = format!("{order:02}");
    if let Some(id) = id {
        position.push_str(&id.to_string());
    }
    if let Some(element_id) = element_id {
        position.push_str(&element_id.to_string());
    }
    position
}

/// One column of a data table: its header string, declared value type,
/// whether it was appended beyond the mandatory schema, and the logical
/// position that fixes its serialization order.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct MZTabColumn {
    header: String,
    data_type: DataType,
    optional: bool,
    logical_position: String,
}

impl MZTabColumn {
    pub fn new(
        header: impl Into<String>,
        data_type: DataType,
        optional: bool,
        logical_position: String,
    ) -> Self {
        Self {
            header: header.into(),
            data_type,
            optional,
            logical_position,
        }
    }

    pub fn header(&self) -> &str {
        &self.header
    }

    pub const fn data_type(&self) -> DataType {
        self.data_type
    }

    pub const fn is_optional(&self) -> bool {
        self.optional
    }

    pub fn logical_position(&self) -> &str {
        &self.logical_position
    }
}

/// The schema registry for exactly one data table. Mutated only by
/// appending; existing columns are never removed or reordered.
#[derive(Debug, Clone)]
pub struct ColumnFactory {
    section: Section,
    columns: BTreeMap<String, MZTabColumn>,
    headers: IndexMap<String, String>,
    highest_order: u32,
}

impl ColumnFactory {
    /// A factory seeded with the mandatory stable columns of `section`.
    /// Accepts either the data or the header variant of a section.
    pub fn for_section(section: Section) -> Result<Self, ColumnError> {
        let data_section = section
            .to_data()
            .ok_or(ColumnError::NotADataSection(section))?;
        let mut factory = Self {
            section: data_section,
            columns: BTreeMap::new(),
            headers: IndexMap::new(),
            highest_order: 0,
        };
        for column in StableColumn::all_for(data_section) {
            if column.scope() == ColumnScope::Mandatory {
                factory.add_column(MZTabColumn::new(
                    column.name(),
                    column.data_type(),
                    false,
                    logical_position(column.order(), None, None),
                ))?;
            }
            // reserve the base order so appended columns always sort last
            factory.highest_order = factory.highest_order.max(column.order());
        }
        Ok(factory)
    }

    /// The data section this factory describes.
    pub const fn section(&self) -> Section {
        self.section
    }

    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    /// Columns in logical position order.
    pub fn columns(&self) -> impl Iterator<Item = &MZTabColumn> {
        self.columns.values()
    }

    pub fn column_by_position(&self, position: &str) -> Option<&MZTabColumn> {
        self.columns.get(position)
    }

    /// Linear scan by header. Column counts stay in the low hundreds at
    /// worst, so this is not worth an index.
    pub fn find_column_by_header(&self, header: &str) -> Option<&MZTabColumn> {
        self.columns.values().find(|c| c.header == header)
    }

    /// The numeric component of the current maximum logical position, the
    /// append offset for the next optional column.
    pub const fn highest_order(&self) -> u32 {
        self.highest_order
    }

    fn add_column(&mut self, column: MZTabColumn) -> Result<(), ColumnError> {
        if self.headers.contains_key(&column.header) {
            return Err(ColumnError::DuplicateHeader(column.header));
        }
        if self.columns.contains_key(&column.logical_position) {
            return Err(ColumnError::DuplicateHeader(column.header));
        }
        if let Ok(order) = column.logical_position[..2].parse::<u32>() {
            self.highest_order = self.highest_order.max(order);
        }
        self.headers
            .insert(column.header.clone(), column.logical_position.clone());
        self.columns
            .insert(column.logical_position.clone(), column);
        Ok(())
    }

    /// Append a pre-built column, used by the decoder to mirror a header
    /// line verbatim.
    pub(crate) fn add_raw_column(&mut self, column: MZTabColumn) -> Result<(), ColumnError> {
        self.add_column(column)
    }

    fn stable(&self, name: &'static str) -> Result<StableColumn, ColumnError> {
        StableColumn::by_name(self.section, name).ok_or(ColumnError::NoSuchColumn {
            section: self.section,
            column: name,
        })
    }

    /// Add one of the section's on-demand stable columns (`reliability`,
    /// `uri`, `go_terms`, `protein_coverage`).
    pub fn add_optional_stable_column(
        &mut self,
        column: impl Into<StableColumn>,
    ) -> Result<(), ColumnError> {
        let column = column.into();
        if column.section() != self.section {
            return Err(ColumnError::SectionMismatch {
                expected: self.section,
                found: column.section(),
            });
        }
        if column.scope() != ColumnScope::Optional {
            return Err(ColumnError::NotOnDemand {
                column: column.name(),
            });
        }
        self.add_column(MZTabColumn::new(
            column.name(),
            column.data_type(),
            true,
            logical_position(column.order(), None, None),
        ))
    }

    /// Add a per-ms_run counter column such as `num_psms_ms_run[2]`.
    pub fn add_per_run_column(
        &mut self,
        column: impl Into<StableColumn>,
        ms_run: &MsRun,
    ) -> Result<(), ColumnError> {
        let column = column.into();
        if column.section() != self.section {
            return Err(ColumnError::SectionMismatch {
                expected: self.section,
                found: column.section(),
            });
        }
        if column.scope() != ColumnScope::PerRun {
            return Err(ColumnError::NotOnDemand {
                column: column.name(),
            });
        }
        self.add_column(MZTabColumn::new(
            format!("{}_ms_run[{}]", column.name(), ms_run.id()),
            column.data_type(),
            true,
            logical_position(column.order(), None, Some(ms_run.id())),
        ))
    }

    /// Add `best_search_engine_score[id]`.
    pub fn add_best_search_engine_score_column(&mut self, id: u32) -> Result<(), ColumnError> {
        if id == 0 {
            return Err(ColumnError::InvalidScoreId);
        }
        let column = self.stable("best_search_engine_score")?;
        self.add_column(MZTabColumn::new(
            format!("{}[{id}]", column.name()),
            column.data_type(),
            true,
            logical_position(column.order(), Some(id), None),
        ))
    }

    /// Add `search_engine_score[id]_ms_run[m]`, or for the PSM table the
    /// run-less `search_engine_score[id]`.
    pub fn add_search_engine_score_column(
        &mut self,
        id: u32,
        ms_run: Option<&MsRun>,
    ) -> Result<(), ColumnError> {
        if id == 0 {
            return Err(ColumnError::InvalidScoreId);
        }
        let column = self.stable("search_engine_score")?;
        match (column.scope(), ms_run) {
            (ColumnScope::PerScoreAndRun, Some(ms_run)) => self.add_column(MZTabColumn::new(
                format!("{}[{id}]_ms_run[{}]", column.name(), ms_run.id()),
                column.data_type(),
                true,
                logical_position(column.order(), Some(id), Some(ms_run.id())),
            )),
            (ColumnScope::PerScoreAndRun, None) => Err(ColumnError::MsRunRequired(self.section)),
            (ColumnScope::PerScore, None) => self.add_column(MZTabColumn::new(
                format!("{}[{id}]", column.name()),
                column.data_type(),
                true,
                logical_position(column.order(), Some(id), None),
            )),
            (ColumnScope::PerScore, Some(_)) => Err(ColumnError::MsRunNotAllowed(self.section)),
            _ => Err(ColumnError::NoSuchColumn {
                section: self.section,
                column: "search_engine_score",
            }),
        }
    }

    /// Append the abundance column for one assay. Returns the new header.
    pub fn add_abundance_column(&mut self, assay: &Assay) -> Result<String, ColumnError> {
        let column = create_assay_column(self.section, assay, self.highest_order)?;
        let header = column.header.clone();
        self.add_column(column)?;
        Ok(header)
    }

    /// Append the abundance/stdev/std_error triple for one study variable.
    /// Returns the three new headers.
    pub fn add_abundance_columns(
        &mut self,
        study_variable: &StudyVariable,
    ) -> Result<[String; 3], ColumnError> {
        let columns =
            create_study_variable_columns(self.section, study_variable, self.highest_order)?;
        let headers = [
            columns[0].header.clone(),
            columns[1].header.clone(),
            columns[2].header.clone(),
        ];
        for column in columns {
            self.add_column(column)?;
        }
        Ok(headers)
    }

    /// Append a named `opt_` column. Returns the new header.
    pub fn add_optional_column(
        &mut self,
        element: Option<&dyn IndexedElement>,
        name: &str,
        data_type: DataType,
    ) -> Result<String, ColumnError> {
        let column = create_option_column(element, name, data_type, self.highest_order)?;
        let header = column.header.clone();
        self.add_column(column)?;
        Ok(header)
    }

    /// Append a CV-parameter keyed `opt_` column. Returns the new header.
    pub fn add_cv_param_optional_column(
        &mut self,
        element: Option<&dyn IndexedElement>,
        param: &Param,
        data_type: DataType,
    ) -> Result<String, ColumnError> {
        let column = create_cv_option_column(element, param, data_type, self.highest_order)?;
        let header = column.header.clone();
        self.add_column(column)?;
        Ok(header)
    }

    /// The table header line, `PRH`/`PEH`/`PSH`/`SMH` plus every column
    /// header in logical position order.
    pub fn print_header(&self) -> String {
        let mut line = self
            .section
            .to_header()
            .map(|s| s.prefix().to_string())
            .unwrap_or_default();
        for column in self.columns.values() {
            line.push('\t');
            line.push_str(&column.header);
        }
        line
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_seeded_mandatory_columns() {
        let factory = ColumnFactory::for_section(Section::Peptide).unwrap();
        assert_eq!(factory.len(), 12);
        assert!(factory.find_column_by_header("sequence").is_some());
        assert!(factory.find_column_by_header("reliability").is_none());
        // appended columns start beyond the full stable schema
        assert_eq!(factory.highest_order(), 16);
    }

    #[test]
    fn test_header_line() {
        let factory = ColumnFactory::for_section(Section::Peptide).unwrap();
        let header = factory.print_header();
        assert!(header.starts_with("PEH\tsequence\taccession\tunique\t"));
        assert!(header.ends_with("\tspectra_ref"));
    }

    #[test]
    fn test_score_column_positions() {
        let mut factory = ColumnFactory::for_section(Section::Protein).unwrap();
        factory.add_best_search_engine_score_column(1).unwrap();
        let column = factory
            .find_column_by_header("best_search_engine_score[1]")
            .unwrap();
        assert_eq!(column.logical_position(), "081");

        let ms_run = MsRun::new(2);
        factory
            .add_search_engine_score_column(1, Some(&ms_run))
            .unwrap();
        let column = factory
            .find_column_by_header("search_engine_score[1]_ms_run[2]")
            .unwrap();
        assert_eq!(column.logical_position(), "0912");

        // derived positions slot between their base orders
        assert!("081" > "08" && "081" < "09");
        assert!("0912" > "09" && "0912" < "10");
    }

    #[test]
    fn test_psm_score_column_takes_no_run() {
        let mut factory = ColumnFactory::for_section(Section::PSM).unwrap();
        let ms_run = MsRun::new(1);
        assert!(factory
            .add_search_engine_score_column(1, Some(&ms_run))
            .is_err());
        factory.add_search_engine_score_column(1, None).unwrap();
        assert!(factory
            .find_column_by_header("search_engine_score[1]")
            .is_some());
        // and the PSM table has no best_search_engine_score at all
        assert!(factory.add_best_search_engine_score_column(1).is_err());
    }

    #[test]
    fn test_abundance_append_is_strictly_increasing() {
        let mut factory = ColumnFactory::for_section(Section::Protein).unwrap();
        let max_before: String = factory
            .columns()
            .map(|c| c.logical_position().to_string())
            .max()
            .unwrap();

        let sv = StudyVariable::new(1);
        let headers = factory.add_abundance_columns(&sv).unwrap();
        assert_eq!(headers[0], "protein_abundance_study_variable[1]");

        let positions: Vec<String> = headers
            .iter()
            .map(|h| {
                factory
                    .find_column_by_header(h)
                    .unwrap()
                    .logical_position()
                    .to_string()
            })
            .collect();
        assert!(positions.windows(2).all(|w| w[0] < w[1]));
        assert!(positions.iter().all(|p| p.as_str() > max_before.as_str()));

        // a second append lands after the first
        let assay = Assay::new(1);
        let header = factory.add_abundance_column(&assay).unwrap();
        let assay_position = factory
            .find_column_by_header(&header)
            .unwrap()
            .logical_position();
        assert!(assay_position > positions[2].as_str());
    }

    #[test]
    fn test_duplicate_headers_rejected() {
        let mut factory = ColumnFactory::for_section(Section::Protein).unwrap();
        factory
            .add_optional_column(None, "my value", DataType::String)
            .unwrap();
        assert!(matches!(
            factory.add_optional_column(None, "my value", DataType::String),
            Err(ColumnError::DuplicateHeader(_))
        ));
        // different name is fine and resolves to the same column later
        let header = factory
            .add_optional_column(None, "other value", DataType::Double)
            .unwrap();
        let first = factory.find_column_by_header(&header).unwrap().clone();
        let second = factory.find_column_by_header(&header).unwrap();
        assert_eq!(&first, second);
    }

    #[test]
    fn test_wrong_section_stable_column() {
        let mut factory = ColumnFactory::for_section(Section::Peptide).unwrap();
        assert!(factory
            .add_optional_stable_column(ProteinColumn::Reliability)
            .is_err());
        factory
            .add_optional_stable_column(PeptideColumn::Reliability)
            .unwrap();
        assert!(factory.find_column_by_header("reliability").is_some());
    }

    #[test]
    fn test_per_run_counter_columns() {
        let mut factory = ColumnFactory::for_section(Section::Protein).unwrap();
        let ms_run = MsRun::new(1);
        factory
            .add_per_run_column(ProteinColumn::NumPsms, &ms_run)
            .unwrap();
        let column = factory.find_column_by_header("num_psms_ms_run[1]").unwrap();
        assert_eq!(column.logical_position(), "111");
        assert!(factory
            .add_per_run_column(ProteinColumn::Accession, &ms_run)
            .is_err());
    }
}
