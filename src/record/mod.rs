//! Table rows: a generic position-keyed value store type-checked against a
//! [`ColumnFactory`], plus the four typed section views layered on top.

mod peptide;
mod protein;
mod psm;
mod small_molecule;

use std::collections::BTreeMap;
use std::fmt::Display;

use crate::columns::{ColumnFactory, DataType};
use crate::modification::Modification;
use crate::params::Param;
use crate::section::Section;
use crate::spectra_ref::SpectraRef;
use crate::values::{print_double, MZBoolean, Reliability, SplitList, Uri, NULL};

pub use peptide::Peptide;
pub use protein::Protein;
pub use psm::Psm;
pub use small_molecule::SmallMolecule;

/// A cell value. `Null` is the absent value every known position starts out
/// holding; it is accepted by any column.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Value {
    Null,
    String(String),
    Integer(i32),
    Double(f64),
    Boolean(MZBoolean),
    Reliability(Reliability),
    Uri(Uri),
    StringList(SplitList<String>),
    DoubleList(SplitList<f64>),
    ParamList(SplitList<Param>),
    ModificationList(SplitList<Modification>),
    SpectraRefList(SplitList<SpectraRef>),
}

impl Value {
    /// The runtime type tag, `None` for `Null`.
    pub fn data_type(&self) -> Option<DataType> {
        match self {
            Self::Null => None,
            Self::String(_) => Some(DataType::String),
            Self::Integer(_) => Some(DataType::Integer),
            Self::Double(_) => Some(DataType::Double),
            Self::Boolean(_) => Some(DataType::Boolean),
            Self::Reliability(_) => Some(DataType::Reliability),
            Self::Uri(_) => Some(DataType::Uri),
            Self::StringList(l) => Some(DataType::StringList(l.separator())),
            Self::DoubleList(_) => Some(DataType::DoubleList),
            Self::ParamList(_) => Some(DataType::ParamList),
            Self::ModificationList(_) => Some(DataType::ModificationList),
            Self::SpectraRefList(_) => Some(DataType::SpectraRefList),
        }
    }

    pub const fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }
}

impl Display for Value {
    /// The cell form: absent values and empty lists both print `null`,
    /// doubles go through the sentinel codec.
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Null => f.write_str(NULL),
            Self::String(v) => f.write_str(v),
            Self::Integer(v) => write!(f, "{v}"),
            Self::Double(v) => f.write_str(&print_double(Some(*v))),
            Self::Boolean(v) => write!(f, "{v}"),
            Self::Reliability(v) => write!(f, "{v}"),
            Self::Uri(v) => write!(f, "{v}"),
            Self::StringList(l) if l.is_empty() => f.write_str(NULL),
            Self::StringList(l) => write!(f, "{l}"),
            Self::DoubleList(l) if l.is_empty() => f.write_str(NULL),
            Self::DoubleList(l) => write!(f, "{l}"),
            Self::ParamList(l) if l.is_empty() => f.write_str(NULL),
            Self::ParamList(l) => write!(f, "{l}"),
            Self::ModificationList(l) if l.is_empty() => f.write_str(NULL),
            Self::ModificationList(l) => write!(f, "{l}"),
            Self::SpectraRefList(l) if l.is_empty() => f.write_str(NULL),
            Self::SpectraRefList(l) => write!(f, "{l}"),
        }
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Self::String(value)
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Self::String(value.to_string())
    }
}

impl From<i32> for Value {
    fn from(value: i32) -> Self {
        Self::Integer(value)
    }
}

impl From<f64> for Value {
    fn from(value: f64) -> Self {
        Self::Double(value)
    }
}

impl From<MZBoolean> for Value {
    fn from(value: MZBoolean) -> Self {
        Self::Boolean(value)
    }
}

impl From<Reliability> for Value {
    fn from(value: Reliability) -> Self {
        Self::Reliability(value)
    }
}

impl From<Uri> for Value {
    fn from(value: Uri) -> Self {
        Self::Uri(value)
    }
}

impl From<SplitList<Modification>> for Value {
    fn from(value: SplitList<Modification>) -> Self {
        Self::ModificationList(value)
    }
}

impl From<SplitList<SpectraRef>> for Value {
    fn from(value: SplitList<SpectraRef>) -> Self {
        Self::SpectraRefList(value)
    }
}

/// One table row, bound at construction to the factory's column snapshot.
/// Every known position is pre-seeded with [`Value::Null`] so serialization
/// always emits the full column count.
///
/// Columns appended to the factory *after* a record was created are unknown
/// to that record; build the schema first, then the rows.
#[derive(Debug, Clone, PartialEq)]
pub struct Record {
    section: Section,
    schema: BTreeMap<String, DataType>,
    values: BTreeMap<String, Value>,
}

impl Record {
    pub fn new(factory: &ColumnFactory) -> Self {
        let mut schema = BTreeMap::new();
        let mut values = BTreeMap::new();
        for column in factory.columns() {
            schema.insert(column.logical_position().to_string(), column.data_type());
            values.insert(column.logical_position().to_string(), Value::Null);
        }
        Self {
            section: factory.section(),
            schema,
            values,
        }
    }

    pub const fn section(&self) -> Section {
        self.section
    }

    /// The central type gate. Returns `false` without storing anything when
    /// the position is unknown or the value's runtime type does not equal
    /// the column's declared type; `Null` always passes.
    pub fn set_value(&mut self, position: &str, value: Value) -> bool {
        let Some(declared) = self.schema.get(position) else {
            return false;
        };
        if let Some(kind) = value.data_type() {
            if !kind.compatible(declared) {
                log::warn!(
                    "rejecting {kind:?} write to column at {position} declared as {declared:?}"
                );
                return false;
            }
        }
        self.values.insert(position.to_string(), value);
        true
    }

    pub fn value(&self, position: &str) -> Option<&Value> {
        self.values.get(position)
    }

    pub fn positions(&self) -> impl Iterator<Item = &str> {
        self.values.keys().map(String::as_str)
    }

    // The typed getters re-check the stored variant even though `set_value`
    // gated the write; a record may also have been populated through the
    // untyped decode path.

    pub fn get_string(&self, position: &str) -> Option<&str> {
        match self.values.get(position)? {
            Value::String(v) => Some(v),
            _ => None,
        }
    }

    pub fn get_integer(&self, position: &str) -> Option<i32> {
        match self.values.get(position)? {
            Value::Integer(v) => Some(*v),
            _ => None,
        }
    }

    pub fn get_double(&self, position: &str) -> Option<f64> {
        match self.values.get(position)? {
            Value::Double(v) => Some(*v),
            _ => None,
        }
    }

    pub fn get_boolean(&self, position: &str) -> Option<MZBoolean> {
        match self.values.get(position)? {
            Value::Boolean(v) => Some(*v),
            _ => None,
        }
    }

    pub fn get_reliability(&self, position: &str) -> Option<Reliability> {
        match self.values.get(position)? {
            Value::Reliability(v) => Some(*v),
            _ => None,
        }
    }

    pub fn get_uri(&self, position: &str) -> Option<&Uri> {
        match self.values.get(position)? {
            Value::Uri(v) => Some(v),
            _ => None,
        }
    }

    pub fn get_string_list(&self, position: &str) -> Option<&SplitList<String>> {
        match self.values.get(position)? {
            Value::StringList(v) => Some(v),
            _ => None,
        }
    }

    pub fn get_double_list(&self, position: &str) -> Option<&SplitList<f64>> {
        match self.values.get(position)? {
            Value::DoubleList(v) => Some(v),
            _ => None,
        }
    }

    pub fn get_param_list(&self, position: &str) -> Option<&SplitList<Param>> {
        match self.values.get(position)? {
            Value::ParamList(v) => Some(v),
            _ => None,
        }
    }

    pub fn get_modification_list(&self, position: &str) -> Option<&SplitList<Modification>> {
        match self.values.get(position)? {
            Value::ModificationList(v) => Some(v),
            _ => None,
        }
    }

    pub fn get_spectra_ref_list(&self, position: &str) -> Option<&SplitList<SpectraRef>> {
        match self.values.get(position)? {
            Value::SpectraRefList(v) => Some(v),
            _ => None,
        }
    }

    /// The serialized row: section prefix, then every position's value in
    /// logical order, TAB separated.
    pub fn print_line(&self) -> String {
        let mut line = self.section.prefix().to_string();
        for value in self.values.values() {
            line.push('\t');
            line.push_str(&value.to_string());
        }
        line
    }
}

impl Display for Record {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.print_line())
    }
}

/// Resolve a runtime column by header through the factory, the way the
/// abundance and `opt_` accessors address cells whose positions are only
/// known after the factory was extended.
pub(crate) fn header_position(factory: &ColumnFactory, header: &str) -> Option<String> {
    factory
        .find_column_by_header(header)
        .map(|c| c.logical_position().to_string())
}

macro_rules! impl_table_record {
    ($t:ident, $section:expr) => {
        impl $t {
            /// A fresh row with every column of `factory` pre-seeded absent.
            pub fn new(
                factory: &$crate::columns::ColumnFactory,
            ) -> Result<Self, $crate::columns::ColumnError> {
                if factory.section() != $section {
                    return Err($crate::columns::ColumnError::SectionMismatch {
                        expected: $section,
                        found: factory.section(),
                    });
                }
                Ok(Self {
                    record: $crate::record::Record::new(factory),
                })
            }

            /// Adopt a generic record, e.g. one built by the decoder.
            pub fn from_record(
                record: $crate::record::Record,
            ) -> Result<Self, $crate::columns::ColumnError> {
                if record.section() != $section {
                    return Err($crate::columns::ColumnError::SectionMismatch {
                        expected: $section,
                        found: record.section(),
                    });
                }
                Ok(Self { record })
            }

            pub fn record(&self) -> &$crate::record::Record {
                &self.record
            }

            pub fn record_mut(&mut self) -> &mut $crate::record::Record {
                &mut self.record
            }

            pub fn into_record(self) -> $crate::record::Record {
                self.record
            }

            /// The abundance cell for an assay, resolved by header.
            pub fn abundance_assay(
                &self,
                factory: &$crate::columns::ColumnFactory,
                assay: &$crate::metadata::Assay,
            ) -> Option<f64> {
                use $crate::metadata::IndexedElement;
                let header = format!(
                    "{}_abundance_{}",
                    $section.abundance_name(),
                    assay.reference()
                );
                self.record
                    .get_double(&$crate::record::header_position(factory, &header)?)
            }

            pub fn set_abundance_assay(
                &mut self,
                factory: &$crate::columns::ColumnFactory,
                assay: &$crate::metadata::Assay,
                value: f64,
            ) -> bool {
                use $crate::metadata::IndexedElement;
                let header = format!(
                    "{}_abundance_{}",
                    $section.abundance_name(),
                    assay.reference()
                );
                match $crate::record::header_position(factory, &header) {
                    Some(position) => self
                        .record
                        .set_value(&position, $crate::record::Value::Double(value)),
                    None => false,
                }
            }

            /// One of the three abundance cells for a study variable.
            pub fn abundance_study_variable(
                &self,
                factory: &$crate::columns::ColumnFactory,
                field: $crate::columns::AbundanceField,
                study_variable: &$crate::metadata::StudyVariable,
            ) -> Option<f64> {
                use $crate::metadata::IndexedElement;
                let header = format!(
                    "{}_{}_{}",
                    $section.abundance_name(),
                    field.name(),
                    study_variable.reference()
                );
                self.record
                    .get_double(&$crate::record::header_position(factory, &header)?)
            }

            pub fn set_abundance_study_variable(
                &mut self,
                factory: &$crate::columns::ColumnFactory,
                field: $crate::columns::AbundanceField,
                study_variable: &$crate::metadata::StudyVariable,
                value: f64,
            ) -> bool {
                use $crate::metadata::IndexedElement;
                let header = format!(
                    "{}_{}_{}",
                    $section.abundance_name(),
                    field.name(),
                    study_variable.reference()
                );
                match $crate::record::header_position(factory, &header) {
                    Some(position) => self
                        .record
                        .set_value(&position, $crate::record::Value::Double(value)),
                    None => false,
                }
            }

            /// Read an `opt_` cell by its full header.
            pub fn opt_value(
                &self,
                factory: &$crate::columns::ColumnFactory,
                header: &str,
            ) -> Option<&$crate::record::Value> {
                self.record
                    .value(&$crate::record::header_position(factory, header)?)
            }

            /// Write an `opt_` cell by its full header. Subject to the same
            /// type gate as any other write.
            pub fn set_opt_value(
                &mut self,
                factory: &$crate::columns::ColumnFactory,
                header: &str,
                value: $crate::record::Value,
            ) -> bool {
                match $crate::record::header_position(factory, header) {
                    Some(position) => self.record.set_value(&position, value),
                    None => false,
                }
            }
        }

        impl std::fmt::Display for $t {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}", self.record)
            }
        }
    };
}

pub(crate) use impl_table_record;

#[cfg(test)]
mod test {
    use super::*;
    use crate::columns::PeptideColumn;
    use crate::modification::parse_modification_list;

    fn peptide_factory() -> ColumnFactory {
        ColumnFactory::for_section(Section::Peptide).unwrap()
    }

    #[test]
    fn test_record_seeds_all_columns() {
        let factory = peptide_factory();
        let record = Record::new(&factory);
        assert_eq!(record.positions().count(), factory.len());
        assert!(record.value("01").unwrap().is_null());
        let line = record.print_line();
        assert_eq!(line.matches('\t').count(), factory.len());
        assert!(line.starts_with("PEP\tnull\t"));
    }

    #[test]
    fn test_type_gate_rejects_mismatch() {
        let factory = peptide_factory();
        let mut record = Record::new(&factory);

        // sequence (01) is a string column
        assert!(record.set_value("01", Value::from("PEPTIDE")));
        // an integer must be rejected and the prior value preserved
        assert!(!record.set_value("01", Value::Integer(42)));
        assert_eq!(record.get_string("01"), Some("PEPTIDE"));

        // unknown positions are rejected quietly
        assert!(!record.set_value("99", Value::from("x")));

        // Null always passes
        assert!(record.set_value("01", Value::Null));
        assert!(record.value("01").unwrap().is_null());
    }

    #[test]
    fn test_typed_getters_recheck() {
        let factory = peptide_factory();
        let mut record = Record::new(&factory);
        record.set_value("13", Value::Integer(2));
        assert_eq!(record.get_integer("13"), Some(2));
        assert_eq!(record.get_double("13"), None);
        assert_eq!(record.get_string("13"), None);
    }

    #[test]
    fn test_line_serialization() {
        let factory = peptide_factory();
        let mut record = Record::new(&factory);
        assert_eq!(PeptideColumn::Sequence.order(), 1);
        record.set_value("01", Value::from("PEPTIDE"));
        record.set_value("13", Value::Integer(2));
        record.set_value("14", Value::Double(f64::NAN));
        record.set_value(
            "10",
            Value::ModificationList(parse_modification_list(Section::Peptide, "3-MOD:00001")),
        );

        // the 12 mandatory columns serialize at physical slots 1..=12,
        // skipping the undeclared optional orders
        let line = record.print_line();
        let fields: Vec<&str> = line.split('\t').collect();
        assert_eq!(fields.len(), 13);
        assert_eq!(fields[0], "PEP");
        assert_eq!(fields[1], "PEPTIDE");
        assert_eq!(fields[7], "3-MOD:00001");
        assert_eq!(fields[10], "2");
        assert_eq!(fields[11], "NaN");
        assert_eq!(fields[12], "null");
    }

    #[test]
    fn test_empty_list_prints_null() {
        assert_eq!(Value::DoubleList(SplitList::bar()).to_string(), "null");
        assert_eq!(Value::Null.to_string(), "null");
        assert_eq!(Value::Double(f64::INFINITY).to_string(), "INF");
    }
}
