//! Data row decoding: maps the physical cells of a `PRT`/`PEP`/`PSM`/`SML`
//! line onto a fresh [`Record`] through the declared column types.

use log::warn;

use crate::columns::DataType;
use crate::modification::parse_modification_list;
use crate::params::parse_param_list;
use crate::record::{Record, Value};
use crate::section::Section;
use crate::spectra_ref::parse_spectra_ref_list;
use crate::values::{
    parse_boolean, parse_double, parse_double_list, parse_integer, parse_reliability,
    parse_string_list, parse_uri, NULL,
};

use super::header::TableHeader;
use super::MZTabError;

/// Decode one cell. Unparsable scalars decay to `Null`; downstream
/// validation decides whether missing and invalid need distinguishing.
fn parse_cell(section: Section, data_type: DataType, token: &str) -> Value {
    let trimmed = token.trim();
    if trimmed.is_empty() || trimmed == NULL {
        return Value::Null;
    }
    let value = match data_type {
        DataType::String => Some(Value::String(trimmed.to_string())),
        DataType::Integer => parse_integer(trimmed).map(Value::Integer),
        DataType::Double => parse_double(trimmed).map(Value::Double),
        DataType::Boolean => parse_boolean(trimmed).map(Value::Boolean),
        DataType::Reliability => parse_reliability(trimmed).map(Value::Reliability),
        DataType::Uri => parse_uri(trimmed).map(Value::Uri),
        DataType::StringList(separator) => {
            Some(Value::StringList(parse_string_list(trimmed, separator)))
        }
        DataType::DoubleList => Some(Value::DoubleList(parse_double_list(trimmed))),
        DataType::ParamList => Some(Value::ParamList(parse_param_list(trimmed))),
        DataType::ModificationList => Some(Value::ModificationList(parse_modification_list(
            section, trimmed,
        ))),
        DataType::SpectraRefList => Some(Value::SpectraRefList(parse_spectra_ref_list(trimmed))),
    };
    match value {
        Some(value) => value,
        None => {
            warn!("dropping unparsable {data_type:?} cell {trimmed:?}");
            Value::Null
        }
    }
}

/// Decode the data fields (everything after the three-letter prefix) of one
/// row line against a reconstructed header.
pub(crate) fn parse_row_line(
    line: u64,
    section: Section,
    fields: &[&str],
    header: &TableHeader,
) -> Result<Record, MZTabError> {
    if fields.len() != header.physical.len() {
        return Err(MZTabError::FieldCountMismatch {
            line,
            expected: header.physical.len(),
            found: fields.len(),
        });
    }
    let mut record = Record::new(&header.factory);
    for (position, token) in header.physical.iter().zip(fields) {
        let Some(column) = header.factory.column_by_position(position) else {
            continue;
        };
        let value = parse_cell(section, column.data_type(), token);
        record.set_value(position, value);
    }
    Ok(record)
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::io::header::parse_header_line;
    use crate::metadata::{MZTabMode, MZTabType, Metadata};
    use crate::record::Peptide;
    use crate::values::parse_uri as uri;

    fn header() -> TableHeader {
        let mut metadata = Metadata::new(MZTabMode::Complete, MZTabType::Identification);
        metadata
            .add_ms_run_location(1, uri("file:/r1.mzML").unwrap())
            .unwrap();
        let fields = vec![
            "sequence",
            "accession",
            "unique",
            "database",
            "database_version",
            "search_engine",
            "reliability",
            "modifications",
            "retention_time",
            "retention_time_window",
            "charge",
            "mass_to_charge",
            "spectra_ref",
        ];
        parse_header_line(2, Section::PeptideHeader, &fields, &metadata).unwrap()
    }

    #[test]
    fn test_row_decoding() {
        let table = header();
        let fields = vec![
            "EIEILACEIR",
            "P02768",
            "0",
            "UniProtKB",
            "2014_08",
            "[MS,MS:1001207,Mascot,]",
            "2",
            "3-MOD:00412",
            "10.2|11.5",
            "null",
            "2",
            "NaN",
            "ms_run[1]:index=5",
        ];
        let record = parse_row_line(3, Section::Peptide, &fields, &table).unwrap();
        let peptide = Peptide::from_record(record).unwrap();
        assert_eq!(peptide.sequence(), Some("EIEILACEIR"));
        assert_eq!(peptide.charge(), Some(2));
        assert_eq!(peptide.retention_time().unwrap().len(), 2);
        assert!(peptide.retention_time_window().is_none());
        assert!(peptide.mass_to_charge().unwrap().is_nan());
        assert_eq!(
            peptide.spectra_ref().unwrap().first().unwrap().ms_run_id(),
            1
        );
    }

    #[test]
    fn test_row_round_trip_against_same_factory() {
        use crate::columns::ColumnFactory;
        use crate::modification::parse_modification_list;

        let factory = ColumnFactory::for_section(Section::Peptide).unwrap();
        let mut peptide = Peptide::new(&factory).unwrap();
        peptide.set_sequence("PEPTIDE");
        peptide.set_charge(2);
        peptide.set_modifications(parse_modification_list(Section::Peptide, "3-MOD:00001"));

        let line = peptide.to_string();
        let cells: Vec<&str> = line.split('\t').skip(1).collect();

        let mut metadata = Metadata::new(MZTabMode::Summary, MZTabType::Identification);
        metadata
            .add_ms_run_location(1, uri("file:/r1.mzML").unwrap())
            .unwrap();
        let header_fields: Vec<String> = factory
            .columns()
            .map(|c| c.header().to_string())
            .collect();
        let header_fields: Vec<&str> = header_fields.iter().map(String::as_str).collect();
        let table =
            parse_header_line(1, Section::PeptideHeader, &header_fields, &metadata).unwrap();

        let record = parse_row_line(2, Section::Peptide, &cells, &table).unwrap();
        assert_eq!(&record, peptide.record());
    }

    #[test]
    fn test_field_count_mismatch() {
        let table = header();
        let fields = vec!["EIEILACEIR", "P02768"];
        assert!(matches!(
            parse_row_line(3, Section::Peptide, &fields, &table),
            Err(MZTabError::FieldCountMismatch { .. })
        ));
    }

    #[test]
    fn test_unparsable_scalar_decays_to_null() {
        let table = header();
        let mut fields = vec![
            "EIEILACEIR",
            "P02768",
            "0",
            "null",
            "null",
            "null",
            "null",
            "null",
            "null",
            "null",
            "two",
            "null",
            "null",
        ];
        let record = parse_row_line(3, Section::Peptide, &fields, &table).unwrap();
        let peptide = Peptide::from_record(record.clone()).unwrap();
        assert_eq!(peptide.charge(), None);

        // and the malformed-list contract empties the whole cell
        fields[8] = "10.2|eleven";
        fields[10] = "2";
        let record = parse_row_line(3, Section::Peptide, &fields, &table).unwrap();
        let peptide = Peptide::from_record(record).unwrap();
        assert!(peptide.retention_time().unwrap().is_empty());
    }
}
