//! User-defined `opt_` columns, plain or CV-parameter keyed.

use std::sync::OnceLock;

use regex::Regex;

use crate::metadata::IndexedElement;
use crate::params::Param;

use super::{logical_position, ColumnError, DataType, MZTabColumn};

fn header_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"^[A-Za-z0-9_\-\[\]:]+$").expect("static optional header pattern")
    })
}

fn scope_of(element: Option<&dyn IndexedElement>) -> String {
    element.map_or_else(|| "global".to_string(), |element| element.reference())
}

fn underscored(value: &str) -> String {
    value.trim().replace(' ', "_")
}

/// `opt_{assay[1]|study_variable[1]|ms_run[1]|global}_{name}`.
pub fn option_header(element: Option<&dyn IndexedElement>, name: &str) -> String {
    format!("opt_{}_{}", scope_of(element), underscored(name))
}

/// `opt_{scope}_cv_{accession}_{name}`.
pub fn cv_option_header(element: Option<&dyn IndexedElement>, param: &Param) -> String {
    format!(
        "opt_{}_cv_{}_{}",
        scope_of(element),
        param.accession().unwrap_or_default(),
        underscored(param.name())
    )
}

/// Build an `opt_` column at `offset + 1`, enforcing the header character
/// restriction.
pub fn create_option_column(
    element: Option<&dyn IndexedElement>,
    name: &str,
    data_type: DataType,
    offset: u32,
) -> Result<MZTabColumn, ColumnError> {
    let header = option_header(element, name);
    if !header_pattern().is_match(&header) {
        return Err(ColumnError::InvalidHeader(header));
    }
    Ok(MZTabColumn::new(
        header,
        data_type,
        true,
        logical_position(offset + 1, None, None),
    ))
}

/// Build a CV-parameter keyed `opt_` column at `offset + 1`.
pub fn create_cv_option_column(
    element: Option<&dyn IndexedElement>,
    param: &Param,
    data_type: DataType,
    offset: u32,
) -> Result<MZTabColumn, ColumnError> {
    let header = cv_option_header(element, param);
    if !header_pattern().is_match(&header) {
        return Err(ColumnError::InvalidHeader(header));
    }
    Ok(MZTabColumn::new(
        header,
        data_type,
        true,
        logical_position(offset + 1, None, None),
    ))
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::metadata::Assay;

    #[test]
    fn test_global_header() {
        let column =
            create_option_column(None, "my value", DataType::String, 18).unwrap();
        assert_eq!(column.header(), "opt_global_my_value");
        assert_eq!(column.logical_position(), "19");
        assert!(column.is_optional());
    }

    #[test]
    fn test_scoped_header() {
        let assay = Assay::new(1);
        let column = create_option_column(
            Some(&assay),
            "spectral count",
            DataType::Integer,
            20,
        )
        .unwrap();
        assert_eq!(column.header(), "opt_assay[1]_spectral_count");
    }

    #[test]
    fn test_cv_header() {
        let param = Param::cv("MS", "MS:1002217", "decoy peptide", "").unwrap();
        let column = create_cv_option_column(None, &param, DataType::String, 20).unwrap();
        assert_eq!(column.header(), "opt_global_cv_MS:1002217_decoy_peptide");
    }

    #[test]
    fn test_charset_restriction() {
        assert!(create_option_column(None, "bad!name", DataType::String, 5).is_err());
    }
}
