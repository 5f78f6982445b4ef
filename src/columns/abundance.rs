//! Quantitative abundance columns, always appended at the right edge of a
//! data table and scoped to an assay or a study variable.

use crate::metadata::{Assay, IndexedElement, StudyVariable};
use crate::section::Section;

use super::{logical_position, ColumnError, DataType, MZTabColumn};

/// The three statistics a study-variable abundance reports. The field
/// position is the column's offset within one appended group.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AbundanceField {
    Abundance,
    Stdev,
    StdError,
}

impl AbundanceField {
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Abundance => "abundance",
            Self::Stdev => "abundance_stdev",
            Self::StdError => "abundance_std_error",
        }
    }

    pub const fn position(&self) -> u32 {
        match self {
            Self::Abundance => 1,
            Self::Stdev => 2,
            Self::StdError => 3,
        }
    }
}

fn check_data_section(section: Section) -> Result<Section, ColumnError> {
    section
        .to_data()
        .ok_or(ColumnError::NotADataSection(section))
}

fn abundance_column(
    section: Section,
    field: AbundanceField,
    element: &dyn IndexedElement,
    order: u32,
) -> MZTabColumn {
    let header = format!(
        "{}_{}_{}",
        section.abundance_name(),
        field.name(),
        element.reference()
    );
    MZTabColumn::new(header, DataType::Double, true, logical_position(order, None, None))
}

/// The single `{section}_abundance_assay[n]` column for one assay, placed at
/// `offset + 1`.
pub fn create_assay_column(
    section: Section,
    assay: &Assay,
    offset: u32,
) -> Result<MZTabColumn, ColumnError> {
    let section = check_data_section(section)?;
    Ok(abundance_column(
        section,
        AbundanceField::Abundance,
        assay,
        offset + AbundanceField::Abundance.position(),
    ))
}

/// The value/stdev/std_error triple for one study variable, placed at
/// `offset + 1..=offset + 3`.
pub fn create_study_variable_columns(
    section: Section,
    study_variable: &StudyVariable,
    offset: u32,
) -> Result<[MZTabColumn; 3], ColumnError> {
    let section = check_data_section(section)?;
    Ok([
        AbundanceField::Abundance,
        AbundanceField::Stdev,
        AbundanceField::StdError,
    ]
    .map(|field| abundance_column(section, field, study_variable, offset + field.position())))
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_study_variable_triple() {
        let sv = StudyVariable::new(2);
        let columns = create_study_variable_columns(Section::Protein, &sv, 5).unwrap();
        assert_eq!(columns[0].header(), "protein_abundance_study_variable[2]");
        assert_eq!(columns[1].header(), "protein_abundance_stdev_study_variable[2]");
        assert_eq!(
            columns[2].header(),
            "protein_abundance_std_error_study_variable[2]"
        );
        assert_eq!(columns[0].logical_position(), "06");
        assert_eq!(columns[1].logical_position(), "07");
        assert_eq!(columns[2].logical_position(), "08");
        assert!(columns.iter().all(|c| c.is_optional()));
    }

    #[test]
    fn test_assay_column() {
        let assay = Assay::new(1);
        let column = create_assay_column(Section::Peptide, &assay, 16).unwrap();
        assert_eq!(column.header(), "peptide_abundance_assay[1]");
        assert_eq!(column.logical_position(), "17");
    }

    #[test]
    fn test_small_molecule_header_translation() {
        let assay = Assay::new(3);
        let column = create_assay_column(Section::SmallMolecule, &assay, 20).unwrap();
        assert_eq!(column.header(), "smallmolecule_abundance_assay[3]");
    }

    #[test]
    fn test_non_data_section_rejected() {
        let assay = Assay::new(1);
        assert!(create_assay_column(Section::Metadata, &assay, 5).is_err());
    }
}
