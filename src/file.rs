//! The document aggregate: one metadata section, up to four data tables,
//! and free-floating comments, serialized in a fixed section order.

use std::collections::BTreeMap;
use std::fmt::Display;
use std::io;

use thiserror::Error;

use crate::columns::ColumnFactory;
use crate::metadata::Metadata;
use crate::record::{Peptide, Protein, Psm, SmallMolecule};
use crate::section::Section;

#[derive(Debug, Error)]
pub enum MZTabFileError {
    #[error("line {line} of the {section:?} section is already occupied")]
    LineOccupied { section: Section, line: u32 },
    #[error("no column factory has been set for {0:?}")]
    MissingFactory(Section),
    #[error("the factory describes {found:?}, expected {expected:?}")]
    FactoryMismatch { expected: Section, found: Section },
    #[error("line numbers are 1-based, 0 is not a valid line number")]
    InvalidLineNumber,
}

/// A `COM` line. Preserved verbatim for round trips, ignored by consumers.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Comment(String);

impl Comment {
    pub fn new(text: impl Into<String>) -> Self {
        Self(text.into())
    }

    pub fn text(&self) -> &str {
        &self.0
    }
}

impl Display for Comment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "COM\t{}", self.0)
    }
}

fn next_line<T>(rows: &BTreeMap<u32, T>) -> u32 {
    rows.keys().next_back().map_or(1, |line| line + 1)
}

fn insert_row<T>(
    section: Section,
    rows: &mut BTreeMap<u32, T>,
    line: u32,
    row: T,
) -> Result<(), MZTabFileError> {
    if line == 0 {
        return Err(MZTabFileError::InvalidLineNumber);
    }
    if rows.contains_key(&line) {
        return Err(MZTabFileError::LineOccupied { section, line });
    }
    rows.insert(line, row);
    Ok(())
}

/// A complete in-memory mzTab document.
///
/// Line numbers are assigned densely per section starting at 1 but may be
/// set explicitly, so data merged from several sources keeps its numbering;
/// inserting into an occupied slot is refused.
#[derive(Debug, Default)]
pub struct MZTabFile {
    metadata: Metadata,
    protein_factory: Option<ColumnFactory>,
    peptide_factory: Option<ColumnFactory>,
    psm_factory: Option<ColumnFactory>,
    small_molecule_factory: Option<ColumnFactory>,
    proteins: BTreeMap<u32, Protein>,
    peptides: BTreeMap<u32, Peptide>,
    psms: BTreeMap<u32, Psm>,
    small_molecules: BTreeMap<u32, SmallMolecule>,
    comments: BTreeMap<u32, Comment>,
}

impl MZTabFile {
    pub fn new(metadata: Metadata) -> Self {
        Self {
            metadata,
            ..Default::default()
        }
    }

    pub fn metadata(&self) -> &Metadata {
        &self.metadata
    }

    pub fn metadata_mut(&mut self) -> &mut Metadata {
        &mut self.metadata
    }

    fn check_factory(
        factory: &ColumnFactory,
        expected: Section,
    ) -> Result<(), MZTabFileError> {
        if factory.section() != expected {
            return Err(MZTabFileError::FactoryMismatch {
                expected,
                found: factory.section(),
            });
        }
        Ok(())
    }

    pub fn set_protein_factory(&mut self, factory: ColumnFactory) -> Result<(), MZTabFileError> {
        Self::check_factory(&factory, Section::Protein)?;
        self.protein_factory = Some(factory);
        Ok(())
    }

    pub fn set_peptide_factory(&mut self, factory: ColumnFactory) -> Result<(), MZTabFileError> {
        Self::check_factory(&factory, Section::Peptide)?;
        self.peptide_factory = Some(factory);
        Ok(())
    }

    pub fn set_psm_factory(&mut self, factory: ColumnFactory) -> Result<(), MZTabFileError> {
        Self::check_factory(&factory, Section::PSM)?;
        self.psm_factory = Some(factory);
        Ok(())
    }

    pub fn set_small_molecule_factory(
        &mut self,
        factory: ColumnFactory,
    ) -> Result<(), MZTabFileError> {
        Self::check_factory(&factory, Section::SmallMolecule)?;
        self.small_molecule_factory = Some(factory);
        Ok(())
    }

    pub fn protein_factory(&self) -> Option<&ColumnFactory> {
        self.protein_factory.as_ref()
    }

    pub fn peptide_factory(&self) -> Option<&ColumnFactory> {
        self.peptide_factory.as_ref()
    }

    pub fn psm_factory(&self) -> Option<&ColumnFactory> {
        self.psm_factory.as_ref()
    }

    pub fn small_molecule_factory(&self) -> Option<&ColumnFactory> {
        self.small_molecule_factory.as_ref()
    }

    /// Append a protein row at the next free line number.
    pub fn add_protein(&mut self, protein: Protein) -> Result<u32, MZTabFileError> {
        if self.protein_factory.is_none() {
            return Err(MZTabFileError::MissingFactory(Section::Protein));
        }
        let line = next_line(&self.proteins);
        insert_row(Section::Protein, &mut self.proteins, line, protein)?;
        Ok(line)
    }

    /// Place a protein row at an explicit line number.
    pub fn add_protein_at(&mut self, line: u32, protein: Protein) -> Result<(), MZTabFileError> {
        if self.protein_factory.is_none() {
            return Err(MZTabFileError::MissingFactory(Section::Protein));
        }
        insert_row(Section::Protein, &mut self.proteins, line, protein)
    }

    pub fn add_peptide(&mut self, peptide: Peptide) -> Result<u32, MZTabFileError> {
        if self.peptide_factory.is_none() {
            return Err(MZTabFileError::MissingFactory(Section::Peptide));
        }
        let line = next_line(&self.peptides);
        insert_row(Section::Peptide, &mut self.peptides, line, peptide)?;
        Ok(line)
    }

    pub fn add_peptide_at(&mut self, line: u32, peptide: Peptide) -> Result<(), MZTabFileError> {
        if self.peptide_factory.is_none() {
            return Err(MZTabFileError::MissingFactory(Section::Peptide));
        }
        insert_row(Section::Peptide, &mut self.peptides, line, peptide)
    }

    pub fn add_psm(&mut self, psm: Psm) -> Result<u32, MZTabFileError> {
        if self.psm_factory.is_none() {
            return Err(MZTabFileError::MissingFactory(Section::PSM));
        }
        let line = next_line(&self.psms);
        insert_row(Section::PSM, &mut self.psms, line, psm)?;
        Ok(line)
    }

    pub fn add_psm_at(&mut self, line: u32, psm: Psm) -> Result<(), MZTabFileError> {
        if self.psm_factory.is_none() {
            return Err(MZTabFileError::MissingFactory(Section::PSM));
        }
        insert_row(Section::PSM, &mut self.psms, line, psm)
    }

    pub fn add_small_molecule(
        &mut self,
        small_molecule: SmallMolecule,
    ) -> Result<u32, MZTabFileError> {
        if self.small_molecule_factory.is_none() {
            return Err(MZTabFileError::MissingFactory(Section::SmallMolecule));
        }
        let line = next_line(&self.small_molecules);
        insert_row(
            Section::SmallMolecule,
            &mut self.small_molecules,
            line,
            small_molecule,
        )?;
        Ok(line)
    }

    pub fn add_small_molecule_at(
        &mut self,
        line: u32,
        small_molecule: SmallMolecule,
    ) -> Result<(), MZTabFileError> {
        if self.small_molecule_factory.is_none() {
            return Err(MZTabFileError::MissingFactory(Section::SmallMolecule));
        }
        insert_row(
            Section::SmallMolecule,
            &mut self.small_molecules,
            line,
            small_molecule,
        )
    }

    pub fn add_comment(&mut self, comment: Comment) -> u32 {
        let line = next_line(&self.comments);
        self.comments.insert(line, comment);
        line
    }

    pub fn add_comment_at(&mut self, line: u32, comment: Comment) -> Result<(), MZTabFileError> {
        insert_row(Section::Comment, &mut self.comments, line, comment)
    }

    pub fn proteins(&self) -> &BTreeMap<u32, Protein> {
        &self.proteins
    }

    pub fn peptides(&self) -> &BTreeMap<u32, Peptide> {
        &self.peptides
    }

    pub fn psms(&self) -> &BTreeMap<u32, Psm> {
        &self.psms
    }

    pub fn small_molecules(&self) -> &BTreeMap<u32, SmallMolecule> {
        &self.small_molecules
    }

    pub fn comments(&self) -> &BTreeMap<u32, Comment> {
        &self.comments
    }

    /// True when no section holds any rows. Such a file serializes to
    /// nothing at all.
    pub fn is_empty(&self) -> bool {
        self.proteins.is_empty()
            && self.peptides.is_empty()
            && self.psms.is_empty()
            && self.small_molecules.is_empty()
    }

    /// Serialize into any writer.
    pub fn write_to<W: io::Write>(&self, writer: &mut W) -> io::Result<()> {
        writer.write_all(self.to_string().as_bytes())
    }
}

impl Display for MZTabFile {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.is_empty() {
            return Ok(());
        }
        write!(f, "{}", self.metadata)?;
        writeln!(f)?;
        if !self.comments.is_empty() {
            for comment in self.comments.values() {
                writeln!(f, "{comment}")?;
            }
            writeln!(f)?;
        }
        if let Some(factory) = &self.protein_factory {
            if !self.proteins.is_empty() {
                writeln!(f, "{}", factory.print_header())?;
                for protein in self.proteins.values() {
                    writeln!(f, "{protein}")?;
                }
                writeln!(f)?;
            }
        }
        if let Some(factory) = &self.peptide_factory {
            if !self.peptides.is_empty() {
                writeln!(f, "{}", factory.print_header())?;
                for peptide in self.peptides.values() {
                    writeln!(f, "{peptide}")?;
                }
                writeln!(f)?;
            }
        }
        if let Some(factory) = &self.psm_factory {
            if !self.psms.is_empty() {
                writeln!(f, "{}", factory.print_header())?;
                for psm in self.psms.values() {
                    writeln!(f, "{psm}")?;
                }
                writeln!(f)?;
            }
        }
        if let Some(factory) = &self.small_molecule_factory {
            if !self.small_molecules.is_empty() {
                writeln!(f, "{}", factory.print_header())?;
                for small_molecule in self.small_molecules.values() {
                    writeln!(f, "{small_molecule}")?;
                }
                writeln!(f)?;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::metadata::{MZTabMode, MZTabType};
    use crate::record::Peptide;

    fn small_file() -> MZTabFile {
        let metadata = Metadata::new(MZTabMode::Summary, MZTabType::Identification);
        let mut file = MZTabFile::new(metadata);
        let factory = ColumnFactory::for_section(Section::Peptide).unwrap();
        let mut peptide = Peptide::new(&factory).unwrap();
        peptide.set_sequence("PEPTIDE");
        peptide.set_charge(2);
        file.set_peptide_factory(factory).unwrap();
        file.add_peptide(peptide).unwrap();
        file
    }

    #[test]
    fn test_empty_file_prints_nothing() {
        let metadata = Metadata::new(MZTabMode::Summary, MZTabType::Identification);
        let file = MZTabFile::new(metadata);
        assert_eq!(file.to_string(), "");
    }

    #[test]
    fn test_document_layout() {
        let mut file = small_file();
        file.add_comment(Comment::new("produced by a unit test"));
        let text = file.to_string();

        assert!(text.starts_with("MTD\tmzTab-version\t1.0\n"));
        assert!(text.contains("\n\nCOM\tproduced by a unit test\n\n"));
        assert!(text.contains("\nPEH\tsequence\t"));
        assert!(text.contains("\nPEP\tPEPTIDE\t"));
        // trailing blank line after the last section
        assert!(text.ends_with("\n\n"));
    }

    #[test]
    fn test_line_numbers() {
        let mut file = small_file();
        let factory = file.peptide_factory().unwrap().clone();
        let mut second = Peptide::new(&factory).unwrap();
        second.set_sequence("EDITPEP");
        assert_eq!(file.add_peptide(second.clone()).unwrap(), 2);

        // the slot is taken now
        assert!(matches!(
            file.add_peptide_at(1, second.clone()),
            Err(MZTabFileError::LineOccupied { line: 1, .. })
        ));
        // explicit placement far away works, the next auto number follows it
        file.add_peptide_at(10, second.clone()).unwrap();
        assert_eq!(file.add_peptide(second).unwrap(), 11);
    }

    #[test]
    fn test_rows_require_factory() {
        let metadata = Metadata::new(MZTabMode::Summary, MZTabType::Identification);
        let mut file = MZTabFile::new(metadata);
        let factory = ColumnFactory::for_section(Section::Peptide).unwrap();
        let peptide = Peptide::new(&factory).unwrap();
        assert!(matches!(
            file.add_peptide(peptide),
            Err(MZTabFileError::MissingFactory(Section::Peptide))
        ));
    }

    #[test]
    fn test_factory_section_checked() {
        let metadata = Metadata::new(MZTabMode::Summary, MZTabType::Identification);
        let mut file = MZTabFile::new(metadata);
        let factory = ColumnFactory::for_section(Section::Protein).unwrap();
        assert!(file.set_peptide_factory(factory).is_err());
    }
}
