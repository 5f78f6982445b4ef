//! The document reader: a line-oriented state machine dispatching on the
//! three-letter section prefix. Supports plain and gzip-compressed input.

use std::fs;
use std::io::{self, prelude::*};
use std::path::Path;

use flate2::bufread::GzDecoder;
use log::trace;

use crate::file::{Comment, MZTabFile};
use crate::metadata::Metadata;
use crate::record::{Peptide, Protein, Psm, Record, SmallMolecule};
use crate::section::Section;

use super::header::{parse_header_line, TableHeader};
use super::mtd::parse_mtd_line;
use super::row::parse_row_line;
use super::MZTabError;

/// Reads one complete mzTab document from a buffered source.
///
/// Statement ordering is enforced the way the format defines it: metadata
/// first, then per table a header line followed by its rows. Comments and
/// blank lines may appear anywhere.
pub struct MzTabReader<R: io::BufRead> {
    handle: R,
}

impl MzTabReader<io::BufReader<Box<dyn io::Read>>> {
    /// Open a file, transparently decompressing a `.gz` suffix.
    pub fn open_path<P: AsRef<Path>>(path: P) -> Result<Self, MZTabError> {
        let path = path.as_ref();
        let file = fs::File::open(path)?;
        let source: Box<dyn io::Read> = if path
            .extension()
            .is_some_and(|extension| extension.eq_ignore_ascii_case("gz"))
        {
            Box::new(GzDecoder::new(io::BufReader::new(file)))
        } else {
            Box::new(file)
        };
        Ok(Self::new(io::BufReader::new(source)))
    }
}

#[derive(Default)]
struct TableState {
    header: Option<TableHeader>,
    rows: Vec<(u64, Record)>,
}

impl<R: io::BufRead> MzTabReader<R> {
    pub fn new(handle: R) -> Self {
        Self { handle }
    }

    /// Consume the source and build the document model.
    pub fn read(mut self) -> Result<MZTabFile, MZTabError> {
        let mut metadata = Metadata::default();
        let mut comments: Vec<Comment> = Vec::new();
        let mut proteins = TableState::default();
        let mut peptides = TableState::default();
        let mut psms = TableState::default();
        let mut small_molecules = TableState::default();

        let mut any_header = false;
        let mut line_number = 0u64;
        let mut buffer = String::new();
        loop {
            buffer.clear();
            if self.handle.read_line(&mut buffer)? == 0 {
                break;
            }
            line_number += 1;
            let line = buffer.trim_end_matches(['\n', '\r']);
            if line.trim().is_empty() {
                continue;
            }

            let fields: Vec<&str> = line.split('\t').collect();
            let prefix = fields[0].trim();
            let section: Section = prefix.parse().map_err(|_| MZTabError::UnknownPrefix {
                line: line_number,
                prefix: prefix.to_string(),
            })?;

            match section {
                Section::Comment => {
                    trace!("line {line_number}: comment");
                    comments.push(Comment::new(fields[1..].join("\t")));
                }
                Section::Metadata => {
                    if any_header {
                        return Err(MZTabError::MetadataAfterHeader { line: line_number });
                    }
                    if fields.len() != 3 {
                        return Err(MZTabError::MalformedMetadataLine { line: line_number });
                    }
                    parse_mtd_line(line_number, fields[1], fields[2], &mut metadata)?;
                }
                Section::ProteinHeader
                | Section::PeptideHeader
                | Section::PSMHeader
                | Section::SmallMoleculeHeader => {
                    any_header = true;
                    let state = match section {
                        Section::ProteinHeader => &mut proteins,
                        Section::PeptideHeader => &mut peptides,
                        Section::PSMHeader => &mut psms,
                        _ => &mut small_molecules,
                    };
                    if state.header.is_some() {
                        return Err(MZTabError::DuplicateTableHeader { line: line_number });
                    }
                    state.header = Some(parse_header_line(
                        line_number,
                        section,
                        &fields[1..],
                        &metadata,
                    )?);
                }
                Section::Protein | Section::Peptide | Section::PSM | Section::SmallMolecule => {
                    let state = match section {
                        Section::Protein => &mut proteins,
                        Section::Peptide => &mut peptides,
                        Section::PSM => &mut psms,
                        _ => &mut small_molecules,
                    };
                    let Some(header) = &state.header else {
                        return Err(MZTabError::DataBeforeHeader { line: line_number });
                    };
                    let record = parse_row_line(line_number, section, &fields[1..], header)?;
                    state.rows.push((line_number, record));
                }
            }
        }

        let mut file = MZTabFile::new(metadata);
        if let Some(header) = proteins.header {
            file.set_protein_factory(header.factory)?;
            for (line, record) in proteins.rows {
                let protein = Protein::from_record(record)
                    .map_err(|source| MZTabError::Column { line, source })?;
                file.add_protein(protein)?;
            }
        }
        if let Some(header) = peptides.header {
            file.set_peptide_factory(header.factory)?;
            for (line, record) in peptides.rows {
                let peptide = Peptide::from_record(record)
                    .map_err(|source| MZTabError::Column { line, source })?;
                file.add_peptide(peptide)?;
            }
        }
        if let Some(header) = psms.header {
            file.set_psm_factory(header.factory)?;
            for (line, record) in psms.rows {
                let psm =
                    Psm::from_record(record).map_err(|source| MZTabError::Column { line, source })?;
                file.add_psm(psm)?;
            }
        }
        if let Some(header) = small_molecules.header {
            file.set_small_molecule_factory(header.factory)?;
            for (line, record) in small_molecules.rows {
                let small_molecule = SmallMolecule::from_record(record)
                    .map_err(|source| MZTabError::Column { line, source })?;
                file.add_small_molecule(small_molecule)?;
            }
        }
        for comment in comments {
            file.add_comment(comment);
        }
        Ok(file)
    }
}

/// Parse a document held in memory.
pub fn parse_str(text: &str) -> Result<MZTabFile, MZTabError> {
    MzTabReader::new(io::Cursor::new(text.as_bytes())).read()
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::metadata::{MZTabMode, MZTabType};

    const SMALL_DOCUMENT: &str = "\
MTD\tmzTab-version\t1.0
MTD\tmzTab-mode\tSummary
MTD\tmzTab-type\tIdentification
MTD\tms_run[1]-location\tfile:/data/run1.mzML

COM\tmade by hand

PEH\tsequence\taccession\tunique\tdatabase\tdatabase_version\tsearch_engine\tmodifications\tretention_time\tretention_time_window\tcharge\tmass_to_charge\tspectra_ref
PEP\tPEPTIDE\tP02768\t0\tnull\tnull\tnull\t3-MOD:00001\tnull\tnull\t2\t254.43\tms_run[1]:index=5
PEP\tEDITPEP\tP02768\t1\tnull\tnull\tnull\tnull\tnull\tnull\t3\tnull\tnull
";

    #[test_log::test]
    fn test_read_small_document() {
        let file = parse_str(SMALL_DOCUMENT).unwrap();
        assert_eq!(file.metadata().tab_description.mode, MZTabMode::Summary);
        assert_eq!(
            file.metadata().tab_description.file_type,
            MZTabType::Identification
        );
        assert_eq!(file.peptides().len(), 2);
        assert_eq!(file.comments().len(), 1);

        let peptide = &file.peptides()[&1];
        assert_eq!(peptide.sequence(), Some("PEPTIDE"));
        assert_eq!(peptide.charge(), Some(2));
        assert_eq!(peptide.modifications().unwrap().len(), 1);
    }

    #[test]
    fn test_document_round_trip() {
        let file = parse_str(SMALL_DOCUMENT).unwrap();
        let printed = file.to_string();
        let file2 = parse_str(&printed).unwrap();
        assert_eq!(file2.to_string(), printed);
        assert_eq!(
            file2.peptides()[&1].record(),
            file.peptides()[&1].record()
        );
    }

    #[test]
    fn test_data_before_header() {
        let text = "MTD\tmzTab-version\t1.0\nPEP\tPEPTIDE\n";
        assert!(matches!(
            parse_str(text),
            Err(MZTabError::DataBeforeHeader { line: 2 })
        ));
    }

    #[test]
    fn test_metadata_after_header_rejected() {
        let mut text = SMALL_DOCUMENT.to_string();
        text.push_str("MTD\ttitle\ttoo late\n");
        assert!(matches!(
            parse_str(&text),
            Err(MZTabError::MetadataAfterHeader { .. })
        ));
    }

    #[test]
    fn test_unknown_prefix() {
        assert!(matches!(
            parse_str("XXX\tsomething\n"),
            Err(MZTabError::UnknownPrefix { .. })
        ));
    }

    #[test]
    fn test_open_path_with_gzip() {
        use flate2::write::GzEncoder;
        use flate2::Compression;
        use std::io::Write as _;

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("small.mztab.gz");
        let file = fs::File::create(&path).unwrap();
        let mut encoder = GzEncoder::new(file, Compression::default());
        encoder.write_all(SMALL_DOCUMENT.as_bytes()).unwrap();
        encoder.finish().unwrap();

        let document = MzTabReader::open_path(&path).unwrap().read().unwrap();
        assert_eq!(document.peptides().len(), 2);
    }
}
