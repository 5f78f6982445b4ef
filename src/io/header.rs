//! Table header reconstruction: turns a `PRH`/`PEH`/`PSH`/`SMH` line back
//! into a [`ColumnFactory`] plus the physical field order of the file.

use std::sync::OnceLock;

use regex::Regex;

use crate::columns::{
    logical_position, ColumnFactory, ColumnScope, DataType, MZTabColumn, StableColumn,
};
use crate::metadata::Metadata;
use crate::section::Section;

use super::MZTabError;

/// A reconstructed schema: the factory in canonical logical order, plus the
/// logical position of each physical header field, in file order, used to
/// map row cells back onto columns.
#[derive(Debug)]
pub(crate) struct TableHeader {
    pub factory: ColumnFactory,
    pub physical: Vec<String>,
}

fn score_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"^(best_search_engine_score|search_engine_score)\[(\d+)\](?:_ms_run\[(\d+)\])?$")
            .expect("static score header pattern")
    })
}

fn per_run_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"^([a-z_]+?)_ms_run\[(\d+)\]$").expect("static per-run header pattern")
    })
}

fn abundance_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(
            r"^(protein|peptide|psm|smallmolecule)_abundance(?:_stdev|_std_error)?_(assay|study_variable)\[(\d+)\]$",
        )
        .expect("static abundance header pattern")
    })
}

fn opt_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"^opt_(global|assay\[(\d+)\]|study_variable\[(\d+)\]|ms_run\[(\d+)\])_[A-Za-z0-9_\-\[\]:]+$")
            .expect("static opt header pattern")
    })
}

fn lift(line: u64, result: Result<(), crate::columns::ColumnError>) -> Result<(), MZTabError> {
    result.map_err(|source| MZTabError::Column { line, source })
}

fn ms_run_for<'a>(
    metadata: &'a Metadata,
    line: u64,
    id: u32,
) -> Result<&'a crate::metadata::MsRun, MZTabError> {
    metadata
        .ms_run(id)
        .ok_or(MZTabError::UndefinedMsRun { line, id })
}

/// Parse the header fields (everything after the three-letter prefix) of a
/// table header line against the element registry in `metadata`.
pub(crate) fn parse_header_line(
    line: u64,
    section: Section,
    fields: &[&str],
    metadata: &Metadata,
) -> Result<TableHeader, MZTabError> {
    let data_section = section.to_data().ok_or(MZTabError::UnknownPrefix {
        line,
        prefix: section.prefix().to_string(),
    })?;
    let mut factory =
        ColumnFactory::for_section(data_section).map_err(|source| MZTabError::Column { line, source })?;

    let mut physical = Vec::with_capacity(fields.len());
    let mut seen_mandatory = Vec::new();

    for field in fields {
        let header = field.trim();
        if header.is_empty() {
            return Err(MZTabError::UnknownColumnHeader {
                line,
                header: header.to_string(),
            });
        }

        if let Some(stable) = StableColumn::by_name(data_section, header) {
            match stable.scope() {
                ColumnScope::Mandatory => {
                    if seen_mandatory.contains(&header.to_string()) {
                        return Err(MZTabError::Column {
                            line,
                            source: crate::columns::ColumnError::DuplicateHeader(
                                header.to_string(),
                            ),
                        });
                    }
                    seen_mandatory.push(header.to_string());
                }
                ColumnScope::Optional => {
                    lift(line, factory.add_optional_stable_column(stable))?;
                }
                // score and per-run columns never appear under their bare name
                _ => {
                    return Err(MZTabError::UnknownColumnHeader {
                        line,
                        header: header.to_string(),
                    })
                }
            }
        } else if let Some(captures) = score_pattern().captures(header) {
            let id: u32 = captures[2]
                .parse()
                .map_err(|_| MZTabError::UnknownColumnHeader {
                    line,
                    header: header.to_string(),
                })?;
            match (&captures[1], captures.get(3)) {
                ("best_search_engine_score", None) => {
                    lift(line, factory.add_best_search_engine_score_column(id))?;
                }
                ("search_engine_score", Some(run)) => {
                    let run_id = run.as_str().parse().map_err(|_| {
                        MZTabError::UnknownColumnHeader {
                            line,
                            header: header.to_string(),
                        }
                    })?;
                    let ms_run = ms_run_for(metadata, line, run_id)?;
                    lift(line, factory.add_search_engine_score_column(id, Some(ms_run)))?;
                }
                ("search_engine_score", None) => {
                    lift(line, factory.add_search_engine_score_column(id, None))?;
                }
                _ => {
                    return Err(MZTabError::UnknownColumnHeader {
                        line,
                        header: header.to_string(),
                    })
                }
            }
        } else if let Some(captures) = per_run_pattern().captures(header) {
            let stable = StableColumn::by_name(data_section, &captures[1]).ok_or_else(|| {
                MZTabError::UnknownColumnHeader {
                    line,
                    header: header.to_string(),
                }
            })?;
            let run_id: u32 =
                captures[2]
                    .parse()
                    .map_err(|_| MZTabError::UnknownColumnHeader {
                        line,
                        header: header.to_string(),
                    })?;
            let ms_run = ms_run_for(metadata, line, run_id)?;
            lift(line, factory.add_per_run_column(stable, ms_run))?;
        } else if let Some(captures) = abundance_pattern().captures(header) {
            if &captures[1] != data_section.abundance_name() {
                return Err(MZTabError::UnknownColumnHeader {
                    line,
                    header: header.to_string(),
                });
            }
            let id: u32 = captures[3]
                .parse()
                .map_err(|_| MZTabError::UnknownColumnHeader {
                    line,
                    header: header.to_string(),
                })?;
            match &captures[2] {
                "assay" => {
                    if metadata.assay(id).is_none() {
                        return Err(MZTabError::UndefinedAssay { line, id });
                    }
                }
                _ => {
                    if metadata.study_variable(id).is_none() {
                        return Err(MZTabError::UndefinedStudyVariable { line, id });
                    }
                }
            }
            let order = factory.highest_order() + 1;
            lift(
                line,
                factory.add_raw_column(MZTabColumn::new(
                    header,
                    DataType::Double,
                    true,
                    logical_position(order, None, None),
                )),
            )?;
        } else if let Some(captures) = opt_pattern().captures(header) {
            if let Some(id) = captures.get(2) {
                let id: u32 = id.as_str().parse().unwrap_or(0);
                if metadata.assay(id).is_none() {
                    return Err(MZTabError::UndefinedAssay { line, id });
                }
            } else if let Some(id) = captures.get(3) {
                let id: u32 = id.as_str().parse().unwrap_or(0);
                if metadata.study_variable(id).is_none() {
                    return Err(MZTabError::UndefinedStudyVariable { line, id });
                }
            } else if let Some(id) = captures.get(4) {
                let id: u32 = id.as_str().parse().unwrap_or(0);
                if metadata.ms_run(id).is_none() {
                    return Err(MZTabError::UndefinedMsRun { line, id });
                }
            }
            let order = factory.highest_order() + 1;
            lift(
                line,
                factory.add_raw_column(MZTabColumn::new(
                    header,
                    DataType::String,
                    true,
                    logical_position(order, None, None),
                )),
            )?;
        } else {
            return Err(MZTabError::UnknownColumnHeader {
                line,
                header: header.to_string(),
            });
        }

        let position = factory
            .find_column_by_header(header)
            .map(|c| c.logical_position().to_string())
            .ok_or_else(|| MZTabError::UnknownColumnHeader {
                line,
                header: header.to_string(),
            })?;
        physical.push(position);
    }

    for stable in StableColumn::all_for(data_section) {
        if stable.scope() == ColumnScope::Mandatory
            && !seen_mandatory.iter().any(|h| h == stable.name())
        {
            return Err(MZTabError::MissingMandatoryColumn {
                line,
                header: stable.name().to_string(),
            });
        }
    }

    Ok(TableHeader { factory, physical })
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::metadata::{MZTabMode, MZTabType, Sample};
    use crate::values::parse_uri;

    fn metadata_with_run() -> Metadata {
        let mut metadata = Metadata::new(MZTabMode::Complete, MZTabType::Quantification);
        metadata
            .add_ms_run_location(1, parse_uri("file:/r1.mzML").unwrap())
            .unwrap();
        metadata.add_sample(Sample::new(1)).unwrap();
        metadata.add_assay_sample(1, 1).unwrap();
        metadata.add_study_variable_assay(1, 1).unwrap();
        metadata
    }

    fn peptide_fields() -> Vec<&'static str> {
        vec![
            "sequence",
            "accession",
            "unique",
            "database",
            "database_version",
            "search_engine",
            "best_search_engine_score[1]",
            "search_engine_score[1]_ms_run[1]",
            "reliability",
            "modifications",
            "retention_time",
            "retention_time_window",
            "charge",
            "mass_to_charge",
            "uri",
            "spectra_ref",
            "peptide_abundance_assay[1]",
            "opt_global_color",
        ]
    }

    #[test]
    fn test_full_header_reconstruction() {
        let metadata = metadata_with_run();
        let fields = peptide_fields();
        let header =
            parse_header_line(2, Section::PeptideHeader, &fields, &metadata).unwrap();
        assert_eq!(header.physical.len(), fields.len());
        assert_eq!(header.factory.len(), fields.len());
        assert!(header
            .factory
            .find_column_by_header("peptide_abundance_assay[1]")
            .is_some());
        assert!(header
            .factory
            .find_column_by_header("opt_global_color")
            .is_some());
        // physical order mirrors the file, not the canonical sort
        assert_eq!(header.physical[0], "01");
        assert_eq!(header.physical[6], "071");
        assert_eq!(header.physical[7], "0811");
    }

    #[test]
    fn test_missing_mandatory_column() {
        let metadata = metadata_with_run();
        let fields = vec!["sequence", "accession"];
        assert!(matches!(
            parse_header_line(2, Section::PeptideHeader, &fields, &metadata),
            Err(MZTabError::MissingMandatoryColumn { .. })
        ));
    }

    #[test]
    fn test_unknown_header_rejected() {
        let metadata = metadata_with_run();
        let mut fields = peptide_fields();
        fields.push("bogus_column");
        assert!(matches!(
            parse_header_line(2, Section::PeptideHeader, &fields, &metadata),
            Err(MZTabError::UnknownColumnHeader { .. })
        ));
    }

    #[test]
    fn test_undeclared_ms_run_rejected() {
        let metadata = metadata_with_run();
        let mut fields = peptide_fields();
        fields[7] = "search_engine_score[1]_ms_run[9]";
        assert!(matches!(
            parse_header_line(2, Section::PeptideHeader, &fields, &metadata),
            Err(MZTabError::UndefinedMsRun { id: 9, .. })
        ));
    }
}
