//! The `MTD` line parser: decomposes `{element}[{id}]-{property}[{subId}]`
//! keys and replays them onto the metadata upsert API.

use std::sync::OnceLock;

use log::warn;
use regex::Regex;

use crate::metadata::{Metadata, MetadataError};
use crate::params::{parse_param, parse_param_list, parse_publication_items, Param, ParamList};
use crate::values::parse_uri;

use super::MZTabError;

fn indexed_key_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"^([a-z_]+)\[(\d+)\](?:-([a-z_]+)(?:\[(\d+)\])?(?:-([a-z_]+))?)?$")
            .expect("static metadata key pattern")
    })
}

fn element_ref_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"^([a-z_]+)\[(\d+)\]$").expect("static element reference pattern")
    })
}

fn bad_value(line: u64, key: &str, value: &str) -> MZTabError {
    MZTabError::MalformedMetadataValue {
        line,
        key: key.to_string(),
        value: value.to_string(),
    }
}

fn unknown_key(line: u64, key: &str) -> MZTabError {
    MZTabError::UnknownMetadataKey {
        line,
        key: key.to_string(),
    }
}

fn require_param(line: u64, key: &str, value: &str) -> Result<Param, MZTabError> {
    parse_param(value).ok_or_else(|| bad_value(line, key, value))
}

fn require_param_list(line: u64, key: &str, value: &str) -> Result<ParamList, MZTabError> {
    let list = parse_param_list(value);
    if list.is_empty() {
        return Err(bad_value(line, key, value));
    }
    Ok(list)
}

fn element_ref(line: u64, key: &str, value: &str, kind: &str) -> Result<u32, MZTabError> {
    let captures = element_ref_pattern()
        .captures(value.trim())
        .ok_or_else(|| bad_value(line, key, value))?;
    if &captures[1] != kind {
        return Err(bad_value(line, key, value));
    }
    captures[2].parse().map_err(|_| bad_value(line, key, value))
}

fn lift(line: u64, result: Result<(), MetadataError>) -> Result<(), MZTabError> {
    result.map_err(|source| MZTabError::Metadata { line, source })
}

/// Apply one metadata statement. The `MTD` prefix has already been split
/// away; `key` and `value` are the remaining two fields.
pub(crate) fn parse_mtd_line(
    line: u64,
    key: &str,
    value: &str,
    metadata: &mut Metadata,
) -> Result<(), MZTabError> {
    let key = key.trim();
    let value = value.trim();
    match key {
        "mzTab-version" => {
            metadata.tab_description.version = value.to_string();
            return Ok(());
        }
        "mzTab-mode" => {
            metadata.tab_description.mode =
                value.parse().map_err(|_| bad_value(line, key, value))?;
            return Ok(());
        }
        "mzTab-type" => {
            metadata.tab_description.file_type =
                value.parse().map_err(|_| bad_value(line, key, value))?;
            return Ok(());
        }
        "mzTab-ID" => {
            metadata.set_mz_tab_id(value);
            return Ok(());
        }
        "title" => {
            metadata.set_title(value);
            return Ok(());
        }
        "description" => {
            metadata.set_description(value);
            return Ok(());
        }
        "false_discovery_rate" => {
            metadata.set_false_discovery_rate(require_param_list(line, key, value)?);
            return Ok(());
        }
        "quantification_method" => {
            metadata.quantification_method = Some(require_param(line, key, value)?);
            return Ok(());
        }
        "protein-quantification_unit" => {
            metadata.protein_quantification_unit = Some(require_param(line, key, value)?);
            return Ok(());
        }
        "peptide-quantification_unit" => {
            metadata.peptide_quantification_unit = Some(require_param(line, key, value)?);
            return Ok(());
        }
        "smallmolecule-quantification_unit" => {
            metadata.small_molecule_quantification_unit = Some(require_param(line, key, value)?);
            return Ok(());
        }
        "colunit-protein" | "colunit-peptide" | "colunit-psm" | "colunit-small_molecule" => {
            let (header, unit) = value
                .split_once('=')
                .ok_or_else(|| bad_value(line, key, value))?;
            let unit = require_param(line, key, unit)?;
            let header = header.trim();
            return lift(
                line,
                match key {
                    "colunit-protein" => metadata.add_protein_colunit(header, unit),
                    "colunit-peptide" => metadata.add_peptide_colunit(header, unit),
                    "colunit-psm" => metadata.add_psm_colunit(header, unit),
                    _ => metadata.add_small_molecule_colunit(header, unit),
                },
            );
        }
        _ => {}
    }

    let captures = indexed_key_pattern()
        .captures(key)
        .ok_or_else(|| unknown_key(line, key))?;
    let element = &captures[1];
    let id: u32 = captures[2]
        .parse()
        .map_err(|_| bad_value(line, key, value))?;
    let property = captures.get(3).map(|m| m.as_str());
    let sub_id: Option<u32> = match captures.get(4) {
        Some(m) => Some(m.as_str().parse().map_err(|_| bad_value(line, key, value))?),
        None => None,
    };
    let sub_property = captures.get(5).map(|m| m.as_str());

    // only assay quantification mods nest a second property level
    if sub_property.is_some() && (element, property) != ("assay", Some("quantification_mod")) {
        return Err(unknown_key(line, key));
    }

    match (element, property, sub_id) {
        ("sample_processing", None, None) => lift(
            line,
            metadata.add_sample_processing(id, require_param_list(line, key, value)?),
        ),
        ("instrument", Some("name"), None) => lift(
            line,
            metadata.add_instrument_name(id, require_param(line, key, value)?),
        ),
        ("instrument", Some("source"), None) => lift(
            line,
            metadata.add_instrument_source(id, require_param(line, key, value)?),
        ),
        ("instrument", Some("analyzer"), Some(sub_id)) => lift(
            line,
            metadata.add_instrument_analyzer(id, sub_id, require_param(line, key, value)?),
        ),
        ("instrument", Some("detector"), None) => lift(
            line,
            metadata.add_instrument_detector(id, require_param(line, key, value)?),
        ),
        ("software", None, None) => lift(
            line,
            metadata.add_software_param(id, require_param(line, key, value)?),
        ),
        ("software", Some("setting"), _) => lift(line, metadata.add_software_setting(id, value)),
        ("protein_search_engine_score", None, None) => lift(
            line,
            metadata.add_protein_search_engine_score(id, require_param(line, key, value)?),
        ),
        ("peptide_search_engine_score", None, None) => lift(
            line,
            metadata.add_peptide_search_engine_score(id, require_param(line, key, value)?),
        ),
        ("psm_search_engine_score", None, None) => lift(
            line,
            metadata.add_psm_search_engine_score(id, require_param(line, key, value)?),
        ),
        ("smallmolecule_search_engine_score", None, None) => lift(
            line,
            metadata.add_small_molecule_search_engine_score(id, require_param(line, key, value)?),
        ),
        ("publication", None, None) => {
            let items = parse_publication_items(value);
            if items.is_empty() {
                return Err(bad_value(line, key, value));
            }
            for item in items {
                lift(line, metadata.add_publication_item(id, item))?;
            }
            Ok(())
        }
        ("contact", Some("name"), None) => lift(line, metadata.add_contact_name(id, value)),
        ("contact", Some("affiliation"), None) => {
            lift(line, metadata.add_contact_affiliation(id, value))
        }
        ("contact", Some("email"), None) => lift(line, metadata.add_contact_email(id, value)),
        ("uri", None, None) => match parse_uri(value) {
            Some(uri) => lift(line, metadata.add_uri(id, uri)),
            None => {
                warn!("line {line}: dropping malformed uri {value:?}");
                Ok(())
            }
        },
        ("fixed_mod", None, None) => lift(
            line,
            metadata.add_fixed_mod_param(id, require_param(line, key, value)?),
        ),
        ("fixed_mod", Some("site"), None) => lift(line, metadata.add_fixed_mod_site(id, value)),
        ("fixed_mod", Some("position"), None) => {
            lift(line, metadata.add_fixed_mod_position(id, value))
        }
        ("variable_mod", None, None) => lift(
            line,
            metadata.add_variable_mod_param(id, require_param(line, key, value)?),
        ),
        ("variable_mod", Some("site"), None) => {
            lift(line, metadata.add_variable_mod_site(id, value))
        }
        ("variable_mod", Some("position"), None) => {
            lift(line, metadata.add_variable_mod_position(id, value))
        }
        ("ms_run", Some("format"), None) => lift(
            line,
            metadata.add_ms_run_format(id, require_param(line, key, value)?),
        ),
        ("ms_run", Some("location"), None) => match parse_uri(value) {
            Some(uri) => lift(line, metadata.add_ms_run_location(id, uri)),
            None => {
                warn!("line {line}: dropping malformed ms_run location {value:?}");
                Ok(())
            }
        },
        ("ms_run", Some("id_format"), None) => lift(
            line,
            metadata.add_ms_run_id_format(id, require_param(line, key, value)?),
        ),
        ("ms_run", Some("fragmentation_method"), None) => lift(
            line,
            metadata.add_ms_run_fragmentation_method(id, require_param(line, key, value)?),
        ),
        ("ms_run", Some("hash"), None) => lift(line, metadata.add_ms_run_hash(id, value)),
        ("ms_run", Some("hash_method"), None) => lift(
            line,
            metadata.add_ms_run_hash_method(id, require_param(line, key, value)?),
        ),
        ("sample", Some("species"), Some(sub_id)) => lift(
            line,
            metadata.add_sample_species(id, sub_id, require_param(line, key, value)?),
        ),
        ("sample", Some("tissue"), Some(sub_id)) => lift(
            line,
            metadata.add_sample_tissue(id, sub_id, require_param(line, key, value)?),
        ),
        ("sample", Some("cell_type"), Some(sub_id)) => lift(
            line,
            metadata.add_sample_cell_type(id, sub_id, require_param(line, key, value)?),
        ),
        ("sample", Some("disease"), Some(sub_id)) => lift(
            line,
            metadata.add_sample_disease(id, sub_id, require_param(line, key, value)?),
        ),
        ("sample", Some("description"), None) => {
            lift(line, metadata.add_sample_description(id, value))
        }
        ("sample", Some("custom"), _) => lift(
            line,
            metadata.add_sample_custom(id, require_param(line, key, value)?),
        ),
        ("assay", Some("quantification_reagent"), None) => lift(
            line,
            metadata.add_assay_quantification_reagent(id, require_param(line, key, value)?),
        ),
        ("assay", Some("quantification_mod"), Some(sub_id)) => match sub_property {
            None => lift(
                line,
                metadata.add_assay_quantification_mod_param(
                    id,
                    sub_id,
                    require_param(line, key, value)?,
                ),
            ),
            Some("site") => lift(
                line,
                metadata.add_assay_quantification_mod_site(id, sub_id, value),
            ),
            Some("position") => lift(
                line,
                metadata.add_assay_quantification_mod_position(id, sub_id, value),
            ),
            Some(_) => Err(unknown_key(line, key)),
        },
        ("assay", Some("sample_ref"), None) => {
            let sample_id = element_ref(line, key, value, "sample")?;
            lift(line, metadata.add_assay_sample(id, sample_id))
        }
        ("assay", Some("ms_run_ref"), None) => {
            let ms_run_id = element_ref(line, key, value, "ms_run")?;
            lift(line, metadata.add_assay_ms_run(id, ms_run_id))
        }
        ("study_variable", Some("description"), None) => {
            lift(line, metadata.add_study_variable_description(id, value))
        }
        ("study_variable", Some("assay_refs"), None) => {
            for item in value.split(',') {
                let assay_id = element_ref(line, key, item, "assay")?;
                lift(line, metadata.add_study_variable_assay(id, assay_id))?;
            }
            Ok(())
        }
        ("study_variable", Some("sample_refs"), None) => {
            for item in value.split(',') {
                let sample_id = element_ref(line, key, item, "sample")?;
                lift(line, metadata.add_study_variable_sample(id, sample_id))?;
            }
            Ok(())
        }
        ("cv", Some("label"), None) => lift(line, metadata.add_cv_label(id, value)),
        ("cv", Some("full_name"), None) => lift(line, metadata.add_cv_full_name(id, value)),
        ("cv", Some("version"), None) => lift(line, metadata.add_cv_version(id, value)),
        ("cv", Some("url"), None) => lift(line, metadata.add_cv_url(id, value)),
        ("custom", None, None) => {
            metadata.add_custom(require_param(line, key, value)?);
            Ok(())
        }
        _ => Err(unknown_key(line, key)),
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::metadata::MZTabMode;

    fn apply(metadata: &mut Metadata, key: &str, value: &str) -> Result<(), MZTabError> {
        parse_mtd_line(1, key, value, metadata)
    }

    #[test]
    fn test_description_block() {
        let mut metadata = Metadata::default();
        apply(&mut metadata, "mzTab-version", "1.0").unwrap();
        apply(&mut metadata, "mzTab-mode", "Complete").unwrap();
        apply(&mut metadata, "mzTab-type", "Quantification").unwrap();
        apply(&mut metadata, "mzTab-ID", "PRIDE_1234").unwrap();
        assert_eq!(metadata.tab_description.mode, MZTabMode::Complete);
        assert_eq!(metadata.tab_description.id.as_deref(), Some("PRIDE_1234"));

        assert!(apply(&mut metadata, "mzTab-mode", "Partial").is_err());
    }

    #[test]
    fn test_indexed_keys() {
        let mut metadata = Metadata::default();
        apply(
            &mut metadata,
            "ms_run[2]-format",
            "[MS,MS:1000584,mzML file,]",
        )
        .unwrap();
        apply(
            &mut metadata,
            "ms_run[2]-location",
            "file://C:/data/run2.mzML",
        )
        .unwrap();
        apply(
            &mut metadata,
            "instrument[1]-analyzer[1]",
            "[MS,MS:1000291,linear ion trap,]",
        )
        .unwrap();
        apply(&mut metadata, "software[1]-setting[1]", "Fragment tolerance = 0.1 Da").unwrap();

        let ms_run = metadata.ms_run(2).unwrap();
        assert!(ms_run.format.is_some());
        assert!(ms_run.location.is_some());
        assert_eq!(metadata.instruments()[&1].analyzers.len(), 1);
        assert_eq!(metadata.software()[&1].settings.len(), 1);
    }

    #[test]
    fn test_quantification_mod_sub_keys() {
        let mut metadata = Metadata::default();
        apply(
            &mut metadata,
            "assay[2]-quantification_mod[1]",
            "[UNIMOD,UNIMOD:188,Label:13C(6),]",
        )
        .unwrap();
        apply(&mut metadata, "assay[2]-quantification_mod[1]-site", "R").unwrap();
        apply(
            &mut metadata,
            "assay[2]-quantification_mod[1]-position",
            "Anywhere",
        )
        .unwrap();

        let assay = metadata.assay(2).unwrap();
        let quantification_mod = &assay.quantification_mods[&1];
        assert!(quantification_mod.param.is_some());
        assert_eq!(quantification_mod.site.as_deref(), Some("R"));
        assert_eq!(quantification_mod.position.as_deref(), Some("Anywhere"));
    }

    #[test]
    fn test_cross_references_through_mtd() {
        let mut metadata = Metadata::default();
        // referencing an unknown sample is a hard error
        assert!(matches!(
            apply(&mut metadata, "assay[1]-sample_ref", "sample[1]"),
            Err(MZTabError::Metadata { .. })
        ));

        apply(&mut metadata, "sample[1]-description", "healthy tissue").unwrap();
        apply(&mut metadata, "assay[1]-sample_ref", "sample[1]").unwrap();
        apply(
            &mut metadata,
            "study_variable[1]-assay_refs",
            "assay[1]",
        )
        .unwrap();
        assert!(metadata.study_variable(1).unwrap().assay_refs.contains(&1));
    }

    #[test]
    fn test_metadata_round_trip() {
        use crate::metadata::MZTabType;
        use crate::params::{Param, PublicationItem, PublicationItemType};

        let mut metadata = Metadata::new(MZTabMode::Complete, MZTabType::Quantification);
        metadata.set_title("quantification study");
        metadata
            .add_protein_search_engine_score(
                1,
                Param::cv("MS", "MS:1001171", "Mascot:score", "").unwrap(),
            )
            .unwrap();
        metadata
            .add_publication_item(
                1,
                PublicationItem::new(PublicationItemType::PubMed, "21063943"),
            )
            .unwrap();
        metadata
            .add_ms_run_location(1, parse_uri("file:/data/run1.mzML").unwrap())
            .unwrap();
        metadata.add_sample_description(1, "healthy tissue").unwrap();
        metadata.add_assay_sample(1, 1).unwrap();
        metadata.add_assay_ms_run(1, 1).unwrap();
        metadata.add_study_variable_assay(1, 1).unwrap();
        metadata
            .add_study_variable_description(1, "spike-in 1")
            .unwrap();

        let mut decoded = Metadata::default();
        for (index, line) in metadata.to_string().lines().enumerate() {
            let mut fields = line.split('\t');
            assert_eq!(fields.next(), Some("MTD"));
            let key = fields.next().unwrap();
            let value = fields.next().unwrap();
            parse_mtd_line(index as u64 + 1, key, value, &mut decoded).unwrap();
        }
        assert_eq!(decoded, metadata);
    }

    #[test]
    fn test_unknown_and_malformed_keys() {
        let mut metadata = Metadata::default();
        assert!(matches!(
            apply(&mut metadata, "flux_capacitor[1]", "[,,x,]"),
            Err(MZTabError::UnknownMetadataKey { .. })
        ));
        assert!(matches!(
            apply(&mut metadata, "software[1]", "not a param"),
            Err(MZTabError::MalformedMetadataValue { .. })
        ));
        // malformed uris are dropped, not fatal
        apply(&mut metadata, "uri[1]", "definitely not a uri").unwrap();
        assert!(metadata.uris().is_empty());
    }
}
