//! The metadata section: an aggregate of id-indexed element registries with
//! cross-reference validation and a fixed serialization order.
//!
//! Elements follow a lazy upsert lifecycle: the first setter naming an id
//! creates the element with defaults, later setters amend it field by field,
//! and nothing is ever removed. References between elements (an assay's
//! sample, a study variable's assays) are stored as plain ids and resolved
//! through the owning [`Metadata`], never as owning pointers.

mod description;
mod elements;

use std::collections::BTreeMap;
use std::fmt::Display;

use thiserror::Error;

use crate::params::{Param, ParamList, PublicationItem};
use crate::values::{SplitList, Uri, BAR};

pub use description::{
    DescriptionParseError, MZTabDescription, MZTabMode, MZTabType, MZTAB_VERSION,
};
pub use elements::{
    Assay, AssayQuantificationMod, ColUnit, Contact, IndexedElement, Instrument, Mod, MsRun,
    Sample, Software, StudyVariable, CV,
};

#[derive(Debug, Error, PartialEq, Eq)]
pub enum MetadataError {
    #[error("Element ids are 1-based, 0 is not a valid id")]
    InvalidId,
    #[error("{kind}[{id}] is already defined")]
    DuplicateElement { kind: &'static str, id: u32 },
    #[error("assay[{assay}] references sample[{sample}], which has not been defined")]
    UnknownSampleRef { assay: u32, sample: u32 },
    #[error("assay[{assay}] references ms_run[{ms_run}], which has not been defined")]
    UnknownMsRunRef { assay: u32, ms_run: u32 },
    #[error("study_variable[{study_variable}] references assay[{assay}], which has not been defined")]
    UnknownAssayRef { study_variable: u32, assay: u32 },
    #[error(
        "study_variable[{study_variable}] references sample[{sample}], which has not been defined"
    )]
    UnknownStudyVariableSampleRef { study_variable: u32, sample: u32 },
    #[error("colunit may not target the abundance column {0:?}, use the quantification units instead")]
    ColUnitOnAbundanceColumn(String),
}

fn check_id(id: u32) -> Result<u32, MetadataError> {
    if id == 0 {
        Err(MetadataError::InvalidId)
    } else {
        Ok(id)
    }
}

/// The complete metadata section of one mzTab file.
#[derive(Debug, Clone, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Metadata {
    pub tab_description: MZTabDescription,
    pub title: Option<String>,
    pub description: Option<String>,
    sample_processing: BTreeMap<u32, ParamList>,
    instruments: BTreeMap<u32, Instrument>,
    software: BTreeMap<u32, Software>,
    protein_search_engine_scores: BTreeMap<u32, Param>,
    peptide_search_engine_scores: BTreeMap<u32, Param>,
    psm_search_engine_scores: BTreeMap<u32, Param>,
    small_molecule_search_engine_scores: BTreeMap<u32, Param>,
    false_discovery_rate: ParamList,
    publications: BTreeMap<u32, SplitList<PublicationItem>>,
    contacts: BTreeMap<u32, Contact>,
    uris: BTreeMap<u32, Uri>,
    fixed_mods: BTreeMap<u32, Mod>,
    variable_mods: BTreeMap<u32, Mod>,
    pub quantification_method: Option<Param>,
    pub protein_quantification_unit: Option<Param>,
    pub peptide_quantification_unit: Option<Param>,
    pub small_molecule_quantification_unit: Option<Param>,
    ms_runs: BTreeMap<u32, MsRun>,
    samples: BTreeMap<u32, Sample>,
    assays: BTreeMap<u32, Assay>,
    study_variables: BTreeMap<u32, StudyVariable>,
    cvs: BTreeMap<u32, CV>,
    protein_colunits: Vec<ColUnit>,
    peptide_colunits: Vec<ColUnit>,
    psm_colunits: Vec<ColUnit>,
    small_molecule_colunits: Vec<ColUnit>,
    custom: Vec<Param>,
}

impl Metadata {
    pub fn new(mode: MZTabMode, file_type: MZTabType) -> Self {
        Self {
            tab_description: MZTabDescription::new(mode, file_type),
            ..Default::default()
        }
    }

    // ---- description block -------------------------------------------------

    pub fn set_mz_tab_id(&mut self, id: impl Into<String>) {
        self.tab_description.id = Some(id.into());
    }

    pub fn set_title(&mut self, title: impl Into<String>) {
        self.title = Some(title.into());
    }

    pub fn set_description(&mut self, description: impl Into<String>) {
        self.description = Some(description.into());
    }

    // ---- sample processing -------------------------------------------------

    pub fn add_sample_processing(
        &mut self,
        id: u32,
        steps: ParamList,
    ) -> Result<(), MetadataError> {
        self.sample_processing.insert(check_id(id)?, steps);
        Ok(())
    }

    pub fn add_sample_processing_param(
        &mut self,
        id: u32,
        step: Param,
    ) -> Result<(), MetadataError> {
        self.sample_processing
            .entry(check_id(id)?)
            .or_insert_with(SplitList::bar)
            .push(step);
        Ok(())
    }

    pub fn sample_processing(&self) -> &BTreeMap<u32, ParamList> {
        &self.sample_processing
    }

    // ---- instruments -------------------------------------------------------

    fn instrument_mut(&mut self, id: u32) -> Result<&mut Instrument, MetadataError> {
        let id = check_id(id)?;
        Ok(self.instruments.entry(id).or_insert_with(|| Instrument::new(id)))
    }

    pub fn add_instrument_name(&mut self, id: u32, name: Param) -> Result<(), MetadataError> {
        self.instrument_mut(id)?.name = Some(name);
        Ok(())
    }

    pub fn add_instrument_source(&mut self, id: u32, source: Param) -> Result<(), MetadataError> {
        self.instrument_mut(id)?.source = Some(source);
        Ok(())
    }

    pub fn add_instrument_analyzer(
        &mut self,
        id: u32,
        analyzer_id: u32,
        analyzer: Param,
    ) -> Result<(), MetadataError> {
        let analyzer_id = check_id(analyzer_id)?;
        self.instrument_mut(id)?.analyzers.insert(analyzer_id, analyzer);
        Ok(())
    }

    pub fn add_instrument_detector(
        &mut self,
        id: u32,
        detector: Param,
    ) -> Result<(), MetadataError> {
        self.instrument_mut(id)?.detector = Some(detector);
        Ok(())
    }

    pub fn instruments(&self) -> &BTreeMap<u32, Instrument> {
        &self.instruments
    }

    // ---- software ----------------------------------------------------------

    fn software_mut(&mut self, id: u32) -> Result<&mut Software, MetadataError> {
        let id = check_id(id)?;
        Ok(self.software.entry(id).or_insert_with(|| Software::new(id)))
    }

    pub fn add_software_param(&mut self, id: u32, param: Param) -> Result<(), MetadataError> {
        self.software_mut(id)?.param = Some(param);
        Ok(())
    }

    pub fn add_software_setting(
        &mut self,
        id: u32,
        setting: impl Into<String>,
    ) -> Result<(), MetadataError> {
        self.software_mut(id)?.settings.push(setting.into());
        Ok(())
    }

    pub fn software(&self) -> &BTreeMap<u32, Software> {
        &self.software
    }

    // ---- search engine scores ----------------------------------------------

    pub fn add_protein_search_engine_score(
        &mut self,
        id: u32,
        param: Param,
    ) -> Result<(), MetadataError> {
        self.protein_search_engine_scores.insert(check_id(id)?, param);
        Ok(())
    }

    pub fn add_peptide_search_engine_score(
        &mut self,
        id: u32,
        param: Param,
    ) -> Result<(), MetadataError> {
        self.peptide_search_engine_scores.insert(check_id(id)?, param);
        Ok(())
    }

    pub fn add_psm_search_engine_score(
        &mut self,
        id: u32,
        param: Param,
    ) -> Result<(), MetadataError> {
        self.psm_search_engine_scores.insert(check_id(id)?, param);
        Ok(())
    }

    pub fn add_small_molecule_search_engine_score(
        &mut self,
        id: u32,
        param: Param,
    ) -> Result<(), MetadataError> {
        self.small_molecule_search_engine_scores
            .insert(check_id(id)?, param);
        Ok(())
    }

    pub fn protein_search_engine_scores(&self) -> &BTreeMap<u32, Param> {
        &self.protein_search_engine_scores
    }

    pub fn peptide_search_engine_scores(&self) -> &BTreeMap<u32, Param> {
        &self.peptide_search_engine_scores
    }

    pub fn psm_search_engine_scores(&self) -> &BTreeMap<u32, Param> {
        &self.psm_search_engine_scores
    }

    pub fn small_molecule_search_engine_scores(&self) -> &BTreeMap<u32, Param> {
        &self.small_molecule_search_engine_scores
    }

    // ---- file level lists --------------------------------------------------

    pub fn set_false_discovery_rate(&mut self, params: ParamList) {
        self.false_discovery_rate = params;
    }

    pub fn false_discovery_rate(&self) -> &ParamList {
        &self.false_discovery_rate
    }

    pub fn add_publication_item(
        &mut self,
        id: u32,
        item: PublicationItem,
    ) -> Result<(), MetadataError> {
        self.publications
            .entry(check_id(id)?)
            .or_insert_with(|| SplitList::new(BAR))
            .push(item);
        Ok(())
    }

    pub fn publications(&self) -> &BTreeMap<u32, SplitList<PublicationItem>> {
        &self.publications
    }

    fn contact_mut(&mut self, id: u32) -> Result<&mut Contact, MetadataError> {
        let id = check_id(id)?;
        Ok(self.contacts.entry(id).or_insert_with(|| Contact::new(id)))
    }

    pub fn add_contact_name(
        &mut self,
        id: u32,
        name: impl Into<String>,
    ) -> Result<(), MetadataError> {
        self.contact_mut(id)?.name = Some(name.into());
        Ok(())
    }

    pub fn add_contact_affiliation(
        &mut self,
        id: u32,
        affiliation: impl Into<String>,
    ) -> Result<(), MetadataError> {
        self.contact_mut(id)?.affiliation = Some(affiliation.into());
        Ok(())
    }

    pub fn add_contact_email(
        &mut self,
        id: u32,
        email: impl Into<String>,
    ) -> Result<(), MetadataError> {
        self.contact_mut(id)?.email = Some(email.into());
        Ok(())
    }

    pub fn contacts(&self) -> &BTreeMap<u32, Contact> {
        &self.contacts
    }

    pub fn add_uri(&mut self, id: u32, uri: Uri) -> Result<(), MetadataError> {
        self.uris.insert(check_id(id)?, uri);
        Ok(())
    }

    pub fn uris(&self) -> &BTreeMap<u32, Uri> {
        &self.uris
    }

    // ---- search modifications ----------------------------------------------

    fn fixed_mod_mut(&mut self, id: u32) -> Result<&mut Mod, MetadataError> {
        let id = check_id(id)?;
        Ok(self.fixed_mods.entry(id).or_insert_with(|| Mod::new(id)))
    }

    fn variable_mod_mut(&mut self, id: u32) -> Result<&mut Mod, MetadataError> {
        let id = check_id(id)?;
        Ok(self.variable_mods.entry(id).or_insert_with(|| Mod::new(id)))
    }

    pub fn add_fixed_mod_param(&mut self, id: u32, param: Param) -> Result<(), MetadataError> {
        self.fixed_mod_mut(id)?.param = Some(param);
        Ok(())
    }

    pub fn add_fixed_mod_site(
        &mut self,
        id: u32,
        site: impl Into<String>,
    ) -> Result<(), MetadataError> {
        self.fixed_mod_mut(id)?.site = Some(site.into());
        Ok(())
    }

    pub fn add_fixed_mod_position(
        &mut self,
        id: u32,
        position: impl Into<String>,
    ) -> Result<(), MetadataError> {
        self.fixed_mod_mut(id)?.position = Some(position.into());
        Ok(())
    }

    pub fn add_variable_mod_param(&mut self, id: u32, param: Param) -> Result<(), MetadataError> {
        self.variable_mod_mut(id)?.param = Some(param);
        Ok(())
    }

    pub fn add_variable_mod_site(
        &mut self,
        id: u32,
        site: impl Into<String>,
    ) -> Result<(), MetadataError> {
        self.variable_mod_mut(id)?.site = Some(site.into());
        Ok(())
    }

    pub fn add_variable_mod_position(
        &mut self,
        id: u32,
        position: impl Into<String>,
    ) -> Result<(), MetadataError> {
        self.variable_mod_mut(id)?.position = Some(position.into());
        Ok(())
    }

    pub fn fixed_mods(&self) -> &BTreeMap<u32, Mod> {
        &self.fixed_mods
    }

    pub fn variable_mods(&self) -> &BTreeMap<u32, Mod> {
        &self.variable_mods
    }

    // ---- ms_run ------------------------------------------------------------

    fn ms_run_mut(&mut self, id: u32) -> Result<&mut MsRun, MetadataError> {
        let id = check_id(id)?;
        Ok(self.ms_runs.entry(id).or_insert_with(|| MsRun::new(id)))
    }

    pub fn add_ms_run_format(&mut self, id: u32, format: Param) -> Result<(), MetadataError> {
        self.ms_run_mut(id)?.format = Some(format);
        Ok(())
    }

    pub fn add_ms_run_location(&mut self, id: u32, location: Uri) -> Result<(), MetadataError> {
        self.ms_run_mut(id)?.location = Some(location);
        Ok(())
    }

    pub fn add_ms_run_id_format(&mut self, id: u32, id_format: Param) -> Result<(), MetadataError> {
        self.ms_run_mut(id)?.id_format = Some(id_format);
        Ok(())
    }

    pub fn add_ms_run_fragmentation_method(
        &mut self,
        id: u32,
        method: Param,
    ) -> Result<(), MetadataError> {
        self.ms_run_mut(id)?.fragmentation_method = Some(method);
        Ok(())
    }

    pub fn add_ms_run_hash(
        &mut self,
        id: u32,
        hash: impl Into<String>,
    ) -> Result<(), MetadataError> {
        self.ms_run_mut(id)?.hash = Some(hash.into());
        Ok(())
    }

    pub fn add_ms_run_hash_method(&mut self, id: u32, method: Param) -> Result<(), MetadataError> {
        self.ms_run_mut(id)?.hash_method = Some(method);
        Ok(())
    }

    pub fn ms_runs(&self) -> &BTreeMap<u32, MsRun> {
        &self.ms_runs
    }

    pub fn ms_run(&self, id: u32) -> Option<&MsRun> {
        self.ms_runs.get(&id)
    }

    // ---- sample ------------------------------------------------------------

    fn sample_mut(&mut self, id: u32) -> Result<&mut Sample, MetadataError> {
        let id = check_id(id)?;
        Ok(self.samples.entry(id).or_insert_with(|| Sample::new(id)))
    }

    /// Register a fully built sample. Unlike the field-by-field setters this
    /// refuses to overwrite an id that is already present.
    pub fn add_sample(&mut self, sample: Sample) -> Result<(), MetadataError> {
        let id = check_id(sample.id)?;
        if self.samples.contains_key(&id) {
            return Err(MetadataError::DuplicateElement { kind: "sample", id });
        }
        self.samples.insert(id, sample);
        Ok(())
    }

    pub fn add_sample_species(
        &mut self,
        id: u32,
        species_id: u32,
        species: Param,
    ) -> Result<(), MetadataError> {
        let species_id = check_id(species_id)?;
        self.sample_mut(id)?.species.insert(species_id, species);
        Ok(())
    }

    pub fn add_sample_tissue(
        &mut self,
        id: u32,
        tissue_id: u32,
        tissue: Param,
    ) -> Result<(), MetadataError> {
        let tissue_id = check_id(tissue_id)?;
        self.sample_mut(id)?.tissue.insert(tissue_id, tissue);
        Ok(())
    }

    pub fn add_sample_cell_type(
        &mut self,
        id: u32,
        cell_type_id: u32,
        cell_type: Param,
    ) -> Result<(), MetadataError> {
        let cell_type_id = check_id(cell_type_id)?;
        self.sample_mut(id)?.cell_type.insert(cell_type_id, cell_type);
        Ok(())
    }

    pub fn add_sample_disease(
        &mut self,
        id: u32,
        disease_id: u32,
        disease: Param,
    ) -> Result<(), MetadataError> {
        let disease_id = check_id(disease_id)?;
        self.sample_mut(id)?.disease.insert(disease_id, disease);
        Ok(())
    }

    pub fn add_sample_description(
        &mut self,
        id: u32,
        description: impl Into<String>,
    ) -> Result<(), MetadataError> {
        self.sample_mut(id)?.description = Some(description.into());
        Ok(())
    }

    pub fn add_sample_custom(&mut self, id: u32, custom: Param) -> Result<(), MetadataError> {
        self.sample_mut(id)?.custom.push(custom);
        Ok(())
    }

    pub fn samples(&self) -> &BTreeMap<u32, Sample> {
        &self.samples
    }

    pub fn sample(&self, id: u32) -> Option<&Sample> {
        self.samples.get(&id)
    }

    // ---- assay -------------------------------------------------------------

    fn assay_mut(&mut self, id: u32) -> Result<&mut Assay, MetadataError> {
        let id = check_id(id)?;
        Ok(self.assays.entry(id).or_insert_with(|| Assay::new(id)))
    }

    pub fn add_assay_quantification_reagent(
        &mut self,
        id: u32,
        reagent: Param,
    ) -> Result<(), MetadataError> {
        self.assay_mut(id)?.quantification_reagent = Some(reagent);
        Ok(())
    }

    pub fn add_assay_quantification_mod_param(
        &mut self,
        id: u32,
        mod_id: u32,
        param: Param,
    ) -> Result<(), MetadataError> {
        let mod_id = check_id(mod_id)?;
        self.assay_mut(id)?
            .quantification_mods
            .entry(mod_id)
            .or_default()
            .param = Some(param);
        Ok(())
    }

    pub fn add_assay_quantification_mod_site(
        &mut self,
        id: u32,
        mod_id: u32,
        site: impl Into<String>,
    ) -> Result<(), MetadataError> {
        let mod_id = check_id(mod_id)?;
        self.assay_mut(id)?
            .quantification_mods
            .entry(mod_id)
            .or_default()
            .site = Some(site.into());
        Ok(())
    }

    pub fn add_assay_quantification_mod_position(
        &mut self,
        id: u32,
        mod_id: u32,
        position: impl Into<String>,
    ) -> Result<(), MetadataError> {
        let mod_id = check_id(mod_id)?;
        self.assay_mut(id)?
            .quantification_mods
            .entry(mod_id)
            .or_default()
            .position = Some(position.into());
        Ok(())
    }

    /// Link an assay to a sample. The sample must already be registered;
    /// pointing at an undefined element is a construction error, not
    /// something to discover in a downstream validator.
    pub fn add_assay_sample(&mut self, id: u32, sample_id: u32) -> Result<(), MetadataError> {
        let sample_id = check_id(sample_id)?;
        if !self.samples.contains_key(&sample_id) {
            return Err(MetadataError::UnknownSampleRef {
                assay: id,
                sample: sample_id,
            });
        }
        self.assay_mut(id)?.sample_ref = Some(sample_id);
        Ok(())
    }

    /// Link an assay to an ms_run that must already be registered.
    pub fn add_assay_ms_run(&mut self, id: u32, ms_run_id: u32) -> Result<(), MetadataError> {
        let ms_run_id = check_id(ms_run_id)?;
        if !self.ms_runs.contains_key(&ms_run_id) {
            return Err(MetadataError::UnknownMsRunRef {
                assay: id,
                ms_run: ms_run_id,
            });
        }
        self.assay_mut(id)?.ms_run_ref = Some(ms_run_id);
        Ok(())
    }

    pub fn assays(&self) -> &BTreeMap<u32, Assay> {
        &self.assays
    }

    pub fn assay(&self, id: u32) -> Option<&Assay> {
        self.assays.get(&id)
    }

    // ---- study variable ----------------------------------------------------

    fn study_variable_mut(&mut self, id: u32) -> Result<&mut StudyVariable, MetadataError> {
        let id = check_id(id)?;
        Ok(self
            .study_variables
            .entry(id)
            .or_insert_with(|| StudyVariable::new(id)))
    }

    pub fn add_study_variable_description(
        &mut self,
        id: u32,
        description: impl Into<String>,
    ) -> Result<(), MetadataError> {
        self.study_variable_mut(id)?.description = Some(description.into());
        Ok(())
    }

    /// Add an assay to a study variable's grouping. The assay must already be
    /// registered.
    pub fn add_study_variable_assay(&mut self, id: u32, assay_id: u32) -> Result<(), MetadataError> {
        let assay_id = check_id(assay_id)?;
        if !self.assays.contains_key(&assay_id) {
            return Err(MetadataError::UnknownAssayRef {
                study_variable: id,
                assay: assay_id,
            });
        }
        self.study_variable_mut(id)?.assay_refs.insert(assay_id);
        Ok(())
    }

    /// Add a sample to a study variable's grouping. The sample must already
    /// be registered.
    pub fn add_study_variable_sample(
        &mut self,
        id: u32,
        sample_id: u32,
    ) -> Result<(), MetadataError> {
        let sample_id = check_id(sample_id)?;
        if !self.samples.contains_key(&sample_id) {
            return Err(MetadataError::UnknownStudyVariableSampleRef {
                study_variable: id,
                sample: sample_id,
            });
        }
        self.study_variable_mut(id)?.sample_refs.insert(sample_id);
        Ok(())
    }

    pub fn study_variables(&self) -> &BTreeMap<u32, StudyVariable> {
        &self.study_variables
    }

    pub fn study_variable(&self, id: u32) -> Option<&StudyVariable> {
        self.study_variables.get(&id)
    }

    // ---- cv ----------------------------------------------------------------

    fn cv_mut(&mut self, id: u32) -> Result<&mut CV, MetadataError> {
        let id = check_id(id)?;
        Ok(self.cvs.entry(id).or_insert_with(|| CV::new(id)))
    }

    pub fn add_cv_label(&mut self, id: u32, label: impl Into<String>) -> Result<(), MetadataError> {
        self.cv_mut(id)?.label = Some(label.into());
        Ok(())
    }

    pub fn add_cv_full_name(
        &mut self,
        id: u32,
        full_name: impl Into<String>,
    ) -> Result<(), MetadataError> {
        self.cv_mut(id)?.full_name = Some(full_name.into());
        Ok(())
    }

    pub fn add_cv_version(
        &mut self,
        id: u32,
        version: impl Into<String>,
    ) -> Result<(), MetadataError> {
        self.cv_mut(id)?.version = Some(version.into());
        Ok(())
    }

    pub fn add_cv_url(&mut self, id: u32, url: impl Into<String>) -> Result<(), MetadataError> {
        self.cv_mut(id)?.url = Some(url.into());
        Ok(())
    }

    pub fn cvs(&self) -> &BTreeMap<u32, CV> {
        &self.cvs
    }

    // ---- colunit and custom ------------------------------------------------

    fn check_colunit(header: &str) -> Result<(), MetadataError> {
        if header.contains("_abundance_") || header.ends_with("_abundance") {
            return Err(MetadataError::ColUnitOnAbundanceColumn(header.to_string()));
        }
        Ok(())
    }

    pub fn add_protein_colunit(
        &mut self,
        header: impl Into<String>,
        unit: Param,
    ) -> Result<(), MetadataError> {
        let header = header.into();
        Self::check_colunit(&header)?;
        self.protein_colunits.push(ColUnit {
            column_header: header,
            unit,
        });
        Ok(())
    }

    pub fn add_peptide_colunit(
        &mut self,
        header: impl Into<String>,
        unit: Param,
    ) -> Result<(), MetadataError> {
        let header = header.into();
        Self::check_colunit(&header)?;
        self.peptide_colunits.push(ColUnit {
            column_header: header,
            unit,
        });
        Ok(())
    }

    pub fn add_psm_colunit(
        &mut self,
        header: impl Into<String>,
        unit: Param,
    ) -> Result<(), MetadataError> {
        let header = header.into();
        Self::check_colunit(&header)?;
        self.psm_colunits.push(ColUnit {
            column_header: header,
            unit,
        });
        Ok(())
    }

    pub fn add_small_molecule_colunit(
        &mut self,
        header: impl Into<String>,
        unit: Param,
    ) -> Result<(), MetadataError> {
        let header = header.into();
        Self::check_colunit(&header)?;
        self.small_molecule_colunits.push(ColUnit {
            column_header: header,
            unit,
        });
        Ok(())
    }

    pub fn protein_colunits(&self) -> &[ColUnit] {
        &self.protein_colunits
    }

    pub fn add_custom(&mut self, param: Param) {
        self.custom.push(param);
    }

    pub fn custom(&self) -> &[Param] {
        &self.custom
    }
}

impl Display for Metadata {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.tab_description)?;
        if let Some(title) = &self.title {
            writeln!(f, "MTD\ttitle\t{title}")?;
        }
        if let Some(description) = &self.description {
            writeln!(f, "MTD\tdescription\t{description}")?;
        }
        for (id, steps) in &self.sample_processing {
            writeln!(f, "MTD\tsample_processing[{id}]\t{steps}")?;
        }
        for (id, instrument) in &self.instruments {
            if let Some(name) = &instrument.name {
                writeln!(f, "MTD\tinstrument[{id}]-name\t{name}")?;
            }
            if let Some(source) = &instrument.source {
                writeln!(f, "MTD\tinstrument[{id}]-source\t{source}")?;
            }
            for (analyzer_id, analyzer) in &instrument.analyzers {
                writeln!(f, "MTD\tinstrument[{id}]-analyzer[{analyzer_id}]\t{analyzer}")?;
            }
            if let Some(detector) = &instrument.detector {
                writeln!(f, "MTD\tinstrument[{id}]-detector\t{detector}")?;
            }
        }
        for (id, software) in &self.software {
            if let Some(param) = &software.param {
                writeln!(f, "MTD\tsoftware[{id}]\t{param}")?;
            }
            for (setting_id, setting) in software.settings.iter().enumerate() {
                writeln!(f, "MTD\tsoftware[{id}]-setting[{}]\t{setting}", setting_id + 1)?;
            }
        }
        for (id, param) in &self.protein_search_engine_scores {
            writeln!(f, "MTD\tprotein_search_engine_score[{id}]\t{param}")?;
        }
        for (id, param) in &self.peptide_search_engine_scores {
            writeln!(f, "MTD\tpeptide_search_engine_score[{id}]\t{param}")?;
        }
        for (id, param) in &self.psm_search_engine_scores {
            writeln!(f, "MTD\tpsm_search_engine_score[{id}]\t{param}")?;
        }
        for (id, param) in &self.small_molecule_search_engine_scores {
            writeln!(f, "MTD\tsmallmolecule_search_engine_score[{id}]\t{param}")?;
        }
        if !self.false_discovery_rate.is_empty() {
            writeln!(f, "MTD\tfalse_discovery_rate\t{}", self.false_discovery_rate)?;
        }
        for (id, items) in &self.publications {
            writeln!(f, "MTD\tpublication[{id}]\t{items}")?;
        }
        for (id, contact) in &self.contacts {
            if let Some(name) = &contact.name {
                writeln!(f, "MTD\tcontact[{id}]-name\t{name}")?;
            }
            if let Some(affiliation) = &contact.affiliation {
                writeln!(f, "MTD\tcontact[{id}]-affiliation\t{affiliation}")?;
            }
            if let Some(email) = &contact.email {
                writeln!(f, "MTD\tcontact[{id}]-email\t{email}")?;
            }
        }
        for (id, uri) in &self.uris {
            writeln!(f, "MTD\turi[{id}]\t{uri}")?;
        }
        for (id, fixed_mod) in &self.fixed_mods {
            if let Some(param) = &fixed_mod.param {
                writeln!(f, "MTD\tfixed_mod[{id}]\t{param}")?;
            }
            if let Some(site) = &fixed_mod.site {
                writeln!(f, "MTD\tfixed_mod[{id}]-site\t{site}")?;
            }
            if let Some(position) = &fixed_mod.position {
                writeln!(f, "MTD\tfixed_mod[{id}]-position\t{position}")?;
            }
        }
        for (id, variable_mod) in &self.variable_mods {
            if let Some(param) = &variable_mod.param {
                writeln!(f, "MTD\tvariable_mod[{id}]\t{param}")?;
            }
            if let Some(site) = &variable_mod.site {
                writeln!(f, "MTD\tvariable_mod[{id}]-site\t{site}")?;
            }
            if let Some(position) = &variable_mod.position {
                writeln!(f, "MTD\tvariable_mod[{id}]-position\t{position}")?;
            }
        }
        if let Some(method) = &self.quantification_method {
            writeln!(f, "MTD\tquantification_method\t{method}")?;
        }
        if let Some(unit) = &self.protein_quantification_unit {
            writeln!(f, "MTD\tprotein-quantification_unit\t{unit}")?;
        }
        if let Some(unit) = &self.peptide_quantification_unit {
            writeln!(f, "MTD\tpeptide-quantification_unit\t{unit}")?;
        }
        if let Some(unit) = &self.small_molecule_quantification_unit {
            writeln!(f, "MTD\tsmallmolecule-quantification_unit\t{unit}")?;
        }
        for (id, ms_run) in &self.ms_runs {
            if let Some(format) = &ms_run.format {
                writeln!(f, "MTD\tms_run[{id}]-format\t{format}")?;
            }
            if let Some(location) = &ms_run.location {
                writeln!(f, "MTD\tms_run[{id}]-location\t{location}")?;
            }
            if let Some(id_format) = &ms_run.id_format {
                writeln!(f, "MTD\tms_run[{id}]-id_format\t{id_format}")?;
            }
            if let Some(method) = &ms_run.fragmentation_method {
                writeln!(f, "MTD\tms_run[{id}]-fragmentation_method\t{method}")?;
            }
            if let Some(hash) = &ms_run.hash {
                writeln!(f, "MTD\tms_run[{id}]-hash\t{hash}")?;
            }
            if let Some(method) = &ms_run.hash_method {
                writeln!(f, "MTD\tms_run[{id}]-hash_method\t{method}")?;
            }
        }
        for (id, sample) in &self.samples {
            for (sub_id, species) in &sample.species {
                writeln!(f, "MTD\tsample[{id}]-species[{sub_id}]\t{species}")?;
            }
            for (sub_id, tissue) in &sample.tissue {
                writeln!(f, "MTD\tsample[{id}]-tissue[{sub_id}]\t{tissue}")?;
            }
            for (sub_id, cell_type) in &sample.cell_type {
                writeln!(f, "MTD\tsample[{id}]-cell_type[{sub_id}]\t{cell_type}")?;
            }
            for (sub_id, disease) in &sample.disease {
                writeln!(f, "MTD\tsample[{id}]-disease[{sub_id}]\t{disease}")?;
            }
            if let Some(description) = &sample.description {
                writeln!(f, "MTD\tsample[{id}]-description\t{description}")?;
            }
            for (index, custom) in sample.custom.iter().enumerate() {
                writeln!(f, "MTD\tsample[{id}]-custom[{}]\t{custom}", index + 1)?;
            }
        }
        for (id, assay) in &self.assays {
            if let Some(reagent) = &assay.quantification_reagent {
                writeln!(f, "MTD\tassay[{id}]-quantification_reagent\t{reagent}")?;
            }
            for (mod_id, quantification_mod) in &assay.quantification_mods {
                if let Some(param) = &quantification_mod.param {
                    writeln!(f, "MTD\tassay[{id}]-quantification_mod[{mod_id}]\t{param}")?;
                }
                if let Some(site) = &quantification_mod.site {
                    writeln!(f, "MTD\tassay[{id}]-quantification_mod[{mod_id}]-site\t{site}")?;
                }
                if let Some(position) = &quantification_mod.position {
                    writeln!(
                        f,
                        "MTD\tassay[{id}]-quantification_mod[{mod_id}]-position\t{position}"
                    )?;
                }
            }
            if let Some(sample_id) = assay.sample_ref {
                writeln!(f, "MTD\tassay[{id}]-sample_ref\tsample[{sample_id}]")?;
            }
            if let Some(ms_run_id) = assay.ms_run_ref {
                writeln!(f, "MTD\tassay[{id}]-ms_run_ref\tms_run[{ms_run_id}]")?;
            }
        }
        for (id, study_variable) in &self.study_variables {
            if !study_variable.assay_refs.is_empty() {
                let refs: Vec<String> = study_variable
                    .assay_refs
                    .iter()
                    .map(|assay_id| format!("assay[{assay_id}]"))
                    .collect();
                writeln!(f, "MTD\tstudy_variable[{id}]-assay_refs\t{}", refs.join(", "))?;
            }
            if !study_variable.sample_refs.is_empty() {
                let refs: Vec<String> = study_variable
                    .sample_refs
                    .iter()
                    .map(|sample_id| format!("sample[{sample_id}]"))
                    .collect();
                writeln!(
                    f,
                    "MTD\tstudy_variable[{id}]-sample_refs\t{}",
                    refs.join(", ")
                )?;
            }
            if let Some(description) = &study_variable.description {
                writeln!(f, "MTD\tstudy_variable[{id}]-description\t{description}")?;
            }
        }
        for (id, cv) in &self.cvs {
            if let Some(label) = &cv.label {
                writeln!(f, "MTD\tcv[{id}]-label\t{label}")?;
            }
            if let Some(full_name) = &cv.full_name {
                writeln!(f, "MTD\tcv[{id}]-full_name\t{full_name}")?;
            }
            if let Some(version) = &cv.version {
                writeln!(f, "MTD\tcv[{id}]-version\t{version}")?;
            }
            if let Some(url) = &cv.url {
                writeln!(f, "MTD\tcv[{id}]-url\t{url}")?;
            }
        }
        for colunit in &self.protein_colunits {
            writeln!(f, "MTD\tcolunit-protein\t{colunit}")?;
        }
        for colunit in &self.peptide_colunits {
            writeln!(f, "MTD\tcolunit-peptide\t{colunit}")?;
        }
        for colunit in &self.psm_colunits {
            writeln!(f, "MTD\tcolunit-psm\t{colunit}")?;
        }
        for colunit in &self.small_molecule_colunits {
            writeln!(f, "MTD\tcolunit-small_molecule\t{colunit}")?;
        }
        for (index, custom) in self.custom.iter().enumerate() {
            writeln!(f, "MTD\tcustom[{}]\t{custom}", index + 1)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::params::PublicationItemType;
    use crate::values::parse_uri;

    fn cv(accession: &str, name: &str) -> Param {
        Param::cv("MS", accession, name, "").unwrap()
    }

    #[test]
    fn test_upsert_lifecycle() {
        let mut metadata = Metadata::new(MZTabMode::Summary, MZTabType::Identification);
        metadata
            .add_ms_run_format(2, cv("MS:1000584", "mzML file"))
            .unwrap();
        // referenced before any other field was set
        assert!(metadata.ms_run(2).is_some());
        assert!(metadata.ms_run(2).unwrap().location.is_none());

        metadata
            .add_ms_run_location(2, parse_uri("file:/C:/data/run2.mzML").unwrap())
            .unwrap();
        assert!(metadata.ms_run(2).unwrap().location.is_some());
        assert!(metadata.ms_run(2).unwrap().format.is_some());
    }

    #[test]
    fn test_invalid_id() {
        let mut metadata = Metadata::default();
        assert_eq!(
            metadata.add_contact_name(0, "A. Scientist"),
            Err(MetadataError::InvalidId)
        );
    }

    #[test]
    fn test_cross_reference_validation() {
        let mut metadata = Metadata::new(MZTabMode::Summary, MZTabType::Identification);

        // the sample does not exist yet
        assert_eq!(
            metadata.add_assay_sample(1, 1),
            Err(MetadataError::UnknownSampleRef { assay: 1, sample: 1 })
        );

        metadata.add_sample(Sample::new(1)).unwrap();
        metadata.add_assay_sample(1, 1).unwrap();
        assert_eq!(metadata.assay(1).unwrap().sample_ref, Some(1));

        // study variable linkage follows the same rule
        assert_eq!(
            metadata.add_study_variable_assay(1, 7),
            Err(MetadataError::UnknownAssayRef {
                study_variable: 1,
                assay: 7
            })
        );
        metadata.add_study_variable_assay(1, 1).unwrap();
        assert!(metadata.study_variable(1).unwrap().assay_refs.contains(&1));
    }

    #[test]
    fn test_duplicate_sample_rejected() {
        let mut metadata = Metadata::default();
        metadata.add_sample(Sample::new(1)).unwrap();
        assert_eq!(
            metadata.add_sample(Sample::new(1)),
            Err(MetadataError::DuplicateElement {
                kind: "sample",
                id: 1
            })
        );
    }

    #[test]
    fn test_colunit_abundance_rejected() {
        let mut metadata = Metadata::default();
        assert!(metadata
            .add_protein_colunit(
                "protein_abundance_assay[1]",
                cv("UO:0000031", "minute"),
            )
            .is_err());
        metadata
            .add_peptide_colunit("retention_time", cv("UO:0000031", "minute"))
            .unwrap();
    }

    #[test]
    fn test_serialization_order() {
        let mut metadata = Metadata::new(MZTabMode::Complete, MZTabType::Quantification);
        metadata.set_title("iTRAQ experiment");
        metadata
            .add_publication_item(
                1,
                PublicationItem::new(PublicationItemType::PubMed, "21063943"),
            )
            .unwrap();
        metadata
            .add_software_param(1, cv("MS:1001207", "Mascot"))
            .unwrap();
        metadata
            .add_ms_run_location(1, parse_uri("file:/data/run1.mzML").unwrap())
            .unwrap();
        metadata.add_custom(Param::user("processing date", "2011-09-02").unwrap());

        let text = metadata.to_string();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[0], "MTD\tmzTab-version\t1.0");
        assert_eq!(lines[1], "MTD\tmzTab-mode\tComplete");
        assert_eq!(lines[2], "MTD\tmzTab-type\tQuantification");
        assert_eq!(lines[3], "MTD\ttitle\tiTRAQ experiment");
        // software precedes publication, publication precedes ms_run,
        // custom params come last
        let software = lines.iter().position(|l| l.starts_with("MTD\tsoftware")).unwrap();
        let publication = lines
            .iter()
            .position(|l| l.starts_with("MTD\tpublication"))
            .unwrap();
        let ms_run = lines.iter().position(|l| l.starts_with("MTD\tms_run")).unwrap();
        let custom = lines.iter().position(|l| l.starts_with("MTD\tcustom")).unwrap();
        assert!(software < publication);
        assert!(publication < ms_run);
        assert!(ms_run < custom);
        assert_eq!(
            lines[custom],
            "MTD\tcustom[1]\t[,,processing date,2011-09-02]"
        );
    }

    #[test]
    fn test_study_variable_refs_formatting() {
        let mut metadata = Metadata::default();
        metadata.add_sample(Sample::new(1)).unwrap();
        metadata.add_ms_run_location(1, parse_uri("file:/r1.mzML").unwrap()).unwrap();
        metadata.add_assay_sample(1, 1).unwrap();
        metadata.add_assay_ms_run(1, 1).unwrap();
        metadata.add_assay_sample(2, 1).unwrap();
        metadata.add_study_variable_assay(1, 1).unwrap();
        metadata.add_study_variable_assay(1, 2).unwrap();

        let text = metadata.to_string();
        assert!(text.contains("MTD\tstudy_variable[1]-assay_refs\tassay[1], assay[2]\n"));
    }
}
