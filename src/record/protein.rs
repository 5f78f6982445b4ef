//! The typed view over a protein table row.

use crate::columns::{logical_position, ProteinColumn};
use crate::metadata::IndexedElement;
use crate::metadata::MsRun;
use crate::modification::Modification;
use crate::params::Param;
use crate::section::Section;
use crate::values::{Reliability, SplitList, Uri};

use super::{impl_table_record, Record, Value};

/// One `PRT` row.
#[derive(Debug, Clone, PartialEq)]
pub struct Protein {
    record: Record,
}

impl_table_record!(Protein, Section::Protein);

fn pos(column: ProteinColumn) -> String {
    logical_position(column.order(), None, None)
}

fn run_pos(column: ProteinColumn, ms_run: &MsRun) -> String {
    logical_position(column.order(), None, Some(ms_run.id()))
}

impl Protein {
    pub fn accession(&self) -> Option<&str> {
        self.record.get_string(&pos(ProteinColumn::Accession))
    }

    pub fn set_accession(&mut self, accession: impl Into<String>) {
        self.record.set_value(
            &pos(ProteinColumn::Accession),
            Value::String(accession.into()),
        );
    }

    pub fn description(&self) -> Option<&str> {
        self.record.get_string(&pos(ProteinColumn::Description))
    }

    pub fn set_description(&mut self, description: impl Into<String>) {
        self.record.set_value(
            &pos(ProteinColumn::Description),
            Value::String(description.into()),
        );
    }

    pub fn taxid(&self) -> Option<i32> {
        self.record.get_integer(&pos(ProteinColumn::Taxid))
    }

    pub fn set_taxid(&mut self, taxid: i32) {
        self.record
            .set_value(&pos(ProteinColumn::Taxid), Value::Integer(taxid));
    }

    pub fn species(&self) -> Option<&str> {
        self.record.get_string(&pos(ProteinColumn::Species))
    }

    pub fn set_species(&mut self, species: impl Into<String>) {
        self.record
            .set_value(&pos(ProteinColumn::Species), Value::String(species.into()));
    }

    pub fn database(&self) -> Option<&str> {
        self.record.get_string(&pos(ProteinColumn::Database))
    }

    pub fn set_database(&mut self, database: impl Into<String>) {
        self.record
            .set_value(&pos(ProteinColumn::Database), Value::String(database.into()));
    }

    pub fn database_version(&self) -> Option<&str> {
        self.record.get_string(&pos(ProteinColumn::DatabaseVersion))
    }

    pub fn set_database_version(&mut self, version: impl Into<String>) {
        self.record.set_value(
            &pos(ProteinColumn::DatabaseVersion),
            Value::String(version.into()),
        );
    }

    pub fn search_engine(&self) -> Option<&SplitList<Param>> {
        self.record.get_param_list(&pos(ProteinColumn::SearchEngine))
    }

    pub fn set_search_engine(&mut self, engines: SplitList<Param>) {
        self.record.set_value(
            &pos(ProteinColumn::SearchEngine),
            Value::ParamList(engines),
        );
    }

    pub fn best_search_engine_score(&self, id: u32) -> Option<f64> {
        self.record.get_double(&logical_position(
            ProteinColumn::BestSearchEngineScore.order(),
            Some(id),
            None,
        ))
    }

    pub fn set_best_search_engine_score(&mut self, id: u32, score: f64) {
        self.record.set_value(
            &logical_position(ProteinColumn::BestSearchEngineScore.order(), Some(id), None),
            Value::Double(score),
        );
    }

    pub fn search_engine_score(&self, id: u32, ms_run: &MsRun) -> Option<f64> {
        self.record.get_double(&logical_position(
            ProteinColumn::SearchEngineScore.order(),
            Some(id),
            Some(ms_run.id()),
        ))
    }

    pub fn set_search_engine_score(&mut self, id: u32, ms_run: &MsRun, score: f64) {
        self.record.set_value(
            &logical_position(
                ProteinColumn::SearchEngineScore.order(),
                Some(id),
                Some(ms_run.id()),
            ),
            Value::Double(score),
        );
    }

    pub fn reliability(&self) -> Option<Reliability> {
        self.record.get_reliability(&pos(ProteinColumn::Reliability))
    }

    pub fn set_reliability(&mut self, reliability: Reliability) {
        self.record.set_value(
            &pos(ProteinColumn::Reliability),
            Value::Reliability(reliability),
        );
    }

    pub fn num_psms(&self, ms_run: &MsRun) -> Option<i32> {
        self.record
            .get_integer(&run_pos(ProteinColumn::NumPsms, ms_run))
    }

    pub fn set_num_psms(&mut self, ms_run: &MsRun, count: i32) {
        self.record.set_value(
            &run_pos(ProteinColumn::NumPsms, ms_run),
            Value::Integer(count),
        );
    }

    pub fn num_peptides_distinct(&self, ms_run: &MsRun) -> Option<i32> {
        self.record
            .get_integer(&run_pos(ProteinColumn::NumPeptidesDistinct, ms_run))
    }

    pub fn set_num_peptides_distinct(&mut self, ms_run: &MsRun, count: i32) {
        self.record.set_value(
            &run_pos(ProteinColumn::NumPeptidesDistinct, ms_run),
            Value::Integer(count),
        );
    }

    pub fn num_peptides_unique(&self, ms_run: &MsRun) -> Option<i32> {
        self.record
            .get_integer(&run_pos(ProteinColumn::NumPeptidesUnique, ms_run))
    }

    pub fn set_num_peptides_unique(&mut self, ms_run: &MsRun, count: i32) {
        self.record.set_value(
            &run_pos(ProteinColumn::NumPeptidesUnique, ms_run),
            Value::Integer(count),
        );
    }

    pub fn ambiguity_members(&self) -> Option<&SplitList<String>> {
        self.record
            .get_string_list(&pos(ProteinColumn::AmbiguityMembers))
    }

    pub fn set_ambiguity_members(&mut self, members: SplitList<String>) {
        self.record.set_value(
            &pos(ProteinColumn::AmbiguityMembers),
            Value::StringList(members),
        );
    }

    pub fn modifications(&self) -> Option<&SplitList<Modification>> {
        self.record
            .get_modification_list(&pos(ProteinColumn::Modifications))
    }

    pub fn set_modifications(&mut self, modifications: SplitList<Modification>) {
        self.record.set_value(
            &pos(ProteinColumn::Modifications),
            Value::ModificationList(modifications),
        );
    }

    pub fn uri(&self) -> Option<&Uri> {
        self.record.get_uri(&pos(ProteinColumn::Uri))
    }

    pub fn set_uri(&mut self, uri: Uri) {
        self.record
            .set_value(&pos(ProteinColumn::Uri), Value::Uri(uri));
    }

    pub fn go_terms(&self) -> Option<&SplitList<String>> {
        self.record.get_string_list(&pos(ProteinColumn::GoTerms))
    }

    pub fn set_go_terms(&mut self, terms: SplitList<String>) {
        self.record
            .set_value(&pos(ProteinColumn::GoTerms), Value::StringList(terms));
    }

    pub fn protein_coverage(&self) -> Option<f64> {
        self.record.get_double(&pos(ProteinColumn::ProteinCoverage))
    }

    pub fn set_protein_coverage(&mut self, coverage: f64) {
        self.record.set_value(
            &pos(ProteinColumn::ProteinCoverage),
            Value::Double(coverage),
        );
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::columns::ColumnFactory;
    use crate::metadata::StudyVariable;

    #[test]
    fn test_per_run_counters() {
        let mut factory = ColumnFactory::for_section(Section::Protein).unwrap();
        let ms_run = MsRun::new(2);
        factory
            .add_per_run_column(ProteinColumn::NumPsms, &ms_run)
            .unwrap();

        let mut protein = Protein::new(&factory).unwrap();
        protein.set_accession("P12345");
        protein.set_num_psms(&ms_run, 13);
        assert_eq!(protein.num_psms(&ms_run), Some(13));

        // a run without a declared counter column reads back absent
        let other_run = MsRun::new(3);
        protein.set_num_psms(&other_run, 4);
        assert_eq!(protein.num_psms(&other_run), None);
    }

    #[test]
    fn test_abundance_resolved_by_header() {
        let mut factory = ColumnFactory::for_section(Section::Protein).unwrap();
        let study_variable = StudyVariable::new(1);
        factory.add_abundance_columns(&study_variable).unwrap();

        let mut protein = Protein::new(&factory).unwrap();
        assert!(protein.set_abundance_study_variable(
            &factory,
            crate::columns::AbundanceField::Abundance,
            &study_variable,
            10.5,
        ));
        assert_eq!(
            protein.abundance_study_variable(
                &factory,
                crate::columns::AbundanceField::Abundance,
                &study_variable
            ),
            Some(10.5)
        );
        assert_eq!(
            protein.abundance_study_variable(
                &factory,
                crate::columns::AbundanceField::Stdev,
                &study_variable
            ),
            None
        );
    }
}
