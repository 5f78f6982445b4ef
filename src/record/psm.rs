//! The typed view over a peptide-spectrum-match table row.

use crate::columns::{logical_position, PsmColumn};
use crate::modification::Modification;
use crate::params::Param;
use crate::section::Section;
use crate::spectra_ref::SpectraRef;
use crate::values::{MZBoolean, Reliability, SplitList, Uri};

use super::{impl_table_record, Record, Value};

/// One `PSM` row. Scores in this table are scoped per score id only, with
/// no ms_run component.
#[derive(Debug, Clone, PartialEq)]
pub struct Psm {
    record: Record,
}

impl_table_record!(Psm, Section::PSM);

fn pos(column: PsmColumn) -> String {
    logical_position(column.order(), None, None)
}

impl Psm {
    pub fn sequence(&self) -> Option<&str> {
        self.record.get_string(&pos(PsmColumn::Sequence))
    }

    pub fn set_sequence(&mut self, sequence: impl Into<String>) {
        self.record
            .set_value(&pos(PsmColumn::Sequence), Value::String(sequence.into()));
    }

    pub fn psm_id(&self) -> Option<i32> {
        self.record.get_integer(&pos(PsmColumn::PsmId))
    }

    pub fn set_psm_id(&mut self, id: i32) {
        self.record
            .set_value(&pos(PsmColumn::PsmId), Value::Integer(id));
    }

    pub fn accession(&self) -> Option<&str> {
        self.record.get_string(&pos(PsmColumn::Accession))
    }

    pub fn set_accession(&mut self, accession: impl Into<String>) {
        self.record
            .set_value(&pos(PsmColumn::Accession), Value::String(accession.into()));
    }

    pub fn unique(&self) -> Option<MZBoolean> {
        self.record.get_boolean(&pos(PsmColumn::Unique))
    }

    pub fn set_unique(&mut self, unique: MZBoolean) {
        self.record
            .set_value(&pos(PsmColumn::Unique), Value::Boolean(unique));
    }

    pub fn database(&self) -> Option<&str> {
        self.record.get_string(&pos(PsmColumn::Database))
    }

    pub fn set_database(&mut self, database: impl Into<String>) {
        self.record
            .set_value(&pos(PsmColumn::Database), Value::String(database.into()));
    }

    pub fn database_version(&self) -> Option<&str> {
        self.record.get_string(&pos(PsmColumn::DatabaseVersion))
    }

    pub fn set_database_version(&mut self, version: impl Into<String>) {
        self.record.set_value(
            &pos(PsmColumn::DatabaseVersion),
            Value::String(version.into()),
        );
    }

    pub fn search_engine(&self) -> Option<&SplitList<Param>> {
        self.record.get_param_list(&pos(PsmColumn::SearchEngine))
    }

    pub fn set_search_engine(&mut self, engines: SplitList<Param>) {
        self.record
            .set_value(&pos(PsmColumn::SearchEngine), Value::ParamList(engines));
    }

    pub fn search_engine_score(&self, id: u32) -> Option<f64> {
        self.record.get_double(&logical_position(
            PsmColumn::SearchEngineScore.order(),
            Some(id),
            None,
        ))
    }

    pub fn set_search_engine_score(&mut self, id: u32, score: f64) {
        self.record.set_value(
            &logical_position(PsmColumn::SearchEngineScore.order(), Some(id), None),
            Value::Double(score),
        );
    }

    pub fn reliability(&self) -> Option<Reliability> {
        self.record.get_reliability(&pos(PsmColumn::Reliability))
    }

    pub fn set_reliability(&mut self, reliability: Reliability) {
        self.record.set_value(
            &pos(PsmColumn::Reliability),
            Value::Reliability(reliability),
        );
    }

    pub fn modifications(&self) -> Option<&SplitList<Modification>> {
        self.record
            .get_modification_list(&pos(PsmColumn::Modifications))
    }

    pub fn set_modifications(&mut self, modifications: SplitList<Modification>) {
        self.record.set_value(
            &pos(PsmColumn::Modifications),
            Value::ModificationList(modifications),
        );
    }

    pub fn retention_time(&self) -> Option<&SplitList<f64>> {
        self.record.get_double_list(&pos(PsmColumn::RetentionTime))
    }

    pub fn set_retention_time(&mut self, retention_time: SplitList<f64>) {
        self.record.set_value(
            &pos(PsmColumn::RetentionTime),
            Value::DoubleList(retention_time),
        );
    }

    pub fn charge(&self) -> Option<i32> {
        self.record.get_integer(&pos(PsmColumn::Charge))
    }

    pub fn set_charge(&mut self, charge: i32) {
        self.record
            .set_value(&pos(PsmColumn::Charge), Value::Integer(charge));
    }

    pub fn exp_mass_to_charge(&self) -> Option<f64> {
        self.record.get_double(&pos(PsmColumn::ExpMassToCharge))
    }

    pub fn set_exp_mass_to_charge(&mut self, mz: f64) {
        self.record
            .set_value(&pos(PsmColumn::ExpMassToCharge), Value::Double(mz));
    }

    pub fn calc_mass_to_charge(&self) -> Option<f64> {
        self.record.get_double(&pos(PsmColumn::CalcMassToCharge))
    }

    pub fn set_calc_mass_to_charge(&mut self, mz: f64) {
        self.record
            .set_value(&pos(PsmColumn::CalcMassToCharge), Value::Double(mz));
    }

    pub fn uri(&self) -> Option<&Uri> {
        self.record.get_uri(&pos(PsmColumn::Uri))
    }

    pub fn set_uri(&mut self, uri: Uri) {
        self.record.set_value(&pos(PsmColumn::Uri), Value::Uri(uri));
    }

    pub fn spectra_ref(&self) -> Option<&SplitList<SpectraRef>> {
        self.record
            .get_spectra_ref_list(&pos(PsmColumn::SpectraRef))
    }

    pub fn set_spectra_ref(&mut self, refs: SplitList<SpectraRef>) {
        self.record
            .set_value(&pos(PsmColumn::SpectraRef), Value::SpectraRefList(refs));
    }

    pub fn pre(&self) -> Option<&str> {
        self.record.get_string(&pos(PsmColumn::Pre))
    }

    pub fn set_pre(&mut self, pre: impl Into<String>) {
        self.record
            .set_value(&pos(PsmColumn::Pre), Value::String(pre.into()));
    }

    pub fn post(&self) -> Option<&str> {
        self.record.get_string(&pos(PsmColumn::Post))
    }

    pub fn set_post(&mut self, post: impl Into<String>) {
        self.record
            .set_value(&pos(PsmColumn::Post), Value::String(post.into()));
    }

    pub fn start(&self) -> Option<&str> {
        self.record.get_string(&pos(PsmColumn::Start))
    }

    pub fn set_start(&mut self, start: impl Into<String>) {
        self.record
            .set_value(&pos(PsmColumn::Start), Value::String(start.into()));
    }

    pub fn end(&self) -> Option<&str> {
        self.record.get_string(&pos(PsmColumn::End))
    }

    pub fn set_end(&mut self, end: impl Into<String>) {
        self.record
            .set_value(&pos(PsmColumn::End), Value::String(end.into()));
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::columns::ColumnFactory;
    use crate::spectra_ref::parse_spectra_ref_list;

    #[test]
    fn test_psm_accessors() {
        let mut factory = ColumnFactory::for_section(Section::PSM).unwrap();
        factory.add_search_engine_score_column(1, None).unwrap();

        let mut psm = Psm::new(&factory).unwrap();
        psm.set_sequence("KVPQVSTPTLVEVSR");
        psm.set_psm_id(1);
        psm.set_search_engine_score(1, 62.3);
        psm.set_spectra_ref(parse_spectra_ref_list("ms_run[1]:index=5"));
        psm.set_pre("K");
        psm.set_post("D");

        assert_eq!(psm.psm_id(), Some(1));
        assert_eq!(psm.search_engine_score(1), Some(62.3));
        assert_eq!(psm.spectra_ref().unwrap().len(), 1);

        let line = psm.to_string();
        assert!(line.starts_with("PSM\tKVPQVSTPTLVEVSR\t1\t"));
        assert!(line.contains("ms_run[1]:index=5"));
    }
}
