//! The typed view over a peptide table row.

use crate::columns::{logical_position, PeptideColumn};
use crate::metadata::IndexedElement;
use crate::metadata::MsRun;
use crate::modification::Modification;
use crate::params::Param;
use crate::section::Section;
use crate::spectra_ref::SpectraRef;
use crate::values::{MZBoolean, Reliability, SplitList, Uri};

use super::{impl_table_record, Record, Value};

/// One `PEP` row. The stable accessors address their columns by the fixed
/// schema; score cells derive their position from the score id and ms_run;
/// abundance and `opt_` cells resolve their column by header at call time.
///
/// Setters follow the record's write gate and quietly drop values for
/// columns the bound factory never declared.
#[derive(Debug, Clone, PartialEq)]
pub struct Peptide {
    record: Record,
}

impl_table_record!(Peptide, Section::Peptide);

fn pos(column: PeptideColumn) -> String {
    logical_position(column.order(), None, None)
}

impl Peptide {
    pub fn sequence(&self) -> Option<&str> {
        self.record.get_string(&pos(PeptideColumn::Sequence))
    }

    pub fn set_sequence(&mut self, sequence: impl Into<String>) {
        self.record
            .set_value(&pos(PeptideColumn::Sequence), Value::String(sequence.into()));
    }

    pub fn accession(&self) -> Option<&str> {
        self.record.get_string(&pos(PeptideColumn::Accession))
    }

    pub fn set_accession(&mut self, accession: impl Into<String>) {
        self.record.set_value(
            &pos(PeptideColumn::Accession),
            Value::String(accession.into()),
        );
    }

    pub fn unique(&self) -> Option<MZBoolean> {
        self.record.get_boolean(&pos(PeptideColumn::Unique))
    }

    pub fn set_unique(&mut self, unique: MZBoolean) {
        self.record
            .set_value(&pos(PeptideColumn::Unique), Value::Boolean(unique));
    }

    pub fn database(&self) -> Option<&str> {
        self.record.get_string(&pos(PeptideColumn::Database))
    }

    pub fn set_database(&mut self, database: impl Into<String>) {
        self.record
            .set_value(&pos(PeptideColumn::Database), Value::String(database.into()));
    }

    pub fn database_version(&self) -> Option<&str> {
        self.record.get_string(&pos(PeptideColumn::DatabaseVersion))
    }

    pub fn set_database_version(&mut self, version: impl Into<String>) {
        self.record.set_value(
            &pos(PeptideColumn::DatabaseVersion),
            Value::String(version.into()),
        );
    }

    pub fn search_engine(&self) -> Option<&SplitList<Param>> {
        self.record.get_param_list(&pos(PeptideColumn::SearchEngine))
    }

    pub fn set_search_engine(&mut self, engines: SplitList<Param>) {
        self.record.set_value(
            &pos(PeptideColumn::SearchEngine),
            Value::ParamList(engines),
        );
    }

    pub fn best_search_engine_score(&self, id: u32) -> Option<f64> {
        self.record.get_double(&logical_position(
            PeptideColumn::BestSearchEngineScore.order(),
            Some(id),
            None,
        ))
    }

    pub fn set_best_search_engine_score(&mut self, id: u32, score: f64) {
        self.record.set_value(
            &logical_position(PeptideColumn::BestSearchEngineScore.order(), Some(id), None),
            Value::Double(score),
        );
    }

    pub fn search_engine_score(&self, id: u32, ms_run: &MsRun) -> Option<f64> {
        self.record.get_double(&logical_position(
            PeptideColumn::SearchEngineScore.order(),
            Some(id),
            Some(ms_run.id()),
        ))
    }

    pub fn set_search_engine_score(&mut self, id: u32, ms_run: &MsRun, score: f64) {
        self.record.set_value(
            &logical_position(
                PeptideColumn::SearchEngineScore.order(),
                Some(id),
                Some(ms_run.id()),
            ),
            Value::Double(score),
        );
    }

    pub fn reliability(&self) -> Option<Reliability> {
        self.record.get_reliability(&pos(PeptideColumn::Reliability))
    }

    pub fn set_reliability(&mut self, reliability: Reliability) {
        self.record.set_value(
            &pos(PeptideColumn::Reliability),
            Value::Reliability(reliability),
        );
    }

    pub fn modifications(&self) -> Option<&SplitList<Modification>> {
        self.record
            .get_modification_list(&pos(PeptideColumn::Modifications))
    }

    pub fn set_modifications(&mut self, modifications: SplitList<Modification>) {
        self.record.set_value(
            &pos(PeptideColumn::Modifications),
            Value::ModificationList(modifications),
        );
    }

    pub fn retention_time(&self) -> Option<&SplitList<f64>> {
        self.record
            .get_double_list(&pos(PeptideColumn::RetentionTime))
    }

    pub fn set_retention_time(&mut self, retention_time: SplitList<f64>) {
        self.record.set_value(
            &pos(PeptideColumn::RetentionTime),
            Value::DoubleList(retention_time),
        );
    }

    pub fn retention_time_window(&self) -> Option<&SplitList<f64>> {
        self.record
            .get_double_list(&pos(PeptideColumn::RetentionTimeWindow))
    }

    pub fn set_retention_time_window(&mut self, window: SplitList<f64>) {
        self.record.set_value(
            &pos(PeptideColumn::RetentionTimeWindow),
            Value::DoubleList(window),
        );
    }

    pub fn charge(&self) -> Option<i32> {
        self.record.get_integer(&pos(PeptideColumn::Charge))
    }

    pub fn set_charge(&mut self, charge: i32) {
        self.record
            .set_value(&pos(PeptideColumn::Charge), Value::Integer(charge));
    }

    pub fn mass_to_charge(&self) -> Option<f64> {
        self.record.get_double(&pos(PeptideColumn::MassToCharge))
    }

    pub fn set_mass_to_charge(&mut self, mz: f64) {
        self.record
            .set_value(&pos(PeptideColumn::MassToCharge), Value::Double(mz));
    }

    pub fn uri(&self) -> Option<&Uri> {
        self.record.get_uri(&pos(PeptideColumn::Uri))
    }

    pub fn set_uri(&mut self, uri: Uri) {
        self.record
            .set_value(&pos(PeptideColumn::Uri), Value::Uri(uri));
    }

    pub fn spectra_ref(&self) -> Option<&SplitList<SpectraRef>> {
        self.record
            .get_spectra_ref_list(&pos(PeptideColumn::SpectraRef))
    }

    pub fn set_spectra_ref(&mut self, refs: SplitList<SpectraRef>) {
        self.record.set_value(
            &pos(PeptideColumn::SpectraRef),
            Value::SpectraRefList(refs),
        );
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::columns::ColumnFactory;
    use crate::modification::parse_modification_list;

    #[test]
    fn test_stable_accessors() {
        let factory = ColumnFactory::for_section(Section::Peptide).unwrap();
        let mut peptide = Peptide::new(&factory).unwrap();
        peptide.set_sequence("PEPTIDE");
        peptide.set_charge(2);
        peptide.set_mass_to_charge(254.43);
        peptide.set_unique(MZBoolean::True);
        assert_eq!(peptide.sequence(), Some("PEPTIDE"));
        assert_eq!(peptide.charge(), Some(2));
        assert_eq!(peptide.unique(), Some(MZBoolean::True));
    }

    #[test]
    fn test_score_accessors_need_declared_columns() {
        let mut factory = ColumnFactory::for_section(Section::Peptide).unwrap();
        let ms_run = MsRun::new(1);

        let mut peptide = Peptide::new(&factory).unwrap();
        // the column was never declared, the convenience setter swallows it
        peptide.set_best_search_engine_score(1, 62.3);
        assert_eq!(peptide.best_search_engine_score(1), None);

        factory.add_best_search_engine_score_column(1).unwrap();
        factory
            .add_search_engine_score_column(1, Some(&ms_run))
            .unwrap();
        let mut peptide = Peptide::new(&factory).unwrap();
        peptide.set_best_search_engine_score(1, 62.3);
        peptide.set_search_engine_score(1, &ms_run, 54.1);
        assert_eq!(peptide.best_search_engine_score(1), Some(62.3));
        assert_eq!(peptide.search_engine_score(1, &ms_run), Some(54.1));
    }

    #[test]
    fn test_row_round_trip_shape() {
        let factory = ColumnFactory::for_section(Section::Peptide).unwrap();
        let mut peptide = Peptide::new(&factory).unwrap();
        peptide.set_sequence("PEPTIDE");
        peptide.set_charge(2);
        peptide.set_modifications(parse_modification_list(Section::Peptide, "3-MOD:00001"));

        let line = peptide.to_string();
        assert!(line.starts_with("PEP\tPEPTIDE\t"));
        assert!(line.contains("\t3-MOD:00001\t"));
    }
}
