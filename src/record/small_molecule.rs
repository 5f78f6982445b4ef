//! The typed view over a small molecule table row.

use crate::columns::{logical_position, SmallMoleculeColumn};
use crate::metadata::IndexedElement;
use crate::metadata::MsRun;
use crate::modification::Modification;
use crate::params::Param;
use crate::section::Section;
use crate::spectra_ref::SpectraRef;
use crate::values::{Reliability, SplitList, Uri};

use super::{impl_table_record, Record, Value};

/// One `SML` row.
#[derive(Debug, Clone, PartialEq)]
pub struct SmallMolecule {
    record: Record,
}

impl_table_record!(SmallMolecule, Section::SmallMolecule);

fn pos(column: SmallMoleculeColumn) -> String {
    logical_position(column.order(), None, None)
}

impl SmallMolecule {
    pub fn identifier(&self) -> Option<&SplitList<String>> {
        self.record
            .get_string_list(&pos(SmallMoleculeColumn::Identifier))
    }

    pub fn set_identifier(&mut self, identifier: SplitList<String>) {
        self.record.set_value(
            &pos(SmallMoleculeColumn::Identifier),
            Value::StringList(identifier),
        );
    }

    pub fn chemical_formula(&self) -> Option<&str> {
        self.record
            .get_string(&pos(SmallMoleculeColumn::ChemicalFormula))
    }

    pub fn set_chemical_formula(&mut self, formula: impl Into<String>) {
        self.record.set_value(
            &pos(SmallMoleculeColumn::ChemicalFormula),
            Value::String(formula.into()),
        );
    }

    pub fn smiles(&self) -> Option<&SplitList<String>> {
        self.record.get_string_list(&pos(SmallMoleculeColumn::Smiles))
    }

    pub fn set_smiles(&mut self, smiles: SplitList<String>) {
        self.record.set_value(
            &pos(SmallMoleculeColumn::Smiles),
            Value::StringList(smiles),
        );
    }

    pub fn inchi_key(&self) -> Option<&SplitList<String>> {
        self.record
            .get_string_list(&pos(SmallMoleculeColumn::InchiKey))
    }

    pub fn set_inchi_key(&mut self, inchi_key: SplitList<String>) {
        self.record.set_value(
            &pos(SmallMoleculeColumn::InchiKey),
            Value::StringList(inchi_key),
        );
    }

    pub fn description(&self) -> Option<&str> {
        self.record
            .get_string(&pos(SmallMoleculeColumn::Description))
    }

    pub fn set_description(&mut self, description: impl Into<String>) {
        self.record.set_value(
            &pos(SmallMoleculeColumn::Description),
            Value::String(description.into()),
        );
    }

    pub fn exp_mass_to_charge(&self) -> Option<f64> {
        self.record
            .get_double(&pos(SmallMoleculeColumn::ExpMassToCharge))
    }

    pub fn set_exp_mass_to_charge(&mut self, mz: f64) {
        self.record.set_value(
            &pos(SmallMoleculeColumn::ExpMassToCharge),
            Value::Double(mz),
        );
    }

    pub fn calc_mass_to_charge(&self) -> Option<f64> {
        self.record
            .get_double(&pos(SmallMoleculeColumn::CalcMassToCharge))
    }

    pub fn set_calc_mass_to_charge(&mut self, mz: f64) {
        self.record.set_value(
            &pos(SmallMoleculeColumn::CalcMassToCharge),
            Value::Double(mz),
        );
    }

    pub fn charge(&self) -> Option<i32> {
        self.record.get_integer(&pos(SmallMoleculeColumn::Charge))
    }

    pub fn set_charge(&mut self, charge: i32) {
        self.record
            .set_value(&pos(SmallMoleculeColumn::Charge), Value::Integer(charge));
    }

    pub fn retention_time(&self) -> Option<&SplitList<f64>> {
        self.record
            .get_double_list(&pos(SmallMoleculeColumn::RetentionTime))
    }

    pub fn set_retention_time(&mut self, retention_time: SplitList<f64>) {
        self.record.set_value(
            &pos(SmallMoleculeColumn::RetentionTime),
            Value::DoubleList(retention_time),
        );
    }

    pub fn taxid(&self) -> Option<i32> {
        self.record.get_integer(&pos(SmallMoleculeColumn::Taxid))
    }

    pub fn set_taxid(&mut self, taxid: i32) {
        self.record
            .set_value(&pos(SmallMoleculeColumn::Taxid), Value::Integer(taxid));
    }

    pub fn species(&self) -> Option<&str> {
        self.record.get_string(&pos(SmallMoleculeColumn::Species))
    }

    pub fn set_species(&mut self, species: impl Into<String>) {
        self.record.set_value(
            &pos(SmallMoleculeColumn::Species),
            Value::String(species.into()),
        );
    }

    pub fn database(&self) -> Option<&str> {
        self.record.get_string(&pos(SmallMoleculeColumn::Database))
    }

    pub fn set_database(&mut self, database: impl Into<String>) {
        self.record.set_value(
            &pos(SmallMoleculeColumn::Database),
            Value::String(database.into()),
        );
    }

    pub fn database_version(&self) -> Option<&str> {
        self.record
            .get_string(&pos(SmallMoleculeColumn::DatabaseVersion))
    }

    pub fn set_database_version(&mut self, version: impl Into<String>) {
        self.record.set_value(
            &pos(SmallMoleculeColumn::DatabaseVersion),
            Value::String(version.into()),
        );
    }

    pub fn reliability(&self) -> Option<Reliability> {
        self.record
            .get_reliability(&pos(SmallMoleculeColumn::Reliability))
    }

    pub fn set_reliability(&mut self, reliability: Reliability) {
        self.record.set_value(
            &pos(SmallMoleculeColumn::Reliability),
            Value::Reliability(reliability),
        );
    }

    pub fn uri(&self) -> Option<&Uri> {
        self.record.get_uri(&pos(SmallMoleculeColumn::Uri))
    }

    pub fn set_uri(&mut self, uri: Uri) {
        self.record
            .set_value(&pos(SmallMoleculeColumn::Uri), Value::Uri(uri));
    }

    pub fn spectra_ref(&self) -> Option<&SplitList<SpectraRef>> {
        self.record
            .get_spectra_ref_list(&pos(SmallMoleculeColumn::SpectraRef))
    }

    pub fn set_spectra_ref(&mut self, refs: SplitList<SpectraRef>) {
        self.record.set_value(
            &pos(SmallMoleculeColumn::SpectraRef),
            Value::SpectraRefList(refs),
        );
    }

    pub fn search_engine(&self) -> Option<&SplitList<Param>> {
        self.record
            .get_param_list(&pos(SmallMoleculeColumn::SearchEngine))
    }

    pub fn set_search_engine(&mut self, engines: SplitList<Param>) {
        self.record.set_value(
            &pos(SmallMoleculeColumn::SearchEngine),
            Value::ParamList(engines),
        );
    }

    pub fn best_search_engine_score(&self, id: u32) -> Option<f64> {
        self.record.get_double(&logical_position(
            SmallMoleculeColumn::BestSearchEngineScore.order(),
            Some(id),
            None,
        ))
    }

    pub fn set_best_search_engine_score(&mut self, id: u32, score: f64) {
        self.record.set_value(
            &logical_position(
                SmallMoleculeColumn::BestSearchEngineScore.order(),
                Some(id),
                None,
            ),
            Value::Double(score),
        );
    }

    pub fn search_engine_score(&self, id: u32, ms_run: &MsRun) -> Option<f64> {
        self.record.get_double(&logical_position(
            SmallMoleculeColumn::SearchEngineScore.order(),
            Some(id),
            Some(ms_run.id()),
        ))
    }

    pub fn set_search_engine_score(&mut self, id: u32, ms_run: &MsRun, score: f64) {
        self.record.set_value(
            &logical_position(
                SmallMoleculeColumn::SearchEngineScore.order(),
                Some(id),
                Some(ms_run.id()),
            ),
            Value::Double(score),
        );
    }

    pub fn modifications(&self) -> Option<&SplitList<Modification>> {
        self.record
            .get_modification_list(&pos(SmallMoleculeColumn::Modifications))
    }

    pub fn set_modifications(&mut self, modifications: SplitList<Modification>) {
        self.record.set_value(
            &pos(SmallMoleculeColumn::Modifications),
            Value::ModificationList(modifications),
        );
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::columns::ColumnFactory;
    use crate::metadata::Assay;
    use crate::values::parse_string_list;

    #[test]
    fn test_small_molecule_row() {
        let mut factory = ColumnFactory::for_section(Section::SmallMolecule).unwrap();
        let assay = Assay::new(1);
        factory.add_abundance_column(&assay).unwrap();

        let mut small_molecule = SmallMolecule::new(&factory).unwrap();
        small_molecule.set_identifier(parse_string_list("CID:180588|HMDB:HMDB00902", '|'));
        small_molecule.set_chemical_formula("C7H6O2");
        small_molecule.set_charge(1);
        small_molecule.set_abundance_assay(&factory, &assay, 0.003);

        assert_eq!(small_molecule.identifier().unwrap().len(), 2);
        assert_eq!(
            small_molecule.abundance_assay(&factory, &assay),
            Some(0.003)
        );

        let line = small_molecule.to_string();
        assert!(line.starts_with("SML\tCID:180588|HMDB:HMDB00902\tC7H6O2\t"));
        // the abundance cell is the rightmost field
        assert!(line.ends_with("\t0.003"));
    }
}
