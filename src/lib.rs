//! `mztab` is a data model and codec for [mzTab](https://github.com/HUPO-PSI/mztab),
//! the tab-delimited report format for mass spectrometry proteomics and
//! metabolomics results.
//!
//! The model is built around a dynamic column schema: each of the four data
//! tables (proteins, peptides, PSMs, small molecules) starts from a fixed
//! mandatory column set and can be extended at runtime with abundance
//! columns scoped to assays or study variables, user-defined `opt_` columns,
//! and per-score or per-run variants of the stable columns. Every column
//! carries a sortable logical position, so serialization order is
//! deterministic no matter how the schema was assembled.
//!
//! ```rust
//! use mztab::record::Peptide;
//! use mztab::values::parse_uri;
//! use mztab::{ColumnFactory, MZTabFile, MZTabMode, MZTabType, Metadata, Section};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let mut metadata = Metadata::new(MZTabMode::Summary, MZTabType::Identification);
//! metadata.add_ms_run_location(1, parse_uri("file:/data/run1.mzML").unwrap())?;
//!
//! let factory = ColumnFactory::for_section(Section::Peptide)?;
//! let mut peptide = Peptide::new(&factory)?;
//! peptide.set_sequence("PEPTIDE");
//! peptide.set_charge(2);
//!
//! let mut file = MZTabFile::new(metadata);
//! file.set_peptide_factory(factory)?;
//! file.add_peptide(peptide)?;
//!
//! let text = file.to_string();
//! assert!(text.contains("PEP\tPEPTIDE"));
//!
//! let parsed = mztab::io::parse_str(&text)?;
//! assert_eq!(parsed.peptides().len(), 1);
//! # Ok(())
//! # }
//! ```

pub mod columns;
pub mod file;
pub mod io;
pub mod metadata;
pub mod modification;
pub mod params;
pub mod prelude;
pub mod record;
pub mod section;
pub mod spectra_ref;
pub mod values;

pub use crate::columns::{ColumnFactory, DataType, MZTabColumn};
pub use crate::file::{Comment, MZTabFile};
pub use crate::io::{MzTabReader, MZTabError};
pub use crate::metadata::{MZTabDescription, MZTabMode, MZTabType, Metadata};
pub use crate::modification::{Modification, ModificationType};
pub use crate::params::{Param, ParamList};
pub use crate::record::{Peptide, Protein, Psm, Record, SmallMolecule, Value};
pub use crate::section::Section;
pub use crate::spectra_ref::SpectraRef;
pub use crate::values::{MZBoolean, Reliability, SplitList, Uri};
