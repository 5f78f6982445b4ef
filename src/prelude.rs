//! A prelude for the working set: the traits and types almost every use of
//! the crate touches.

pub use crate::columns::{ColumnFactory, DataType};
pub use crate::file::MZTabFile;
pub use crate::metadata::{IndexedElement, MZTabMode, MZTabType, Metadata};
pub use crate::record::{Peptide, Protein, Psm, SmallMolecule, Value};
pub use crate::section::Section;
pub use crate::values::{MZBoolean, Reliability, SplitList};
