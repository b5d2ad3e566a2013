//! `auditgrid-core`: value and coordinate types shared by every crate.

pub mod selection;
pub mod value;

pub use selection::{CellPos, CellRect, FillMode};
pub use value::CellValue;
