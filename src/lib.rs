#![doc = "Sheet-index reconciliation for Survey of India topographic map grids"]
pub mod annotate;
pub mod cli;
pub mod commands;
mod common;
pub mod geojson;
pub mod geom;
pub mod index;
pub mod overlap;
pub mod sheet_id;
pub mod sheetmap;
pub mod states;

#[doc(inline)]
pub use geojson::{Feature, FeatureCollection};

#[doc(inline)]
pub use sheetmap::{SheetMap, SheetMapEntry};

#[doc(inline)]
pub use states::StateCode;

#[doc(inline)]
pub use annotate::{SheetSize, StatusSets};
