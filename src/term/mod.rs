//! [`HpoTermId`] and [`HpoGroup`], the identifiers the ontology graph and
//! the HPO-based classifiers and filters work with

mod group;
mod hpotermid;

pub use group::{HpoGroup, HpoTermIds};
pub use hpotermid::HpoTermId;
