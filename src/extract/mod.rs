//! Per-city extraction: location resolution, the two fetches, and the incremental
//! admission of forecasts.

pub mod extractor;
pub mod incremental;
