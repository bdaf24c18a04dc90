/// Listingpress - Real-Estate Listing Marketing Campaign Builder
///
/// Core library providing the campaign wizard engine: step/phase sequencing,
/// draft accumulation, per-step validation, preference persistence, and the
/// sequential content-generation pipeline.

pub mod config;
pub mod core;

pub const VERSION: &str = env!("CARGO_PKG_VERSION");
pub const NAME: &str = env!("CARGO_PKG_NAME");
