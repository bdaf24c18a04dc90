//! Wizard State Machine for Campaign Creation
//!
//! Guides users through campaign creation in discrete steps grouped into
//! display phases:
//!
//! 1. Property — Basics, PropertyInfo, Features
//! 2. Presentation — Media, Style, Materials
//! 3. Campaign — Generate, Review, Launch
//!
//! # Design Principles
//!
//! - **Gated**: every forward move consults the validation gate; a refused
//!   advance is a no-op, never an error
//! - **Accumulating**: step input merges into one shared draft; going back
//!   preserves everything entered so far
//! - **Locked during generation**: navigation is disabled while the pipeline
//!   runs
//! - **Recoverable at the boundary**: a failed submission returns control to
//!   review with the draft intact

mod controller;
mod types;

pub use controller::*;
pub use types::*;
