//! # bhloop IO
//!
//! Consumers of [`ModelResult`](bhloop_core::ModelResult): nothing in this
//! crate feeds back into the numeric pipeline.
//!
//! ## Modules
//!
//! | Concern | Module |
//! |---------|--------|
//! | Parameter line record and reload | [`param_log`] |
//! | CSV tables and JSON dumps | [`export`] |
//! | SVG loop plots | [`plot`] |

pub mod export;
pub mod param_log;
pub mod plot;

pub use export::ExportError;
pub use param_log::{ConfigParseError, ParameterLog, RunParameters};
