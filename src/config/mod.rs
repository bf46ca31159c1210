//! Configuration types for the instrumentation layer.
//!
//! - [`InstrumentationConfig`]: instrument naming and recording switches

mod instrumentation;

pub use instrumentation::InstrumentationConfig;
