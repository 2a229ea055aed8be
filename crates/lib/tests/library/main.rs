//! Library-level tests across resolution, flag compilation and orchestration.

mod pipeline_tests;
mod properties_tests;
