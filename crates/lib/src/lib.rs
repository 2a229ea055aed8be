//! fembuild-lib: resolution and build orchestration for the Elmer FEM solver
//!
//! Inputs flow one way:
//! - `options` and `platform` describe what was asked for and where we run
//! - `deps` resolves them into the set of dependency packages
//! - `flags` compiles the CMake flag sequence and any toolchain override
//! - `orchestrate` runs Configure, Compile, Install and Verify
//! - `smoke` exercises an installed tree with a fixture-driven test

pub mod config;
pub mod consts;
pub mod deps;
pub mod execute;
pub mod flags;
pub mod options;
pub mod orchestrate;
pub mod plan;
pub mod platform;
pub mod smoke;
pub mod util;
