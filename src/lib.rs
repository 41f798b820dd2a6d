//! Brain Connectivity Toolbox analyses run through an external MATLAB/Octave engine.

pub mod bct;
pub mod config;
pub mod error;
pub mod execution;
pub mod logging;
pub mod process;

pub use error::{BctError, Result};
