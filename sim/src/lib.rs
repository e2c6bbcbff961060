//! Cycle-accurate simulation of three-PE systolic arrays.
//!
//! [`framework`] holds the clocked engine, [`architectures`] the concrete
//! arrays built from it. [`stimulus`] and [`trace`] drive and observe an
//! array from the outside.

pub mod architectures;
pub mod framework;
pub mod stimulus;
pub mod trace;
mod utils;

#[cfg(test)]
mod test;

pub use architectures::{arch_names, create_sim, find_arch};
pub use stimulus::{run, Stimulus};
pub use utils::{parse_list, parse_literal};
