//! Custom Resource Definitions (CRDs) validated by this webhook.
//!
//! - `MachineSet`: a scalable group of homogeneous machines

mod machine_set;

pub use machine_set::*;
