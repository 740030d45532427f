// SPDX-License-Identifier: PMPL-1.0-or-later

//! Booby-Trap — Deterministic Memory-Defect Corpus.
//!
//! This crate is a box of ground truth for defect-detection engines:
//! minimal synthetic scenarios, each engineered to perform exactly
//! one named erroneous memory operation. It detects nothing and
//! scores nothing; it only guarantees that when a scenario runs, the
//! underlying fault occurs. Whether that shows up as a crash or as
//! silent corruption is up to the run and the environment, and that
//! asymmetry is deliberate.
//!
//! CORPUS PILLARS:
//! 1. **Kernels**: the minimal faulty operations (stack overrun via
//!    an aliased struct, double free via flawed copy/assignment,
//!    release of an advanced cursor).
//! 2. **Flow variants**: control/data-flow disguises wrapped around
//!    each kernel, so a detector has to track the same ownership or
//!    taint fact through syntactically different paths.
//! 3. **Registry**: stable enumeration of every (kernel, variant)
//!    pairing for an external harness to iterate.

pub mod flow;
pub mod kernels;
pub mod registry;
pub mod trace;
pub mod types;
