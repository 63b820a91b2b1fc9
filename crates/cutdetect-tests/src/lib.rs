//! Integration test crate for Cut Detective.
//!
//! This crate exists solely to hold cross-crate integration tests.
//! It drives the analysis pass, the curve store and EDL synthesis together
//! through the host entry points.

#[cfg(test)]
mod support;


#[cfg(test)]
mod edl;
