//! `agrid` library half: exit codes and resolution plans, shared by the
//! binary and its tests.

pub mod exit_codes;
pub mod plan;
