//! CLI exit codes.
//!
//! | Code | Meaning                                   |
//! |------|-------------------------------------------|
//! | 0    | Success                                   |
//! | 1    | General error                             |
//! | 2    | Usage error (bad args, unreadable input)  |
//! | 3    | Resolution plan failed to parse/validate  |
//! | 4    | Resolution plan could not be applied      |
//! | 5    | Store read/write failure                  |
//! | 6    | Requested audit/registry entry not found  |

pub const EXIT_SUCCESS: u8 = 0;

pub const EXIT_ERROR: u8 = 1;

pub const EXIT_USAGE: u8 = 2;

pub const EXIT_PLAN_INVALID: u8 = 3;

/// Plan parsed but referenced a missing group or row.
pub const EXIT_PLAN_APPLY: u8 = 4;

pub const EXIT_STORE: u8 = 5;

pub const EXIT_NOT_FOUND: u8 = 6;
