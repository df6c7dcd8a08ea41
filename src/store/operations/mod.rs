//! SQL operations behind `PgStore`
//!
//! Each function checks a connection out of the pool, runs one statement and
//! returns it. There is no transaction spanning several calls.

pub mod read;
pub mod write;

pub use read::*;
pub use write::*;
