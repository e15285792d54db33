//! Note and tag operations with their existence and uniqueness rules.
//!
//! Every function takes the request's connection. Mutations spanning more
//! than one statement run inside a single `BEGIN IMMEDIATE` transaction,
//! which takes the write lock before the first read. Concurrent writers wait
//! on the connection's busy timeout.

pub mod note;
pub mod tag;
