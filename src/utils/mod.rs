pub mod logging;
#[cfg(test)]
pub mod rand;
pub mod patch;

mod errors;
pub use errors::{DatabaseError, ServiceError};
