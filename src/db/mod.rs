// ORM Schema
pub mod schema;

// ORM Models
pub mod note;
pub mod tag;

// Driver
pub mod connection;

pub use connection::Connection;

/// Current UTC wall time, as stored in `TIMESTAMP` columns.
pub fn utc_now() -> time::PrimitiveDateTime {
    let now = time::OffsetDateTime::now_utc();
    time::PrimitiveDateTime::new(now.date(), now.time())
}
