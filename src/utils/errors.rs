use diesel::result::{DatabaseErrorKind, Error as DieselError};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum DatabaseError {
    #[error("duplicate key value violates unique constraint of {table:?}")]
    DuplicationError { table: String },
    #[error("foreign key constraint violation")]
    ViolationError(),
    #[error(transparent)]
    Query(#[from] DieselError),
}

impl DatabaseError {
    /// Classifies constraint violations raised while writing into `table`.
    pub fn on_table(table: &str) -> impl Fn(DieselError) -> Self + '_ {
        move |e| match e {
            DieselError::DatabaseError(DatabaseErrorKind::UniqueViolation, _) => {
                DatabaseError::DuplicationError {
                    table: table.to_string(),
                }
            }
            DieselError::DatabaseError(DatabaseErrorKind::ForeignKeyViolation, _) => {
                DatabaseError::ViolationError()
            }
            e => DatabaseError::Query(e),
        }
    }
}

#[derive(Error, Debug)]
pub enum ServiceError {
    #[error("{0}")]
    NotFound(String),
    #[error("{0}")]
    Conflict(String),
    #[error(transparent)]
    Database(#[from] DatabaseError),
}

impl From<DieselError> for ServiceError {
    fn from(e: DieselError) -> Self {
        ServiceError::Database(DatabaseError::Query(e))
    }
}

impl ServiceError {
    pub fn note_not_found(id: i32) -> Self {
        ServiceError::NotFound(format!("Note {} not found.", id))
    }

    pub fn tag_not_found(id: i32) -> Self {
        ServiceError::NotFound(format!("Tag {} not found.", id))
    }

    pub fn tag_name_taken(name: &str) -> Self {
        ServiceError::Conflict(format!("Tag with name '{}' already exists.", name))
    }
}
