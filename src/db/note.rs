use diesel::prelude::*;
use diesel_async::RunQueryDsl;
use time::PrimitiveDateTime;

use super::schema::{note_tags, notes};
use super::Connection;
use crate::utils::DatabaseError;

pub const DEFAULT_LIMIT: i64 = 50;
pub const MAX_LIMIT: i64 = 200;

#[derive(Queryable, Selectable, Identifiable, Debug, Clone, PartialEq, Eq)]
#[diesel(table_name = notes)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct Note {
    pub id: i32,
    pub title: String,
    pub body: Option<String>,
    pub created_at: PrimitiveDateTime,
    pub updated_at: PrimitiveDateTime,
}

#[derive(Insertable, Debug, Clone)]
#[diesel(table_name = notes)]
pub struct NewNote<'a> {
    pub title: &'a str,
    pub body: Option<&'a str>,
    pub created_at: PrimitiveDateTime,
    pub updated_at: PrimitiveDateTime,
}

impl<'a> NewNote<'a> {
    pub fn new(title: &'a str, body: Option<&'a str>) -> Self {
        let now = super::utc_now();
        Self {
            title,
            body,
            created_at: now,
            updated_at: now,
        }
    }
}

/// Partial update. `body: Some(None)` clears the body.
#[derive(AsChangeset, Debug, Clone, Default)]
#[diesel(table_name = notes)]
pub struct ModifyNote {
    pub title: Option<String>,
    pub body: Option<Option<String>>,
}

#[derive(Debug, Clone)]
pub struct NoteFilter<'a> {
    pub keyword: Option<&'a str>,
    pub tag_id: Option<i32>,
    pub offset: i64,
    pub limit: i64,
}

impl Default for NoteFilter<'_> {
    fn default() -> Self {
        Self {
            keyword: None,
            tag_id: None,
            offset: 0,
            limit: DEFAULT_LIMIT,
        }
    }
}

impl Note {
    pub async fn get(conn: &mut Connection, id: i32) -> Result<Option<Self>, DatabaseError> {
        Ok(notes::table
            .find(id)
            .select(Note::as_select())
            .first(conn)
            .await
            .optional()?)
    }
}

pub async fn create_note(conn: &mut Connection, new: &NewNote<'_>) -> Result<Note, DatabaseError> {
    diesel::insert_into(notes::table)
        .values(new)
        .returning(Note::as_returning())
        .get_result(conn)
        .await
        .map_err(DatabaseError::on_table("notes"))
}

pub async fn update_note(
    conn: &mut Connection,
    id: i32,
    modified: &ModifyNote,
    updated_at: PrimitiveDateTime,
) -> Result<Option<Note>, DatabaseError> {
    Ok(diesel::update(notes::table.find(id))
        .set((modified, notes::updated_at.eq(updated_at)))
        .returning(Note::as_returning())
        .get_result(conn)
        .await
        .optional()?)
}

pub async fn delete_note(conn: &mut Connection, id: i32) -> Result<usize, DatabaseError> {
    Ok(diesel::delete(notes::table.find(id)).execute(conn).await?)
}

/// `%keyword%` with LIKE wildcards in the keyword matched literally.
fn contains_pattern(keyword: &str) -> String {
    let mut pattern = String::with_capacity(keyword.len() + 2);
    pattern.push('%');
    for c in keyword.chars() {
        if matches!(c, '%' | '_' | '\\') {
            pattern.push('\\');
        }
        pattern.push(c);
    }
    pattern.push('%');
    pattern
}

/// Notes most recently updated first.
///
/// SQLite's LIKE folds ASCII case, so the keyword match is case-insensitive.
pub async fn list_notes(
    conn: &mut Connection,
    filter: &NoteFilter<'_>,
) -> Result<Vec<Note>, DatabaseError> {
    let mut query = notes::table.select(Note::as_select()).into_boxed();

    if let Some(tag_id) = filter.tag_id {
        query = query.filter(
            notes::id.eq_any(
                note_tags::table
                    .filter(note_tags::tag_id.eq(tag_id))
                    .select(note_tags::note_id),
            ),
        );
    }

    if let Some(keyword) = filter.keyword.filter(|k| !k.is_empty()) {
        let pattern = contains_pattern(keyword);
        query = query.filter(
            notes::title
                .like(pattern.clone())
                .escape('\\')
                .or(notes::body.like(pattern).escape('\\')),
        );
    }

    Ok(query
        .order_by((notes::updated_at.desc(), notes::id.desc()))
        .offset(filter.offset.max(0))
        .limit(filter.limit.clamp(1, MAX_LIMIT))
        .load::<Note>(conn)
        .await?)
}
