use diesel::prelude::*;
use diesel_async::RunQueryDsl;

use super::note::Note;
use super::schema::{note_tags, notes, tags};
use super::Connection;
use crate::utils::DatabaseError;

#[derive(Queryable, Selectable, Identifiable, Debug, Clone, PartialEq, Eq)]
#[diesel(table_name = tags)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct Tag {
    pub id: i32,
    pub name: String,
    pub color: Option<String>,
}

#[derive(Insertable, Identifiable, Selectable, Queryable, Associations, Debug)]
#[diesel(belongs_to(Note))]
#[diesel(belongs_to(Tag))]
#[diesel(table_name = note_tags)]
#[diesel(primary_key(note_id, tag_id))]
pub struct NoteTag {
    pub note_id: i32,
    pub tag_id: i32,
}

#[derive(Insertable, Debug, Clone)]
#[diesel(table_name = tags)]
pub struct NewTag<'a> {
    pub name: &'a str,
    pub color: Option<&'a str>,
}

/// Partial update. `color: Some(None)` clears the color.
#[derive(AsChangeset, Debug, Clone, Default)]
#[diesel(table_name = tags)]
pub struct ModifyTag {
    pub name: Option<String>,
    pub color: Option<Option<String>>,
}

impl ModifyTag {
    pub fn is_empty(&self) -> bool {
        self.name.is_none() && self.color.is_none()
    }
}

impl Tag {
    pub async fn get(conn: &mut Connection, id: i32) -> Result<Option<Self>, DatabaseError> {
        Ok(tags::table
            .find(id)
            .select(Tag::as_select())
            .first(conn)
            .await
            .optional()?)
    }

    pub async fn get_by_name(
        conn: &mut Connection,
        name: &str,
    ) -> Result<Option<Self>, DatabaseError> {
        Ok(tags::table
            .filter(tags::name.eq(name))
            .select(Tag::as_select())
            .first(conn)
            .await
            .optional()?)
    }
}

pub async fn create_tag(conn: &mut Connection, new: &NewTag<'_>) -> Result<Tag, DatabaseError> {
    diesel::insert_into(tags::table)
        .values(new)
        .returning(Tag::as_returning())
        .get_result(conn)
        .await
        .map_err(DatabaseError::on_table("tags"))
}

pub async fn update_tag(
    conn: &mut Connection,
    id: i32,
    modified: &ModifyTag,
) -> Result<Option<Tag>, DatabaseError> {
    diesel::update(tags::table.find(id))
        .set(modified)
        .returning(Tag::as_returning())
        .get_result(conn)
        .await
        .optional()
        .map_err(DatabaseError::on_table("tags"))
}

pub async fn delete_tag(conn: &mut Connection, id: i32) -> Result<usize, DatabaseError> {
    Ok(diesel::delete(tags::table.find(id)).execute(conn).await?)
}

pub async fn list_tags(conn: &mut Connection) -> Result<Vec<Tag>, DatabaseError> {
    Ok(tags::table
        .select(Tag::as_select())
        .order_by(tags::name.asc())
        .load(conn)
        .await?)
}

pub async fn link_exists(
    conn: &mut Connection,
    note_id: i32,
    tag_id: i32,
) -> Result<bool, DatabaseError> {
    use diesel::dsl::exists;

    Ok(diesel::select(exists(note_tags::table.find((note_id, tag_id))))
        .get_result(conn)
        .await?)
}

pub async fn attach_tag(
    conn: &mut Connection,
    note_id: i32,
    tag_id: i32,
) -> Result<(), DatabaseError> {
    diesel::insert_into(note_tags::table)
        .values(&NoteTag { note_id, tag_id })
        .execute(conn)
        .await
        .map_err(DatabaseError::on_table("note_tags"))?;
    Ok(())
}

/// Returns the number of removed links, 0 or 1.
pub async fn detach_tag(
    conn: &mut Connection,
    note_id: i32,
    tag_id: i32,
) -> Result<usize, DatabaseError> {
    Ok(diesel::delete(note_tags::table.find((note_id, tag_id)))
        .execute(conn)
        .await?)
}

pub async fn unlink_note(conn: &mut Connection, note_id: i32) -> Result<usize, DatabaseError> {
    Ok(
        diesel::delete(note_tags::table.filter(note_tags::note_id.eq(note_id)))
            .execute(conn)
            .await?,
    )
}

pub async fn unlink_tag(conn: &mut Connection, tag_id: i32) -> Result<usize, DatabaseError> {
    Ok(
        diesel::delete(note_tags::table.filter(note_tags::tag_id.eq(tag_id)))
            .execute(conn)
            .await?,
    )
}

pub async fn tags_of_note(conn: &mut Connection, note_id: i32) -> Result<Vec<Tag>, DatabaseError> {
    Ok(note_tags::table
        .inner_join(tags::table)
        .filter(note_tags::note_id.eq(note_id))
        .select(Tag::as_select())
        .order_by(tags::name.asc())
        .load(conn)
        .await?)
}

pub async fn notes_of_tag(conn: &mut Connection, tag_id: i32) -> Result<Vec<Note>, DatabaseError> {
    Ok(note_tags::table
        .inner_join(notes::table)
        .filter(note_tags::tag_id.eq(tag_id))
        .select(Note::as_select())
        .order_by((notes::updated_at.desc(), notes::id.desc()))
        .load(conn)
        .await?)
}

/// Pairs every note with its tags in two queries, keeping the notes' order.
pub async fn get_tags_per_note(
    conn: &mut Connection,
    notes: Vec<Note>,
) -> Result<Vec<(Note, Vec<Tag>)>, DatabaseError> {
    if notes.is_empty() {
        return Ok(vec![]);
    }

    let tags = NoteTag::belonging_to(&notes)
        .inner_join(tags::table)
        .select((NoteTag::as_select(), Tag::as_select()))
        .order_by(tags::name.asc())
        .load(conn)
        .await?;

    Ok(tags
        .grouped_by(&notes)
        .into_iter()
        .zip(notes)
        .map(|(tags, note)| (note, tags.into_iter().map(|(_, tag)| tag).collect()))
        .collect())
}
