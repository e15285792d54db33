use diesel_async::scoped_futures::ScopedFutureExt;
use tracing::{debug, info};

use crate::db::note::{self, ModifyNote, NewNote, Note, NoteFilter};
use crate::db::tag::{self, Tag};
use crate::db::{self, Connection};
use crate::utils::{DatabaseError, ServiceError};

pub type NoteDetails = (Note, Vec<Tag>);

pub async fn create_note(
    conn: &mut Connection,
    title: &str,
    body: Option<&str>,
) -> Result<NoteDetails, ServiceError> {
    let m = note::create_note(conn, &NewNote::new(title, body)).await?;
    info!(id = m.id, "note created");
    Ok((m, vec![]))
}

pub async fn get_note(conn: &mut Connection, id: i32) -> Result<NoteDetails, ServiceError> {
    let m = Note::get(conn, id)
        .await?
        .ok_or_else(|| ServiceError::note_not_found(id))?;
    let tags = tag::tags_of_note(conn, m.id).await?;
    Ok((m, tags))
}

pub async fn list_notes(
    conn: &mut Connection,
    filter: &NoteFilter<'_>,
) -> Result<Vec<NoteDetails>, ServiceError> {
    let notes = note::list_notes(conn, filter).await?;
    debug!(count = notes.len(), ?filter, "notes listed");
    Ok(tag::get_tags_per_note(conn, notes).await?)
}

pub async fn update_note(
    conn: &mut Connection,
    id: i32,
    modified: ModifyNote,
) -> Result<NoteDetails, ServiceError> {
    conn.immediate_transaction::<_, ServiceError, _>(|conn| {
        async move {
            let current = Note::get(conn, id)
                .await?
                .ok_or_else(|| ServiceError::note_not_found(id))?;
            // never move updated_at backwards, even if the clock does
            let updated_at = db::utc_now().max(current.updated_at);

            let m = note::update_note(conn, id, &modified, updated_at)
                .await?
                .ok_or_else(|| ServiceError::note_not_found(id))?;
            info!(id, "note updated");

            let tags = tag::tags_of_note(conn, m.id).await?;
            Ok((m, tags))
        }
        .scope_boxed()
    })
    .await
}

pub async fn delete_note(conn: &mut Connection, id: i32) -> Result<(), ServiceError> {
    conn.immediate_transaction::<_, ServiceError, _>(|conn| {
        async move {
            let unlinked = tag::unlink_note(conn, id).await?;
            if note::delete_note(conn, id).await? == 0 {
                return Err(ServiceError::note_not_found(id));
            }
            info!(id, unlinked, "note deleted");
            Ok(())
        }
        .scope_boxed()
    })
    .await
}

fn already_attached(note_id: i32, tag_id: i32) -> ServiceError {
    ServiceError::Conflict(format!(
        "Tag {} is already attached to note {}.",
        tag_id, note_id
    ))
}

pub async fn attach_tag(
    conn: &mut Connection,
    note_id: i32,
    tag_id: i32,
) -> Result<NoteDetails, ServiceError> {
    conn.immediate_transaction::<_, ServiceError, _>(|conn| {
        async move {
            let m = Note::get(conn, note_id)
                .await?
                .ok_or_else(|| ServiceError::note_not_found(note_id))?;
            Tag::get(conn, tag_id)
                .await?
                .ok_or_else(|| ServiceError::tag_not_found(tag_id))?;

            if tag::link_exists(conn, note_id, tag_id).await? {
                return Err(already_attached(note_id, tag_id));
            }
            // a concurrent attach can still win the race, the key decides
            tag::attach_tag(conn, note_id, tag_id)
                .await
                .map_err(|e| match e {
                    DatabaseError::DuplicationError { .. } => already_attached(note_id, tag_id),
                    e => e.into(),
                })?;
            info!(note_id, tag_id, "tag attached");

            let tags = tag::tags_of_note(conn, note_id).await?;
            Ok((m, tags))
        }
        .scope_boxed()
    })
    .await
}

pub async fn detach_tag(
    conn: &mut Connection,
    note_id: i32,
    tag_id: i32,
) -> Result<NoteDetails, ServiceError> {
    conn.immediate_transaction::<_, ServiceError, _>(|conn| {
        async move {
            let m = Note::get(conn, note_id)
                .await?
                .ok_or_else(|| ServiceError::note_not_found(note_id))?;

            if tag::detach_tag(conn, note_id, tag_id).await? == 0 {
                return Err(ServiceError::NotFound(format!(
                    "Tag {} is not attached to note {}.",
                    tag_id, note_id
                )));
            }
            info!(note_id, tag_id, "tag detached");

            let tags = tag::tags_of_note(conn, note_id).await?;
            Ok((m, tags))
        }
        .scope_boxed()
    })
    .await
}
