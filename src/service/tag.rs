use diesel_async::scoped_futures::ScopedFutureExt;
use tracing::info;

use crate::db::note::Note;
use crate::db::tag::{self, ModifyTag, NewTag, Tag};
use crate::db::Connection;
use crate::utils::{DatabaseError, ServiceError};

pub type TagDetails = (Tag, Vec<Note>);

pub async fn create_tag(
    conn: &mut Connection,
    name: &str,
    color: Option<&str>,
) -> Result<Tag, ServiceError> {
    if Tag::get_by_name(conn, name).await?.is_some() {
        return Err(ServiceError::tag_name_taken(name));
    }
    let t = tag::create_tag(conn, &NewTag { name, color })
        .await
        .map_err(|e| match e {
            DatabaseError::DuplicationError { .. } => ServiceError::tag_name_taken(name),
            e => e.into(),
        })?;
    info!(id = t.id, name = %t.name, "tag created");
    Ok(t)
}

pub async fn get_tag(conn: &mut Connection, id: i32) -> Result<TagDetails, ServiceError> {
    let t = Tag::get(conn, id)
        .await?
        .ok_or_else(|| ServiceError::tag_not_found(id))?;
    let notes = tag::notes_of_tag(conn, t.id).await?;
    Ok((t, notes))
}

pub async fn list_tags(conn: &mut Connection) -> Result<Vec<Tag>, ServiceError> {
    Ok(tag::list_tags(conn).await?)
}

pub async fn update_tag(
    conn: &mut Connection,
    id: i32,
    modified: ModifyTag,
) -> Result<Tag, ServiceError> {
    conn.immediate_transaction::<_, ServiceError, _>(|conn| {
        async move {
            let current = Tag::get(conn, id)
                .await?
                .ok_or_else(|| ServiceError::tag_not_found(id))?;

            if let Some(name) = modified.name.as_deref() {
                if name != current.name && Tag::get_by_name(conn, name).await?.is_some() {
                    return Err(ServiceError::tag_name_taken(name));
                }
            }
            if modified.is_empty() {
                return Ok(current);
            }

            let t = tag::update_tag(conn, id, &modified)
                .await
                .map_err(|e| match e {
                    DatabaseError::DuplicationError { .. } => {
                        ServiceError::tag_name_taken(modified.name.as_deref().unwrap_or_default())
                    }
                    e => e.into(),
                })?
                .ok_or_else(|| ServiceError::tag_not_found(id))?;
            info!(id, name = %t.name, "tag updated");
            Ok(t)
        }
        .scope_boxed()
    })
    .await
}

pub async fn delete_tag(conn: &mut Connection, id: i32) -> Result<(), ServiceError> {
    conn.immediate_transaction::<_, ServiceError, _>(|conn| {
        async move {
            let unlinked = tag::unlink_tag(conn, id).await?;
            if tag::delete_tag(conn, id).await? == 0 {
                return Err(ServiceError::tag_not_found(id));
            }
            info!(id, unlinked, "tag deleted");
            Ok(())
        }
        .scope_boxed()
    })
    .await
}
