use super::errors::Error;
use super::fairings::db::Db;
use super::tag::TagRead;
use crate::db::note::{self as db_note, NoteFilter};
use crate::service::note as service;

use itertools::Itertools;
use rocket::response::status;
use rocket::serde::json::Json;
use rocket::serde::{Deserialize, Serialize};
use rocket_db_pools::Connection;
use utoipa::{IntoParams, ToSchema};
use validator::Validate;

#[derive(Serialize, Deserialize, ToSchema, Validate, Debug)]
#[serde(crate = "rocket::serde")]
pub struct CreateNote {
    #[validate(length(min = 1, max = 255))]
    pub title: String,
    /// Markdown text
    pub body: Option<String>,
}

/// Partial update. Absent fields are left untouched, an explicit
/// `"body": null` clears the body.
#[derive(Serialize, Deserialize, ToSchema, Validate, Debug, Default)]
#[serde(crate = "rocket::serde")]
pub struct ModifyNote {
    #[validate(length(min = 1, max = 255))]
    pub title: Option<String>,
    #[serde(
        default,
        deserialize_with = "crate::utils::patch::double_option",
        skip_serializing_if = "Option::is_none"
    )]
    #[schema(value_type = Option<String>)]
    pub body: Option<Option<String>>,
}

#[derive(Serialize, Deserialize, ToSchema, Debug, Clone)]
#[serde(crate = "rocket::serde")]
pub struct NoteRead {
    pub id: i32,
    pub title: String,
    pub body: Option<String>,
    #[schema(format = DateTime, value_type=String)]
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: time::OffsetDateTime,
    #[schema(format = DateTime, value_type=String)]
    #[serde(with = "time::serde::rfc3339")]
    pub updated_at: time::OffsetDateTime,
}

impl From<db_note::Note> for NoteRead {
    fn from(m: db_note::Note) -> Self {
        Self {
            id: m.id,
            title: m.title,
            body: m.body,
            created_at: m.created_at.assume_utc(),
            updated_at: m.updated_at.assume_utc(),
        }
    }
}

#[derive(Serialize, Deserialize, ToSchema, Debug, Clone)]
#[serde(crate = "rocket::serde")]
pub struct NoteWithTags {
    pub id: i32,
    pub title: String,
    pub body: Option<String>,
    #[schema(format = DateTime, value_type=String)]
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: time::OffsetDateTime,
    #[schema(format = DateTime, value_type=String)]
    #[serde(with = "time::serde::rfc3339")]
    pub updated_at: time::OffsetDateTime,
    pub tags: Vec<TagRead>,
}

impl From<service::NoteDetails> for NoteWithTags {
    fn from((m, tags): service::NoteDetails) -> Self {
        Self {
            id: m.id,
            title: m.title,
            body: m.body,
            created_at: m.created_at.assume_utc(),
            updated_at: m.updated_at.assume_utc(),
            tags: tags.into_iter().map(TagRead::from).collect_vec(),
        }
    }
}

#[derive(FromForm, Validate, IntoParams, Debug)]
#[into_params(parameter_in = Query)]
pub struct ListNotesParams {
    /// Case-insensitive substring of the title or body
    pub q: Option<String>,
    /// Only notes attached to this tag
    pub tag_id: Option<i32>,
    #[field(default = 0)]
    #[validate(range(min = 0))]
    #[param(default = 0, minimum = 0)]
    pub offset: i64,
    #[field(default = 50)]
    #[validate(range(min = 1, max = 200))]
    #[param(default = 50, minimum = 1, maximum = 200)]
    pub limit: i64,
}

/// List notes, most recently updated first
#[utoipa::path(
    get,
    path = "/",
    params(ListNotesParams),
    responses(
        (status = 200, description = "Notes listed", body = Vec<NoteWithTags>),
        (status = 422, description = "Invalid query", body = super::errors::ValidationDetail)
    )
)]
#[get("/?<params..>")]
pub async fn list_notes(
    mut db: Connection<Db>,
    params: ListNotesParams,
) -> Result<Json<Vec<NoteWithTags>>, Error> {
    params.validate()?;

    let filter = NoteFilter {
        keyword: params.q.as_deref(),
        tag_id: params.tag_id,
        offset: params.offset,
        limit: params.limit,
    };
    let rv = service::list_notes(&mut db, &filter).await?;
    Ok(Json(rv.into_iter().map(NoteWithTags::from).collect_vec()))
}

/// Create a new note
#[utoipa::path(
    post,
    path = "/",
    request_body = CreateNote,
    responses(
        (status = 201, description = "Note created", body = NoteWithTags),
        (status = 422, description = "Invalid payload", body = super::errors::ValidationDetail)
    )
)]
#[post("/", data = "<payload>")]
pub async fn create_note(
    mut db: Connection<Db>,
    payload: Json<CreateNote>,
) -> Result<status::Created<Json<NoteWithTags>>, Error> {
    payload.validate()?;
    let rv = service::create_note(&mut db, &payload.title, payload.body.as_deref()).await?;
    Ok(status::Created::new(format!("/api/notes/{}", rv.0.id)).body(Json(rv.into())))
}

/// Get a note with its tags
#[utoipa::path(
    get,
    path = "/{id}",
    params(
        ("id" = i32, Path, description = "The note id")
    ),
    responses(
        (status = 200, description = "Note found", body = NoteWithTags),
        (status = 404, description = "Note not found", body = super::errors::ErrorDetail)
    )
)]
#[get("/<id>")]
pub async fn get_note(mut db: Connection<Db>, id: i32) -> Result<Json<NoteWithTags>, Error> {
    let rv = service::get_note(&mut db, id).await?;
    Ok(Json(rv.into()))
}

/// Update a note
#[utoipa::path(
    patch,
    path = "/{id}",
    params(
        ("id" = i32, Path, description = "The note id to be updated")
    ),
    request_body = ModifyNote,
    responses(
        (status = 200, description = "Note updated", body = NoteWithTags),
        (status = 404, description = "Note not found", body = super::errors::ErrorDetail),
        (status = 422, description = "Invalid payload", body = super::errors::ValidationDetail)
    )
)]
#[patch("/<id>", data = "<payload>")]
pub async fn update_note(
    mut db: Connection<Db>,
    id: i32,
    payload: Json<ModifyNote>,
) -> Result<Json<NoteWithTags>, Error> {
    payload.validate()?;

    let payload = payload.into_inner();
    let rv = service::update_note(
        &mut db,
        id,
        db_note::ModifyNote {
            title: payload.title,
            body: payload.body,
        },
    )
    .await?;
    Ok(Json(rv.into()))
}

/// Delete a note and its tag links
#[utoipa::path(
    delete,
    path = "/{id}",
    params(
        ("id" = i32, Path, description = "The note id to be deleted")
    ),
    responses(
        (status = 204, description = "Note deleted"),
        (status = 404, description = "Note not found", body = super::errors::ErrorDetail)
    )
)]
#[delete("/<id>")]
pub async fn delete_note(mut db: Connection<Db>, id: i32) -> Result<status::NoContent, Error> {
    service::delete_note(&mut db, id).await?;
    Ok(status::NoContent)
}

/// Attach a tag to a note
#[utoipa::path(
    post,
    path = "/{id}/tags/{tag_id}",
    params(
        ("id" = i32, Path, description = "The note id"),
        ("tag_id" = i32, Path, description = "The tag id to attach")
    ),
    responses(
        (status = 200, description = "Tag attached", body = NoteWithTags),
        (status = 404, description = "Note or tag not found", body = super::errors::ErrorDetail),
        (status = 409, description = "Tag already attached", body = super::errors::ErrorDetail)
    )
)]
#[post("/<id>/tags/<tag_id>")]
pub async fn attach_tag(
    mut db: Connection<Db>,
    id: i32,
    tag_id: i32,
) -> Result<Json<NoteWithTags>, Error> {
    let rv = service::attach_tag(&mut db, id, tag_id).await?;
    Ok(Json(rv.into()))
}

/// Detach a tag from a note
#[utoipa::path(
    delete,
    path = "/{id}/tags/{tag_id}",
    params(
        ("id" = i32, Path, description = "The note id"),
        ("tag_id" = i32, Path, description = "The tag id to detach")
    ),
    responses(
        (status = 200, description = "Tag detached", body = NoteWithTags),
        (status = 404, description = "Note not found or tag not attached", body = super::errors::ErrorDetail)
    )
)]
#[delete("/<id>/tags/<tag_id>")]
pub async fn detach_tag(
    mut db: Connection<Db>,
    id: i32,
    tag_id: i32,
) -> Result<Json<NoteWithTags>, Error> {
    let rv = service::detach_tag(&mut db, id, tag_id).await?;
    Ok(Json(rv.into()))
}

pub fn routes() -> Vec<rocket::Route> {
    routes![
        list_notes,
        create_note,
        get_note,
        update_note,
        delete_note,
        attach_tag,
        detach_tag
    ]
}

pub(crate) mod misc {
    use super::*;
    use crate::api::errors::{ErrorDetail, ValidationDetail};

    use utoipa::OpenApi;

    #[derive(OpenApi)]
    #[openapi(
        paths(
            list_notes,
            create_note,
            get_note,
            update_note,
            delete_note,
            attach_tag,
            detach_tag
        ),
        components(schemas(
            CreateNote,
            ModifyNote,
            NoteRead,
            NoteWithTags,
            TagRead,
            ErrorDetail,
            ValidationDetail
        ))
    )]
    pub struct ApiDoc;
}
