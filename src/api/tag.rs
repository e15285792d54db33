use super::errors::Error;
use super::fairings::db::Db;
use super::note::NoteRead;
use crate::db::tag as db_tag;
use crate::service::tag as service;

use itertools::Itertools;
use rocket::response::status;
use rocket::serde::json::Json;
use rocket::serde::{Deserialize, Serialize};
use rocket_db_pools::Connection;
use utoipa::ToSchema;
use validator::Validate;

#[derive(Serialize, Deserialize, ToSchema, Validate, Debug)]
#[serde(crate = "rocket::serde")]
pub struct CreateTag {
    #[validate(length(min = 1, max = 50))]
    pub name: String,
    #[validate(length(max = 20))]
    pub color: Option<String>,
}

/// Partial update. An explicit `"color": null` clears the color.
#[derive(Serialize, Deserialize, ToSchema, Validate, Debug, Default)]
#[serde(crate = "rocket::serde")]
pub struct ModifyTag {
    #[validate(length(min = 1, max = 50))]
    pub name: Option<String>,
    #[serde(
        default,
        deserialize_with = "crate::utils::patch::double_option",
        skip_serializing_if = "Option::is_none"
    )]
    #[validate(length(max = 20))]
    #[schema(value_type = Option<String>)]
    pub color: Option<Option<String>>,
}

#[derive(Serialize, Deserialize, ToSchema, Debug, Clone, PartialEq, Eq)]
#[serde(crate = "rocket::serde")]
pub struct TagRead {
    pub id: i32,
    pub name: String,
    pub color: Option<String>,
}

impl From<db_tag::Tag> for TagRead {
    fn from(t: db_tag::Tag) -> Self {
        Self {
            id: t.id,
            name: t.name,
            color: t.color,
        }
    }
}

#[derive(Serialize, Deserialize, ToSchema, Debug)]
#[serde(crate = "rocket::serde")]
pub struct TagWithNotes {
    pub id: i32,
    pub name: String,
    pub color: Option<String>,
    pub notes: Vec<NoteRead>,
}

impl From<service::TagDetails> for TagWithNotes {
    fn from((t, notes): service::TagDetails) -> Self {
        Self {
            id: t.id,
            name: t.name,
            color: t.color,
            notes: notes.into_iter().map(NoteRead::from).collect_vec(),
        }
    }
}

/// List all tags by name
#[utoipa::path(
    get,
    path = "/",
    responses(
        (status = 200, description = "Tags listed", body = Vec<TagRead>)
    )
)]
#[get("/")]
pub async fn list_tags(mut db: Connection<Db>) -> Result<Json<Vec<TagRead>>, Error> {
    let rv = service::list_tags(&mut db).await?;
    Ok(Json(rv.into_iter().map(TagRead::from).collect_vec()))
}

/// Create a new tag
#[utoipa::path(
    post,
    path = "/",
    request_body = CreateTag,
    responses(
        (status = 201, description = "Tag created", body = TagRead),
        (status = 409, description = "Tag name already taken", body = super::errors::ErrorDetail),
        (status = 422, description = "Invalid payload", body = super::errors::ValidationDetail)
    )
)]
#[post("/", data = "<payload>")]
pub async fn create_tag(
    mut db: Connection<Db>,
    payload: Json<CreateTag>,
) -> Result<status::Created<Json<TagRead>>, Error> {
    payload.validate()?;
    let t = service::create_tag(&mut db, &payload.name, payload.color.as_deref()).await?;
    Ok(status::Created::new(format!("/api/tags/{}", t.id)).body(Json(t.into())))
}

/// Get a tag with its notes
#[utoipa::path(
    get,
    path = "/{id}",
    params(
        ("id" = i32, Path, description = "The tag id")
    ),
    responses(
        (status = 200, description = "Tag found", body = TagWithNotes),
        (status = 404, description = "Tag not found", body = super::errors::ErrorDetail)
    )
)]
#[get("/<id>")]
pub async fn get_tag(mut db: Connection<Db>, id: i32) -> Result<Json<TagWithNotes>, Error> {
    let rv = service::get_tag(&mut db, id).await?;
    Ok(Json(rv.into()))
}

/// Update a tag
#[utoipa::path(
    patch,
    path = "/{id}",
    params(
        ("id" = i32, Path, description = "The tag id to be updated")
    ),
    request_body = ModifyTag,
    responses(
        (status = 200, description = "Tag updated", body = TagRead),
        (status = 404, description = "Tag not found", body = super::errors::ErrorDetail),
        (status = 409, description = "Tag name already taken", body = super::errors::ErrorDetail),
        (status = 422, description = "Invalid payload", body = super::errors::ValidationDetail)
    )
)]
#[patch("/<id>", data = "<payload>")]
pub async fn update_tag(
    mut db: Connection<Db>,
    id: i32,
    payload: Json<ModifyTag>,
) -> Result<Json<TagRead>, Error> {
    payload.validate()?;

    let payload = payload.into_inner();
    let t = service::update_tag(
        &mut db,
        id,
        db_tag::ModifyTag {
            name: payload.name,
            color: payload.color,
        },
    )
    .await?;
    Ok(Json(t.into()))
}

/// Delete a tag and detach it from every note
#[utoipa::path(
    delete,
    path = "/{id}",
    params(
        ("id" = i32, Path, description = "The tag id to be deleted")
    ),
    responses(
        (status = 204, description = "Tag deleted"),
        (status = 404, description = "Tag not found", body = super::errors::ErrorDetail)
    )
)]
#[delete("/<id>")]
pub async fn delete_tag(mut db: Connection<Db>, id: i32) -> Result<status::NoContent, Error> {
    service::delete_tag(&mut db, id).await?;
    Ok(status::NoContent)
}

pub fn routes() -> Vec<rocket::Route> {
    routes![list_tags, create_tag, get_tag, update_tag, delete_tag]
}

pub(crate) mod misc {
    use super::*;
    use crate::api::errors::{ErrorDetail, ValidationDetail};

    use utoipa::OpenApi;

    #[derive(OpenApi)]
    #[openapi(
        paths(list_tags, create_tag, get_tag, update_tag, delete_tag),
        components(schemas(
            CreateTag,
            ModifyTag,
            TagRead,
            TagWithNotes,
            ErrorDetail,
            ValidationDetail
        ))
    )]
    pub struct ApiDoc;
}

#[cfg(test)]
pub(crate) mod test {
    use super::*;
    use crate::api::errors::ErrorDetail;
    use crate::api::note::NoteWithTags;
    use crate::api::test::test_client;
    use crate::utils::rand::rand_str;

    use rocket::http::{ContentType, Status};
    use rocket::local::blocking::Client;

    pub fn create_rand_tag(client: &Client) -> TagRead {
        let res = client
            .post("/api/tags")
            .json(&CreateTag {
                name: rand_str(10),
                color: None,
            })
            .dispatch();
        assert_eq!(res.status(), Status::Created);
        res.into_json().unwrap()
    }

    #[test]
    fn create_same_name_twice() {
        let client = test_client();
        let payload = CreateTag {
            name: "work".to_string(),
            color: Some("#00FF00".to_string()),
        };

        let res = client.post("/api/tags").json(&payload).dispatch();
        assert_eq!(res.status(), Status::Created);
        let location = res.headers().get_one("Location").map(str::to_string);
        let created: TagRead = res.into_json().unwrap();
        assert_eq!(location, Some(format!("/api/tags/{}", created.id)));
        assert_eq!(created.name, "work");
        assert_eq!(created.color.as_deref(), Some("#00FF00"));

        let res = client.post("/api/tags").json(&payload).dispatch();
        assert_eq!(res.status(), Status::Conflict);
        let err: ErrorDetail = res.into_json().unwrap();
        assert_eq!(err.detail, "Tag with name 'work' already exists.");
    }

    #[test]
    fn reject_invalid_payloads() {
        let client = test_client();

        let res = client
            .post("/api/tags")
            .json(&CreateTag {
                name: "".to_string(),
                color: None,
            })
            .dispatch();
        assert_eq!(res.status(), Status::UnprocessableEntity);

        let res = client
            .post("/api/tags")
            .json(&CreateTag {
                name: "x".repeat(51),
                color: None,
            })
            .dispatch();
        assert_eq!(res.status(), Status::UnprocessableEntity);
        let body = res.into_string().unwrap();
        assert!(body.contains("name"), "{}", body);

        let res = client
            .post("/api/tags")
            .header(ContentType::JSON)
            .body(r#"{"color": "red"}"#)
            .dispatch();
        assert_eq!(res.status(), Status::UnprocessableEntity);

        let t = create_rand_tag(&client);
        let res = client
            .patch(format!("/api/tags/{}", t.id))
            .header(ContentType::JSON)
            .body(format!(r#"{{"color": "{}"}}"#, "c".repeat(21)))
            .dispatch();
        assert_eq!(res.status(), Status::UnprocessableEntity);
        let body = res.into_string().unwrap();
        assert!(body.contains("color"), "{}", body);
    }

    #[test]
    fn accept_body_without_content_type() {
        let client = test_client();
        let res = client
            .post("/api/tags")
            .body(r#"{"name": "plain"}"#)
            .dispatch();
        assert_eq!(res.status(), Status::Created);
        let created: TagRead = res.into_json().unwrap();

        let res = client
            .patch(format!("/api/tags/{}", created.id))
            .body(r##"{"color": "#123456"}"##)
            .dispatch();
        assert_eq!(res.status(), Status::Ok);
        let updated: TagRead = res.into_json().unwrap();
        assert_eq!(updated.color.as_deref(), Some("#123456"));
    }

    #[test]
    fn list_by_name() {
        let client = test_client();
        for name in ["zeta", "alpha", "mid"] {
            let res = client
                .post("/api/tags")
                .json(&CreateTag {
                    name: name.to_string(),
                    color: None,
                })
                .dispatch();
            assert_eq!(res.status(), Status::Created);
        }

        let res = client.get("/api/tags").dispatch();
        assert_eq!(res.status(), Status::Ok);
        let tags: Vec<TagRead> = res.into_json().unwrap();
        let names = tags.into_iter().map(|t| t.name).collect_vec();
        assert_eq!(names, vec!["alpha", "mid", "zeta"]);
    }

    #[test]
    fn update_partially() {
        let client = test_client();
        let res = client
            .post("/api/tags")
            .json(&CreateTag {
                name: "home".to_string(),
                color: Some("red".to_string()),
            })
            .dispatch();
        let home: TagRead = res.into_json().unwrap();
        let other = create_rand_tag(&client);

        // only the name changes
        let res = client
            .patch(format!("/api/tags/{}", home.id))
            .header(ContentType::JSON)
            .body(r#"{"name": "house"}"#)
            .dispatch();
        assert_eq!(res.status(), Status::Ok);
        let updated: TagRead = res.into_json().unwrap();
        assert_eq!(updated.name, "house");
        assert_eq!(updated.color.as_deref(), Some("red"));

        // explicit null clears the color
        let res = client
            .patch(format!("/api/tags/{}", home.id))
            .header(ContentType::JSON)
            .body(r#"{"color": null}"#)
            .dispatch();
        assert_eq!(res.status(), Status::Ok);
        let updated: TagRead = res.into_json().unwrap();
        assert_eq!(updated.name, "house");
        assert_eq!(updated.color, None);

        // empty payload is a no-op
        let res = client
            .patch(format!("/api/tags/{}", home.id))
            .header(ContentType::JSON)
            .body("{}")
            .dispatch();
        assert_eq!(res.status(), Status::Ok);
        assert_eq!(res.into_json::<TagRead>().unwrap(), updated);

        let res = client
            .patch(format!("/api/tags/{}", home.id))
            .json(&ModifyTag {
                name: Some(other.name.clone()),
                color: None,
            })
            .dispatch();
        assert_eq!(res.status(), Status::Conflict);

        let res = client
            .patch(format!("/api/tags/{}", home.id + 1000))
            .header(ContentType::JSON)
            .body("{}")
            .dispatch();
        assert_eq!(res.status(), Status::NotFound);
    }

    #[test]
    fn delete_detaches_notes() {
        let client = test_client();
        let note = crate::api::note::test::create_rand_note(&client);
        let t = create_rand_tag(&client);

        let res = client
            .post(format!("/api/notes/{}/tags/{}", note.id, t.id))
            .dispatch();
        assert_eq!(res.status(), Status::Ok);

        let res = client.get(format!("/api/tags/{}", t.id)).dispatch();
        assert_eq!(res.status(), Status::Ok);
        let details: TagWithNotes = res.into_json().unwrap();
        assert_eq!(details.notes.len(), 1);
        assert_eq!(details.notes[0].id, note.id);

        let res = client.delete(format!("/api/tags/{}", t.id)).dispatch();
        assert_eq!(res.status(), Status::NoContent);
        assert!(res.into_string().unwrap_or_default().is_empty());

        let res = client.get(format!("/api/notes/{}", note.id)).dispatch();
        let note: NoteWithTags = res.into_json().unwrap();
        assert!(note.tags.is_empty());

        let res = client.get(format!("/api/tags/{}", t.id)).dispatch();
        assert_eq!(res.status(), Status::NotFound);
        let res = client.delete(format!("/api/tags/{}", t.id)).dispatch();
        assert_eq!(res.status(), Status::NotFound);
    }
}
