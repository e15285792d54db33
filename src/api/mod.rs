pub mod configs;
pub mod errors;
pub mod fairings;
pub mod note;
pub mod tag;

use rocket::serde::json::Json;
use rocket::serde::{Deserialize, Serialize};
use rocket::State;

#[derive(Serialize, Deserialize, Debug)]
#[serde(crate = "rocket::serde")]
pub struct Welcome {
    pub message: String,
    pub docs: String,
}

#[get("/")]
pub fn index(config: &State<configs::Config>) -> Json<Welcome> {
    Json(Welcome {
        message: format!("Welcome to {} API", config.app_name),
        docs: "/docs/".to_string(),
    })
}
