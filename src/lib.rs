#[macro_use]
extern crate rocket;

pub mod api;
pub mod db;
pub mod service;
pub mod utils;

#[cfg(test)]
#[cfg(not(tarpaulin_include))]
#[ctor::ctor]
fn init() {
    crate::utils::logging::setup_console_log();
}

pub(crate) mod misc {
    use utoipa::OpenApi;
    use utoipa_swagger_ui::SwaggerUi;

    #[derive(OpenApi)]
    #[openapi(
        info(description = "Notes with tags", version = "1.0"),
        nest(
            (path = "/api/notes", api = crate::api::note::misc::ApiDoc, tags = ["notes"]),
            (path = "/api/tags", api = crate::api::tag::misc::ApiDoc, tags = ["tags"])
        )
    )]
    pub struct ApiDoc;

    pub fn docs(app_name: &str) -> Vec<rocket::Route> {
        let mut openapi = ApiDoc::openapi();
        openapi.info.title = app_name.to_string();

        SwaggerUi::new("/docs/<_..>")
            .url("/api-docs/openapi.json", openapi)
            .into()
    }
}

/// Builds the application on top of the given configuration.
pub fn app(figment: rocket::figment::Figment) -> rocket::Rocket<rocket::Build> {
    use rocket::fairing::AdHoc;
    use rocket_db_pools::Database;

    use crate::api::configs::{Config, DEFAULT_APP_NAME};
    use crate::api::fairings::{cors, db};
    use crate::api::{errors, note, tag};

    let app_name = figment
        .extract_inner::<String>("app_name")
        .unwrap_or_else(|_| DEFAULT_APP_NAME.to_string());

    rocket::custom(figment)
        .attach(db::migrations())
        .attach(db::Db::init())
        .attach(cors::Cors)
        .attach(AdHoc::config::<Config>())
        .mount("/", routes![api::index, cors::preflight])
        .mount("/api/notes", note::routes())
        .mount("/api/tags", tag::routes())
        .mount("/", misc::docs(&app_name))
        .register("/", errors::catchers())
}

#[cfg(not(tarpaulin_include))]
pub fn rocket() -> rocket::Rocket<rocket::Build> {
    crate::utils::logging::setup_console_log();
    app(api::configs::config_provider())
}
