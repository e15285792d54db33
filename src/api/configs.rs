use rocket::{
    figment::Figment,
    serde::{Deserialize, Serialize},
};

pub const DEFAULT_APP_NAME: &str = "Qalam";
pub const DEFAULT_DATABASE_URL: &str = "qalam.db";

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(crate = "rocket::serde")]
pub struct Config {
    pub app_name: String,
    pub database_url: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            app_name: DEFAULT_APP_NAME.to_string(),
            database_url: DEFAULT_DATABASE_URL.to_string(),
        }
    }
}

/// Strips the `sqlite://` scheme, diesel opens plain paths and `file:` URIs.
pub fn database_path(url: &str) -> &str {
    url.strip_prefix("sqlite://").unwrap_or(url)
}

fn base_provider() -> Figment {
    use rocket::figment::providers::{Env, Serialized};

    dotenvy::dotenv().ok();

    Figment::from(rocket::Config::default())
        .merge(Serialized::defaults(Config::default()))
        .merge(Env::raw().only(&["app_name", "database_url"]).global())
        .merge(Env::prefixed("QALAM_").global())
}

/// Points the `main` pool at the configured `database_url`.
///
/// Only the url is set here. Pool sizing and timeouts fall back to the
/// defaults `rocket_db_pools` joins in at ignition unless configured.
pub fn bind_database(figment: Figment) -> Figment {
    let url = figment
        .extract_inner::<String>("database_url")
        .unwrap_or_else(|_| DEFAULT_DATABASE_URL.to_string());

    figment.merge(("databases.main.url", database_path(&url).to_string()))
}

pub fn config_provider() -> Figment {
    bind_database(base_provider())
}

#[cfg(test)]
pub(crate) fn temp_config_provider(db: &crate::db::connection::test::TempDatabase) -> Figment {
    bind_database(base_provider().merge(("database_url", db.url())))
}
