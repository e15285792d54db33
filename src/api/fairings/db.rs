use std::time::Duration;

use diesel::result::ConnectionResult;
use diesel_async::pooled_connection::{
    deadpool::{BuildError, Object, Pool, PoolError},
    AsyncDieselConnectionManager, ManagerConfig,
};
use futures::future::{BoxFuture, FutureExt};
use rocket::fairing::AdHoc;
use rocket::figment::Figment;
use rocket_db_pools::{Database, Error};

use crate::db::connection;

pub type InitError = BuildError;
pub type GetError = PoolError;
pub type Connection = crate::db::Connection;
pub struct DBPool(Pool<Connection>);

fn setup_connection(url: &str) -> BoxFuture<'_, ConnectionResult<Connection>> {
    connection::establish(url).boxed()
}

#[rocket::async_trait]
impl rocket_db_pools::Pool for DBPool {
    type Connection = Object<Connection>;

    type Error = Error<InitError, GetError>;

    async fn init(figment: &Figment) -> Result<Self, Self::Error> {
        let config = figment
            .extract::<rocket_db_pools::Config>()
            .map_err(Error::Config)?;

        let mut manager_config = ManagerConfig::default();
        manager_config.custom_setup = Box::new(setup_connection);
        let manager =
            AsyncDieselConnectionManager::<Connection>::new_with_config(&config.url, manager_config);

        let timeout = Some(Duration::from_secs(config.connect_timeout));
        match Pool::builder(manager)
            .max_size(config.max_connections)
            .wait_timeout(timeout)
            .create_timeout(timeout)
            .runtime(deadpool::Runtime::Tokio1)
            .build()
        {
            Ok(pool) => Ok(Self(pool)),
            Err(e) => Err(Error::Init(e)),
        }
    }

    async fn get(&self) -> Result<Self::Connection, Self::Error> {
        self.0.get().await.map_err(Error::Get)
    }

    async fn close(&self) {
        self.0.close()
    }
}

#[derive(Database)]
#[database("main")]
pub struct Db(DBPool);

/// Applies pending migrations to the `main` database before launch.
pub fn migrations() -> AdHoc {
    AdHoc::try_on_ignite("Database Migrations", |rocket| async {
        let url = match rocket.figment().extract_inner::<String>("databases.main.url") {
            Ok(url) => url,
            Err(e) => {
                tracing::error!(%e, "no database url configured");
                return Err(rocket);
            }
        };
        match connection::run_migrations(&url).await {
            Ok(()) => Ok(rocket),
            Err(e) => {
                tracing::error!(?e, %url, "failed to run migrations");
                Err(rocket)
            }
        }
    })
}
