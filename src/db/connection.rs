use diesel::connection::InstrumentationEvent;
use diesel::result::{ConnectionError, ConnectionResult};
use diesel::SqliteConnection;
use diesel_async::sync_connection_wrapper::SyncConnectionWrapper;
use diesel_async::{AsyncConnection, SimpleAsyncConnection};

pub type Connection = SyncConnectionWrapper<SqliteConnection>;

// SQLite leaves foreign key enforcement off unless asked, per connection.
const SETUP_PRAGMAS: &str = "PRAGMA foreign_keys = ON; PRAGMA busy_timeout = 5000;";

pub async fn establish(url: &str) -> ConnectionResult<Connection> {
    let mut conn = Connection::establish(url).await?;

    conn.set_instrumentation(|event: InstrumentationEvent<'_>| match event {
        InstrumentationEvent::StartQuery { query, .. } => {
            tracing::debug!("Executing query: {}", query);
        }
        InstrumentationEvent::FinishQuery { query, error, .. } => match error {
            Some(e) => tracing::error!("Query failed: {}\nError: {:?}", query, e),
            None => tracing::debug!("Executing query succeeded: {}", query),
        },
        _ => {}
    });

    conn.batch_execute(SETUP_PRAGMAS)
        .await
        .map_err(ConnectionError::CouldntSetupConfiguration)?;

    Ok(conn)
}

/// Creates the tables if they are missing. Safe to call on every start.
pub async fn run_migrations(url: &str) -> anyhow::Result<()> {
    use diesel::Connection as _;
    use diesel_migrations::{embed_migrations, EmbeddedMigrations, MigrationHarness};

    const MIGRATIONS: EmbeddedMigrations = embed_migrations!("./migrations");
    let url = url.to_string();

    // diesel_migrations only drives sync connections
    tokio::task::spawn_blocking(move || -> anyhow::Result<()> {
        let mut conn = SqliteConnection::establish(&url)?;
        let applied = conn
            .run_pending_migrations(MIGRATIONS)
            .map_err(|e| anyhow::anyhow!(e))?;
        tracing::info!(count = applied.len(), %url, "migrations applied");
        Ok(())
    })
    .await?
}
