use std::env;

use engine_logging::{engine_debug, engine_error, engine_info};
use thiserror::Error;
use tokio_postgres::NoTls;

use crate::config::DatabaseSettings;

#[derive(Debug, Error)]
pub enum PersistError {
    #[error("invalid table identifier: {0}")]
    InvalidIdentifier(String),
    #[error("refusing to replace {table} with an empty value list")]
    NoRows { table: String },
    #[error("database error while {context}: {source}")]
    Database {
        context: &'static str,
        #[source]
        source: tokio_postgres::Error,
    },
}

fn db_err(context: &'static str) -> impl FnOnce(tokio_postgres::Error) -> PersistError {
    move |source| PersistError::Database { context, source }
}

/// Fully-qualified Postgres table name (schema + table).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableName {
    schema: String,
    table: String,
}

impl TableName {
    pub fn new(schema: impl Into<String>, table: impl Into<String>) -> Result<Self, PersistError> {
        let schema = schema.into();
        let table = table.into();
        if schema.trim().is_empty() {
            return Err(PersistError::InvalidIdentifier("schema name is required".into()));
        }
        if table.trim().is_empty() {
            return Err(PersistError::InvalidIdentifier("table name is required".into()));
        }
        Ok(Self { schema, table })
    }

    pub fn from_settings(settings: &DatabaseSettings) -> Result<Self, PersistError> {
        Self::new(settings.schema.clone(), settings.table.clone())
    }

    /// Fully-qualified table reference with quoted identifiers.
    pub fn qualified(&self) -> String {
        format!("{}.{}", quote_ident(&self.schema), quote_ident(&self.table))
    }
}

/// Quotes Postgres identifiers, escaping embedded quotes.
pub fn quote_ident(input: &str) -> String {
    let escaped = input.replace('"', "\"\"");
    format!("\"{}\"", escaped)
}

/// One output row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValueRow {
    pub key: String,
    pub value: String,
}

pub fn drop_table_sql(table: &TableName) -> String {
    format!("DROP TABLE IF EXISTS {}", table.qualified())
}

pub fn create_table_sql(table: &TableName) -> String {
    format!(
        "CREATE TABLE {} (key text NOT NULL, value text NOT NULL, PRIMARY KEY (key, value))",
        table.qualified()
    )
}

pub fn insert_sql(table: &TableName) -> String {
    format!(
        "INSERT INTO {} (key, value) VALUES ($1, $2) ON CONFLICT DO NOTHING",
        table.qualified()
    )
}

pub fn grant_sql(table: &TableName, role: &str) -> String {
    format!("GRANT SELECT ON {} TO {}", table.qualified(), quote_ident(role))
}

/// A full replacement of the output table.
#[derive(Debug, Clone, Copy)]
pub struct ReplaceRequest<'a> {
    pub table: &'a TableName,
    /// Rows in insertion order.
    pub rows: &'a [ValueRow],
    /// Role to grant SELECT to.
    pub grant_to: Option<&'a str>,
    /// Create the table even when `rows` is empty.
    pub allow_empty: bool,
}

/// Destination for the harvested `(key, value)` rows.
#[async_trait::async_trait]
pub trait ValueStore: Send + Sync {
    /// Replace the table contents. Returns the number of rows inserted.
    async fn replace_values(&self, request: ReplaceRequest<'_>) -> Result<u64, PersistError>;
}

/// [`ValueStore`] backed by a Postgres database.
#[derive(Debug, Clone)]
pub struct PostgresStore {
    config: tokio_postgres::Config,
}

impl PostgresStore {
    pub fn new(config: tokio_postgres::Config) -> Self {
        Self { config }
    }

    /// Connection parameters from settings, falling back to `localhost` and
    /// the `PGUSER` / `USER` environment variables.
    pub fn from_settings(settings: &DatabaseSettings) -> Self {
        let mut config = tokio_postgres::Config::new();
        config.host(settings.host.as_deref().unwrap_or("localhost"));
        if let Some(port) = settings.port {
            config.port(port);
        }
        if let Some(name) = settings.name.as_deref() {
            config.dbname(name);
        }
        let user = settings
            .username
            .clone()
            .or_else(|| env::var("PGUSER").ok())
            .or_else(|| env::var("USER").ok());
        if let Some(user) = user.as_deref() {
            config.user(user);
        }
        if let Some(password) = settings.password.as_deref() {
            config.password(password);
        }
        config.application_name("common-values");
        Self::new(config)
    }
}

#[async_trait::async_trait]
impl ValueStore for PostgresStore {
    async fn replace_values(&self, request: ReplaceRequest<'_>) -> Result<u64, PersistError> {
        let ReplaceRequest {
            table,
            rows,
            grant_to,
            allow_empty,
        } = request;
        if rows.is_empty() && !allow_empty {
            return Err(PersistError::NoRows {
                table: table.qualified(),
            });
        }

        let (mut client, connection) = self
            .config
            .connect(NoTls)
            .await
            .map_err(db_err("connecting"))?;
        tokio::spawn(async move {
            if let Err(err) = connection.await {
                engine_error!("postgres connection error: {}", err);
            }
        });

        let transaction = client.transaction().await.map_err(db_err("starting transaction"))?;
        transaction
            .batch_execute(&format!(
                "{};\n{}",
                drop_table_sql(table),
                create_table_sql(table)
            ))
            .await
            .map_err(db_err("creating table"))?;
        engine_debug!("Recreated table {}", table.qualified());

        let statement = transaction
            .prepare(&insert_sql(table))
            .await
            .map_err(db_err("preparing insert"))?;
        let mut inserted = 0;
        for row in rows {
            inserted += transaction
                .execute(&statement, &[&row.key, &row.value])
                .await
                .map_err(db_err("inserting values"))?;
        }

        if let Some(role) = grant_to {
            transaction
                .batch_execute(&grant_sql(table, role))
                .await
                .map_err(db_err("granting access"))?;
            engine_info!("Granted SELECT on {} to {}", table.qualified(), role);
        }

        transaction.commit().await.map_err(db_err("committing"))?;
        Ok(inserted)
    }
}
