//! Access to table statistics
//!
//! [`SizeCatalog`] is the seam between the reporter and the database server.
//! [`MySqlCatalog`] holds one connection for the whole run.

use futures::future::BoxFuture;
use sqlx::mysql::{MySqlConnectOptions, MySqlConnection, MySqlDatabaseError};
use sqlx::{Connection, Executor};

use super::config::DatabaseConfig;
use super::summary::TableSizeRecord;
use super::ReportError;

/// Operations the reporter needs from a database server
pub trait SizeCatalog: Send {
    /// Switch the active schema
    fn use_database<'a>(&'a mut self, database: &'a str) -> BoxFuture<'a, Result<(), ReportError>>;

    /// Table names of the active schema
    fn list_tables(&mut self) -> BoxFuture<'_, Result<Vec<String>, ReportError>>;

    /// Refresh statistics for all given tables in one statement
    fn analyze_tables<'a>(&'a mut self, tables: &'a [String]) -> BoxFuture<'a, Result<(), ReportError>>;

    /// Per-table storage figures for `database`
    fn table_sizes<'a>(
        &'a mut self,
        database: &'a str,
    ) -> BoxFuture<'a, Result<Vec<TableSizeRecord>, ReportError>>;
}

/// Quote an identifier with backticks
pub fn quote_identifier(name: &str) -> String {
    format!("`{}`", name.replace('`', "``"))
}

/// `ANALYZE TABLE` over every table at once
pub fn analyze_statement(tables: &[String]) -> String {
    let quoted: Vec<String> = tables.iter().map(|t| quote_identifier(t)).collect();
    format!("ANALYZE TABLE {}", quoted.join(", "))
}

const TABLE_SIZES_SQL: &str = r#"
    SELECT
        CAST(table_name AS CHAR) AS table_name,
        CAST(COALESCE(data_length, 0) AS UNSIGNED) AS data_length,
        CAST(COALESCE(index_length, 0) AS UNSIGNED) AS index_length,
        CAST(COALESCE(data_free, 0) AS UNSIGNED) AS data_free
    FROM information_schema.TABLES
    WHERE table_schema = ?
"#;

/// ER_BAD_DB_ERROR
const UNKNOWN_DATABASE: u16 = 1049;

fn is_unknown_database(error: &sqlx::Error) -> bool {
    match error {
        sqlx::Error::Database(db) => db
            .try_downcast_ref::<MySqlDatabaseError>()
            .map_or(false, |e| e.number() == UNKNOWN_DATABASE),
        _ => false,
    }
}

#[derive(sqlx::FromRow)]
struct TableSizeRow {
    table_name: String,
    data_length: u64,
    index_length: u64,
    data_free: u64,
}

/// Catalog over a single MySQL connection
pub struct MySqlCatalog {
    conn: MySqlConnection,
}

impl MySqlCatalog {
    pub async fn connect(config: &DatabaseConfig) -> Result<Self, ReportError> {
        let options = MySqlConnectOptions::new()
            .host(&config.host)
            .port(config.port)
            .username(&config.user)
            .password(&config.password);

        let conn = MySqlConnection::connect_with(&options)
            .await
            .map_err(ReportError::Connect)?;

        Ok(Self { conn })
    }

    /// Close the connection cleanly
    pub async fn close(self) -> Result<(), ReportError> {
        self.conn.close().await.map_err(ReportError::Query)
    }
}

impl SizeCatalog for MySqlCatalog {
    fn use_database<'a>(&'a mut self, database: &'a str) -> BoxFuture<'a, Result<(), ReportError>> {
        Box::pin(async move {
            // USE is not accepted by the prepared statement protocol
            let statement = format!("USE {}", quote_identifier(database));
            match Executor::execute(&mut self.conn, statement.as_str()).await {
                Ok(_) => Ok(()),
                Err(e) if is_unknown_database(&e) => {
                    Err(ReportError::UnknownDatabase(database.to_string()))
                }
                Err(e) => Err(e.into()),
            }
        })
    }

    fn list_tables(&mut self) -> BoxFuture<'_, Result<Vec<String>, ReportError>> {
        Box::pin(async move {
            let tables = sqlx::query_scalar::<_, String>("SHOW TABLES")
                .fetch_all(&mut self.conn)
                .await?;
            Ok(tables)
        })
    }

    fn analyze_tables<'a>(&'a mut self, tables: &'a [String]) -> BoxFuture<'a, Result<(), ReportError>> {
        Box::pin(async move {
            if tables.is_empty() {
                return Ok(());
            }
            let statement = analyze_statement(tables);
            Executor::execute(&mut self.conn, statement.as_str()).await?;
            Ok(())
        })
    }

    fn table_sizes<'a>(
        &'a mut self,
        database: &'a str,
    ) -> BoxFuture<'a, Result<Vec<TableSizeRecord>, ReportError>> {
        Box::pin(async move {
            let rows: Vec<TableSizeRow> = sqlx::query_as(TABLE_SIZES_SQL)
                .bind(database)
                .fetch_all(&mut self.conn)
                .await?;

            Ok(rows
                .into_iter()
                .map(|row| {
                    TableSizeRecord::from_lengths(
                        row.table_name,
                        row.data_length,
                        row.index_length,
                        row.data_free,
                    )
                })
                .collect())
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_quote_identifier() {
        assert_eq!(quote_identifier("orders"), "`orders`");
        assert_eq!(quote_identifier("odd`name"), "`odd``name`");
    }

    #[test]
    fn test_mysql_catalog_runs_in_spawned_tasks() {
        fn assert_send<T: Send>(_: &T) {}

        // Never polled: only checks the batch future can cross threads
        #[allow(dead_code)]
        fn check(catalog: &mut MySqlCatalog, databases: &[String]) {
            let future = crate::report::runner::collect_report(catalog, databases);
            assert_send(&future);
        }
    }

    #[test]
    fn test_analyze_statement() {
        let tables = vec!["orders".to_string(), "users".to_string()];
        assert_eq!(analyze_statement(&tables), "ANALYZE TABLE `orders`, `users`");
    }
}
