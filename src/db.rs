use std::{collections::HashSet, path::PathBuf};

use anyhow::{Context, Result};
use sea_orm::{
    ConnectionTrait, Database, DatabaseConnection, Statement, TransactionTrait, Value,
};
use tokio::fs;

const MIGRATIONS_DIR: &str = "migrations";

/// Create a SeaORM connection.
pub async fn create_orm_conn(database_url: &str) -> Result<DatabaseConnection> {
    let conn = Database::connect(database_url)
        .await
        .context("connecting to the booking database")?;
    Ok(conn)
}

/// Applies every `migrations/*.sql` file not yet listed in `schema_migrations`,
/// in filename order. Each file runs in its own transaction together with the
/// row that records it.
pub async fn run_migrations(conn: &DatabaseConnection) -> Result<usize> {
    let backend = conn.get_database_backend();
    conn.execute(Statement::from_string(
        backend,
        "CREATE TABLE IF NOT EXISTS schema_migrations (\
            name TEXT PRIMARY KEY, \
            applied_at TIMESTAMPTZ NOT NULL DEFAULT now())",
    ))
    .await?;

    let applied: HashSet<String> = conn
        .query_all(Statement::from_string(
            backend,
            "SELECT name FROM schema_migrations",
        ))
        .await?
        .into_iter()
        .map(|row| row.try_get::<String>("", "name"))
        .collect::<Result<_, _>>()?;

    let mut count = 0;
    for file in migration_files().await? {
        let name = file
            .file_name()
            .and_then(|n| n.to_str())
            .map(str::to_owned)
            .with_context(|| format!("unreadable migration name {}", file.display()))?;
        if applied.contains(&name) {
            tracing::debug!(migration = %name, "already applied");
            continue;
        }

        let sql = fs::read_to_string(&file)
            .await
            .with_context(|| format!("reading {}", file.display()))?;
        let txn = conn.begin().await?;
        for stmt in statements(&sql) {
            txn.execute(Statement::from_string(backend, stmt))
                .await
                .with_context(|| format!("migration {name} failed"))?;
        }
        txn.execute(Statement::from_sql_and_values(
            backend,
            "INSERT INTO schema_migrations (name) VALUES ($1)",
            [Value::from(name.clone())],
        ))
        .await?;
        txn.commit().await?;

        tracing::info!(migration = %name, "migration applied");
        count += 1;
    }

    Ok(count)
}

async fn migration_files() -> Result<Vec<PathBuf>> {
    let mut entries = fs::read_dir(MIGRATIONS_DIR)
        .await
        .with_context(|| format!("opening {MIGRATIONS_DIR}/"))?;
    let mut files = Vec::new();
    while let Some(entry) = entries.next_entry().await? {
        let path = entry.path();
        if path.is_file() && path.extension().is_some_and(|ext| ext == "sql") {
            files.push(path);
        }
    }
    files.sort();
    Ok(files)
}

/// Splits a migration file into single statements. Postgres prepared
/// statements take one command each. `--` comment lines are dropped.
fn statements(sql: &str) -> Vec<String> {
    let body: String = sql
        .lines()
        .filter(|line| !line.trim_start().starts_with("--"))
        .collect::<Vec<_>>()
        .join("\n");
    body.split(';')
        .map(str::trim)
        .filter(|stmt| !stmt.is_empty())
        .map(|stmt| format!("{stmt};"))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn statements_skip_comments_and_blanks() {
        let sql = "-- listings; keyed by uuid\nCREATE TABLE a (id INT);\n\n  -- done;\nCREATE INDEX b ON a (id);\n;";
        assert_eq!(
            statements(sql),
            ["CREATE TABLE a (id INT);", "CREATE INDEX b ON a (id);"]
        );
    }
}
