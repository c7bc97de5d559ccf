use crate::config::Config;
use sea_orm::sea_query::{Expr, Func, SimpleExpr};
use sea_orm::{ColumnTrait, ConnectOptions, ConnectionTrait, Database, DatabaseConnection, EntityTrait};

pub type DbPool = DatabaseConnection;

const SCHEMA: &str = r#"
    CREATE TABLE IF NOT EXISTS users (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        username VARCHAR(150) NOT NULL UNIQUE COLLATE NOCASE,
        email VARCHAR(254) NOT NULL UNIQUE COLLATE NOCASE,
        password_hash VARCHAR(128) NOT NULL,
        first_name VARCHAR(150) NOT NULL DEFAULT '',
        last_name VARCHAR(150) NOT NULL DEFAULT '',
        password_changed_at BIGINT NOT NULL DEFAULT 0,
        created_at TEXT NOT NULL
    );

    CREATE TABLE IF NOT EXISTS accounts (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        user_id INTEGER NOT NULL UNIQUE REFERENCES users(id) ON DELETE CASCADE,
        age INTEGER NULL,
        views VARCHAR(40) NOT NULL DEFAULT '',
        photo VARCHAR(100) NOT NULL DEFAULT 'profile_logo.png'
    );

    CREATE TABLE IF NOT EXISTS "groups" (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        name VARCHAR(150) NOT NULL,
        slug VARCHAR(160) NULL UNIQUE COLLATE NOCASE,
        description TEXT NOT NULL DEFAULT '',
        photo VARCHAR(100) NOT NULL DEFAULT 'group_logo.jpg',
        date_create TEXT NOT NULL
    );

    CREATE INDEX IF NOT EXISTS idx_groups_name ON "groups" (name);
    CREATE INDEX IF NOT EXISTS idx_groups_date_create ON "groups" (date_create);

    CREATE TABLE IF NOT EXISTS account_groups (
        account_id INTEGER NOT NULL REFERENCES accounts(id) ON DELETE CASCADE,
        group_id INTEGER NOT NULL REFERENCES "groups"(id) ON DELETE CASCADE,
        PRIMARY KEY (account_id, group_id)
    );

    CREATE TABLE IF NOT EXISTS tags (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        title VARCHAR(40) NOT NULL,
        slug VARCHAR(50) NOT NULL UNIQUE
    );

    CREATE TABLE IF NOT EXISTS posts (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        title VARCHAR(150) NOT NULL,
        author_id INTEGER NOT NULL REFERENCES accounts(id) ON DELETE CASCADE,
        group_id INTEGER NOT NULL REFERENCES "groups"(id) ON DELETE CASCADE,
        slug VARCHAR(160) NOT NULL UNIQUE COLLATE NOCASE,
        body TEXT NOT NULL DEFAULT '',
        date_pub TEXT NOT NULL
    );

    CREATE INDEX IF NOT EXISTS idx_posts_group_id ON posts (group_id);
    CREATE INDEX IF NOT EXISTS idx_posts_date_pub ON posts (date_pub);

    CREATE TABLE IF NOT EXISTS post_tags (
        post_id INTEGER NOT NULL REFERENCES posts(id) ON DELETE CASCADE,
        tag_id INTEGER NOT NULL REFERENCES tags(id) ON DELETE CASCADE,
        PRIMARY KEY (post_id, tag_id)
    );
"#;

pub async fn create_pool(config: &Config) -> Result<DbPool, anyhow::Error> {
    let mut options = ConnectOptions::new(config.database.url.clone());
    // every connection to `sqlite::memory:` opens its own empty database
    let max_connections = if config.is_in_memory_database() {
        1
    } else {
        config.database.max_connections
    };
    options
        .max_connections(max_connections)
        .min_connections(1)
        .sqlx_logging(false);

    let db = Database::connect(options).await?;
    create_schema(&db).await?;

    Ok(db)
}

async fn create_schema(db: &DbPool) -> Result<(), anyhow::Error> {
    let backend = db.get_database_backend();
    for statement in SCHEMA.split(';') {
        let statement = statement.trim();
        if !statement.is_empty() {
            let stmt = sea_orm::Statement::from_string(backend, statement.to_string());
            db.execute(stmt).await?;
        }
    }

    log::debug!("Database schema ready");
    Ok(())
}

/// `LOWER(table.column) = LOWER(value)`. Both sides fold in SQLite, which
/// only folds ASCII letters, so non-ASCII text must match exactly.
pub fn iexact<E, C>(entity: E, column: C, value: &str) -> SimpleExpr
where
    E: EntityTrait,
    C: ColumnTrait,
{
    Expr::expr(Func::lower(Expr::col((entity, column)))).eq(Func::lower(Expr::val(value)))
}
