use std::path::Path;

/// Applies pending schema migrations at startup. The directory lives at
/// `server/migrations` when launched from the workspace root and at
/// `./migrations` when the deployed binary runs next to its own copy.
pub async fn run(pool: &sqlx::PgPool) -> Result<(), sqlx_core::migrate::MigrateError> {
    let dir = if Path::new("server/migrations").exists() {
        Path::new("server/migrations")
    } else {
        Path::new("./migrations")
    };
    sqlx_core::migrate::Migrator::new(dir).await?.run(pool).await
}
