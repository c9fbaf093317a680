use chrono::{Duration, TimeZone, Utc};
use sea_orm::{
    ActiveModelTrait, ConnectionTrait, DatabaseConnection, DbErr, EntityTrait, PaginatorTrait,
    Schema, Set,
};
use tracing::info;

use super::entity::{ActiveModel, Entity};

const DEMO_USERS: &[(&str, &str, bool)] = &[
    ("Ada", "Lovelace", true),
    ("Alan", "Turing", false),
    ("Grace", "Hopper", true),
    ("Ada", "Byron", true),
    ("Edsger", "Dijkstra", true),
    ("Barbara", "Liskov", true),
    ("Donald", "Knuth", false),
];

/// Create the users table if it does not exist yet.
pub async fn install(conn: &DatabaseConnection) -> Result<(), DbErr> {
    let backend = conn.get_database_backend();
    let mut stmt = Schema::new(backend).create_table_from_entity(Entity);
    stmt.if_not_exists();
    conn.execute(backend.build(&stmt)).await?;
    Ok(())
}

/// Insert the demo rows into an empty table. Returns how many were inserted.
pub async fn seed(conn: &DatabaseConnection) -> Result<usize, DbErr> {
    if Entity::find().count(conn).await? > 0 {
        return Ok(0);
    }

    let epoch = Utc
        .with_ymd_and_hms(2024, 1, 1, 9, 0, 0)
        .single()
        .ok_or_else(|| DbErr::Custom("invalid seed timestamp".into()))?;

    for (i, (first, last, active)) in DEMO_USERS.iter().enumerate() {
        let created_at = epoch + Duration::days(i as i64);
        ActiveModel {
            first_name: Set(first.to_string()),
            last_name: Set(last.to_string()),
            email: Set(format!(
                "{}.{}@example.com",
                first.to_lowercase(),
                last.to_lowercase()
            )),
            created_at: Set(created_at),
            deactivated_at: Set((!active).then(|| created_at + Duration::days(30))),
            ..Default::default()
        }
        .insert(conn)
        .await?;
    }

    info!(rows = DEMO_USERS.len(), "seeded users table");
    Ok(DEMO_USERS.len())
}
