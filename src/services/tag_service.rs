use sqlx::PgPool;
use uuid::Uuid;

use crate::{error::Result, models::Tag};

// Tags are seeded data; there is no endpoint that creates them.

pub async fn list_tags(db: &PgPool) -> Result<Vec<Tag>> {
    let tags = sqlx::query_as::<_, Tag>("SELECT id, name FROM tags ORDER BY name DESC")
        .fetch_all(db)
        .await?;

    Ok(tags)
}

pub async fn tags_for_question(db: &PgPool, question_id: Uuid) -> Result<Vec<Tag>> {
    let tags = sqlx::query_as::<_, Tag>(
        r#"
        SELECT t.id, t.name
        FROM tags t
        JOIN question_tags qt ON qt.tag_id = t.id
        WHERE qt.question_id = $1
        ORDER BY t.name DESC
        "#,
    )
    .bind(question_id)
    .fetch_all(db)
    .await?;

    Ok(tags)
}
