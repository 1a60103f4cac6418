// src/common/db_utils.rs

use sqlx::{PgPool, Postgres, Transaction};

use crate::models::auth::CurrentUser;

// ---
// Helper RLS: A "Chave" para o Banco de Dados
// ---
/// Abre uma transação e define as variáveis lidas pelas políticas de RLS.
/// As variáveis valem só dentro da transação (`is_local = true`).
pub(crate) async fn begin_rls_transaction<'a>(
    pool: &'a PgPool,
    user: &CurrentUser,
) -> Result<Transaction<'a, Postgres>, sqlx::Error> {
    // 1. Abre a transação
    let mut tx = pool.begin().await?;

    // 2. Define User ID
    sqlx::query("SELECT set_config('app.user_id', $1, true)")
        .bind(user.id.to_string())
        .execute(&mut *tx)
        .await?;

    // 3. Define o papel
    sqlx::query("SELECT set_config('app.user_role', $1, true)")
        .bind(user.role.as_str())
        .execute(&mut *tx)
        .await?;

    Ok(tx)
}

/// SQLSTATE 42501 (insufficient_privilege): bloqueio de RLS ou GRANT.
pub(crate) fn is_permission_denied(err: &sqlx::Error) -> bool {
    matches!(err, sqlx::Error::Database(db) if db.code().as_deref() == Some("42501"))
}
