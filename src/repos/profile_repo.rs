/*
 * Responsibility
 * - SQLx access to the profiles table
 * - Lookup by email backs both login and the per-request identity check
 */
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{FromRow, PgPool};
use uuid::Uuid;

use crate::repos::error::{RepoError, RepoResult};

#[derive(Clone, FromRow)]
pub struct ProfileRow {
    pub id: i64,
    pub profile_id: Uuid,
    pub name: String,
    pub email: String,
    pub password_hash: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl std::fmt::Debug for ProfileRow {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        // password_hash is never printed
        f.debug_struct("ProfileRow")
            .field("id", &self.id)
            .field("profile_id", &self.profile_id)
            .field("name", &self.name)
            .field("email", &self.email)
            .field("created_at", &self.created_at)
            .field("updated_at", &self.updated_at)
            .finish()
    }
}

#[derive(Debug)]
pub struct NewProfile<'a> {
    pub profile_id: Uuid,
    pub name: &'a str,
    pub email: &'a str,
    pub password_hash: &'a str,
}

#[derive(Clone, Debug)]
pub struct ProfileRepo {
    pool: PgPool,
}

/// Profile persistence as the services see it.
#[async_trait]
pub trait ProfileStore: Send + Sync {
    async fn find_by_email(&self, email: &str) -> RepoResult<Option<ProfileRow>>;
    async fn exists_by_email(&self, email: &str) -> RepoResult<bool>;
    /// A second profile with the same email surfaces as `RepoError::Conflict`.
    async fn insert(&self, profile: NewProfile<'_>) -> RepoResult<ProfileRow>;
}

impl ProfileRepo {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ProfileStore for ProfileRepo {
    async fn find_by_email(&self, email: &str) -> RepoResult<Option<ProfileRow>> {
        let row = sqlx::query_as::<_, ProfileRow>(
            r#"
            SELECT id, profile_id, name, email, password_hash, created_at, updated_at
            FROM profiles
            WHERE email = $1
            "#,
        )
        .bind(email)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row)
    }

    async fn exists_by_email(&self, email: &str) -> RepoResult<bool> {
        let exists = sqlx::query_scalar::<_, bool>(
            r#"
            SELECT EXISTS (SELECT 1 FROM profiles WHERE email = $1)
            "#,
        )
        .bind(email)
        .fetch_one(&self.pool)
        .await?;

        Ok(exists)
    }

    async fn insert(&self, profile: NewProfile<'_>) -> RepoResult<ProfileRow> {
        let row = sqlx::query_as::<_, ProfileRow>(
            r#"
            INSERT INTO profiles (profile_id, name, email, password_hash)
            VALUES ($1, $2, $3, $4)
            RETURNING id, profile_id, name, email, password_hash, created_at, updated_at
            "#,
        )
        .bind(profile.profile_id)
        .bind(profile.name)
        .bind(profile.email)
        .bind(profile.password_hash)
        .fetch_one(&self.pool)
        .await
        .map_err(RepoError::from_sqlx)?;

        Ok(row)
    }
}
