use std::sync::Mutex;

use async_trait::async_trait;
use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;

use crate::error::Error;
use crate::user::model::User;

/// Embedded migrations for the `users` table.
pub static MIGRATOR: sqlx::migrate::Migrator = sqlx::migrate!("./migrations");

/// Durable unique-keyed storage for user records.
#[async_trait]
pub trait UserStore: Send + Sync {
    /// Insert a new record, atomically rejecting a duplicate `email` or
    /// `username` with [`Error::UniquenessViolation`].
    async fn insert_unique(&self, user: User) -> Result<User, Error>;

    /// Persist changed fields of an existing record.
    async fn update(&self, user: &User) -> Result<User, Error>;

    /// Look a user up by the login identifier.
    async fn find_by_email(&self, email: &str) -> Result<Option<User>, Error>;
}

/// Postgres-backed store. Uniqueness of `email` and `username` rests on
/// the unique indexes created by the migrations.
pub struct PgUserStore {
    pool: PgPool,
}

impl PgUserStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn connect(database_url: &str, max_connections: u32) -> Result<Self, Error> {
        let pool = PgPoolOptions::new()
            .max_connections(max_connections)
            .connect(database_url)
            .await?;
        Ok(Self { pool })
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

fn into_store_error(e: sqlx::Error) -> Error {
    if let sqlx::Error::Database(db) = &e {
        if db.is_unique_violation() {
            // users_email_key / users_username_key
            let field = match db.constraint() {
                Some(constraint) if constraint.contains("username") => "username",
                _ => "email",
            };
            return Error::UniquenessViolation { field };
        }
    }
    Error::Database(e)
}

#[async_trait]
impl UserStore for PgUserStore {
    async fn insert_unique(&self, user: User) -> Result<User, Error> {
        let inserted = sqlx::query_as::<_, User>(
            r#"
            INSERT INTO users
                (id, email, username, first_name, last_name, password_hash,
                 is_staff, is_active, is_superuser, created_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
            RETURNING id, email, username, first_name, last_name, password_hash,
                      is_staff, is_active, is_superuser, created_at
            "#,
        )
        .bind(user.id)
        .bind(&user.email)
        .bind(&user.username)
        .bind(&user.first_name)
        .bind(&user.last_name)
        .bind(&user.password_hash)
        .bind(user.is_staff)
        .bind(user.is_active)
        .bind(user.is_superuser)
        .bind(user.created_at)
        .fetch_one(&self.pool)
        .await
        .map_err(into_store_error)?;
        Ok(inserted)
    }

    async fn update(&self, user: &User) -> Result<User, Error> {
        // created_at is immutable and deliberately absent from the SET list.
        let updated = sqlx::query_as::<_, User>(
            r#"
            UPDATE users
            SET email = $2, username = $3, first_name = $4, last_name = $5,
                password_hash = $6, is_staff = $7, is_active = $8, is_superuser = $9
            WHERE id = $1
            RETURNING id, email, username, first_name, last_name, password_hash,
                      is_staff, is_active, is_superuser, created_at
            "#,
        )
        .bind(user.id)
        .bind(&user.email)
        .bind(&user.username)
        .bind(&user.first_name)
        .bind(&user.last_name)
        .bind(&user.password_hash)
        .bind(user.is_staff)
        .bind(user.is_active)
        .bind(user.is_superuser)
        .fetch_one(&self.pool)
        .await
        .map_err(into_store_error)?;
        Ok(updated)
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, Error> {
        let user = sqlx::query_as::<_, User>(
            r#"
            SELECT id, email, username, first_name, last_name, password_hash,
                   is_staff, is_active, is_superuser, created_at
            FROM users
            WHERE email = $1
            "#,
        )
        .bind(email)
        .fetch_optional(&self.pool)
        .await?;
        Ok(user)
    }
}

/// In-memory store with the same uniqueness semantics as Postgres.
/// Backs the crate's own tests and test harnesses of embedders.
#[derive(Default)]
pub struct MemoryUserStore {
    users: Mutex<Vec<User>>,
}

impl MemoryUserStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.users.lock().expect("users lock poisoned").len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[async_trait]
impl UserStore for MemoryUserStore {
    async fn insert_unique(&self, user: User) -> Result<User, Error> {
        let mut users = self.users.lock().expect("users lock poisoned");
        if users.iter().any(|u| u.email == user.email) {
            return Err(Error::UniquenessViolation { field: "email" });
        }
        if users.iter().any(|u| u.username == user.username) {
            return Err(Error::UniquenessViolation { field: "username" });
        }
        users.push(user.clone());
        Ok(user)
    }

    async fn update(&self, user: &User) -> Result<User, Error> {
        let mut users = self.users.lock().expect("users lock poisoned");
        let slot = users
            .iter_mut()
            .find(|u| u.id == user.id)
            .ok_or(Error::Database(sqlx::Error::RowNotFound))?;
        *slot = user.clone();
        Ok(user.clone())
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, Error> {
        let users = self.users.lock().expect("users lock poisoned");
        Ok(users.iter().find(|u| u.email == email).cloned())
    }
}
