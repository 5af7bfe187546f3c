//! User storage repository.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::any::{AnyPoolOptions, AnyRow};
use sqlx::pool::PoolConnection;
use sqlx::{AnyConnection, AnyPool, Connection, Row};
use tokio::sync::{OwnedSemaphorePermit, Semaphore};
use tracing::{debug, info};

use super::filter::UserQuery;
use super::model::{Field, NewUser, PublicUser, UserId, UserRecord};
use crate::store::{Dialect, StoreConfig};
use crate::{Error, Result};

/// Repository for user storage and retrieval.
///
/// Network stores get a fresh connection per [`UserSession`], closed when
/// the session drops; at most `max_connections` sessions are open at once.
/// An in-memory SQLite store lives in a single pinned pooled connection.
#[derive(Clone)]
pub struct UserRepository {
    backend: Backend,
}

#[derive(Clone)]
enum Backend {
    Direct {
        url: Arc<str>,
        connect_timeout: std::time::Duration,
        slots: Arc<Semaphore>,
    },
    Memory(AnyPool),
}

impl UserRepository {
    /// Create a repository without opening any connection yet.
    ///
    /// The first [`session`](Self::session) call connects; an unreachable
    /// store surfaces there as [`Error::Connection`].
    ///
    /// # Errors
    ///
    /// Returns an error if the connection URL is malformed.
    pub fn connect_lazy(config: &StoreConfig) -> Result<Self> {
        sqlx::any::install_default_drivers();
        let url = config.connection_url()?;
        let backend = if config.is_in_memory() {
            Backend::Memory(memory_pool_options().connect_lazy(&url)?)
        } else {
            Backend::Direct {
                url: url.into(),
                connect_timeout: config.connect_timeout,
                slots: Arc::new(Semaphore::new(config.max_connections.max(1) as usize)),
            }
        };
        Ok(Self { backend })
    }

    /// Connect eagerly and create the schema if it doesn't exist.
    ///
    /// # Errors
    ///
    /// Returns an error if the connection fails or schema creation fails.
    pub async fn connect(config: &StoreConfig) -> Result<Self> {
        let repo = Self::connect_lazy(config)?;
        repo.initialize().await?;
        Ok(repo)
    }

    /// Create an in-memory repository for testing.
    ///
    /// # Errors
    ///
    /// Returns an error if the database connection fails or schema creation fails.
    pub async fn in_memory() -> Result<Self> {
        Self::connect(&StoreConfig::from_url("sqlite::memory:")).await
    }

    /// Create the user table if it doesn't exist.
    ///
    /// # Errors
    ///
    /// Returns an error if the store is unreachable or the DDL fails.
    pub async fn initialize(&self) -> Result<()> {
        let mut session = self.session().await?;
        let ddl = session.dialect().create_table();
        sqlx::query(ddl).execute(session.conn.get()).await?;
        info!("User table ready ({:?})", session.dialect());
        Ok(())
    }

    /// Open a connection for one operation.
    ///
    /// A refused or failed connect is returned at once, without retrying.
    /// The connection is released when the session is dropped.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Connection`] if no connection can be established,
    /// or [`Error::Config`] for an unsupported backend.
    pub async fn session(&self) -> Result<UserSession> {
        let conn = match &self.backend {
            Backend::Memory(pool) => {
                SessionConn::Pooled(pool.acquire().await.map_err(Error::Connection)?)
            }
            Backend::Direct {
                url,
                connect_timeout,
                slots,
            } => {
                let permit = Arc::clone(slots)
                    .acquire_owned()
                    .await
                    .map_err(|_| Error::Connection(sqlx::Error::PoolClosed))?;
                let conn = tokio::time::timeout(*connect_timeout, AnyConnection::connect(url))
                    .await
                    .map_err(|_| {
                        Error::Connection(sqlx::Error::Io(std::io::Error::new(
                            std::io::ErrorKind::TimedOut,
                            "connection attempt timed out",
                        )))
                    })?
                    .map_err(Error::Connection)?;
                SessionConn::Direct(conn, permit)
            }
        };

        let name = conn.backend_name();
        let dialect = Dialect::from_backend_name(name)
            .ok_or_else(|| Error::Config(format!("unsupported database backend: {name}")))?;
        Ok(UserSession { conn, dialect })
    }

    /// Refuse new sessions and close the in-memory pool.
    pub async fn close(&self) {
        match &self.backend {
            Backend::Memory(pool) => pool.close().await,
            Backend::Direct { slots, .. } => slots.close(),
        }
    }
}

// Each SQLite memory connection is its own database; pin exactly one.
fn memory_pool_options() -> AnyPoolOptions {
    AnyPoolOptions::new()
        .max_connections(1)
        .min_connections(1)
        .idle_timeout(None)
        .max_lifetime(None)
}

enum SessionConn {
    Pooled(PoolConnection<sqlx::Any>),
    Direct(AnyConnection, OwnedSemaphorePermit),
}

impl SessionConn {
    fn get(&mut self) -> &mut AnyConnection {
        match self {
            Self::Pooled(conn) => &mut **conn,
            Self::Direct(conn, _) => conn,
        }
    }

    fn backend_name(&self) -> &str {
        match self {
            Self::Pooled(conn) => conn.backend_name(),
            Self::Direct(conn, _) => conn.backend_name(),
        }
    }
}

/// Column metadata for the debug snapshot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ColumnInfo {
    /// Column name.
    #[serde(rename = "Field")]
    pub name: String,
    /// Declared type.
    #[serde(rename = "Type")]
    pub data_type: String,
    /// `"YES"` or `"NO"`.
    #[serde(rename = "Null")]
    pub nullable: String,
    /// `"PRI"`, `"UNI"` or empty.
    #[serde(rename = "Key")]
    pub key: String,
}

/// One store connection, scoped to a single gateway operation.
pub struct UserSession {
    conn: SessionConn,
    dialect: Dialect,
}

impl UserSession {
    /// Backend of the underlying connection.
    #[must_use]
    pub const fn dialect(&self) -> Dialect {
        self.dialect
    }

    /// Whether a record already holds `value` in a unique column.
    ///
    /// Only [`Field::Username`], [`Field::Email`] and [`Field::Phone`] are
    /// unique; other fields always report `false`.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn exists(&mut self, field: Field, value: &str) -> Result<bool> {
        let sql = match field {
            Field::Username => "SELECT user_id FROM user_info WHERE user_name = ? LIMIT 1",
            Field::Email => "SELECT user_id FROM user_info WHERE email = ? LIMIT 1",
            Field::Phone => "SELECT user_id FROM user_info WHERE phone = ? LIMIT 1",
            Field::Password | Field::Role => return Ok(false),
        };

        let row = sqlx::query(sql)
            .bind(value.to_string())
            .fetch_optional(self.conn.get())
            .await?;
        Ok(row.is_some())
    }

    /// Insert a new user and return its id.
    ///
    /// Absent optional fields are stored as NULL. The insert and the id
    /// lookup share one transaction, so a failure leaves no row behind.
    ///
    /// # Errors
    ///
    /// Returns an error if the insert fails, including unique-constraint
    /// violations (see [`Error::is_unique_violation`]).
    pub async fn insert(
        &mut self,
        user: &NewUser,
        password_hash: &str,
        created_at: DateTime<Utc>,
    ) -> Result<UserId> {
        let mut tx = self.conn.get().begin().await?;

        sqlx::query(
            r"
            INSERT INTO user_info (user_name, password_hash, email, phone, role, created_at)
            VALUES (?, ?, ?, ?, ?, ?)
            ",
        )
        .bind(user.username.clone())
        .bind(password_hash.to_string())
        .bind(user.email.clone())
        .bind(user.phone.clone())
        .bind(user.role.clone())
        .bind(created_at.timestamp())
        .execute(&mut *tx)
        .await?;

        // `last_insert_id` is not reported by every Any backend.
        let row = sqlx::query("SELECT user_id FROM user_info WHERE user_name = ?")
            .bind(user.username.clone())
            .fetch_one(&mut *tx)
            .await?;
        let id: i64 = row.try_get("user_id")?;

        tx.commit().await?;
        debug!("Inserted user row {id}");
        Ok(UserId::new(id))
    }

    /// Run a structured lookup.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn find(&mut self, query: &UserQuery) -> Result<Vec<UserRecord>> {
        let sql = query.sql();
        let mut statement = sqlx::query(&sql);
        for value in query.binds() {
            statement = statement.bind(value.to_string());
        }

        let rows = statement.fetch_all(self.conn.get()).await?;
        rows.iter().map(row_to_record).collect()
    }

    /// Count stored users.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn count(&mut self) -> Result<i64> {
        let row = sqlx::query("SELECT COUNT(*) AS total FROM user_info")
            .fetch_one(self.conn.get())
            .await?;
        Ok(row.try_get("total")?)
    }

    /// First `limit` users by id, without password hashes.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn sample(&mut self, limit: i64) -> Result<Vec<PublicUser>> {
        let rows = sqlx::query(
            r"
            SELECT user_id, user_name, email, phone, role, created_at
            FROM user_info
            ORDER BY user_id
            LIMIT ?
            ",
        )
        .bind(limit)
        .fetch_all(self.conn.get())
        .await?;

        rows.iter()
            .map(|row| {
                Ok(PublicUser {
                    id: UserId::new(row.try_get("user_id")?),
                    username: row.try_get("user_name")?,
                    email: row.try_get("email")?,
                    phone: row.try_get("phone")?,
                    role: row.try_get("role")?,
                    created_at: timestamp(row.try_get("created_at")?),
                })
            })
            .collect()
    }

    /// Names of the tables in the current database.
    ///
    /// # Errors
    ///
    /// Returns an error if the catalog query fails.
    pub async fn list_tables(&mut self) -> Result<Vec<String>> {
        let rows = sqlx::query(self.dialect.list_tables())
            .fetch_all(self.conn.get())
            .await?;
        rows.iter()
            .map(|row| row.try_get::<String, _>("name").map_err(Error::from))
            .collect()
    }

    /// Column metadata of the user table.
    ///
    /// # Errors
    ///
    /// Returns an error if the catalog query fails.
    pub async fn describe(&mut self) -> Result<Vec<ColumnInfo>> {
        let rows = sqlx::query(self.dialect.describe_user_table())
            .fetch_all(self.conn.get())
            .await?;
        rows.iter()
            .map(|row| {
                Ok(ColumnInfo {
                    name: row.try_get("name")?,
                    data_type: row.try_get("type")?,
                    nullable: row.try_get("nullable")?,
                    key: row.try_get("col_key")?,
                })
            })
            .collect()
    }
}

fn row_to_record(row: &AnyRow) -> Result<UserRecord> {
    Ok(UserRecord {
        id: UserId::new(row.try_get("user_id")?),
        username: row.try_get("user_name")?,
        password_hash: row.try_get("password_hash")?,
        email: row.try_get("email")?,
        phone: row.try_get("phone")?,
        role: row.try_get("role")?,
        created_at: timestamp(row.try_get("created_at")?),
    })
}

fn timestamp(secs: i64) -> DateTime<Utc> {
    DateTime::from_timestamp(secs, 0).unwrap_or_default()
}
