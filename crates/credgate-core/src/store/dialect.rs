//! Per-backend SQL.
//!
//! Lookups, inserts and counts are portable. Only the schema DDL and the
//! catalog queries behind the debug snapshot differ between backends.

/// Supported store backends.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Dialect {
    /// MySQL / MariaDB.
    MySql,
    /// SQLite.
    Sqlite,
}

impl Dialect {
    /// Map an `AnyConnection::backend_name` value.
    #[must_use]
    pub fn from_backend_name(name: &str) -> Option<Self> {
        match name.to_ascii_lowercase().as_str() {
            "mysql" | "mariadb" => Some(Self::MySql),
            "sqlite" => Some(Self::Sqlite),
            _ => None,
        }
    }

    /// `CREATE TABLE IF NOT EXISTS` for the user table.
    #[must_use]
    pub const fn create_table(&self) -> &'static str {
        match self {
            // Binary collation keeps the exact pass case-sensitive.
            Self::MySql => {
                r"
                CREATE TABLE IF NOT EXISTS user_info (
                    user_id BIGINT NOT NULL AUTO_INCREMENT PRIMARY KEY,
                    user_name VARCHAR(255) COLLATE utf8mb4_bin NOT NULL UNIQUE,
                    password_hash VARCHAR(255) NOT NULL,
                    email VARCHAR(255) COLLATE utf8mb4_bin NULL UNIQUE,
                    phone VARCHAR(32) COLLATE utf8mb4_bin NULL UNIQUE,
                    role VARCHAR(64) NULL,
                    created_at BIGINT NOT NULL
                ) DEFAULT CHARSET = utf8mb4
                "
            }
            Self::Sqlite => {
                r"
                CREATE TABLE IF NOT EXISTS user_info (
                    user_id INTEGER PRIMARY KEY AUTOINCREMENT,
                    user_name TEXT NOT NULL UNIQUE,
                    password_hash TEXT NOT NULL,
                    email TEXT UNIQUE,
                    phone TEXT UNIQUE,
                    role TEXT,
                    created_at INTEGER NOT NULL
                )
                "
            }
        }
    }

    /// Lists table names, one text column.
    #[must_use]
    pub const fn list_tables(&self) -> &'static str {
        match self {
            Self::MySql => {
                r"
                SELECT CAST(table_name AS CHAR) AS name
                FROM information_schema.tables
                WHERE table_schema = DATABASE()
                ORDER BY table_name
                "
            }
            Self::Sqlite => {
                r"
                SELECT name FROM sqlite_master
                WHERE type = 'table' AND name NOT LIKE 'sqlite_%'
                ORDER BY name
                "
            }
        }
    }

    /// Describes the user table as `(name, type, nullable, key)` text
    /// columns.
    #[must_use]
    pub const fn describe_user_table(&self) -> &'static str {
        match self {
            Self::MySql => {
                r"
                SELECT CAST(column_name AS CHAR) AS name,
                       CAST(column_type AS CHAR) AS type,
                       CAST(is_nullable AS CHAR) AS nullable,
                       CAST(column_key AS CHAR) AS col_key
                FROM information_schema.columns
                WHERE table_schema = DATABASE() AND table_name = 'user_info'
                ORDER BY ordinal_position
                "
            }
            Self::Sqlite => {
                r"
                SELECT name,
                       type,
                       CASE WHEN pk = 1 OR [notnull] = 1 THEN 'NO' ELSE 'YES' END AS nullable,
                       CASE WHEN pk = 1 THEN 'PRI' ELSE '' END AS col_key
                FROM pragma_table_info('user_info')
                ORDER BY cid
                "
            }
        }
    }
}
