//! Structured lookup filters.
//!
//! A [`UserQuery`] renders a `SELECT` against the user table from static
//! SQL fragments only. Caller-supplied values are always bound as
//! parameters, never spliced into the statement text.

use super::model::Credentials;

/// Columns returned by every user lookup, in row order.
pub(crate) const USER_COLUMNS: &str =
    "user_id, user_name, password_hash, email, phone, role, created_at";

/// How the username predicate compares.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UsernameMatch {
    /// Case-sensitive equality.
    Exact(String),
    /// Equality after lowercasing both sides.
    ///
    /// SQLite's `LOWER()` folds ASCII letters only; MySQL folds per the
    /// column's Unicode collation.
    CaseInsensitive(String),
}

impl UsernameMatch {
    const fn predicate(&self) -> &'static str {
        match self {
            Self::Exact(_) => "user_name = ?",
            Self::CaseInsensitive(_) => "LOWER(user_name) = LOWER(?)",
        }
    }

    fn value(&self) -> &str {
        match self {
            Self::Exact(v) | Self::CaseInsensitive(v) => v,
        }
    }
}

/// An additional exact-match constraint on an optional column.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CredentialFilter {
    /// `email = ?`
    Email(String),
    /// `phone = ?`
    Phone(String),
    /// `role = ?`
    Role(String),
}

impl CredentialFilter {
    /// Column the filter constrains.
    #[must_use]
    pub const fn column(&self) -> &'static str {
        match self {
            Self::Email(_) => "email",
            Self::Phone(_) => "phone",
            Self::Role(_) => "role",
        }
    }

    const fn predicate(&self) -> &'static str {
        match self {
            Self::Email(_) => "email = ?",
            Self::Phone(_) => "phone = ?",
            Self::Role(_) => "role = ?",
        }
    }

    fn value(&self) -> &str {
        match self {
            Self::Email(v) | Self::Phone(v) | Self::Role(v) => v,
        }
    }
}

/// A user lookup: one username predicate plus any number of filters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserQuery {
    username: UsernameMatch,
    filters: Vec<CredentialFilter>,
}

impl UserQuery {
    /// Start a query on the given username predicate.
    #[must_use]
    pub const fn new(username: UsernameMatch) -> Self {
        Self {
            username,
            filters: Vec::new(),
        }
    }

    /// Add a filter.
    #[must_use]
    pub fn filter(mut self, filter: CredentialFilter) -> Self {
        self.filters.push(filter);
        self
    }

    /// Add a filter when a value is present.
    #[must_use]
    pub fn filter_opt(
        self,
        value: Option<&str>,
        make: impl FnOnce(String) -> CredentialFilter,
    ) -> Self {
        match value {
            Some(v) => self.filter(make(v.to_string())),
            None => self,
        }
    }

    /// Exact-pass query for a credential check.
    #[must_use]
    pub fn exact(credentials: &Credentials) -> Self {
        Self::new(UsernameMatch::Exact(credentials.username.clone()))
            .with_optional_filters(credentials)
    }

    /// Case-insensitive fallback query for a credential check.
    #[must_use]
    pub fn case_insensitive(credentials: &Credentials) -> Self {
        Self::new(UsernameMatch::CaseInsensitive(credentials.username.clone()))
            .with_optional_filters(credentials)
    }

    fn with_optional_filters(self, credentials: &Credentials) -> Self {
        self.filter_opt(credentials.email.as_deref(), CredentialFilter::Email)
            .filter_opt(credentials.phone.as_deref(), CredentialFilter::Phone)
            .filter_opt(credentials.role.as_deref(), CredentialFilter::Role)
    }

    /// The filters in bind order.
    #[must_use]
    pub fn filters(&self) -> &[CredentialFilter] {
        &self.filters
    }

    /// Render the statement text.
    #[must_use]
    pub fn sql(&self) -> String {
        let mut sql = format!(
            "SELECT {USER_COLUMNS} FROM user_info WHERE {}",
            self.username.predicate()
        );
        for filter in &self.filters {
            sql.push_str(" AND ");
            sql.push_str(filter.predicate());
        }
        sql.push_str(" ORDER BY user_id");
        sql
    }

    /// Values to bind, in placeholder order.
    #[must_use]
    pub fn binds(&self) -> Vec<&str> {
        std::iter::once(self.username.value())
            .chain(self.filters.iter().map(CredentialFilter::value))
            .collect()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn creds() -> Credentials {
        Credentials {
            username: "Alice".to_string(),
            password: "pw".to_string(),
            email: Some("a@example.com".to_string()),
            phone: None,
            role: Some("admin".to_string()),
        }
    }

    #[test]
    fn exact_query_without_filters() {
        let query = UserQuery::new(UsernameMatch::Exact("bob".to_string()));
        assert_eq!(
            query.sql(),
            "SELECT user_id, user_name, password_hash, email, phone, role, created_at \
             FROM user_info WHERE user_name = ? ORDER BY user_id"
        );
        assert_eq!(query.binds(), vec!["bob"]);
    }

    #[test]
    fn filters_follow_username_in_order() {
        let query = UserQuery::exact(&creds());
        assert!(query.sql().ends_with("WHERE user_name = ? AND email = ? AND role = ? ORDER BY user_id"));
        assert_eq!(query.binds(), vec!["Alice", "a@example.com", "admin"]);
        assert_eq!(query.filters().len(), 2);
    }

    #[test]
    fn case_insensitive_only_folds_username() {
        let sql = UserQuery::case_insensitive(&creds()).sql();
        assert!(sql.contains("LOWER(user_name) = LOWER(?)"));
        assert!(sql.contains("AND email = ?"));
        assert!(!sql.contains("LOWER(email)"));
    }

    #[test]
    fn values_never_reach_sql_text() {
        let hostile = "x' OR '1'='1";
        let query = UserQuery::new(UsernameMatch::Exact(hostile.to_string()))
            .filter(CredentialFilter::Phone(hostile.to_string()));
        assert!(!query.sql().contains(hostile));
        assert_eq!(query.binds(), vec![hostile, hostile]);
        assert_eq!(query.sql().matches('?').count(), query.binds().len());
    }

    #[test]
    fn filter_columns() {
        assert_eq!(CredentialFilter::Email(String::new()).column(), "email");
        assert_eq!(CredentialFilter::Phone(String::new()).column(), "phone");
        assert_eq!(CredentialFilter::Role(String::new()).column(), "role");
    }
}
