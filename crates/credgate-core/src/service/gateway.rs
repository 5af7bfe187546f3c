//! Credential store gateway.
//!
//! Registration and credential validation on top of [`UserRepository`].
//! Every operation acquires one session, runs its queries and releases
//! the connection when it returns, on success and error paths alike.

use chrono::Utc;
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::user::{
    ColumnInfo, CredentialInput, Field, MatchPass, NewUser, PasswordHasher, PublicUser, UserId,
    UserQuery, UserRecord, UserRepository, UserSession, ValidatedUser, normalize_credentials,
    normalize_registration,
};
use crate::{Error, Result};

/// Number of rows included in a [`StoreSnapshot`].
pub const SNAPSHOT_SAMPLE_SIZE: i64 = 5;

/// A completed registration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Registered {
    /// Id of the new record.
    pub id: UserId,
    /// Username as stored.
    pub username: String,
}

impl Registered {
    /// Confirmation shown to the caller.
    #[must_use]
    pub fn message(&self) -> String {
        format!("Registration successful! Welcome, {}!", self.username)
    }
}

/// Development view of the store contents.
#[derive(Debug, Clone, Serialize)]
pub struct StoreSnapshot {
    /// Backend the snapshot was taken from.
    pub backend: String,
    /// Tables in the current database.
    pub tables: Vec<String>,
    /// Columns of the user table.
    pub user_info_columns: Vec<ColumnInfo>,
    /// First few users, public fields only.
    pub sample_users: Vec<PublicUser>,
    /// Total number of users.
    pub total_users: i64,
}

/// Registration and validation service.
#[derive(Clone)]
pub struct CredentialGateway {
    repo: UserRepository,
    hasher: PasswordHasher,
}

impl CredentialGateway {
    /// Create a gateway with the default password hashing cost.
    #[must_use]
    pub fn new(repo: UserRepository) -> Self {
        Self {
            repo,
            hasher: PasswordHasher::default(),
        }
    }

    /// Builder: use a specific password hasher.
    #[must_use]
    pub fn with_hasher(mut self, hasher: PasswordHasher) -> Self {
        self.hasher = hasher;
        self
    }

    /// The underlying repository.
    #[must_use]
    pub const fn repository(&self) -> &UserRepository {
        &self.repo
    }

    /// Register a new account.
    ///
    /// Username, email and phone are checked for collisions in that
    /// order; the first one found is reported.
    ///
    /// # Errors
    ///
    /// - [`Error::MalformedInput`] if username or password is missing
    /// - [`Error::DuplicateField`] on the first colliding unique field
    /// - [`Error::Connection`] / [`Error::Database`] for store failures
    pub async fn register(&self, input: &CredentialInput) -> Result<Registered> {
        let user = normalize_registration(input).map_err(Error::MalformedInput)?;

        info!("Attempting to add user '{}'", user.username);
        if let Some(email) = &user.email {
            debug!("Email provided: '{email}'");
        }
        if let Some(phone) = &user.phone {
            debug!("Phone provided: '{phone}'");
        }

        let mut session = self.repo.session().await?;

        if let Some(field) = first_duplicate(&mut session, &user).await? {
            warn!("Registration of '{}' rejected: {field} already exists", user.username);
            return Err(Error::DuplicateField(field));
        }

        let hash = self.hash(user.password.clone()).await?;

        let id = match session.insert(&user, &hash, Utc::now()).await {
            Ok(id) => id,
            Err(e) if e.is_unique_violation() => {
                // Lost a race with a concurrent registration.
                let field = conflicting_field(&mut session, &user).await?;
                warn!("Registration of '{}' rejected on insert: {field} already exists", user.username);
                return Err(Error::DuplicateField(field));
            }
            Err(e) => return Err(e),
        };

        info!("User '{}' added successfully (id {id})", user.username);
        Ok(Registered {
            id,
            username: user.username,
        })
    }

    /// Validate credentials against stored records.
    ///
    /// Runs an exact-username pass, then a case-insensitive fallback.
    /// Supplied email, phone and role must match exactly in both passes.
    ///
    /// # Errors
    ///
    /// - [`Error::MalformedInput`] if username or password is missing
    /// - [`Error::InvalidCredentials`] if no record matches
    /// - [`Error::Connection`] / [`Error::Database`] for store failures
    pub async fn validate(&self, input: &CredentialInput) -> Result<ValidatedUser> {
        let creds = normalize_credentials(input).map_err(Error::MalformedInput)?;

        info!("Attempting to validate user '{}'", creds.username);
        let mut session = self.repo.session().await?;

        let exact = UserQuery::exact(&creds);
        debug!(
            "Exact lookup with filters {:?}",
            exact.filters().iter().map(|f| f.column()).collect::<Vec<_>>()
        );
        let candidates = session.find(&exact).await?;
        let checked: Vec<UserId> = candidates.iter().map(|r| r.id).collect();

        if let Some(record) = self.verify_any(&creds.password, candidates).await? {
            info!("User validation successful for '{}'", record.username);
            return Ok(ValidatedUser {
                user: record.to_public(),
                matched_by: MatchPass::Exact,
            });
        }

        let candidates: Vec<UserRecord> = session
            .find(&UserQuery::case_insensitive(&creds))
            .await?
            .into_iter()
            .filter(|r| !checked.contains(&r.id))
            .collect();

        if let Some(record) = self.verify_any(&creds.password, candidates).await? {
            info!(
                "User validation successful for '{}' (case-insensitive)",
                record.username
            );
            return Ok(ValidatedUser {
                user: record.to_public(),
                matched_by: MatchPass::CaseInsensitive,
            });
        }

        info!("No matching user found for '{}'", creds.username);
        Err(Error::InvalidCredentials)
    }

    /// Count stored users; doubles as a connectivity probe.
    ///
    /// # Errors
    ///
    /// Returns an error if the store is unreachable or the query fails.
    pub async fn user_count(&self) -> Result<i64> {
        let mut session = self.repo.session().await?;
        session.count().await
    }

    /// Collect tables, columns, sample users and row count.
    ///
    /// # Errors
    ///
    /// Returns an error if the store is unreachable or a query fails.
    pub async fn snapshot(&self) -> Result<StoreSnapshot> {
        let mut session = self.repo.session().await?;
        Ok(StoreSnapshot {
            backend: format!("{:?}", session.dialect()),
            tables: session.list_tables().await?,
            user_info_columns: session.describe().await?,
            sample_users: session.sample(SNAPSHOT_SAMPLE_SIZE).await?,
            total_users: session.count().await?,
        })
    }

    async fn hash(&self, password: String) -> Result<String> {
        let hasher = self.hasher.clone();
        tokio::task::spawn_blocking(move || hasher.hash(&password)).await?
    }

    async fn verify_any(
        &self,
        password: &str,
        candidates: Vec<UserRecord>,
    ) -> Result<Option<UserRecord>> {
        if candidates.is_empty() {
            return Ok(None);
        }
        let hasher = self.hasher.clone();
        let password = password.to_string();
        let found = tokio::task::spawn_blocking(move || {
            candidates
                .into_iter()
                .find(|record| hasher.verify(&password, &record.password_hash))
        })
        .await?;
        Ok(found)
    }
}

async fn first_duplicate(session: &mut UserSession, user: &NewUser) -> Result<Option<Field>> {
    let unique = [
        (Field::Username, Some(&user.username)),
        (Field::Email, user.email.as_ref()),
        (Field::Phone, user.phone.as_ref()),
    ];
    for (field, value) in unique {
        if let Some(value) = value
            && session.exists(field, value).await?
        {
            return Ok(Some(field));
        }
    }
    Ok(None)
}

/// The unique field behind an insert's constraint violation.
async fn conflicting_field(session: &mut UserSession, user: &NewUser) -> Result<Field> {
    Ok(first_duplicate(session, user).await?.unwrap_or(Field::Username))
}
