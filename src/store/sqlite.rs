use std::path::Path;
use std::sync::Mutex;

use chrono::{DateTime, Utc};
use rusqlite::types::Type;
use rusqlite::{Connection, OptionalExtension, Row, params};

use super::schema::SCHEMA;
use super::{Ensured, NamespaceSeed, Store, WriteMode};
use crate::error::{Error, Result};
use crate::types::*;

/// Tables whose `id` column is backed by a `<table>_id_seq` sequence.
const SEQUENCED_TABLES: &[&str] = &["namespaces", "users", "projects", "personal_access_tokens"];

const TOKENS_SEQUENCE: &str = "personal_access_tokens_id_seq";

const NAMESPACE_COLUMNS: &str = "id, name, path, owner_id, type, visibility_level, \
     shared_runners_enabled, project_creation_level, organization_id, created_at, updated_at";

const USER_COLUMNS: &str =
    "id, username, email, name, encrypted_password, admin, confirmed_at, created_at, updated_at";

const TOKEN_COLUMNS: &str = "id, user_id, name, scopes, token_digest, token_lookup, revoked, \
     created_at, expires_at, last_used_at";

pub struct SqliteStore {
    conn: Mutex<Connection>,
}

impl SqliteStore {
    pub fn new<P: AsRef<Path>>(db_path: P) -> Result<Self> {
        let conn = Connection::open(db_path)?;

        conn.pragma_update(None, "foreign_keys", "ON")?;
        conn.pragma_update(None, "journal_mode", "WAL")?;

        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    fn conn(&self) -> std::sync::MutexGuard<'_, Connection> {
        self.conn.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Returns a guard to the underlying database connection.
    /// Tests and operators use this to simulate writes that bypass the
    /// id sequences, such as bulk loads.
    pub fn connection(&self) -> std::sync::MutexGuard<'_, Connection> {
        self.conn()
    }
}

fn parse_datetime(s: &str) -> DateTime<Utc> {
    DateTime::parse_from_rfc3339(s)
        .map(|dt| dt.with_timezone(&Utc))
        .or_else(|_| {
            // Handle SQLite's default datetime format: "YYYY-MM-DD HH:MM:SS"
            chrono::NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S").map(|ndt| ndt.and_utc())
        })
        .unwrap_or_else(|e| {
            tracing::error!("Invalid datetime in database: '{}' - {}", s, e);
            Utc::now()
        })
}

fn format_datetime(dt: &DateTime<Utc>) -> String {
    dt.to_rfc3339()
}

fn namespace_from_row(row: &Row<'_>) -> rusqlite::Result<Namespace> {
    let kind = row
        .get::<_, String>(4)?
        .parse::<NamespaceKind>()
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(4, Type::Text, e.into()))?;

    Ok(Namespace {
        id: row.get(0)?,
        name: row.get(1)?,
        path: row.get(2)?,
        owner_id: row.get(3)?,
        kind,
        visibility: Visibility::from_level(row.get(5)?),
        shared_runners_enabled: row.get(6)?,
        project_creation_level: row.get(7)?,
        organization_id: row.get(8)?,
        created_at: parse_datetime(&row.get::<_, String>(9)?),
        updated_at: parse_datetime(&row.get::<_, String>(10)?),
    })
}

fn user_from_row(row: &Row<'_>) -> rusqlite::Result<User> {
    Ok(User {
        id: row.get(0)?,
        username: row.get(1)?,
        email: row.get(2)?,
        name: row.get(3)?,
        encrypted_password: row.get(4)?,
        admin: row.get(5)?,
        confirmed_at: row.get::<_, Option<String>>(6)?.map(|s| parse_datetime(&s)),
        created_at: parse_datetime(&row.get::<_, String>(7)?),
        updated_at: parse_datetime(&row.get::<_, String>(8)?),
    })
}

fn token_from_row(row: &Row<'_>) -> rusqlite::Result<AccessToken> {
    Ok(AccessToken {
        id: row.get(0)?,
        user_id: row.get(1)?,
        name: row.get(2)?,
        scopes: Scopes::try_from(row.get::<_, i64>(3)?)
            .map_err(|e| rusqlite::Error::FromSqlConversionFailure(3, Type::Integer, e.into()))?,
        token_digest: row.get(4)?,
        token_lookup: row.get(5)?,
        revoked: row.get(6)?,
        created_at: parse_datetime(&row.get::<_, String>(7)?),
        expires_at: parse_datetime(&row.get::<_, String>(8)?),
        last_used_at: row.get::<_, Option<String>>(9)?.map(|s| parse_datetime(&s)),
    })
}

fn is_constraint_violation(err: &rusqlite::Error) -> bool {
    matches!(
        err,
        rusqlite::Error::SqliteFailure(e, _) if e.code == rusqlite::ErrorCode::ConstraintViolation
    )
}

/// True for a UNIQUE index violation naming `column`. Primary key clashes
/// carry a different extended code.
fn is_unique_violation(err: &rusqlite::Error, column: &str) -> bool {
    matches!(
        err,
        rusqlite::Error::SqliteFailure(e, Some(msg))
            if e.extended_code == rusqlite::ffi::SQLITE_CONSTRAINT_UNIQUE && msg.contains(column)
    )
}

fn check(mode: WriteMode, record: &impl Validate) -> Result<()> {
    if mode == WriteMode::SkipValidation {
        return Ok(());
    }
    let errors = record.errors();
    if errors.is_empty() {
        Ok(())
    } else {
        Err(Error::Validation(errors))
    }
}

impl Store for SqliteStore {
    fn initialize(&self) -> Result<()> {
        self.conn().execute_batch(SCHEMA)?;
        Ok(())
    }

    // Namespace operations

    fn get_namespace(&self, id: i64) -> Result<Option<Namespace>> {
        self.conn()
            .query_row(
                &format!("SELECT {NAMESPACE_COLUMNS} FROM namespaces WHERE id = ?1"),
                params![id],
                namespace_from_row,
            )
            .optional()
            .map_err(Error::from)
    }

    fn get_namespace_by_path(&self, path: &str) -> Result<Option<Namespace>> {
        self.conn()
            .query_row(
                &format!("SELECT {NAMESPACE_COLUMNS} FROM namespaces WHERE path = ?1"),
                params![path],
                namespace_from_row,
            )
            .optional()
            .map_err(Error::from)
    }

    fn get_user_namespace(&self, user_id: i64) -> Result<Option<Namespace>> {
        self.conn()
            .query_row(
                &format!(
                    "SELECT {NAMESPACE_COLUMNS} FROM namespaces
                     WHERE owner_id = ?1 AND type = 'User' ORDER BY id LIMIT 1"
                ),
                params![user_id],
                namespace_from_row,
            )
            .optional()
            .map_err(Error::from)
    }

    fn ensure_namespace(&self, seed: &NamespaceSeed) -> Result<Ensured<Namespace>> {
        if let Some(existing) = self.get_namespace_by_path(&seed.path)? {
            return Ok(Ensured::Existing(existing));
        }

        let now = format_datetime(&Utc::now());
        self.conn().execute(
            "INSERT INTO namespaces (id, name, path, owner_id, type, created_at, updated_at,
                 visibility_level, shared_runners_enabled, project_creation_level, organization_id)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?6, ?7, ?8, ?9, ?10)
             ON CONFLICT (id) DO UPDATE SET name = excluded.name",
            params![
                seed.id,
                seed.name,
                seed.path,
                seed.owner_id,
                seed.kind.as_str(),
                now,
                seed.visibility.level(),
                seed.shared_runners_enabled,
                seed.project_creation_level,
                seed.organization_id,
            ],
        )?;

        let namespace = self.get_namespace(seed.id)?.ok_or(Error::NotFound)?;
        if namespace.path != seed.path {
            tracing::warn!(
                id = seed.id,
                existing_path = %namespace.path,
                wanted_path = %seed.path,
                "namespace id already taken; only its name was updated"
            );
            return Ok(Ensured::Conflicting(namespace));
        }
        Ok(Ensured::Created(namespace))
    }

    // User operations

    fn get_user(&self, id: i64) -> Result<Option<User>> {
        self.conn()
            .query_row(
                &format!("SELECT {USER_COLUMNS} FROM users WHERE id = ?1"),
                params![id],
                user_from_row,
            )
            .optional()
            .map_err(Error::from)
    }

    fn get_user_by_username(&self, username: &str) -> Result<Option<User>> {
        self.conn()
            .query_row(
                &format!("SELECT {USER_COLUMNS} FROM users WHERE username = ?1"),
                params![username],
                user_from_row,
            )
            .optional()
            .map_err(Error::from)
    }

    fn ensure_user(&self, user: &NewUser, mode: WriteMode) -> Result<Ensured<User>> {
        if let Some(existing) = self.get_user_by_username(&user.username)? {
            return Ok(Ensured::Existing(existing));
        }

        check(mode, user)?;

        let id = match user.id {
            Some(id) => id,
            None => self.next_id("users_id_seq")?,
        };
        let now = format_datetime(&Utc::now());

        let result = self.conn().execute(
            "INSERT INTO users (id, username, email, name, encrypted_password, admin, confirmed_at,
                 created_at, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?8)",
            params![
                id,
                user.username,
                user.email,
                user.name,
                user.encrypted_password,
                user.admin,
                user.confirmed_at.as_ref().map(format_datetime),
                now,
            ],
        );

        match result {
            Ok(_) => {}
            Err(e) if is_constraint_violation(&e) => {
                return Err(Error::Conflict(format!(
                    "cannot create account '{}' with id {id}: {e}",
                    user.username
                )));
            }
            Err(e) => return Err(Error::from(e)),
        }

        let created = self.get_user(id)?.ok_or(Error::NotFound)?;
        Ok(Ensured::Created(created))
    }

    fn save_user(&self, user: &User, mode: WriteMode) -> Result<()> {
        check(mode, user)?;

        let rows = self.conn().execute(
            "UPDATE users SET email = ?1, name = ?2, encrypted_password = ?3, admin = ?4,
                 confirmed_at = ?5, updated_at = ?6
             WHERE id = ?7",
            params![
                user.email,
                user.name,
                user.encrypted_password,
                user.admin,
                user.confirmed_at.as_ref().map(format_datetime),
                format_datetime(&user.updated_at),
                user.id,
            ],
        )?;

        if rows == 0 {
            return Err(Error::NotFound);
        }
        Ok(())
    }

    // Token operations

    fn create_token(&self, token: &NewAccessToken) -> Result<AccessToken> {
        check(WriteMode::Validated, token)?;

        let now = Utc::now();
        let mut conn = self.conn();
        let tx = conn.transaction()?;

        let next_value: i64 = tx
            .query_row(
                "SELECT next_value FROM id_sequences WHERE name = ?1",
                params![TOKENS_SEQUENCE],
                |row| row.get(0),
            )
            .optional()?
            .ok_or_else(|| Error::SequenceNotFound(TOKENS_SEQUENCE.to_string()))?;
        let max_id: Option<i64> =
            tx.query_row("SELECT MAX(id) FROM personal_access_tokens", [], |row| row.get(0))?;

        // Rows written around the generator would otherwise collide on the primary key.
        let id = next_value.max(max_id.unwrap_or(0) + 1);
        if id != next_value {
            tracing::warn!(
                sequence = TOKENS_SEQUENCE,
                next_value,
                id,
                "sequence behind table, skipping ahead"
            );
        }

        let result = tx.execute(
            "INSERT INTO personal_access_tokens (id, user_id, name, scopes, token_digest,
                 token_lookup, created_at, expires_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
            params![
                id,
                token.user_id,
                token.name,
                i64::from(token.scopes),
                token.token_digest,
                token.token_lookup,
                format_datetime(&now),
                format_datetime(&token.expires_at),
            ],
        );

        match result {
            Ok(_) => {}
            Err(e) if is_unique_violation(&e, "token_lookup") => {
                return Err(Error::TokenLookupCollision);
            }
            Err(e) if is_constraint_violation(&e) => {
                return Err(Error::Conflict(format!(
                    "cannot create token '{}' for account {}: {e}",
                    token.name, token.user_id
                )));
            }
            Err(e) => return Err(Error::from(e)),
        }

        tx.execute(
            "UPDATE id_sequences SET next_value = ?1 WHERE name = ?2",
            params![id + 1, TOKENS_SEQUENCE],
        )?;
        tx.commit()?;

        Ok(AccessToken {
            id,
            user_id: token.user_id,
            name: token.name.clone(),
            scopes: token.scopes,
            token_digest: token.token_digest.clone(),
            token_lookup: token.token_lookup.clone(),
            revoked: false,
            created_at: now,
            expires_at: token.expires_at,
            last_used_at: None,
        })
    }

    fn list_user_tokens(&self, user_id: i64) -> Result<Vec<AccessToken>> {
        let conn = self.conn();
        let mut stmt = conn.prepare(&format!(
            "SELECT {TOKEN_COLUMNS} FROM personal_access_tokens WHERE user_id = ?1 ORDER BY id"
        ))?;

        let rows = stmt.query_map(params![user_id], token_from_row)?;

        rows.collect::<std::result::Result<Vec<_>, _>>()
            .map_err(Error::from)
    }

    // Sequence operations

    fn next_id(&self, sequence: &str) -> Result<i64> {
        let mut conn = self.conn();
        let tx = conn.transaction()?;

        let value: i64 = tx
            .query_row(
                "SELECT next_value FROM id_sequences WHERE name = ?1",
                params![sequence],
                |row| row.get(0),
            )
            .optional()?
            .ok_or_else(|| Error::SequenceNotFound(sequence.to_string()))?;

        tx.execute(
            "UPDATE id_sequences SET next_value = ?1 WHERE name = ?2",
            params![value + 1, sequence],
        )?;
        tx.commit()?;

        Ok(value)
    }

    fn sequence_value(&self, sequence: &str) -> Result<i64> {
        self.conn()
            .query_row(
                "SELECT next_value FROM id_sequences WHERE name = ?1",
                params![sequence],
                |row| row.get(0),
            )
            .optional()?
            .ok_or_else(|| Error::SequenceNotFound(sequence.to_string()))
    }

    fn set_sequence(&self, sequence: &str, next_value: i64) -> Result<()> {
        if next_value < 1 {
            return Err(Error::Config(format!(
                "sequence value must be positive, got {next_value}"
            )));
        }

        let rows = self.conn().execute(
            "UPDATE id_sequences SET next_value = ?1 WHERE name = ?2",
            params![next_value, sequence],
        )?;

        if rows == 0 {
            return Err(Error::SequenceNotFound(sequence.to_string()));
        }
        Ok(())
    }

    fn max_id(&self, table: &str) -> Result<Option<i64>> {
        // Table names cannot be bound as parameters; only known tables are interpolated.
        if !SEQUENCED_TABLES.contains(&table) {
            return Err(Error::Config(format!("unknown table '{table}'")));
        }

        self.conn()
            .query_row(&format!("SELECT MAX(id) FROM {table}"), [], |row| row.get(0))
            .map_err(Error::from)
    }
}
