//! User Storage
//! Mission: Read staff accounts (and their joined role names) from SQLite

use crate::{
    access::Role,
    auth::{models::UserRecord, password::PasswordVerifier},
    db::{DbError, DbPool},
};
use anyhow::{Context, Result};
use chrono::Utc;
use rusqlite::{params, OptionalExtension, Row};
use tracing::{info, warn};

const SCHEMA_SQL: &str = r#"
PRAGMA journal_mode = WAL;

CREATE TABLE IF NOT EXISTS roles (
    id INTEGER PRIMARY KEY,
    name TEXT UNIQUE NOT NULL
);

CREATE TABLE IF NOT EXISTS users (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    name TEXT NOT NULL,
    email TEXT UNIQUE NOT NULL,
    password_hash TEXT NOT NULL,
    role_id INTEGER NOT NULL REFERENCES roles(id),
    created_at TEXT NOT NULL
);
"#;

const SELECT_USER_SQL: &str = "SELECT u.id, u.name, u.email, u.password_hash, r.name
     FROM users u JOIN roles r ON r.id = u.role_id";

/// Accounts created by `seed-users`: (name, email, password, role)
pub const DEMO_ACCOUNTS: &[(&str, &str, &str, Role)] = &[
    ("Admin User", "admin@campus.edu", "admin123", Role::Admin),
    ("Dean Johnson", "dean@campus.edu", "dean123", Role::Dean),
    ("Prof. Smith", "teacher@campus.edu", "teacher123", Role::Teacher),
    ("Jane Registrar", "registrar@campus.edu", "registrar123", Role::Registrar),
    ("Mark Librarian", "librarian@campus.edu", "library123", Role::Librarian),
];

/// Stable role ids; existing databases reference them by number
fn role_id(role: Role) -> i64 {
    match role {
        Role::Admin => 1,
        Role::Dean => 2,
        Role::Teacher => 3,
        Role::Registrar => 4,
        Role::Librarian => 5,
    }
}

fn map_record(row: &Row<'_>) -> rusqlite::Result<UserRecord> {
    Ok(UserRecord {
        id: row.get(0)?,
        name: row.get(1)?,
        email: row.get(2)?,
        password_hash: row.get(3)?,
        role_name: row.get(4)?,
    })
}

/// Credential store. The login path only reads from it.
#[derive(Clone)]
pub struct UserStore {
    pool: DbPool,
}

impl UserStore {
    /// Create the store and initialize the schema
    pub async fn new(pool: DbPool) -> Result<Self> {
        let store = Self { pool };
        store.init_db().await?;
        Ok(store)
    }

    async fn init_db(&self) -> Result<()> {
        self.pool
            .with_conn(|conn| {
                conn.execute_batch(SCHEMA_SQL)?;
                for role in Role::ALL {
                    conn.execute(
                        "INSERT OR IGNORE INTO roles (id, name) VALUES (?1, ?2)",
                        params![role_id(role), role.as_str()],
                    )?;
                }
                Ok(())
            })
            .await
            .context("Failed to initialize credential store schema")?;
        Ok(())
    }

    /// Find a user by exact (case-sensitive) email
    pub async fn get_user_by_email(&self, email: &str) -> Result<Option<UserRecord>, DbError> {
        let email = email.to_string();
        self.pool
            .with_conn(move |conn| {
                conn.query_row(
                    &format!("{SELECT_USER_SQL} WHERE u.email = ?1"),
                    params![email],
                    map_record,
                )
                .optional()
            })
            .await
    }

    /// Insert a provisioned account. `password_hash` must already be hashed.
    pub async fn create_user(
        &self,
        name: &str,
        email: &str,
        password_hash: String,
        role: Role,
    ) -> Result<UserRecord> {
        let (name, email) = (name.to_string(), email.to_string());
        let created_at = Utc::now().to_rfc3339();

        let record = self
            .pool
            .with_conn(move |conn| {
                conn.execute(
                    "INSERT INTO users (name, email, password_hash, role_id, created_at)
                     VALUES (?1, ?2, ?3, ?4, ?5)",
                    params![name, email, password_hash, role_id(role), created_at],
                )?;
                let id = conn.last_insert_rowid();
                conn.query_row(
                    &format!("{SELECT_USER_SQL} WHERE u.id = ?1"),
                    params![id],
                    map_record,
                )
            })
            .await
            .context("Failed to insert user")?;

        info!("✅ Created user: {} ({})", record.email, record.role_name);
        Ok(record)
    }

    /// Hash of the most recently created account, if any
    pub async fn sample_password_hash(&self) -> Result<Option<String>> {
        self.pool
            .with_conn(|conn| {
                conn.query_row(
                    "SELECT password_hash FROM users ORDER BY id DESC LIMIT 1",
                    [],
                    |row| row.get(0),
                )
                .optional()
            })
            .await
            .context("Failed to read a stored password hash")
    }

    pub async fn list_users(&self) -> Result<Vec<UserRecord>> {
        let users = self
            .pool
            .with_conn(|conn| {
                let mut stmt = conn.prepare(&format!("{SELECT_USER_SQL} ORDER BY u.id"))?;
                let rows = stmt.query_map([], map_record)?;
                rows.collect::<rusqlite::Result<Vec<_>>>()
            })
            .await
            .context("Failed to list users")?;
        Ok(users)
    }

    /// Provision the demo accounts that do not exist yet. Returns how many were created.
    pub async fn seed_demo_users(&self, verifier: &PasswordVerifier) -> Result<usize> {
        let mut created = 0;
        for (name, email, password, role) in DEMO_ACCOUNTS {
            if self.get_user_by_email(email).await?.is_some() {
                continue;
            }
            let hash = verifier.hash(password.to_string()).await?;
            self.create_user(name, email, hash, *role).await?;
            created += 1;
        }

        if created > 0 {
            warn!("⚠️  {} demo account(s) seeded with well-known passwords, CHANGE THEM IN PRODUCTION!", created);
        }
        Ok(created)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{auth::password::BCRYPT_MIN_COST, db::PoolConfig};
    use tempfile::NamedTempFile;

    async fn create_test_store() -> (UserStore, DbPool, NamedTempFile) {
        let temp_file = NamedTempFile::new().unwrap();
        let pool = DbPool::open(temp_file.path().to_str().unwrap(), PoolConfig::default()).unwrap();
        let store = UserStore::new(pool.clone()).await.unwrap();
        (store, pool, temp_file)
    }

    #[tokio::test]
    async fn test_create_and_retrieve_user() {
        let (store, _pool, _temp) = create_test_store().await;

        let created = store
            .create_user("Prof. Smith", "teacher@campus.edu", "hash".into(), Role::Teacher)
            .await
            .unwrap();
        assert_eq!(created.role_name, "teacher");

        let found = store
            .get_user_by_email("teacher@campus.edu")
            .await
            .unwrap()
            .unwrap();
        assert_eq!(found.id, created.id);
        assert_eq!(found.name, "Prof. Smith");
        assert_eq!(found.password_hash, "hash");
    }

    #[tokio::test]
    async fn test_email_lookup_is_exact() {
        let (store, _pool, _temp) = create_test_store().await;
        store
            .create_user("Dean", "dean@campus.edu", "hash".into(), Role::Dean)
            .await
            .unwrap();

        assert!(store.get_user_by_email("DEAN@campus.edu").await.unwrap().is_none());
        assert!(store.get_user_by_email("dean@campus.edu ").await.unwrap().is_none());
        assert!(store.get_user_by_email("nobody@campus.edu").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_duplicate_email_rejected() {
        let (store, _pool, _temp) = create_test_store().await;
        store
            .create_user("A", "a@campus.edu", "hash".into(), Role::Teacher)
            .await
            .unwrap();
        assert!(store
            .create_user("B", "a@campus.edu", "hash".into(), Role::Dean)
            .await
            .is_err());
    }

    #[tokio::test]
    async fn test_role_name_comes_from_roles_table() {
        let (store, pool, _temp) = create_test_store().await;
        pool.with_conn(|conn| {
            conn.execute("INSERT INTO roles (id, name) VALUES (9, 'student')", [])?;
            conn.execute(
                "INSERT INTO users (name, email, password_hash, role_id, created_at)
                 VALUES ('S', 's@campus.edu', 'hash', 9, 'now')",
                [],
            )
        })
        .await
        .unwrap();

        let record = store.get_user_by_email("s@campus.edu").await.unwrap().unwrap();
        assert_eq!(record.role_name, "student");
        assert!(record.into_user().is_none());
    }

    #[tokio::test]
    async fn test_seed_demo_users_is_idempotent() {
        let (store, _pool, _temp) = create_test_store().await;
        let verifier = PasswordVerifier::new(BCRYPT_MIN_COST).unwrap();

        assert_eq!(store.seed_demo_users(&verifier).await.unwrap(), DEMO_ACCOUNTS.len());
        assert_eq!(store.seed_demo_users(&verifier).await.unwrap(), 0);

        let users = store.list_users().await.unwrap();
        assert_eq!(users.len(), DEMO_ACCOUNTS.len());
        assert_eq!(users[0].email, "admin@campus.edu");
        assert_eq!(users[0].role_name, "admin");
    }

    #[tokio::test]
    async fn test_sample_hash_calibrates_verifier() {
        let (store, _pool, _temp) = create_test_store().await;
        assert!(store.sample_password_hash().await.unwrap().is_none());

        let hash = bcrypt::hash("teacher123", 5).unwrap();
        store
            .create_user("Prof. Smith", "teacher@campus.edu", hash.clone(), Role::Teacher)
            .await
            .unwrap();
        let sample = store.sample_password_hash().await.unwrap();
        assert_eq!(sample.as_deref(), Some(hash.as_str()));

        let verifier = PasswordVerifier::calibrated(BCRYPT_MIN_COST, sample.as_deref()).unwrap();
        assert_eq!(verifier.dummy_cost(), 5);
    }
}
