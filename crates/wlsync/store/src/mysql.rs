//! MySQL adapter for the binding store.
//!
//! Uses the deployed `whitelist` table as-is:
//!
//! | column | meaning |
//! |--------|---------|
//! | `QQ`   | chat account, primary key |
//! | `ID`   | display name |
//! | `UUID` | identity key as 16 raw bytes, unique |
//! | `Time` | when the binding was made (`DATE` or `DATETIME`) |
//!
//! The table is created when missing. An existing table without these
//! columns is rejected at startup.

use crate::traits::BindingStore;
use crate::{StoreError, StoreResult};
use async_trait::async_trait;
use chrono::{NaiveDate, NaiveDateTime, Utc};
use sqlx::mysql::{MySqlPool, MySqlPoolOptions, MySqlRow};
use sqlx::Row;
use std::time::Duration;
use wlsync_types::{Account, Binding, DisplayName, IdentityKey};

/// Columns every query relies on
const REQUIRED_COLUMNS: [&str; 4] = ["QQ", "ID", "UUID", "Time"];

/// MySQL-backed binding store
#[derive(Debug, Clone)]
pub struct MySqlBindingStore {
    pool: MySqlPool,
}

impl MySqlBindingStore {
    /// Connect with explicit pool parameters and prepare the schema.
    pub async fn connect_with_options(
        database_url: &str,
        max_connections: u32,
        connect_timeout_secs: u64,
    ) -> StoreResult<Self> {
        let pool = MySqlPoolOptions::new()
            .max_connections(max_connections)
            .acquire_timeout(Duration::from_secs(connect_timeout_secs))
            .connect(database_url)
            .await
            .map_err(|e| StoreError::Connection(format!("failed to connect mysql: {e}")))?;
        Self::from_pool(pool).await
    }

    /// Create adapter from an existing pool.
    pub async fn from_pool(pool: MySqlPool) -> StoreResult<Self> {
        let store = Self { pool };
        store.init_schema().await?;
        store.verify_schema().await?;
        Ok(store)
    }

    async fn init_schema(&self) -> StoreResult<()> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS `whitelist` (
                `QQ` BIGINT NOT NULL PRIMARY KEY,
                `ID` VARCHAR(16) NOT NULL,
                `UUID` BINARY(16) NOT NULL,
                `Time` DATETIME NOT NULL,
                UNIQUE KEY `whitelist_uuid` (`UUID`)
            )
            "#,
        )
        .execute(&self.pool)
        .await
        .map_err(|e| StoreError::Query(format!("schema init failed: {e}")))?;
        Ok(())
    }

    async fn verify_schema(&self) -> StoreResult<()> {
        let rows = sqlx::query(
            r#"
            SELECT COLUMN_NAME AS name FROM information_schema.COLUMNS
            WHERE TABLE_SCHEMA = DATABASE() AND TABLE_NAME = 'whitelist'
            "#,
        )
        .fetch_all(&self.pool)
        .await
        .map_err(map_sqlx_error)?;

        let present = rows
            .iter()
            .map(|r| r.try_get::<String, _>("name"))
            .collect::<Result<Vec<_>, _>>()
            .map_err(|e| StoreError::InvalidData(e.to_string()))?;

        let missing = missing_columns(&present);
        if !missing.is_empty() {
            return Err(StoreError::InvalidData(format!(
                "table whitelist lacks columns {}",
                missing.join(", ")
            )));
        }

        tracing::debug!("binding store schema ready");
        Ok(())
    }
}

/// Required columns absent from `present`. MySQL column names are
/// case-insensitive.
fn missing_columns(present: &[String]) -> Vec<&'static str> {
    REQUIRED_COLUMNS
        .iter()
        .copied()
        .filter(|required| !present.iter().any(|c| c.eq_ignore_ascii_case(required)))
        .collect()
}

fn account_param(account: Account) -> StoreResult<i64> {
    i64::try_from(account.get())
        .map_err(|_| StoreError::InvalidData(format!("account {account} out of range")))
}

#[async_trait]
impl BindingStore for MySqlBindingStore {
    async fn find_by_identity(&self, identity: &IdentityKey) -> StoreResult<Option<Account>> {
        let row = sqlx::query("SELECT `QQ` FROM `whitelist` WHERE `UUID` = ?")
            .bind(identity.as_bytes().as_slice())
            .fetch_optional(&self.pool)
            .await
            .map_err(map_sqlx_error)?;

        row.as_ref().map(row_account).transpose()
    }

    async fn find_by_account(&self, account: Account) -> StoreResult<Option<Binding>> {
        let row = sqlx::query(
            "SELECT `QQ`, `ID`, `UUID`, `Time` FROM `whitelist` WHERE `QQ` = ?",
        )
        .bind(account_param(account)?)
        .fetch_optional(&self.pool)
        .await
        .map_err(map_sqlx_error)?;

        row.as_ref().map(row_to_binding).transpose()
    }

    async fn insert(
        &self,
        account: Account,
        display_name: &DisplayName,
        identity: &IdentityKey,
    ) -> StoreResult<Binding> {
        let created_at = Utc::now();

        sqlx::query(
            r#"
            INSERT INTO `whitelist` (`QQ`, `ID`, `UUID`, `Time`)
            VALUES (?, ?, ?, ?)
            "#,
        )
        .bind(account_param(account)?)
        .bind(display_name.as_str())
        .bind(identity.as_bytes().as_slice())
        .bind(created_at.naive_utc())
        .execute(&self.pool)
        .await
        .map_err(map_sqlx_error)?;

        Ok(Binding {
            account,
            display_name: display_name.clone(),
            identity: *identity,
            created_at,
        })
    }

    async fn delete(&self, identity: &IdentityKey) -> StoreResult<bool> {
        let result = sqlx::query("DELETE FROM `whitelist` WHERE `UUID` = ?")
            .bind(identity.as_bytes().as_slice())
            .execute(&self.pool)
            .await
            .map_err(map_sqlx_error)?;

        Ok(result.rows_affected() > 0)
    }

    async fn list(&self) -> StoreResult<Vec<Binding>> {
        let rows = sqlx::query(
            "SELECT `QQ`, `ID`, `UUID`, `Time` FROM `whitelist` ORDER BY `Time`, `QQ`",
        )
        .fetch_all(&self.pool)
        .await
        .map_err(map_sqlx_error)?;

        rows.iter().map(row_to_binding).collect()
    }
}

/// `QQ` may be declared signed or unsigned.
fn row_account(row: &MySqlRow) -> StoreResult<Account> {
    if let Ok(signed) = row.try_get::<i64, _>("QQ") {
        return u64::try_from(signed)
            .map(Account::new)
            .map_err(|_| StoreError::InvalidData(format!("negative account {signed}")));
    }
    row.try_get::<u64, _>("QQ")
        .map(Account::new)
        .map_err(|e| StoreError::InvalidData(e.to_string()))
}

fn row_to_binding(row: &MySqlRow) -> StoreResult<Binding> {
    let account = row_account(row)?;
    let display_name: String = row
        .try_get("ID")
        .map_err(|e| StoreError::InvalidData(e.to_string()))?;
    let identity: Vec<u8> = row
        .try_get("UUID")
        .map_err(|e| StoreError::InvalidData(e.to_string()))?;

    // `Time` may be a DATE column holding day precision only.
    let created_at: NaiveDateTime = match row.try_get::<NaiveDateTime, _>("Time") {
        Ok(at) => at,
        Err(_) => row
            .try_get::<NaiveDate, _>("Time")
            .map(|day| day.and_time(chrono::NaiveTime::MIN))
            .map_err(|e| StoreError::InvalidData(e.to_string()))?,
    };

    let identity: [u8; 16] = identity.as_slice().try_into().map_err(|_| {
        StoreError::InvalidData(format!(
            "identity for account {account} is {} bytes, expected 16",
            identity.len()
        ))
    })?;
    let display_name =
        DisplayName::parse(&display_name).map_err(|e| StoreError::InvalidData(e.to_string()))?;

    Ok(Binding {
        account,
        display_name,
        identity: IdentityKey::from_bytes(identity),
        created_at: created_at.and_utc(),
    })
}

fn map_sqlx_error(err: sqlx::Error) -> StoreError {
    match &err {
        sqlx::Error::Database(db_err) if db_err.is_unique_violation() => {
            StoreError::Conflict(db_err.message().to_string())
        }
        sqlx::Error::Io(_)
        | sqlx::Error::PoolTimedOut
        | sqlx::Error::PoolClosed
        | sqlx::Error::Tls(_) => StoreError::Connection(err.to_string()),
        _ => StoreError::Query(err.to_string()),
    }
}
