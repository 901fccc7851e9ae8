//! Preference store contract and SQLite implementation.
//!
//! # Responsibility
//! - Persist the PIN, security question/answer and the force re-setup flag
//!   as key/value rows.
//! - Push a fresh `Credentials` snapshot to subscribers after every write.
//!
//! # Invariants
//! - Question and answer are only ever written together.
//! - Clearing the PIN and raising the force re-setup flag happen in one
//!   transaction; so do saving a PIN and lowering the flag.
//! - Secret values never appear in log lines.

use crate::model::credentials::Credentials;
use crate::repo::feed::{ChangeFeed, Subscription};
use crate::repo::{ensure_table, RepoError, RepoResult};
use log::{debug, error, info};
use rusqlite::{Connection, OptionalExtension};

const FLAG_TRUE: &str = "1";
const FLAG_FALSE: &str = "0";

/// Live feed carrying credential snapshots.
pub type PreferenceFeed = ChangeFeed<Credentials>;

/// Keys of the preference store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PrefKey {
    MasterPin,
    SecurityQuestion,
    SecurityAnswer,
    ForcePinSetupAfterReset,
}

impl PrefKey {
    pub const ALL: [PrefKey; 4] = [
        PrefKey::MasterPin,
        PrefKey::SecurityQuestion,
        PrefKey::SecurityAnswer,
        PrefKey::ForcePinSetupAfterReset,
    ];

    /// Stable storage key.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::MasterPin => "master_pin",
            Self::SecurityQuestion => "security_question",
            Self::SecurityAnswer => "security_answer",
            Self::ForcePinSetupAfterReset => "force_pin_setup_after_reset",
        }
    }

    fn parse(value: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|key| key.as_str() == value)
    }
}

/// Repository interface for the preference store.
pub trait PreferenceRepository {
    fn load_credentials(&self) -> RepoResult<Credentials>;
    /// Whether a row for `key` exists, regardless of its value.
    fn has_value(&self, key: PrefKey) -> RepoResult<bool>;
    /// Stores PIN, question and answer and lowers the force re-setup flag.
    fn save_pin_setup(&self, pin: &str, question: &str, answer: &str) -> RepoResult<()>;
    /// Removes the PIN and raises the force re-setup flag.
    fn clear_pin(&self) -> RepoResult<()>;
    fn set_force_setup(&self, force: bool) -> RepoResult<()>;
    /// Subscribes to credential snapshots; the current one arrives first.
    fn observe(&self) -> RepoResult<Subscription<Credentials>>;
}

/// SQLite-backed preference store over the `preferences` table.
pub struct SqlitePreferenceRepository<'conn> {
    conn: &'conn Connection,
    feed: PreferenceFeed,
}

impl<'conn> SqlitePreferenceRepository<'conn> {
    pub fn try_new(conn: &'conn Connection, feed: PreferenceFeed) -> RepoResult<Self> {
        ensure_table(conn, "preferences")?;
        Ok(Self { conn, feed })
    }

    fn notify(&self, op: &'static str) {
        match self.load_credentials() {
            Ok(credentials) => {
                let delivered = self.feed.publish(&credentials);
                debug!("event=prefs_publish module=repo status=ok op={op} subscribers={delivered}");
            }
            Err(err) => {
                error!("event=prefs_publish module=repo status=error op={op} error={err}");
            }
        }
    }
}

impl PreferenceRepository for SqlitePreferenceRepository<'_> {
    fn load_credentials(&self) -> RepoResult<Credentials> {
        let mut stmt = self.conn.prepare("SELECT key, value FROM preferences;")?;
        let mut rows = stmt.query([])?;
        let mut credentials = Credentials::default();
        while let Some(row) = rows.next()? {
            let key: String = row.get("key")?;
            let value: String = row.get("value")?;
            match PrefKey::parse(&key) {
                Some(PrefKey::MasterPin) => credentials.pin = Some(value),
                Some(PrefKey::SecurityQuestion) => credentials.security_question = Some(value),
                Some(PrefKey::SecurityAnswer) => credentials.security_answer = Some(value),
                Some(PrefKey::ForcePinSetupAfterReset) => {
                    credentials.force_setup_after_reset = parse_flag(&value)?;
                }
                // Keys written by newer builds are ignored.
                None => {}
            }
        }
        Ok(credentials)
    }

    fn has_value(&self, key: PrefKey) -> RepoResult<bool> {
        let found = self
            .conn
            .query_row(
                "SELECT 1 FROM preferences WHERE key = ?1;",
                [key.as_str()],
                |row| row.get::<_, i64>(0),
            )
            .optional()?;
        Ok(found.is_some())
    }

    fn save_pin_setup(&self, pin: &str, question: &str, answer: &str) -> RepoResult<()> {
        let tx = self.conn.unchecked_transaction()?;
        put(&tx, PrefKey::MasterPin, pin)?;
        put(&tx, PrefKey::SecurityQuestion, question)?;
        put(&tx, PrefKey::SecurityAnswer, answer)?;
        put(&tx, PrefKey::ForcePinSetupAfterReset, FLAG_FALSE)?;
        tx.commit()?;

        info!("event=pin_save module=repo status=ok");
        self.notify("save_pin_setup");
        Ok(())
    }

    fn clear_pin(&self) -> RepoResult<()> {
        let tx = self.conn.unchecked_transaction()?;
        tx.execute(
            "DELETE FROM preferences WHERE key = ?1;",
            [PrefKey::MasterPin.as_str()],
        )?;
        put(&tx, PrefKey::ForcePinSetupAfterReset, FLAG_TRUE)?;
        tx.commit()?;

        info!("event=pin_clear module=repo status=ok force_setup=true");
        self.notify("clear_pin");
        Ok(())
    }

    fn set_force_setup(&self, force: bool) -> RepoResult<()> {
        put(
            self.conn,
            PrefKey::ForcePinSetupAfterReset,
            if force { FLAG_TRUE } else { FLAG_FALSE },
        )?;
        info!("event=force_setup_set module=repo status=ok force_setup={force}");
        self.notify("set_force_setup");
        Ok(())
    }

    fn observe(&self) -> RepoResult<Subscription<Credentials>> {
        let current = self.load_credentials()?;
        Ok(self.feed.subscribe(current))
    }
}

fn put(conn: &Connection, key: PrefKey, value: &str) -> RepoResult<()> {
    conn.execute(
        "INSERT INTO preferences (key, value)
         VALUES (?1, ?2)
         ON CONFLICT(key) DO UPDATE SET value = excluded.value;",
        [key.as_str(), value],
    )?;
    Ok(())
}

fn parse_flag(value: &str) -> RepoResult<bool> {
    match value {
        FLAG_TRUE => Ok(true),
        FLAG_FALSE => Ok(false),
        other => Err(RepoError::InvalidData(format!(
            "invalid flag value `{other}` for {}",
            PrefKey::ForcePinSetupAfterReset.as_str()
        ))),
    }
}
