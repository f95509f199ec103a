//! SQLite-backed registry.

use std::path::Path;
use std::sync::{Mutex, MutexGuard};

use rusqlite::{params, Connection, OptionalExtension};

use super::{Batch, Channel, Registry, RegistryError, RegistryReader};

pub struct SqliteRegistry {
    conn: Mutex<Connection>,
}

impl SqliteRegistry {
    /// Open (or create) the registry database at `path`.
    pub fn new(path: &Path) -> Result<Self, RegistryError> {
        let conn = Connection::open(path)?;
        Self::initialize_schema(&conn)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    /// In-memory registry (useful for testing).
    pub fn in_memory() -> Result<Self, RegistryError> {
        let conn = Connection::open_in_memory()?;
        Self::initialize_schema(&conn)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    fn initialize_schema(conn: &Connection) -> Result<(), RegistryError> {
        conn.execute_batch(
            r#"
            CREATE TABLE IF NOT EXISTS channels (
                id TEXT PRIMARY KEY,
                name TEXT NOT NULL
            );

            CREATE TABLE IF NOT EXISTS batches (
                id TEXT PRIMARY KEY,
                name TEXT NOT NULL,
                token TEXT NOT NULL
            );

            -- rowid preserves connection order; the first row is the active batch
            CREATE TABLE IF NOT EXISTS connections (
                channel_id TEXT NOT NULL,
                batch_id TEXT NOT NULL,
                UNIQUE (channel_id, batch_id)
            );

            CREATE INDEX IF NOT EXISTS idx_connections_channel ON connections(channel_id);
            "#,
        )?;
        Ok(())
    }

    fn lock(&self) -> Result<MutexGuard<'_, Connection>, RegistryError> {
        self.conn
            .lock()
            .map_err(|e| RegistryError::Database(format!("registry lock poisoned: {}", e)))
    }

    fn connected_batches(conn: &Connection, channel_id: &str) -> Result<Vec<String>, RegistryError> {
        let mut stmt =
            conn.prepare("SELECT batch_id FROM connections WHERE channel_id = ?1 ORDER BY rowid")?;
        let rows = stmt.query_map(params![channel_id], |row| row.get::<_, String>(0))?;
        Ok(rows.collect::<Result<Vec<_>, _>>()?)
    }

    fn channel_exists(conn: &Connection, id: &str) -> Result<bool, RegistryError> {
        let found: Option<i64> = conn
            .query_row("SELECT 1 FROM channels WHERE id = ?1", params![id], |row| {
                row.get(0)
            })
            .optional()?;
        Ok(found.is_some())
    }
}

impl RegistryReader for SqliteRegistry {
    fn lookup_channel(&self, id: &str) -> Result<Option<Channel>, RegistryError> {
        let conn = self.lock()?;
        let name: Option<String> = conn
            .query_row("SELECT name FROM channels WHERE id = ?1", params![id], |row| {
                row.get(0)
            })
            .optional()?;

        match name {
            Some(name) => Ok(Some(Channel {
                id: id.to_string(),
                name,
                batches: Self::connected_batches(&conn, id)?,
            })),
            None => Ok(None),
        }
    }

    fn lookup_batch(&self, id: &str) -> Result<Option<Batch>, RegistryError> {
        let conn = self.lock()?;
        let batch = conn
            .query_row(
                "SELECT id, name, token FROM batches WHERE id = ?1",
                params![id],
                |row| {
                    Ok(Batch {
                        id: row.get(0)?,
                        name: row.get(1)?,
                        token: row.get(2)?,
                    })
                },
            )
            .optional()?;
        Ok(batch)
    }
}

impl Registry for SqliteRegistry {
    fn list_channels(&self) -> Result<Vec<Channel>, RegistryError> {
        let conn = self.lock()?;
        let mut stmt = conn.prepare("SELECT id, name FROM channels ORDER BY id")?;
        let rows = stmt
            .query_map([], |row| Ok((row.get::<_, String>(0)?, row.get::<_, String>(1)?)))?
            .collect::<Result<Vec<_>, _>>()?;

        rows.into_iter()
            .map(|(id, name)| {
                let batches = Self::connected_batches(&conn, &id)?;
                Ok(Channel { id, name, batches })
            })
            .collect()
    }

    fn list_batches(&self) -> Result<Vec<Batch>, RegistryError> {
        let conn = self.lock()?;
        let mut stmt = conn.prepare("SELECT id, name, token FROM batches ORDER BY id")?;
        let rows = stmt.query_map([], |row| {
            Ok(Batch {
                id: row.get(0)?,
                name: row.get(1)?,
                token: row.get(2)?,
            })
        })?;
        Ok(rows.collect::<Result<Vec<_>, _>>()?)
    }

    fn add_channel(&self, id: &str, name: &str) -> Result<Channel, RegistryError> {
        let mut conn = self.lock()?;
        let tx = conn.transaction()?;
        tx.execute(
            "INSERT OR REPLACE INTO channels (id, name) VALUES (?1, ?2)",
            params![id, name],
        )?;
        tx.execute("DELETE FROM connections WHERE channel_id = ?1", params![id])?;
        tx.commit()?;

        Ok(Channel {
            id: id.to_string(),
            name: name.to_string(),
            batches: Vec::new(),
        })
    }

    fn delete_channel(&self, id: &str) -> Result<bool, RegistryError> {
        let mut conn = self.lock()?;
        let tx = conn.transaction()?;
        tx.execute("DELETE FROM connections WHERE channel_id = ?1", params![id])?;
        let removed = tx.execute("DELETE FROM channels WHERE id = ?1", params![id])?;
        tx.commit()?;
        Ok(removed > 0)
    }

    fn add_batch(&self, batch: Batch) -> Result<(), RegistryError> {
        let conn = self.lock()?;
        conn.execute(
            "INSERT OR REPLACE INTO batches (id, name, token) VALUES (?1, ?2, ?3)",
            params![batch.id, batch.name, batch.token],
        )?;
        Ok(())
    }

    fn delete_batch(&self, id: &str) -> Result<bool, RegistryError> {
        let conn = self.lock()?;
        let removed = conn.execute("DELETE FROM batches WHERE id = ?1", params![id])?;
        Ok(removed > 0)
    }

    fn connect(&self, channel_id: &str, batch_id: &str) -> Result<(), RegistryError> {
        let conn = self.lock()?;
        if !Self::channel_exists(&conn, channel_id)? {
            return Err(RegistryError::ChannelNotFound(channel_id.to_string()));
        }
        conn.execute(
            "INSERT OR IGNORE INTO connections (channel_id, batch_id) VALUES (?1, ?2)",
            params![channel_id, batch_id],
        )?;
        Ok(())
    }

    fn disconnect(&self, channel_id: &str, batch_id: &str) -> Result<(), RegistryError> {
        let conn = self.lock()?;
        if !Self::channel_exists(&conn, channel_id)? {
            return Err(RegistryError::ChannelNotFound(channel_id.to_string()));
        }
        conn.execute(
            "DELETE FROM connections WHERE channel_id = ?1 AND batch_id = ?2",
            params![channel_id, batch_id],
        )?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn batch(id: &str, token: &str) -> Batch {
        Batch {
            id: id.to_string(),
            name: format!("Batch {}", id),
            token: token.to_string(),
        }
    }

    #[test]
    fn test_lookup_unknown_returns_none() {
        let registry = SqliteRegistry::in_memory().unwrap();
        assert!(registry.lookup_channel("-100").unwrap().is_none());
        assert!(registry.lookup_batch("B1").unwrap().is_none());
    }

    #[test]
    fn test_channel_batch_linkage() {
        let registry = SqliteRegistry::in_memory().unwrap();
        registry.add_channel("-100123", "Physics").unwrap();
        registry.add_batch(batch("B1", "tok")).unwrap();
        registry.connect("-100123", "B1").unwrap();

        let channel = registry.lookup_channel("-100123").unwrap().unwrap();
        assert_eq!(channel.name, "Physics");
        assert_eq!(channel.connected_batch(), Some("B1"));

        let b = registry.lookup_batch("B1").unwrap().unwrap();
        assert_eq!(b.token, "tok");
    }

    #[test]
    fn test_connect_preserves_order_and_is_idempotent() {
        let registry = SqliteRegistry::in_memory().unwrap();
        registry.add_channel("c", "Chan").unwrap();
        registry.connect("c", "B2").unwrap();
        registry.connect("c", "B1").unwrap();
        registry.connect("c", "B2").unwrap();

        let channel = registry.lookup_channel("c").unwrap().unwrap();
        assert_eq!(channel.batches, vec!["B2".to_string(), "B1".to_string()]);
    }

    #[test]
    fn test_connect_unknown_channel_fails() {
        let registry = SqliteRegistry::in_memory().unwrap();
        let err = registry.connect("missing", "B1").unwrap_err();
        assert!(matches!(err, RegistryError::ChannelNotFound(_)));
    }

    #[test]
    fn test_disconnect_removes_link() {
        let registry = SqliteRegistry::in_memory().unwrap();
        registry.add_channel("c", "Chan").unwrap();
        registry.connect("c", "B1").unwrap();
        registry.connect("c", "B2").unwrap();
        registry.disconnect("c", "B1").unwrap();
        registry.disconnect("c", "B1").unwrap();

        let channel = registry.lookup_channel("c").unwrap().unwrap();
        assert_eq!(channel.connected_batch(), Some("B2"));
    }

    #[test]
    fn test_re_adding_channel_clears_connections() {
        let registry = SqliteRegistry::in_memory().unwrap();
        registry.add_channel("c", "Old").unwrap();
        registry.connect("c", "B1").unwrap();
        registry.add_channel("c", "New").unwrap();

        let channel = registry.lookup_channel("c").unwrap().unwrap();
        assert_eq!(channel.name, "New");
        assert!(channel.batches.is_empty());
    }

    #[test]
    fn test_delete_batch_leaves_dangling_connection() {
        let registry = SqliteRegistry::in_memory().unwrap();
        registry.add_channel("c", "Chan").unwrap();
        registry.add_batch(batch("B1", "tok")).unwrap();
        registry.connect("c", "B1").unwrap();

        assert!(registry.delete_batch("B1").unwrap());
        assert!(!registry.delete_batch("B1").unwrap());

        let channel = registry.lookup_channel("c").unwrap().unwrap();
        assert_eq!(channel.connected_batch(), Some("B1"));
        assert!(registry.lookup_batch("B1").unwrap().is_none());
    }

    #[test]
    fn test_delete_channel() {
        let registry = SqliteRegistry::in_memory().unwrap();
        registry.add_channel("c", "Chan").unwrap();
        registry.connect("c", "B1").unwrap();
        assert!(registry.delete_channel("c").unwrap());
        assert!(registry.lookup_channel("c").unwrap().is_none());
        assert!(registry.list_channels().unwrap().is_empty());
    }

    #[test]
    fn test_persists_across_reopen() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("registry.db");
        {
            let registry = SqliteRegistry::new(&path).unwrap();
            registry.add_channel("c", "Chan").unwrap();
            registry.add_batch(batch("B1", "tok")).unwrap();
            registry.connect("c", "B1").unwrap();
        }

        let registry = SqliteRegistry::new(&path).unwrap();
        assert_eq!(registry.list_channels().unwrap().len(), 1);
        assert_eq!(registry.list_batches().unwrap()[0].token, "tok");
    }
}
