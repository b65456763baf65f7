use crate::{
    domain::{
        board::OrderUpdate,
        issue::{Issue, IssueId},
        project::{Project, ProjectId, Space, SpaceId},
    },
    error::{Result, TaskboardError},
    storage::Storage,
};
use async_trait::async_trait;
use rusqlite::{params, Connection, OptionalExtension};
use std::{path::Path, sync::Mutex};

/// SQLite-backed storage. Records are JSON documents; the columns used
/// for lookups and board ordering are duplicated alongside them.
pub struct SqliteStorage {
    connection: Mutex<Connection>,
}

impl SqliteStorage {
    const SCHEMA: &'static str = "
        CREATE TABLE IF NOT EXISTS projects (
            id   TEXT PRIMARY KEY,
            data TEXT NOT NULL
        );
        CREATE TABLE IF NOT EXISTS spaces (
            id   TEXT PRIMARY KEY,
            data TEXT NOT NULL
        );
        CREATE TABLE IF NOT EXISTS issues (
            id         TEXT PRIMARY KEY,
            project_id TEXT NOT NULL,
            status     TEXT NOT NULL,
            rank       INTEGER NOT NULL,
            created_at TEXT NOT NULL,
            data       TEXT NOT NULL
        );
        CREATE INDEX IF NOT EXISTS issues_by_column ON issues (project_id, status, rank);
    ";

    /// Opens (or creates) a database file
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        Ok(Self {
            connection: Mutex::new(Connection::open(path)?),
        })
    }

    /// Private in-memory database, mostly for tests
    pub fn open_in_memory() -> Result<Self> {
        Ok(Self {
            connection: Mutex::new(Connection::open_in_memory()?),
        })
    }

    fn with_conn<T>(&self, f: impl FnOnce(&mut Connection) -> Result<T>) -> Result<T> {
        let mut conn = self
            .connection
            .lock()
            .map_err(|_| TaskboardError::StorageError("connection lock poisoned".to_string()))?;
        f(&mut conn)
    }

    fn put_issue(conn: &Connection, issue: &Issue) -> Result<()> {
        let data = serde_json::to_string(issue)?;
        conn.execute(
            "INSERT INTO issues (id, project_id, status, rank, created_at, data)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)
             ON CONFLICT(id) DO UPDATE SET
                project_id = excluded.project_id,
                status = excluded.status,
                rank = excluded.rank,
                created_at = excluded.created_at,
                data = excluded.data",
            params![
                issue.id.as_str(),
                issue.project_id.as_str(),
                issue.status,
                issue.order,
                issue.created_at.to_rfc3339(),
                data
            ],
        )?;
        Ok(())
    }

    fn get_issue(conn: &Connection, id: &IssueId) -> Result<Option<Issue>> {
        let data: Option<String> = conn
            .query_row(
                "SELECT data FROM issues WHERE id = ?1",
                params![id.as_str()],
                |row| row.get(0),
            )
            .optional()?;
        data.map(|d| serde_json::from_str(&d).map_err(Into::into))
            .transpose()
    }

    fn put_document(conn: &Connection, table: &str, id: &str, data: String) -> Result<()> {
        conn.execute(
            &format!(
                "INSERT INTO {table} (id, data) VALUES (?1, ?2)
                 ON CONFLICT(id) DO UPDATE SET data = excluded.data"
            ),
            params![id, data],
        )?;
        Ok(())
    }

    fn get_document(conn: &Connection, table: &str, id: &str) -> Result<Option<String>> {
        Ok(conn
            .query_row(
                &format!("SELECT data FROM {table} WHERE id = ?1"),
                params![id],
                |row| row.get(0),
            )
            .optional()?)
    }

    fn all_documents(conn: &Connection, sql: &str, args: &[&dyn rusqlite::ToSql]) -> Result<Vec<String>> {
        let mut stmt = conn.prepare(sql)?;
        let rows = stmt.query_map(args, |row| row.get::<_, String>(0))?;
        let mut docs = Vec::new();
        for row in rows {
            docs.push(row?);
        }
        Ok(docs)
    }

    fn decode_all<T: serde::de::DeserializeOwned>(docs: Vec<String>) -> Result<Vec<T>> {
        docs.iter()
            .map(|d| serde_json::from_str(d).map_err(Into::into))
            .collect()
    }
}

#[async_trait]
impl Storage for SqliteStorage {
    async fn initialize(&self) -> Result<()> {
        self.with_conn(|conn| {
            conn.execute_batch(Self::SCHEMA)?;
            Ok(())
        })
    }

    async fn is_initialized(&self) -> bool {
        self.with_conn(|conn| {
            let count: i64 = conn.query_row(
                "SELECT COUNT(*) FROM sqlite_master WHERE type = 'table' AND name = 'issues'",
                [],
                |row| row.get(0),
            )?;
            Ok(count > 0)
        })
        .unwrap_or(false)
    }

    async fn save_project(&self, project: &Project) -> Result<()> {
        let data = serde_json::to_string(project)?;
        self.with_conn(|conn| Self::put_document(conn, "projects", project.id.as_str(), data))
    }

    async fn load_project(&self, id: &ProjectId) -> Result<Project> {
        let doc = self.with_conn(|conn| Self::get_document(conn, "projects", id.as_str()))?;
        let doc = doc.ok_or_else(|| TaskboardError::ProjectNotFound(id.to_string()))?;
        Ok(serde_json::from_str(&doc)?)
    }

    async fn list_projects(&self) -> Result<Vec<Project>> {
        let docs = self.with_conn(|conn| Self::all_documents(conn, "SELECT data FROM projects", &[]))?;
        Self::decode_all(docs)
    }

    async fn delete_project(&self, id: &ProjectId) -> Result<()> {
        let deleted = self.with_conn(|conn| {
            Ok(conn.execute("DELETE FROM projects WHERE id = ?1", params![id.as_str()])?)
        })?;
        if deleted == 0 {
            return Err(TaskboardError::ProjectNotFound(id.to_string()));
        }
        Ok(())
    }

    async fn save_space(&self, space: &Space) -> Result<()> {
        let data = serde_json::to_string(space)?;
        self.with_conn(|conn| Self::put_document(conn, "spaces", space.id.as_str(), data))
    }

    async fn load_space(&self, id: &SpaceId) -> Result<Space> {
        let doc = self.with_conn(|conn| Self::get_document(conn, "spaces", id.as_str()))?;
        let doc = doc.ok_or_else(|| TaskboardError::SpaceNotFound(id.to_string()))?;
        Ok(serde_json::from_str(&doc)?)
    }

    async fn list_spaces(&self) -> Result<Vec<Space>> {
        let docs = self.with_conn(|conn| Self::all_documents(conn, "SELECT data FROM spaces", &[]))?;
        Self::decode_all(docs)
    }

    async fn delete_space(&self, id: &SpaceId) -> Result<()> {
        let deleted = self.with_conn(|conn| {
            Ok(conn.execute("DELETE FROM spaces WHERE id = ?1", params![id.as_str()])?)
        })?;
        if deleted == 0 {
            return Err(TaskboardError::SpaceNotFound(id.to_string()));
        }
        Ok(())
    }

    async fn find_issues(
        &self,
        project_id: &ProjectId,
        status: Option<&str>,
    ) -> Result<Vec<Issue>> {
        let docs = self.with_conn(|conn| match status {
            Some(status) => Self::all_documents(
                conn,
                "SELECT data FROM issues WHERE project_id = ?1 AND status = ?2
                 ORDER BY rank, created_at",
                &[&project_id.as_str(), &status],
            ),
            None => Self::all_documents(
                conn,
                "SELECT data FROM issues WHERE project_id = ?1 ORDER BY rank, created_at",
                &[&project_id.as_str()],
            ),
        })?;
        Self::decode_all(docs)
    }

    async fn find_issue(&self, id: &IssueId) -> Result<Option<Issue>> {
        self.with_conn(|conn| Self::get_issue(conn, id))
    }

    async fn list_issues(&self) -> Result<Vec<Issue>> {
        let docs = self.with_conn(|conn| Self::all_documents(conn, "SELECT data FROM issues", &[]))?;
        Self::decode_all(docs)
    }

    async fn create_issue(&self, issue: Issue) -> Result<Issue> {
        self.with_conn(|conn| Self::put_issue(conn, &issue))?;
        Ok(issue)
    }

    async fn save_issue(&self, issue: &Issue) -> Result<()> {
        self.with_conn(|conn| Self::put_issue(conn, issue))
    }

    async fn delete_issue(&self, id: &IssueId) -> Result<()> {
        let deleted = self.with_conn(|conn| {
            Ok(conn.execute("DELETE FROM issues WHERE id = ?1", params![id.as_str()])?)
        })?;
        if deleted == 0 {
            return Err(TaskboardError::IssueNotFound(id.to_string()));
        }
        Ok(())
    }

    async fn bulk_update(&self, updates: &[OrderUpdate]) -> Result<()> {
        self.with_conn(|conn| {
            let tx = conn.transaction()?;
            for update in updates {
                let mut issue = Self::get_issue(&tx, &update.id)?
                    .ok_or_else(|| TaskboardError::IssueNotFound(update.id.to_string()))?;
                issue.set_position(&update.status, update.order);
                Self::put_issue(&tx, &issue)?;
            }
            tx.commit()?;
            Ok(())
        })
    }
}
