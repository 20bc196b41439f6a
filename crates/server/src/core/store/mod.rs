//! SQLite-backed store for users and blogs.
//!
//! `Store` owns the connection pool. It is created once at startup with
//! [`Store::connect`], cloned into request state, and shut down with
//! [`Store::close`].

use crate::core::error::{Error, Result};
use crate::core::models::{Blog, BlogSummary, BlogWithOwner, Owner, User, UserInfo};
use anyhow::Context;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};
use std::collections::HashMap;
use std::str::FromStr;
use std::time::Duration;
use tracing::info;
use uuid::Uuid;

#[derive(Clone, Debug)]
pub struct Store {
    pool: SqlitePool,
}

#[derive(sqlx::FromRow)]
struct BlogRow {
    id: String,
    title: String,
    author: String,
    url: String,
    likes: i64,
    user_id: String,
}

#[derive(sqlx::FromRow)]
struct BlogOwnerRow {
    id: String,
    title: String,
    author: String,
    url: String,
    likes: i64,
    user_id: String,
    owner_username: Option<String>,
    owner_name: Option<String>,
}

#[derive(sqlx::FromRow)]
struct UserRow {
    id: String,
    username: String,
    name: String,
    password_hash: String,
    blogs: String,
}

fn parse_id(raw: &str) -> Result<Uuid> {
    Uuid::parse_str(raw)
        .with_context(|| format!("Corrupt id in database: {raw}"))
        .map_err(Error::from)
}

impl TryFrom<BlogRow> for Blog {
    type Error = Error;

    fn try_from(row: BlogRow) -> Result<Self> {
        Ok(Blog {
            title: row.title,
            author: row.author,
            url: row.url,
            likes: row.likes,
            user: parse_id(&row.user_id)?,
            id: parse_id(&row.id)?,
        })
    }
}

impl TryFrom<BlogOwnerRow> for BlogWithOwner {
    type Error = Error;

    fn try_from(row: BlogOwnerRow) -> Result<Self> {
        let user_id = parse_id(&row.user_id)?;
        let owner = match (row.owner_username, row.owner_name) {
            (Some(username), Some(name)) => Some(Owner {
                username,
                name,
                id: user_id,
            }),
            _ => None,
        };

        Ok(BlogWithOwner {
            title: row.title,
            author: row.author,
            url: row.url,
            likes: row.likes,
            user: owner,
            id: parse_id(&row.id)?,
        })
    }
}

impl TryFrom<UserRow> for User {
    type Error = Error;

    fn try_from(row: UserRow) -> Result<Self> {
        let blogs: Vec<Uuid> = serde_json::from_str(&row.blogs)
            .with_context(|| format!("Corrupt blog list for user {}", row.id))?;

        Ok(User {
            username: row.username,
            name: row.name,
            password_hash: row.password_hash,
            blogs,
            id: parse_id(&row.id)?,
        })
    }
}

fn is_in_memory(url: &str) -> bool {
    url.contains(":memory:") || url.contains("mode=memory")
}

impl Store {
    /// Open the pool and make sure the schema exists.
    pub async fn connect(database_url: &str) -> anyhow::Result<Self> {
        let options = SqliteConnectOptions::from_str(database_url)
            .with_context(|| format!("Invalid database url: {database_url}"))?
            .create_if_missing(true);

        // Every in-memory connection is its own database, so pin a single one.
        let pool_options = if is_in_memory(database_url) {
            SqlitePoolOptions::new()
                .max_connections(1)
                .idle_timeout(None::<Duration>)
                .max_lifetime(None::<Duration>)
        } else {
            SqlitePoolOptions::new().max_connections(5)
        };

        let pool = pool_options
            .connect_with(options)
            .await
            .context("Failed to connect to database")?;

        let store = Self { pool };
        store.init_schema().await?;

        info!("[Store] Connected to {}", database_url);

        Ok(store)
    }

    async fn init_schema(&self) -> anyhow::Result<()> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS users (
                id TEXT PRIMARY KEY,
                username TEXT UNIQUE NOT NULL,
                name TEXT NOT NULL,
                password_hash TEXT NOT NULL,
                blogs TEXT NOT NULL DEFAULT '[]'
            )
            "#,
        )
        .execute(&self.pool)
        .await?;

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS blogs (
                id TEXT PRIMARY KEY,
                title TEXT NOT NULL,
                author TEXT NOT NULL,
                url TEXT NOT NULL,
                likes INTEGER NOT NULL DEFAULT 0,
                user_id TEXT NOT NULL,
                FOREIGN KEY (user_id) REFERENCES users(id)
            )
            "#,
        )
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    pub async fn close(&self) {
        self.pool.close().await;
        info!("[Store] Closed");
    }

    // Blogs

    pub async fn list_blogs(&self) -> Result<Vec<Blog>> {
        let rows: Vec<BlogRow> = sqlx::query_as(
            "SELECT id, title, author, url, likes, user_id FROM blogs ORDER BY rowid",
        )
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(Blog::try_from).collect()
    }

    /// All blogs in creation order, each with its owner populated.
    pub async fn list_blogs_with_owners(&self) -> Result<Vec<BlogWithOwner>> {
        let rows: Vec<BlogOwnerRow> = sqlx::query_as(
            r#"
            SELECT b.id, b.title, b.author, b.url, b.likes, b.user_id,
                   u.username AS owner_username, u.name AS owner_name
            FROM blogs b
            LEFT JOIN users u ON u.id = b.user_id
            ORDER BY b.rowid
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(BlogWithOwner::try_from).collect()
    }

    pub async fn find_blog(&self, id: Uuid) -> Result<Option<Blog>> {
        let row: Option<BlogRow> = sqlx::query_as(
            "SELECT id, title, author, url, likes, user_id FROM blogs WHERE id = ?",
        )
        .bind(id.to_string())
        .fetch_optional(&self.pool)
        .await?;

        row.map(Blog::try_from).transpose()
    }

    pub async fn insert_blog(&self, blog: &Blog) -> Result<()> {
        sqlx::query(
            "INSERT INTO blogs (id, title, author, url, likes, user_id) VALUES (?, ?, ?, ?, ?, ?)",
        )
        .bind(blog.id.to_string())
        .bind(&blog.title)
        .bind(&blog.author)
        .bind(&blog.url)
        .bind(blog.likes)
        .bind(blog.user.to_string())
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Overwrite the editable fields of a blog. The owner column is never touched.
    pub async fn update_blog(&self, blog: &Blog) -> Result<()> {
        sqlx::query("UPDATE blogs SET title = ?, author = ?, url = ?, likes = ? WHERE id = ?")
            .bind(&blog.title)
            .bind(&blog.author)
            .bind(&blog.url)
            .bind(blog.likes)
            .bind(blog.id.to_string())
            .execute(&self.pool)
            .await?;

        Ok(())
    }

    /// Returns whether a row was removed.
    pub async fn delete_blog(&self, id: Uuid) -> Result<bool> {
        let result = sqlx::query("DELETE FROM blogs WHERE id = ?")
            .bind(id.to_string())
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    // Users

    pub async fn list_users(&self) -> Result<Vec<User>> {
        let rows: Vec<UserRow> = sqlx::query_as(
            "SELECT id, username, name, password_hash, blogs FROM users ORDER BY rowid",
        )
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(User::try_from).collect()
    }

    /// All users with their blog references resolved to summaries.
    /// References to deleted blogs are skipped.
    pub async fn list_users_with_blogs(&self) -> Result<Vec<UserInfo>> {
        let users = self.list_users().await?;
        let mut blogs: HashMap<Uuid, Blog> = self
            .list_blogs()
            .await?
            .into_iter()
            .map(|blog| (blog.id, blog))
            .collect();

        Ok(users
            .into_iter()
            .map(|user| UserInfo {
                blogs: user
                    .blogs
                    .iter()
                    .filter_map(|id| blogs.remove(id))
                    .map(BlogSummary::from)
                    .collect(),
                username: user.username,
                name: user.name,
                id: user.id,
            })
            .collect())
    }

    pub async fn find_user(&self, id: Uuid) -> Result<Option<User>> {
        let row: Option<UserRow> = sqlx::query_as(
            "SELECT id, username, name, password_hash, blogs FROM users WHERE id = ?",
        )
        .bind(id.to_string())
        .fetch_optional(&self.pool)
        .await?;

        row.map(User::try_from).transpose()
    }

    pub async fn find_user_by_username(&self, username: &str) -> Result<Option<User>> {
        let row: Option<UserRow> = sqlx::query_as(
            "SELECT id, username, name, password_hash, blogs FROM users WHERE username = ?",
        )
        .bind(username)
        .fetch_optional(&self.pool)
        .await?;

        row.map(User::try_from).transpose()
    }

    /// Insert a new user. A username collision maps to [`Error::UsernameTaken`].
    pub async fn insert_user(&self, user: &User) -> Result<()> {
        let blogs = serde_json::to_string(&user.blogs).context("Failed to encode blog list")?;

        sqlx::query(
            "INSERT INTO users (id, username, name, password_hash, blogs) VALUES (?, ?, ?, ?, ?)",
        )
        .bind(user.id.to_string())
        .bind(&user.username)
        .bind(&user.name)
        .bind(&user.password_hash)
        .bind(blogs)
        .execute(&self.pool)
        .await
        .map_err(|err| match err.as_database_error() {
            Some(db_err) if db_err.is_unique_violation() => Error::UsernameTaken,
            _ => Error::Database(err),
        })?;

        Ok(())
    }

    /// Persist the user's blog reference list. Last writer wins.
    pub async fn save_user_blogs(&self, user: &User) -> Result<()> {
        let blogs = serde_json::to_string(&user.blogs).context("Failed to encode blog list")?;

        sqlx::query("UPDATE users SET blogs = ? WHERE id = ?")
            .bind(blogs)
            .bind(user.id.to_string())
            .execute(&self.pool)
            .await?;

        Ok(())
    }

    /// Remove every blog and user.
    pub async fn reset(&self) -> Result<()> {
        sqlx::query("DELETE FROM blogs").execute(&self.pool).await?;
        sqlx::query("DELETE FROM users").execute(&self.pool).await?;

        info!("[Store] Reset");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user(username: &str) -> User {
        User {
            username: username.into(),
            name: format!("{username} name"),
            password_hash: "hash".into(),
            blogs: vec![],
            id: Uuid::new_v4(),
        }
    }

    fn blog(title: &str, owner: Uuid) -> Blog {
        Blog {
            title: title.into(),
            author: "Author".into(),
            url: "http://example.com".into(),
            likes: 0,
            user: owner,
            id: Uuid::new_v4(),
        }
    }

    #[tokio::test]
    async fn test_user_roundtrip_and_uniqueness() {
        let store = Store::connect("sqlite::memory:").await.unwrap();
        let alice = user("alice");
        store.insert_user(&alice).await.unwrap();

        let found = store.find_user_by_username("alice").await.unwrap().unwrap();
        assert_eq!(found.id, alice.id);
        assert!(store.find_user_by_username("Alice").await.unwrap().is_none());

        let err = store.insert_user(&user("alice")).await.unwrap_err();
        assert!(matches!(err, Error::UsernameTaken));
    }

    #[tokio::test]
    async fn test_blog_lifecycle() {
        let store = Store::connect("sqlite::memory:").await.unwrap();
        let mut owner = user("owner");
        store.insert_user(&owner).await.unwrap();

        let mut first = blog("first", owner.id);
        let second = blog("second", owner.id);
        store.insert_blog(&first).await.unwrap();
        store.insert_blog(&second).await.unwrap();
        owner.blogs = vec![first.id, second.id];
        store.save_user_blogs(&owner).await.unwrap();

        let listed = store.list_blogs_with_owners().await.unwrap();
        assert_eq!(listed.len(), 2);
        assert_eq!(listed[0].title, "first");
        assert_eq!(listed[0].user.as_ref().unwrap().username, "owner");

        first.likes = 7;
        store.update_blog(&first).await.unwrap();
        assert_eq!(store.find_blog(first.id).await.unwrap().unwrap().likes, 7);

        assert!(store.delete_blog(second.id).await.unwrap());
        assert!(!store.delete_blog(second.id).await.unwrap());

        let users = store.list_users_with_blogs().await.unwrap();
        assert_eq!(users[0].blogs.len(), 1);
        assert_eq!(users[0].blogs[0].title, "first");
    }

    #[tokio::test]
    async fn test_file_backed_store_persists() {
        let dir = tempfile::tempdir().unwrap();
        let url = format!("sqlite://{}", dir.path().join("bloglist.sqlite").display());

        let alice = user("alice");
        {
            let store = Store::connect(&url).await.unwrap();
            store.insert_user(&alice).await.unwrap();
            store.close().await;
        }

        let store = Store::connect(&url).await.unwrap();
        let found = store.find_user(alice.id).await.unwrap().unwrap();
        assert_eq!(found.username, "alice");

        store.reset().await.unwrap();
        assert!(store.list_users().await.unwrap().is_empty());
    }
}
