//! Blog and user records, request payloads, and their validation.

use crate::core::error::{Error, Result};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::{Validate, ValidationError, ValidationErrors};

/// A blog post as stored, with its owner as a bare reference.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Blog {
    pub title: String,
    pub author: String,
    pub url: String,
    pub likes: i64,
    pub user: Uuid,
    pub id: Uuid,
}

/// Owner info attached to each blog in listings. Omits the owner's own blog list.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Owner {
    pub username: String,
    pub name: String,
    pub id: Uuid,
}

/// A blog with its owner populated.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BlogWithOwner {
    pub title: String,
    pub author: String,
    pub url: String,
    pub likes: i64,
    pub user: Option<Owner>,
    pub id: Uuid,
}

impl BlogWithOwner {
    pub fn new(blog: Blog, owner: Option<Owner>) -> Self {
        Self {
            title: blog.title,
            author: blog.author,
            url: blog.url,
            likes: blog.likes,
            user: owner,
            id: blog.id,
        }
    }
}

/// User record stored in database
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub username: String,
    pub name: String,
    #[serde(skip_serializing, default)]
    pub password_hash: String,
    /// Owned blog ids in creation order.
    pub blogs: Vec<Uuid>,
    pub id: Uuid,
}

impl From<&User> for Owner {
    fn from(user: &User) -> Self {
        Self {
            username: user.username.clone(),
            name: user.name.clone(),
            id: user.id,
        }
    }
}

/// Blog fields shown under a user in listings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BlogSummary {
    pub title: String,
    pub url: String,
    pub author: String,
    pub id: Uuid,
}

impl From<Blog> for BlogSummary {
    fn from(blog: Blog) -> Self {
        Self {
            title: blog.title,
            url: blog.url,
            author: blog.author,
            id: blog.id,
        }
    }
}

/// Public user info with populated blog summaries (no sensitive data)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserInfo {
    pub username: String,
    pub name: String,
    pub blogs: Vec<BlogSummary>,
    pub id: Uuid,
}

#[derive(Debug, Deserialize, Validate)]
pub struct NewBlog {
    #[serde(default)]
    #[validate(length(min = 1))]
    pub title: String,
    #[serde(default)]
    #[validate(length(min = 1))]
    pub author: String,
    #[serde(default)]
    #[validate(length(min = 1))]
    pub url: String,
    #[serde(default)]
    pub likes: Option<i64>,
}

/// Partial blog update. Unknown fields (including `id` and `user`) are ignored,
/// so ownership cannot be reassigned through an update.
#[derive(Debug, Default, Deserialize, Validate)]
pub struct BlogPatch {
    #[validate(length(min = 1))]
    pub title: Option<String>,
    #[validate(length(min = 1))]
    pub author: Option<String>,
    #[validate(length(min = 1))]
    pub url: Option<String>,
    pub likes: Option<i64>,
}

impl BlogPatch {
    pub fn apply(self, blog: &mut Blog) {
        if let Some(title) = self.title {
            blog.title = title;
        }
        if let Some(author) = self.author {
            blog.author = author;
        }
        if let Some(url) = self.url {
            blog.url = url;
        }
        if let Some(likes) = self.likes {
            blog.likes = likes;
        }
    }
}

#[derive(Debug, Deserialize, Validate)]
pub struct NewUser {
    #[serde(default)]
    #[validate(length(min = 3))]
    pub username: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub password: String,
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub password: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct LoginResponse {
    pub token: String,
    pub username: String,
    pub name: String,
}

/// Run field validation, reporting failures as `<model> validation failed: ...`.
pub fn validate<T: Validate>(model: &str, input: &T) -> Result<()> {
    input
        .validate()
        .map_err(|errors| Error::Validation(describe(model, &errors)))
}

fn describe(model: &str, errors: &ValidationErrors) -> String {
    let mut fields: Vec<_> = errors.field_errors().into_iter().collect();
    fields.sort_by(|a, b| a.0.cmp(&b.0));

    let details = fields
        .iter()
        .flat_map(|(field, errs)| errs.iter().map(move |err| describe_field(field, err)))
        .collect::<Vec<_>>()
        .join(", ");

    format!("{model} validation failed: {details}")
}

fn describe_field(field: &str, err: &ValidationError) -> String {
    let value = err
        .params
        .get("value")
        .and_then(|v| v.as_str())
        .unwrap_or_default();
    let min = err.params.get("min").and_then(|v| v.as_u64());

    match (&*err.code, min) {
        ("length", Some(min)) if !value.is_empty() => format!(
            "{field}: Path `{field}` (`{value}`) is shorter than the minimum allowed length ({min})."
        ),
        _ => format!("{field}: Path `{field}` is required."),
    }
}
