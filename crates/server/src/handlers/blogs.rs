//! Blog handlers
//!
//! Create and delete require a resolved identity; update does not check the
//! caller at all.

use crate::core::config::AppState;
use crate::core::ctx::Ctx;
use crate::core::error::{Error, Result};
use crate::core::models::{validate, Blog, BlogPatch, BlogWithOwner, NewBlog};
use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::StatusCode,
    Json,
};
use tracing::{info, warn};
use uuid::Uuid;

/// GET /api/blogs
pub async fn list_blogs(State(state): State<AppState>) -> Result<Json<Vec<BlogWithOwner>>> {
    info!("GET /api/blogs");
    let blogs = state.store.list_blogs_with_owners().await?;
    Ok(Json(blogs))
}

/// POST /api/blogs
pub async fn create_blog(
    State(state): State<AppState>,
    ctx: Option<Ctx>,
    payload: std::result::Result<Json<NewBlog>, JsonRejection>,
) -> Result<(StatusCode, Json<Blog>)> {
    let ctx = ctx.ok_or(Error::AuthFailNoToken)?;
    info!("POST /api/blogs - {}", ctx.username());

    let Json(req) = payload?;

    let mut user = state
        .store
        .find_user(ctx.user_id())
        .await?
        .ok_or(Error::AuthFailNoToken)?;

    validate("Blog", &req)?;

    let blog = Blog {
        title: req.title,
        author: req.author,
        url: req.url,
        likes: req.likes.unwrap_or(0),
        user: user.id,
        id: Uuid::new_v4(),
    };
    state.store.insert_blog(&blog).await?;

    user.blogs.push(blog.id);
    state.store.save_user_blogs(&user).await?;

    Ok((StatusCode::CREATED, Json(blog)))
}

/// DELETE /api/blogs/{id}
pub async fn delete_blog(
    State(state): State<AppState>,
    ctx: Option<Ctx>,
    Path(id): Path<String>,
) -> Result<StatusCode> {
    let ctx = ctx.ok_or(Error::AuthFailNoToken)?;
    info!("DELETE /api/blogs/{} - {}", id, ctx.username());

    let id = Uuid::parse_str(&id)?;
    let blog = state
        .store
        .find_blog(id)
        .await?
        .ok_or(Error::NotFound("blog"))?;

    if blog.user != ctx.user_id() {
        warn!("{} tried to delete blog {} owned by {}", ctx.username(), id, blog.user);
        return Err(Error::NotOwner);
    }

    state.store.delete_blog(id).await?;

    Ok(StatusCode::NO_CONTENT)
}

/// PUT /api/blogs/{id}
pub async fn update_blog(
    State(state): State<AppState>,
    Path(id): Path<String>,
    payload: std::result::Result<Json<BlogPatch>, JsonRejection>,
) -> Result<Json<Blog>> {
    info!("PUT /api/blogs/{}", id);

    let id = Uuid::parse_str(&id)?;
    let Json(patch) = payload?;
    validate("Blog", &patch)?;

    let mut blog = state
        .store
        .find_blog(id)
        .await?
        .ok_or(Error::NotFound("blog"))?;

    patch.apply(&mut blog);
    state.store.update_blog(&blog).await?;

    Ok(Json(blog))
}
