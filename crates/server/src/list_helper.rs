//! Aggregates over a list of blogs.
//!
//! All functions are pure and deterministic for a given input order.

use std::collections::HashMap;

use serde::Serialize;

use crate::core::models::Blog;

/// Author with the highest number of blogs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AuthorBlogs {
    pub author: String,
    pub count: usize,
}

/// Author with the highest cumulative likes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AuthorLikes {
    pub author: String,
    pub likes: i64,
}

/// Sum of likes, saturating at the `i64` bounds.
pub fn total_likes(blogs: &[Blog]) -> i64 {
    blogs
        .iter()
        .fold(0i64, |total, blog| total.saturating_add(blog.likes))
}

/// The most liked blog. Ties go to the earliest blog in the list.
pub fn favorite_blog(blogs: &[Blog]) -> Option<&Blog> {
    blogs.iter().fold(None, |best, blog| match best {
        Some(current) if current.likes >= blog.likes => Some(current),
        _ => Some(blog),
    })
}

/// Ties go to the author whose first blog appears earliest.
pub fn most_blogs(blogs: &[Blog]) -> AuthorBlogs {
    let mut counts: HashMap<&str, usize> = HashMap::new();
    for blog in blogs {
        *counts.entry(blog.author.as_str()).or_default() += 1;
    }

    let mut best = AuthorBlogs {
        author: String::new(),
        count: 0,
    };
    for blog in blogs {
        let count = counts[blog.author.as_str()];
        if count > best.count {
            best = AuthorBlogs {
                author: blog.author.clone(),
                count,
            };
        }
    }
    best
}

/// Ties go to the author whose first blog appears earliest. Only a strictly
/// positive total can displace the empty result.
pub fn most_likes(blogs: &[Blog]) -> AuthorLikes {
    let mut totals: HashMap<&str, i64> = HashMap::new();
    for blog in blogs {
        let total = totals.entry(blog.author.as_str()).or_default();
        *total = total.saturating_add(blog.likes);
    }

    let mut best = AuthorLikes {
        author: String::new(),
        likes: 0,
    };
    for blog in blogs {
        let likes = totals[blog.author.as_str()];
        if likes > best.likes {
            best = AuthorLikes {
                author: blog.author.clone(),
                likes,
            };
        }
    }
    best
}
