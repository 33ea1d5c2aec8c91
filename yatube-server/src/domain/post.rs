use chrono::{DateTime, Utc};
use serde::Serialize;

use super::error::DomainError;

/// Length of the short form used when a post or comment is shown as a label.
pub(crate) const TEXT_LIMIT: usize = 15;

/// The author columns eagerly loaded with every post and comment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub(crate) struct AuthorRef {
    pub(crate) id: i64,
    pub(crate) username: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub(crate) struct GroupRef {
    pub(crate) id: i64,
    pub(crate) title: String,
    pub(crate) slug: String,
}

#[derive(Debug, Clone, Serialize)]
pub(crate) struct Post {
    pub(crate) id: i64,
    pub(crate) text: String,
    pub(crate) pub_date: DateTime<Utc>,
    pub(crate) author: AuthorRef,
    pub(crate) group: Option<GroupRef>,
    /// Path relative to the media root, e.g. `posts/1700000000-cat.png`.
    pub(crate) image: Option<String>,
}

impl Post {
    pub(crate) fn new(
        id: i64,
        text: impl Into<String>,
        pub_date: DateTime<Utc>,
        author: AuthorRef,
        group: Option<GroupRef>,
        image: Option<String>,
    ) -> Result<Self, DomainError> {
        validate_positive_i64("id", id)?;
        validate_positive_i64("author_id", author.id)?;
        if let Some(group) = &group {
            validate_positive_i64("group_id", group.id)?;
        }
        let text = text.into();
        if text.trim().is_empty() {
            return Err(DomainError::Validation {
                field: "text",
                message: "must not be empty",
            });
        }

        Ok(Self {
            id,
            text,
            pub_date,
            author,
            group,
            image: image.filter(|path| !path.is_empty()),
        })
    }

    pub(crate) fn is_authored_by(&self, user_id: i64) -> bool {
        self.author.id == user_id
    }

    pub(crate) fn group_id(&self) -> Option<i64> {
        self.group.as_ref().map(|group| group.id)
    }
}

impl std::fmt::Display for Post {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&short_text(&self.text))
    }
}

/// The user-editable part of a post: what the create and edit forms submit.
#[derive(Debug, Clone)]
pub(crate) struct PostDraft {
    pub(crate) text: String,
    pub(crate) group_id: Option<i64>,
}

impl PostDraft {
    pub(crate) fn validate(self) -> Result<Self, DomainError> {
        if let Some(group_id) = self.group_id {
            validate_positive_i64("group", group_id)?;
        }
        Ok(Self {
            text: normalize_text(&self.text)?,
            group_id: self.group_id,
        })
    }
}

pub(crate) fn short_text(text: &str) -> String {
    text.chars().take(TEXT_LIMIT).collect()
}

pub(crate) fn normalize_text(text: &str) -> Result<String, DomainError> {
    let text = text.trim();
    if text.is_empty() {
        return Err(DomainError::Validation {
            field: "text",
            message: "must not be empty",
        });
    }
    Ok(text.to_string())
}

fn validate_positive_i64(field: &'static str, value: i64) -> Result<(), DomainError> {
    if value <= 0 {
        return Err(DomainError::Validation {
            field,
            message: "must be > 0",
        });
    }
    Ok(())
}
