use chrono::{DateTime, Utc};
use serde::Serialize;

use super::error::DomainError;
use super::post::{AuthorRef, normalize_text, short_text};

#[derive(Debug, Clone, Serialize)]
pub(crate) struct Comment {
    pub(crate) id: i64,
    pub(crate) post_id: i64,
    pub(crate) author: AuthorRef,
    pub(crate) text: String,
    pub(crate) created: DateTime<Utc>,
}

impl Comment {
    pub(crate) fn new(
        id: i64,
        post_id: i64,
        author: AuthorRef,
        text: impl Into<String>,
        created: DateTime<Utc>,
    ) -> Result<Self, DomainError> {
        if id <= 0 || post_id <= 0 || author.id <= 0 {
            return Err(DomainError::Validation {
                field: "id",
                message: "must be > 0",
            });
        }
        Ok(Self {
            id,
            post_id,
            author,
            text: text.into(),
            created,
        })
    }
}

impl std::fmt::Display for Comment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&short_text(&self.text))
    }
}

#[derive(Debug, Clone)]
pub(crate) struct CommentDraft {
    pub(crate) text: String,
}

impl CommentDraft {
    pub(crate) fn validate(self) -> Result<Self, DomainError> {
        Ok(Self {
            text: normalize_text(&self.text)?,
        })
    }
}

#[cfg(test)]
mod tests {
    use chrono::Utc;

    use super::{Comment, CommentDraft};
    use crate::domain::post::AuthorRef;

    #[test]
    fn comment_displays_short_text() {
        let author = AuthorRef {
            id: 2,
            username: "Plato".to_string(),
        };
        let comment = Comment::new(1, 1, author, "Комментарий к посту", Utc::now())
            .expect("comment must be valid");
        assert_eq!(comment.to_string(), "Комментарий к п");
    }

    #[test]
    fn draft_rejects_whitespace_only_text() {
        let draft = CommentDraft {
            text: " \n\t ".to_string(),
        };
        assert!(draft.validate().is_err());
    }
}
