use serde::Serialize;

use super::error::DomainError;

/// A named category a post may optionally belong to.
///
/// Groups are created out-of-band by an operator; the web application only
/// reads them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub(crate) struct Group {
    pub(crate) id: i64,
    pub(crate) title: String,
    pub(crate) slug: String,
    pub(crate) description: String,
}

impl Group {
    pub(crate) fn new(
        id: i64,
        title: impl Into<String>,
        slug: impl Into<String>,
        description: impl Into<String>,
    ) -> Result<Self, DomainError> {
        if id <= 0 {
            return Err(DomainError::Validation {
                field: "id",
                message: "must be > 0",
            });
        }
        let title = title.into();
        if title.trim().is_empty() || title.chars().count() > 200 {
            return Err(DomainError::Validation {
                field: "title",
                message: "must be 1..200 chars",
            });
        }
        let slug = slug.into();
        validate_slug(&slug)?;

        Ok(Self {
            id,
            title,
            slug,
            description: description.into(),
        })
    }
}

impl std::fmt::Display for Group {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.title)
    }
}

pub(crate) fn validate_slug(slug: &str) -> Result<(), DomainError> {
    let valid = !slug.is_empty()
        && slug.len() <= 50
        && slug
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_');
    if !valid {
        return Err(DomainError::Validation {
            field: "slug",
            message: "must be 1..50 chars of letters, digits, '-' or '_'",
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::{Group, validate_slug};

    #[test]
    fn group_displays_as_title() {
        let group = Group::new(1, "Тестовая группа", "test-slug", "Тестовое описание")
            .expect("group must be valid");
        assert_eq!(group.to_string(), "Тестовая группа");
    }

    #[test]
    fn slug_must_be_url_safe() {
        assert!(validate_slug("test-slug").is_ok());
        assert!(validate_slug("testing_slug").is_ok());
        assert!(validate_slug("").is_err());
        assert!(validate_slug("with space").is_err());
        assert!(validate_slug("кириллица").is_err());
    }

    #[test]
    fn group_new_rejects_blank_title() {
        assert!(Group::new(1, "  ", "slug", "").is_err());
    }
}
