use axum::Form;
use axum::body::Bytes;
use axum::extract::multipart::MultipartError;
use axum::extract::{FromRequest, Multipart, Request};
use axum::http::header;
use serde::Deserialize;
use validator::{Validate, ValidationErrors};

use crate::domain::group::Group;
use crate::infrastructure::media::image_extension;
use crate::presentation::app_error::AppError;

pub(crate) const REQUIRED_FIELD: &str = "Обязательное поле.";
pub(crate) const INVALID_CHOICE: &str = "Выберите корректный вариант.";
pub(crate) const INVALID_IMAGE: &str =
    "Загрузите правильное изображение (jpg, jpeg, png, gif или webp).";

#[derive(Debug, Default, Deserialize)]
pub(crate) struct PageQuery {
    pub(crate) page: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct NextQuery {
    pub(crate) next: Option<String>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct CommentForm {
    #[serde(default)]
    pub(crate) text: String,
}

#[derive(Debug, Deserialize, Validate)]
pub(crate) struct LoginForm {
    #[serde(default)]
    #[validate(length(min = 1, max = 150, message = "Введите имя пользователя."))]
    pub(crate) username: String,
    #[serde(default)]
    #[validate(length(min = 1, message = "Введите пароль."))]
    pub(crate) password: String,
    #[serde(default)]
    pub(crate) next: String,
}

#[derive(Debug, Deserialize, Validate)]
pub(crate) struct SignupForm {
    #[serde(default)]
    #[validate(length(min = 1, max = 150, message = "Имя пользователя: от 1 до 150 символов."))]
    pub(crate) username: String,
    #[serde(default)]
    #[validate(email(message = "Введите правильный адрес электронной почты."))]
    pub(crate) email: String,
    #[serde(default)]
    #[validate(length(min = 8, max = 128, message = "Пароль: от 8 до 128 символов."))]
    pub(crate) password: String,
    #[serde(default)]
    #[validate(must_match(other = "password", message = "Пароли не совпадают."))]
    pub(crate) password_confirm: String,
}

/// What the login and signup pages echo back after a failed submission.
#[derive(Debug, Clone, Default)]
pub(crate) struct AccountFormView {
    pub(crate) username: String,
    pub(crate) email: String,
    pub(crate) errors: Vec<String>,
}

impl AccountFormView {
    pub(crate) fn with_errors(username: &str, email: &str, errors: Vec<String>) -> Self {
        Self {
            username: username.to_string(),
            email: email.to_string(),
            errors,
        }
    }
}

/// Flattens validator output into user-facing messages, sorted for a stable page.
pub(crate) fn error_messages(errors: &ValidationErrors) -> Vec<String> {
    let mut messages: Vec<String> = errors
        .field_errors()
        .into_iter()
        .flat_map(|(field, errs)| {
            errs.iter().map(move |err| match &err.message {
                Some(message) => message.to_string(),
                None => format!("{field}: {}", err.code),
            })
        })
        .collect();
    messages.sort();
    messages
}

#[derive(Debug, Clone)]
pub(crate) struct UploadedImage {
    pub(crate) file_name: String,
    pub(crate) bytes: Bytes,
}

/// Raw multipart fields of the create/edit form.
#[derive(Debug, Clone, Default)]
pub(crate) struct PostSubmission {
    pub(crate) text: String,
    pub(crate) group: String,
    pub(crate) image: Option<UploadedImage>,
}

/// Text fields of the post form when it arrives urlencoded (no image).
#[derive(Debug, Default, Deserialize)]
struct PostFields {
    #[serde(default)]
    text: String,
    #[serde(default)]
    group: String,
}

/// Reads the create/edit form from a multipart or an urlencoded body.
pub(crate) async fn read_post_submission(request: Request) -> Result<PostSubmission, AppError> {
    if is_multipart(&request) {
        let multipart = Multipart::from_request(request, &())
            .await
            .map_err(|rejection| AppError::BadRequest(rejection.body_text()))?;
        return read_post_form(multipart).await;
    }

    let Form(fields) = Form::<PostFields>::from_request(request, &())
        .await
        .map_err(|rejection| AppError::BadRequest(rejection.body_text()))?;
    Ok(PostSubmission {
        text: fields.text,
        group: fields.group,
        image: None,
    })
}

fn is_multipart(request: &Request) -> bool {
    request
        .headers()
        .get(header::CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .is_some_and(|value| {
            value
                .trim_start()
                .to_ascii_lowercase()
                .starts_with("multipart/form-data")
        })
}

async fn read_post_form(mut multipart: Multipart) -> Result<PostSubmission, AppError> {
    let mut submission = PostSubmission::default();

    while let Some(field) = multipart.next_field().await.map_err(bad_multipart)? {
        let name = field.name().unwrap_or_default().to_string();
        match name.as_str() {
            "text" => submission.text = field.text().await.map_err(bad_multipart)?,
            "group" => submission.group = field.text().await.map_err(bad_multipart)?,
            "image" => {
                let file_name = field.file_name().unwrap_or_default().to_string();
                let bytes = field.bytes().await.map_err(bad_multipart)?;
                // an empty file input still arrives as a nameless part
                if !file_name.is_empty() && !bytes.is_empty() {
                    submission.image = Some(UploadedImage { file_name, bytes });
                }
            }
            _ => {}
        }
    }

    Ok(submission)
}

fn bad_multipart(err: MultipartError) -> AppError {
    AppError::BadRequest(err.body_text())
}

#[derive(Debug, Clone)]
pub(crate) struct GroupOption {
    pub(crate) id: i64,
    pub(crate) title: String,
    pub(crate) selected: bool,
}

#[derive(Debug, Clone, Default)]
pub(crate) struct PostFormView {
    pub(crate) text: String,
    pub(crate) group_options: Vec<GroupOption>,
    pub(crate) no_group_selected: bool,
    pub(crate) current_image: Option<String>,
    pub(crate) text_errors: Vec<String>,
    pub(crate) group_errors: Vec<String>,
    pub(crate) image_errors: Vec<String>,
}

impl PostFormView {
    pub(crate) fn new(
        text: impl Into<String>,
        selected_group: Option<i64>,
        groups: &[Group],
        current_image: Option<String>,
    ) -> Self {
        let group_options = groups
            .iter()
            .map(|group| GroupOption {
                id: group.id,
                title: group.title.clone(),
                selected: Some(group.id) == selected_group,
            })
            .collect::<Vec<_>>();
        let no_group_selected = !group_options.iter().any(|option| option.selected);

        Self {
            text: text.into(),
            group_options,
            no_group_selected,
            current_image,
            ..Self::default()
        }
    }

    pub(crate) fn has_errors(&self) -> bool {
        !(self.text_errors.is_empty() && self.group_errors.is_empty() && self.image_errors.is_empty())
    }
}

/// Checks a submission against the available groups. The returned view keeps
/// the submitted values and carries any field errors.
pub(crate) fn check_post_submission(
    submission: &PostSubmission,
    groups: &[Group],
    current_image: Option<String>,
) -> (Option<i64>, PostFormView) {
    let (group_id, group_error) = match parse_group_choice(&submission.group, groups) {
        Ok(group_id) => (group_id, None),
        Err(message) => (None, Some(message)),
    };

    let mut form = PostFormView::new(submission.text.clone(), group_id, groups, current_image);
    if submission.text.trim().is_empty() {
        form.text_errors.push(REQUIRED_FIELD.to_string());
    }
    if let Some(message) = group_error {
        form.group_errors.push(message.to_string());
    }
    if let Some(image) = &submission.image
        && image_extension(&image.file_name).is_err()
    {
        form.image_errors.push(INVALID_IMAGE.to_string());
    }

    (group_id, form)
}

/// An empty choice means "no group"; anything else must name a listed group.
pub(crate) fn parse_group_choice(
    raw: &str,
    groups: &[Group],
) -> Result<Option<i64>, &'static str> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Ok(None);
    }
    let id = raw.parse::<i64>().map_err(|_| INVALID_CHOICE)?;
    if groups.iter().any(|group| group.id == id) {
        Ok(Some(id))
    } else {
        Err(INVALID_CHOICE)
    }
}

#[cfg(test)]
mod tests {
    use axum::body::Bytes;
    use validator::Validate;

    use super::{
        INVALID_CHOICE, PostSubmission, SignupForm, UploadedImage, check_post_submission,
        error_messages, is_multipart, parse_group_choice,
    };
    use crate::domain::group::Group;

    fn groups() -> Vec<Group> {
        vec![
            Group::new(1, "Cats", "cats", "").expect("group must be valid"),
            Group::new(2, "Dogs", "dogs", "").expect("group must be valid"),
        ]
    }

    #[test]
    fn group_choice_accepts_empty_and_listed_ids() {
        let groups = groups();
        assert_eq!(parse_group_choice("", &groups), Ok(None));
        assert_eq!(parse_group_choice(" 2 ", &groups), Ok(Some(2)));
        assert_eq!(parse_group_choice("9", &groups), Err(INVALID_CHOICE));
        assert_eq!(parse_group_choice("cats", &groups), Err(INVALID_CHOICE));
    }

    #[test]
    fn failed_submission_keeps_values_and_reports_fields() {
        let submission = PostSubmission {
            text: "   ".to_string(),
            group: "2".to_string(),
            image: Some(UploadedImage {
                file_name: "notes.txt".to_string(),
                bytes: Bytes::from_static(b"hello"),
            }),
        };

        let (group_id, form) = check_post_submission(&submission, &groups(), None);

        assert_eq!(group_id, Some(2));
        assert!(form.has_errors());
        assert_eq!(form.text_errors.len(), 1);
        assert!(form.group_errors.is_empty());
        assert_eq!(form.image_errors.len(), 1);
        assert!(form.group_options[1].selected);
        assert!(!form.no_group_selected);
    }

    #[test]
    fn valid_submission_has_no_errors() {
        let submission = PostSubmission {
            text: "Текст поста".to_string(),
            group: String::new(),
            image: None,
        };

        let (group_id, form) = check_post_submission(&submission, &groups(), None);
        assert_eq!(group_id, None);
        assert!(!form.has_errors());
        assert!(form.no_group_selected);
    }

    #[test]
    fn signup_passwords_must_match() {
        let form = SignupForm {
            username: "Daniel".to_string(),
            email: "daniel@example.com".to_string(),
            password: "very-secure-password".to_string(),
            password_confirm: "other-password".to_string(),
        };

        let errors = form.validate().expect_err("mismatch must fail");
        assert_eq!(error_messages(&errors), vec!["Пароли не совпадают.".to_string()]);
    }

    #[test]
    fn multipart_is_told_apart_from_urlencoded() {
        use axum::body::Body;
        use axum::extract::Request;

        let multipart = Request::post("/create/")
            .header("content-type", "Multipart/Form-Data; boundary=x")
            .body(Body::empty())
            .unwrap();
        let urlencoded = Request::post("/create/")
            .header("content-type", "application/x-www-form-urlencoded")
            .body(Body::empty())
            .unwrap();
        let bare = Request::post("/create/").body(Body::empty()).unwrap();

        assert!(is_multipart(&multipart));
        assert!(!is_multipart(&urlencoded));
        assert!(!is_multipart(&bare));
    }
}
