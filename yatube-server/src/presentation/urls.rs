//! Paths the handlers redirect to.
//!
//! Everything that ends up in a `Location` header goes through
//! [`encode_location`], so user-supplied segments never produce an invalid
//! header value.

pub(crate) const LOGIN_PATH: &str = "/auth/login/";

pub(crate) fn profile_path(username: &str) -> String {
    format!("/profile/{}/", urlencoding::encode(username))
}

pub(crate) fn post_detail_path(post_id: i64) -> String {
    format!("/posts/{post_id}/")
}

/// `/auth/login/?next=<next>` with `next` percent-encoded except for `/`.
pub(crate) fn login_path(next: &str) -> String {
    let next = urlencoding::encode(next).replace("%2F", "/");
    format!("{LOGIN_PATH}?next={next}")
}

/// Accepts only same-site absolute paths as a post-login target.
pub(crate) fn safe_next(next: Option<&str>) -> Option<String> {
    let next = next?.trim();
    if !next.starts_with('/') || next.starts_with("//") || next.contains('\\') {
        return None;
    }
    Some(encode_location(next))
}

/// Percent-encodes every byte that is not printable ASCII.
pub(crate) fn encode_location(path: &str) -> String {
    let mut encoded = String::with_capacity(path.len());
    let mut buf = [0u8; 4];
    for c in path.chars() {
        if c.is_ascii_graphic() {
            encoded.push(c);
        } else {
            encoded.push_str(&urlencoding::encode(c.encode_utf8(&mut buf)));
        }
    }
    encoded
}
