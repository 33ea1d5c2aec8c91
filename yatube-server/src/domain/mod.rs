pub(crate) mod comment;
pub(crate) mod error;
pub(crate) mod group;
pub(crate) mod pagination;
pub(crate) mod post;
pub(crate) mod user;
