pub(crate) mod auth;
pub(crate) mod follow;
pub(crate) mod pages;
pub(crate) mod posts;
