pub(crate) mod auth;
pub(crate) mod cache;
pub(crate) mod trace;
