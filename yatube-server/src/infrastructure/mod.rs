pub(crate) mod database;
pub(crate) mod jwt;
pub(crate) mod logging;
pub(crate) mod media;
pub(crate) mod page_cache;
pub(crate) mod settings;
