pub(crate) mod database;
pub(crate) mod jwt;
pub(crate) mod logging;
pub(crate) mod mailer;
pub(crate) mod oauth;
pub(crate) mod settings;
