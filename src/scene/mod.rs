pub(crate) mod clock;
pub(crate) mod config;
pub(crate) mod driver;
