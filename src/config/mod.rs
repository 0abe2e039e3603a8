pub(crate) mod app;
pub(crate) mod preset;
pub(crate) mod style;
