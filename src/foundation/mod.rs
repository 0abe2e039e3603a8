pub(crate) mod color;
pub(crate) mod core;
pub(crate) mod error;
pub(crate) mod logging;
pub(crate) mod math;
