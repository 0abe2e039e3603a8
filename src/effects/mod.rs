pub(crate) mod kind;
pub(crate) mod library;
pub(crate) mod transform;
