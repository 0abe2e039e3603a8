pub(crate) mod blend;
pub(crate) mod fingerprint;
pub(crate) mod timeline;
