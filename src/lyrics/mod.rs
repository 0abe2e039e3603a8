pub(crate) mod segment;
pub(crate) mod srt;
pub(crate) mod transcript;
