pub(crate) mod background;
pub(crate) mod font;
pub(crate) mod media;
