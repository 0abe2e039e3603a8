pub(crate) mod timed;
