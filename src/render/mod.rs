pub(crate) mod batch;
pub(crate) mod job;
pub(crate) mod pipeline;
