pub mod batch;
pub mod classify;
pub mod copy;
pub mod fast_copy;
