pub mod dashboard;
pub mod debounce;
pub mod topics;
