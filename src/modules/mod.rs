pub mod conversion;
pub mod movie;
