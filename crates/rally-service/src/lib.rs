pub mod calendar;
pub mod codec;
pub mod error;
pub mod record;
pub mod store;
