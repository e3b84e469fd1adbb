//! Driving an exchange from an asynchronous chunk stream.
//!
//! The transport is anything that yields `Result<chunk, error>` items, for
//! instance the body stream of an HTTP response. Chunk arrival is the only
//! suspension point; dropping the returned future cancels the exchange,
//! discarding the parser buffer and leaving the phase as it was.

mod driver;

pub use driver::drive;
