//! MySQL result set core: typed values from text and binary protocol rows.
//!
//! The crate decodes rows a connection layer has already retrieved. A
//! [`result::ResultSet`] pairs [`column::ColumnDefinition`] metadata with one
//! of three row sources (materialized, streaming, cursor-fetched); rows
//! expose columns as raw byte ranges or as typed values through a
//! [`factory::ValueFactory`]. Sockets, handshakes, and statement execution
//! belong to the caller, which hands packets in through
//! [`transport::Transport`].
pub mod column;
pub mod constant;
pub mod decode;
pub mod error;
pub mod factory;
mod opts;
pub mod protocol;
pub mod result;
pub mod row;
pub mod rows;
pub mod transport;
pub mod value;

pub use error::{Error, Result};
pub use opts::ResultOpts;
