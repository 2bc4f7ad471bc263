//! API Module
//!
//! REST edge over the directory and the server that hosts it.

pub mod rest;
pub mod server;

pub use rest::*;
pub use server::*;
