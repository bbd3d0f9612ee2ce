//! Google Books API client with service-account authentication.
//!
//! Exposes the `books` modules for library use and integration tests;
//! the `gbooks` binary is a thin CLI over them.

pub mod books;
pub mod config;
