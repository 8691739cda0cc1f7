//! HTTP request handlers, one module per resource.

pub mod compare;
pub mod document;
pub mod file;
pub mod health;
pub mod share;
