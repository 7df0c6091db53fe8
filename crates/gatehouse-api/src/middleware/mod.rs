//! Request middleware.

pub mod access;
