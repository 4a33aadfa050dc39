//! Gateway module - Request dispatch

pub mod dispatcher;
