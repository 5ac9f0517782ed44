//! # folio-core
//!
//! Core types, traits, configuration, text catalog and session store for Folio.

pub mod action;
pub mod catalog;
pub mod config;
pub mod error;
pub mod message;
pub mod session;
pub mod traits;
