//! # folio-channels
//!
//! Messaging platform integrations for Folio.

pub mod telegram;
pub(crate) mod utils;
