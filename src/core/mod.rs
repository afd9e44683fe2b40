//! Core business logic for init-data operations.
//!
//! This module contains the protocol logic separated from CLI concerns.
//! Everything here is pure and synchronous, and testable without the
//! CLI or router layers.
//!
//! The pipeline runs in explicit stages: [`raw`] parses the query string
//! into pairs, [`canonical`] builds the data-check string, [`secret`]
//! holds the HMAC keys, and [`decoder`] / [`validator`] compose them.

pub mod canonical;
pub mod decoder;
pub mod raw;
pub mod secret;
pub mod time_travel;
pub mod validator;
