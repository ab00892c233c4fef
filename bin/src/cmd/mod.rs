//! CLI subcommand modules.
//!
//! This module contains the implementations for all impetu CLI subcommands.

pub(crate) mod compute;
pub(crate) mod dates;
pub(crate) mod rank;
pub(crate) mod signals;
