//! Math utilities for the Diff-Wheel Bot.
//!
//! This module provides the duty scaling and carrier-period policy for the
//! two-channel H-bridge motor shield.

pub mod scaling;
