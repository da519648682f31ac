//! Core motor control for the Diff-Wheel Bot on no-std embedded platforms.
//!
//! For a runnable host-side simulation, see the `dwb-app/mock-mcu` binary.
#![no_std]

pub mod utils;
