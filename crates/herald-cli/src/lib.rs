//! Herald CLI library.
//!
//! This crate provides the command-line interface used to drive a scripted
//! login flow against a fresh status store and print what each subscriber
//! observed.

pub mod cli;
pub mod commands;
pub mod step;
