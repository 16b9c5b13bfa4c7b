//! Tests for the game engine, organized by the part of a round they exercise.

#![cfg(test)]
#![allow(clippy::bool_assert_comparison)]

pub mod executive_powers;
pub mod snapshot;
pub mod views;
