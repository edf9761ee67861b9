//! Booking core for a ritual and wellness business
//!
//! Appointments are booked against `(date, time)` slots with at most one active appointment per
//! slot. Writes go through the command services in [`commands`]; enriched reads through
//! [`views`]. Storage, identity and the catalog sit behind the traits in [`ports`].

pub mod adapters;
pub mod bootstrap;
pub mod commands;
pub mod config;
pub mod domain;
pub mod ports;
pub mod seed;
pub mod views;
