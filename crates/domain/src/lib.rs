//! # weatherbell-domain
//!
//! Pure domain model for the weatherbell daily weather-broadcast system.
//!
//! ## Responsibilities
//! - Foundational types: typed identifiers, error conventions, timestamps
//! - Define **Cities** (named coordinates a trigger is bound to)
//! - Define **Triggers** (daily hour:minute + city pairs the user wants announced)
//! - Next-occurrence arithmetic (wall-clock daily rollover)
//! - Weather condition-code → phrase mapping and announcement composition
//! - Contain all invariant enforcement and domain logic
//!
//! ## Dependency rule
//! This crate has **no internal dependencies**.
//! It must never import anything from `app`, adapters, or external IO crates.
//! All IO boundaries are expressed as traits in the `app` crate (ports).

pub mod error;
pub mod id;
pub mod time;

pub mod announce;
pub mod city;
pub mod trigger;
pub mod weather;
