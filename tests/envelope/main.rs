//! Envelope round-trip tests
//!
//! Values sent through the producer client are captured by an in-memory
//! transport and decoded by a consumer-side decoder built from a validated
//! consumer configuration. No broker is required.

mod recording;
mod round_trip_lib;
mod wiring_lib;
