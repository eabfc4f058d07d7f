//! Shared types for the kafka-envelope consumer and producer crates.
//!
//! This crate provides:
//!
//! - [`Envelope`] - the JSON wire wrapper carrying a payload plus string headers
//! - [`PayloadType`] / [`TypeRegistry`] - runtime resolution of a payload type
//!   from a registered name, used to decode envelopes without static generics
//! - [`Properties`] / [`PropertyBuilder`] - the option set handed to the Kafka
//!   client, with "set if absent" defaulting
//!
//! # Dependency Direction
//!
//! ```text
//! envelope-types (this crate):
//!   - Defines: Envelope, AnyPayload, PayloadType, TypeRegistry, Properties
//!   - NO dependency on rdkafka
//!
//! kafka-envelope-consumer / kafka-envelope-producer:
//!   - Depend on: envelope-types
//!   - Provide: configs, deserializers, consumer runtime, producer client
//! ```
//!
//! # Example
//!
//! ```
//! use envelope_types::{Envelope, TypeRegistry};
//! use serde::{Deserialize, Serialize};
//!
//! #[derive(Debug, PartialEq, Serialize, Deserialize)]
//! struct Order {
//!     id: u64,
//! }
//!
//! let mut registry = TypeRegistry::new();
//! registry.register::<Order>("orders.Order").unwrap();
//!
//! let bytes = serde_json::to_vec(&Envelope::of(Order { id: 7 })).unwrap();
//! let decoded = registry.resolve("orders.Order").unwrap().decode(&bytes).unwrap();
//! let order: Envelope<Order> = decoded.downcast().unwrap();
//! assert_eq!(order.payload(), &Order { id: 7 });
//! ```

pub mod envelope;
pub mod error;
pub mod keys;
pub mod props;
pub mod registry;

// Re-export main types for convenient access
pub use envelope::{AnyPayload, Envelope, Headers};
pub use error::{EnvelopeTypesError, Result};
pub use props::{to_comma_separated, Properties, PropertyBuilder, PropertyValue};
pub use registry::{PayloadType, TypeRegistry};
