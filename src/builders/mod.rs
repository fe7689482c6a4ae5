//! Builders to construct work adapters from configuration.

pub mod adapter_builder;

pub use adapter_builder::AdapterBuilder;
