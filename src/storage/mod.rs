//! Storage implementations of the order list

pub mod in_memory;

pub use in_memory::InMemoryOrderStore;
