//! Lists served by the admin backend

pub mod order;
