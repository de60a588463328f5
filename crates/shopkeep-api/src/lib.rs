//! Async client for the shopkeep GraphQL backend.
//!
//! [`GraphQlClient`] owns the HTTP exchange and the `{data, errors}`
//! envelope; typed operations for users, products and token issuance
//! are inherent methods on it. Credentials are passed per call.

pub mod auth;
pub mod client;
pub mod error;
pub mod models;
pub mod products;
pub mod transport;
pub mod users;

pub use client::GraphQlClient;
pub use error::Error;
pub use models::{
    AuthPayload, CreateProductInput, CreateUserInput, LoginInput, Product, RegisterInput,
    UpdateProductInput, UpdateUserInput, User,
};
pub use transport::TransportConfig;
