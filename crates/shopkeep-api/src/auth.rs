// Token issuance: `register` and `login`.
//
// Both run without a bearer token; the auth middleware exempts them.
// On success the caller owns the returned token and decides where it
// is persisted.

use serde::Deserialize;
use serde_json::json;
use tracing::debug;

use crate::client::GraphQlClient;
use crate::error::Error;
use crate::models::{AuthPayload, LoginInput, RegisterInput};

const AUTH_FIELDS: &str = "token user { _id name email }";

#[derive(Deserialize)]
struct RegisterData {
    register: AuthPayload,
}

#[derive(Deserialize)]
struct LoginData {
    login: AuthPayload,
}

impl GraphQlClient {
    /// Create an account and receive a token for it.
    ///
    /// Fails with a GraphQL error `email already exists` on duplicates.
    pub async fn register(&self, input: &RegisterInput) -> Result<AuthPayload, Error> {
        debug!(email = %input.email, "registering");
        let query = format!(
            "mutation Register($input: RegisterInput!) {{ register(input: $input) {{ {AUTH_FIELDS} }} }}"
        );
        let data: RegisterData = self
            .execute("Register", &query, json!({ "input": input }), None)
            .await?;
        debug!(user_id = %data.register.user.id, "registration successful");
        Ok(data.register)
    }

    /// Exchange credentials for a token.
    ///
    /// Fails with a GraphQL error `invalid email or password`.
    pub async fn login(&self, input: &LoginInput) -> Result<AuthPayload, Error> {
        debug!(email = %input.email, "logging in");
        let query = format!(
            "mutation Login($input: LoginInput!) {{ login(input: $input) {{ {AUTH_FIELDS} }} }}"
        );
        let data: LoginData = self
            .execute("Login", &query, json!({ "input": input }), None)
            .await?;
        debug!("login successful");
        Ok(data.login)
    }
}
