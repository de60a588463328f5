// User operations (`users`, `user`, `createUser`, `updateUser`, `deleteUser`).

use secrecy::SecretString;
use serde::Deserialize;
use serde_json::json;
use tracing::debug;

use crate::client::GraphQlClient;
use crate::error::Error;
use crate::models::{CreateUserInput, UpdateUserInput, User};

const USER_FIELDS: &str = "_id name email";

#[derive(Deserialize)]
struct UsersData {
    users: Vec<User>,
}

#[derive(Deserialize)]
struct UserData {
    user: Option<User>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct CreateUserData {
    create_user: User,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct UpdateUserData {
    update_user: User,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct DeleteUserData {
    delete_user: DeletedUser,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct DeletedUser {
    deleted_user_id: String,
}

impl GraphQlClient {
    /// List every user account.
    pub async fn list_users(&self, token: &SecretString) -> Result<Vec<User>, Error> {
        let query = format!("query Users {{ users {{ {USER_FIELDS} }} }}");
        let data: UsersData = self.execute("Users", &query, json!({}), Some(token)).await?;
        debug!(count = data.users.len(), "listed users");
        Ok(data.users)
    }

    /// Fetch a single user by id.
    pub async fn get_user(&self, id: &str, token: &SecretString) -> Result<User, Error> {
        let query = format!("query User($id: ID!) {{ user(id: $id) {{ {USER_FIELDS} }} }}");
        let data: UserData = self
            .execute("User", &query, json!({ "id": id }), Some(token))
            .await?;
        data.user.ok_or_else(|| Error::GraphQl {
            message: format!("user {id} not found"),
            code: Some("NOT_FOUND".into()),
        })
    }

    /// Create a user account.
    pub async fn create_user(
        &self,
        input: &CreateUserInput,
        token: &SecretString,
    ) -> Result<User, Error> {
        let query = format!(
            "mutation CreateUser($input: CreateUserInput!) {{ createUser(input: $input) {{ {USER_FIELDS} }} }}"
        );
        let data: CreateUserData = self
            .execute("CreateUser", &query, json!({ "input": input }), Some(token))
            .await?;
        Ok(data.create_user)
    }

    /// Update the fields present in `input`.
    pub async fn update_user(
        &self,
        id: &str,
        input: &UpdateUserInput,
        token: &SecretString,
    ) -> Result<User, Error> {
        let query = format!(
            "mutation UpdateUser($id: ID!, $input: UpdateUserInput!) {{ updateUser(id: $id, input: $input) {{ {USER_FIELDS} }} }}"
        );
        let data: UpdateUserData = self
            .execute(
                "UpdateUser",
                &query,
                json!({ "id": id, "input": input }),
                Some(token),
            )
            .await?;
        Ok(data.update_user)
    }

    /// Delete a user, returning the id the server reports as removed.
    pub async fn delete_user(&self, id: &str, token: &SecretString) -> Result<String, Error> {
        let query = "mutation DeleteUser($id: ID!) { deleteUser(id: $id) { deletedUserId } }";
        let data: DeleteUserData = self
            .execute("DeleteUser", query, json!({ "id": id }), Some(token))
            .await?;
        Ok(data.delete_user.deleted_user_id)
    }
}
