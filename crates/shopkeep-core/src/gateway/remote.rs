// Gateway backed by the GraphQL API.
//
// Pulls the bearer token from the shared `SessionState` on every call.
// Without an authenticated session, calls fail with `Auth` before any
// request is sent.

use std::sync::Arc;

use secrecy::SecretString;
use shopkeep_api::{GraphQlClient, LoginInput, RegisterInput};
use tracing::debug;

use super::{IdentityProvider, ResourceGateway};
use crate::error::{CoreError, ErrorKind};
use crate::model::{
    Account, AccountPatch, CatalogItem, CatalogItemPatch, EntityId, NewAccount, NewCatalogItem,
    Resource, ResourceKind,
};
use crate::session::{Actor, SessionState};

#[derive(Clone)]
pub struct RemoteGateway {
    client: Arc<GraphQlClient>,
    session: SessionState,
}

impl RemoteGateway {
    pub fn new(client: Arc<GraphQlClient>, session: SessionState) -> Self {
        Self { client, session }
    }

    pub fn client(&self) -> &GraphQlClient {
        &self.client
    }

    fn token(&self) -> Result<SecretString, CoreError> {
        self.session.token().ok_or_else(CoreError::not_signed_in)
    }
}

fn api_err(
    kind: ResourceKind,
    id: Option<&EntityId>,
) -> impl FnOnce(shopkeep_api::Error) -> CoreError {
    move |e| CoreError::from_api(e, kind, id.map(EntityId::as_str))
}

// ── Accounts ────────────────────────────────────────────────────────

impl ResourceGateway<Account> for RemoteGateway {
    async fn list(&self) -> Result<Vec<Account>, CoreError> {
        let token = self.token()?;
        let users = self
            .client
            .list_users(&token)
            .await
            .map_err(api_err(Account::KIND, None))?;
        Ok(users.into_iter().map(Account::from).collect())
    }

    async fn get(&self, id: &EntityId) -> Result<Account, CoreError> {
        let token = self.token()?;
        let user = self
            .client
            .get_user(id.as_str(), &token)
            .await
            .map_err(api_err(Account::KIND, Some(id)))?;
        Ok(user.into())
    }

    async fn create(&self, input: NewAccount) -> Result<Account, CoreError> {
        let token = self.token()?;
        let user = self
            .client
            .create_user(&input.into(), &token)
            .await
            .map_err(api_err(Account::KIND, None))?;
        debug!(id = %user.id, "account created");
        Ok(user.into())
    }

    async fn update(&self, id: &EntityId, patch: AccountPatch) -> Result<Account, CoreError> {
        let token = self.token()?;
        let user = self
            .client
            .update_user(id.as_str(), &patch.into(), &token)
            .await
            .map_err(api_err(Account::KIND, Some(id)))?;
        Ok(user.into())
    }

    async fn delete(&self, id: &EntityId) -> Result<EntityId, CoreError> {
        let token = self.token()?;
        let deleted = self
            .client
            .delete_user(id.as_str(), &token)
            .await
            .map_err(api_err(Account::KIND, Some(id)))?;
        Ok(EntityId::from(deleted))
    }
}

// ── Catalog ─────────────────────────────────────────────────────────

impl ResourceGateway<CatalogItem> for RemoteGateway {
    async fn list(&self) -> Result<Vec<CatalogItem>, CoreError> {
        let token = self.token()?;
        let products = self
            .client
            .list_products(&token)
            .await
            .map_err(api_err(CatalogItem::KIND, None))?;
        Ok(products.into_iter().map(CatalogItem::from).collect())
    }

    async fn get(&self, id: &EntityId) -> Result<CatalogItem, CoreError> {
        let token = self.token()?;
        let product = self
            .client
            .get_product(id.as_str(), &token)
            .await
            .map_err(api_err(CatalogItem::KIND, Some(id)))?;
        Ok(product.into())
    }

    async fn create(&self, input: NewCatalogItem) -> Result<CatalogItem, CoreError> {
        let token = self.token()?;
        let product = self
            .client
            .create_product(&input.into(), &token)
            .await
            .map_err(api_err(CatalogItem::KIND, None))?;
        debug!(id = %product.id, "catalog item created");
        Ok(product.into())
    }

    async fn update(
        &self,
        id: &EntityId,
        patch: CatalogItemPatch,
    ) -> Result<CatalogItem, CoreError> {
        let token = self.token()?;
        let product = self
            .client
            .update_product(id.as_str(), &patch.into(), &token)
            .await
            .map_err(api_err(CatalogItem::KIND, Some(id)))?;
        Ok(product.into())
    }

    async fn delete(&self, id: &EntityId) -> Result<EntityId, CoreError> {
        let token = self.token()?;
        let deleted = self
            .client
            .delete_product(id.as_str(), &token)
            .await
            .map_err(api_err(CatalogItem::KIND, Some(id)))?;
        Ok(EntityId::from(deleted))
    }
}

// ── Identity ────────────────────────────────────────────────────────

impl IdentityProvider for RemoteGateway {
    async fn register(
        &self,
        name: &str,
        email: &str,
        password: SecretString,
    ) -> Result<(Actor, SecretString), CoreError> {
        let input = RegisterInput {
            name: name.to_owned(),
            email: email.to_owned(),
            password,
        };
        let payload = self
            .client
            .register(&input)
            .await
            .map_err(api_err(ResourceKind::Account, None))?;
        Ok((payload.user.into(), SecretString::from(payload.token)))
    }

    async fn login(
        &self,
        email: &str,
        password: SecretString,
    ) -> Result<(Actor, SecretString), CoreError> {
        let input = LoginInput {
            email: email.to_owned(),
            password,
        };
        let payload = self.client.login(&input).await.map_err(|e| {
            match CoreError::from_api(e, ResourceKind::Account, None) {
                // "invalid email or password" is a credential failure, not bad input.
                CoreError::Validation { message, .. } => CoreError::Auth { message },
                other if other.kind() == ErrorKind::NotFound => CoreError::Auth {
                    message: "invalid email or password".into(),
                },
                other => other,
            }
        })?;
        Ok((payload.user.into(), SecretString::from(payload.token)))
    }
}
