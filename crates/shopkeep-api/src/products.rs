// Product operations (`products`, `product`, `createProduct`,
// `updateProduct`, `deleteProduct`).

use secrecy::SecretString;
use serde::Deserialize;
use serde_json::json;
use tracing::debug;

use crate::client::GraphQlClient;
use crate::error::Error;
use crate::models::{CreateProductInput, Product, UpdateProductInput};

const PRODUCT_FIELDS: &str = "_id name price stock";

#[derive(Deserialize)]
struct ProductsData {
    products: Vec<Product>,
}

#[derive(Deserialize)]
struct ProductData {
    product: Option<Product>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct CreateProductData {
    create_product: Product,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct UpdateProductData {
    update_product: Product,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct DeleteProductData {
    delete_product: DeletedProduct,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct DeletedProduct {
    deleted_product_id: String,
}

impl GraphQlClient {
    /// List the whole catalog.
    pub async fn list_products(&self, token: &SecretString) -> Result<Vec<Product>, Error> {
        let query = format!("query Products {{ products {{ {PRODUCT_FIELDS} }} }}");
        let data: ProductsData = self
            .execute("Products", &query, json!({}), Some(token))
            .await?;
        debug!(count = data.products.len(), "listed products");
        Ok(data.products)
    }

    pub async fn get_product(&self, id: &str, token: &SecretString) -> Result<Product, Error> {
        let query =
            format!("query Product($id: ID!) {{ product(id: $id) {{ {PRODUCT_FIELDS} }} }}");
        let data: ProductData = self
            .execute("Product", &query, json!({ "id": id }), Some(token))
            .await?;
        data.product.ok_or_else(|| Error::GraphQl {
            message: format!("product {id} not found"),
            code: Some("NOT_FOUND".into()),
        })
    }

    pub async fn create_product(
        &self,
        input: &CreateProductInput,
        token: &SecretString,
    ) -> Result<Product, Error> {
        let query = format!(
            "mutation CreateProduct($input: CreateProductInput!) {{ createProduct(input: $input) {{ {PRODUCT_FIELDS} }} }}"
        );
        let data: CreateProductData = self
            .execute(
                "CreateProduct",
                &query,
                json!({ "input": input }),
                Some(token),
            )
            .await?;
        Ok(data.create_product)
    }

    pub async fn update_product(
        &self,
        id: &str,
        input: &UpdateProductInput,
        token: &SecretString,
    ) -> Result<Product, Error> {
        let query = format!(
            "mutation UpdateProduct($id: ID!, $input: UpdateProductInput!) {{ updateProduct(id: $id, input: $input) {{ {PRODUCT_FIELDS} }} }}"
        );
        let data: UpdateProductData = self
            .execute(
                "UpdateProduct",
                &query,
                json!({ "id": id, "input": input }),
                Some(token),
            )
            .await?;
        Ok(data.update_product)
    }

    pub async fn delete_product(&self, id: &str, token: &SecretString) -> Result<String, Error> {
        let query =
            "mutation DeleteProduct($id: ID!) { deleteProduct(id: $id) { deletedProductId } }";
        let data: DeleteProductData = self
            .execute("DeleteProduct", query, json!({ "id": id }), Some(token))
            .await?;
        Ok(data.delete_product.deleted_product_id)
    }
}
