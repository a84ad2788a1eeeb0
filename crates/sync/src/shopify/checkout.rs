//! Shopify Storefront API client for checkout creation.
//!
//! Carts live in the browser; this client turns a cart's lines into a
//! hosted Shopify checkout and hands the `webUrl` back to the frontend.
//! Uses a raw mutation string with typed serde envelopes.

use std::sync::Arc;

use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize, de::DeserializeOwned};
use sugarpine_core::ShopifyVariantId;
use tracing::{instrument, warn};

use super::{GraphQLError, GraphQLErrorLocation, ShopifyError, build_http_client};
use crate::config::ShopifySyncConfig;

/// Access token header for the Storefront API.
const STOREFRONT_TOKEN_HEADER: &str = "X-Shopify-Storefront-Access-Token";

/// Prefix turning a bare variant id into a Storefront API global id.
const VARIANT_GID_PREFIX: &str = "gid://shopify/ProductVariant/";

/// Checkout creation mutation.
///
/// `checkoutCreate` exists in the older Storefront API versions this
/// service pins (the Cart API replaced it in newer ones).
const CHECKOUT_CREATE_MUTATION: &str = r"
mutation checkoutCreate($input: CheckoutCreateInput!) {
  checkoutCreate(input: $input) {
    checkout {
      id
      webUrl
    }
    checkoutUserErrors {
      field
      message
    }
  }
}
";

/// Shopify Storefront API client.
#[derive(Clone)]
pub struct StorefrontClient {
    inner: Arc<StorefrontClientInner>,
}

struct StorefrontClientInner {
    client: reqwest::Client,
    domain: String,
    api_version: String,
    storefront_token: SecretString,
}

impl std::fmt::Debug for StorefrontClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StorefrontClient")
            .field("domain", &self.inner.domain)
            .field("api_version", &self.inner.api_version)
            .field("storefront_token", &"[REDACTED]")
            .finish()
    }
}

/// One cart line to check out.
#[derive(Debug, Clone)]
pub struct CheckoutLine {
    /// Shopify variant id (bare numeric form; the gid is built here).
    pub variant_id: ShopifyVariantId,
    /// Units of this variant.
    pub quantity: i64,
}

/// A created checkout session.
#[derive(Debug, Clone)]
pub struct CheckoutSession {
    /// Shopify checkout id.
    pub id: String,
    /// Hosted checkout URL the frontend redirects to.
    pub web_url: String,
}

impl StorefrontClient {
    /// Create a new Storefront API client.
    ///
    /// # Panics
    ///
    /// Panics if the HTTP client cannot be created. This should never happen
    /// under normal circumstances as we use standard TLS configuration.
    #[must_use]
    pub fn new(config: &ShopifySyncConfig) -> Self {
        Self {
            inner: Arc::new(StorefrontClientInner {
                client: build_http_client(),
                domain: config.domain.clone(),
                api_version: config.api_version.clone(),
                storefront_token: config.storefront_token.clone(),
            }),
        }
    }

    /// Create a checkout session for the given cart lines.
    ///
    /// # Errors
    ///
    /// Returns `ShopifyError::UserError` with Shopify's first reported
    /// message when the mutation succeeds but the lines are unpurchasable,
    /// and transport-level variants (`Http`, `Status`, `GraphQL`,
    /// `MissingData`) when the call itself fails.
    #[instrument(skip(self, lines), fields(lines = lines.len()))]
    pub async fn create_checkout(
        &self,
        lines: &[CheckoutLine],
    ) -> Result<CheckoutSession, ShopifyError> {
        let input = CheckoutInput {
            line_items: lines
                .iter()
                .map(|line| LineItemInput {
                    variant_id: format!("{VARIANT_GID_PREFIX}{}", line.variant_id),
                    quantity: line.quantity,
                })
                .collect(),
        };

        let data: CheckoutCreateData = self
            .execute(
                CHECKOUT_CREATE_MUTATION,
                serde_json::json!({ "input": input }),
            )
            .await?;

        let payload = data
            .checkout_create
            .ok_or(ShopifyError::MissingData("checkoutCreate"))?;

        if let Some(error) = payload.checkout_user_errors.first() {
            warn!(field = ?error.field, message = %error.message, "Checkout rejected by Shopify");
            return Err(ShopifyError::UserError(error.message.clone()));
        }

        let checkout = payload
            .checkout
            .ok_or(ShopifyError::MissingData("checkout"))?;

        Ok(CheckoutSession {
            id: checkout.id,
            web_url: checkout.web_url,
        })
    }

    /// Execute a GraphQL query against the Storefront API.
    ///
    /// # Errors
    ///
    /// Returns `ShopifyError::RateLimited` on 429 responses,
    /// `ShopifyError::Status` on other non-success responses,
    /// `ShopifyError::GraphQL` when the response carries errors, and
    /// `ShopifyError::MissingData` when it carries neither data nor errors.
    #[instrument(skip(self, query, variables))]
    async fn execute<T: DeserializeOwned>(
        &self,
        query: &str,
        variables: serde_json::Value,
    ) -> Result<T, ShopifyError> {
        let body = serde_json::json!({
            "query": query,
            "variables": variables,
        });

        let response = self
            .inner
            .client
            .post(format!(
                "https://{}/api/{}/graphql.json",
                self.inner.domain, self.inner.api_version
            ))
            .header(
                STOREFRONT_TOKEN_HEADER,
                self.inner.storefront_token.expose_secret(),
            )
            .header("Content-Type", "application/json")
            .json(&body)
            .send()
            .await?;

        // Check for rate limiting
        if response.status() == reqwest::StatusCode::TOO_MANY_REQUESTS {
            let retry_after = response
                .headers()
                .get("Retry-After")
                .and_then(|v| v.to_str().ok())
                .and_then(|s| s.parse().ok())
                .unwrap_or(60);
            return Err(ShopifyError::RateLimited(retry_after));
        }

        let status = response.status();
        let text = response.text().await?;
        if !status.is_success() {
            return Err(ShopifyError::Status { status, body: text });
        }

        let envelope: GraphQLResponse<T> = serde_json::from_str(&text)?;

        // Check for GraphQL errors
        if let Some(errors) = envelope.errors
            && !errors.is_empty()
        {
            let converted: Vec<GraphQLError> = errors.into_iter().map(Into::into).collect();
            return Err(ShopifyError::GraphQL(converted));
        }

        envelope.data.ok_or(ShopifyError::MissingData("data"))
    }
}

// =============================================================================
// Wire Types
// =============================================================================

/// GraphQL response wrapper.
#[derive(Debug, Deserialize)]
struct GraphQLResponse<T> {
    data: Option<T>,
    errors: Option<Vec<GraphQLErrorResponse>>,
}

#[derive(Debug, Deserialize)]
struct GraphQLErrorResponse {
    message: String,
    #[serde(default)]
    locations: Vec<GraphQLErrorLocationResponse>,
    #[serde(default)]
    path: Vec<serde_json::Value>,
}

#[derive(Debug, Deserialize)]
struct GraphQLErrorLocationResponse {
    line: i64,
    column: i64,
}

impl From<GraphQLErrorResponse> for GraphQLError {
    fn from(e: GraphQLErrorResponse) -> Self {
        Self {
            message: e.message,
            locations: e
                .locations
                .into_iter()
                .map(|l| GraphQLErrorLocation {
                    line: l.line,
                    column: l.column,
                })
                .collect(),
            path: e.path,
        }
    }
}

/// `checkoutCreate` input, in Storefront API shape.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct CheckoutInput {
    line_items: Vec<LineItemInput>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct LineItemInput {
    variant_id: String,
    quantity: i64,
}

/// `data` payload of the `checkoutCreate` mutation.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CheckoutCreateData {
    checkout_create: Option<CheckoutCreatePayload>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CheckoutCreatePayload {
    checkout: Option<CheckoutResource>,
    #[serde(default)]
    checkout_user_errors: Vec<CheckoutUserError>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CheckoutResource {
    id: String,
    web_url: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CheckoutUserError {
    field: Option<Vec<String>>,
    message: String,
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_line_items_serialize_to_storefront_shape() {
        let input = CheckoutInput {
            line_items: vec![LineItemInput {
                variant_id: format!("{VARIANT_GID_PREFIX}222"),
                quantity: 2,
            }],
        };

        let value = serde_json::to_value(&input).unwrap();
        assert_eq!(
            value,
            json!({
                "lineItems": [{
                    "variantId": "gid://shopify/ProductVariant/222",
                    "quantity": 2
                }]
            })
        );
    }

    #[test]
    fn test_checkout_response_parses_web_url() {
        let body = json!({
            "checkoutCreate": {
                "checkout": {
                    "id": "gid://shopify/Checkout/abc123",
                    "webUrl": "https://sugar-pine.myshopify.com/checkouts/abc123"
                },
                "checkoutUserErrors": []
            }
        });

        let data: CheckoutCreateData = serde_json::from_value(body).unwrap();
        let checkout = data.checkout_create.unwrap().checkout.unwrap();
        assert_eq!(
            checkout.web_url,
            "https://sugar-pine.myshopify.com/checkouts/abc123"
        );
    }

    #[test]
    fn test_checkout_response_parses_user_errors() {
        let body = json!({
            "checkoutCreate": {
                "checkout": null,
                "checkoutUserErrors": [
                    {"field": ["lineItems", "0", "variantId"], "message": "Variant is invalid"},
                    {"field": null, "message": "Second error"}
                ]
            }
        });

        let data: CheckoutCreateData = serde_json::from_value(body).unwrap();
        let payload = data.checkout_create.unwrap();
        assert!(payload.checkout.is_none());
        assert_eq!(payload.checkout_user_errors.len(), 2);
        assert_eq!(
            payload.checkout_user_errors[0].message,
            "Variant is invalid"
        );
    }

    #[test]
    fn test_graphql_envelope_collects_top_level_errors() {
        let body = json!({
            "data": null,
            "errors": [{
                "message": "Field 'checkoutCreate' doesn't exist",
                "locations": [{"line": 2, "column": 3}]
            }]
        });

        let envelope: GraphQLResponse<CheckoutCreateData> = serde_json::from_value(body).unwrap();
        let errors = envelope.errors.unwrap();
        assert_eq!(errors.len(), 1);

        let converted: GraphQLError = errors.into_iter().next().unwrap().into();
        assert_eq!(converted.message, "Field 'checkoutCreate' doesn't exist");
        assert_eq!(converted.locations[0].line, 2);
    }
}
