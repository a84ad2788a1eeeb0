//! Shopify Admin REST API client for catalog listing.
//!
//! The Admin API caps list endpoints at 250 records per page and signals
//! continuation through `Link` response headers (`rel="next"`), so a full
//! catalog pull walks pages until the header disappears.

use std::sync::Arc;

use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use tracing::{debug, instrument};

use super::{ShopifyError, build_http_client};
use crate::config::ShopifySyncConfig;

/// Access token header for the Admin REST API.
const ACCESS_TOKEN_HEADER: &str = "X-Shopify-Access-Token";

/// Records per page (the Admin API maximum).
const PAGE_LIMIT: u32 = 250;

/// Shopify Admin REST API client.
///
/// Read-only: the sync subsystem lists the catalog and never writes back
/// to Shopify.
#[derive(Clone)]
pub struct AdminClient {
    inner: Arc<AdminClientInner>,
}

struct AdminClientInner {
    client: reqwest::Client,
    domain: String,
    api_version: String,
    access_token: SecretString,
}

impl std::fmt::Debug for AdminClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AdminClient")
            .field("domain", &self.inner.domain)
            .field("api_version", &self.inner.api_version)
            .field("access_token", &"[REDACTED]")
            .finish()
    }
}

impl AdminClient {
    /// Create a new Admin API client.
    ///
    /// # Panics
    ///
    /// Panics if the HTTP client cannot be created. This should never happen
    /// under normal circumstances as we use standard TLS configuration.
    #[must_use]
    pub fn new(config: &ShopifySyncConfig) -> Self {
        Self {
            inner: Arc::new(AdminClientInner {
                client: build_http_client(),
                domain: config.domain.clone(),
                api_version: config.api_version.clone(),
                access_token: config.access_token.clone(),
            }),
        }
    }

    /// Fetch the complete product catalog, following `Link` header
    /// pagination until the API reports no further pages.
    ///
    /// # Errors
    ///
    /// Returns `ShopifyError::Http` on network failures,
    /// `ShopifyError::RateLimited` on 429 responses,
    /// `ShopifyError::Status` on other non-success responses, and
    /// `ShopifyError::Parse` if a page body is not valid JSON.
    #[instrument(skip(self))]
    pub async fn fetch_all_products(&self) -> Result<Vec<RestProduct>, ShopifyError> {
        let mut products = Vec::new();
        let mut next_url = Some(format!(
            "https://{}/admin/api/{}/products.json?limit={PAGE_LIMIT}",
            self.inner.domain, self.inner.api_version
        ));

        while let Some(url) = next_url {
            let response = self
                .inner
                .client
                .get(&url)
                .header(ACCESS_TOKEN_HEADER, self.inner.access_token.expose_secret())
                .header("Content-Type", "application/json")
                .send()
                .await?;

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
            // Headers must be read before the body consumes the response
            next_url = next_page_url(response.headers());
            let body = response.text().await?;

            if !status.is_success() {
                return Err(ShopifyError::Status { status, body });
            }

            let page: ProductsPage = serde_json::from_str(&body)?;
            debug!(count = page.products.len(), "Fetched catalog page");
            products.extend(page.products);
        }

        Ok(products)
    }
}

/// Extract the `rel="next"` URL from a response's `Link` header.
fn next_page_url(headers: &reqwest::header::HeaderMap) -> Option<String> {
    let link = headers.get(reqwest::header::LINK)?.to_str().ok()?;
    parse_next_link(link)
}

/// Parse a `Link` header of the form
/// `<https://...?page_info=aaa>; rel="previous", <https://...?page_info=bbb>; rel="next"`.
///
/// Returns `None` when no well-formed `rel="next"` entry exists, which
/// terminates pagination.
fn parse_next_link(link: &str) -> Option<String> {
    for part in link.split(',') {
        let mut sections = part.splitn(2, ';');
        let Some(target) = sections.next() else {
            continue;
        };
        let Some(params) = sections.next() else {
            continue;
        };
        if !params.contains(r#"rel="next""#) {
            continue;
        }

        let url = target.trim().trim_start_matches('<').trim_end_matches('>');
        if url::Url::parse(url).is_ok() {
            return Some(url.to_string());
        }
    }
    None
}

// =============================================================================
// Wire Types
// =============================================================================

/// One page of the Admin REST products listing.
#[derive(Debug, Deserialize)]
struct ProductsPage {
    products: Vec<RestProduct>,
}

/// A product as returned by the Admin REST API.
#[derive(Debug, Clone, Deserialize)]
pub struct RestProduct {
    /// Shopify product id.
    pub id: i64,
    /// Product title.
    pub title: String,
    /// Description HTML, absent for bare products.
    pub body_html: Option<String>,
    /// Product variants (Shopify guarantees at least one).
    #[serde(default)]
    pub variants: Vec<RestVariant>,
    /// Product images, in display order.
    #[serde(default)]
    pub images: Vec<RestImage>,
}

/// A variant as returned by the Admin REST API.
///
/// `price` arrives as a decimal string and is parsed per record during
/// sync, so one malformed variant cannot abort a whole page.
#[derive(Debug, Clone, Deserialize)]
pub struct RestVariant {
    /// Shopify variant id.
    pub id: i64,
    /// Variant title (`"Default Title"` for single-variant products).
    pub title: String,
    /// Price as a decimal string, e.g. `"12.50"`.
    pub price: Option<String>,
    /// Inventory item id, used to match inventory-level webhooks later.
    pub inventory_item_id: Option<i64>,
    /// Units on hand across locations; absent when tracking is off.
    pub inventory_quantity: Option<i64>,
}

/// A product image as returned by the Admin REST API.
#[derive(Debug, Clone, Deserialize)]
pub struct RestImage {
    /// Public CDN URL.
    pub src: String,
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_next_link_with_both_relations() {
        let link = r#"<https://shop.myshopify.com/admin/api/2024-01/products.json?page_info=aaa>; rel="previous", <https://shop.myshopify.com/admin/api/2024-01/products.json?page_info=bbb>; rel="next""#;
        assert_eq!(
            parse_next_link(link).unwrap(),
            "https://shop.myshopify.com/admin/api/2024-01/products.json?page_info=bbb"
        );
    }

    #[test]
    fn test_parse_next_link_only_previous() {
        let link = r#"<https://shop.myshopify.com/admin/api/2024-01/products.json?page_info=aaa>; rel="previous""#;
        assert_eq!(parse_next_link(link), None);
    }

    #[test]
    fn test_parse_next_link_malformed_url() {
        let link = r#"<not a url>; rel="next""#;
        assert_eq!(parse_next_link(link), None);
    }

    #[test]
    fn test_parse_next_link_garbage() {
        assert_eq!(parse_next_link("nonsense without any structure"), None);
    }

    #[test]
    fn test_next_page_url_absent_header() {
        let headers = reqwest::header::HeaderMap::new();
        assert_eq!(next_page_url(&headers), None);
    }

    #[test]
    fn test_product_page_deserializes() {
        let body = r#"{
            "products": [{
                "id": 101,
                "title": "Huckleberry Swirl",
                "body_html": "<p>Wild huckleberries folded into sweet cream.</p>",
                "variants": [{
                    "id": 201,
                    "title": "Pint",
                    "price": "8.50",
                    "inventory_item_id": 301,
                    "inventory_quantity": 12
                }],
                "images": [{"src": "https://cdn.shopify.com/huckleberry.jpg"}]
            }]
        }"#;

        let page: ProductsPage = serde_json::from_str(body).unwrap();
        assert_eq!(page.products.len(), 1);
        let product = &page.products[0];
        assert_eq!(product.title, "Huckleberry Swirl");
        assert_eq!(product.variants[0].price.as_deref(), Some("8.50"));
        assert_eq!(product.variants[0].inventory_quantity, Some(12));
    }

    #[test]
    fn test_variant_tolerates_missing_optional_fields() {
        // Products with inventory tracking off omit quantities; price can
        // be null in malformed payloads and must not fail the page
        let body = r#"{
            "id": 202,
            "title": "Default Title",
            "price": null,
            "inventory_item_id": null
        }"#;

        let variant: RestVariant = serde_json::from_str(body).unwrap();
        assert_eq!(variant.price, None);
        assert_eq!(variant.inventory_item_id, None);
        assert_eq!(variant.inventory_quantity, None);
    }

    #[test]
    fn test_product_without_variants_or_images() {
        let body = r#"{"id": 103, "title": "Gift Card", "body_html": null}"#;
        let product: RestProduct = serde_json::from_str(body).unwrap();
        assert!(product.variants.is_empty());
        assert!(product.images.is_empty());
        assert_eq!(product.body_html, None);
    }
}
