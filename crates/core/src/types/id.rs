//! Newtype IDs for type-safe references into the Shopify catalog.
//!
//! Use the `define_shopify_id!` macro to create type-safe ID wrappers that
//! prevent accidentally mixing identifiers issued for different Shopify
//! entity types.

/// Macro to define a type-safe Shopify ID wrapper.
///
/// Shopify issues numeric identifiers, but they are opaque join keys to us and
/// the local schema stores them as text, so the wrapper owns a `String` and
/// numeric ids are stringified at the boundary via `From<i64>`.
///
/// Creates a newtype wrapper with:
/// - `Serialize`/`Deserialize` with `#[serde(transparent)]`
/// - `Debug`, `Clone`, `PartialEq`, `Eq`, `Hash`
/// - Conversion methods: `new()`, `as_str()`
/// - `From<i64>`, `From<String>`, and `From<&str>` implementations
/// - `sqlx` `Type`, `Encode`, and `Decode` implementations (with `postgres` feature)
///
/// # Example
///
/// ```rust
/// # use sugarpine_core::define_shopify_id;
/// define_shopify_id!(ProductRef);
/// define_shopify_id!(VariantRef);
///
/// let product = ProductRef::from(111_i64);
/// let variant = VariantRef::from(222_i64);
///
/// assert_eq!(product.as_str(), "111");
/// assert_eq!(variant.as_str(), "222");
///
/// // These are different types, so this won't compile:
/// // let _: ProductRef = variant;
/// ```
#[macro_export]
macro_rules! define_shopify_id {
    ($name:ident) => {
        #[derive(
            Debug,
            Clone,
            PartialEq,
            Eq,
            Hash,
            ::serde::Serialize,
            ::serde::Deserialize
        )]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            /// Create a new ID from a string value.
            #[must_use]
            pub fn new(id: impl Into<String>) -> Self {
                Self(id.into())
            }

            /// Get the underlying string value.
            #[must_use]
            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl ::core::fmt::Display for $name {
            fn fmt(&self, f: &mut ::core::fmt::Formatter<'_>) -> ::core::fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl From<i64> for $name {
            fn from(id: i64) -> Self {
                Self(id.to_string())
            }
        }

        impl From<String> for $name {
            fn from(id: String) -> Self {
                Self(id)
            }
        }

        impl From<&str> for $name {
            fn from(id: &str) -> Self {
                Self(id.to_string())
            }
        }

        #[cfg(feature = "postgres")]
        impl ::sqlx::Type<::sqlx::Postgres> for $name {
            fn type_info() -> ::sqlx::postgres::PgTypeInfo {
                <String as ::sqlx::Type<::sqlx::Postgres>>::type_info()
            }

            fn compatible(ty: &::sqlx::postgres::PgTypeInfo) -> bool {
                <String as ::sqlx::Type<::sqlx::Postgres>>::compatible(ty)
            }
        }

        #[cfg(feature = "postgres")]
        impl<'r> ::sqlx::Decode<'r, ::sqlx::Postgres> for $name {
            fn decode(
                value: ::sqlx::postgres::PgValueRef<'r>,
            ) -> ::core::result::Result<Self, ::sqlx::error::BoxDynError> {
                let id = <String as ::sqlx::Decode<::sqlx::Postgres>>::decode(value)?;
                Ok(Self(id))
            }
        }

        #[cfg(feature = "postgres")]
        impl ::sqlx::Encode<'_, ::sqlx::Postgres> for $name {
            fn encode_by_ref(
                &self,
                buf: &mut ::sqlx::postgres::PgArgumentBuffer,
            ) -> ::std::result::Result<::sqlx::encode::IsNull, ::sqlx::error::BoxDynError> {
                <String as ::sqlx::Encode<::sqlx::Postgres>>::encode_by_ref(&self.0, buf)
            }
        }
    };
}

// Identifiers issued by Shopify, used as join keys into local storage
define_shopify_id!(ShopifyProductId);
define_shopify_id!(ShopifyVariantId);
define_shopify_id!(ShopifyInventoryItemId);
