//! Products Data

use crate::domain::products::{errors::ProductsServiceError, records::ProductUuid};

const MAX_NAME_LEN: usize = 255;
const MAX_CATEGORY_LEN: usize = 255;
const MAX_DESCRIPTION_LEN: usize = 2000;
const MAX_IMAGE_LEN: usize = 2000;

/// New Product Data
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewProduct {
    pub uuid: ProductUuid,
    pub name: String,
    pub category: String,
    pub description: Option<String>,
    pub image: String,
    pub price: u64,
    pub stock: u32,
}

/// Product Update Data
///
/// Replaces every editable field of an existing product.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProductUpdate {
    pub name: String,
    pub category: String,
    pub description: Option<String>,
    pub image: String,
    pub price: u64,
    pub stock: u32,
}

/// Catalogue listing filter
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProductsFilter {
    /// Exact category match.
    pub category: Option<String>,

    /// Case-insensitive substring of the product name.
    pub name: Option<String>,
}

impl NewProduct {
    pub(crate) fn validate(&self) -> Result<(), ProductsServiceError> {
        validate_fields(
            &self.name,
            &self.category,
            self.description.as_deref(),
            &self.image,
            self.price,
            self.stock,
        )
    }
}

impl ProductUpdate {
    pub(crate) fn validate(&self) -> Result<(), ProductsServiceError> {
        validate_fields(
            &self.name,
            &self.category,
            self.description.as_deref(),
            &self.image,
            self.price,
            self.stock,
        )
    }
}

fn validate_fields(
    name: &str,
    category: &str,
    description: Option<&str>,
    image: &str,
    price: u64,
    stock: u32,
) -> Result<(), ProductsServiceError> {
    required("name", name, MAX_NAME_LEN)?;
    required("category", category, MAX_CATEGORY_LEN)?;
    required("image", image, MAX_IMAGE_LEN)?;

    if description.is_some_and(|text| text.chars().count() > MAX_DESCRIPTION_LEN) {
        return Err(ProductsServiceError::Validation {
            field: "description",
        });
    }

    // Prices are stored as BIGINT, stock as INTEGER.
    if i64::try_from(price).is_err() {
        return Err(ProductsServiceError::Validation { field: "price" });
    }

    if i32::try_from(stock).is_err() {
        return Err(ProductsServiceError::Validation { field: "stock" });
    }

    Ok(())
}

fn required(field: &'static str, value: &str, max_len: usize) -> Result<(), ProductsServiceError> {
    if value.trim().is_empty() || value.chars().count() > max_len {
        return Err(ProductsServiceError::Validation { field });
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn product() -> NewProduct {
        NewProduct {
            uuid: ProductUuid::new(),
            name: "Catan".to_string(),
            category: "Board Games".to_string(),
            description: None,
            image: "https://img.example/catan.png".to_string(),
            price: 29_990,
            stock: 10,
        }
    }

    #[test]
    fn valid_product_passes() {
        assert!(product().validate().is_ok());
    }

    #[test]
    fn blank_name_is_rejected() {
        let mut product = product();
        product.name = "   ".to_string();

        let result = product.validate();

        assert!(
            matches!(result, Err(ProductsServiceError::Validation { field: "name" })),
            "expected name validation error, got {result:?}"
        );
    }

    #[test]
    fn over_long_description_is_rejected() {
        let mut product = product();
        product.description = Some("x".repeat(MAX_DESCRIPTION_LEN + 1));

        let result = product.validate();

        assert!(
            matches!(
                result,
                Err(ProductsServiceError::Validation {
                    field: "description"
                })
            ),
            "expected description validation error, got {result:?}"
        );
    }

    #[test]
    fn price_beyond_storage_range_is_rejected() {
        let mut product = product();
        product.price = u64::MAX;

        let result = product.validate();

        assert!(
            matches!(result, Err(ProductsServiceError::Validation { field: "price" })),
            "expected price validation error, got {result:?}"
        );
    }

    #[test]
    fn blank_image_is_rejected_on_update() {
        let update = ProductUpdate {
            name: "Catan".to_string(),
            category: "Board Games".to_string(),
            description: Some(String::new()),
            image: String::new(),
            price: 0,
            stock: 0,
        };

        let result = update.validate();

        assert!(
            matches!(result, Err(ProductsServiceError::Validation { field: "image" })),
            "expected image validation error, got {result:?}"
        );
    }
}
