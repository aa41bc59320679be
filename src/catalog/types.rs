use crate::{Error, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    #[serde(rename = "_id")]
    pub id: String,
    pub name: String,
    pub description: String,
    pub price: f64,
    /// Ordered image URLs; index 0 is the canonical garment image.
    pub image: Vec<String>,
    pub category: String,
    pub sub_category: String,
    #[serde(default)]
    pub bestseller: bool,
    #[serde(default)]
    pub sizes: Vec<String>,
    pub date: DateTime<Utc>,
}

/// Body of `POST /api/products`.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewProduct {
    pub name: String,
    pub description: String,
    pub price: f64,
    pub image: Vec<String>,
    pub category: String,
    pub sub_category: String,
    #[serde(default)]
    pub bestseller: bool,
    #[serde(default)]
    pub sizes: Vec<String>,
}

/// Body of `PUT /api/products/:id`; absent fields keep their stored value.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductPatch {
    pub name: Option<String>,
    pub description: Option<String>,
    pub price: Option<f64>,
    pub image: Option<Vec<String>>,
    pub category: Option<String>,
    pub sub_category: Option<String>,
    pub bestseller: Option<bool>,
    pub sizes: Option<Vec<String>>,
}

/// Read-only projection the try-on pipeline borrows for one request.
#[derive(Debug, Clone, PartialEq)]
pub struct ProductSummary {
    pub id: String,
    pub name: String,
    pub price: f64,
    pub images: Vec<String>,
}

impl NewProduct {
    pub fn validate(&self) -> Result<()> {
        let required = [
            ("name", &self.name),
            ("description", &self.description),
            ("category", &self.category),
            ("subCategory", &self.sub_category),
        ];
        for (field, value) in required {
            if value.trim().is_empty() {
                return Err(Error::bad_request(format!("Product {field} is required")));
            }
        }
        if !self.price.is_finite() || self.price < 0.0 {
            return Err(Error::bad_request("Product price must be a non-negative number"));
        }
        Ok(())
    }

    pub fn into_product(self) -> Product {
        Product {
            id: Uuid::new_v4().to_string(),
            name: self.name,
            description: self.description,
            price: self.price,
            image: self.image,
            category: self.category,
            sub_category: self.sub_category,
            bestseller: self.bestseller,
            sizes: self.sizes,
            date: Utc::now(),
        }
    }
}

impl ProductPatch {
    pub fn apply(self, product: &mut Product) -> Result<()> {
        if let Some(price) = self.price {
            if !price.is_finite() || price < 0.0 {
                return Err(Error::bad_request("Product price must be a non-negative number"));
            }
            product.price = price;
        }
        if let Some(name) = self.name {
            product.name = name;
        }
        if let Some(description) = self.description {
            product.description = description;
        }
        if let Some(image) = self.image {
            product.image = image;
        }
        if let Some(category) = self.category {
            product.category = category;
        }
        if let Some(sub_category) = self.sub_category {
            product.sub_category = sub_category;
        }
        if let Some(bestseller) = self.bestseller {
            product.bestseller = bestseller;
        }
        if let Some(sizes) = self.sizes {
            product.sizes = sizes;
        }
        Ok(())
    }
}

impl From<&Product> for ProductSummary {
    fn from(product: &Product) -> Self {
        Self {
            id: product.id.clone(),
            name: product.name.clone(),
            price: product.price,
            images: product.image.clone(),
        }
    }
}

impl ProductSummary {
    pub fn image(&self, index: usize) -> Option<&str> {
        self.images.get(index).map(String::as_str)
    }
}
