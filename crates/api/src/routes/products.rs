//! Product read and partial-update endpoints.

use std::str::FromStr;
use std::sync::Arc;

use application::{CoffeeBrewParams, ProductParams, UpdateProduct};
use axum::Json;
use axum::extract::{Path, State};
use common::{CoffeeBrewId, ProductId};
use domain::{
    CoffeeBean, Money, Product, ProductCategory, ProductCoffeeBrew, ProductQueryService,
    ProductType, Stock,
};
use serde::{Deserialize, Serialize};

use crate::error::ApiError;

/// Shared application state accessible from all handlers.
pub struct AppState {
    pub products: Arc<dyn ProductQueryService>,
    pub update_product: UpdateProduct,
}

// -- Request types --

/// Body of `PATCH /products/{id}`. Absent fields are left unchanged.
#[derive(Debug, Default, Deserialize)]
pub struct UpdateProductRequest {
    pub name: Option<String>,
    pub category_id: Option<String>,
    #[serde(rename = "type")]
    pub product_type: Option<String>,
    pub coffee_bean_id: Option<String>,
    pub coffee_brews: Option<Vec<CoffeeBrewRequest>>,
    pub amount: Option<i64>,
    pub stock_id: Option<String>,
}

/// One desired brew recipe. A missing or empty `id` asks for a new recipe.
#[derive(Debug, Deserialize)]
pub struct CoffeeBrewRequest {
    #[serde(default)]
    pub id: Option<String>,
    pub name: String,
    pub bean_quantity_grams: u32,
    pub amount: i64,
}

impl TryFrom<UpdateProductRequest> for ProductParams {
    type Error = ApiError;

    fn try_from(req: UpdateProductRequest) -> Result<Self, Self::Error> {
        let coffee_brews = req
            .coffee_brews
            .map(|brews| {
                brews
                    .into_iter()
                    .map(CoffeeBrewParams::try_from)
                    .collect::<Result<Vec<_>, _>>()
            })
            .transpose()?;

        Ok(ProductParams {
            name: req.name,
            category_id: parse_optional_id("category_id", req.category_id)?,
            product_type: req
                .product_type
                .map(|t| ProductType::from_str(&t))
                .transpose()
                .map_err(|e| ApiError::BadRequest(e.to_string()))?,
            coffee_bean_id: parse_optional_id("coffee_bean_id", req.coffee_bean_id)?,
            coffee_brews,
            amount: req.amount.map(Money::from_minor),
            stock_id: parse_optional_id("stock_id", req.stock_id)?,
        })
    }
}

impl TryFrom<CoffeeBrewRequest> for CoffeeBrewParams {
    type Error = ApiError;

    fn try_from(req: CoffeeBrewRequest) -> Result<Self, Self::Error> {
        let id = req
            .id
            .filter(|id| !id.is_empty())
            .map(|id| parse_id::<CoffeeBrewId>("coffee_brews.id", &id))
            .transpose()?;

        Ok(CoffeeBrewParams {
            id,
            name: req.name,
            bean_quantity_grams: req.bean_quantity_grams,
            amount: Money::from_minor(req.amount),
        })
    }
}

fn parse_id<T: FromStr<Err = uuid::Error>>(field: &str, raw: &str) -> Result<T, ApiError> {
    raw.parse()
        .map_err(|e| ApiError::BadRequest(format!("invalid {field} '{raw}': {e}")))
}

fn parse_optional_id<T: FromStr<Err = uuid::Error>>(
    field: &str,
    raw: Option<String>,
) -> Result<Option<T>, ApiError> {
    raw.map(|raw| parse_id(field, &raw)).transpose()
}

// -- Response types --

#[derive(Debug, Serialize)]
pub struct ProductResponse {
    pub id: String,
    pub name: String,
    pub category: CategoryResponse,
    #[serde(rename = "type")]
    pub product_type: String,
    pub amount: i64,
    pub coffee_bean: Option<CoffeeBeanResponse>,
    pub coffee_brews: Vec<CoffeeBrewResponse>,
    pub stock: Option<StockResponse>,
    pub created_at: String,
    pub updated_at: String,
}

#[derive(Debug, Serialize)]
pub struct CategoryResponse {
    pub id: String,
    pub name: String,
}

#[derive(Debug, Serialize)]
pub struct CoffeeBeanResponse {
    pub id: String,
    pub name: String,
    pub gram_quantity: u32,
}

#[derive(Debug, Serialize)]
pub struct CoffeeBrewResponse {
    pub id: String,
    pub name: String,
    pub bean_quantity_grams: u32,
    pub amount: i64,
}

#[derive(Debug, Serialize)]
pub struct StockResponse {
    pub id: String,
    pub name: String,
    pub quantity: u32,
}

impl From<&ProductCategory> for CategoryResponse {
    fn from(category: &ProductCategory) -> Self {
        Self {
            id: category.id().to_string(),
            name: category.name().to_string(),
        }
    }
}

impl From<&CoffeeBean> for CoffeeBeanResponse {
    fn from(bean: &CoffeeBean) -> Self {
        Self {
            id: bean.id().to_string(),
            name: bean.name().to_string(),
            gram_quantity: bean.gram_quantity(),
        }
    }
}

impl From<&ProductCoffeeBrew> for CoffeeBrewResponse {
    fn from(brew: &ProductCoffeeBrew) -> Self {
        Self {
            id: brew.id().to_string(),
            name: brew.name().to_string(),
            bean_quantity_grams: brew.bean_quantity_grams(),
            amount: brew.amount().minor(),
        }
    }
}

impl From<&Stock> for StockResponse {
    fn from(stock: &Stock) -> Self {
        Self {
            id: stock.id().to_string(),
            name: stock.name().to_string(),
            quantity: stock.quantity(),
        }
    }
}

impl From<&Product> for ProductResponse {
    fn from(product: &Product) -> Self {
        Self {
            id: product.id().to_string(),
            name: product.name().to_string(),
            category: product.category().into(),
            product_type: product.product_type().to_string(),
            amount: product.amount().minor(),
            coffee_bean: product.coffee_bean().map(Into::into),
            coffee_brews: product.brews().iter().map(Into::into).collect(),
            stock: product.stock().map(Into::into),
            created_at: product.created_at().to_rfc3339(),
            updated_at: product.updated_at().to_rfc3339(),
        }
    }
}

// -- Handlers --

/// GET /products/{id} — returns the hydrated product.
#[tracing::instrument(skip(state))]
pub async fn get(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<ProductResponse>, ApiError> {
    let product_id: ProductId = parse_id("product id", &id)?;
    let product = state.products.find_by_id(product_id).await?;
    Ok(Json(ProductResponse::from(&product)))
}

/// PATCH /products/{id} — applies a partial update and returns the result.
#[tracing::instrument(skip(state, req))]
pub async fn update(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    Json(req): Json<UpdateProductRequest>,
) -> Result<Json<ProductResponse>, ApiError> {
    let product_id: ProductId = parse_id("product id", &id)?;
    let params = ProductParams::try_from(req)?;
    let product = state.update_product.execute(product_id, params).await?;
    Ok(Json(ProductResponse::from(&product)))
}
