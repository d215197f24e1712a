use crate::models::auth::Credentials;
use crate::models::property::{
    CreatePropertyRequest, ListingFilter, ListingQuery, NewProperty, PriceInput, PropertyUpdate,
    UpdatePropertyRequest,
};
use thiserror::Error;

/// Request rejected at the service boundary
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("All fields and at least one image are required")]
    MissingListingFields,
    #[error("Price must be a positive whole number")]
    InvalidPrice,
    #[error("Title cannot be empty")]
    BlankTitle,
    #[error("Location cannot be empty")]
    BlankLocation,
    #[error("At least one image is required")]
    NoImages,
    #[error("Invalid maxPrice: {0}")]
    InvalidMaxPrice(String),
    #[error("Email and password are required")]
    MissingCredentials,
}

/// Validate a creation request into a storable listing.
///
/// Title, price, location and at least one non-blank image are required.
pub fn validate_new_property(req: CreatePropertyRequest) -> Result<NewProperty, ValidationError> {
    let title = non_blank(req.title).ok_or(ValidationError::MissingListingFields)?;
    let location = non_blank(req.location).ok_or(ValidationError::MissingListingFields)?;
    let price = req.price.ok_or(ValidationError::MissingListingFields)?;
    let images = req
        .images
        .map(|i| i.into_urls())
        .filter(|urls| !urls.is_empty())
        .ok_or(ValidationError::MissingListingFields)?;

    Ok(NewProperty {
        title,
        description: non_blank(req.description),
        price: parse_price(&price)?,
        location,
        images,
        property_type: non_blank(req.property_type),
    })
}

/// Validate a partial update. Fields that are present must still satisfy the
/// creation rules; an empty body is a no-op update.
pub fn validate_update(req: UpdatePropertyRequest) -> Result<PropertyUpdate, ValidationError> {
    let title = match req.title {
        Some(t) => Some(non_blank(Some(t)).ok_or(ValidationError::BlankTitle)?),
        None => None,
    };
    let location = match req.location {
        Some(l) => Some(non_blank(Some(l)).ok_or(ValidationError::BlankLocation)?),
        None => None,
    };
    let images = match req.images {
        Some(list) => {
            let urls = list.into_urls();
            if urls.is_empty() {
                return Err(ValidationError::NoImages);
            }
            Some(urls)
        }
        None => None,
    };
    let price = req.price.as_ref().map(parse_price).transpose()?;

    Ok(PropertyUpdate {
        title,
        description: req.description.map(|d| non_blank(Some(d))),
        price,
        location,
        images,
        property_type: req.property_type.map(|t| non_blank(Some(t))),
    })
}

/// Turn the raw listing query into a filter. Empty values mean "no filter".
pub fn parse_listing_filter(query: &ListingQuery) -> Result<ListingFilter, ValidationError> {
    let location = non_blank(query.location.clone());
    let max_price = match non_blank(query.max_price.clone()) {
        Some(raw) => Some(parse_max_price(&raw)?),
        None => None,
    };
    Ok(ListingFilter {
        location,
        max_price,
    })
}

pub fn validate_credentials(credentials: &Credentials) -> Result<(), ValidationError> {
    if credentials.email.trim().is_empty() || credentials.password.is_empty() {
        return Err(ValidationError::MissingCredentials);
    }
    Ok(())
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn parse_price(price: &PriceInput) -> Result<i64, ValidationError> {
    let parsed = match price {
        PriceInput::Number(n) => n
            .as_i64()
            .or_else(|| n.as_f64().filter(|f| f.fract() == 0.0).map(|f| f as i64)),
        PriceInput::Text(s) => s.trim().parse::<i64>().ok(),
    };
    match parsed {
        Some(p) if p > 0 => Ok(p),
        _ => Err(ValidationError::InvalidPrice),
    }
}

// Decimal bounds are truncated to whole units.
fn parse_max_price(raw: &str) -> Result<i64, ValidationError> {
    if let Ok(v) = raw.parse::<i64>() {
        return Ok(v);
    }
    match raw.parse::<f64>() {
        Ok(v) if v.is_finite() => Ok(v.trunc() as i64),
        _ => Err(ValidationError::InvalidMaxPrice(raw.to_string())),
    }
}
