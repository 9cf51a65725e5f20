//! Field validators shared by the request and scraper schemas.

use std::borrow::Cow;
use validator::{ValidateUrl, ValidationError};

use crate::models::Coordinates;

fn error(code: &'static str, message: &'static str) -> ValidationError {
    let mut err = ValidationError::new(code);
    err.message = Some(Cow::Borrowed(message));
    err
}

pub fn validate_coordinates(coordinates: &Coordinates) -> Result<(), ValidationError> {
    if coordinates.is_valid() {
        Ok(())
    } else {
        Err(error("coordinates", "Latitude must be within ±90 and longitude within ±180"))
    }
}

#[allow(clippy::ptr_arg)]
pub fn validate_urls(urls: &Vec<String>) -> Result<(), ValidationError> {
    if urls.iter().all(|url| url.validate_url()) {
        Ok(())
    } else {
        Err(error("url", "Every image must be a valid URL"))
    }
}

pub fn validate_radius(radius: f64) -> Result<(), ValidationError> {
    if radius.is_finite() && radius >= 0.0 {
        Ok(())
    } else {
        Err(error("radius", "Radius must be a non-negative number of kilometers"))
    }
}
