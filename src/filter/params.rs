// src/filter/params.rs

use thiserror::Error as ThisError;

use crate::error::Error;

use super::{FilterState, PriceRange};

/// Problems with a storefront filter query string
#[derive(Debug, Clone, PartialEq, ThisError)]
pub enum ParamError {
    #[error("invalid percent-encoding in '{key}'")]
    Encoding { key: String },
    #[error("'{value}' is not a valid number for '{key}'")]
    InvalidNumber { key: String, value: String },
    #[error("malformed price range '{0}', expected 'min-max'")]
    MalformedRange(String),
}

impl ParamError {
    fn field(&self) -> &str {
        match self {
            Self::Encoding { key } | Self::InvalidNumber { key, .. } => key,
            Self::MalformedRange(_) => "priceRange",
        }
    }
}

impl From<ParamError> for Error {
    fn from(err: ParamError) -> Self {
        Error::validation(err.field(), err.to_string()).source("filter.params")
    }
}

pub(super) fn parse(qs: &str) -> Result<FilterState, ParamError> {
    let mut filter = FilterState::default();
    let mut min_price: Option<f64> = None;
    let mut max_price: Option<f64> = None;

    for pair in qs.trim_start_matches('?').split('&') {
        if pair.is_empty() {
            continue;
        }
        let (key, raw) = pair.split_once('=').unwrap_or((pair, ""));
        let value = decode(key, raw)?;

        match key {
            "category" => {
                filter.category = Some(value.trim().to_string()).filter(|c| !c.is_empty())
            }
            "brand" | "brands" => push_list(&mut filter.brands, &value),
            "color" | "colors" => push_list(&mut filter.colors, &value),
            "size" | "sizes" => push_list(&mut filter.sizes, &value),
            "type" | "types" => push_list(&mut filter.types, &value),
            "style" | "styles" => push_list(&mut filter.styles, &value),
            "occasion" | "occasions" => push_list(&mut filter.occasions, &value),
            "priceRange" | "price_range" => filter.price_range = Some(parse_range(&value)?),
            "minPrice" | "min_price" => min_price = Some(parse_number(key, &value)?),
            "maxPrice" | "max_price" => max_price = Some(parse_number(key, &value)?),
            _ => {}
        }
    }

    // Separate bounds override a combined range field. A missing upper bound
    // is f64::MAX so the range survives a JSON round trip.
    if min_price.is_some() || max_price.is_some() {
        let base = filter
            .price_range
            .unwrap_or(PriceRange::new(0.0, f64::MAX));
        filter.price_range = Some(PriceRange::new(
            min_price.unwrap_or(base.min),
            max_price.unwrap_or(base.max),
        ));
    }

    Ok(filter)
}

fn decode(key: &str, raw: &str) -> Result<String, ParamError> {
    urlencoding::decode(&raw.replace('+', " "))
        .map(|v| v.into_owned())
        .map_err(|_| ParamError::Encoding {
            key: key.to_string(),
        })
}

fn push_list(target: &mut Vec<String>, value: &str) {
    for item in value.split(',').map(str::trim).filter(|v| !v.is_empty()) {
        if !target.iter().any(|existing| existing == item) {
            target.push(item.to_string());
        }
    }
}

fn parse_number(key: &str, value: &str) -> Result<f64, ParamError> {
    value
        .trim()
        .parse::<f64>()
        .ok()
        .filter(|n| !n.is_nan())
        .ok_or_else(|| ParamError::InvalidNumber {
            key: key.to_string(),
            value: value.to_string(),
        })
}

fn parse_range(value: &str) -> Result<PriceRange, ParamError> {
    let (min, max) = value
        .split_once(',')
        .or_else(|| value.split_once('-'))
        .ok_or_else(|| ParamError::MalformedRange(value.to_string()))?;

    let min = parse_number("priceRange", min)
        .map_err(|_| ParamError::MalformedRange(value.to_string()))?;
    let max = parse_number("priceRange", max)
        .map_err(|_| ParamError::MalformedRange(value.to_string()))?;
    Ok(PriceRange::new(min, max))
}
