use serde_json::Value;
use std::collections::HashMap;
use uuid::Uuid;

/// Generic metadata container
pub type Metadata = HashMap<String, Value>;

/// Correlation ID for tracking one storefront request through its layers
pub type CorrelationId = Uuid;

/// Stable product identifier
pub type ProductId = String;
