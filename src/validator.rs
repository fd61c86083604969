use crate::models::Quotation;
use serde_json::Value;
use std::fmt;

/// Reason reported for a payload that passes every check.
pub const VALID_REASON: &str = "Quotation data is valid";

const REQUIRED_FIELDS: [&str; 4] = ["id", "customer_name", "items", "total_amount"];
const REQUIRED_ITEM_FIELDS: [&str; 3] = ["name", "quantity", "unit_price"];

/// First problem found in an inbound quotation payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// The payload is not a JSON object.
    NotAnObject,
    /// Required top-level keys are absent (listed in canonical order).
    MissingFields(Vec<&'static str>),
    InvalidId,
    InvalidCustomerName,
    /// `items` is not a list, or is an empty one.
    InvalidItems,
    InvalidTotalAmount,
    ItemNotAnObject {
        index: usize,
    },
    ItemMissingFields {
        index: usize,
        fields: Vec<&'static str>,
    },
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValidationError::NotAnObject => {
                write!(f, "Invalid data format: expected JSON object")
            }
            ValidationError::MissingFields(fields) => {
                write!(f, "Missing required fields: {}", fields.join(", "))
            }
            ValidationError::InvalidId => write!(f, "Field 'id' must be a string or integer"),
            ValidationError::InvalidCustomerName => {
                write!(f, "Field 'customer_name' must be a string")
            }
            ValidationError::InvalidItems => {
                write!(f, "Field 'items' must be a non-empty list")
            }
            ValidationError::InvalidTotalAmount => {
                write!(f, "Field 'total_amount' must be a number")
            }
            ValidationError::ItemNotAnObject { index } => {
                write!(f, "Item at index {} must be a JSON object", index)
            }
            ValidationError::ItemMissingFields { index, fields } => write!(
                f,
                "Item at index {} is missing required fields: {}",
                index,
                fields.join(", ")
            ),
        }
    }
}

impl std::error::Error for ValidationError {}

/// Checks an inbound payload against the quotation shape.
///
/// Rules run in a fixed order and the first failure wins:
///
/// 1. payload is an object
/// 2. `id`, `customer_name`, `items`, `total_amount` are present
/// 3. `id` is a string or an integer
/// 4. `customer_name` is a string
/// 5. `items` is a non-empty list
/// 6. `total_amount` is a number
/// 7. every item is an object carrying `name`, `quantity` and `unit_price`
///
/// On success the payload is handed back as a [`Quotation`], unchanged.
pub fn validate(payload: Value) -> Result<Quotation, ValidationError> {
    let Value::Object(fields) = payload else {
        return Err(ValidationError::NotAnObject);
    };

    let missing: Vec<&'static str> = REQUIRED_FIELDS
        .iter()
        .copied()
        .filter(|key| !fields.contains_key(*key))
        .collect();
    if !missing.is_empty() {
        return Err(ValidationError::MissingFields(missing));
    }

    match &fields["id"] {
        Value::String(_) => {}
        Value::Number(n) if n.is_i64() || n.is_u64() => {}
        _ => return Err(ValidationError::InvalidId),
    }

    if !fields["customer_name"].is_string() {
        return Err(ValidationError::InvalidCustomerName);
    }

    let items = match fields["items"].as_array() {
        Some(items) if !items.is_empty() => items,
        _ => return Err(ValidationError::InvalidItems),
    };

    if !fields["total_amount"].is_number() {
        return Err(ValidationError::InvalidTotalAmount);
    }

    for (index, item) in items.iter().enumerate() {
        let Some(item) = item.as_object() else {
            return Err(ValidationError::ItemNotAnObject { index });
        };
        let missing: Vec<&'static str> = REQUIRED_ITEM_FIELDS
            .iter()
            .copied()
            .filter(|key| !item.contains_key(*key))
            .collect();
        if !missing.is_empty() {
            return Err(ValidationError::ItemMissingFields {
                index,
                fields: missing,
            });
        }
    }

    Ok(Quotation::from_fields(fields))
}

/// Accept/reject form of [`validate`]: `(true, VALID_REASON)` or
/// `(false, <first problem>)`.
pub fn check(payload: &Value) -> (bool, String) {
    match validate(payload.clone()) {
        Ok(_) => (true, VALID_REASON.to_string()),
        Err(e) => (false, e.to_string()),
    }
}
