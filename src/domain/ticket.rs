use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::{Value, json};

use crate::domain::coerce;
use crate::error::{AppError, AppResult};

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ErrorData {
    pub code: String,
    pub message: String,
}

impl ErrorData {
    pub fn from_array(data: Value) -> AppResult<Self> {
        decode(data)
    }

    pub fn to_array(&self) -> Value {
        json!({
            "code": self.code,
            "message": self.message,
        })
    }
}

/// One line item. `price` is the unit price.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ProductData {
    pub id: String,
    pub name: String,
    #[serde(deserialize_with = "coerce::float")]
    pub price: f64,
    #[serde(deserialize_with = "coerce::integer")]
    pub quantity: i64,
    #[serde(default, deserialize_with = "coerce::users")]
    pub users: Vec<String>,
}

impl ProductData {
    pub fn from_array(data: Value) -> AppResult<Self> {
        decode(data)
    }

    pub fn to_array(&self) -> Value {
        json!({
            "id": self.id,
            "name": self.name,
            "price": self.price,
            "quantity": self.quantity,
            "users": self.users,
        })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct TicketData {
    pub nombre: String,
    pub total: f64,
    pub products: Vec<ProductData>,
}

#[derive(Deserialize)]
struct TicketFields {
    nombre: String,
    #[serde(deserialize_with = "coerce::float")]
    total: f64,
    products: Vec<Value>,
}

impl TicketData {
    /// Decodes a ticket, refusing payloads that carry an `error` object.
    /// Untrusted payloads go through [`ParsedTicket::from_response`].
    pub fn from_array(data: Value) -> AppResult<Self> {
        if is_error(&data) {
            return Err(AppError::InvalidTicket("contains error".to_string()));
        }
        let fields: TicketFields = decode(data)?;
        let products = fields
            .products
            .into_iter()
            .enumerate()
            .map(|(index, product)| {
                ProductData::from_array(product).map_err(|err| match err {
                    AppError::InvalidTicket(reason) => {
                        AppError::InvalidTicket(format!("product {index}: {reason}"))
                    }
                    other => other,
                })
            })
            .collect::<AppResult<Vec<_>>>()?;

        Ok(Self {
            nombre: fields.nombre,
            total: fields.total,
            products,
        })
    }

    pub fn to_array(&self) -> Value {
        json!({
            "nombre": self.nombre,
            "total": self.total,
            "products": self.products.iter().map(ProductData::to_array).collect::<Vec<_>>(),
        })
    }
}

/// The two successful outcomes of reading an image.
#[derive(Debug, Clone, PartialEq)]
pub enum ParsedTicket {
    Ticket(TicketData),
    Error(ErrorData),
}

impl ParsedTicket {
    pub fn from_response(mut response: Value) -> AppResult<Self> {
        if is_error(&response) {
            let error = response
                .get_mut("error")
                .map(Value::take)
                .unwrap_or_default();
            return ErrorData::from_array(error).map(ParsedTicket::Error);
        }
        TicketData::from_array(response).map(ParsedTicket::Ticket)
    }

    pub fn to_array(&self) -> Value {
        match self {
            ParsedTicket::Ticket(ticket) => ticket.to_array(),
            ParsedTicket::Error(error) => error.to_array(),
        }
    }
}

fn is_error(data: &Value) -> bool {
    data.get("error").is_some_and(Value::is_object)
}

fn decode<T: DeserializeOwned>(data: Value) -> AppResult<T> {
    if !data.is_object() {
        return Err(AppError::InvalidTicket(format!(
            "expected an object, got {data}"
        )));
    }
    serde_json::from_value(data).map_err(|err| AppError::InvalidTicket(err.to_string()))
}
