//! # Commands
//!
//! Argument parsing and dispatch. Every command prints one JSON document.
//!
//! ```text
//! marketplace place <customer_id> <product_id>:<qty> [<product_id>:<qty>...]
//! marketplace order <order_id>
//! marketplace add-customer <name> <email>
//! marketplace add-product <name> <price_cents> <quantity>
//! marketplace products [limit]
//! marketplace status
//! ```

use std::sync::Arc;

use serde::Serialize;
use serde_json::{json, Value};
use tracing::debug;

use crate::error::ErrorResponse;
use marketplace_core::{Order, OrderLineRequest, PlaceOrderRequest};
use marketplace_db::{migrations, Database};
use marketplace_orders::{FindOrder, PlaceOrder};

const DEFAULT_LIST_LIMIT: u32 = 50;

pub const USAGE: &str = "\
Usage: marketplace <COMMAND>

Commands:
  place <customer_id> <product_id>:<qty>...   Place an order
  order <order_id>                            Show an order
  add-customer <name> <email>                 Register a customer
  add-product <name> <price_cents> <quantity> Register a product
  products [limit]                            List products
  status                                      Show database status
  help                                        Show this help message";

/// A parsed command line.
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    Place {
        customer_id: String,
        lines: Vec<OrderLineRequest>,
    },
    Order {
        order_id: String,
    },
    AddCustomer {
        name: String,
        email: String,
    },
    AddProduct {
        name: String,
        price_cents: i64,
        quantity: i64,
    },
    Products {
        limit: u32,
    },
    Status,
    Help,
}

/// Malformed command line.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum UsageError {
    #[error("Missing command")]
    MissingCommand,

    #[error("Unknown command: {0}")]
    UnknownCommand(String),

    #[error("Missing argument: {0}")]
    MissingArgument(&'static str),

    #[error("Unexpected argument: {0}")]
    UnexpectedArgument(String),

    #[error("Invalid {field}: '{value}'")]
    Invalid { field: &'static str, value: String },
}

impl Command {
    /// Parses the arguments following the program name.
    pub fn parse(args: &[String]) -> Result<Self, UsageError> {
        let (name, rest) = args.split_first().ok_or(UsageError::MissingCommand)?;

        let command = match name.as_str() {
            "place" => {
                let (customer_id, lines) = rest
                    .split_first()
                    .ok_or(UsageError::MissingArgument("customer_id"))?;
                // An order without lines is passed through; the workflow rejects it.
                let lines = lines
                    .iter()
                    .map(|line| parse_line(line))
                    .collect::<Result<Vec<_>, _>>()?;
                Command::Place {
                    customer_id: customer_id.clone(),
                    lines,
                }
            }
            "order" => Command::Order {
                order_id: exactly_one(rest, "order_id")?,
            },
            "add-customer" => match rest {
                [name, email] => Command::AddCustomer {
                    name: name.clone(),
                    email: email.clone(),
                },
                [] => return Err(UsageError::MissingArgument("name")),
                [_] => return Err(UsageError::MissingArgument("email")),
                [_, _, extra, ..] => return Err(UsageError::UnexpectedArgument(extra.clone())),
            },
            "add-product" => match rest {
                [name, price, quantity] => Command::AddProduct {
                    name: name.clone(),
                    price_cents: parse_number("price_cents", price)?,
                    quantity: parse_number("quantity", quantity)?,
                },
                [] => return Err(UsageError::MissingArgument("name")),
                [_] => return Err(UsageError::MissingArgument("price_cents")),
                [_, _] => return Err(UsageError::MissingArgument("quantity")),
                [_, _, _, extra, ..] => {
                    return Err(UsageError::UnexpectedArgument(extra.clone()))
                }
            },
            "products" => match rest {
                [] => Command::Products {
                    limit: DEFAULT_LIST_LIMIT,
                },
                [limit] => Command::Products {
                    limit: parse_number("limit", limit)?,
                },
                [_, extra, ..] => return Err(UsageError::UnexpectedArgument(extra.clone())),
            },
            "status" => Command::Status,
            "help" | "--help" | "-h" => Command::Help,
            other => return Err(UsageError::UnknownCommand(other.to_string())),
        };

        Ok(command)
    }
}

/// Parses `<product_id>:<qty>`.
fn parse_line(arg: &str) -> Result<OrderLineRequest, UsageError> {
    let (id, quantity) = arg.rsplit_once(':').ok_or_else(|| UsageError::Invalid {
        field: "line",
        value: arg.to_string(),
    })?;

    Ok(OrderLineRequest::new(id, parse_number("quantity", quantity)?))
}

fn parse_number<T: std::str::FromStr>(field: &'static str, value: &str) -> Result<T, UsageError> {
    value.parse().map_err(|_| UsageError::Invalid {
        field,
        value: value.to_string(),
    })
}

fn exactly_one(rest: &[String], field: &'static str) -> Result<String, UsageError> {
    match rest {
        [value] => Ok(value.clone()),
        [] => Err(UsageError::MissingArgument(field)),
        [_, extra, ..] => Err(UsageError::UnexpectedArgument(extra.clone())),
    }
}

/// An order with its derived total.
#[derive(Debug, Serialize)]
struct OrderView<'a> {
    #[serde(flatten)]
    order: &'a Order,
    total_cents: i64,
}

fn order_json(order: &Order) -> Value {
    let view = OrderView {
        order,
        total_cents: order.total().cents(),
    };
    json!(view)
}

/// Runs a command against the database and returns its JSON output.
pub async fn execute(command: Command, db: &Database) -> Result<Value, ErrorResponse> {
    debug!(?command, "Executing command");

    match command {
        Command::Place { customer_id, lines } => {
            let workflow = PlaceOrder::new(
                Arc::new(db.customers()),
                Arc::new(db.products()),
                Arc::new(db.order_store()),
            );
            let order = workflow
                .execute(PlaceOrderRequest {
                    customer_id,
                    products: lines,
                })
                .await?;
            Ok(order_json(&order))
        }
        Command::Order { order_id } => {
            let order = FindOrder::new(Arc::new(db.order_store()))
                .execute(&order_id)
                .await?;
            Ok(order_json(&order))
        }
        Command::AddCustomer { name, email } => {
            let customer = db.customers().insert(&name, &email).await?;
            Ok(json!(customer))
        }
        Command::AddProduct {
            name,
            price_cents,
            quantity,
        } => {
            let product = db.products().insert(&name, price_cents, quantity).await?;
            Ok(json!(product))
        }
        Command::Products { limit } => {
            let products = db.products().list(limit).await?;
            Ok(json!(products))
        }
        Command::Status => {
            let (total, applied) = migrations::migration_status(db.pool()).await?;
            Ok(json!({
                "healthy": db.health_check().await,
                "customers": db.customers().count().await?,
                "products": db.products().count().await?,
                "orders": db.orders().count().await?,
                "migrations": { "total": total, "applied": applied },
            }))
        }
        Command::Help => Ok(Value::String(USAGE.to_string())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorCode;
    use marketplace_db::DbConfig;

    fn args(values: &[&str]) -> Vec<String> {
        values.iter().map(|v| v.to_string()).collect()
    }

    #[test]
    fn test_parse_place() {
        let command = Command::parse(&args(&["place", "C1", "P1:3", "P2:1"])).unwrap();

        assert_eq!(
            command,
            Command::Place {
                customer_id: "C1".to_string(),
                lines: vec![OrderLineRequest::new("P1", 3), OrderLineRequest::new("P2", 1)],
            }
        );
    }

    #[test]
    fn test_parse_rejects_malformed_line() {
        let err = Command::parse(&args(&["place", "C1", "P1"])).unwrap_err();
        assert!(matches!(err, UsageError::Invalid { field: "line", .. }));

        let err = Command::parse(&args(&["place", "C1", "P1:many"])).unwrap_err();
        assert!(matches!(err, UsageError::Invalid { field: "quantity", .. }));
    }

    #[test]
    fn test_parse_other_commands() {
        assert_eq!(
            Command::parse(&args(&["add-product", "Widget", "500", "10"])).unwrap(),
            Command::AddProduct {
                name: "Widget".to_string(),
                price_cents: 500,
                quantity: 10,
            }
        );
        assert_eq!(
            Command::parse(&args(&["products"])).unwrap(),
            Command::Products {
                limit: DEFAULT_LIST_LIMIT
            }
        );
        assert_eq!(Command::parse(&args(&["status"])).unwrap(), Command::Status);
        assert_eq!(
            Command::parse(&args(&["add-customer", "Ada"])).unwrap_err(),
            UsageError::MissingArgument("email")
        );
        assert_eq!(
            Command::parse(&args(&["ship"])).unwrap_err(),
            UsageError::UnknownCommand("ship".to_string())
        );
        assert_eq!(Command::parse(&[]).unwrap_err(), UsageError::MissingCommand);
    }

    #[tokio::test]
    async fn test_place_and_show_order() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let customer = db.customers().insert("Ada", "ada@example.com").await.unwrap();
        let widget = db.products().insert("Widget", 500, 10).await.unwrap();

        let placed = execute(
            Command::Place {
                customer_id: customer.id.clone(),
                lines: vec![OrderLineRequest::new(widget.id.clone(), 3)],
            },
            &db,
        )
        .await
        .unwrap();

        assert_eq!(placed["total_cents"], 1500);
        let order_id = placed["id"].as_str().unwrap().to_string();

        let shown = execute(Command::Order { order_id }, &db).await.unwrap();
        assert_eq!(shown["order_products"][0]["quantity"], 3);
        assert_eq!(shown["customer"]["email"], "ada@example.com");
    }

    #[tokio::test]
    async fn test_overflowing_total_is_a_validation_error() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let customer = db.customers().insert("Ada", "ada@example.com").await.unwrap();
        let gold = db.products().insert("Gold bar", i64::MAX / 2, 10).await.unwrap();

        let err = execute(
            Command::Place {
                customer_id: customer.id,
                lines: vec![OrderLineRequest::new(gold.id.clone(), 3)],
            },
            &db,
        )
        .await
        .unwrap_err();

        assert_eq!(err.code, ErrorCode::ValidationError);
        assert_eq!(db.orders().count().await.unwrap(), 0);
        let gold = db.products().get_by_id(&gold.id).await.unwrap().unwrap();
        assert_eq!(gold.quantity, 10);
    }

    #[tokio::test]
    async fn test_failures_become_error_responses() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let customer = db.customers().insert("Ada", "ada@example.com").await.unwrap();

        let err = execute(
            Command::Place {
                customer_id: customer.id,
                lines: Vec::new(),
            },
            &db,
        )
        .await
        .unwrap_err();
        assert_eq!(err.code, ErrorCode::EmptyOrder);

        let err = execute(
            Command::AddCustomer {
                name: "Ada".to_string(),
                email: "ada@example.com".to_string(),
            },
            &db,
        )
        .await
        .unwrap_err();
        assert_eq!(err.code, ErrorCode::Duplicate);
    }
}
