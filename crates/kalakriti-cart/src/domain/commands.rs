//! Commands for the Cart context.

use kalakriti_core::command::Command;
use uuid::Uuid;

use super::aggregates::{CartLineItem, ProductId};

/// Command to add a product to the cart, merging with an existing line.
#[derive(Debug, Clone)]
pub struct AddItem {
    /// The correlation ID for tracing.
    pub correlation_id: Uuid,
    /// The line to add; `quantity` is the amount to add, not the new total.
    pub item: CartLineItem,
}

/// Command to delete a product's line from the cart.
#[derive(Debug, Clone)]
pub struct RemoveItem {
    /// The correlation ID for tracing.
    pub correlation_id: Uuid,
    /// The product to remove.
    pub product_id: ProductId,
}

/// Command to set a line's quantity. Zero or negative removes the line.
#[derive(Debug, Clone)]
pub struct UpdateQuantity {
    /// The correlation ID for tracing.
    pub correlation_id: Uuid,
    /// The product whose line is updated.
    pub product_id: ProductId,
    /// New absolute quantity.
    pub quantity: i64,
}

/// Command to take the lines of a placed order out of the cart.
#[derive(Debug, Clone)]
pub struct RemoveOrderedItems {
    /// The correlation ID for tracing.
    pub correlation_id: Uuid,
    /// The lines as they were submitted with the order.
    pub items: Vec<CartLineItem>,
}

/// Command to empty the cart.
#[derive(Debug, Clone)]
pub struct ClearCart {
    /// The correlation ID for tracing.
    pub correlation_id: Uuid,
}

impl Command for AddItem {
    fn command_type(&self) -> &'static str {
        "cart.add_item"
    }

    fn correlation_id(&self) -> Uuid {
        self.correlation_id
    }
}

impl Command for RemoveItem {
    fn command_type(&self) -> &'static str {
        "cart.remove_item"
    }

    fn correlation_id(&self) -> Uuid {
        self.correlation_id
    }
}

impl Command for UpdateQuantity {
    fn command_type(&self) -> &'static str {
        "cart.update_quantity"
    }

    fn correlation_id(&self) -> Uuid {
        self.correlation_id
    }
}

impl Command for ClearCart {
    fn command_type(&self) -> &'static str {
        "cart.clear"
    }

    fn correlation_id(&self) -> Uuid {
        self.correlation_id
    }
}

impl Command for RemoveOrderedItems {
    fn command_type(&self) -> &'static str {
        "cart.remove_ordered_items"
    }

    fn correlation_id(&self) -> Uuid {
        self.correlation_id
    }
}
