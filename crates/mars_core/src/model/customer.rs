//! Customer organization using deployed equipment.

use crate::model::record::RecordId;
use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};

/// Identifier of a customer row.
pub type CustomerId = RecordId;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Customer {
    pub id: CustomerId,
    /// Organization name, also used as the display label.
    pub customer_name: String,
    pub customer_address: String,
    pub customer_city: String,
}

/// Insert payload for a customer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewCustomer {
    pub customer_name: String,
    pub customer_address: String,
    pub customer_city: String,
}

impl NewCustomer {
    pub fn new(
        customer_name: impl Into<String>,
        customer_address: impl Into<String>,
        customer_city: impl Into<String>,
    ) -> Self {
        Self {
            customer_name: customer_name.into(),
            customer_address: customer_address.into(),
            customer_city: customer_city.into(),
        }
    }
}

impl Customer {
    pub fn label(&self) -> String {
        self.customer_name.clone()
    }
}

impl Display for Customer {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.customer_name)
    }
}
