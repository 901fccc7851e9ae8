//! Sort specification for the note list.

use serde::{Deserialize, Serialize};

/// Sort direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OrderType {
    Ascending,
    Descending,
}

/// Sort key paired with a direction.
///
/// Title ordering compares lower-cased titles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "key", content = "direction", rename_all = "snake_case")]
pub enum NoteOrder {
    Title(OrderType),
    Date(OrderType),
}

impl NoteOrder {
    pub fn order_type(self) -> OrderType {
        match self {
            Self::Title(order_type) | Self::Date(order_type) => order_type,
        }
    }

    /// Same key, new direction.
    pub fn with_order_type(self, order_type: OrderType) -> Self {
        match self {
            Self::Title(_) => Self::Title(order_type),
            Self::Date(_) => Self::Date(order_type),
        }
    }
}

impl Default for NoteOrder {
    /// Newest first.
    fn default() -> Self {
        Self::Date(OrderType::Descending)
    }
}

#[cfg(test)]
mod tests {
    use super::{NoteOrder, OrderType};

    #[test]
    fn default_is_date_descending() {
        assert_eq!(NoteOrder::default(), NoteOrder::Date(OrderType::Descending));
    }

    #[test]
    fn with_order_type_keeps_key() {
        let order = NoteOrder::Title(OrderType::Ascending).with_order_type(OrderType::Descending);
        assert_eq!(order, NoteOrder::Title(OrderType::Descending));
        assert_eq!(order.order_type(), OrderType::Descending);
    }
}
