pub mod price;

pub use price::{compare, parse_price, ChangeType};
