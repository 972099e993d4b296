//! Domain models persisted through the document-store collaborators.

pub mod food;
pub mod order;
pub mod table;
pub mod user;

pub use food::Food;
pub use order::{Order, OrderItem};
pub use table::Table;
pub use user::User;
