mod price;
mod volume;

pub use price::Price;
pub use volume::Volume;

pub type OrderId = uuid::Uuid;
pub type TradeId = uuid::Uuid;
pub type UserId = uuid::Uuid;
pub type ProductId = uuid::Uuid;
pub type Timestamp = chrono::DateTime<chrono::Utc>;
