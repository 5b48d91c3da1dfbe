pub mod category;
pub mod currency;
pub mod receipt;
pub mod status;

pub use category::Category;
pub use currency::Currency;
pub use receipt::ParsedReceipt;
pub use status::PaymentStatus;
