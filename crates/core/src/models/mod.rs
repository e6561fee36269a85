pub mod holding;
pub mod price;
pub mod watchlist;
pub mod window;
