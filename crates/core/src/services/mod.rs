pub mod returns_service;
pub mod series_service;
pub mod timeframe_service;
