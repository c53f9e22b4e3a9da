pub mod asset_service;
pub mod calculation_service;
pub mod category_service;
pub mod directory;
pub mod family_service;
pub mod transaction_service;
pub mod user_service;
