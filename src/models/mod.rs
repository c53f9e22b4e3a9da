pub mod asset;
pub mod category;
pub mod family;
pub mod transaction;
pub mod user;

pub use asset::{Asset, AssetType};
pub use category::Category;
pub use family::{FamilyGroup, FamilyGroupDetail, FamilyMember, FamilyMemberDetail, FamilyRole};
pub use transaction::{Transaction, TransactionType, TransactionWithCategory};
pub use user::User;
