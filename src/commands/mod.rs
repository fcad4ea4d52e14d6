pub mod inventory;
pub mod load;
pub mod validate;
