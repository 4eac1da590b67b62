pub mod actions;
pub mod reader;
pub mod session;
pub mod sub_account;
