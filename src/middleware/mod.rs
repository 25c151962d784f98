pub mod account_token;

pub use account_token::{AccountToken, ACCOUNT_TOKEN_HEADER};
