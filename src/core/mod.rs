pub mod balance;
pub mod constants;
pub mod dispatcher;
pub mod error;
pub mod normalizer;
pub mod registry;
pub mod swap_parser;
pub mod transaction_context;
pub mod utils;
