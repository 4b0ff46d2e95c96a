//! Convert the transaction listing of the Chia wallet CLI
//! (`chia wallet get_transactions`) into a CSV file Koinly can import.

pub mod error;
pub mod parser;
pub mod report;
pub mod transaction;
