// Application layer: the ledger store and its error type.
// Drivers (the CLI session, tests) own a `Ledger` and pass it by reference.

pub mod error;
pub mod ledger;

pub use error::*;
pub use ledger::*;
