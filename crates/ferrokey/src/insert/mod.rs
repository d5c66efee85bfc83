mod delegate;
mod insert;
mod persister;

pub use delegate::*;
pub use insert::*;
pub use persister::*;
