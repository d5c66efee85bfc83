mod composite;
mod identifier;
mod types;

pub use composite::*;
pub use identifier::*;
pub use types::*;
