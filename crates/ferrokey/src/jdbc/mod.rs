mod connection;
mod session;
mod sql_value;
pub(crate) mod statement;

pub use connection::*;
pub use session::*;
pub use sql_value::*;
