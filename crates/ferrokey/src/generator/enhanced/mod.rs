mod optimizer;
mod table;
#[cfg(test)]
mod tests;

pub use optimizer::*;
pub use table::*;
