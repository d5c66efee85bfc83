pub mod params;
mod properties;
#[cfg(test)]
mod tests;

pub use properties::*;
