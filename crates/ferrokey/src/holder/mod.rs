mod holder;
#[cfg(test)]
mod tests;

pub use holder::*;
