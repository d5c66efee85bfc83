mod assigned;
mod composite;
pub mod enhanced;
mod foreign;
pub mod helper;
mod hilo;
mod identity;
mod increment;
mod interface;
mod multiple_hilo;
mod mutex;
mod select;
mod sequence;
mod sequence_hilo;
mod table;
mod table_hilo;
#[cfg(test)]
mod tests;
mod uuid;

pub use assigned::*;
pub use composite::*;
pub use enhanced::{EnhancedTableGenerator, Optimizer, OptimizerKind, ValueSource};
pub use foreign::*;
pub use identity::*;
pub use increment::*;
pub use interface::*;
pub use multiple_hilo::MultipleHiLoPerTableGenerator;
pub(crate) use mutex::*;
pub use select::*;
pub use sequence::SequenceGenerator;
pub use sequence_hilo::SequenceHiLoGenerator;
pub use table::TableGenerator;
pub use table_hilo::TableHiLoGenerator;
pub use self::uuid::*;
