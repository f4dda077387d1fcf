//! Domain model.
//!
//! Raw payload shapes, the normalized records built from them, and the
//! sentinel values shared with other layers.

pub mod fields;
pub mod raw;
pub mod records;
pub mod sentinels;
pub mod settings;

pub use fields::*;
pub use raw::*;
pub use records::*;
pub use sentinels::*;
pub use settings::*;
