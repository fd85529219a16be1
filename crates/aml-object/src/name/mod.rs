pub mod amlname;

pub use amlname::{AmlName, NameSeg};
