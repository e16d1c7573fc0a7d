//! Transform stages: rewrite the document from [`Data`](crate::Data).

mod bibliography;
mod distill;

pub use bibliography::Bibliography;
pub use distill::{DistillAppendix, DistillFooter, DistillHeader};
