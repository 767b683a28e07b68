pub mod filter;
pub mod prompts;
pub mod review;
pub mod wizard;

pub use filter::{Card, FilterManager, FilterSpec, RangeBucket};
