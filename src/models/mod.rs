pub mod stats;
pub mod template_list;

pub use stats::*;
pub use template_list::*;
