pub mod entitlement;
pub mod notice;
pub mod session;
pub mod template;

pub use entitlement::*;
pub use notice::*;
pub use session::*;
pub use template::{Template, TemplateCategory};
