pub mod cv;
pub mod organization;
pub mod template;
