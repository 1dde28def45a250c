pub mod import;
pub mod periods;
