pub mod read;
pub mod validate;
pub mod write;

pub use read::ReadService;
pub use validate::Validator;
pub use write::WriteService;
