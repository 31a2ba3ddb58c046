pub mod memory;
pub mod uow;
