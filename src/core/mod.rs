pub mod campaign;
pub mod logging;
pub mod storage;
