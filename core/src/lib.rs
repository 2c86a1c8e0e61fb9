pub mod evidence;
pub mod records;
pub mod storage;

pub mod error;
