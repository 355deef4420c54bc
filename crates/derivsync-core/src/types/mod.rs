//! 동기화 시스템 전반에서 사용되는 공통 타입.

mod interval;
mod series;

pub use interval::*;
pub use series::*;
