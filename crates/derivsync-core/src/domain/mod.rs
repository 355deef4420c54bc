//! 도메인 모델 및 추상화.

pub mod expiry;
pub mod record;
pub mod source;
pub mod store;

pub use expiry::*;
pub use record::*;
pub use source::*;
pub use store::*;
