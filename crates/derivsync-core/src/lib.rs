//! # DerivSync Core
//!
//! 시장 데이터 동기화 서비스의 핵심 도메인 모델 및 타입을 제공합니다.
//!
//! 이 크레이트는 동기화 시스템 전반에서 사용되는 기본 타입을 제공합니다:
//! - 시계열 식별 키 및 인터벌 정의
//! - OHLC / 펀딩비 / 미결제약정 레코드 구조체
//! - 데이터 소스 및 저장소 추상화 trait
//! - 선물 만기 캘린더 (만기일 계산, 롤오버, 종목명 생성)
//! - 에러 분류 체계
//! - 로깅 인프라

pub mod domain;
pub mod error;
pub mod logging;
pub mod types;

pub use domain::*;
pub use error::*;
pub use logging::*;
pub use types::*;
