//! 역가(titer) 측정 배치의 MOI/기능적 역가 계산 모듈.

pub mod moi;
pub mod run;

pub use moi::*;
pub use run::*;
