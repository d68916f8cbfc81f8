//! 바이러스 생산 단계(세포 시딩, 형질주입) 계산 모듈 모음.

pub mod seeding;
pub mod transfection;

pub use seeding::*;
pub use transfection::*;
