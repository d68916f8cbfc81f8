//! 렌티바이러스 생산 계산 엔진. 시딩 부피, 형질주입 시약/DNA 환산, 역가(MOI) 계산을
//! 순수 함수로 제공하고 CLI는 그 위의 얇은 껍데기로 둔다.

pub mod api;
pub mod app;
pub mod catalog;
pub mod config;
pub mod conversion;
pub mod error;
pub mod logger;
pub mod production;
pub mod titer;
pub mod ui_cli;
pub mod units;

pub use catalog::{UnknownVesselError, VesselCatalog, VesselSpec};
pub use error::{CalcError, CalcResult};
