//! 단위 정의 및 변환 모듈 모음.

pub mod mass;
pub mod volume;

pub use mass::{convert_mass, MassUnit};
pub use volume::{convert_volume, VolumeUnit};
