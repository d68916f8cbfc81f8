use serde::{Deserialize, Serialize};

/// 액체 체적 단위. 내부 기준은 mL이다.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum VolumeUnit {
    Microliter,
    Milliliter,
    Liter,
}

fn to_ml(value: f64, unit: VolumeUnit) -> f64 {
    match unit {
        VolumeUnit::Microliter => value / 1000.0,
        VolumeUnit::Milliliter => value,
        VolumeUnit::Liter => value * 1000.0,
    }
}

fn from_ml(value: f64, unit: VolumeUnit) -> f64 {
    match unit {
        VolumeUnit::Microliter => value * 1000.0,
        VolumeUnit::Milliliter => value,
        VolumeUnit::Liter => value / 1000.0,
    }
}

/// 체적을 변환한다.
pub fn convert_volume(value: f64, from: VolumeUnit, to: VolumeUnit) -> f64 {
    let ml = to_ml(value, from);
    from_ml(ml, to)
}
