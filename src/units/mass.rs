use serde::{Deserialize, Serialize};

/// 플라스미드 질량 단위. 내부 기준은 µg이다.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MassUnit {
    Nanogram,
    Microgram,
    Milligram,
}

fn to_ug(value: f64, unit: MassUnit) -> f64 {
    match unit {
        MassUnit::Nanogram => value / 1000.0,
        MassUnit::Microgram => value,
        MassUnit::Milligram => value * 1000.0,
    }
}

fn from_ug(value: f64, unit: MassUnit) -> f64 {
    match unit {
        MassUnit::Nanogram => value * 1000.0,
        MassUnit::Microgram => value,
        MassUnit::Milligram => value / 1000.0,
    }
}

/// 질량을 변환한다.
pub fn convert_mass(value: f64, from: MassUnit, to: MassUnit) -> f64 {
    let base = to_ug(value, from);
    from_ug(base, to)
}
