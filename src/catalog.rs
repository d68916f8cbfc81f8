//! 배양 용기별 표면적과 기준 프로토콜 수치를 담는 읽기 전용 카탈로그.
//! 프로세스 시작 시 한 번 구성한 뒤 각 계산기에 참조로 넘긴다.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::error::{require_positive, CalcResult};

/// 카탈로그에 없는 용기 종류를 조회했을 때의 오류.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("알 수 없는 용기 종류: {0}")]
pub struct UnknownVesselError(pub String);

/// 용기 한 종류의 기하 정보.
///
/// 선택 항목들은 해당 용기 면적에서 이미 보정된 값이며, 존재하면 면적 비례 환산 대신 그대로 쓴다.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VesselSpec {
    /// 성장 표면적 [cm²]
    pub surface_area_cm2: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reference_dna_ug: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reference_opti_mem_ml: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reference_reagent_ul: Option<f64>,
    /// 용기 고정 권장 시딩 부피 [mL]
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub seeding_volume_ml: Option<f64>,
}

impl VesselSpec {
    pub const fn with_area(surface_area_cm2: f64) -> Self {
        Self {
            surface_area_cm2,
            reference_dna_ug: None,
            reference_opti_mem_ml: None,
            reference_reagent_ul: None,
            seeding_volume_ml: None,
        }
    }
}

/// 시딩 기준 프로토콜.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SeedingReference {
    pub vessel_type: String,
    pub surface_area_cm2: f64,
    /// 기준 용기에 넣는 배지 부피 [mL]
    pub volume_ml: f64,
    /// 기준 용기에 심는 세포 수
    pub cells: f64,
    /// 권장 세포 밀도 [cells/mL]
    pub density_cells_per_ml: f64,
}

impl Default for SeedingReference {
    fn default() -> Self {
        Self {
            vessel_type: "T175".into(),
            surface_area_cm2: 175.0,
            volume_ml: 20.0,
            cells: 15_000_000.0,
            density_cells_per_ml: 750_000.0,
        }
    }
}

/// 형질주입 기준 프로토콜. 기준 면적에서의 Opti-MEM, 시약, 총 DNA 양.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransfectionReference {
    pub vessel_type: String,
    pub surface_area_cm2: f64,
    pub opti_mem_ml: f64,
    /// X-tremeGENE 등 형질주입 시약 [µL]
    pub reagent_ul: f64,
    pub total_plasmid_ug: f64,
}

impl Default for TransfectionReference {
    fn default() -> Self {
        Self {
            vessel_type: "T175".into(),
            surface_area_cm2: 175.0,
            opti_mem_ml: 1.0,
            reagent_ul: 76.8,
            total_plasmid_ug: 25.6,
        }
    }
}

/// 용기 카탈로그와 기준 프로토콜 묶음.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VesselCatalog {
    pub seeding: SeedingReference,
    pub transfection: TransfectionReference,
    pub vessels: BTreeMap<String, VesselSpec>,
}

const STANDARD_VESSELS: &[(&str, f64)] = &[
    ("T175", 175.0),
    ("T150", 150.0),
    ("T75", 75.0),
    ("T25", 25.0),
    ("T12.5", 12.5),
    ("15 cm dish", 145.0),
    ("10 cm dish", 55.0),
    // 플레이트 전체 면적
    ("6-well", 58.0),
    ("12-well", 38.0),
    ("24-well", 21.0),
    ("96-well", 3.36),
];

impl Default for VesselCatalog {
    fn default() -> Self {
        let vessels = STANDARD_VESSELS
            .iter()
            .map(|&(name, area)| (name.to_string(), VesselSpec::with_area(area)))
            .collect();
        Self {
            seeding: SeedingReference::default(),
            transfection: TransfectionReference::default(),
            vessels,
        }
    }
}

impl VesselCatalog {
    /// 기준 프로토콜만으로 빈 카탈로그를 만든다. 테스트용 합성 용기를 추가할 때 쓴다.
    pub fn new(seeding: SeedingReference, transfection: TransfectionReference) -> Self {
        Self {
            seeding,
            transfection,
            vessels: BTreeMap::new(),
        }
    }

    pub fn with_vessel(mut self, vessel_type: impl Into<String>, spec: VesselSpec) -> Self {
        self.vessels.insert(vessel_type.into(), spec);
        self
    }

    /// 용기 종류를 정확히 일치하는 키로 조회한다.
    pub fn lookup(&self, vessel_type: &str) -> Result<&VesselSpec, UnknownVesselError> {
        self.vessels.get(vessel_type).ok_or_else(|| {
            tracing::warn!(vessel_type, "unknown vessel type");
            UnknownVesselError(vessel_type.to_string())
        })
    }

    /// 용기 면적 / 기준 면적. 코드로 만든 카탈로그도 여기서 면적을 검사한다.
    pub fn surface_ratio(&self, vessel_type: &str, reference_area_cm2: f64) -> CalcResult<f64> {
        let spec = self.lookup(vessel_type)?;
        let area = require_positive(spec.surface_area_cm2, "용기 표면적")?;
        let reference_area = require_positive(reference_area_cm2, "기준 표면적")?;
        Ok(area / reference_area)
    }

    pub fn vessel_types(&self) -> impl Iterator<Item = &str> {
        self.vessels.keys().map(String::as_str)
    }

    /// 면적과 기준 수치가 양의 유한수인지 검사한다. 문제가 있으면 설명 문자열을 돌려준다.
    pub fn validate(&self) -> Result<(), String> {
        let positive = |v: f64| v.is_finite() && v > 0.0;
        let non_negative = |v: f64| v.is_finite() && v >= 0.0;

        let s = &self.seeding;
        if !positive(s.surface_area_cm2)
            || !positive(s.volume_ml)
            || !positive(s.density_cells_per_ml)
        {
            return Err("시딩 기준 면적/부피/밀도는 0보다 커야 합니다.".into());
        }
        if !non_negative(s.cells) {
            return Err("시딩 기준 세포 수는 0 이상이어야 합니다.".into());
        }
        let t = &self.transfection;
        if !positive(t.surface_area_cm2) {
            return Err("형질주입 기준 면적은 0보다 커야 합니다.".into());
        }
        if !non_negative(t.opti_mem_ml)
            || !non_negative(t.reagent_ul)
            || !non_negative(t.total_plasmid_ug)
        {
            return Err("형질주입 기준 수치는 0 이상이어야 합니다.".into());
        }
        for (name, spec) in &self.vessels {
            if !positive(spec.surface_area_cm2) {
                return Err(format!("{name}: 표면적은 0보다 커야 합니다."));
            }
            let overrides = [
                spec.reference_dna_ug,
                spec.reference_opti_mem_ml,
                spec.reference_reagent_ul,
            ];
            if overrides.iter().flatten().any(|&v| !non_negative(v)) {
                return Err(format!("{name}: 기준 수치는 0 이상이어야 합니다."));
            }
            if spec.seeding_volume_ml.is_some_and(|v| !positive(v)) {
                return Err(format!("{name}: 시딩 부피는 0보다 커야 합니다."));
            }
        }
        Ok(())
    }
}
