use crate::catalog::VesselCatalog;
use crate::error::{require_positive, CalcResult};

/// 시딩 계산 결과. 부피는 용기 기하로만 정해지고 나머지는 안내용 지표다.
#[derive(Debug, Clone)]
pub struct SeedingPlan {
    pub vessel_type: String,
    /// 용기 면적 / 시딩 기준 면적
    pub surface_ratio: f64,
    pub seeding_volume_ml: f64,
    pub target_cells: f64,
    pub cells_per_cm2: f64,
    /// 권장 부피에 목표 세포를 넣었을 때의 밀도 [cells/mL]
    pub cells_per_ml: f64,
    pub reference_density_cells_per_ml: f64,
    /// cells_per_ml / 기준 밀도 - 1 (0이면 기준과 동일)
    pub density_deviation: f64,
}

/// 용기 종류에 대한 권장 시딩 부피[mL]를 계산한다.
///
/// `target_cells`는 검증에만 쓰이며 부피에 곱해지지 않는다.
pub fn compute_seeding_volume(
    catalog: &VesselCatalog,
    vessel_type: &str,
    target_cells: f64,
) -> CalcResult<f64> {
    require_positive(target_cells, "목표 세포 수")?;
    let reference = &catalog.seeding;
    let surface_ratio = catalog.surface_ratio(vessel_type, reference.surface_area_cm2)?;
    let volume_ml = match catalog.lookup(vessel_type)?.seeding_volume_ml {
        Some(fixed) => require_positive(fixed, "용기 고정 시딩 부피")?,
        None => require_positive(reference.volume_ml, "기준 시딩 부피")? * surface_ratio,
    };
    tracing::debug!(vessel_type, target_cells, volume_ml, "seeding volume");
    Ok(volume_ml)
}

/// 시딩 부피와 함께 목표 세포 수 기반 밀도 지표를 계산한다.
pub fn plan_seeding(
    catalog: &VesselCatalog,
    vessel_type: &str,
    target_cells: f64,
) -> CalcResult<SeedingPlan> {
    let seeding_volume_ml = compute_seeding_volume(catalog, vessel_type, target_cells)?;
    let reference = &catalog.seeding;
    let area = catalog.lookup(vessel_type)?.surface_area_cm2;
    let surface_ratio = catalog.surface_ratio(vessel_type, reference.surface_area_cm2)?;
    let cells_per_ml = target_cells / seeding_volume_ml;
    let reference_density = require_positive(reference.density_cells_per_ml, "기준 세포 밀도")?;
    Ok(SeedingPlan {
        vessel_type: vessel_type.to_string(),
        surface_ratio,
        seeding_volume_ml,
        target_cells,
        cells_per_cm2: target_cells / area,
        cells_per_ml,
        reference_density_cells_per_ml: reference_density,
        density_deviation: cells_per_ml / reference_density - 1.0,
    })
}
