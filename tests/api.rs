//! JSON 계약 테스트. 느슨한 숫자 입력과 응답 반올림을 확인한다.
use lentivirus_toolbox::api::{
    seeding_volume, titer_results, transfection_plan, SeedingVolumeRequest, TiterResultsRequest,
    TransfectionPlanRequest,
};
use lentivirus_toolbox::titer::{SampleRole, SurvivalConvention, TiterRun, TiterSample};
use lentivirus_toolbox::{CalcError, VesselCatalog};
use serde_json::json;

#[test]
fn seeding_volume_accepts_shorthand_cells() {
    let catalog = VesselCatalog::default();
    let req: SeedingVolumeRequest =
        serde_json::from_value(json!({"vessel_type": "T75", "target_cells": "1.5M"}))
            .expect("request");
    assert_eq!(req.target_cells, Some(1_500_000.0));
    let resp = seeding_volume(&catalog, &req).expect("response");
    assert_eq!(resp.seeding_volume_ml, 8.571);
    assert_eq!(
        serde_json::to_value(&resp).expect("json"),
        json!({"seeding_volume_ml": 8.571})
    );
}

#[test]
fn seeding_volume_requires_target_cells() {
    let catalog = VesselCatalog::default();
    let req: SeedingVolumeRequest =
        serde_json::from_value(json!({"vessel_type": "T75", "target_cells": ""}))
            .expect("request");
    let err = seeding_volume(&catalog, &req).unwrap_err();
    assert!(matches!(err, CalcError::InvalidInput(_)), "{err:?}");
}

#[test]
fn transfection_plan_optimal_with_loose_concentrations() {
    let catalog = VesselCatalog::default();
    let req: TransfectionPlanRequest = serde_json::from_value(json!({
        "vessel_type": "T175",
        "ratio_mode": "optimal",
        "transfer_concentration_ng_ul": "1000",
        "packaging_concentration_ng_ul": "",
        "envelope_concentration_ng_ul": null
    }))
    .expect("request");
    let resp = transfection_plan(&catalog, &req).expect("response");
    assert_eq!(resp.ratio_display, "4:3:1");
    assert_eq!(resp.opti_mem_ml, 1.0);
    assert_eq!(resp.xtremegene_ul, 76.8);
    assert_eq!(resp.total_plasmid_ug, 25.6);
    assert_eq!(resp.transfer_mass_ug, 12.8);
    assert_eq!(resp.transfer_volume_ul, Some(12.8));
    assert_eq!(resp.packaging_mass_ug, 9.6);
    assert_eq!(resp.packaging_volume_ul, None);
    assert_eq!(resp.envelope_mass_ug, 3.2);
    assert_eq!(resp.envelope_volume_ul, None);
}

#[test]
fn transfection_plan_custom_mode_needs_three_components() {
    let catalog = VesselCatalog::default();
    let missing: TransfectionPlanRequest =
        serde_json::from_value(json!({"vessel_type": "T25", "ratio_mode": "custom"}))
            .expect("request");
    assert!(matches!(
        transfection_plan(&catalog, &missing),
        Err(CalcError::InvalidRatio(_))
    ));

    let short: TransfectionPlanRequest = serde_json::from_value(
        json!({"vessel_type": "T25", "ratio_mode": "custom", "ratio": [1, 1]}),
    )
    .expect("request");
    assert!(matches!(
        transfection_plan(&catalog, &short),
        Err(CalcError::InvalidRatio(_))
    ));

    let ok: TransfectionPlanRequest = serde_json::from_value(
        json!({"vessel_type": "T25", "ratio_mode": "custom", "ratio": [1, 1, 2]}),
    )
    .expect("request");
    let resp = transfection_plan(&catalog, &ok).expect("response");
    assert_eq!(resp.ratio, vec![1.0, 1.0, 2.0]);
    assert_eq!(resp.ratio_display, "1:1:2");
}

#[test]
fn unknown_ratio_mode_is_unrepresentable() {
    let parsed = serde_json::from_value::<TransfectionPlanRequest>(
        json!({"vessel_type": "T25", "ratio_mode": "4:3:1"}),
    );
    assert!(parsed.is_err());
}

fn run_with_wells() -> TiterRun {
    TiterRun::new(42, 200_000.0)
        .expect("run")
        .with_sample(TiterSample::new(1, "10 µL", 10.0, true))
        .with_sample(TiterSample::new(2, "saturated", 20.0, true))
        .with_sample(TiterSample::new(3, "control", 0.0, true))
}

#[test]
fn titer_results_scores_and_rounds() {
    let mut run = run_with_wells();
    let req: TiterResultsRequest = serde_json::from_value(json!({
        "run_id": 42,
        "control_percent": 100,
        "samples": [
            {"id": 1, "measured_percent": 80},
            {"id": 2, "measured_percent": "0"},
            {"id": 3, "measured_percent": 1.5}
        ]
    }))
    .expect("request");
    let resp = titer_results(&mut run, &req, SurvivalConvention::Complement).expect("response");
    assert_eq!(resp.samples.len(), 3);
    assert_eq!(resp.samples[0].moi, Some(0.2231));
    assert_eq!(resp.samples[0].titer_tu_ml, Some(4_462_871.03));
    assert_eq!(resp.samples[1].moi, None);
    assert_eq!(resp.samples[1].titer_tu_ml, None);
    assert_eq!(resp.samples[2].titer_tu_ml, None);
    assert_eq!(resp.average_titer, Some(4_460_000.0));
    assert_eq!(run.control_percent, Some(100.0));
}

#[test]
fn titer_results_is_atomic_on_bad_measurement() {
    let mut run = run_with_wells();
    let before = run.clone();
    let req: TiterResultsRequest = serde_json::from_value(json!({
        "run_id": 42,
        "samples": [
            {"id": 1, "measured_percent": 80},
            {"id": 2, "measured_percent": 140}
        ]
    }))
    .expect("request");
    let err = titer_results(&mut run, &req, SurvivalConvention::Complement).unwrap_err();
    assert!(matches!(err, CalcError::InvalidMeasurement(_)), "{err:?}");
    assert_eq!(run, before);
}

#[test]
fn titer_results_rejects_mismatched_run() {
    let mut run = run_with_wells();
    let req: TiterResultsRequest =
        serde_json::from_value(json!({"run_id": 1, "samples": []})).expect("request");
    assert!(matches!(
        titer_results(&mut run, &req, SurvivalConvention::Complement),
        Err(CalcError::InvalidInput(_))
    ));
}

#[test]
fn titer_results_reinfers_role_when_selection_changes() {
    let mut run = run_with_wells();
    assert_eq!(run.sample(3).expect("control").role, SampleRole::ControlWithSelection);
    let req: TiterResultsRequest = serde_json::from_value(json!({
        "run_id": 42,
        "samples": [
            {"id": 3, "cell_concentration": "400K", "selection_used": false},
            {"id": 1, "cell_concentration": 200000}
        ]
    }))
    .expect("request");
    let resp = titer_results(&mut run, &req, SurvivalConvention::Complement).expect("response");
    assert_eq!(
        run.sample(3).expect("control").role,
        SampleRole::ControlWithoutSelection
    );
    assert_eq!(run.control_cells(), Some(400_000.0));
    let well = resp.samples.iter().find(|s| s.id == 1).expect("well 1");
    assert_eq!(well.moi, Some(0.6931));
}
