use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

use crate::api::{self, SampleResultInput, TiterResultsRequest, TransfectionPlanRequest};
use crate::app::AppError;
use crate::config::{Config, DEFAULT_CONFIG_PATH};
use crate::conversion::{self, parse_required_number, ConversionError};
use crate::production::{self, DnaRatio, PlasmidAmount, PlasmidConcentrations, RatioMode};
use crate::titer::{TiterRun, TiterSample};

/// 렌티바이러스 생산 계산기 CLI.
#[derive(Debug, Parser)]
#[command(name = "lentivirus_toolbox")]
#[command(about = "Lentivirus production calculators: seeding, transfection, titer/MOI")]
pub struct Cli {
    /// 설정 파일 경로 (없으면 기본값으로 생성)
    #[arg(short, long, default_value = DEFAULT_CONFIG_PATH)]
    pub config: PathBuf,

    /// 계산 과정 디버그 로그 출력
    #[arg(short, long)]
    pub verbose: bool,

    /// 결과를 API 응답과 같은 JSON으로 출력
    #[arg(long)]
    pub json: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// 카탈로그의 용기 목록
    Vessels,
    /// 용기별 권장 시딩 부피
    Seeding(SeedingArgs),
    /// Opti-MEM, 시약, 플라스미드 DNA 양
    Transfection(TransfectionArgs),
    /// 생존율 측정값으로 MOI와 역가 계산
    Titer(TiterArgs),
}

#[derive(Debug, Args)]
pub struct SeedingArgs {
    #[arg(long)]
    pub vessel: String,
    /// 목표 세포 수 (예: 750K, 1.5M)
    #[arg(long, value_parser = parse_required_number)]
    pub cells: f64,
}

#[derive(Debug, Args)]
pub struct TransfectionArgs {
    #[arg(long)]
    pub vessel: String,
    /// 사용자 지정 비율 "a:b:c". 생략하면 4:3:1
    #[arg(long)]
    pub ratio: Option<String>,
    /// transfer 플라스미드 농도 [ng/µL]
    #[arg(long, value_parser = parse_required_number)]
    pub transfer: Option<f64>,
    /// packaging 플라스미드 농도 [ng/µL]
    #[arg(long, value_parser = parse_required_number)]
    pub packaging: Option<f64>,
    /// envelope 플라스미드 농도 [ng/µL]
    #[arg(long, value_parser = parse_required_number)]
    pub envelope: Option<f64>,
}

#[derive(Debug, Args)]
pub struct TiterArgs {
    /// 형질도입 시점 세포 수
    #[arg(long, value_parser = parse_required_number)]
    pub cells_seeded: f64,
    /// 대조군 생존율[%]. 생략하면 100
    #[arg(long, value_parser = parse_required_number)]
    pub control: Option<f64>,
    /// 시험 웰 "바이러스µL:생존율%" (반복 가능, 예: --well 10:80)
    #[arg(long = "well", value_name = "VOLUME_UL:PERCENT", value_parser = parse_well)]
    pub wells: Vec<(f64, f64)>,
}

fn parse_well(text: &str) -> Result<(f64, f64), ConversionError> {
    let (volume, percent) = text
        .split_once(':')
        .ok_or_else(|| ConversionError::NotANumber(text.to_string()))?;
    Ok((parse_required_number(volume)?, parse_required_number(percent)?))
}

fn fmt_optional(value: Option<f64>, precision: usize) -> String {
    match value {
        Some(v) => format!("{v:.precision$}"),
        None => "—".to_string(),
    }
}

fn print_json<T: serde::Serialize>(value: &T) -> Result<(), AppError> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

/// 용기 목록을 출력한다.
pub fn handle_vessels(cfg: &Config, json: bool) -> Result<(), AppError> {
    let catalog = &cfg.catalog;
    if json {
        return print_json(&catalog.vessels);
    }
    println!("\n-- 용기 카탈로그 --");
    for (name, spec) in &catalog.vessels {
        println!("{name:<12} {:>8.2} cm²", spec.surface_area_cm2);
    }
    Ok(())
}

/// 시딩 부피를 계산해 출력한다.
pub fn handle_seeding(cfg: &Config, args: &SeedingArgs, json: bool) -> Result<(), AppError> {
    if json {
        let req = api::SeedingVolumeRequest {
            vessel_type: args.vessel.clone(),
            target_cells: Some(args.cells),
        };
        return print_json(&api::seeding_volume(&cfg.catalog, &req)?);
    }
    let plan = production::plan_seeding(&cfg.catalog, &args.vessel, args.cells)?;
    println!("\n-- 세포 시딩 ({}) --", plan.vessel_type);
    println!("권장 부피: {:.3} mL", plan.seeding_volume_ml);
    println!(
        "목표 세포: {:.0} ({:.0} cells/cm², {:.0} cells/mL)",
        plan.target_cells, plan.cells_per_cm2, plan.cells_per_ml
    );
    if plan.density_deviation.abs() > 0.25 {
        println!(
            "참고: 기준 밀도 {:.0} cells/mL 대비 {:+.0}% 차이",
            plan.reference_density_cells_per_ml,
            plan.density_deviation * 100.0
        );
    }
    Ok(())
}

/// 형질주입 계획을 계산해 출력한다.
pub fn handle_transfection(
    cfg: &Config,
    args: &TransfectionArgs,
    json: bool,
) -> Result<(), AppError> {
    let ratio = args
        .ratio
        .as_deref()
        .map(conversion::parse_ratio)
        .transpose()?;
    if json {
        let req = TransfectionPlanRequest {
            vessel_type: args.vessel.clone(),
            ratio_mode: if ratio.is_some() {
                api::RatioModeTag::Custom
            } else {
                api::RatioModeTag::Optimal
            },
            ratio,
            transfer_concentration_ng_ul: args.transfer,
            packaging_concentration_ng_ul: args.packaging,
            envelope_concentration_ng_ul: args.envelope,
        };
        return print_json(&api::transfection_plan(&cfg.catalog, &req)?);
    }

    let mode = match ratio {
        Some(values) => RatioMode::Custom(DnaRatio::from_slice(&values)?),
        None => RatioMode::Optimal,
    };
    let concentrations = PlasmidConcentrations {
        transfer: args.transfer,
        packaging: args.packaging,
        envelope: args.envelope,
    };
    let plan =
        production::compute_transfection_plan(&cfg.catalog, &args.vessel, &mode, &concentrations)?;
    println!("\n-- 형질주입 ({}, 비율 {}) --", plan.vessel_type, plan.ratio_display());
    println!("Opti-MEM: {:.3} mL", plan.opti_mem_ml);
    println!("형질주입 시약: {:.3} µL", plan.reagent_ul);
    println!("총 플라스미드: {:.3} µg", plan.total_plasmid_ug);
    let row = |name: &str, amount: &PlasmidAmount| {
        println!(
            "{name:<10} {:>9.3} µg  {:>9} µL",
            amount.mass_ug,
            fmt_optional(amount.volume_ul, 3)
        );
    };
    row("transfer", &plan.transfer);
    row("packaging", &plan.packaging);
    row("envelope", &plan.envelope);
    Ok(())
}

/// 시험 웰 측정값으로 MOI와 역가를 계산해 출력한다.
pub fn handle_titer(cfg: &Config, args: &TiterArgs, json: bool) -> Result<(), AppError> {
    let mut run = TiterRun::new(1, args.cells_seeded)?;
    let mut samples = Vec::with_capacity(args.wells.len());
    for (idx, &(volume_ul, percent)) in args.wells.iter().enumerate() {
        let id = idx as u64 + 1;
        run.samples
            .push(TiterSample::new(id, format!("well {id}"), volume_ul, true));
        samples.push(SampleResultInput {
            id,
            measured_percent: Some(percent),
            cell_concentration: None,
            selection_used: None,
        });
    }
    let req = TiterResultsRequest {
        run_id: run.run_id,
        control_percent: args.control,
        control_cell_concentration: None,
        samples,
    };
    let resp = api::titer_results(&mut run, &req, cfg.survival_convention)?;
    if json {
        return print_json(&resp);
    }
    println!("\n-- 역가 ({:?} 규약) --", cfg.survival_convention);
    for result in &resp.samples {
        println!(
            "웰 {:>2}: 생존 {:>7}%  MOI {:>8}  역가 {:>14} TU/mL",
            result.id,
            fmt_optional(result.measured_percent, 2),
            fmt_optional(result.moi, 4),
            fmt_optional(result.titer_tu_ml, 0)
        );
    }
    println!("평균 역가: {} TU/mL", fmt_optional(resp.average_titer, 0));
    Ok(())
}
