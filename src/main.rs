use clap::Parser;
use lentivirus_toolbox::{app, config, logger, ui_cli::Cli};

/// 프로그램의 엔트리 포인트. 설정을 로드한 뒤 요청한 계산을 실행한다.
fn main() {
    let cli = Cli::parse();
    logger::init_cli_logger(cli.verbose);
    if let Err(err) = try_run(&cli) {
        tracing::error!("{err}");
        eprintln!("오류: {err}");
        std::process::exit(1);
    }
}

fn try_run(cli: &Cli) -> Result<(), app::AppError> {
    let cfg = config::load_or_default(&cli.config)?;
    app::run(&cli.command, &cfg, cli.json)?;
    Ok(())
}
