use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// CLI용 로거를 초기화한다. 로그는 stderr로 보내 stdout 결과(JSON 포함)와 섞이지 않게 한다.
pub fn init_cli_logger(verbose: bool) {
    let default_filter = if verbose {
        "lentivirus_toolbox=debug,info"
    } else {
        "lentivirus_toolbox=warn"
    };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));

    tracing_subscriber::registry()
        .with(filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(false)
                .with_thread_ids(false)
                .with_file(false)
                .with_line_number(false)
                .compact(),
        )
        .init();
}
