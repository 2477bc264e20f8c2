fn main() -> anyhow::Result<()> {
    env_logger::builder()
        .filter_level(log::LevelFilter::Warn)
        .parse_default_env()
        .init();
    let args: Vec<String> = std::env::args().skip(1).collect();
    molegrid_cui::run_with_args(&args)
}
