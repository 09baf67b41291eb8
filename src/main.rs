use polyfm::synth::SynthConfig;

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let config_path = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "polyfm.json".to_string());

    let config = match SynthConfig::load(&config_path) {
        Ok(config) => config,
        Err(e) => {
            log::error!("{e}");
            std::process::exit(1);
        }
    };

    if let Err(e) = polyfm::runtime::start(config) {
        log::error!("{e}");
        std::process::exit(1);
    }
}
