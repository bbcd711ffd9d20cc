use citypulse::param;
use citypulse::run;
use flexi_logger::{FileSpec, Logger};
use log::{error, info};

fn main() {
    let param_path = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "param.yaml".to_string());

    let param = match param::get(param_path.clone()) {
        Ok(param) => param,
        Err(e) => {
            eprintln!("Could not read {}: {} (using defaults)", param_path, e);
            param::Param::default()
        }
    };

    let logger = Logger::try_with_env_or_str(&param.general.log_level)
        .expect("invalid log level in configuration");
    if param.general.log_base.is_empty() {
        logger.start().expect("logger failed to start");
    } else {
        logger
            .log_to_file(
                FileSpec::default()
                    .basename(param.general.log_base.clone())
                    .suffix(param.general.log_suffix.clone()),
            )
            .start()
            .expect("logger failed to start");
    }

    info!("citypulse {} starting", env!("CARGO_PKG_VERSION"));

    match run(&param) {
        Ok(snapshot) => println!("{}", snapshot),
        Err(e) => {
            error!("Pipeline failed: {}", e);
            std::process::exit(1);
        }
    }
}
