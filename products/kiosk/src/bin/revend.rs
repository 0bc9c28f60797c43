use anyhow::Context;
use kiosk::{Args, USAGE};
use revend_base::{log, log_fatal};
use revend_camera::V4l2Camera;
use revend_classify::OnnxDetector;
use revend_session::{Config, Worker};
use revend_voucher::HttpVoucherClient;
use tokio_util::sync::CancellationToken;

fn load_config(args: &Args) -> anyhow::Result<Config> {
    match &args.config {
        Some(path) => Config::load(path),
        None => {
            log::info!("no config file given, using defaults");
            let config = Config::default();
            config.validate()?;
            Ok(config)
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = match Args::parse(std::env::args().skip(1)) {
        Ok(args) => args,
        Err(e) => {
            eprintln!("{e}\n{USAGE}");
            std::process::exit(2);
        }
    };

    match &args.log_dir {
        Some(dir) => revend_base::init_file_logger(dir)
            .with_context(|| format!("failed to open log directory {}", dir.display()))?,
        None => revend_base::init_stdout_logger(),
    }

    let config = match load_config(&args) {
        Ok(config) => config,
        Err(e) => log_fatal!("invalid configuration: {e:#}"),
    };
    log::info!("configuration: {:?}", config);

    log::info!("opening controller on {}", config.serial_port);
    let link = match revend_serial::open(&config.serial_port, config.baud_rate) {
        Ok(link) => link,
        Err(e) => log_fatal!("cannot open {}: {e}", config.serial_port),
    };

    log::info!("opening camera {}", config.camera_device);
    let camera = match V4l2Camera::new(config.camera_config()) {
        Ok(camera) => camera,
        Err(e) => log_fatal!("cannot open camera: {e}"),
    };

    log::info!("loading detection model {}", config.model_path);
    let detector = match OnnxDetector::new(&config.model_path) {
        Ok(detector) => detector,
        Err(e) => log_fatal!("cannot load model: {e}"),
    };

    let voucher = match HttpVoucherClient::new(config.voucher_endpoint.as_str(), config.voucher_timeout()) {
        Ok(client) => client,
        Err(e) => log_fatal!("cannot build voucher client: {e}"),
    };
    log::info!("voucher endpoint {}", voucher.endpoint());

    let worker = Worker::new(&config, link, camera, detector, voucher);

    let mut status = worker.subscribe_status();
    tokio::spawn(async move {
        while status.changed().await.is_ok() {
            let current = *status.borrow_and_update();
            log::info!("status: {:?}, bottles: {}", current.state, current.count);
        }
    });

    let cancel = CancellationToken::new();
    let outcome = tokio::select! {
        result = worker.run(cancel.clone()) => result,
        _ = tokio::signal::ctrl_c() => {
            log::info!("interrupted, shutting down");
            cancel.cancel();
            Ok(())
        }
    };

    if let Err(e) = outcome {
        log_fatal!("{e}");
    }
    Ok(())
}
