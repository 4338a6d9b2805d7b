use vpa_memory_demo::{config::Config, lifecycle, logging};

// Jedno vlákno: sleep v hold fázi pozastaví veškerou práci
#[tokio::main(flavor = "current_thread")]
async fn main() {
    logging::init();

    let cfg = Config::from_env();
    tracing::debug!(?cfg, "resolved configuration");

    // běží, dokud proces někdo nezabije
    lifecycle::run(&cfg, None).await;
}
