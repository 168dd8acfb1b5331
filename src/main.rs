use clap::Parser;

#[tokio::main]
async fn main() {
    mouse_layer::init_tracing();

    if let Err(e) = mouse_layer::run(mouse_layer::Cli::parse()).await {
        tracing::error!("{:#}", e);
        std::process::exit(1);
    }
}
