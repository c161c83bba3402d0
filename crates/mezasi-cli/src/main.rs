//! `mezasi` binary entrypoint.

#[tokio::main(flavor = "current_thread")]
async fn main() {
    std::process::exit(mezasi_cli::run().await);
}
