use env_logger::Env;

mod adapters;
mod cli;
mod config;
mod gateways;

fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(Env::default().default_filter_or("info")).init();
    cli::run()
}
