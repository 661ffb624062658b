//! Migration CLI tool.
//!
//! Reads `DATABASE_URL` and accepts the usual `up`, `down`, `status`, `fresh`
//! subcommands. The CLI installs its own tracing subscriber.

use sea_orm_migration::prelude::*;

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    cli::run_cli(migration::Migrator).await;
}
