//! Schema migration runner.
//!
//! Reads `DATABASE_URL` and accepts the standard subcommands:
//!   migrator up | down | status | fresh | refresh | reset

use reimburse_db::migration::Migrator;
use sea_orm_migration::prelude::*;

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();
    cli::run_cli(Migrator).await;
}
