// migration/src/main.rs
use migration::Migrator;
use sea_orm_migration::prelude::*;

#[async_std::main]
async fn main() {
    // up / down / status などのサブコマンドを提供
    cli::run_cli(Migrator).await;
}
