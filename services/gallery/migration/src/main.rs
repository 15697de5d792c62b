use sea_orm_migration::prelude::*;

#[tokio::main]
async fn main() {
    cli::run_cli(utsave_gallery_migration::Migrator).await;
}
