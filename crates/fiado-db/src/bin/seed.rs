//! Seeds a local database with demo catalog, customers, and payment
//! methods.
//!
//! ## Usage
//! ```text
//! cargo run -p fiado-db --bin seed             # seeds ./data/fiado.db
//! FIADO_DATABASE_PATH=/tmp/x.db cargo run -p fiado-db --bin seed
//! ```
//!
//! Safe to run once against an empty database; re-running fails on the
//! payment method UNIQUE constraint rather than duplicating rows.

use fiado_db::{Database, DbConfig, DbResult};
use tracing::info;

#[tokio::main]
async fn main() -> DbResult<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .init();

    let path = std::env::var("FIADO_DATABASE_PATH").unwrap_or_else(|_| "./data/fiado.db".into());
    let db = Database::new(DbConfig::new(&path)).await?;

    info!(path = %path, "Seeding demo data");

    // Payment methods mirror the store's counter reality: three upfront
    // methods and the credit book
    let methods = db.payment_methods();
    methods.create("Dinheiro", false).await?;
    methods.create("Cartão de Crédito", false).await?;
    methods.create("PIX", false).await?;
    methods.create("A Prazo", true).await?;

    let catalog = db.catalog();
    let alimentos = catalog.create_category("Alimentos").await?;
    let bebidas = catalog.create_category("Bebidas").await?;
    let limpeza = catalog.create_category("Limpeza").await?;

    catalog.create_product("Arroz 5kg", Some(&alimentos.id), 2590, 30).await?;
    catalog.create_product("Feijão 1kg", Some(&alimentos.id), 899, 40).await?;
    catalog.create_product("Café 500g", Some(&alimentos.id), 1250, 25).await?;
    catalog.create_product("Refrigerante 2L", Some(&bebidas.id), 799, 48).await?;
    catalog.create_product("Suco de Laranja 1L", Some(&bebidas.id), 650, 20).await?;
    catalog.create_product("Detergente", Some(&limpeza.id), 249, 60).await?;
    catalog.create_product("Sabão em Pó 1kg", Some(&limpeza.id), 1190, 35).await?;

    let customers = db.customers();
    customers.create("Maria Silva", Some("(11) 98765-4321"), None).await?;
    customers.create("João Pereira", Some("(11) 91234-5678"), Some("joao@example.com")).await?;
    customers.create("Ana Souza", None, None).await?;

    info!("Seed complete");
    Ok(())
}
