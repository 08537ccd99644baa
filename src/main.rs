use std::io;

use actix_web::{App, HttpServer, web};
use log::{error, info};

use pow_ledger::api::{self, AppState};
use pow_ledger::{Chain, ChainConfig, LedgerError, ServerConfig};

fn load_chain() -> io::Result<Chain> {
    ChainConfig::from_env()
        .and_then(Chain::new)
        .map_err(|e: LedgerError| {
            error!("{e}");
            io::Error::new(io::ErrorKind::InvalidInput, e)
        })
}

#[actix_web::main]
async fn main() -> io::Result<()> {
    let _ = dotenvy::dotenv();
    env_logger::init();

    let server = ServerConfig::from_env();
    let chain = load_chain()?;

    info!(
        "⛓️ Starting ledger API at http://{}:{} (difficulty={})",
        server.host,
        server.port,
        chain.difficulty()
    );

    let state = web::Data::new(AppState::new(chain));

    HttpServer::new(move || {
        App::new()
            .app_data(state.clone())
            .configure(api::init_routes)
    })
    .bind((server.host.as_str(), server.port))?
    .run()
    .await
}
