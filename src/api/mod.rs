mod chain;
mod health;
pub mod models;
mod stats;

use actix_web::web::{self, ServiceConfig};

pub use models::{AppState, ChainSnapshot};

pub fn init_routes(cfg: &mut ServiceConfig) {
    cfg.service(
        web::scope("/api/v1")
            .service(health::health_check)
            .service(chain::get_chain)
            .service(chain::validate_chain)
            .service(chain::append_block)
            .service(chain::get_difficulty)
            .service(chain::set_difficulty)
            .service(stats::get_stats),
    );
}
