use actix_web::{HttpResponse, Responder, get, post, web};
use log::{info, warn};

use super::models::{
    AppState, AppendRequest, AppendResponse, ChainResponse, DifficultyResponse,
    SetDifficultyRequest, ValidateResponse,
};

/// Get the full chain.
#[get("/chain/")]
pub async fn get_chain(state: web::Data<AppState>) -> impl Responder {
    let snapshot = state.snapshot();
    let resp = ChainResponse {
        length: snapshot.blocks.len(),
        difficulty: snapshot.difficulty,
        chain: &snapshot.blocks,
    };
    HttpResponse::Ok().json(resp)
}

/// Validate the whole chain with the configured policy.
#[get("/validate/")]
pub async fn validate_chain(state: web::Data<AppState>) -> impl Responder {
    let snapshot = state.snapshot();
    let failure = snapshot.validate().err();
    HttpResponse::Ok().json(ValidateResponse {
        valid: failure.is_none(),
        strict: snapshot.strict_validation,
        length: snapshot.blocks.len(),
        difficulty: snapshot.difficulty,
        failure,
    })
}

/// Mine and append a block.
///
/// Mining runs on the blocking pool under the chain lock, so appends are
/// strictly sequential. Readers see the new block once it is published.
#[post("/blocks/")]
pub async fn append_block(
    state: web::Data<AppState>,
    req: web::Json<AppendRequest>,
) -> impl Responder {
    let payload = req.into_inner().payload;

    let mined = web::block(move || {
        state.with_chain(|chain| {
            let difficulty = chain.difficulty();
            let block = chain.append(payload);
            AppendResponse {
                index: block.index,
                seal: block.seal.clone(),
                nonce: block.nonce,
                difficulty,
            }
        })
    })
    .await;

    match mined {
        Ok(resp) => {
            info!(
                "API - sealed block #{} (seal={}, nonce={})",
                resp.index, resp.seal, resp.nonce
            );
            HttpResponse::Ok().json(resp)
        }
        Err(e) => {
            warn!("API - mining task failed: {e}");
            HttpResponse::InternalServerError().body("mining task failed")
        }
    }
}

#[get("/difficulty/")]
pub async fn get_difficulty(state: web::Data<AppState>) -> impl Responder {
    HttpResponse::Ok().json(DifficultyResponse {
        difficulty: state.snapshot().difficulty,
    })
}

/// Change the difficulty for future blocks.
///
/// Takes the chain lock, so it waits behind an append in progress.
#[post("/difficulty/")]
pub async fn set_difficulty(
    state: web::Data<AppState>,
    req: web::Json<SetDifficultyRequest>,
) -> impl Responder {
    let requested = req.difficulty;

    let outcome = web::block(move || {
        state.with_chain(|chain| chain.set_difficulty(requested).map(|()| chain.difficulty()))
    })
    .await;

    match outcome {
        Ok(Ok(difficulty)) => {
            info!("API - difficulty set to {difficulty}");
            HttpResponse::Ok().json(DifficultyResponse { difficulty })
        }
        Ok(Err(e)) => {
            warn!("API - rejected difficulty {requested}: {e}");
            HttpResponse::BadRequest().body(e.to_string())
        }
        Err(e) => {
            warn!("API - difficulty task failed: {e}");
            HttpResponse::InternalServerError().body("difficulty task failed")
        }
    }
}
