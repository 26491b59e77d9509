//! Listing creation handler.
//!
//! ```text
//! POST /api/listings {"name":"drill","category":"tools","description":"...",
//!                     "rentPrice":25,"imageUrl":"/img/drill.jpg"}
//! ```
//!
//! Listing creation arrives over HTTP (it accompanies an image upload in the
//! original flow); the resulting catalog refresh still goes out over the
//! WebSocket channel like every other mutation.

use actix_web::{post, web, HttpResponse};
use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::domain::ports::ListingDraft;
use crate::inbound::http::session::SessionContext;
use crate::inbound::http::state::HttpState;
use crate::inbound::http::ApiResult;

/// Request body for `POST /api/listings`.
#[derive(Debug, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateListingRequest {
    pub name: String,
    pub category: String,
    pub description: String,
    pub rent_price: i64,
    #[serde(default)]
    pub image_url: String,
}

#[post("/listings")]
pub async fn create_listing(
    state: web::Data<HttpState>,
    session: SessionContext,
    payload: web::Json<CreateListingRequest>,
) -> ApiResult<HttpResponse> {
    let caller = session.require_caller()?;
    let payload = payload.into_inner();
    let (listing, mutation) = state
        .commands
        .create_listing(
            &caller,
            ListingDraft {
                name: payload.name,
                category: payload.category,
                description: payload.description,
                rent_price: payload.rent_price,
                image_url: payload.image_url,
            },
        )
        .await?;
    state.broadcaster.publish(&mutation).await;
    Ok(HttpResponse::Created().json(json!({
        "listingId": listing.id,
        "itemId": listing.item,
        "status": listing.status,
    })))
}
