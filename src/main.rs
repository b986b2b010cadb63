//! TalentBase server binary.
//!
//! ## Run
//!
//! ```bash
//! cargo run
//! ```
//!
//! ## Endpoints
//!
//! - `GET /` — Welcome JSON
//! - `POST /api/auth/register` — Start a registration
//! - `POST /api/auth/verify` — Confirm a verification code
//! - `POST /api/auth/login` — Login
//! - `GET /api-docs` — Scalar OpenAPI UI

use talentbase::logging::init_logging;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    init_logging();

    let app = talentbase::App::new().await?;
    app.run().await?;

    Ok(())
}
