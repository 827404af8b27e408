//! Movie Store Server - HTTP REST API over a movie document store
//!
//! The handlers are a thin mapping layer: each one shapes a request into a
//! single store call and classifies the outcome into a status code.
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use server::ServerConfig;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = ServerConfig::load()?;
//!     server::start_server(config).await?;
//!     Ok(())
//! }
//! ```
//!
//! # API Endpoints
//!
//! - `POST /createMovie` - Create a movie (`201 {"status":"true"}`)
//! - `GET /getMovies` - List all movies
//! - `GET /getMovie/{id}` - Get a movie by id
//! - `DELETE /delete/{id}` - Delete a movie, returning it
//! - `PUT /update/{id}` - Partially update a movie, returning the new state
//!
//! # Status codes
//!
//! | Outcome | Status |
//! |---|---|
//! | malformed or undecodable id, malformed JSON | 400 |
//! | no such movie, unknown route | 404 |
//! | known path, wrong method | 405 |
//! | title already taken | 409 |
//! | body over `max_body_size_mb` | 413 |
//! | required field missing or empty | 422 |
//! | any other store failure | 500 |

pub mod config;
pub mod error;
pub mod middleware;
pub mod routes;
pub mod server;
pub mod state;

pub use config::ServerConfig;
pub use error::{ServerError, ServerResult};
pub use server::{build_router, serve, start_server};
pub use state::ServerState;
