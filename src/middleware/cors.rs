//! Middleware de CORS
//!
//! O painel é servido pela própria aplicação, mas os endpoints JSON podem
//! ser consumidos por outras origens em desenvolvimento.

use tower_http::cors::CorsLayer;

/// CORS permissivo, adequado para desenvolvimento
pub fn cors_middleware() -> CorsLayer {
    CorsLayer::very_permissive()
}
