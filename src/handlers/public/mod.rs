// handlers/public/mod.rs - Public handlers (no authentication required)

pub mod user; // POST /api/user/create, POST /api/user/token
