// handlers/mod.rs - Two security tiers
//
// Public (no auth): account creation and token issue under /api/user/*
// Protected (token auth): profile, recipes and tags

pub mod protected;
pub mod public;
