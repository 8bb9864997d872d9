#[path = "../helpers/mod.rs"]
mod helpers;

mod effects;
mod groups;
