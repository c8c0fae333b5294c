// Pokedex - interactive shell
// Library exports

pub mod cli;
pub mod config;
