#![doc = include_str!("../README.md")]

pub mod builder;
pub mod cache;
pub mod config;
pub mod datalink;
pub mod models;
pub mod parser;
pub mod pending;
pub mod proxy;
pub mod resolver;
pub mod stack;
pub mod statistics;
pub mod timers;
pub mod utilities;

pub use cache::*;
pub use pending::*;
pub use resolver::*;
pub use stack::*;
pub use timers::*;
