#![allow(dead_code)]

use wasm_bindgen::prelude::*;

mod bindings;
pub mod dispatcher;
mod host;
mod intro;
mod player;
mod preload_gate;
mod progress;
mod quality;
mod seek;
mod session;
mod timers;
mod utils;

pub use utils::logger::{Logger, LoggerLevel};
