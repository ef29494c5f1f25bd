mod js_functions;
mod js_host;

pub use js_functions::*;
pub(crate) use js_host::JsHost;
