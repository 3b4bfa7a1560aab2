//! This module holds the middleware definitions

pub(crate) use authentication_required::AuthenticationRequired;
pub(crate) use expose_server_error::expose_server_error;
pub(crate) use handle_not_found::handle_not_found;
pub(crate) use json_extractor_error::json_extractor_error;
pub(crate) use security_headers::security_headers;

mod authentication_required;
mod expose_server_error;
mod handle_not_found;
mod json_extractor_error;
mod security_headers;
