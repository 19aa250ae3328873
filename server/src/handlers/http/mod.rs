use std::convert::Infallible;

use bytes::Bytes;
use http_body_util::combinators::BoxBody;
use hyper::{Request, Response};

pub mod admin;
pub mod auth;
pub mod routes;
pub mod utils;

/// Body type of every response the gateway produces.
pub type HttpBody = BoxBody<Bytes, Infallible>;

pub type HttpResponse = Response<HttpBody>;

/// A request whose body has already been collected (and size-limited) by
/// the router.
pub type ApiRequest = Request<Bytes>;
