//! The transport seam.
//!
//! The core never performs I/O. A `Requester` executes an `HttpRequest` and
//! hands back the raw `HttpResponse`; status interpretation stays in the
//! core, so implementations must return 4xx/5xx responses as data rather than
//! as errors. Retries and connection pooling belong here.

use crate::error::Result;
use crate::http::{HttpRequest, HttpResponse};

pub trait Requester {
    fn request(&self, request: HttpRequest) -> Result<HttpResponse>;
}

impl<F> Requester for F
where
    F: Fn(HttpRequest) -> Result<HttpResponse>,
{
    fn request(&self, request: HttpRequest) -> Result<HttpResponse> {
        self(request)
    }
}
