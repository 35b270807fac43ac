//! Helpers for building response bodies.

use http_body_util::{BodyExt, Empty, Full};
use hyper::body::Bytes;

use crate::Body;

/// A body holding `bytes`.
pub fn full(bytes: Bytes) -> Body {
    Full::new(bytes).boxed()
}

/// A body with no content.
pub fn empty() -> Body {
    Empty::<Bytes>::new().boxed()
}
