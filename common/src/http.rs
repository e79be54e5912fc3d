use actix_web::{HttpResponse, Responder};
use serde::Serialize;

use super::error::Res;

pub struct Success;
impl Success {
    pub fn ok<T: Serialize>(body: T) -> Res<impl Responder> {
        Result::Ok(HttpResponse::Ok().json(body))
    }
}

pub struct Page;
impl Page {
    /// Wraps rendered markup into a `200 OK` html response.
    pub fn html(body: String) -> HttpResponse {
        HttpResponse::Ok()
            .content_type("text/html; charset=utf-8")
            .body(body)
    }

    /// `303 See Other` to a local route.
    pub fn see_other(location: &str) -> HttpResponse {
        HttpResponse::SeeOther()
            .append_header(("Location", location))
            .finish()
    }
}
