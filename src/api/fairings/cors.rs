use rocket::fairing::{Fairing, Info, Kind};
use rocket::http::{Header, Status};
use rocket::{Request, Response};

/// Allows every origin, method and header. The request origin is echoed
/// back so credentialed requests are accepted by browsers.
pub struct Cors;

#[rocket::async_trait]
impl Fairing for Cors {
    fn info(&self) -> Info {
        Info {
            name: "Cross-Origin Resource Sharing",
            kind: Kind::Response,
        }
    }

    async fn on_response<'r>(&self, req: &'r Request<'_>, res: &mut Response<'r>) {
        let headers = req.headers();
        let origin = headers.get_one("Origin").unwrap_or("*").to_string();
        let allow_headers = headers
            .get_one("Access-Control-Request-Headers")
            .unwrap_or("*")
            .to_string();

        res.set_header(Header::new("Access-Control-Allow-Origin", origin));
        res.set_header(Header::new(
            "Access-Control-Allow-Methods",
            "GET, POST, PUT, PATCH, DELETE, OPTIONS",
        ));
        res.set_header(Header::new("Access-Control-Allow-Headers", allow_headers));
        res.set_header(Header::new("Access-Control-Allow-Credentials", "true"));
        if req.headers().contains("Origin") {
            res.set_header(Header::new("Vary", "Origin"));
        }
    }
}

#[options("/<_..>")]
pub fn preflight() -> Status {
    Status::NoContent
}
