use wakeboard::api::{WakeRequest, WakeResponse};
use wakeboard::wol;

use clap::Parser;
use lazy_static::lazy_static;
use log::{info, warn};
use prometheus::register_int_counter_vec;
use rouille::{router, Request, Response};
use std::time::Duration;

lazy_static! {
    static ref WAKE_PACKETS: prometheus::IntCounterVec = register_int_counter_vec!(
        "wakeboard_wake_requests_total",
        "Wake requests handled, by outcome.",
        &["outcome"]
    )
    .unwrap();
}

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Address to listen on
    #[arg(long, default_value = "0.0.0.0:8080")]
    http_addr: String,

    /// Broadcast address used when a wake request does not name one.
    #[arg(long, env = "WOL_BROADCAST", default_value = "255.255.255.255")]
    broadcast_addr: String,
}

fn wake_handler(request: &Request, default_broadcast: &str) -> Response {
    let body: WakeRequest = match rouille::input::json_input(request) {
        Ok(body) => body,
        Err(err) => {
            WAKE_PACKETS.with_label_values(&["bad_request"]).inc();
            return Response::text(format!("bad request: {}", err)).with_status_code(400);
        }
    };

    let broadcast = body.broadcast.as_deref().unwrap_or(default_broadcast);
    wake_response(wol::wake(&body.mac, Some(broadcast), body.port))
}

fn wake_response(result: Result<wol::MacAddress, wol::WakeError>) -> Response {
    match result {
        Ok(mac) => {
            info!("magic packet sent for {}", mac);
            WAKE_PACKETS.with_label_values(&["sent"]).inc();
            Response::json(&WakeResponse {
                ok: true,
                mac: mac.to_string(),
            })
        }
        Err(err @ wol::WakeError::MalformedMac(_)) => {
            WAKE_PACKETS.with_label_values(&["bad_request"]).inc();
            Response::text(err.to_string()).with_status_code(400)
        }
        Err(err) => {
            warn!("wake failed: {}", err);
            WAKE_PACKETS.with_label_values(&["error"]).inc();
            Response::text(err.to_string()).with_status_code(500)
        }
    }
}

fn varz() -> Response {
    let metrics = prometheus::gather();
    let encoder = prometheus::TextEncoder::new();
    match encoder.encode_to_string(&metrics) {
        Ok(text) => Response::text(text),
        Err(err) => Response::text(err.to_string()).with_status_code(500),
    }
}

fn log_ok(req: &Request, resp: &Response, elapsed: Duration) {
    info!(
        "{} {} {} in {:?}",
        req.method(),
        req.raw_url(),
        resp.status_code,
        elapsed
    );
}

fn log_panic(req: &Request, elapsed: Duration) {
    warn!("{} {} panicked after {:?}", req.method(), req.raw_url(), elapsed);
}

fn main() {
    let args = Args::parse();

    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("INFO"))
        .format_timestamp(Some(env_logger::fmt::TimestampPrecision::Millis))
        .init();

    let default_broadcast = args.broadcast_addr;
    info!("Starting server on {}...", args.http_addr);
    rouille::start_server(args.http_addr, move |request| {
        rouille::log_custom(request, log_ok, log_panic, || {
            // The router macro can't express a dot in a path segment.
            if request.method() == "GET" && request.url() == "/app.js" {
                return Response::from_data("application/javascript", include_str!("../app.js"));
            }
            router!(request,
                (GET) (/) => {
                    Response::html(include_str!("../index.html"))
                },
                (GET) (/api/version) => {
                    Response::text(env!("CARGO_PKG_VERSION"))
                },
                (POST) (/api/wake) => {
                    wake_handler(request, &default_broadcast)
                },
                (GET) (/varz) => {
                    varz()
                },
                _ => Response::empty_404()
            )
        })
    });
}
