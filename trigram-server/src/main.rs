use std::fmt::Display;
use std::io;

use actix_cors::Cors;
use actix_web::http::StatusCode;
use actix_web::http::header::{self, ContentType};
use actix_web::{App, HttpRequest, HttpResponse, HttpServer, middleware, web};
use clap::Parser;
use log::{debug, error, info};
use serde::Deserialize;

use trigram_core::{SentenceLength, Store, TrigramError};

/// Maximum number of sentences returned by a single `/generate` call.
const MAX_COUNT: usize = 100;

/// Command line parameters of the server.
#[derive(Parser, Debug)]
#[command(version, about = "Learn trigrams from text and generate sentences over HTTP")]
struct Params {
	/// Serving address
	#[arg(long, default_value = "127.0.0.1:8080")]
	addr: String,

	/// Number of HTTP workers (defaults to one per CPU)
	#[arg(long)]
	workers: Option<usize>,

	/// Accept cross-origin requests from any origin
	#[arg(long)]
	allow_cors: bool,

	/// Maximum accepted `/learn` body size, in bytes
	#[arg(long, default_value_t = 16 * 1024 * 1024)]
	max_body: usize,

	/// Average sentence length, in trigrams
	#[arg(long, default_value_t = SentenceLength::DEFAULT_MEAN)]
	mean_length: f64,

	/// Standard deviation of the sentence length, in trigrams
	#[arg(long, default_value_t = SentenceLength::DEFAULT_STD_DEV)]
	std_dev_length: f64,
}

/// Query parameters of the `/generate` endpoint.
#[derive(Deserialize)]
struct GenerateParams {
	count: Option<usize>,
}

/// HTTP POST endpoint `/learn`
///
/// Learns the plain text body. Any other content type is refused with
/// `406 Not Acceptable`.
async fn learn(store: web::Data<Store>, req: HttpRequest, body: web::Bytes) -> HttpResponse {
	let plain_text = req
		.headers()
		.get(header::CONTENT_TYPE)
		.and_then(|value| value.to_str().ok())
		.is_some_and(|value| value.starts_with("text/plain"));
	if !plain_text {
		return status_response(StatusCode::NOT_ACCEPTABLE);
	}

	// the whole body is tokenized and inserted, keep it off the async workers
	match web::block(move || store.learn(body.as_ref())).await {
		Ok(Ok(inserted)) => {
			debug!("learned {inserted} trigrams");
			HttpResponse::Ok().finish()
		}
		Ok(Err(e)) => error_response(StatusCode::INTERNAL_SERVER_ERROR, &e),
		Err(e) => error_response(StatusCode::INTERNAL_SERVER_ERROR, &e),
	}
}

/// HTTP GET endpoint `/generate`
///
/// Returns `count` (default 1) generated sentences, one per line.
/// Answers `404 Not Found` while the model is too small to produce a trigram.
async fn generate(store: web::Data<Store>, query: web::Query<GenerateParams>) -> HttpResponse {
	let count = query.count.unwrap_or(1);
	if !(1..=MAX_COUNT).contains(&count) {
		return HttpResponse::BadRequest().body(format!("count must be between 1 and {MAX_COUNT}\n"));
	}

	let mut sentences = String::new();
	for _ in 0..count {
		match store.generate() {
			Ok(sentence) => {
				sentences.push_str(&sentence);
				sentences.push('\n');
			}
			Err(e @ TrigramError::TooShort) => return error_response(StatusCode::NOT_FOUND, &e),
			Err(e) => return error_response(StatusCode::INTERNAL_SERVER_ERROR, &e),
		}
	}

	HttpResponse::Ok().content_type(ContentType::plaintext()).body(sentences)
}

/// HTTP GET endpoint `/stats`
///
/// Returns the size of the trigram tree as JSON.
async fn stats(store: web::Data<Store>) -> HttpResponse {
	match store.stats() {
		Ok(stats) => HttpResponse::Ok().json(stats),
		Err(e) => error_response(StatusCode::INTERNAL_SERVER_ERROR, &e),
	}
}

async fn method_not_allowed() -> HttpResponse {
	status_response(StatusCode::METHOD_NOT_ALLOWED)
}

/// `"<code> <reason>\n"` body.
fn status_response(status: StatusCode) -> HttpResponse {
	HttpResponse::build(status)
		.content_type(ContentType::plaintext())
		.body(format!("{} {}\n", status.as_u16(), status.canonical_reason().unwrap_or_default()))
}

/// `"<code> <reason>\n<error>\n"` body.
fn error_response(status: StatusCode, err: &dyn Display) -> HttpResponse {
	if status.is_server_error() {
		error!("{err}");
	}

	HttpResponse::build(status).content_type(ContentType::plaintext()).body(format!(
		"{} {}\n{err}\n",
		status.as_u16(),
		status.canonical_reason().unwrap_or_default()
	))
}

fn routes(cfg: &mut web::ServiceConfig) {
	cfg.service(
		web::resource("/learn")
			.route(web::post().to(learn))
			.default_service(web::route().to(method_not_allowed)),
	)
	.service(
		web::resource("/generate")
			.route(web::get().to(generate))
			.default_service(web::route().to(method_not_allowed)),
	)
	.service(
		web::resource("/stats")
			.route(web::get().to(stats))
			.default_service(web::route().to(method_not_allowed)),
	);
}

/// Main entry point for the server.
///
/// Builds an empty trigram store shared by every worker and serves it until
/// the process receives SIGINT or SIGTERM. The model lives in memory only.
#[actix_web::main]
async fn main() -> io::Result<()> {
	env_logger::init_from_env(env_logger::Env::default().default_filter_or("info"));
	let params = Params::parse();

	let sentence_length = SentenceLength::new(params.mean_length, params.std_dev_length)
		.map_err(|e| io::Error::new(io::ErrorKind::InvalidInput, e))?;
	let store = web::Data::new(Store::with_sentence_length(sentence_length));
	let allow_cors = params.allow_cors;
	let max_body = params.max_body;

	info!("Exposing HTTP server on {}", params.addr);

	let mut server = HttpServer::new(move || {
		App::new()
			.app_data(store.clone())
			.app_data(web::PayloadConfig::new(max_body))
			.wrap(middleware::Condition::new(allow_cors, Cors::permissive()))
			.wrap(middleware::Logger::default())
			.configure(routes)
	});
	if let Some(workers) = params.workers {
		server = server.workers(workers);
	}

	server.bind(params.addr.as_str())?.run().await
}
