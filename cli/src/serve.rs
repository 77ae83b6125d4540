#![deny(missing_docs)]

//! # Serve Command
//!
//! Hosts the generated document over HTTP. The document is built on the
//! first request and cached for every request after that.

use crate::error::CliResult;
use crate::generate::{prepare, SourceArgs};
use actix_web::http::header::ContentType;
use actix_web::{web, App, HttpResponse, HttpServer};
use oasgen_core::DocumentCache;
use std::net::TcpListener;
use std::sync::Arc;
use tracing::{error, info};

/// Arguments for the serve command.
#[derive(clap::Args, Debug, Clone)]
pub struct ServeArgs {
    #[clap(flatten)]
    pub source: SourceArgs,

    /// Address to listen on.
    #[clap(long, env = "OASGEN_BIND", default_value = "127.0.0.1:8080")]
    pub bind: String,

    /// Route serving the document.
    #[clap(long, default_value = "/swagger/v1/swagger.json")]
    pub route: String,
}

async fn document(cache: web::Data<DocumentCache>) -> HttpResponse {
    let cache = cache.into_inner();
    match web::block(move || cache.get()).await {
        Ok(Ok(text)) => HttpResponse::Ok()
            .content_type(ContentType::json())
            .body(text.to_string()),
        Ok(Err(e)) => {
            error!(error = %e, "Document generation failed");
            HttpResponse::InternalServerError().body(e.to_string())
        }
        Err(e) => {
            error!(error = %e, "Document generation was interrupted");
            HttpResponse::InternalServerError().finish()
        }
    }
}

fn build_server(
    listener: TcpListener,
    cache: Arc<DocumentCache>,
    route: String,
) -> std::io::Result<actix_web::dev::Server> {
    let data = web::Data::from(cache);
    Ok(HttpServer::new(move || {
        App::new()
            .app_data(data.clone())
            .route(&route, web::get().to(document))
    })
    .listen(listener)?
    .run())
}

/// Executes the serve command, blocking until the server stops.
pub fn execute(args: &ServeArgs) -> CliResult<()> {
    let (generator, snapshot) = prepare(&args.source)?;
    let cache = Arc::new(DocumentCache::from_generator(generator, snapshot));

    let listener = TcpListener::bind(&args.bind)?;
    info!(bind = %args.bind, route = %args.route, "Serving document");

    let route = args.route.clone();
    actix_rt::System::new().block_on(async move { build_server(listener, cache, route)?.await })?;
    Ok(())
}
