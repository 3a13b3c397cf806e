use crate::{
    api::{attendance, worker},
    config::Config,
};
use actix_governor::{
    Governor, GovernorConfigBuilder, PeerIpKeyExtractor, governor::middleware::NoOpMiddleware,
};
use actix_web::web;
use std::sync::Arc;

/// Milliseconds between replenished requests for a per-minute budget.
fn replenish_ms(requests_per_min: u32) -> u64 {
    if requests_per_min == 0 {
        1
    } else {
        (60_000 / requests_per_min as u64).max(1)
    }
}

// Helper to build per-route limiter
fn build_limiter(requests_per_min: u32) -> Governor<PeerIpKeyExtractor, NoOpMiddleware> {
    let per_ms = replenish_ms(requests_per_min);
    let cfg = GovernorConfigBuilder::default()
        .per_millisecond(per_ms)
        .burst_size(requests_per_min.max(1))
        .key_extractor(PeerIpKeyExtractor)
        .finish()
        .expect("per_millisecond and burst_size are non-zero");
    Governor::new(&cfg)
}

pub fn configure(cfg: &mut web::ServiceConfig, config: Config) {
    let punch_limiter = Arc::new(build_limiter(config.rate_punch_per_min));
    let read_limiter = Arc::new(build_limiter(config.rate_read_per_min));

    cfg.service(
        web::scope(&config.api_prefix)
            .service(
                web::scope("/attendance")
                    // /attendance
                    .service(
                        web::resource("")
                            .wrap(punch_limiter)
                            .route(web::post().to(attendance::submit_punch)),
                    )
                    .service(
                        web::scope("/{subdomain}")
                            .wrap(read_limiter.clone())
                            // /attendance/{subdomain}
                            .service(
                                web::resource("").route(web::get().to(attendance::list_attendance)),
                            )
                            // /attendance/{subdomain}/report
                            .service(
                                web::resource("/report")
                                    .route(web::get().to(attendance::attendance_report)),
                            )
                            // /attendance/{subdomain}/export
                            .service(
                                web::resource("/export")
                                    .route(web::get().to(attendance::export_attendance)),
                            )
                            // /attendance/{subdomain}/rfids
                            .service(
                                web::resource("/rfids").route(web::get().to(attendance::list_rfids)),
                            )
                            // /attendance/{subdomain}/next
                            .service(
                                web::resource("/next")
                                    .route(web::get().to(attendance::next_punch_action)),
                            ),
                    ),
            )
            .service(
                web::scope("/workers/{subdomain}")
                    .wrap(read_limiter)
                    // /workers/{subdomain}
                    .service(web::resource("").route(web::get().to(worker::list_workers)))
                    // /workers/{subdomain}/{id}
                    .service(web::resource("/{id}").route(web::get().to(worker::get_worker))),
            ),
    );
}
