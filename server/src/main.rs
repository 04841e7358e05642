use anyhow::Context;
use api::bridge::{AppState, HttpBridge};
use clap::Parser;
use generator::profile::build_route;
use log::{info, warn};
use std::fs;
use std::path::PathBuf;
use std::sync::Arc;
use store::TrackStore;
use tokio::runtime::Builder as TokioBuilder;
use tokio::signal;
use trackcore::interface::LocationPoint;
use workflow::config::ServerConfig;
use workflow::runner::Runner;

mod api;
mod generator;
mod store;
mod workflow;

#[derive(Parser)]
#[command(author, version, about = "GPS tracking backend and trajectory report driver")]
struct Args {
    /// Load server settings from YAML
    #[arg(long)]
    config: Option<PathBuf>,
    /// Listen address, e.g. 127.0.0.1:9000
    #[arg(long)]
    bind: Option<String>,
    /// Minimum spacing in metres between kept points
    #[arg(long)]
    min_distance: Option<f64>,
    /// Process a JSON array of {lat, lng, altitude, date} points and print a summary
    #[arg(long)]
    offline: Option<PathBuf>,
    /// Write the full offline report as JSON
    #[arg(long, requires = "offline")]
    report: Option<PathBuf>,
    /// Seed the store with a synthetic route and a closed session
    #[arg(long, default_value_t = false)]
    demo: bool,
    /// Serve the REST API until Ctrl+C
    #[arg(long, default_value_t = false)]
    serve: bool,
}

fn main() -> anyhow::Result<()> {
    env_logger::init();
    let args = Args::parse();

    let server_config = match args.config {
        Some(path) => ServerConfig::load(path)?,
        None => ServerConfig::default(),
    }
    .with_overrides(args.bind, args.min_distance);
    server_config
        .validate()
        .context("validating server config")?;

    let runner = Runner::new(server_config.to_track_config());
    let store = Arc::new(TrackStore::new());

    if let Some(path) = args.offline {
        let contents = fs::read_to_string(&path)
            .with_context(|| format!("reading points {}", path.display()))?;
        let points: Vec<LocationPoint> = serde_json::from_str(&contents)
            .with_context(|| format!("parsing points {}", path.display()))?;
        let report = runner.execute(points)?;

        println!(
            "Offline run -> points {} kept {}, distance {}, speed samples {}",
            report.raw_count,
            report.kept_count,
            report.distance.label,
            report.speeds.len()
        );
        if let Some(speed) = &report.speed {
            println!(
                "Speed km/h -> avg {:.1} min {:.1} max {:.1}",
                speed.mean_kmh, speed.min_kmh, speed.max_kmh
            );
        }
        if let Some(altitude) = &report.altitude {
            println!(
                "Altitude m -> min {:.1} max {:.1}",
                altitude.min_m, altitude.max_m
            );
        }

        if let Some(report_path) = args.report {
            if let Some(parent) = report_path.parent() {
                fs::create_dir_all(parent)?;
            }
            let json = serde_json::to_string_pretty(&report).context("serializing report")?;
            fs::write(&report_path, json)
                .with_context(|| format!("writing report {}", report_path.display()))?;
        }
    }

    if args.demo {
        let demo = &server_config.demo;
        let route = build_route(demo).context("building demo route")?;
        if let (Some(first), Some(last)) = (route.first(), route.last()) {
            let session = store.start_session(&demo.device_id, first.timestamp_utc)?;
            store.end_session(&demo.device_id, last.timestamp_utc)?;
            info!(
                "Demo device {} seeded with {} points, session {}",
                demo.device_id,
                route.len(),
                session.id
            );
        }
        store.insert_locations(&demo.device_id, route)?;
    }

    if args.serve {
        let address = server_config.bind_address()?;
        let bridge = HttpBridge::new(AppState::new(store, runner));
        let routes = bridge.routes();

        let runtime = TokioBuilder::new_multi_thread()
            .enable_all()
            .build()
            .context("creating HTTP runtime")?;
        runtime.block_on(async move {
            let (bound, server) = warp::serve(routes)
                .try_bind_with_graceful_shutdown(address, async {
                    if let Err(err) = signal::ctrl_c().await {
                        warn!("failed to listen for Ctrl+C: {}", err);
                    }
                })
                .with_context(|| format!("binding {}", address))?;
            bridge.publish_status(&format!("listening on http://{} (Ctrl+C to stop)", bound));
            server.await;
            bridge.publish_status("shut down");
            Ok::<(), anyhow::Error>(())
        })?;
    }

    Ok(())
}
