//! Headless sensor demo: runs the refresh loop around a reference point that
//! orbits a box scene, and logs each pass.
//!
//! Usage: cargo run --release -- [OPTIONS]
//!
//! Options:
//!   --config <PATH>      Sensor config JSON (default: built-in defaults)
//!   --scene <PATH>       Box scene JSON (default: built-in demo room)
//!   --passes <N>         Stop after N completed passes (default: 20)
//!   --radius <METERS>    Orbit radius of the reference point (default: 5.0)
//!   --debug              Serve the debug protocol on the default port
//!   --debug-port <PORT>  Serve the debug protocol on this port

use std::sync::Arc;
use std::time::Duration;

use glam::Vec3;

use volsense::core::time::TokioClock;
use volsense::scene::BoxScene;
use volsense::sensor::{FieldReader, RefreshTask, SensorConfig, SharedPosition, VolumeSampler};
use volsense_debug::{ConfigInfo, DebugCommand, DebugResponse, ResponseData, StatsInfo};

/// Height of the tracked point above the floor (top of the floor is y = 0)
const EYE_HEIGHT: f32 = 1.6;

/// Host frame period for the orbiting reference point
const FRAME: Duration = Duration::from_millis(16);

fn main() {
    volsense::core::logging::init();

    let args: Vec<String> = std::env::args().collect();
    let config_path = parse_str_arg(&args, "--config");
    let scene_path = parse_str_arg(&args, "--scene");
    let passes = parse_u64_arg(&args, "--passes").unwrap_or(20);
    let radius = parse_f32_arg(&args, "--radius").unwrap_or(5.0);
    let debug_port = parse_u16_arg(&args, "--debug-port")
        .or_else(|| args.iter().any(|a| a == "--debug").then_some(volsense_debug::DEFAULT_PORT));

    let rt = match tokio::runtime::Builder::new_multi_thread().enable_all().build() {
        Ok(rt) => rt,
        Err(e) => {
            log::error!("Failed to create tokio runtime: {}", e);
            std::process::exit(1);
        }
    };

    if let Err(e) = rt.block_on(run(config_path, scene_path, passes, radius, debug_port)) {
        log::error!("{}", e);
        std::process::exit(1);
    }
}

async fn run(
    config_path: Option<String>,
    scene_path: Option<String>,
    passes: u64,
    radius: f32,
    debug_port: Option<u16>,
) -> volsense::core::Result<()> {
    let config = match &config_path {
        Some(path) => SensorConfig::load(path).await?,
        None => SensorConfig::default(),
    };
    let scene = match &scene_path {
        Some(path) => BoxScene::load(path).await?,
        None => BoxScene::demo(),
    };

    let center = scene.bounds().map(|b| b.center()).unwrap_or(Vec3::ZERO);
    log::info!(
        "Scene: {} boxes, center {:?}; sensor: resolution {}, max_distance {}, interval {:?}",
        scene.boxes.len(),
        center,
        config.resolution,
        config.max_distance,
        config.refresh_interval()
    );

    // The host side: no position until the first frame
    let position = SharedPosition::new();
    let host = {
        let position = position.clone();
        tokio::spawn(async move {
            let mut angle = 0.0f32;
            loop {
                let offset = Vec3::new(angle.cos() * radius, EYE_HEIGHT, angle.sin() * radius);
                position.set(Vec3::new(center.x, 0.0, center.z) + offset);
                angle += 0.01;
                tokio::time::sleep(FRAME).await;
            }
        })
    };

    let sampler = VolumeSampler::new(config.clone(), scene, position)?;
    let handle = RefreshTask::spawn(sampler, TokioClock);
    let mut reader = handle.reader();

    let _server = match debug_port {
        Some(port) => {
            let handler = Arc::new(tokio::sync::Mutex::new(SensorDebugHandler {
                reader: reader.clone(),
                config: config.clone(),
                last_skipped: 0,
            }));
            Some(volsense_debug::DebugServer::start(handler, port).await?)
        }
        None => None,
    };

    loop {
        let state = reader.changed().await?;
        if let Some(field) = &state.field {
            if field.is_empty() {
                log::warn!("Sensor pass at {:?} found no reachable or spawn cells", field.origin());
            }
            let stats = field.stats();
            log::info!(
                "pass {:>3}: origin {:?} reachable {:>5} spawn {:>5} queries {:>6} ({:.2}ms, avg {:.2}ms)",
                state.passes,
                field.origin(),
                stats.reachable,
                stats.spawn_candidates,
                stats.los_queries,
                stats.duration.as_secs_f32() * 1000.0,
                state.timing.avg_ms
            );
        }
        if state.passes >= passes {
            break;
        }
    }

    host.abort();
    handle.stop().await?;
    Ok(())
}

/// Answers debug commands from the published sensor state
struct SensorDebugHandler {
    reader: FieldReader,
    config: SensorConfig,
    last_skipped: u64,
}

impl SensorDebugHandler {
    fn nodes(&self, spawn: bool, limit: Option<usize>) -> DebugResponse {
        let Some(field) = self.reader.latest() else {
            return DebugResponse::error("No sensor pass has completed yet");
        };
        let limit = limit.unwrap_or(usize::MAX);
        let (total, positions): (usize, Vec<[f32; 3]>) = if spawn {
            (
                field.spawn_candidates().len(),
                field.spawn_positions().take(limit).map(|p| p.to_array()).collect(),
            )
        } else {
            (
                field.reachable().len(),
                field.reachable_positions().take(limit).map(|p| p.to_array()).collect(),
            )
        };
        DebugResponse::ok(ResponseData::Nodes {
            origin: field.origin().to_array(),
            total,
            positions,
        })
    }
}

impl volsense_debug::DebugHandler for SensorDebugHandler {
    fn handle_command(&mut self, cmd: DebugCommand) -> DebugResponse {
        match cmd {
            DebugCommand::Ping => DebugResponse::pong(),

            DebugCommand::GetStats => {
                let state = self.reader.state();
                if state.skipped > self.last_skipped {
                    log::warn!(
                        "{} sensor passes skipped since last query",
                        state.skipped - self.last_skipped
                    );
                }
                self.last_skipped = state.skipped;

                let mut info = StatsInfo {
                    passes: state.passes,
                    skipped: state.skipped,
                    avg_pass_ms: state.timing.avg_ms,
                    min_pass_ms: state.timing.min_ms,
                    max_pass_ms: state.timing.max_ms,
                    ..Default::default()
                };
                if let Some(field) = &state.field {
                    let stats = field.stats();
                    info.has_field = true;
                    info.origin = field.origin().to_array();
                    info.reachable = stats.reachable;
                    info.spawn_candidates = stats.spawn_candidates;
                    info.los_queries = stats.los_queries;
                    info.last_pass_ms = stats.duration.as_secs_f32() * 1000.0;
                }
                DebugResponse::ok(ResponseData::Stats(info))
            }

            DebugCommand::GetSpawnNodes { limit } => self.nodes(true, limit),

            DebugCommand::GetReachableNodes { limit } => self.nodes(false, limit),

            DebugCommand::GetConfig => DebugResponse::ok(ResponseData::Config(ConfigInfo {
                resolution: self.config.resolution,
                max_distance: self.config.max_distance,
                min_spawn_dist: self.config.min_spawn_dist,
                dead_zone: self.config.dead_zone,
                refresh_delay: self.config.refresh_delay,
                refresh_interval_ms: self.config.refresh_interval().as_millis() as u64,
            })),
        }
    }
}

fn parse_f32_arg(args: &[String], flag: &str) -> Option<f32> {
    args.iter().position(|a| a == flag)
        .and_then(|i| args.get(i + 1))
        .and_then(|s| s.parse().ok())
}

fn parse_u64_arg(args: &[String], flag: &str) -> Option<u64> {
    args.iter().position(|a| a == flag)
        .and_then(|i| args.get(i + 1))
        .and_then(|s| s.parse().ok())
}

fn parse_u16_arg(args: &[String], flag: &str) -> Option<u16> {
    args.iter().position(|a| a == flag)
        .and_then(|i| args.get(i + 1))
        .and_then(|s| s.parse().ok())
}

fn parse_str_arg(args: &[String], flag: &str) -> Option<String> {
    args.iter().position(|a| a == flag)
        .and_then(|i| args.get(i + 1))
        .cloned()
}
