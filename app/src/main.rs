mod config;
mod demo;

use std::path::PathBuf;
use std::time::{Duration, Instant};

use anyhow::{Context, bail};
use log::{debug, error, info, warn};
use signalflow::runtime::NodeSnapshot;
use signalflow::{Engine, Host, HostMessage, NodeTypeRegistry};
use tokio::sync::broadcast::error::RecvError;

const USAGE: &str = "usage: signalflow_host [--config <runtime.toml>] [--seconds <n>]";
const DEFAULT_SECONDS: u64 = 10;

struct Args {
    config: Option<PathBuf>,
    seconds: u64,
}

fn parse_args(mut args: impl Iterator<Item = String>) -> anyhow::Result<Args> {
    let mut parsed = Args {
        config: None,
        seconds: DEFAULT_SECONDS,
    };
    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--config" => {
                let path = args.next().context("--config needs a path")?;
                parsed.config = Some(PathBuf::from(path));
            }
            "--seconds" => {
                let value = args.next().context("--seconds needs a value")?;
                parsed.seconds = value
                    .parse()
                    .with_context(|| format!("invalid --seconds value '{}'", value))?;
            }
            other => bail!("unexpected argument '{}'\n{}", other, USAGE),
        }
    }
    Ok(parsed)
}

/// `name = value` of a node's first display field.
fn describe(node: &NodeSnapshot) -> String {
    let value = node.fields.first().and_then(|(_, v)| v.as_ref());
    format!("{} = {:?}", node.name, value)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let args = parse_args(std::env::args().skip(1))?;
    let config = config::load_config(args.config.as_deref());

    let registry = NodeTypeRegistry::with_builtin_types();
    let mut engine = Engine::new();
    let demo = demo::build(&mut engine, &registry)?;
    engine.propagate_current_state();
    engine.start();
    info!(
        "Demo graph ready: {} nodes, watching {:?}",
        engine.graph().len(),
        demo.displays
    );

    let mut host = Host::new(engine, config);
    let mut messages = host.subscribe();
    host.spawn();

    let deadline = tokio::time::sleep(Duration::from_secs(args.seconds));
    let interrupted = tokio::signal::ctrl_c();
    tokio::pin!(deadline, interrupted);
    let mut last_report = Instant::now();

    loop {
        tokio::select! {
            _ = &mut deadline => break,
            _ = &mut interrupted => {
                info!("Interrupted");
                break;
            }
            message = messages.recv() => match message {
                Ok(HostMessage::Fault(fault)) => {
                    error!(
                        "Node '{}' ({}) failed: {}",
                        fault.node_name, fault.node_id, fault.message
                    );
                }
                Ok(message @ HostMessage::State(_)) => {
                    debug!("{}", message.to_json()?);
                    if last_report.elapsed() >= Duration::from_secs(1) {
                        last_report = Instant::now();
                        if let HostMessage::State(snapshot) = &message {
                            let shown: Vec<String> = demo
                                .displays
                                .iter()
                                .filter_map(|id| snapshot.node(*id))
                                .map(describe)
                                .collect();
                            info!(
                                "step {} at {:.1} Hz: {}",
                                snapshot.status.step,
                                snapshot.status.actual_hz,
                                shown.join(", ")
                            );
                        }
                    }
                }
                Err(RecvError::Lagged(skipped)) => warn!("Skipped {} snapshots", skipped),
                Err(RecvError::Closed) => break,
            }
        }
    }

    host.shutdown().await?;
    Ok(())
}
