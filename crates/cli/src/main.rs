mod terminal;

use std::sync::Arc;

use assessment_domain::flow::{FlowPorts, QuestionnaireFlow};
use assessment_domain::ports::camera::CameraDevice;
use assessment_domain::ports::identity::StaticIdentity;
use assessment_domain::ports::store::KeyValueStore;
use assessment_domain::store::InMemoryStore;
use assessment_infra::camera::{DeviceCamera, NoCamera};
use assessment_infra::firebase::FirebaseStore;
use assessment_infra::seed::load_memory_store;
use assessment_infra::{config::AppConfig, logging::init_tracing};
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::info;

use crate::terminal::{Command, HELP, TerminalNavigator, TerminalNotifier, render};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = AppConfig::load()?;
    init_tracing(&config)?;

    let domain = std::env::args().nth(1);
    let navigator = Arc::new(TerminalNavigator::default());
    let ports = FlowPorts {
        store: build_store(&config).await?,
        camera: build_camera(&config),
        identity: Arc::new(StaticIdentity::new(config.user_id.clone())),
        notifier: Arc::new(TerminalNotifier),
        navigator: navigator.clone(),
    };

    let flow = QuestionnaireFlow::new(ports, domain);
    info!(attempt_id = flow.attempt_id(), "assessment starting");
    if flow.start().await.is_terminal() {
        return Ok(());
    }

    println!("{HELP}");
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while navigator.destination().is_none() {
        if let Some(view) = flow.view() {
            println!("{}", render(&view));
        }

        let line = tokio::select! {
            line = lines.next_line() => line?,
            _ = tokio::signal::ctrl_c() => None,
        };
        let Some(line) = line else {
            flow.leave();
            break;
        };

        let outcome = match Command::parse(&line) {
            Command::Previous => flow.go_to_previous(),
            Command::Next => flow.go_to_next(),
            Command::Answer(text) => flow.record_response(text),
            Command::Submit => flow.submit().await.map(|_| ()),
            Command::Quit => {
                flow.leave();
                break;
            }
        };
        if let Err(err) = outcome {
            tracing::debug!(error = %err, code = err.as_code(), "action rejected");
        }
    }

    info!(phase = ?flow.phase(), "assessment finished");
    Ok(())
}

async fn build_store(config: &AppConfig) -> anyhow::Result<Arc<dyn KeyValueStore>> {
    if config.uses_firebase() {
        return Ok(Arc::new(FirebaseStore::from_config(config)?));
    }
    match &config.seed_path {
        Some(path) => Ok(Arc::new(load_memory_store(path).await?)),
        None => {
            tracing::warn!("no seed_path configured, starting with an empty store");
            Ok(Arc::new(InMemoryStore::new()))
        }
    }
}

fn build_camera(config: &AppConfig) -> Arc<dyn CameraDevice> {
    let device = config.camera_device.trim();
    if device.is_empty() {
        Arc::new(NoCamera)
    } else {
        Arc::new(DeviceCamera::new(device))
    }
}
