//! coursemart-daemon: serves revenue reports and rankings.
//!
//! Single OS process running a Tokio async runtime. Dashboards talk to the
//! daemon via JSON-RPC over a Unix socket.

mod commands;
mod config;
mod rpc;

use std::sync::Arc;

use coursemart_db::queries::settings;
use coursemart_revenue::attribution::{AttributionPercentage, INSTRUCTOR_PERCENTAGE_KEY};
use tracing::{error, info};

use crate::config::DaemonConfig;
use crate::rpc::RpcServer;

/// Daemon-wide shared state.
pub struct DaemonState {
    /// Database connection.
    pub db: Arc<tokio::sync::Mutex<rusqlite::Connection>>,
    /// Configuration.
    pub config: DaemonConfig,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // 1. Load config
    let config = DaemonConfig::load()?;

    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(format!("coursemart={}", config.advanced.log_level).parse()?),
        )
        .init();

    info!("CourseMart daemon starting");

    let data_dir = config.data_dir();
    std::fs::create_dir_all(&data_dir)?;

    // 2. Open database
    let db_path = data_dir.join("coursemart.db");
    let conn = coursemart_db::open(&db_path)?;
    seed_settings(&conn, &config)?;
    let db = Arc::new(tokio::sync::Mutex::new(conn));

    // 3. Build daemon state
    let socket_path = config.socket_path();
    let state = Arc::new(DaemonState { db, config });

    // 4. Run the RPC server until interrupted
    let rpc_server = RpcServer::new(state, socket_path.clone());
    info!("Starting JSON-RPC server on {:?}", socket_path);

    tokio::select! {
        result = rpc_server.run() => {
            if let Err(e) = result {
                error!("RPC server error: {}", e);
            }
        }
        _ = tokio::signal::ctrl_c() => {
            info!("Ctrl-C received, shutting down");
        }
    }

    // Clean up socket file
    let _ = std::fs::remove_file(&socket_path);

    info!("Daemon stopped");
    Ok(())
}

/// Write the configured instructor percentage on a fresh database.
fn seed_settings(conn: &rusqlite::Connection, config: &DaemonConfig) -> anyhow::Result<()> {
    let pct = AttributionPercentage::new(config.revenue.default_instructor_percentage);
    let written =
        settings::insert_if_absent(conn, INSTRUCTOR_PERCENTAGE_KEY, &pct.instructor().to_string())?;
    if written {
        info!(percentage = %pct, "initial instructor revenue percentage stored");
    }
    Ok(())
}

#[cfg(test)]
pub(crate) fn test_state() -> Arc<DaemonState> {
    let conn = coursemart_db::open_memory().expect("open db");
    Arc::new(DaemonState {
        db: Arc::new(tokio::sync::Mutex::new(conn)),
        config: DaemonConfig::default(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_seed_settings_keeps_existing_value() {
        let conn = coursemart_db::open_memory().expect("open db");
        let mut config = DaemonConfig::default();
        config.revenue.default_instructor_percentage = dec!(60);

        seed_settings(&conn, &config).expect("seed");
        assert_eq!(
            AttributionPercentage::load(&conn).expect("load").instructor(),
            dec!(60)
        );

        config.revenue.default_instructor_percentage = dec!(90);
        seed_settings(&conn, &config).expect("seed again");
        assert_eq!(
            AttributionPercentage::load(&conn).expect("load").instructor(),
            dec!(60)
        );
    }
}
