//! # Line demo
//!
//! Drives one line against an in-process fake modem:
//! - reads the properties (aggregate fetch)
//! - hides the caller ID through `SetProperty`
//! - answers a few control strings through a [`ControlTable`]
//!
//! ## Run
//! ```bash
//! RUST_LOG=debug cargo run --example line --features logging
//! ```

use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use callsettings::{
    CallSettings, CallSettingsDriver, CallingRestriction, Capabilities, ControlRequest,
    ControlTable, DriverError, LogWriter, OverrideMode, RestrictionStatus, ServiceStatus,
    Subscribe,
};
use tokio::sync::oneshot;

/// Fake modem keeping the override in memory.
struct FakeModem {
    mode: Mutex<OverrideMode>,
}

#[async_trait]
impl CallSettingsDriver for FakeModem {
    fn capabilities(&self) -> Capabilities {
        Capabilities::all()
    }

    async fn query_calling_presentation(&self) -> Result<ServiceStatus, DriverError> {
        tokio::time::sleep(Duration::from_millis(20)).await;
        Ok(ServiceStatus::Provisioned)
    }

    async fn query_called_presentation(&self) -> Result<ServiceStatus, DriverError> {
        Ok(ServiceStatus::NotProvisioned)
    }

    async fn query_called_restriction(&self) -> Result<ServiceStatus, DriverError> {
        Err(DriverError::modem("+CME ERROR: 4"))
    }

    async fn query_calling_restriction(&self) -> Result<CallingRestriction, DriverError> {
        let mode = *self.mode.lock().map_err(|_| DriverError::modem("poisoned"))?;
        Ok(CallingRestriction {
            mode,
            network: RestrictionStatus::TemporarilyAllowed,
        })
    }

    async fn set_override(&self, mode: OverrideMode) -> Result<(), DriverError> {
        *self.mode.lock().map_err(|_| DriverError::modem("poisoned"))? = mode;
        Ok(())
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let modem = Arc::new(FakeModem {
        mode: Mutex::new(OverrideMode::Default),
    });
    let subs: Vec<Arc<dyn Subscribe>> = vec![Arc::new(LogWriter::new())];
    let line = CallSettings::builder("/phonesim", modem)
        .with_subscribers(subs)
        .build();

    let table = ControlTable::new();
    line.activate(&table);

    println!("Properties:");
    for (name, value) in line.get_properties().await?.iter() {
        println!(" ├─► {name}: {value}");
    }

    line.set_property("HideCallerId", "enabled").await?;
    println!("HideCallerId set to enabled");

    for input in ["*#31#", "#31#", "*#76#", "#31#0123456", "*31*1#"] {
        let request = ControlRequest::parse(input)?;
        let (tx, rx) = oneshot::channel();
        if !table.route(&request, tx).is_handled() {
            println!("{input:<12} ─► not handled here");
            continue;
        }
        match rx.await? {
            Ok(reply) => println!("{input:<12} ─► {} ({}, {})", reply.property, reply.tag(), reply.value),
            Err(e) => println!("{input:<12} ─► {}", e.as_error_name()),
        }
    }

    // Give the subscriber worker a moment to flush before the listener stops.
    tokio::time::sleep(Duration::from_millis(50)).await;
    line.deactivate(&table);
    Ok(())
}
