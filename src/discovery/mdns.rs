//! mDNS browsing for controllable devices

use std::collections::HashMap;
use std::time::{Duration, Instant};

use mdns_sd::{Receiver, ServiceDaemon, ServiceEvent, ServiceInfo};

use crate::device::{Brand, Device};
use crate::{Error, Result};

/// Service types TVs and streaming boxes advertise, with the brand implied
/// by the type itself when the TXT records say nothing better
pub const SERVICE_TYPES: &[(&str, Brand)] = &[
    ("_googlecast._tcp.local.", Brand::Other),
    ("_airplay._tcp.local.", Brand::Apple),
    ("_androidtvremote2._tcp.local.", Brand::Sony),
];

/// Pause between sweeps when no receiver had anything buffered
const POLL_INTERVAL: Duration = Duration::from_millis(50);

/// One browse receiver's worth of pending events
///
/// Every service type browses concurrently, so the collector must never
/// block on a single receiver; it sweeps all of them with non-blocking
/// reads instead.
trait EventSource {
    fn try_next(&self) -> Option<ServiceEvent>;
}

impl EventSource for Receiver<ServiceEvent> {
    fn try_next(&self) -> Option<ServiceEvent> {
        self.try_recv().ok()
    }
}

/// mDNS scanner for controllable devices
pub struct MdnsScanner {
    daemon: ServiceDaemon,
}

impl MdnsScanner {
    /// Create a scanner
    ///
    /// # Errors
    ///
    /// Returns error if the mDNS daemon cannot be created.
    pub fn new() -> Result<Self> {
        let daemon = ServiceDaemon::new()
            .map_err(|e| Error::Discovery(format!("failed to create mDNS daemon: {e}")))?;
        Ok(Self { daemon })
    }

    /// Browse for devices within a time window
    ///
    /// Returns every service that resolved during the window, deduplicated
    /// by address.
    ///
    /// # Errors
    ///
    /// Returns error if browsing cannot be started.
    pub async fn scan(&self, window: Duration) -> Result<Vec<Device>> {
        let mut sources: Vec<(Box<dyn EventSource + Send>, Brand)> =
            Vec::with_capacity(SERVICE_TYPES.len());
        for (service_type, implied_brand) in SERVICE_TYPES {
            let receiver = self
                .daemon
                .browse(service_type)
                .map_err(|e| Error::Discovery(format!("failed to browse {service_type}: {e}")))?;
            sources.push((Box::new(receiver), *implied_brand));
        }

        // The mdns-sd receivers are synchronous; collect off the runtime.
        let deadline = Instant::now() + window;
        let devices =
            tokio::task::spawn_blocking(move || collect_resolved(&sources, deadline))
                .await
                .map_err(|e| Error::Discovery(format!("scan task failed: {e}")))?;

        for (service_type, _) in SERVICE_TYPES {
            if let Err(e) = self.daemon.stop_browse(service_type) {
                tracing::trace!(service_type, error = %e, "stop_browse failed");
            }
        }

        tracing::info!(count = devices.len(), "mDNS scan complete");
        Ok(devices)
    }
}

impl Drop for MdnsScanner {
    fn drop(&mut self) {
        if let Err(e) = self.daemon.shutdown() {
            tracing::trace!(error = %e, "mDNS daemon shutdown error (expected on normal exit)");
        }
    }
}

/// Sweep every source round-robin until the deadline, draining whatever is
/// buffered on each pass
///
/// One full sweep always runs after the deadline so events that arrived
/// late in the window are still read from every receiver, not just the
/// first.
fn collect_resolved(
    sources: &[(Box<dyn EventSource + Send>, Brand)],
    deadline: Instant,
) -> Vec<Device> {
    let mut found: HashMap<String, Device> = HashMap::new();

    loop {
        let mut idle = true;
        for (source, implied_brand) in sources {
            while let Some(event) = source.try_next() {
                idle = false;
                if let ServiceEvent::ServiceResolved(info) = event
                    && let Some(device) = device_from(&info, *implied_brand)
                {
                    found.entry(device.addr.clone()).or_insert(device);
                }
            }
        }
        if Instant::now() >= deadline {
            break;
        }
        if idle {
            std::thread::sleep(POLL_INTERVAL);
        }
    }

    found.into_values().collect()
}

/// Map one resolved service to a device, if it carries an address
fn device_from(info: &ServiceInfo, implied_brand: Brand) -> Option<Device> {
    let addr = info.get_addresses().iter().next().map(ToString::to_string)?;

    let name = display_name(info.get_fullname());
    let model = info
        .get_property_val_str("md")
        .or_else(|| info.get_property_val_str("model"))
        .map(ToString::to_string);
    let hint = format!(
        "{} {} {}",
        name,
        model.as_deref().unwrap_or_default(),
        info.get_hostname()
    );
    let brand = match Brand::guess(&hint) {
        Brand::Other => implied_brand,
        guessed => guessed,
    };

    let mut device = Device::new(name, brand, addr);
    device.model = model;
    device.record_seen(true);
    Some(device)
}

/// Trim the service-type suffix off an mDNS fullname
fn display_name(fullname: &str) -> String {
    fullname
        .split_once("._")
        .map_or(fullname, |(instance, _)| instance)
        .to_string()
}
