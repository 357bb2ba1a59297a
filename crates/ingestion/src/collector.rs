//! UdpCollector - receives flow records over UDP

use std::net::SocketAddr;
use std::sync::Arc;

use contracts::{CollectorConfig, FlowCallback};
use tokio::net::UdpSocket;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{debug, error, info, instrument, trace};

use crate::decode::decode_datagram;
use crate::error::{IngestionError, Result};
use crate::metrics::{CollectorMetrics, CollectorStats};

/// UDP listener delivering decoded flow records to a callback
pub struct UdpCollector {
    socket: UdpSocket,
    buffer_size: usize,
    metrics: Arc<CollectorMetrics>,
}

impl UdpCollector {
    /// Bind the listener socket
    ///
    /// # Errors
    /// Returns `IngestionError::Bind` when the address is unusable or taken.
    #[instrument(name = "collector_bind", skip(config), fields(addr = %config.listen_addr()))]
    pub async fn bind(config: &CollectorConfig) -> Result<Self> {
        let addr = config.listen_addr();
        let socket = UdpSocket::bind(&addr)
            .await
            .map_err(|source| IngestionError::Bind {
                addr: addr.clone(),
                source,
            })?;

        info!(
            addr = %addr,
            buffer_size = config.buffer_size,
            "UDP flow collector bound"
        );

        Ok(Self {
            socket,
            buffer_size: config.buffer_size.max(1),
            metrics: Arc::new(CollectorMetrics::new()),
        })
    }

    /// Address actually bound (resolves port 0)
    pub fn local_addr(&self) -> Result<SocketAddr> {
        self.socket.local_addr().map_err(IngestionError::LocalAddr)
    }

    /// Shared counters
    pub fn metrics(&self) -> Arc<CollectorMetrics> {
        Arc::clone(&self.metrics)
    }

    /// Receive until `shutdown` flips to `true` or its sender is dropped
    ///
    /// # Errors
    /// A socket receive error ends the loop with `IngestionError::Receive`.
    #[instrument(name = "collector_run", skip_all)]
    pub async fn run(
        self,
        on_flow: FlowCallback,
        mut shutdown: watch::Receiver<bool>,
    ) -> Result<CollectorStats> {
        let mut buf = vec![0u8; self.buffer_size];
        debug!("Collector loop started");

        while !*shutdown.borrow() {
            tokio::select! {
                changed = shutdown.changed() => {
                    if changed.is_err() {
                        break;
                    }
                }
                received = self.socket.recv_from(&mut buf) => {
                    match received {
                        Ok((len, peer)) => self.handle_datagram(&buf[..len], peer, &on_flow),
                        Err(e) => {
                            error!(error = %e, "Socket receive failed, stopping collector");
                            return Err(IngestionError::Receive(e));
                        }
                    }
                }
            }
        }

        let stats = self.metrics.snapshot();
        info!(
            datagrams = stats.datagrams_received,
            records = stats.records_decoded,
            decode_errors = stats.decode_errors,
            "Collector stopped"
        );
        Ok(stats)
    }

    /// Spawn the receive loop as a background task
    pub fn spawn(
        self,
        on_flow: FlowCallback,
        shutdown: watch::Receiver<bool>,
    ) -> JoinHandle<Result<CollectorStats>> {
        tokio::spawn(self.run(on_flow, shutdown))
    }

    fn handle_datagram(&self, payload: &[u8], peer: SocketAddr, on_flow: &FlowCallback) {
        let batch = decode_datagram(payload);
        let records = batch.records.len() as u64;

        trace!(
            peer = %peer,
            len = payload.len(),
            records,
            errors = batch.errors,
            "Datagram received"
        );

        for record in batch.records {
            on_flow(record);
        }

        self.metrics.record_datagram(records, batch.errors);
        observability::record_datagram_received(payload.len());
        observability::record_flows_decoded(records);
        observability::record_decode_errors(batch.errors);
    }
}
