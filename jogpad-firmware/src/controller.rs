//! Pendant controller
//!
//! Owns the scanners, the transmitter, the display and the link, and runs
//! the cooperative main loop:
//!
//! ```text
//!   join AP ──▶ connect ──▶ ┌─ collect ─ transmit ─ display ─ drain ─ wait ─┐
//!                  ▲        └──────────────────────────────────────────────┘
//!                  │                        │ write failed
//!                  └──── leave pass-through ◀┘
//! ```

use defmt::*;
use embassy_rp::uart::BufferedUart;
use embassy_time::{with_timeout, Duration, Ticker, Timer};

use jogpad_core::config::{NetworkConfig, PendantConfig};
use jogpad_core::{
    Aggregator, DisplaySink, KeypadPort, SwitchPort, TransmitError, Transmission, Transmitter,
};
use jogpad_drivers::link::EspAtLink;
use jogpad_hal::EncoderCount;

/// Delay between access point join attempts
const JOIN_RETRY: Duration = Duration::from_millis(500);

/// Upper bound for one AT exchange; joining can take several seconds
const JOIN_TIMEOUT: Duration = Duration::from_secs(20);
const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

/// Silence the modem needs around `+++`
const ESCAPE_GUARD: Duration = Duration::from_secs(1);

/// Inbound bytes are drained until the link has been quiet this long
const DRAIN_QUIET: Duration = Duration::from_millis(1);

pub type Link = EspAtLink<BufferedUart>;

/// Everything the main loop drives
pub struct Pendant<'a, K, S, E, D, const ROWS: usize, const COLS: usize> {
    aggregator: Aggregator<'a, K, S, E, ROWS, COLS>,
    transmitter: Transmitter,
    display: D,
    link: Link,
    network: NetworkConfig,
    poll_interval: Duration,
}

impl<'a, K, S, E, D, const ROWS: usize, const COLS: usize> Pendant<'a, K, S, E, D, ROWS, COLS>
where
    K: KeypadPort,
    S: SwitchPort,
    E: EncoderCount,
    D: DisplaySink,
{
    pub fn new(
        aggregator: Aggregator<'a, K, S, E, ROWS, COLS>,
        display: D,
        link: Link,
        config: &PendantConfig,
    ) -> Self {
        Self {
            aggregator,
            transmitter: Transmitter::new(),
            display,
            link,
            network: config.network.clone(),
            poll_interval: Duration::from_millis(u64::from(config.scan.poll_interval_ms.max(1))),
        }
    }

    /// Run forever
    pub async fn run(&mut self) -> ! {
        self.join_network().await;

        loop {
            self.connect().await;

            // The controller may have lost earlier frames; resend everything
            self.transmitter.reset();
            self.aggregator.switches_mut().request_refresh();

            self.stream().await;

            if let Err(e) = self.link.close().await {
                warn!("Failed to leave pass-through: {}", e);
            }
            Timer::after(ESCAPE_GUARD).await;
        }
    }

    /// Join the configured access point, retrying until it works
    async fn join_network(&mut self) {
        info!("Joining '{}'", self.network.ssid.as_str());

        loop {
            let attempt = with_timeout(
                JOIN_TIMEOUT,
                self.link.join(&self.network.ssid, &self.network.password),
            )
            .await;

            match attempt {
                Ok(Ok(true)) => {
                    info!("Network joined");
                    return;
                }
                Ok(Ok(false)) => debug!("Join refused, retrying"),
                Ok(Err(e)) => warn!("Join failed: {}", e),
                Err(_) => warn!("Join timed out"),
            }
            Timer::after(JOIN_RETRY).await;
        }
    }

    /// Connect to the controller, retrying until it works
    async fn connect(&mut self) {
        let retry = Duration::from_millis(u64::from(self.network.retry_ms));

        loop {
            info!(
                "Connecting to {}:{}",
                self.network.host.as_str(),
                self.network.port
            );

            let attempt = with_timeout(
                CONNECT_TIMEOUT,
                self.link.connect(&self.network.host, self.network.port),
            )
            .await;

            match attempt {
                Ok(Ok(true)) => {
                    info!("Connected");
                    return;
                }
                Ok(Ok(false)) => warn!("Connection refused"),
                Ok(Err(e)) => warn!("Connection failed: {}", e),
                Err(_) => warn!("Connection attempt timed out"),
            }
            Timer::after(retry).await;
        }
    }

    /// Scan and send until the link fails
    async fn stream(&mut self) {
        let mut ticker = Ticker::every(self.poll_interval);

        loop {
            let cycle = self.aggregator.collect();
            trace!("cycle: keypad {} switches {}", cycle.keypad, cycle.switches);

            match self
                .transmitter
                .transmit_async(&cycle.state, &mut self.link)
                .await
            {
                Ok(Transmission::Sent(_)) | Ok(Transmission::Skipped) => {}
                Err(TransmitError::Io(e)) => {
                    warn!("Link write failed: {}", e);
                    return;
                }
                Err(TransmitError::Encode(e)) => {
                    error!("Failed to frame control state: {}", e);
                }
            }

            self.display.show(&cycle.state);
            self.drain().await;

            ticker.next().await;
        }
    }

    /// Discard whatever the controller sent us
    async fn drain(&mut self) {
        let mut discarded = 0;
        while let Ok(Ok(n)) = with_timeout(DRAIN_QUIET, self.link.drain()).await {
            if n == 0 {
                break;
            }
            discarded += n;
        }
        if discarded > 0 {
            trace!("Drained {} inbound bytes", discarded);
        }
    }
}
