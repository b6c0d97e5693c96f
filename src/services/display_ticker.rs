//! Ticker de pantalla
//!
//! Publica un tick periódico en el canal en vivo para que los clientes
//! refresquen las etiquetas relativas ("3 minute(s) ago"). No toca el
//! registro de despacho.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;

use crate::services::live_channel::LiveChannel;
use crate::utils::clock::Clock;

pub struct DisplayTicker {
    period: Duration,
    channel: LiveChannel,
    clock: Arc<dyn Clock>,
}

impl DisplayTicker {
    pub fn new(period: Duration, channel: LiveChannel, clock: Arc<dyn Clock>) -> Self {
        Self { period, channel, clock }
    }

    /// Lanzar el ticker hasta que `shutdown` pase a true
    pub fn spawn(self, mut shutdown: watch::Receiver<bool>) -> JoinHandle<()> {
        tokio::spawn(async move {
            let mut interval = tokio::time::interval(self.period);
            interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
            // el primer tick de tokio es inmediato
            interval.tick().await;

            tracing::info!(period_secs = self.period.as_secs_f64(), "⏱️ Display ticker started");
            loop {
                tokio::select! {
                    _ = interval.tick() => {
                        self.channel.tick(self.clock.now());
                    }
                    changed = shutdown.changed() => {
                        if changed.is_err() || *shutdown.borrow() {
                            break;
                        }
                    }
                }
            }
            tracing::info!("⏱️ Display ticker stopped");
        })
    }
}
