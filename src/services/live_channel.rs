//! Canal en vivo
//!
//! Las actualizaciones de riesgo viajan por un `watch` (solo importa la
//! última); notificaciones, ticks de pantalla y cambios de flota por un
//! `broadcast`. Cada conexión WebSocket crea su propia suscripción al abrir
//! y la suelta al cerrar; no hay un handle global.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::Serialize;
use tokio::sync::{broadcast, watch};

use crate::models::analysis::LiveUpdate;
use crate::models::notification::Notification;
use crate::models::vehicle::VehicleId;

/// Mensaje enviado a los clientes del panel
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum LiveMessage {
    Update { update: LiveUpdate },
    Notification { notification: Notification },
    Tick { at: DateTime<Utc> },
    FleetChanged { vehicle_ids: Vec<VehicleId> },
}

#[derive(Clone)]
pub struct LiveChannel {
    inner: Arc<LiveChannelInner>,
}

struct LiveChannelInner {
    updates: watch::Sender<Option<LiveUpdate>>,
    events: broadcast::Sender<LiveMessage>,
}

impl LiveChannel {
    pub fn new(capacity: usize) -> Self {
        let (updates, _) = watch::channel(None);
        let (events, _) = broadcast::channel(capacity.max(1));
        Self {
            inner: Arc::new(LiveChannelInner { updates, events }),
        }
    }

    pub fn publish_update(&self, update: LiveUpdate) {
        self.inner.updates.send_replace(Some(update));
    }

    pub fn latest(&self) -> Option<LiveUpdate> {
        self.inner.updates.borrow().clone()
    }

    pub fn notify(&self, notification: Notification) {
        self.broadcast(LiveMessage::Notification { notification });
    }

    pub fn tick(&self, at: DateTime<Utc>) {
        self.broadcast(LiveMessage::Tick { at });
    }

    pub fn fleet_changed(&self, vehicle_ids: Vec<VehicleId>) {
        if !vehicle_ids.is_empty() {
            self.broadcast(LiveMessage::FleetChanged { vehicle_ids });
        }
    }

    /// Número de suscripciones abiertas
    pub fn subscriber_count(&self) -> usize {
        self.inner.events.receiver_count()
    }

    pub fn subscribe(&self) -> LiveSubscription {
        LiveSubscription {
            updates: self.inner.updates.subscribe(),
            events: self.inner.events.subscribe(),
        }
    }

    fn broadcast(&self, message: LiveMessage) {
        // sin suscriptores el mensaje simplemente se pierde
        let _ = self.inner.events.send(message);
    }
}

/// Suscripción ligada a la vida de una conexión
pub struct LiveSubscription {
    updates: watch::Receiver<Option<LiveUpdate>>,
    events: broadcast::Receiver<LiveMessage>,
}

impl LiveSubscription {
    /// Última actualización conocida al momento de suscribirse
    pub fn current(&mut self) -> Option<LiveMessage> {
        self.updates
            .borrow_and_update()
            .clone()
            .map(|update| LiveMessage::Update { update })
    }

    /// Siguiente mensaje; None cuando el canal se cerró
    pub async fn next(&mut self) -> Option<LiveMessage> {
        loop {
            tokio::select! {
                changed = self.updates.changed() => {
                    if changed.is_err() {
                        return None;
                    }
                    if let Some(update) = self.updates.borrow_and_update().clone() {
                        return Some(LiveMessage::Update { update });
                    }
                }
                event = self.events.recv() => match event {
                    Ok(message) => return Some(message),
                    Err(broadcast::error::RecvError::Lagged(skipped)) => {
                        tracing::warn!(skipped, "Live subscriber lagged, events dropped");
                    }
                    Err(broadcast::error::RecvError::Closed) => return None,
                },
            }
        }
    }
}
