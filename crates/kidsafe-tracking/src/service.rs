//! [`TrackingService`]: the orchestration layer of the engine.
//!
//! All mutable engine state sits behind a single async mutex. A position
//! sample is fully processed (read model, history, membership, alerts) while
//! that lock is held, so ingestion for a subject is serial and alert appends
//! never interleave.
//!
//! Periodic feeds are tokio tasks. Each feed carries the generation number it
//! was started with and re-checks it under the lock before producing
//! anything; stopping a feed removes its entry under that same lock. Once
//! [`TrackingService::stop_sharing`] returns, no further sample from the
//! stopped feed can be ingested. Feeds hold only a weak reference to the
//! engine, and dropping the last service handle aborts them.

use std::{
  collections::HashMap,
  sync::{Arc, Weak},
  time::Duration,
};

use kidsafe_core::{
  alert::{AlertKind, AlertLog, AlertRecord, NewAlert},
  geo::Coordinate,
  membership::{MembershipTracker, TransitionKind},
  position::{LocationHistory, PositionSample},
  snapshot::EngineSnapshot,
  store::Repository,
  subject::SubjectDirectory,
  vitals::{BandReading, LowBatteryMonitor},
  zone::{NewZone, SafeZone, ZoneStore},
};
use tokio::{
  sync::{Mutex, broadcast},
  task::JoinHandle,
  time::{self, Instant, MissedTickBehavior},
};
use uuid::Uuid;

use crate::{
  Error, Result,
  band::{SimulatedBand, VitalsSource},
  config::TrackingConfig,
  source::{PositionSource, SimulatedWalk},
};

/// Capacity of the alert broadcast channel; slow subscribers skip ahead.
const ALERT_CHANNEL_CAPACITY: usize = 256;

// ─── Feeds ───────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
enum Channel {
  Location,
  Band,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct FeedKey {
  subject_id: String,
  channel:    Channel,
}

impl FeedKey {
  fn new(subject_id: &str, channel: Channel) -> Self {
    Self {
      subject_id: subject_id.to_owned(),
      channel,
    }
  }
}

struct Feed {
  generation: u64,
  task:       JoinHandle<()>,
}

enum FeedSource {
  Position(Box<dyn PositionSource>),
  Vitals(Box<dyn VitalsSource>),
}

// ─── State ───────────────────────────────────────────────────────────────────

struct EngineState {
  zones:           ZoneStore,
  membership:      MembershipTracker,
  alerts:          AlertLog,
  battery:         LowBatteryMonitor,
  locations:       HashMap<String, PositionSample>,
  histories:       HashMap<String, LocationHistory>,
  vitals:          HashMap<String, BandReading>,
  feeds:           HashMap<FeedKey, Feed>,
  next_generation: u64,
}

impl EngineState {
  fn feed_is_current(&self, key: &FeedKey, generation: u64) -> bool {
    self.feeds.get(key).is_some_and(|f| f.generation == generation)
  }

  fn stop_feed(&mut self, key: &FeedKey) -> bool {
    match self.feeds.remove(key) {
      Some(feed) => {
        feed.task.abort();
        true
      }
      None => false,
    }
  }
}

struct Shared {
  config:    TrackingConfig,
  directory: Arc<dyn SubjectDirectory>,
  state:     Mutex<EngineState>,
  events:    broadcast::Sender<AlertRecord>,
}

impl Shared {
  fn append(&self, state: &mut EngineState, draft: NewAlert) -> AlertRecord {
    let record = state.alerts.append(draft);
    tracing::info!(
      alert = %record.alert_id,
      kind = %record.kind,
      subject = %record.subject_id,
      "{}",
      record.message
    );
    // No subscribers is not an error.
    let _ = self.events.send(record.clone());
    record
  }

  fn ingest(&self, state: &mut EngineState, sample: PositionSample) -> Vec<AlertRecord> {
    if !sample.coordinate.is_finite() {
      tracing::warn!(
        subject = %sample.subject_id,
        at = %sample.coordinate,
        "dropping non-finite sample"
      );
      return Vec::new();
    }

    let subject_id = sample.subject_id.clone();
    let name = self.directory.name_or_id(&subject_id);
    tracing::debug!(subject = %subject_id, at = %sample.coordinate, "ingesting sample");

    state
      .histories
      .entry(subject_id.clone())
      .or_insert_with(|| LocationHistory::with_capacity(self.config.history_capacity))
      .push(sample.clone());

    let transitions = state.membership.evaluate(&sample, state.zones.list_zones());
    state.locations.insert(subject_id.clone(), sample);

    let mut raised = Vec::with_capacity(transitions.len());
    for t in transitions {
      let (kind, message) = match t.kind {
        TransitionKind::Entry => (AlertKind::ZoneEntry, format!("{name} entered {}", t.zone_name)),
        TransitionKind::Exit => (AlertKind::ZoneExit, format!("{name} left {}", t.zone_name)),
      };
      raised.push(self.append(state, NewAlert {
        kind,
        message,
        subject_id: subject_id.clone(),
        subject_name: name.clone(),
      }));
    }
    raised
  }

  fn report_vitals(
    &self,
    state: &mut EngineState,
    subject_id: &str,
    reading: BandReading,
  ) -> Option<AlertRecord> {
    let low = state.battery.observe(subject_id, &reading);
    let percent = reading.battery_percent;
    state.vitals.insert(subject_id.to_owned(), reading);
    if !low {
      return None;
    }

    let name = self.directory.name_or_id(subject_id);
    Some(self.append(state, NewAlert {
      kind:         AlertKind::LowBattery,
      message:      format!("{name}'s band battery is low ({percent:.0}%)"),
      subject_id:   subject_id.to_owned(),
      subject_name: name,
    }))
  }
}

impl Drop for Shared {
  fn drop(&mut self) {
    for (_, feed) in self.state.get_mut().feeds.drain() {
      feed.task.abort();
    }
  }
}

/// Drive one feed until it is stopped or replaced, or until its source or
/// the engine goes away.
async fn run_feed(
  engine: Weak<Shared>,
  key: FeedKey,
  generation: u64,
  mut source: FeedSource,
  period: Duration,
) {
  let mut ticker = time::interval_at(Instant::now() + period, period);
  ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

  loop {
    ticker.tick().await;

    let Some(shared) = engine.upgrade() else {
      break;
    };
    let mut guard = shared.state.lock().await;
    let state = &mut *guard;
    if !state.feed_is_current(&key, generation) {
      break;
    }

    let produced = match &mut source {
      FeedSource::Position(src) => {
        let last = state.locations.get(&key.subject_id).map(|s| s.coordinate);
        match src.next_position(last) {
          Some(coordinate) => {
            shared.ingest(state, PositionSample::new(key.subject_id.clone(), coordinate));
            true
          }
          None => false,
        }
      }
      FeedSource::Vitals(src) => {
        let next = src.next_reading(state.vitals.get(&key.subject_id));
        match next {
          Some(reading) => {
            shared.report_vitals(state, &key.subject_id, reading);
            true
          }
          None => false,
        }
      }
    };

    if !produced {
      tracing::info!(subject = %key.subject_id, channel = ?key.channel, "feed source exhausted");
      state.feeds.remove(&key);
      break;
    }
  }
}

// ─── Service ─────────────────────────────────────────────────────────────────

/// The engine's public face. Cloning is cheap and clones share state.
#[derive(Clone)]
pub struct TrackingService {
  shared: Arc<Shared>,
}

impl TrackingService {
  pub fn new(config: TrackingConfig, directory: impl SubjectDirectory + 'static) -> Self {
    Self::restore(config, directory, EngineSnapshot::default())
  }

  /// Rebuild a service from persisted zones, alerts and membership.
  pub fn restore(
    config: TrackingConfig,
    directory: impl SubjectDirectory + 'static,
    snapshot: EngineSnapshot,
  ) -> Self {
    let state = EngineState {
      zones:           ZoneStore::from_zones(snapshot.zones),
      membership:      MembershipTracker::from_entries(snapshot.membership),
      alerts:          AlertLog::from_records(snapshot.alerts),
      battery:         LowBatteryMonitor::new(config.low_battery_percent),
      locations:       HashMap::new(),
      histories:       HashMap::new(),
      vitals:          HashMap::new(),
      feeds:           HashMap::new(),
      next_generation: 0,
    };
    let (events, _) = broadcast::channel(ALERT_CHANNEL_CAPACITY);

    Self {
      shared: Arc::new(Shared {
        config,
        directory: Arc::new(directory),
        state: Mutex::new(state),
        events,
      }),
    }
  }

  /// Load the last snapshot saved in `repo`, or start empty.
  pub async fn load<R: Repository>(
    config: TrackingConfig,
    directory: impl SubjectDirectory + 'static,
    repo: &R,
  ) -> Result<Self> {
    let snapshot = repo
      .load_snapshot()
      .await
      .map_err(|e| Error::Store(Box::new(e)))?
      .unwrap_or_default();
    Ok(Self::restore(config, directory, snapshot))
  }

  pub fn config(&self) -> &TrackingConfig { &self.shared.config }

  pub async fn snapshot(&self) -> EngineSnapshot {
    let state = self.shared.state.lock().await;
    EngineSnapshot {
      zones:      state.zones.list_zones().to_vec(),
      alerts:     state.alerts.records().to_vec(),
      membership: state.membership.entries(),
    }
  }

  pub async fn save<R: Repository>(&self, repo: &R) -> Result<()> {
    repo
      .save_snapshot(self.snapshot().await)
      .await
      .map_err(|e| Error::Store(Box::new(e)))
  }

  /// Receive every alert appended from now on.
  pub fn subscribe(&self) -> broadcast::Receiver<AlertRecord> { self.shared.events.subscribe() }

  // ── Zones ─────────────────────────────────────────────────────────────────

  pub async fn add_zone(&self, new_zone: NewZone) -> Result<SafeZone> {
    let zone = self.shared.state.lock().await.zones.add_zone(new_zone)?;
    tracing::info!(zone = %zone.zone_id, name = %zone.name, radius = zone.radius_meters, "added safe zone");
    Ok(zone)
  }

  /// Unknown ids are ignored. Alerts already raised for the zone are kept.
  pub async fn remove_zone(&self, zone_id: Uuid) -> Option<SafeZone> {
    let removed = self.shared.state.lock().await.zones.remove_zone(zone_id);
    if let Some(zone) = &removed {
      tracing::info!(zone = %zone.zone_id, name = %zone.name, "removed safe zone");
    }
    removed
  }

  pub async fn zones(&self) -> Vec<SafeZone> {
    self.shared.state.lock().await.zones.list_zones().to_vec()
  }

  // ── Positions ─────────────────────────────────────────────────────────────

  /// Record a sample and raise an alert for every zone boundary it crosses.
  /// Returns the alerts raised, in zone order.
  pub async fn ingest(&self, sample: PositionSample) -> Vec<AlertRecord> {
    let mut guard = self.shared.state.lock().await;
    self.shared.ingest(&mut guard, sample)
  }

  /// [`ingest`](Self::ingest) a sample captured now.
  pub async fn ingest_at(&self, subject_id: &str, coordinate: Coordinate) -> Vec<AlertRecord> {
    self.ingest(PositionSample::new(subject_id, coordinate)).await
  }

  pub async fn location(&self, subject_id: &str) -> Option<PositionSample> {
    self.shared.state.lock().await.locations.get(subject_id).cloned()
  }

  pub async fn locations(&self) -> HashMap<String, PositionSample> {
    self.shared.state.lock().await.locations.clone()
  }

  /// Oldest first.
  pub async fn history(&self, subject_id: &str) -> Vec<PositionSample> {
    self
      .shared
      .state
      .lock()
      .await
      .histories
      .get(subject_id)
      .map(LocationHistory::to_vec)
      .unwrap_or_default()
  }

  // ── Sharing ───────────────────────────────────────────────────────────────

  /// Start a simulated walk for `subject_id`, continuing from its last known
  /// location or the configured origin.
  pub async fn start_sharing(&self, subject_id: &str) {
    let walk = SimulatedWalk::new(self.shared.config.origin, self.shared.config.walk_step_degrees);
    self.start_sharing_with(subject_id, walk).await;
  }

  /// Start sharing with an explicit source. An active feed for the subject
  /// is replaced.
  pub async fn start_sharing_with(&self, subject_id: &str, source: impl PositionSource + 'static) {
    self
      .start_feed(
        FeedKey::new(subject_id, Channel::Location),
        FeedSource::Position(Box::new(source)),
        self.shared.config.sample_interval(),
      )
      .await;
  }

  /// Stop sharing. The last known location is kept. Returns whether the
  /// subject was sharing.
  pub async fn stop_sharing(&self, subject_id: &str) -> bool {
    let stopped = self
      .shared
      .state
      .lock()
      .await
      .stop_feed(&FeedKey::new(subject_id, Channel::Location));
    if stopped {
      tracing::info!(subject = %subject_id, "stopped sharing location");
    }
    stopped
  }

  pub async fn is_sharing(&self, subject_id: &str) -> bool {
    let key = FeedKey::new(subject_id, Channel::Location);
    self.shared.state.lock().await.feeds.contains_key(&key)
  }

  // ── SOS ───────────────────────────────────────────────────────────────────

  /// Raise an SOS alert. Works whether or not the subject is sharing.
  pub async fn trigger_sos(&self, subject_id: &str, subject_name: &str) -> AlertRecord {
    let mut guard = self.shared.state.lock().await;
    self.shared.append(&mut guard, NewAlert {
      kind:         AlertKind::Sos,
      message:      format!("EMERGENCY: {subject_name} triggered SOS alert!"),
      subject_id:   subject_id.to_owned(),
      subject_name: subject_name.to_owned(),
    })
  }

  // ── Band ──────────────────────────────────────────────────────────────────

  /// Record a band reading; returns the low-battery alert it raised, if any.
  pub async fn report_vitals(&self, subject_id: &str, reading: BandReading) -> Option<AlertRecord> {
    let mut guard = self.shared.state.lock().await;
    self.shared.report_vitals(&mut guard, subject_id, reading)
  }

  pub async fn vitals(&self, subject_id: &str) -> Option<BandReading> {
    self.shared.state.lock().await.vitals.get(subject_id).cloned()
  }

  pub async fn connect_band(&self, subject_id: &str) {
    self.connect_band_with(subject_id, SimulatedBand::new()).await;
  }

  pub async fn connect_band_with(&self, subject_id: &str, source: impl VitalsSource + 'static) {
    self
      .start_feed(
        FeedKey::new(subject_id, Channel::Band),
        FeedSource::Vitals(Box::new(source)),
        self.shared.config.vitals_interval(),
      )
      .await;
  }

  /// Stop the band feed and clear the subject's readings.
  pub async fn disconnect_band(&self, subject_id: &str) -> bool {
    let mut state = self.shared.state.lock().await;
    let stopped = state.stop_feed(&FeedKey::new(subject_id, Channel::Band));
    state.vitals.remove(subject_id);
    state.battery.forget(subject_id);
    if stopped {
      tracing::info!(subject = %subject_id, "disconnected band");
    }
    stopped
  }

  pub async fn is_band_connected(&self, subject_id: &str) -> bool {
    let key = FeedKey::new(subject_id, Channel::Band);
    self.shared.state.lock().await.feeds.contains_key(&key)
  }

  // ── Alerts ────────────────────────────────────────────────────────────────

  /// Newest first.
  pub async fn alerts(&self) -> Vec<AlertRecord> { self.shared.state.lock().await.alerts.list() }

  pub async fn acknowledge(&self, alert_id: Uuid) -> bool {
    self.shared.state.lock().await.alerts.acknowledge(alert_id)
  }

  pub async fn unacknowledged_count(&self) -> usize {
    self.shared.state.lock().await.alerts.unacknowledged_count()
  }

  pub async fn total_count(&self) -> usize { self.shared.state.lock().await.alerts.total_count() }

  // ── Lifecycle ─────────────────────────────────────────────────────────────

  /// Stop every running feed.
  pub async fn shutdown(&self) {
    let mut state = self.shared.state.lock().await;
    for (_, feed) in state.feeds.drain() {
      feed.task.abort();
    }
  }

  async fn start_feed(&self, key: FeedKey, source: FeedSource, period: Duration) {
    let mut state = self.shared.state.lock().await;
    state.next_generation += 1;
    let generation = state.next_generation;

    let task = tokio::spawn(run_feed(
      Arc::downgrade(&self.shared),
      key.clone(),
      generation,
      source,
      period,
    ));

    tracing::info!(subject = %key.subject_id, channel = ?key.channel, "started feed");
    if let Some(previous) = state.feeds.insert(key, Feed { generation, task }) {
      tracing::warn!(generation = previous.generation, "replaced running feed");
      previous.task.abort();
    }
  }
}
