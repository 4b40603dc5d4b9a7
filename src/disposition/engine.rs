//! Disposition engine - arms, telegraphs and applies disposition instances
//!
//! Per tick:
//! 1. Each whole second, every idle template ramps and rolls to arm. At most
//!    one template arms per second, picked by magnitude among those that rolled.
//! 2. Armed templates wait as pending arrivals until their telegraph window
//!    opens, then reserve a well (or back off and retry if none is free).
//! 3. Telegraphs whose fire time has come are promoted: duration, envelope,
//!    warp table and strength are rolled.
//! 4. Active instances push their well and paint history.
//! 5. Instances past their end release the well and unlock their template.

use rand::distributions::{Distribution, WeightedIndex};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};

use crate::core::config::{DispositionConfig, SimulationConfig};
use crate::core::types::{SimTime, WELL_COUNT};
use crate::disposition::envelope::EnvelopePlan;
use crate::disposition::history::SegmentHistory;
use crate::disposition::instance::{ActiveProfile, DispositionInstance, InstancePhase};
use crate::disposition::types::{
    DispositionTemplate, DispositionType, InstanceId, TemplateSlot, TemplateState,
};
use crate::disposition::warp::WarpLut;
use crate::simulation::state::SimulationState;

/// Scheduling outcomes reported back to the tick
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum DispositionEvent {
    Armed {
        template: usize,
        fire_at: SimTime,
    },
    Telegraphed {
        id: InstanceId,
        hue: usize,
        kind: DispositionType,
        fire_at: SimTime,
    },
    /// Every candidate well was reserved; the arrival was pushed back
    NoFreeWell {
        template: usize,
        retry_at: SimTime,
    },
    Started {
        id: InstanceId,
        hue: usize,
        kind: DispositionType,
        duration: f64,
        discrete: bool,
    },
    Ended {
        id: InstanceId,
        hue: usize,
        kind: DispositionType,
    },
    Cancelled {
        count: usize,
    },
}

/// An armed template that has not reserved a well yet
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
struct PendingArrival {
    template: usize,
    tele_start: SimTime,
    fire_at: SimTime,
}

#[derive(Debug, Clone)]
pub struct DispositionEngine {
    templates: Vec<TemplateSlot>,
    pending: Vec<PendingArrival>,
    instances: Vec<DispositionInstance>,
    reservations: [Option<InstanceId>; WELL_COUNT],
    last_whole_second: i64,
    next_id: u64,
    rng: ChaCha8Rng,
}

impl DispositionEngine {
    /// Build an engine over `pool`. Templates that fail validation are
    /// dropped with a warning.
    pub fn new(pool: Vec<DispositionTemplate>, seed: u64) -> Self {
        let templates = pool
            .into_iter()
            .filter(|template| match template.validate() {
                Ok(()) => true,
                Err(e) => {
                    tracing::warn!("Dropping {} template: {}", template.kind.label(), e);
                    false
                }
            })
            .map(TemplateSlot::new)
            .collect();
        Self {
            templates,
            pending: Vec::new(),
            instances: Vec::new(),
            reservations: [None; WELL_COUNT],
            last_whole_second: 0,
            next_id: 1,
            rng: ChaCha8Rng::seed_from_u64(seed),
        }
    }

    pub fn templates(&self) -> &[TemplateSlot] {
        &self.templates
    }

    pub fn instances(&self) -> &[DispositionInstance] {
        &self.instances
    }

    pub fn pending_count(&self) -> usize {
        self.pending.len()
    }

    /// Instance currently holding a well, if any
    pub fn reservation(&self, hue: usize) -> Option<InstanceId> {
        self.reservations.get(hue).copied().flatten()
    }

    /// Nothing pending, telegraphed or active
    pub fn is_quiet(&self) -> bool {
        self.pending.is_empty() && self.instances.is_empty()
    }

    /// Run one tick of scheduling and effects. `state.now` must already be
    /// advanced by `dt`.
    pub fn update(
        &mut self,
        state: &mut SimulationState,
        config: &SimulationConfig,
        dt: f64,
    ) -> Vec<DispositionEvent> {
        let cfg = &config.disposition;
        let now = state.now;
        let mut events = Vec::new();

        let second = now.floor() as i64;
        while self.last_whole_second < second {
            self.last_whole_second += 1;
            if let Some(event) = self.ramp_second(cfg, now) {
                events.push(event);
            }
        }

        self.reserve_arrivals(cfg, now, &mut events);
        self.promote_due(cfg, now, &mut events);
        self.apply_effects(state, config, now, dt);
        self.paint_histories(cfg, now);
        self.retire_expired(now, &mut events);

        events
    }

    /// Arm a template immediately, bypassing its ramp roll
    ///
    /// Returns `None` for an unknown or already locked template.
    pub fn arm_now(
        &mut self,
        template: usize,
        now: SimTime,
        config: &SimulationConfig,
    ) -> Option<DispositionEvent> {
        let slot = self.templates.get(template)?;
        if slot.state.is_locked() {
            return None;
        }
        Some(self.arm(template, now, &config.disposition))
    }

    /// Drop every pending, telegraphed and active disposition, free all wells
    /// and restart every template's ramp from zero
    pub fn cancel_all(&mut self) -> DispositionEvent {
        let count = self.pending.len() + self.instances.len();
        self.pending.clear();
        self.instances.clear();
        self.reservations = [None; WELL_COUNT];
        for slot in &mut self.templates {
            slot.state = TemplateState::Idle { ramp_elapsed_sec: 0 };
        }
        tracing::debug!("Cancelled {} dispositions", count);
        DispositionEvent::Cancelled { count }
    }

    fn ramp_second(&mut self, cfg: &DispositionConfig, now: SimTime) -> Option<DispositionEvent> {
        let mut rolled = Vec::new();
        for (idx, slot) in self.templates.iter_mut().enumerate() {
            let TemplateState::Idle { ramp_elapsed_sec } = &mut slot.state else {
                continue;
            };
            *ramp_elapsed_sec += 1;
            let p = slot.arm_probability(&cfg.tier_steps);
            if p > 0.0 && self.rng.gen_bool(p) {
                rolled.push(idx);
            }
        }

        let chosen = self.pick_weighted(&rolled, cfg)?;
        Some(self.arm(chosen, now, cfg))
    }

    fn magnitude(&self, template: usize, cfg: &DispositionConfig) -> f64 {
        let t = &self.templates[template].template;
        t.strength * cfg.tier_targets[t.tier.index()]
    }

    fn pick_weighted(&mut self, rolled: &[usize], cfg: &DispositionConfig) -> Option<usize> {
        match rolled {
            [] => None,
            [only] => Some(*only),
            _ => {
                let weights: Vec<f64> = rolled.iter().map(|i| self.magnitude(*i, cfg)).collect();
                match WeightedIndex::new(&weights) {
                    Ok(dist) => Some(rolled[dist.sample(&mut self.rng)]),
                    Err(_) => Some(rolled[0]),
                }
            }
        }
    }

    fn arm(&mut self, template: usize, now: SimTime, cfg: &DispositionConfig) -> DispositionEvent {
        let fire_at = self.gapped_fire_time(now + cfg.telegraph_seconds, cfg.min_fire_gap, None);
        self.templates[template].state = TemplateState::Armed;
        self.pending.push(PendingArrival {
            template,
            tele_start: fire_at - cfg.telegraph_seconds,
            fire_at,
        });
        tracing::debug!(
            "Armed {} (template {}), fires at {:.2}s",
            self.templates[template].template.kind.label(),
            template,
            fire_at
        );
        DispositionEvent::Armed { template, fire_at }
    }

    /// Earliest fire time at or after `desired` that keeps the global gap to
    /// every other scheduled fire time
    fn gapped_fire_time(&self, desired: SimTime, gap: f64, skip_pending: Option<usize>) -> SimTime {
        let latest = self
            .pending
            .iter()
            .enumerate()
            .filter(|(i, _)| Some(*i) != skip_pending)
            .map(|(_, a)| a.fire_at)
            .chain(self.instances.iter().map(|inst| inst.fire_at))
            .fold(f64::NEG_INFINITY, f64::max);
        desired.max(latest + gap)
    }

    fn free_well(&mut self, hue: Option<usize>) -> Option<usize> {
        match hue {
            Some(h) => (h < WELL_COUNT && self.reservations[h].is_none()).then_some(h),
            None => {
                let start = self.rng.gen_range(0..WELL_COUNT);
                (0..WELL_COUNT)
                    .map(|k| (start + k) % WELL_COUNT)
                    .find(|w| self.reservations[*w].is_none())
            }
        }
    }

    fn reserve_arrivals(
        &mut self,
        cfg: &DispositionConfig,
        now: SimTime,
        events: &mut Vec<DispositionEvent>,
    ) {
        let mut i = 0;
        while i < self.pending.len() {
            if now < self.pending[i].tele_start {
                i += 1;
                continue;
            }

            let template = self.pending[i].template;
            let hue = self.templates[template].template.hue;
            match self.free_well(hue) {
                Some(well) => {
                    let arrival = self.pending.remove(i);
                    events.push(self.open_telegraph(arrival, well, now, cfg));
                }
                None => {
                    // Keep the full telegraph window; move the fire time instead
                    let desired = now + cfg.no_well_retry_delay + cfg.telegraph_seconds;
                    let fire_at = self.gapped_fire_time(desired, cfg.min_fire_gap, Some(i));
                    let arrival = &mut self.pending[i];
                    arrival.fire_at = fire_at;
                    arrival.tele_start = fire_at - cfg.telegraph_seconds;
                    tracing::debug!(
                        "No free well for template {}, retrying at {:.2}s",
                        template,
                        arrival.tele_start
                    );
                    events.push(DispositionEvent::NoFreeWell {
                        template,
                        retry_at: arrival.tele_start,
                    });
                    i += 1;
                }
            }
        }
    }

    fn open_telegraph(
        &mut self,
        arrival: PendingArrival,
        well: usize,
        now: SimTime,
        cfg: &DispositionConfig,
    ) -> DispositionEvent {
        let id = InstanceId(self.next_id);
        self.next_id += 1;

        let slot = &mut self.templates[arrival.template];
        slot.state = TemplateState::Telegraphed { instance: id };
        let kind = slot.template.kind;
        let tier = slot.template.tier;

        self.reservations[well] = Some(id);
        self.instances.push(DispositionInstance {
            id,
            template: arrival.template,
            kind,
            hue: well,
            tier,
            tele_start_t: now,
            fire_at: arrival.fire_at,
            phase: InstancePhase::Telegraph,
            history: SegmentHistory::new(cfg.history_segments),
        });
        tracing::debug!(
            "Telegraphing {} on well {} (id {}), fires at {:.2}s",
            kind.label(),
            well,
            id.0,
            arrival.fire_at
        );
        DispositionEvent::Telegraphed {
            id,
            hue: well,
            kind,
            fire_at: arrival.fire_at,
        }
    }

    fn roll_profile(
        &mut self,
        template: &DispositionTemplate,
        start_t: SimTime,
        cfg: &DispositionConfig,
    ) -> ActiveProfile {
        let jitter = if cfg.duration_jitter > 0.0 {
            self.rng.gen_range(-cfg.duration_jitter..=cfg.duration_jitter)
        } else {
            0.0
        };
        let duration = (template.duration + jitter).clamp(cfg.duration_min, cfg.duration_max);
        let discrete = self.rng.gen_bool(cfg.discrete_chance.clamp(0.0, 1.0));
        let envelope =
            EnvelopePlan::roll(&mut self.rng, duration, discrete, cfg.weight_min, cfg.weight_max);
        let warp = WarpLut::build(&envelope, cfg.lut_samples);

        let spread = if cfg.target_jitter_frac > 0.0 {
            self.rng.gen_range(-cfg.target_jitter_frac..=cfg.target_jitter_frac)
        } else {
            0.0
        };
        let target_total = cfg.tier_targets[template.tier.index()] * template.strength * (1.0 + spread);
        let area = warp.total();
        let effective_strength = if area > 0.0 { target_total / area } else { 0.0 };

        ActiveProfile {
            start_t,
            end_t: start_t + duration,
            duration_sec: duration,
            envelope,
            warp,
            effective_strength,
            target_total,
        }
    }

    fn promote_due(
        &mut self,
        cfg: &DispositionConfig,
        now: SimTime,
        events: &mut Vec<DispositionEvent>,
    ) {
        for idx in 0..self.instances.len() {
            let (due, template_idx, fire_at) = {
                let inst = &self.instances[idx];
                (!inst.is_active() && now >= inst.fire_at, inst.template, inst.fire_at)
            };
            if !due {
                continue;
            }

            let template = self.templates[template_idx].template.clone();
            let profile = self.roll_profile(&template, fire_at, cfg);
            let duration = profile.duration_sec;
            let discrete = profile.envelope.discrete;

            let inst = &mut self.instances[idx];
            inst.phase = InstancePhase::Active(Box::new(profile));
            self.templates[template_idx].state = TemplateState::Active { instance: inst.id };

            tracing::debug!(
                "{} fired on well {} for {:.1}s ({})",
                inst.kind.label(),
                inst.hue,
                duration,
                if discrete { "discrete" } else { "continuous" }
            );
            events.push(DispositionEvent::Started {
                id: inst.id,
                hue: inst.hue,
                kind: inst.kind,
                duration,
                discrete,
            });
        }
    }

    /// Push each active instance's well by the change delivered this tick.
    /// Stored values are not clamped here.
    fn apply_effects(
        &self,
        state: &mut SimulationState,
        config: &SimulationConfig,
        now: SimTime,
        dt: f64,
    ) {
        let amount_bounds = config.bounds.amount();
        for inst in &self.instances {
            let Some(profile) = inst.profile() else {
                continue;
            };
            let delta = profile.delivered_between(profile.elapsed(now - dt), profile.elapsed(now));
            if delta == 0.0 {
                continue;
            }

            let h = inst.hue;
            // Low Amount shields the well from Spin pushes
            let shield = amount_bounds.clamp(state.amount[h]) / amount_bounds.max;
            match inst.kind {
                DispositionType::LocksIn => state.amount[h] += delta,
                DispositionType::Crashes => state.amount[h] -= delta,
                DispositionType::Amped => state.spin[h] += delta * shield,
                DispositionType::Spirals => state.spin[h] -= delta * shield,
            }
        }
    }

    fn paint_histories(&mut self, cfg: &DispositionConfig, now: SimTime) {
        for inst in &mut self.instances {
            let InstancePhase::Active(profile) = &inst.phase else {
                continue;
            };
            inst.history.paint(
                profile.elapsed(now),
                &profile.envelope,
                &profile.warp,
                cfg.paint_slice_sec,
                cfg.max_paint_slices,
            );
        }
    }

    fn retire_expired(&mut self, now: SimTime, events: &mut Vec<DispositionEvent>) {
        let mut i = 0;
        while i < self.instances.len() {
            if !self.instances[i].is_expired(now) {
                i += 1;
                continue;
            }
            let inst = self.instances.remove(i);
            if self.reservations[inst.hue] == Some(inst.id) {
                self.reservations[inst.hue] = None;
            }
            if let Some(slot) = self.templates.get_mut(inst.template) {
                slot.state = TemplateState::Idle { ramp_elapsed_sec: 0 };
            }
            tracing::debug!("{} on well {} ended", inst.kind.label(), inst.hue);
            events.push(DispositionEvent::Ended {
                id: inst.id,
                hue: inst.hue,
                kind: inst.kind,
            });
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::disposition::types::Tier;

    const DT: f64 = 0.05;

    fn run(
        engine: &mut DispositionEngine,
        state: &mut SimulationState,
        config: &SimulationConfig,
        seconds: f64,
    ) -> Vec<DispositionEvent> {
        let mut events = Vec::new();
        let steps = (seconds / DT).round() as usize;
        for _ in 0..steps {
            state.now += DT;
            events.extend(engine.update(state, config, DT));
        }
        events
    }

    fn quiet_config() -> SimulationConfig {
        let mut config = SimulationConfig::default();
        // Nothing arms on its own
        config.disposition.tier_steps = [0.0; 3];
        config
    }

    #[test]
    fn test_armed_template_telegraphs_then_fires() {
        let config = quiet_config();
        let mut state = SimulationState::new(&config);
        let pool = vec![DispositionTemplate::new(DispositionType::LocksIn, Tier::Low).on_hue(2)];
        let mut engine = DispositionEngine::new(pool, 1);

        let armed = engine.arm_now(0, state.now, &config);
        assert!(matches!(armed, Some(DispositionEvent::Armed { fire_at, .. }) if (fire_at - 3.0).abs() < 1e-9));
        assert_eq!(engine.templates()[0].state, TemplateState::Armed);

        let events = run(&mut engine, &mut state, &config, 0.1);
        assert!(events.iter().any(|e| matches!(e, DispositionEvent::Telegraphed { hue: 2, .. })));
        assert!(engine.reservation(2).is_some());
        assert!(!engine.instances()[0].is_active());

        let events = run(&mut engine, &mut state, &config, 3.0);
        assert!(events.iter().any(|e| matches!(e, DispositionEvent::Started { hue: 2, .. })));
        assert!(engine.instances()[0].is_active());
        assert!(matches!(engine.templates()[0].state, TemplateState::Active { .. }));
    }

    #[test]
    fn test_invalid_templates_are_dropped() {
        let pool = vec![
            DispositionTemplate::new(DispositionType::Amped, Tier::Low).on_hue(9),
            DispositionTemplate::new(DispositionType::Crashes, Tier::Mid).on_hue(1),
            DispositionTemplate::new(DispositionType::Spirals, Tier::High).with_strength(0.0),
        ];
        let engine = DispositionEngine::new(pool, 4);
        assert_eq!(engine.templates().len(), 1);
        assert_eq!(engine.templates()[0].template.kind, DispositionType::Crashes);
    }

    #[test]
    fn test_heavier_template_wins_most_picks() {
        let config = quiet_config();
        let pool = vec![
            DispositionTemplate::new(DispositionType::Amped, Tier::Low).with_strength(0.05),
            DispositionTemplate::new(DispositionType::LocksIn, Tier::High),
        ];
        let mut engine = DispositionEngine::new(pool, 11);

        // Weights 2 vs 80
        let heavy = (0..1000)
            .filter(|_| engine.pick_weighted(&[0, 1], &config.disposition) == Some(1))
            .count();
        assert!(heavy > 900, "heavy template picked {} times", heavy);
        assert!(heavy < 1000);

        assert_eq!(engine.pick_weighted(&[0], &config.disposition), Some(0));
        assert_eq!(engine.pick_weighted(&[], &config.disposition), None);
    }

    #[test]
    fn test_locked_template_cannot_rearm() {
        let config = quiet_config();
        let state = SimulationState::new(&config);
        let pool = vec![DispositionTemplate::new(DispositionType::Amped, Tier::Mid)];
        let mut engine = DispositionEngine::new(pool, 2);
        assert!(engine.arm_now(0, state.now, &config).is_some());
        assert!(engine.arm_now(0, state.now, &config).is_none());
        assert!(engine.arm_now(7, state.now, &config).is_none());
    }

    #[test]
    fn test_lifetime_delivers_target_total() {
        let mut config = quiet_config();
        config.disposition.target_jitter_frac = 0.0;
        config.disposition.duration_jitter = 0.0;
        let mut state = SimulationState::new(&config);
        let start_amount = state.amount[4];
        let pool = vec![DispositionTemplate::new(DispositionType::LocksIn, Tier::Mid)
            .on_hue(4)
            .with_duration(10.0)];
        let mut engine = DispositionEngine::new(pool, 3);
        engine.arm_now(0, state.now, &config);

        let events = run(&mut engine, &mut state, &config, 14.0);
        assert!(events.iter().any(|e| matches!(e, DispositionEvent::Ended { hue: 4, .. })));
        // Tier 1 target with no jitter, never clamped by the engine
        assert!((state.amount[4] - start_amount - 60.0).abs() < 1e-6);
        assert!(engine.is_quiet());
        assert_eq!(engine.reservation(4), None);
        assert_eq!(engine.templates()[0].state, TemplateState::Idle { ramp_elapsed_sec: 0 });
    }

    #[test]
    fn test_spin_push_is_shielded_by_amount() {
        let mut config = quiet_config();
        config.disposition.target_jitter_frac = 0.0;
        config.disposition.duration_jitter = 0.0;
        let pool = vec![DispositionTemplate::new(DispositionType::Spirals, Tier::High)
            .on_hue(0)
            .with_duration(10.0)];

        let mut full = SimulationState::new(&config);
        full.amount[0] = 100.0;
        let mut engine = DispositionEngine::new(pool.clone(), 4);
        engine.arm_now(0, full.now, &config);
        run(&mut engine, &mut full, &config, 14.0);

        let mut thin = SimulationState::new(&config);
        thin.amount[0] = 50.0;
        let mut engine = DispositionEngine::new(pool, 4);
        engine.arm_now(0, thin.now, &config);
        run(&mut engine, &mut thin, &config, 14.0);

        assert!((full.spin[0] + 80.0).abs() < 1e-6);
        assert!((thin.spin[0] + 40.0).abs() < 1e-6);
    }

    #[test]
    fn test_pinned_hue_waits_for_its_well() {
        let config = quiet_config();
        let mut state = SimulationState::new(&config);
        let pool = vec![
            DispositionTemplate::new(DispositionType::LocksIn, Tier::Low).on_hue(1),
            DispositionTemplate::new(DispositionType::Crashes, Tier::Low).on_hue(1),
        ];
        let mut engine = DispositionEngine::new(pool, 5);
        engine.arm_now(0, state.now, &config);
        engine.arm_now(1, state.now, &config);

        // Second arrival is gapped behind the first and finds well 1 taken
        let events = run(&mut engine, &mut state, &config, 6.0);
        assert!(events.iter().any(|e| matches!(e, DispositionEvent::NoFreeWell { template: 1, .. })));
        assert_eq!(engine.instances().len(), 1);
        assert_eq!(engine.pending_count(), 1);
    }

    #[test]
    fn test_fire_times_respect_global_gap() {
        let config = quiet_config();
        let state = SimulationState::new(&config);
        let pool = vec![
            DispositionTemplate::new(DispositionType::LocksIn, Tier::Low),
            DispositionTemplate::new(DispositionType::Crashes, Tier::Low),
        ];
        let mut engine = DispositionEngine::new(pool, 6);
        let first = engine.arm_now(0, state.now, &config);
        let second = engine.arm_now(1, state.now, &config);
        match (first, second) {
            (
                Some(DispositionEvent::Armed { fire_at: a, .. }),
                Some(DispositionEvent::Armed { fire_at: b, .. }),
            ) => {
                assert!((a - 3.0).abs() < 1e-9);
                assert!((b - 7.0).abs() < 1e-9);
            }
            other => panic!("unexpected arm results: {:?}", other),
        }
    }

    #[test]
    fn test_cancel_all_resets_everything() {
        let config = quiet_config();
        let mut state = SimulationState::new(&config);
        let pool = vec![
            DispositionTemplate::new(DispositionType::LocksIn, Tier::Low),
            DispositionTemplate::new(DispositionType::Amped, Tier::High),
        ];
        let mut engine = DispositionEngine::new(pool, 7);
        engine.arm_now(0, state.now, &config);
        engine.arm_now(1, state.now, &config);
        run(&mut engine, &mut state, &config, 4.0);
        assert!(!engine.is_quiet());

        let event = engine.cancel_all();
        assert_eq!(event, DispositionEvent::Cancelled { count: 2 });
        assert!(engine.is_quiet());
        assert!((0..WELL_COUNT).all(|w| engine.reservation(w).is_none()));
        assert!(engine
            .templates()
            .iter()
            .all(|s| s.state == TemplateState::Idle { ramp_elapsed_sec: 0 }));
    }

    #[test]
    fn test_certain_ramp_arms_one_template_per_second() {
        let mut config = SimulationConfig::default();
        config.disposition.tier_steps = [1.0; 3];
        let mut state = SimulationState::new(&config);
        let pool = vec![
            DispositionTemplate::new(DispositionType::LocksIn, Tier::Low),
            DispositionTemplate::new(DispositionType::Crashes, Tier::Low),
            DispositionTemplate::new(DispositionType::Amped, Tier::Low),
        ];
        let mut engine = DispositionEngine::new(pool, 8);

        let events = run(&mut engine, &mut state, &config, 1.1);
        let armed = events
            .iter()
            .filter(|e| matches!(e, DispositionEvent::Armed { .. }))
            .count();
        assert_eq!(armed, 1);

        let events = run(&mut engine, &mut state, &config, 1.0);
        let armed = events
            .iter()
            .filter(|e| matches!(e, DispositionEvent::Armed { .. }))
            .count();
        assert_eq!(armed, 1);
    }
}
