//! Fixed-step boiler simulation.
//!
//! Each step runs the chain
//! `measure -> control law -> PWM -> heater lag -> plant heat & loss -> draw`
//! and appends a [`StepRecord`]. The controller runs on its own period; the
//! step only has to divide it evenly.

use crate::boiler::ThermalPlant;
use crate::config::{ControlMode, RunOptions, SimConfig};
use crate::error::SimResult;
use crate::heater::HeaterActuator;
use crate::noise::{MeasurementNoise, NoNoise};
use crate::record::{RunRecord, StepRecord};
use crate::shot::Phase;
use bs_controls::{Gains, PidController, PidTerms, PwmQuantizer, Thermostat};
use tracing::{debug, info};

/// Heater law resolved from [`ControlMode`] at construction.
#[derive(Debug, Clone)]
enum ControlLaw {
    Pid,
    Thermostat(Thermostat),
    StepTest { on_from_s: f64, on_until_s: f64 },
}

/// Owns one plant, heater and controller and runs them against a target.
///
/// Component state is reset at the start of every [`Engine::run`], so one
/// engine can serve any number of runs.
#[derive(Debug)]
pub struct Engine {
    config: SimConfig,
    plant: ThermalPlant,
    heater: HeaterActuator,
    controller: PidController,
    law: ControlLaw,
    quantizer: PwmQuantizer,
    noise: Box<dyn MeasurementNoise>,
}

impl Engine {
    /// Build all components. Any configuration or numeric domain error is
    /// reported here.
    pub fn new(config: SimConfig) -> SimResult<Self> {
        config.validate()?;
        let plant = ThermalPlant::new(config.plant.clone())?;
        let heater = HeaterActuator::new(config.heater.clone())?;
        let controller = PidController::new(config.controller.clone())?;
        let law = match &config.mode {
            ControlMode::Pid => ControlLaw::Pid,
            ControlMode::Thermostat(t) => ControlLaw::Thermostat(Thermostat::new(*t)?),
            ControlMode::StepTest {
                on_from_s,
                on_until_s,
            } => ControlLaw::StepTest {
                on_from_s: *on_from_s,
                on_until_s: *on_until_s,
            },
        };
        let noise = match &config.noise {
            Some(n) => n.build()?,
            None => Box::new(NoNoise),
        };
        Ok(Self {
            quantizer: PwmQuantizer::new(config.pwm),
            plant,
            heater,
            controller,
            law,
            noise,
            config,
        })
    }

    /// Replace the measurement noise source.
    pub fn with_noise(mut self, noise: Box<dyn MeasurementNoise>) -> Self {
        self.noise = noise;
        self
    }

    pub fn config(&self) -> &SimConfig {
        &self.config
    }

    pub fn plant(&self) -> &ThermalPlant {
        &self.plant
    }

    pub fn controller(&self) -> &PidController {
        &self.controller
    }

    /// Replace the gains every following run starts from.
    pub fn set_base_gains(&mut self, gains: Gains) -> SimResult<()> {
        self.controller.set_base_gains(gains)?;
        self.config.controller.gains = gains;
        Ok(())
    }

    pub fn reset(&mut self) {
        self.plant.reset();
        self.heater.reset();
        self.controller.reset();
        if let ControlLaw::Thermostat(t) = &mut self.law {
            t.reset();
        }
        self.noise.reset();
    }

    /// Run one simulation.
    ///
    /// # Errors
    ///
    /// Fails before the first step if `duration / step` or
    /// `control period / step` is not an integer, or the shot window is
    /// inverted.
    pub fn run(&mut self, opts: &RunOptions) -> SimResult<RunRecord> {
        let plan = opts.plan(self.config.controller.ts)?;
        self.reset();

        let dt = opts.step_s;
        let target = opts.target_c;
        let base_gains = self.controller.gains();
        let mut record = RunRecord::with_capacity(plan.steps, target, dt);
        let mut phase = Phase::Idle;

        debug!(
            steps = plan.steps,
            substeps = plan.substeps_per_period,
            target,
            "starting run"
        );

        for k in 0..plan.steps {
            let t = k as f64 * dt;

            let next = Phase::at(t, opts.shot.as_ref(), self.config.shot.flush_window_s);
            if next != phase {
                debug!(t, from = ?phase, to = ?next, "phase change");
                self.enter_phase(next, base_gains);
                phase = next;
            }

            let measured = self.plant.temperature() + self.noise.sample();
            let (on, duty, terms) = match &mut self.law {
                ControlLaw::Pid => {
                    let duty = self.controller.update(t, target, measured);
                    let on = self
                        .quantizer
                        .decide_substep(duty, plan.substeps_per_period, k)
                        .is_on();
                    (on, duty, self.controller.last_terms())
                }
                ControlLaw::Thermostat(thermostat) => {
                    let on = thermostat.update(measured);
                    (on, if on { 100.0 } else { 0.0 }, PidTerms::default())
                }
                ControlLaw::StepTest {
                    on_from_s,
                    on_until_s,
                } => {
                    let on = t >= *on_from_s && t < *on_until_s;
                    (on, if on { 100.0 } else { 0.0 }, PidTerms::default())
                }
            };

            let fraction = self.heater.step(on, dt);
            self.plant.integrate(self.heater.heat(dt), dt);
            let draw = self
                .config
                .shot
                .draw(phase, self.plant.temperature(), target, dt);
            if draw > 0.0 {
                self.plant.apply_draw(draw);
            }

            record.push(StepRecord {
                time_s: t,
                temperature_c: self.plant.temperature(),
                heater_on: on,
                heater_fraction: fraction,
                duty,
                p_term: terms.p,
                i_term: terms.i,
                d_term: terms.d,
                pid_output: terms.raw,
                phase,
            });
        }

        info!(
            steps = record.len(),
            final_temp = record.last().map(|s| s.temperature_c),
            max_temp = record.max_temperature(),
            "run complete"
        );
        Ok(record)
    }

    fn enter_phase(&mut self, phase: Phase, base_gains: Gains) {
        self.controller
            .set_idle_cap_active(matches!(phase, Phase::Idle | Phase::Recovered));
        match phase {
            Phase::Shot => {
                if let Some(gains) = self.config.shot.gains {
                    self.controller.set_gains(gains);
                }
                if let Some(ov) = self.config.shot.start_override {
                    self.controller.override_output(ov.value, ov.cycles);
                }
            }
            Phase::Recovered => self.controller.set_gains(base_gains),
            Phase::Idle | Phase::PostShot => {}
        }
    }
}
