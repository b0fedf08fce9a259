//! The configuration store.
//!
//! A store owns one session's configuration and everything derived from it.
//! Every change goes through [`ConfigurationStore::dispatch`] (or one of its
//! wrappers), re-runs the derivations synchronously, and publishes a fresh
//! [`StoreSnapshot`] to subscribers.

use std::sync::Arc;
use std::time::Duration;

use common::SessionId;
use serde::Serialize;
use tokio::sync::watch;

use crate::configuration::{
    ClubId, ConfigAction, Configuration, GripSelection, Hand, Lie, RuleViolation, ShaftLength,
    Step, can_checkout, max_unlocked_step, rules,
};
use crate::error::ConfigurationError;
use crate::persistence::{DebouncedPersister, SelectionRepository};

/// Values computed from a configuration after every commit.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Derived {
    pub max_unlocked_step: Step,
    pub can_checkout: bool,
    pub set_size: Option<String>,
    pub club_count: usize,
}

/// A pure function filling part of [`Derived`].
pub type Derivation = fn(&Configuration, &mut Derived);

fn derive_unlocked_step(config: &Configuration, derived: &mut Derived) {
    derived.max_unlocked_step = max_unlocked_step(config);
}

fn derive_can_checkout(config: &Configuration, derived: &mut Derived) {
    derived.can_checkout = can_checkout(config);
}

fn derive_set_size(config: &Configuration, derived: &mut Derived) {
    derived.set_size = config.set_size();
}

fn derive_club_count(config: &Configuration, derived: &mut Derived) {
    derived.club_count = config.club_count();
}

/// The derivations every store runs unless told otherwise.
pub const DEFAULT_DERIVATIONS: [Derivation; 4] = [
    derive_unlocked_step,
    derive_can_checkout,
    derive_set_size,
    derive_club_count,
];

/// Immutable view of a store at one point in time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StoreSnapshot {
    pub session_id: SessionId,
    /// Incremented on every committed change or navigation.
    pub revision: u64,
    pub configuration: Configuration,
    pub current_step: Step,
    pub derived: Derived,
    /// Message of the last rejected action or failed submission.
    pub error: Option<String>,
    pub submitting: bool,
}

/// Owner of one configuration session.
pub struct ConfigurationStore {
    snapshot: Arc<StoreSnapshot>,
    derivations: Vec<Derivation>,
    notifier: watch::Sender<Arc<StoreSnapshot>>,
    persister: Option<DebouncedPersister>,
}

impl ConfigurationStore {
    /// Creates a store with the default configuration.
    pub fn new(session_id: SessionId) -> Self {
        Self::from_configuration(session_id, Configuration::default())
    }

    /// Creates a store starting from `configuration`.
    pub fn from_configuration(session_id: SessionId, configuration: Configuration) -> Self {
        let derivations = DEFAULT_DERIVATIONS.to_vec();
        let derived = run_derivations(&derivations, &configuration);
        let snapshot = Arc::new(StoreSnapshot {
            session_id,
            revision: 0,
            configuration,
            current_step: Step::Club,
            derived,
            error: None,
            submitting: false,
        });
        let (notifier, _) = watch::channel(Arc::clone(&snapshot));

        Self {
            snapshot,
            derivations,
            notifier,
            persister: None,
        }
    }

    /// Replaces the derivation list and re-derives the current snapshot.
    pub fn with_derivations(mut self, derivations: Vec<Derivation>) -> Self {
        self.derivations = derivations;
        let derived = run_derivations(&self.derivations, &self.snapshot.configuration);
        self.publish(StoreSnapshot {
            derived,
            ..(*self.snapshot).clone()
        });
        self
    }

    /// Persists every committed configuration through `persister`.
    pub fn with_persister(mut self, persister: DebouncedPersister) -> Self {
        self.persister = Some(persister);
        self
    }

    /// Creates a store from the session's saved selection.
    ///
    /// A saved selection that cannot be read, or that no longer passes the
    /// selection rules, is discarded in favor of the defaults.
    pub async fn restore(
        session_id: SessionId,
        repository: Arc<dyn SelectionRepository>,
        delay: Duration,
    ) -> Self {
        let configuration = match repository.load(session_id).await {
            Ok(Some(saved)) => match check_restorable(&saved) {
                Ok(()) => {
                    tracing::debug!(%session_id, "restored saved selection");
                    saved
                }
                Err(violation) => {
                    tracing::warn!(%session_id, %violation, "discarding invalid saved selection");
                    Configuration::default()
                }
            },
            Ok(None) => Configuration::default(),
            Err(e) => {
                tracing::warn!(%session_id, error = %e, "failed to load saved selection");
                Configuration::default()
            }
        };

        Self::from_configuration(session_id, configuration).with_persister(
            DebouncedPersister::new(session_id, repository, delay),
        )
    }

    pub fn session_id(&self) -> SessionId {
        self.snapshot.session_id
    }

    /// Returns the current snapshot.
    pub fn snapshot(&self) -> Arc<StoreSnapshot> {
        Arc::clone(&self.snapshot)
    }

    pub fn configuration(&self) -> &Configuration {
        &self.snapshot.configuration
    }

    pub fn current_step(&self) -> Step {
        self.snapshot.current_step
    }

    pub fn derived(&self) -> &Derived {
        &self.snapshot.derived
    }

    pub fn is_submitting(&self) -> bool {
        self.snapshot.submitting
    }

    /// Returns a receiver that sees every published snapshot.
    pub fn subscribe(&self) -> watch::Receiver<Arc<StoreSnapshot>> {
        self.notifier.subscribe()
    }

    /// Applies an action.
    ///
    /// On rejection the configuration is left as it was and the violation is
    /// recorded in the snapshot's `error`.
    #[tracing::instrument(skip(self), fields(session_id = %self.snapshot.session_id, action = action.name()))]
    pub fn dispatch(&mut self, action: ConfigAction) -> Result<(), ConfigurationError> {
        metrics::counter!("configuration_actions_total", "action" => action.name()).increment(1);

        let outcome = match &action {
            ConfigAction::GoToStep { step } => self.navigate(*step),
            ConfigAction::Reset => {
                self.commit(Configuration::default(), Some(Step::Club));
                Ok(())
            }
            _ => self
                .snapshot
                .configuration
                .apply(&action)
                .map(|next| self.commit(next, None)),
        };

        outcome.map_err(|violation| self.reject(action.name(), violation))
    }

    pub fn set_hand(&mut self, hand: Hand) -> Result<(), ConfigurationError> {
        self.dispatch(ConfigAction::SetHand { hand })
    }

    pub fn toggle_club(&mut self, club: ClubId) -> Result<(), ConfigurationError> {
        self.dispatch(ConfigAction::ToggleClub { club })
    }

    pub fn set_shaft_brand(&mut self, brand: Option<&str>) -> Result<(), ConfigurationError> {
        self.dispatch(ConfigAction::SetShaftBrand {
            brand: brand.map(str::to_string),
        })
    }

    pub fn set_shaft_flex(&mut self, flex: Option<&str>) -> Result<(), ConfigurationError> {
        self.dispatch(ConfigAction::SetShaftFlex {
            flex: flex.map(str::to_string),
        })
    }

    pub fn set_shaft_length(&mut self, length: ShaftLength) -> Result<(), ConfigurationError> {
        self.dispatch(ConfigAction::SetShaftLength { length })
    }

    pub fn set_grip(&mut self, grip: Option<GripSelection>) -> Result<(), ConfigurationError> {
        self.dispatch(ConfigAction::SetGrip { grip })
    }

    pub fn set_lie(&mut self, lie: Lie) -> Result<(), ConfigurationError> {
        self.dispatch(ConfigAction::SetLie { lie })
    }

    /// Moves to `step` if it is unlocked.
    pub fn go_to_step(&mut self, step: Step) -> Result<(), ConfigurationError> {
        self.dispatch(ConfigAction::GoToStep { step })
    }

    /// Returns to the default configuration and the first step.
    #[tracing::instrument(skip(self), fields(session_id = %self.snapshot.session_id))]
    pub fn reset(&mut self) {
        metrics::counter!("configuration_actions_total", "action" => ConfigAction::Reset.name())
            .increment(1);
        self.commit(Configuration::default(), Some(Step::Club));
    }

    /// Marks the store as submitting and returns the configuration to submit.
    pub fn begin_submission(&mut self) -> Result<Configuration, ConfigurationError> {
        if self.snapshot.submitting {
            tracing::info!(session_id = %self.snapshot.session_id, "submission already in flight");
            return Err(ConfigurationError::SubmissionInFlight);
        }

        if let Err(violation) = rules::validate_complete_configuration(&self.snapshot.configuration)
        {
            let err = ConfigurationError::incomplete(violation);
            self.publish(StoreSnapshot {
                error: Some(err.to_string()),
                ..(*self.snapshot).clone()
            });
            return Err(err);
        }

        let configuration = self.snapshot.configuration.clone();
        self.publish(StoreSnapshot {
            submitting: true,
            error: None,
            ..(*self.snapshot).clone()
        });
        Ok(configuration)
    }

    /// Clears the submitting flag, recording `error` if the attempt failed.
    pub fn finish_submission(&mut self, error: Option<String>) {
        self.publish(StoreSnapshot {
            submitting: false,
            error,
            ..(*self.snapshot).clone()
        });
    }

    /// Waits for a pending selection write to finish.
    pub async fn flush_persistence(&mut self) {
        if let Some(persister) = self.persister.as_mut() {
            persister.flush().await;
        }
    }

    fn navigate(&mut self, step: Step) -> Result<(), RuleViolation> {
        let unlocked = self.snapshot.derived.max_unlocked_step;
        if step > unlocked {
            return Err(RuleViolation::StepLocked {
                requested: step,
                unlocked,
            });
        }

        self.publish(StoreSnapshot {
            revision: self.snapshot.revision + 1,
            current_step: step,
            error: None,
            ..(*self.snapshot).clone()
        });
        Ok(())
    }

    fn commit(&mut self, configuration: Configuration, step: Option<Step>) {
        let derived = run_derivations(&self.derivations, &configuration);
        let current_step = step
            .unwrap_or(self.snapshot.current_step)
            .min(derived.max_unlocked_step);
        let changed = configuration != self.snapshot.configuration;

        self.publish(StoreSnapshot {
            session_id: self.snapshot.session_id,
            revision: self.snapshot.revision + 1,
            configuration,
            current_step,
            derived,
            error: None,
            submitting: self.snapshot.submitting,
        });

        if changed && let Some(persister) = self.persister.as_mut() {
            persister.schedule(self.snapshot.configuration.clone());
        }
    }

    fn reject(&mut self, action: &'static str, violation: RuleViolation) -> ConfigurationError {
        metrics::counter!(
            "configuration_rejections_total",
            "action" => action,
            "section" => violation.section().to_string()
        )
        .increment(1);
        tracing::info!(reason = %violation, "action rejected");

        self.publish(StoreSnapshot {
            error: Some(violation.to_string()),
            ..(*self.snapshot).clone()
        });
        ConfigurationError::Rule(violation)
    }

    fn publish(&mut self, snapshot: StoreSnapshot) {
        let snapshot = Arc::new(snapshot);
        self.snapshot = Arc::clone(&snapshot);
        self.notifier.send_replace(snapshot);
    }
}

impl std::fmt::Debug for ConfigurationStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConfigurationStore")
            .field("snapshot", &self.snapshot)
            .field("derivations", &self.derivations.len())
            .field("persister", &self.persister)
            .finish()
    }
}

fn run_derivations(derivations: &[Derivation], configuration: &Configuration) -> Derived {
    let mut derived = Derived::default();
    for derive in derivations {
        derive(configuration, &mut derived);
    }
    derived
}

/// Checks the invariants a committed configuration always satisfies.
fn check_restorable(config: &Configuration) -> Result<(), RuleViolation> {
    rules::validate_club_selection(&config.clubs)?;
    if let Some(grip) = &config.grip {
        rules::validate_grip_configuration(grip)?;
    }
    for (value, field) in [
        (&config.shaft.brand, "Shaft brand"),
        (&config.shaft.flex, "Shaft flex"),
    ] {
        if value.as_deref().is_some_and(|v| v.trim().is_empty()) {
            return Err(RuleViolation::BlankValue { field });
        }
    }
    Ok(())
}
