//! Destination Registry
//!
//! Turns destination definitions into validated [`Destination`]s keyed by
//! id. Each kind is built by a [`DestinationLoader`]; the set of loaders is
//! fixed by the injected [`Collaborators`].

use std::collections::HashMap;
use std::sync::Arc;

use contracts::{ContractError, DestinationConfig, DestinationKind, EmailSender, TopicPublisher, WebhookPoster};
use tracing::{debug, info, instrument};

use crate::destination::Destination;
use crate::sinks::{EmailLoader, TopicLoader, WebhookLoader};

/// Builds destinations of one kind
pub trait DestinationLoader: Send + Sync {
    /// Kind this loader handles
    fn kind(&self) -> DestinationKind;

    /// Validate one definition and build its destination
    ///
    /// # Errors
    /// `ConfigValidation` naming the offending field
    fn load(&self, idx: usize, config: &DestinationConfig) -> Result<Destination, ContractError>;
}

/// The I/O collaborators destinations deliver through
#[derive(Clone)]
pub struct Collaborators {
    pub topics: Arc<dyn TopicPublisher>,
    pub webhooks: Arc<dyn WebhookPoster>,
    pub email: Arc<dyn EmailSender>,
}

impl Collaborators {
    pub fn new(
        topics: Arc<dyn TopicPublisher>,
        webhooks: Arc<dyn WebhookPoster>,
        email: Arc<dyn EmailSender>,
    ) -> Self {
        Self {
            topics,
            webhooks,
            email,
        }
    }

    /// Use one transport for every kind
    pub fn uniform<T>(transport: Arc<T>) -> Self
    where
        T: TopicPublisher + WebhookPoster + EmailSender + 'static,
    {
        Self {
            topics: transport.clone(),
            webhooks: transport.clone(),
            email: transport,
        }
    }

    /// One loader per destination kind
    pub fn loaders(&self) -> Vec<Box<dyn DestinationLoader>> {
        vec![
            Box::new(TopicLoader::new(self.topics.clone())),
            Box::new(WebhookLoader::new(self.webhooks.clone())),
            Box::new(EmailLoader::new(self.email.clone())),
        ]
    }
}

/// Validated destinations keyed by id
#[derive(Debug, Default)]
pub struct DestinationRegistry {
    destinations: HashMap<String, Arc<Destination>>,
    order: Vec<String>,
}

impl DestinationRegistry {
    /// Build every destination with the loaders of `collaborators`
    pub fn build(
        configs: &[DestinationConfig],
        collaborators: &Collaborators,
    ) -> Result<Self, ContractError> {
        Self::build_with(configs, &collaborators.loaders())
    }

    /// Build every destination with an explicit loader set
    ///
    /// # Errors
    /// - unknown kind tag: `invalid destination type`
    /// - repeated id: `duplicate destination id`
    /// - any loader validation error
    #[instrument(
        name = "registry_build",
        skip(configs, loaders),
        fields(destinations = configs.len())
    )]
    pub fn build_with(
        configs: &[DestinationConfig],
        loaders: &[Box<dyn DestinationLoader>],
    ) -> Result<Self, ContractError> {
        let mut registry = Self::default();

        for (idx, config) in configs.iter().enumerate() {
            let loader = DestinationKind::from_tag(&config.kind)
                .and_then(|kind| loaders.iter().find(|l| l.kind() == kind))
                .ok_or_else(|| {
                    ContractError::config_validation(
                        format!("destination[{idx}].type"),
                        format!("invalid destination type {:?}", config.kind),
                    )
                })?;

            let destination = loader.load(idx, config)?;

            if registry.destinations.contains_key(destination.id()) {
                return Err(ContractError::config_validation(
                    format!("destination[id={}]", destination.id()),
                    "duplicate destination id",
                ));
            }

            debug!(destination = %destination, destination_type = %destination.kind(), "Loaded destination");
            registry.order.push(destination.id().to_string());
            registry
                .destinations
                .insert(destination.id().to_string(), Arc::new(destination));
        }

        info!(destinations = registry.len(), "Destination registry built");
        Ok(registry)
    }

    pub fn get(&self, id: &str) -> Option<Arc<Destination>> {
        self.destinations.get(id).cloned()
    }

    pub fn len(&self) -> usize {
        self.destinations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.destinations.is_empty()
    }

    /// Destinations in definition order
    pub fn iter(&self) -> impl Iterator<Item = &Arc<Destination>> {
        self.order.iter().filter_map(|id| self.destinations.get(id))
    }
}
