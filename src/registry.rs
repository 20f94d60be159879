//! Discovery and lifetime of templates spread across remote manifests.
//!
//! The registry is the single owner of every container it reads: loaded URLs, the pending
//! whitelist queue, the blacklist, live templates, and the clock samples. Fetch results come back
//! as messages on an internal channel and are applied by [`TemplateRegistry::drain_completions`]
//! (called at the start of every [`TemplateRegistry::tick`]), so nothing mutates the registry
//! behind a tick's back.

use std::collections::{BTreeSet, VecDeque};

use crossbeam_channel::{Receiver, Sender};
use url::Url;

use crate::{
    clock::{Clock, ClockSynchronizer},
    config::RegistryConfig,
    fetch::{
        FetchCompletion, FetchRequest, FetchResponse, ManifestFetcher, cache_busted,
        normalize_str, normalize_url,
    },
    foundation::error::{OverlayError, OverlayResult},
    manifest::{JsonManifest, TemplateDescriptor, parse_manifest},
};

/// A live template owned by the registry.
pub trait TemplateEntity {
    /// Advances the template by `delta_units` render steps at `synced_seconds`.
    fn update(&mut self, delta_units: u32, randomness: f64, synced_seconds: f64);
    /// Releases whatever the template holds outside the registry.
    fn destroy(&mut self);
}

pub trait TemplateFactory {
    type Template: TemplateEntity;

    /// Builds the template at position `index` of the registry's template list.
    fn create(&mut self, descriptor: TemplateDescriptor, index: usize) -> Self::Template;
}

impl<T, F> TemplateFactory for F
where
    T: TemplateEntity,
    F: FnMut(TemplateDescriptor, usize) -> T,
{
    type Template = T;

    fn create(&mut self, descriptor: TemplateDescriptor, index: usize) -> T {
        self(descriptor, index)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LoadOutcome {
    Issued,
    AlreadyLoaded,
    Blacklisted,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ManifestSummary {
    pub blacklisted: usize,
    pub whitelisted: usize,
    pub created: usize,
    pub dropped: usize,
}

pub struct TemplateRegistry<F, T, C>
where
    T: TemplateFactory,
{
    config: RegistryConfig,
    fetcher: F,
    factory: T,
    clock: C,
    starting_url: Url,
    already_loaded: BTreeSet<String>,
    whitelist: VecDeque<String>,
    blacklist: BTreeSet<String>,
    templates: Vec<T::Template>,
    sync: ClockSynchronizer,
    randomness: f64,
    generation: u64,
    completions_tx: Sender<FetchCompletion>,
    completions_rx: Receiver<FetchCompletion>,
}

impl<F, T, C> TemplateRegistry<F, T, C>
where
    F: ManifestFetcher,
    T: TemplateFactory,
    C: Clock,
{
    /// Creates the registry and issues the load of `starting_url`.
    pub fn new(
        starting_url: &str,
        config: RegistryConfig,
        fetcher: F,
        factory: T,
        clock: C,
    ) -> OverlayResult<Self> {
        config.validate()?;
        let starting_url = parse_url(starting_url)?;
        let (completions_tx, completions_rx) = crossbeam_channel::unbounded();

        let mut registry = Self {
            sync: ClockSynchronizer::with_window(config.clock_window),
            config,
            fetcher,
            factory,
            clock,
            starting_url,
            already_loaded: BTreeSet::new(),
            whitelist: VecDeque::new(),
            blacklist: BTreeSet::new(),
            templates: Vec::new(),
            randomness: rand::random::<f64>(),
            generation: 0,
            completions_tx,
            completions_rx,
        };
        let start = registry.starting_url.to_string();
        registry.load_from_url(&start)?;
        Ok(registry)
    }

    /// Pins the shared dither seed instead of the one drawn at construction.
    pub fn with_randomness(mut self, randomness: f64) -> OverlayResult<Self> {
        if !randomness.is_finite() || !(0.0..1.0).contains(&randomness) {
            return Err(OverlayError::invalid_parameter(format!(
                "randomness must be in [0, 1), got {randomness}"
            )));
        }
        self.randomness = randomness;
        Ok(self)
    }

    #[tracing::instrument(skip(self))]
    pub fn load_from_url(&mut self, url: &str) -> OverlayResult<LoadOutcome> {
        let url = parse_url(url)?;
        let key = normalize_url(&url);
        if self.already_loaded.contains(&key) {
            return Ok(LoadOutcome::AlreadyLoaded);
        }
        if self.blacklist.contains(&key) {
            tracing::debug!(%key, "skipping blacklisted manifest");
            return Ok(LoadOutcome::Blacklisted);
        }
        self.already_loaded.insert(key);

        let busted = cache_busted(&url, self.clock.now_ms(), self.config.cache_bust_period_ms);
        tracing::info!(url = %busted, "loading templates");
        self.fetcher.fetch(
            FetchRequest {
                url: busted,
                generation: self.generation,
            },
            self.completions_tx.clone(),
        );
        Ok(LoadOutcome::Issued)
    }

    /// Applies one fetch result. Returns the manifest summary if the result was applied.
    ///
    /// Results issued before the last [`restart`](Self::restart) are dropped. Network and parse
    /// failures are logged and leave the URL marked as loaded.
    pub fn handle_completion(&mut self, completion: FetchCompletion) -> Option<ManifestSummary> {
        let FetchCompletion { request, result } = completion;
        if request.generation != self.generation {
            tracing::debug!(
                url = %request.url,
                stale = request.generation,
                current = self.generation,
                "dropping completion from before restart"
            );
            return None;
        }

        let response = match result {
            Ok(r) => r,
            Err(err) => {
                tracing::warn!(url = %request.url, error = %err, "manifest fetch failed");
                return None;
            }
        };
        self.record_clock_sample(&request.url, &response);

        match parse_manifest(&response.body) {
            Ok(manifest) => {
                let summary = self.apply_manifest(manifest);
                tracing::info!(
                    url = %request.url,
                    created = summary.created,
                    dropped = summary.dropped,
                    whitelisted = summary.whitelisted,
                    blacklisted = summary.blacklisted,
                    "manifest applied"
                );
                Some(summary)
            }
            Err(err) => {
                tracing::warn!(url = %request.url, error = %err, "ignoring manifest");
                None
            }
        }
    }

    /// Applies every completion that has arrived so far. Returns how many were received.
    pub fn drain_completions(&mut self) -> usize {
        let mut n = 0;
        while let Ok(completion) = self.completions_rx.try_recv() {
            self.handle_completion(completion);
            n += 1;
        }
        n
    }

    /// One render step: apply arrived manifests, advance every template, then start loading
    /// queued whitelist URLs while there is room for more templates.
    #[tracing::instrument(level = "trace", skip(self))]
    pub fn tick(&mut self) {
        self.drain_completions();

        let synced_seconds = self.synced_seconds();
        for template in &mut self.templates {
            template.update(1, self.randomness, synced_seconds);
        }

        while self.has_capacity() {
            let Some(url) = self.whitelist.pop_front() else {
                break;
            };
            if let Err(err) = self.load_from_url(&url) {
                tracing::warn!(%url, error = %err, "skipping whitelist entry");
            }
        }
    }

    /// Destroys every template and loads the starting manifest again.
    ///
    /// The blacklist, pending whitelist and clock samples survive.
    pub fn restart(&mut self) -> OverlayResult<LoadOutcome> {
        tracing::info!(templates = self.templates.len(), "restarting registry");
        for mut template in self.templates.drain(..) {
            template.destroy();
        }
        self.already_loaded.clear();
        self.generation += 1;
        let start = self.starting_url.to_string();
        self.load_from_url(&start)
    }

    pub fn synced_seconds(&self) -> f64 {
        self.sync.synced_seconds(self.clock.now_ms())
    }

    pub fn clock_sync(&self) -> &ClockSynchronizer {
        &self.sync
    }

    pub fn templates(&self) -> &[T::Template] {
        &self.templates
    }

    pub fn template_count(&self) -> usize {
        self.templates.len()
    }

    pub fn has_capacity(&self) -> bool {
        self.templates.len() < self.config.max_templates
    }

    pub fn pending_whitelist(&self) -> impl Iterator<Item = &str> + '_ {
        self.whitelist.iter().map(String::as_str)
    }

    pub fn is_loaded(&self, url: &str) -> bool {
        self.already_loaded.contains(&normalize_str(url))
    }

    pub fn is_blacklisted(&self, url: &str) -> bool {
        self.blacklist.contains(&normalize_str(url))
    }

    pub fn randomness(&self) -> f64 {
        self.randomness
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn starting_url(&self) -> &Url {
        &self.starting_url
    }

    pub fn config(&self) -> &RegistryConfig {
        &self.config
    }

    pub fn fetcher(&self) -> &F {
        &self.fetcher
    }

    fn record_clock_sample(&mut self, url: &Url, response: &FetchResponse) {
        let Some(date) = response.date.as_deref() else {
            return;
        };
        match self.sync.record_date_header(date, response.received_ms) {
            Ok(diff) => tracing::debug!(%url, diff_ms = diff, "clock sample"),
            Err(err) => tracing::warn!(%url, error = %err, "unusable date header"),
        }
    }

    fn apply_manifest(&mut self, manifest: JsonManifest) -> ManifestSummary {
        let mut summary = ManifestSummary {
            blacklisted: manifest.blacklist.len(),
            whitelisted: manifest.whitelist.len(),
            ..Default::default()
        };
        self.blacklist
            .extend(manifest.blacklist.iter().map(|e| normalize_str(&e.url)));
        self.whitelist
            .extend(manifest.whitelist.into_iter().map(|e| e.url));

        for descriptor in manifest.templates {
            if !self.has_capacity() {
                summary.dropped += 1;
                continue;
            }
            let index = self.templates.len();
            let template = self.factory.create(descriptor, index);
            self.templates.push(template);
            summary.created += 1;
        }
        summary
    }
}

fn parse_url(raw: &str) -> OverlayResult<Url> {
    Url::parse(raw)
        .map_err(|e| OverlayError::invalid_parameter(format!("bad manifest url {raw:?}: {e}")))
}
