//! Patched fixtures and their last known light state

use arc_swap::ArcSwapOption;
use huedmx_core::{Fixture, LightState, LightUpdate};
use std::collections::BTreeSet;
use std::sync::Arc;

/// A fixture on the bus plus the state it last rendered from
#[derive(Debug)]
pub struct PatchedFixture {
    fixture: Fixture,
    state: ArcSwapOption<LightState>,
}

impl PatchedFixture {
    pub fn new(fixture: Fixture) -> Self {
        Self {
            fixture,
            state: ArcSwapOption::empty(),
        }
    }

    pub fn fixture(&self) -> &Fixture {
        &self.fixture
    }

    /// `None` until the first successful fetch
    pub fn latest_state(&self) -> Option<Arc<LightState>> {
        self.state.load_full()
    }

    /// Merge `update` into the stored state and publish the result.
    ///
    /// A fixture has at most one update in flight, so load and store do not race.
    pub fn apply(&self, update: &LightUpdate) -> Arc<LightState> {
        let previous = self.state.load_full().unwrap_or_default();
        let next = Arc::new(previous.merged(update));
        self.state.store(Some(next.clone()));
        next
    }
}

/// All fixtures, fixed at startup
#[derive(Debug, Default)]
pub struct FixtureRegistry {
    fixtures: Vec<Arc<PatchedFixture>>,
}

impl FixtureRegistry {
    pub fn new(fixtures: impl IntoIterator<Item = Fixture>) -> Self {
        Self {
            fixtures: fixtures
                .into_iter()
                .map(|f| Arc::new(PatchedFixture::new(f)))
                .collect(),
        }
    }

    /// Fixtures mirroring `light_id`; several fixtures may share one light
    pub fn for_light<'a>(
        &'a self,
        light_id: &'a str,
    ) -> impl Iterator<Item = &'a Arc<PatchedFixture>> + 'a {
        self.fixtures
            .iter()
            .filter(move |p| p.fixture.light_id() == light_id)
    }

    /// Every distinct light id referenced by a fixture
    pub fn light_ids(&self) -> BTreeSet<String> {
        self.fixtures
            .iter()
            .map(|p| p.fixture.light_id().to_string())
            .collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Arc<PatchedFixture>> {
        self.fixtures.iter()
    }

    pub fn len(&self) -> usize {
        self.fixtures.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fixtures.is_empty()
    }
}
