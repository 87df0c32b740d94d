//! The check catalog.
//!
//! `build_registry` is the single, ordered point of registration for every
//! check. [`Catalog`] is a read-only index over the registered descriptors,
//! used for name resolution, `list-checks` and `explain`.

use crate::checks::{cpp20, cpp23, cpp26, performance};
use crate::lint::{CheckCategory, CheckDescriptor, CheckOptions, CheckRegistry};
use crate::standard::CapabilityTier;
use std::collections::HashMap;
use std::sync::OnceLock;

/// Register every check, in reporting order.
pub fn build_registry(options: &CheckOptions) -> CheckRegistry {
    CheckRegistry::new()
        // baseline-performance
        .with_check(performance::AvoidStdFunction)
        .with_check(performance::AvoidStdRegex)
        .with_check(performance::AvoidStdEndl)
        .with_check(performance::PreferVector)
        .with_check(performance::PreferStringView)
        .with_check(performance::PreferFromChars)
        .with_check(performance::AvoidStdAny)
        .with_check(performance::PreferUniquePtr)
        .with_check(performance::PreferReserve)
        .with_check(performance::AvoidDynamicCast)
        .with_check(performance::AvoidStdBind)
        .with_check(performance::PreferEmplace)
        .with_check(performance::PreferNoexceptMove)
        .with_check(performance::AvoidCoutCerr)
        .with_check(performance::AvoidVirtualInLoop)
        // standard-upgrade, C++20 and earlier
        .with_check(cpp20::PreferJthread)
        .with_check(cpp20::PreferFormat)
        .with_check(cpp20::PreferSpan)
        .with_check(cpp20::PreferStartsEndsWith)
        .with_check(cpp20::PreferContains)
        .with_check(cpp20::PreferEraseIf)
        .with_check(cpp20::PreferFlatContainers)
        // standard-upgrade, C++23
        .with_check(cpp23::PreferExpected)
        .with_check(cpp23::PreferMoveOnlyFunction)
        .with_check(cpp23::PreferUnreachable)
        .with_check(cpp23::PreferToUnderlying)
        .with_check(cpp23::PreferPrint)
        // standard-upgrade, C++26
        .with_check(cpp26::PreferFunctionRef)
        .with_check(cpp26::PreferInplaceVector::new(
            options.prefer_inplace_vector,
        ))
        .with_check(cpp26::PreferCopyableFunction)
        .with_check(cpp26::PreferHive)
}

/// Index of every catalog descriptor by id, category and minimum tier.
#[derive(Debug, Default)]
pub struct Catalog {
    ordered: Vec<&'static CheckDescriptor>,
    by_id: HashMap<&'static str, &'static CheckDescriptor>,
    by_name: HashMap<&'static str, &'static CheckDescriptor>,
    by_category: HashMap<CheckCategory, Vec<&'static str>>,
    by_tier: HashMap<CapabilityTier, Vec<&'static str>>,
}

impl Catalog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, descriptor: &'static CheckDescriptor) {
        let id = descriptor.id;
        self.ordered.push(descriptor);
        self.by_id.insert(id, descriptor);
        self.by_name.insert(descriptor.name(), descriptor);
        self.by_category
            .entry(descriptor.category)
            .or_default()
            .push(id);
        self.by_tier.entry(descriptor.min_tier).or_default().push(id);
    }

    pub fn get(&self, id: &str) -> Option<&'static CheckDescriptor> {
        self.by_id.get(id).copied()
    }

    /// Lookup by the id without its category prefix.
    pub fn find_by_name(&self, name: &str) -> Option<&'static CheckDescriptor> {
        self.by_name.get(name).copied()
    }

    /// Descriptors in registration order.
    pub fn descriptors(&self) -> impl Iterator<Item = &'static CheckDescriptor> + '_ {
        self.ordered.iter().copied()
    }

    pub fn by_category(&self, category: CheckCategory) -> Vec<&'static CheckDescriptor> {
        self.lookup(self.by_category.get(&category))
    }

    /// Checks whose minimum tier is exactly `tier`.
    pub fn by_min_tier(&self, tier: CapabilityTier) -> Vec<&'static CheckDescriptor> {
        self.lookup(self.by_tier.get(&tier))
    }

    fn lookup(&self, ids: Option<&Vec<&'static str>>) -> Vec<&'static CheckDescriptor> {
        ids.map(|ids| ids.iter().filter_map(|id| self.get(id)).collect())
            .unwrap_or_default()
    }

    pub fn len(&self) -> usize {
        self.ordered.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ordered.is_empty()
    }
}

pub fn build_catalog() -> Catalog {
    let mut catalog = Catalog::new();
    for descriptor in build_registry(&CheckOptions::default()).descriptors() {
        catalog.register(descriptor);
    }
    catalog
}

/// Process-wide catalog, built on first use.
pub fn catalog() -> &'static Catalog {
    static CATALOG: OnceLock<Catalog> = OnceLock::new();
    CATALOG.get_or_init(build_catalog)
}
